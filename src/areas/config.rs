//! Layered configuration
//!
//! Values are looked up in the repository's own `config` first, then in the user's global
//! file, then in the system file. Missing system or global files are empty layers.

use crate::artifacts::config::ini_file::IniFile;
use std::path::{Path, PathBuf};

const SYSTEM_CONFIG_ENV: &str = "GIT_CONFIG_SYSTEM";
const GLOBAL_CONFIG_ENV: &str = "GIT_CONFIG_GLOBAL";

#[derive(Debug, Clone, Default)]
pub struct Config {
    system: IniFile,
    global: IniFile,
    local: IniFile,
}

impl Config {
    pub fn system_path() -> PathBuf {
        std::env::var_os(SYSTEM_CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/etc/gitconfig"))
    }

    pub fn global_path() -> PathBuf {
        if let Some(path) = std::env::var_os(GLOBAL_CONFIG_ENV) {
            return PathBuf::from(path);
        }

        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .unwrap_or_default();
        home.join(".gitconfig")
    }

    /// System and global layers only
    pub fn global() -> anyhow::Result<Self> {
        Ok(Config {
            system: IniFile::load_or_default(&Self::system_path())?,
            global: IniFile::load_or_default(&Self::global_path())?,
            local: IniFile::default(),
        })
    }

    /// All three layers, the local one read from `local_path`
    pub fn load(local_path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::global()?;
        config.local = IniFile::load_or_default(local_path)?;

        tracing::debug!(path = %local_path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        [&self.local, &self.global, &self.system]
            .into_iter()
            .find_map(|layer| layer.get(section, key))
            .map(str::to_string)
    }

    pub fn local(&self) -> &IniFile {
        &self.local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn local_values_shadow_global_and_system_ones() {
        let config = Config {
            system: IniFile::parse("[user]\nname = System\nemail = sys@example.com\n[core]\neditor = vi\n").unwrap(),
            global: IniFile::parse("[user]\nname = Global\nemail = global@example.com\n").unwrap(),
            local: IniFile::parse("[user]\nname = Local\n").unwrap(),
        };

        assert_eq!(config.get("user", "name").as_deref(), Some("Local"));
        assert_eq!(config.get("user", "email").as_deref(), Some("global@example.com"));
        assert_eq!(config.get("core", "editor").as_deref(), Some("vi"));
        assert_eq!(config.get("core", "pager"), None);
    }

    #[test]
    fn missing_local_file_is_an_empty_layer() {
        let dir = assert_fs::TempDir::new().unwrap();
        let local = IniFile::load_or_default(&dir.path().join("config")).unwrap();

        assert_eq!(local, IniFile::default());
    }
}
