use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

/// `[section]` or `[section "subsection"]`
const SECTION_REGEX: &str = r#"^\[\s*([A-Za-z0-9.-]+)(?:\s+"([^"]*)")?\s*\]$"#;

/// `key = value`, or a bare `key`
const ENTRY_REGEX: &str = r"^([A-Za-z][A-Za-z0-9_-]*)\s*(?:=\s*(.*?))?\s*$";

pub type Section = BTreeMap<String, String>;

/// Sections and their entries, as read from one configuration file
///
/// Entries that appear before the first header live in the section named `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniFile {
    sections: BTreeMap<String, Section>,
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

impl IniFile {
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let section_regex = regex::Regex::new(SECTION_REGEX)?;
        let entry_regex = regex::Regex::new(ENTRY_REGEX)?;

        let mut ini = IniFile::default();
        let mut current_section = String::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(captures) = section_regex.captures(line) {
                current_section = match captures.get(2) {
                    Some(subsection) => format!("{} \"{}\"", &captures[1], subsection.as_str()),
                    None => captures[1].to_string(),
                };
                continue;
            }

            match entry_regex.captures(line) {
                Some(captures) => {
                    let value = captures.get(2).map_or("true", |value| unquote(value.as_str()));
                    ini.set(&current_section, &captures[1], value);
                }
                None => anyhow::bail!("Error parsing line {}: {line}", number + 1),
            }
        }

        Ok(ini)
    }

    /// Parse the file at `path`; a missing file is an empty configuration
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn find_section(&self, section: &str) -> Option<(&String, &Section)> {
        self.sections
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(section))
    }

    pub fn section(&self, section: &str) -> Option<&Section> {
        self.find_section(section).map(|(_, entries)| entries)
    }

    /// Section names in sorted order
    pub fn sections(&self) -> impl Iterator<Item = &String> {
        self.sections.keys()
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let section_name = self
            .find_section(section)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| section.to_string());
        let entries = self.sections.entry(section_name).or_default();

        let key_name = entries
            .keys()
            .find(|name| name.eq_ignore_ascii_case(key))
            .cloned()
            .unwrap_or_else(|| key.to_string());
        entries.insert(key_name, value.to_string());
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_string())
            .with_context(|| format!("Unable to write config file {}", path.display()))
    }
}

impl std::fmt::Display for IniFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (section, entries) in &self.sections {
            if !section.is_empty() {
                writeln!(f, "[{section}]")?;
            }
            for (key, value) in entries {
                writeln!(f, "\t{key} = {value}")?;
            }
        }
        Ok(())
    }
}
