use crate::artifacts::refs::INVALID_REF_NAME_REGEX;
use crate::errors::KitError;
use anyhow::Context;

/// Whether `name` can be joined onto the git directory as a ref path
pub fn is_valid_ref_name(name: &str) -> anyhow::Result<bool> {
    if name.is_empty() {
        return Ok(false);
    }

    let re = regex::Regex::new(INVALID_REF_NAME_REGEX)
        .with_context(|| format!("invalid ref name regex: {INVALID_REF_NAME_REGEX}"))?;

    Ok(!re.is_match(name))
}

/// Short name of a tag, the part after `refs/tags/`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagName(String);

impl TagName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        if is_valid_ref_name(&name)? {
            Ok(Self(name))
        } else {
            Err(KitError::InvalidRefName(name).into())
        }
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("v1")]
    #[case("v1.0.2")]
    #[case("release/2024-01")]
    #[case("HEAD")]
    fn ordinary_names_are_accepted(#[case] name: &str) {
        assert_eq!(TagName::try_parse(name.to_string()).unwrap().as_ref(), name);
    }

    #[rstest]
    #[case("")]
    #[case("../../HEAD")]
    #[case("../x")]
    #[case("a/../b")]
    #[case("/etc/passwd")]
    #[case(".hidden")]
    #[case("a/.b")]
    #[case("trailing/")]
    #[case("a//b")]
    #[case("v1.lock")]
    #[case("at@{1}")]
    #[case("with space")]
    #[case("star*")]
    #[case("back\\slash")]
    fn unsafe_names_are_rejected(#[case] name: &str) {
        let err = TagName::try_parse(name.to_string()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<KitError>(),
            Some(KitError::InvalidRefName(_))
        ));
    }
}
