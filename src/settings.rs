//! Optional TOML settings: exclusion keywords and extra request parameters.
//!
//! ```toml
//! exclusion_keywords = ["lighting", "interruptible"]
//!
//! [request_parameters]
//! sector = "Residential"
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;

use crate::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Tariffs whose name contains any of these are excluded (case-insensitive).
    #[serde(default)]
    pub exclusion_keywords: Vec<String>,

    /// Passed through to the utility rates API as query parameters.
    #[serde(default)]
    pub request_parameters: BTreeMap<String, String>,
}

impl Settings {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse `{}`", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings() -> Result {
        let settings: Settings = toml::from_str(
            r#"
            exclusion_keywords = ["lighting"]

            [request_parameters]
            sector = "Residential"
            "#,
        )?;
        assert_eq!(settings.exclusion_keywords, vec!["lighting".to_string()]);
        assert_eq!(settings.request_parameters.get("sector").map(String::as_str), Some("Residential"));
        Ok(())
    }

    #[test]
    fn test_defaults_are_empty() {
        let settings = Settings::default();
        assert!(settings.exclusion_keywords.is_empty());
        assert!(settings.request_parameters.is_empty());
    }
}
