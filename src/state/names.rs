//! Display-name legality.
//!
//! This is the pure half of name negotiation. Uniqueness depends on the live
//! registry and is checked inside `Registry::register`.

use crate::config::NamesConfig;
use crate::error::NameError;

/// Outcome of a legal candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameChoice {
    /// Use this exact name, subject to uniqueness.
    Named(String),
    /// Empty candidate; the registry assigns `Anonymous <n>`.
    Anonymous,
}

/// Length bounds and reserved substrings.
#[derive(Debug, Clone)]
pub struct NameRules {
    min_length: usize,
    max_length: usize,
    /// Lowercased.
    reserved: Vec<String>,
}

impl NameRules {
    pub fn new(config: &NamesConfig) -> Self {
        Self {
            min_length: config.min_length,
            max_length: config.max_length,
            reserved: config
                .reserved
                .iter()
                .map(|r| r.trim().to_lowercase())
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    /// Check a candidate after trimming surrounding whitespace.
    pub fn validate(&self, candidate: &str) -> Result<NameChoice, NameError> {
        let name = candidate.trim();
        if name.is_empty() {
            return Ok(NameChoice::Anonymous);
        }

        let length = name.chars().count();
        if length < self.min_length || length > self.max_length {
            return Err(NameError::Length {
                min: self.min_length,
                max: self.max_length,
            });
        }

        let lowered = name.to_lowercase();
        if let Some(word) = self.reserved.iter().find(|r| lowered.contains(r.as_str())) {
            return Err(NameError::Reserved(word.clone()));
        }

        Ok(NameChoice::Named(name.to_string()))
    }
}

impl Default for NameRules {
    fn default() -> Self {
        Self::new(&NamesConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_anonymous() {
        let rules = NameRules::default();
        assert_eq!(rules.validate(""), Ok(NameChoice::Anonymous));
        assert_eq!(rules.validate("   "), Ok(NameChoice::Anonymous));
    }

    #[test]
    fn test_length_bounds() {
        let rules = NameRules::default();
        assert!(matches!(rules.validate("a"), Err(NameError::Length { .. })));
        assert_eq!(rules.validate("ab"), Ok(NameChoice::Named("ab".into())));
        assert!(rules.validate(&"x".repeat(20)).is_ok());
        assert!(rules.validate(&"x".repeat(21)).is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        let rules = NameRules::default();
        assert!(rules.validate("ééééééééééééééééé").is_ok());
        assert!(rules.validate("  zoë  ").is_ok());
    }

    #[test]
    fn test_reserved_substrings() {
        let rules = NameRules::default();
        assert_eq!(
            rules.validate("SuperAdmin"),
            Err(NameError::Reserved("admin".into()))
        );
        assert_eq!(
            rules.validate("myserverbot"),
            Err(NameError::Reserved("server".into()))
        );
        assert!(rules.validate("serve").is_ok());
    }

    #[test]
    fn test_trims_before_use() {
        let rules = NameRules::default();
        assert_eq!(rules.validate("  bob \r"), Ok(NameChoice::Named("bob".into())));
    }
}
