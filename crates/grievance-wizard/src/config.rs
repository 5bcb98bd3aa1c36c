//! Wizard configuration

use crate::error::WizardError;
use grievance_core::ValidationContext;
use serde::{Deserialize, Serialize};

/// Session-wide wizard settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct WizardConfig {
    /// Business area slug sent with every ticket
    pub business_area: String,
    /// Minimum questionnaire answers on the verification step
    pub min_verified_questions: usize,
    /// Revalidate on every change before the verification step
    pub validate_on_change: bool,
}

impl WizardConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With business area
    #[inline]
    #[must_use]
    pub fn with_business_area(mut self, business_area: impl Into<String>) -> Self {
        self.business_area = business_area.into();
        self
    }

    /// With questionnaire minimum
    #[inline]
    #[must_use]
    pub fn with_min_verified_questions(mut self, min: usize) -> Self {
        self.min_verified_questions = min;
        self
    }

    /// With change-time validation switched on or off
    #[inline]
    #[must_use]
    pub fn with_validate_on_change(mut self, enabled: bool) -> Self {
        self.validate_on_change = enabled;
        self
    }

    /// Parse from TOML; missing keys keep their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self, WizardError> {
        toml::from_str(raw).map_err(|e| WizardError::Config(e.to_string()))
    }

    #[must_use]
    pub fn validation_context(&self) -> ValidationContext {
        ValidationContext {
            min_verified_questions: self.min_verified_questions,
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            business_area: String::new(),
            min_verified_questions: ValidationContext::default().min_verified_questions,
            validate_on_change: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_defaults() {
        let config = WizardConfig::from_toml_str(
            r#"
            business_area = "afghanistan"
            min_verified_questions = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.business_area, "afghanistan");
        assert_eq!(config.min_verified_questions, 3);
        assert!(config.validate_on_change);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = WizardConfig::from_toml_str("min_verified_questions = \"many\"").unwrap_err();
        assert!(matches!(err, WizardError::Config(_)));
    }

    #[test]
    fn default_minimum_is_five() {
        assert_eq!(WizardConfig::new().validation_context().min_verified_questions, 5);
    }
}
