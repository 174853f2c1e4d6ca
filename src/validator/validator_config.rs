use serde::{Deserialize, Serialize};

use crate::{ast::NameMatcher, validator::ValidatorError};

/// Settings of a validation pass.
///
/// - `case_sensitive` controls how identifiers are matched.
/// - `niladic_functions` allows bare identifiers such as `CURRENT_DATE` to be
///   read as function calls.
/// - `order_by_ordinals` and `order_by_aliases` let ORDER BY items refer to
///   select items by position or alias.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub case_sensitive: bool,
    pub niladic_functions: bool,
    pub order_by_ordinals: bool,
    pub order_by_aliases: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            niladic_functions: true,
            order_by_ordinals: true,
            order_by_aliases: true,
        }
    }
}

impl ValidatorConfig {
    /// Create default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with identifiers matched ignoring case.
    pub fn case_insensitive() -> Self {
        Self { case_sensitive: false, ..Self::default() }
    }

    /// Load from JSON; missing fields take their default.
    pub fn from_json(text: &str) -> Result<Self, ValidatorError> {
        serde_json::from_str(text).map_err(|e| ValidatorError::InvalidConfig(e.to_string()))
    }

    pub fn name_matcher(&self) -> NameMatcher {
        if self.case_sensitive { NameMatcher::CaseSensitive } else { NameMatcher::CaseInsensitive }
    }
}
