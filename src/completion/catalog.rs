//! Model catalog offered to the user
//!
//! The completion service hosts a fixed set of models; anything outside
//! this list is rejected locally before a request is made.

use crate::errors::{KaiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Model identifier from the hosted catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModelId {
    Mixtral8x7b,
    SnowflakeArctic,
    MistralLarge,
    Llama3_8b,
    Llama3_70b,
    RekaFlash,
    Mistral7b,
    Llama2_70bChat,
    Gemma7b,
}

impl ModelId {
    /// All models, in the order they are presented
    pub const ALL: [ModelId; 9] = [
        ModelId::Mixtral8x7b,
        ModelId::SnowflakeArctic,
        ModelId::MistralLarge,
        ModelId::Llama3_8b,
        ModelId::Llama3_70b,
        ModelId::RekaFlash,
        ModelId::Mistral7b,
        ModelId::Llama2_70bChat,
        ModelId::Gemma7b,
    ];

    /// Wire name understood by the completion service
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Mixtral8x7b => "mixtral-8x7b",
            ModelId::SnowflakeArctic => "snowflake-arctic",
            ModelId::MistralLarge => "mistral-large",
            ModelId::Llama3_8b => "llama3-8b",
            ModelId::Llama3_70b => "llama3-70b",
            ModelId::RekaFlash => "reka-flash",
            ModelId::Mistral7b => "mistral-7b",
            ModelId::Llama2_70bChat => "llama2-70b-chat",
            ModelId::Gemma7b => "gemma-7b",
        }
    }

    /// Comma-separated catalog, for error messages and help text
    pub fn catalog() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId::Mixtral8x7b
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = KaiError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| {
                KaiError::Validation(format!(
                    "unknown model '{}' (available: {})",
                    s.trim(),
                    Self::catalog()
                ))
            })
    }
}

impl TryFrom<String> for ModelId {
    type Error = KaiError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ModelId> for String {
    fn from(model: ModelId) -> Self {
        model.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_models() {
        for model in ModelId::ALL {
            assert_eq!(model.as_str().parse::<ModelId>().unwrap(), model);
        }
        assert_eq!(" Mistral-Large ".parse::<ModelId>().unwrap(), ModelId::MistralLarge);
    }

    #[test]
    fn test_parse_unknown_model() {
        let err = "gpt-4".parse::<ModelId>().unwrap_err();
        assert!(matches!(err, KaiError::Validation(_)));
        assert!(err.to_string().contains("mixtral-8x7b"));
    }

    #[test]
    fn test_default_is_first_in_catalog() {
        assert_eq!(ModelId::default(), ModelId::ALL[0]);
    }

    #[test]
    fn test_serde_uses_wire_name() {
        let json = serde_json::to_string(&ModelId::Llama3_70b).unwrap();
        assert_eq!(json, "\"llama3-70b\"");
        let parsed: ModelId = serde_json::from_str("\"reka-flash\"").unwrap();
        assert_eq!(parsed, ModelId::RekaFlash);
        assert!(serde_json::from_str::<ModelId>("\"nope\"").is_err());
    }
}
