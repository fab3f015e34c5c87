use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents a Groq-hosted model identifier.
///
/// This can be a predefined model version or a custom string value
/// for models that may be added in the future.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for future models or private deployments)
    Custom(String),
}

/// Known Groq-hosted model versions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// LLaMA 3.3 70B, versatile variant
    #[serde(rename = "llama-3.3-70b-versatile")]
    Llama33_70bVersatile,

    /// LLaMA 3.1 8B, low-latency variant
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama31_8bInstant,

    /// LLaMA 3 70B with an 8192-token context
    #[serde(rename = "llama3-70b-8192")]
    Llama3_70b8192,

    /// LLaMA 3 8B with an 8192-token context
    #[serde(rename = "llama3-8b-8192")]
    Llama3_8b8192,

    /// Gemma 2 9B, instruction tuned
    #[serde(rename = "gemma2-9b-it")]
    Gemma2_9bIt,
}

impl Model {
    /// The model used when none is specified.
    pub fn default_model() -> Self {
        Model::Known(KnownModel::Llama33_70bVersatile)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnownModel::Llama33_70bVersatile => write!(f, "llama-3.3-70b-versatile"),
            KnownModel::Llama31_8bInstant => write!(f, "llama-3.1-8b-instant"),
            KnownModel::Llama3_70b8192 => write!(f, "llama3-70b-8192"),
            KnownModel::Llama3_8b8192 => write!(f, "llama3-8b-8192"),
            KnownModel::Gemma2_9bIt => write!(f, "gemma2-9b-it"),
        }
    }
}

impl FromStr for KnownModel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "llama-3.3-70b-versatile" => Ok(KnownModel::Llama33_70bVersatile),
            "llama-3.1-8b-instant" => Ok(KnownModel::Llama31_8bInstant),
            "llama3-70b-8192" => Ok(KnownModel::Llama3_70b8192),
            "llama3-8b-8192" => Ok(KnownModel::Llama3_8b8192),
            "gemma2-9b-it" => Ok(KnownModel::Gemma2_9bIt),
            _ => Err(()),
        }
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<KnownModel>() {
            Ok(known) => Ok(Model::Known(known)),
            Err(()) => Ok(Model::Custom(s.to_string())),
        }
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::Custom(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::Custom(model.to_string())
    }
}
