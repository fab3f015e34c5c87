//! Configuration types for the chat applications.
//!
//! This module provides CLI argument parsing via `arrrg`, optional YAML
//! profile files, and configuration structures for controlling chat behavior.

use std::path::{Path, PathBuf};

use arrrg_derive::CommandLine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Model;

/// Default maximum tokens per response.
const DEFAULT_MAX_TOKENS: u32 = 800;

/// Default sampling temperature.
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// The conversation-level instruction sent with every request unless
/// overridden or cleared.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a sustainability and packaging expert \
specializing in Life Cycle Assessment (LCA), ESG (Environmental, Social, Governance) \
reporting, and materiality analysis for packaging. Answer user questions as an industry \
authority, using up-to-date standards, real-world examples, and clear explanations \
tailored to packaging solutions.";

/// Command-line arguments for the gracchus-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: llama-3.3-70b-versatile)", "MODEL")]
    pub model: Option<String>,

    /// System prompt to set context for the conversation.
    #[arrrg(optional, "System prompt for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max tokens per response (default: 800)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// YAML profile with session defaults.
    #[arrrg(optional, "Load session defaults from a YAML profile", "FILE")]
    pub profile: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Session defaults loaded from a YAML profile file.
///
/// Every field is optional; unset fields fall back to the built-in defaults,
/// and command-line flags override the profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatProfile {
    /// Model identifier.
    pub model: Option<String>,

    /// System prompt; an empty string clears the default prompt.
    pub system: Option<String>,

    /// Maximum tokens per response.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling cutoff.
    pub top_p: Option<f32>,

    /// Stop sequences supplied on every request.
    #[serde(default)]
    pub stop_sequences: Vec<String>,

    /// Path for transcript auto-save.
    pub transcript: Option<PathBuf>,
}

impl ChatProfile {
    /// Loads a profile from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|err| Error::io("failed to read profile", err))?;
        serde_yaml::from_str(&contents).map_err(|err| {
            Error::serialization("failed to parse profile", Some(Box::new(err)))
        })
    }
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// profile files and command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Optional system prompt to set conversation context.
    pub system_prompt: Option<String>,

    /// Maximum tokens per response.
    pub max_tokens: u32,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Optional sampling temperature.
    pub temperature: Option<f32>,

    /// Optional top-p nucleus sampling value.
    pub top_p: Option<f32>,

    /// Custom stop sequences supplied on every request.
    pub stop_sequences: Vec<String>,

    /// Path to persist transcripts automatically after each assistant turn.
    pub transcript_path: Option<PathBuf>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: llama-3.3-70b-versatile
    /// - System prompt: the sustainability/packaging persona
    /// - Max tokens: 800
    /// - Temperature: 0.7
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default_model(),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            max_tokens: DEFAULT_MAX_TOKENS,
            use_color: true,
            temperature: Some(DEFAULT_TEMPERATURE),
            top_p: None,
            stop_sequences: Vec::new(),
            transcript_path: None,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = Some(prompt);
        self
    }

    /// Clears the system prompt.
    pub fn without_system_prompt(mut self) -> Self {
        self.system_prompt = None;
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the top-p value.
    pub fn with_top_p(mut self, top_p: Option<f32>) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the stop sequences.
    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.stop_sequences = stop_sequences;
        self
    }

    /// Sets the transcript auto-save path.
    pub fn with_transcript_path(mut self, path: Option<PathBuf>) -> Self {
        self.transcript_path = path;
        self
    }

    /// Applies a profile over this configuration.
    ///
    /// An empty `system` string in the profile clears the default prompt.
    pub fn apply_profile(mut self, profile: &ChatProfile) -> Self {
        if let Some(model) = &profile.model {
            self.model = model
                .parse()
                .unwrap_or_else(|_| Model::Custom(model.clone()));
        }
        if let Some(system) = &profile.system {
            if system.is_empty() {
                self.system_prompt = None;
            } else {
                self.system_prompt = Some(system.clone());
            }
        }
        if let Some(max_tokens) = profile.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(temperature) = profile.temperature {
            self.temperature = Some(temperature);
        }
        if let Some(top_p) = profile.top_p {
            self.top_p = Some(top_p);
        }
        if !profile.stop_sequences.is_empty() {
            self.stop_sequences = profile.stop_sequences.clone();
        }
        if let Some(transcript) = &profile.transcript {
            self.transcript_path = Some(transcript.clone());
        }
        self
    }

    /// Resolves a configuration from command-line arguments, loading the
    /// profile file first when one is named so flags win over the profile.
    pub fn resolve(args: ChatArgs) -> Result<Self> {
        let mut config = ChatConfig::new();
        if let Some(path) = &args.profile {
            let profile = ChatProfile::load(path)?;
            config = config.apply_profile(&profile);
        }
        Ok(config.apply_args(args))
    }

    fn apply_args(mut self, args: ChatArgs) -> Self {
        if let Some(model) = args.model {
            self.model = model
                .parse()
                .unwrap_or_else(|_| Model::Custom(model.clone()));
        }
        if let Some(system) = args.system {
            self.system_prompt = Some(system);
        }
        if let Some(max_tokens) = args.max_tokens {
            self.max_tokens = max_tokens;
        }
        if args.no_color {
            self.use_color = false;
        }
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        // Ignores the profile field; callers that accept profiles use
        // `resolve` so load errors are reported.
        ChatConfig::new().apply_args(args)
    }
}
