//! Interactive chat built on the Groq client.
//!
//! This module provides the conversation-history buffer, slash-command
//! parsing, configuration, and rendering shared by the terminal and web
//! chat surfaces.

pub mod commands;
pub mod config;
pub mod render;
pub mod session;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, ChatProfile, DEFAULT_SYSTEM_PROMPT};
pub use render::{PlainTextRenderer, Renderer};
pub use session::{
    ChatSession, PackagingSpec, SessionStats, packaging_score_prompt, report_analysis_prompt,
};
