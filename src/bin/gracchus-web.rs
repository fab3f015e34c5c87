//! Browser chat application backed by Groq-hosted models.
//!
//! This binary serves a single-page chat UI plus a small JSON API on a
//! local port. The API key is read from the `GROQ_API_KEY` environment
//! variable.
//!
//! # Usage
//!
//! ```bash
//! # Serve on the default address (127.0.0.1:8000)
//! gracchus-web
//!
//! # Bind elsewhere
//! gracchus-web --bind 0.0.0.0:3000
//!
//! # Specify a model and system prompt
//! gracchus-web --model llama-3.1-8b-instant --system "You are terse"
//! ```

use std::sync::Arc;

use arrrg::CommandLine as _;
use arrrg_derive::CommandLine;
use tokio::sync::Mutex;

use gracchus::Groq;
use gracchus::chat::{ChatArgs, ChatConfig, ChatSession};
use gracchus::web;

/// Default address the web surface binds to.
const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Command-line arguments for the gracchus-web tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
struct WebArgs {
    /// Address to bind the HTTP server to.
    #[arrrg(optional, "Address to bind (default: 127.0.0.1:8000)", "ADDR")]
    bind: Option<String>,

    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: llama-3.3-70b-versatile)", "MODEL")]
    model: Option<String>,

    /// System prompt to set context for the conversation.
    #[arrrg(optional, "System prompt for the conversation", "PROMPT")]
    system: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max tokens per response (default: 800)", "TOKENS")]
    max_tokens: Option<u32>,

    /// YAML profile with session defaults.
    #[arrrg(optional, "Load session defaults from a YAML profile", "FILE")]
    profile: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = WebArgs::from_command_line_relaxed("gracchus-web [OPTIONS]");
    let bind = args
        .bind
        .clone()
        .unwrap_or_else(|| DEFAULT_BIND.to_string());

    let config = ChatConfig::resolve(ChatArgs {
        model: args.model,
        system: args.system,
        max_tokens: args.max_tokens,
        profile: args.profile,
        no_color: true,
    })?;

    let client = Groq::new(None)?;
    let session = Arc::new(Mutex::new(ChatSession::new(client, config)));
    let app = web::router(session);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    println!("Gracchus Web listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}
