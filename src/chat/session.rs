//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the
//! conversation-history buffer and drives API interactions through a
//! [`CompletionBackend`].

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{from_reader, to_writer_pretty};
use time::OffsetDateTime;

use crate::backend::CompletionBackend;
use crate::chat::config::ChatConfig;
use crate::chat::render::Renderer;
use crate::error::{Error, Result};
use crate::types::{ChatMessage, CompletionParams, Model, Usage};

/// Largest report slice forwarded for analysis, in characters.
///
/// Reports are truncated rather than rejected so oversized documents still
/// produce a summary of their opening sections.
const REPORT_CHAR_BUDGET: usize = 3500;

/// Packaging parameters scored by the sustainability assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct PackagingSpec {
    /// Material name, e.g. "Aluminum" or "Bioplastic".
    pub material: String,

    /// Weight in grams.
    pub weight_grams: f64,

    /// Whether the packaging is recyclable.
    pub recyclable: bool,

    /// Whether it is made from renewable resources.
    pub renewable: bool,
}

/// A chat session that manages conversation state and API interactions.
///
/// The session maintains message history and handles responses from the
/// backend. The history buffer holds user and assistant turns only, in
/// insertion order; the system prompt is prepended when a request is built.
pub struct ChatSession<B: CompletionBackend> {
    backend: B,
    config: ChatConfig,
    messages: Vec<ChatMessage>,
    usage_totals: Usage,
    last_turn_usage: Option<Usage>,
    request_count: u64,
    save_error: Option<Error>,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: Model,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// The maximum tokens per response.
    pub max_tokens: u32,
    /// The system prompt, if any.
    pub system_prompt: Option<String>,
    /// The sampling temperature, if set.
    pub temperature: Option<f32>,
    /// The top-p value, if set.
    pub top_p: Option<f32>,
    /// The configured stop sequences.
    pub stop_sequences: Vec<String>,
    /// The auto-save transcript path, if set.
    pub transcript_path: Option<PathBuf>,
    /// Total prompt tokens across all requests.
    pub total_prompt_tokens: u64,
    /// Total completion tokens across all requests.
    pub total_completion_tokens: u64,
    /// Total number of API requests made.
    pub total_requests: u64,
    /// Usage for the last turn, when the provider reported it.
    pub last_turn_usage: Option<Usage>,
}

impl<B: CompletionBackend> ChatSession<B> {
    /// Creates a new chat session with the given backend and configuration.
    pub fn new(backend: B, config: ChatConfig) -> Self {
        Self {
            backend,
            config,
            messages: Vec::new(),
            usage_totals: Usage::default(),
            last_turn_usage: None,
            request_count: 0,
            save_error: None,
        }
    }

    /// Builds request parameters from the configuration and the history
    /// buffer plus the system prompt.
    fn build_params(&self) -> CompletionParams {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        if let Some(prompt) = &self.config.system_prompt {
            messages.push(ChatMessage::system(prompt.clone()));
        }
        messages.extend(self.messages.iter().cloned());

        let mut params = CompletionParams::new(self.config.model.clone(), messages)
            .with_max_tokens(self.config.max_tokens);
        if let Some(temperature) = self.config.temperature {
            params = params.with_temperature(temperature);
        }
        if let Some(top_p) = self.config.top_p {
            params = params.with_top_p(top_p);
        }
        if !self.config.stop_sequences.is_empty() {
            params = params.with_stop(self.config.stop_sequences.clone());
        }
        params
    }

    /// Sends a user message and returns the complete response text.
    ///
    /// This method:
    /// 1. Adds the user message to history
    /// 2. Sends a non-streaming request to the API
    /// 3. Adds the assistant response to history
    ///
    /// On failure the user message is rolled back, so earlier history is
    /// never reordered, dropped, or left dangling. A transcript auto-save
    /// failure never fails the exchange; it is held for
    /// [`take_save_error`](Self::take_save_error).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn send(&mut self, user_input: &str) -> Result<String> {
        let previous_len = self.messages.len();
        self.messages.push(ChatMessage::user(user_input));

        let params = self.build_params();
        match self.backend.complete(params).await {
            Ok(completion) => {
                let reply = match completion.reply_text() {
                    Ok(reply) => reply.to_string(),
                    Err(err) => {
                        self.messages.truncate(previous_len);
                        return Err(err);
                    }
                };
                self.messages.push(ChatMessage::assistant(reply.clone()));
                self.record_usage(completion.usage);
                self.save_error = self.auto_save_transcript().err();
                Ok(reply)
            }
            Err(err) => {
                self.messages.truncate(previous_len);
                Err(err)
            }
        }
    }

    /// Sends a user message and streams the response through the renderer.
    ///
    /// Response chunks are rendered as they arrive and the assembled reply
    /// is appended to history when the stream completes. The interrupt flag
    /// is checked between chunks; an interrupted reply is kept if any text
    /// arrived, otherwise the user turn is rolled back.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request or the stream fails. The user
    /// message is rolled back in that case.
    pub async fn send_streaming(
        &mut self,
        user_input: &str,
        renderer: &mut dyn Renderer,
        interrupted: &AtomicBool,
    ) -> Result<()> {
        let previous_len = self.messages.len();
        self.messages.push(ChatMessage::user(user_input));

        let params = self.build_params().with_stream();
        let mut stream = match self.backend.stream(params).await {
            Ok(stream) => stream,
            Err(err) => {
                self.messages.truncate(previous_len);
                return Err(err);
            }
        };

        let mut reply = String::new();
        let mut usage = None;
        let mut was_interrupted = false;

        while let Some(chunk) = stream.next().await {
            if interrupted.load(Ordering::Relaxed) {
                was_interrupted = true;
                break;
            }
            match chunk {
                Ok(chunk) => {
                    if let Some(delta) = chunk.delta_text() {
                        reply.push_str(delta);
                        renderer.print_text(delta);
                    }
                    if chunk.usage.is_some() {
                        usage = chunk.usage;
                    }
                }
                Err(err) => {
                    self.messages.truncate(previous_len);
                    return Err(err);
                }
            }
        }

        if was_interrupted {
            renderer.print_interrupted();
            if reply.is_empty() {
                // Nothing arrived; drop the dangling user turn.
                self.messages.truncate(previous_len);
                return Ok(());
            }
        } else {
            renderer.finish_response();
        }

        self.messages.push(ChatMessage::assistant(reply));
        self.record_usage(usage);
        self.save_error = self.auto_save_transcript().err();
        Ok(())
    }

    /// Returns the transcript auto-save failure from the last completed
    /// exchange, if any.
    ///
    /// The exchange itself is in history and was reported as a success;
    /// callers surface this separately.
    pub fn take_save_error(&mut self) -> Option<Error> {
        self.save_error.take()
    }

    /// Reads a report file and asks the model to summarize and benchmark it.
    ///
    /// The exchange is a one-off: it does not enter the history buffer, so
    /// a long report never crowds out the conversation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is empty, or the API
    /// request fails.
    pub async fn analyze_report<P: AsRef<Path>>(&mut self, path: P) -> Result<String> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|err| Error::io("failed to read report file", err))?;
        self.analyze_report_text(&text).await
    }

    /// Asks the model to summarize and benchmark report text directly.
    ///
    /// Same one-off semantics as [`analyze_report`](Self::analyze_report);
    /// this is the entry point for callers that already hold the text, such
    /// as the web surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty or the API request fails.
    pub async fn analyze_report_text(&mut self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::bad_request(
                "report contains no text",
                Some("text".to_string()),
            ));
        }
        self.one_off_exchange(report_analysis_prompt(text)).await
    }

    /// Scores a set of packaging parameters with the assessment prompt.
    ///
    /// A one-off exchange like report analysis; the score never enters the
    /// history buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn assess_packaging(&mut self, spec: &PackagingSpec) -> Result<String> {
        self.one_off_exchange(packaging_score_prompt(spec)).await
    }

    async fn one_off_exchange(&mut self, prompt: String) -> Result<String> {
        let mut messages = Vec::new();
        if let Some(system) = &self.config.system_prompt {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(prompt));

        let mut params = CompletionParams::new(self.config.model.clone(), messages)
            .with_max_tokens(self.config.max_tokens);
        if let Some(temperature) = self.config.temperature {
            params = params.with_temperature(temperature);
        }

        let completion = self.backend.complete(params).await?;
        let reply = completion.reply_text()?.to_string();
        self.record_usage(completion.usage);
        Ok(reply)
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Returns the conversation history.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Changes the model used for responses.
    pub fn set_model(&mut self, model: Model) {
        self.config.model = model;
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Sets or clears the system prompt.
    pub fn set_system_prompt(&mut self, prompt: Option<String>) {
        self.config.system_prompt = prompt;
    }

    /// Returns the current system prompt, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.config.system_prompt.as_deref()
    }

    /// Sets the maximum tokens per response.
    pub fn set_max_tokens(&mut self, max_tokens: u32) {
        self.config.max_tokens = max_tokens;
    }

    /// Sets the sampling temperature.
    pub fn set_temperature(&mut self, temperature: Option<f32>) {
        self.config.temperature = temperature;
    }

    /// Sets the top-p value.
    pub fn set_top_p(&mut self, top_p: Option<f32>) {
        self.config.top_p = top_p;
    }

    /// Adds a stop sequence to the persistent list.
    pub fn add_stop_sequence(&mut self, sequence: String) {
        if !self
            .config
            .stop_sequences
            .iter()
            .any(|existing| existing == &sequence)
        {
            self.config.stop_sequences.push(sequence);
        }
    }

    /// Clears all stop sequences.
    pub fn clear_stop_sequences(&mut self) {
        self.config.stop_sequences.clear();
    }

    /// Returns the configured stop sequences.
    pub fn stop_sequences(&self) -> &[String] {
        &self.config.stop_sequences
    }

    /// Sets the auto-save transcript path.
    pub fn set_transcript_path(&mut self, path: Option<PathBuf>) {
        self.config.transcript_path = path;
    }

    /// Returns the configured transcript path, if any.
    pub fn transcript_path(&self) -> Option<&Path> {
        self.config.transcript_path.as_deref()
    }

    /// Saves the transcript to the specified path.
    pub fn save_transcript_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let transcript = TranscriptFile::new(&self.messages);
        let file = File::create(path.as_ref())
            .map_err(|err| Error::io("failed to create transcript file", err))?;
        let writer = BufWriter::new(file);
        to_writer_pretty(writer, &transcript).map_err(|err| {
            Error::serialization("failed to serialize transcript", Some(Box::new(err)))
        })
    }

    /// Loads a transcript from disk, replacing the current conversation history.
    pub fn load_transcript_from<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = File::open(path.as_ref())
            .map_err(|err| Error::io("failed to open transcript file", err))?;
        let reader = BufReader::new(file);
        let transcript: TranscriptFile = from_reader(reader).map_err(|err| {
            Error::serialization("failed to parse transcript", Some(Box::new(err)))
        })?;
        if transcript.version != TRANSCRIPT_VERSION {
            return Err(Error::serialization(
                format!("unsupported transcript version {}", transcript.version),
                None,
            ));
        }
        self.messages = transcript.messages;
        Ok(())
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            message_count: self.message_count(),
            max_tokens: self.config.max_tokens,
            system_prompt: self.config.system_prompt.clone(),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            stop_sequences: self.config.stop_sequences.clone(),
            transcript_path: self.config.transcript_path.clone(),
            total_prompt_tokens: u64::from(self.usage_totals.prompt_tokens),
            total_completion_tokens: u64::from(self.usage_totals.completion_tokens),
            total_requests: self.request_count,
            last_turn_usage: self.last_turn_usage,
        }
    }

    fn record_usage(&mut self, usage: Option<Usage>) {
        self.request_count = self.request_count.saturating_add(1);
        self.last_turn_usage = usage;
        if let Some(usage) = usage {
            self.usage_totals = self.usage_totals + usage;
        }
    }

    fn auto_save_transcript(&self) -> Result<()> {
        if let Some(path) = &self.config.transcript_path {
            self.save_transcript_to(path)
        } else {
            Ok(())
        }
    }
}

/// Wraps report text in the summarize-and-benchmark instruction, truncating
/// to [`REPORT_CHAR_BUDGET`] characters.
pub fn report_analysis_prompt(text: &str) -> String {
    let truncated: String = text.chars().take(REPORT_CHAR_BUDGET).collect();
    format!(
        "Below is the extracted text from a company's ESG report. \
Please provide:\n\
1. A concise summary of the company's ESG performance.\n\
2. A benchmarking analysis compared to industry standards or leaders (if possible).\n\
3. Key recommendations for improvement.\n\
Here is the ESG report:\n\
-----\n\
{truncated}\n\
-----\n"
    )
}

/// Builds the sustainability-scoring prompt for packaging parameters.
pub fn packaging_score_prompt(spec: &PackagingSpec) -> String {
    format!(
        "Packaging parameters:\n\
- Material: {}\n\
- Weight: {} grams\n\
- Recyclable: {}\n\
- Made from renewable resources: {}\n\n\
Based on these, provide:\n\
1. A sustainability score out of 10 (with justification).\n\
2. A brief assessment and recommendations for improvement.",
        spec.material,
        spec.weight_grams,
        yes_no(spec.recyclable),
        yes_no(spec.renewable),
    )
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

const TRANSCRIPT_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
struct TranscriptFile {
    version: u8,
    #[serde(with = "time::serde::rfc3339")]
    saved_at: OffsetDateTime,
    messages: Vec<ChatMessage>,
}

impl TranscriptFile {
    fn new(messages: &[ChatMessage]) -> Self {
        Self {
            version: TRANSCRIPT_VERSION,
            saved_at: OffsetDateTime::now_utc(),
            messages: messages.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ChunkStream;
    use crate::types::{
        ChatCompletion, ChatCompletionChunk, Choice, ChunkChoice, FinishReason, KnownModel,
        MessageDelta, Role,
    };
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend that replays a script of completions or failures.
    struct ScriptedBackend {
        script: Mutex<VecDeque<Result<String>>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<String>>) -> Self {
            Self {
                script: Mutex::new(script.into_iter().collect()),
            }
        }

        fn next(&self) -> Result<String> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::streaming("script exhausted", None)))
        }
    }

    fn completion_with(text: &str) -> ChatCompletion {
        ChatCompletion {
            id: "chatcmpl-test".to_string(),
            model: Model::Known(KnownModel::Llama33_70bVersatile),
            choices: vec![Choice {
                index: 0,
                message: ChatMessage::assistant(text),
                finish_reason: Some(FinishReason::Stop),
            }],
            usage: Some(Usage::new(10, 5)),
        }
    }

    fn chunk_with(text: &str, finish: Option<FinishReason>) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: "chatcmpl-test".to_string(),
            model: Model::Known(KnownModel::Llama33_70bVersatile),
            choices: vec![ChunkChoice {
                index: 0,
                delta: MessageDelta {
                    role: None,
                    content: Some(text.to_string()),
                },
                finish_reason: finish,
            }],
            usage: None,
        }
    }

    #[async_trait::async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, _params: CompletionParams) -> Result<ChatCompletion> {
            self.next().map(|text| completion_with(&text))
        }

        async fn stream(&self, _params: CompletionParams) -> Result<ChunkStream> {
            let text = self.next()?;
            // One chunk per character exercises accumulation.
            let chunks: Vec<Result<ChatCompletionChunk>> = text
                .chars()
                .map(|c| Ok(chunk_with(&c.to_string(), None)))
                .chain(std::iter::once(Ok(chunk_with(
                    "",
                    Some(FinishReason::Stop),
                ))))
                .collect();
            Ok(futures::stream::iter(chunks).boxed())
        }
    }

    /// Renderer that records everything it is told to display.
    #[derive(Default)]
    struct CaptureRenderer {
        text: String,
        errors: Vec<String>,
        interrupted: bool,
    }

    impl Renderer for CaptureRenderer {
        fn print_text(&mut self, text: &str) {
            self.text.push_str(text);
        }

        fn print_error(&mut self, error: &str) {
            self.errors.push(error.to_string());
        }

        fn print_info(&mut self, _info: &str) {}

        fn finish_response(&mut self) {}

        fn print_interrupted(&mut self) {
            self.interrupted = true;
        }
    }

    fn session_with(script: Vec<Result<String>>) -> ChatSession<ScriptedBackend> {
        ChatSession::new(ScriptedBackend::new(script), ChatConfig::default())
    }

    #[tokio::test]
    async fn alternating_turns_in_order() {
        let mut session = session_with(vec![
            Ok("one".to_string()),
            Ok("two".to_string()),
            Ok("three".to_string()),
        ]);

        for input in ["first", "second", "third"] {
            session.send(input).await.unwrap();
        }

        let messages = session.messages();
        assert_eq!(messages.len(), 6);
        for (i, expected) in ["first", "one", "second", "two", "third", "three"]
            .iter()
            .enumerate()
        {
            let expected_role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(messages[i].role, expected_role);
            assert_eq!(messages[i].content, *expected);
        }
    }

    #[tokio::test]
    async fn failure_leaves_history_intact() {
        let mut session = session_with(vec![
            Ok("fine".to_string()),
            Err(Error::rate_limit("slow down", Some(5))),
            Ok("recovered".to_string()),
        ]);

        session.send("hello").await.unwrap();
        let before: Vec<ChatMessage> = session.messages().to_vec();

        let err = session.send("too fast").await.unwrap_err();
        assert!(err.is_rate_limit());
        assert_eq!(session.messages(), before.as_slice());

        // The session survives the failure.
        session.send("try again").await.unwrap();
        assert_eq!(session.message_count(), 4);
    }

    #[tokio::test]
    async fn streaming_accumulates_and_appends() {
        let mut session = session_with(vec![Ok("Hi!".to_string())]);
        let mut renderer = CaptureRenderer::default();
        let interrupted = AtomicBool::new(false);

        session
            .send_streaming("hello", &mut renderer, &interrupted)
            .await
            .unwrap();

        assert_eq!(renderer.text, "Hi!");
        assert_eq!(session.message_count(), 2);
        assert_eq!(session.messages()[1], ChatMessage::assistant("Hi!"));
    }

    #[tokio::test]
    async fn streaming_failure_rolls_back() {
        let mut session = session_with(vec![Err(Error::service_unavailable("overloaded", None))]);
        let mut renderer = CaptureRenderer::default();
        let interrupted = AtomicBool::new(false);

        let err = session
            .send_streaming("hello", &mut renderer, &interrupted)
            .await
            .unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(session.message_count(), 0);
    }

    #[tokio::test]
    async fn interrupt_before_text_drops_user_turn() {
        let mut session = session_with(vec![Ok("never seen".to_string())]);
        let mut renderer = CaptureRenderer::default();
        let interrupted = AtomicBool::new(true);

        session
            .send_streaming("hello", &mut renderer, &interrupted)
            .await
            .unwrap();

        assert!(renderer.interrupted);
        assert_eq!(session.message_count(), 0);
    }

    #[tokio::test]
    async fn system_prompt_not_stored_in_history() {
        let mut session = session_with(vec![Ok("reply".to_string())]);
        session.send("question").await.unwrap();

        assert!(session
            .messages()
            .iter()
            .all(|message| message.role != Role::System));

        // But the request carries it first.
        let params = session.build_params();
        assert_eq!(params.messages[0].role, Role::System);
        assert_eq!(params.messages[1].content, "question");
    }

    #[tokio::test]
    async fn usage_totals_accumulate() {
        let mut session = session_with(vec![Ok("a".to_string()), Ok("b".to_string())]);
        session.send("one").await.unwrap();
        session.send("two").await.unwrap();

        let stats = session.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.total_prompt_tokens, 20);
        assert_eq!(stats.total_completion_tokens, 10);
        assert_eq!(stats.last_turn_usage, Some(Usage::new(10, 5)));
    }

    #[tokio::test]
    async fn transcript_round_trip() {
        let mut session = session_with(vec![Ok("saved".to_string())]);
        session.send("persist me").await.unwrap();

        let path = std::env::temp_dir().join(format!(
            "gracchus-transcript-{}.json",
            std::process::id()
        ));
        session.save_transcript_to(&path).unwrap();

        let mut restored = session_with(vec![]);
        restored.load_transcript_from(&path).unwrap();
        assert_eq!(restored.messages(), session.messages());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn report_analysis_keeps_history_clean() {
        let path = std::env::temp_dir().join(format!("gracchus-report-{}.txt", std::process::id()));
        std::fs::write(&path, "Emissions fell 12% year over year.").unwrap();

        let mut session = session_with(vec![Ok("summary".to_string())]);
        let analysis = session.analyze_report(&path).await.unwrap();
        assert_eq!(analysis, "summary");
        assert_eq!(session.message_count(), 0);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn report_analysis_rejects_empty_file() {
        let path = std::env::temp_dir().join(format!("gracchus-empty-{}.txt", std::process::id()));
        std::fs::write(&path, "   \n").unwrap();

        let mut session = session_with(vec![Ok("unused".to_string())]);
        let err = session.analyze_report(&path).await.unwrap_err();
        assert!(err.is_bad_request());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn save_failure_does_not_fail_the_exchange() {
        let missing_dir = std::env::temp_dir()
            .join(format!("gracchus-no-such-dir-{}", std::process::id()))
            .join("transcript.json");

        let mut session = session_with(vec![Ok("reply".to_string())]);
        session.set_transcript_path(Some(missing_dir));

        let reply = session.send("hello").await.unwrap();
        assert_eq!(reply, "reply");
        assert_eq!(session.message_count(), 2);

        let err = session.take_save_error().expect("save should have failed");
        assert!(matches!(err, Error::Io { .. }));
        assert!(session.take_save_error().is_none());
    }

    #[tokio::test]
    async fn packaging_assessment_keeps_history_clean() {
        let mut session = session_with(vec![Ok("Score: 7/10".to_string())]);
        let spec = PackagingSpec {
            material: "Glass".to_string(),
            weight_grams: 120.0,
            recyclable: true,
            renewable: false,
        };

        let assessment = session.assess_packaging(&spec).await.unwrap();
        assert_eq!(assessment, "Score: 7/10");
        assert_eq!(session.message_count(), 0);
        assert_eq!(session.stats().total_requests, 1);
    }

    #[test]
    fn score_prompt_lists_parameters() {
        let spec = PackagingSpec {
            material: "Bioplastic".to_string(),
            weight_grams: 12.5,
            recyclable: true,
            renewable: false,
        };
        let prompt = packaging_score_prompt(&spec);
        assert!(prompt.contains("Material: Bioplastic"));
        assert!(prompt.contains("Weight: 12.5 grams"));
        assert!(prompt.contains("Recyclable: Yes"));
        assert!(prompt.contains("Made from renewable resources: No"));
        assert!(prompt.contains("score out of 10"));
    }

    #[test]
    fn report_prompt_truncates_to_budget() {
        let long = "x".repeat(REPORT_CHAR_BUDGET + 500);
        let prompt = report_analysis_prompt(&long);
        let body: String = prompt.chars().filter(|c| *c == 'x').collect();
        assert_eq!(body.len(), REPORT_CHAR_BUDGET);
    }

    #[test]
    fn clear_session() {
        let mut session = session_with(vec![]);
        session.messages.push(ChatMessage::user("test"));
        assert_eq!(session.message_count(), 1);

        session.clear();
        assert_eq!(session.message_count(), 0);
    }

    #[test]
    fn set_model() {
        let mut session = session_with(vec![]);
        assert_eq!(
            session.model(),
            &Model::Known(KnownModel::Llama33_70bVersatile)
        );

        session.set_model(Model::Known(KnownModel::Llama31_8bInstant));
        assert_eq!(
            session.model(),
            &Model::Known(KnownModel::Llama31_8bInstant)
        );
    }

    #[test]
    fn set_system_prompt() {
        let mut session = session_with(vec![]);
        assert!(session.system_prompt().is_some());

        session.set_system_prompt(Some("Be brief".to_string()));
        assert_eq!(session.system_prompt(), Some("Be brief"));

        session.set_system_prompt(None);
        assert!(session.system_prompt().is_none());
    }

    #[test]
    fn stop_sequences_deduplicated() {
        let mut session = session_with(vec![]);
        session.add_stop_sequence("END".to_string());
        session.add_stop_sequence("END".to_string());
        assert_eq!(session.stop_sequences(), ["END".to_string()]);
    }
}
