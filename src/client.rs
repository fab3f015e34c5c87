use std::env;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::Stream;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::observability;
use crate::types::{ChatCompletion, ChatCompletionChunk, CompletionParams};

const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for Groq's OpenAI-compatible chat-completions API.
#[derive(Debug, Clone)]
pub struct Groq {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl Groq {
    /// Create a new Groq client.
    ///
    /// The API key can be provided directly or read from the GROQ_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var("GROQ_API_KEY").map_err(|_| {
                Error::authentication(
                    "API key not provided and GROQ_API_KEY environment variable not set",
                )
            })?,
        };

        let base_url = match base_url {
            Some(base_url) => {
                // Reject unusable endpoints before the first request is made.
                Url::parse(&base_url)?;
                if base_url.ends_with('/') {
                    base_url
                } else {
                    format!("{base_url}/")
                }
            }
            None => DEFAULT_API_URL.to_string(),
        };

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
        })
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::authentication("API key contains invalid header characters"))?;
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        // Get headers we might need for error processing
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        // Try to parse error response body
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            #[serde(rename = "type")]
            error_type: Option<String>,
            message: Option<String>,
            param: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        // Try to parse as JSON first
        let parsed_error = serde_json::from_str::<ErrorResponse>(&error_body).ok();
        let error_type = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.error_type.clone());
        let error_message = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| error_body.clone());
        let error_param = parsed_error
            .as_ref()
            .and_then(|e| e.error.as_ref())
            .and_then(|e| e.param.clone());

        // Map HTTP status code to appropriate error type
        match status_code {
            400 => Error::bad_request(error_message, error_param),
            401 => Error::authentication(error_message),
            403 => Error::permission(error_message),
            404 => Error::not_found(error_message),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message, request_id),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_type, error_message, request_id),
        }
    }

    async fn post_completions(&self, params: &CompletionParams, accept: &'static str) -> Result<Response> {
        let url = format!("{}chat/completions", self.base_url);

        let mut headers = self.default_headers()?;
        headers.insert(header::ACCEPT, HeaderValue::from_static(accept));

        observability::CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(params)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;
        observability::CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        Ok(response)
    }

    /// Send the conversation to the API and get a non-streaming completion.
    pub async fn complete(&self, mut params: CompletionParams) -> Result<ChatCompletion> {
        params.stream = false;

        let response = self.post_completions(&params, "application/json").await?;

        response.json::<ChatCompletion>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Send the conversation to the API and get a streaming completion.
    ///
    /// Returns a stream of ChatCompletionChunk objects that can be processed
    /// incrementally.
    pub async fn stream(
        &self,
        mut params: CompletionParams,
    ) -> Result<impl Stream<Item = Result<ChatCompletionChunk>> + 'static> {
        params.stream = true;

        let response = self.post_completions(&params, "text/event-stream").await?;

        // Get the byte stream from the response
        let stream = response.bytes_stream();

        // Create an SSE processor
        let chunk_stream = process_sse(stream);

        Ok(chunk_stream)
    }
}

/// Process a stream of bytes into a stream of chat-completion chunks
fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<ChatCompletionChunk>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result.map_err(|e| {
            observability::STREAM_ERRORS.click();
            Error::streaming(format!("Error in HTTP stream: {}", e), Some(Box::new(e)))
        })
    });

    // Use a state machine to process the SSE stream
    let buffer = String::new();

    stream::unfold(
        (stream, buffer),
        move |(mut stream, mut buffer)| async move {
            loop {
                // First check if we have a complete event in the buffer
                match extract_event(&buffer) {
                    Extracted::Chunk(chunk, remaining) => {
                        observability::STREAM_EVENTS.click();
                        buffer = remaining;
                        return Some((chunk, (stream, buffer)));
                    }
                    Extracted::Done => {
                        return None;
                    }
                    Extracted::Skip(remaining) => {
                        buffer = remaining;
                        continue;
                    }
                    Extracted::NeedMore => {}
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => buffer.push_str(&text),
                        Err(e) => {
                            return Some((
                                Err(Error::encoding(
                                    format!("Invalid UTF-8 in stream: {}", e),
                                    Some(Box::new(e)),
                                )),
                                (stream, buffer),
                            ));
                        }
                    },
                    Some(Err(e)) => {
                        return Some((Err(e), (stream, buffer)));
                    }
                    None => {
                        // End of stream
                        if !buffer.is_empty() {
                            buffer.push_str("\n\n");
                            if let Extracted::Chunk(chunk, _) = extract_event(&buffer) {
                                buffer = String::new();
                                return Some((chunk, (stream, buffer)));
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Result of scanning the SSE buffer for one complete event.
enum Extracted {
    /// A complete event was found, with the remaining buffer contents.
    Chunk(Result<ChatCompletionChunk>, String),
    /// The `[DONE]` terminator was found.
    Done,
    /// A comment or keep-alive event; nothing to emit.
    Skip(String),
    /// The buffer holds no complete event yet.
    NeedMore,
}

/// Extract a complete SSE event from a buffer string
fn extract_event(buffer: &str) -> Extracted {
    // Simple SSE parsing - each event is delimited by double newlines
    let parts: Vec<&str> = buffer.splitn(2, "\n\n").collect();
    if parts.len() != 2 {
        return Extracted::NeedMore;
    }

    let event_text = parts[0];
    let rest = parts[1].to_string();

    // Process the event data
    let mut data = None;
    for line in event_text.lines() {
        if line.starts_with("data: ") {
            data = Some(line.trim_start_matches("data: "));
        }
    }

    // Process the data field
    match data {
        Some("[DONE]") => {
            // End of stream marker
            Extracted::Done
        }
        Some(json_str) => {
            // Parse the JSON
            match serde_json::from_str::<ChatCompletionChunk>(json_str) {
                Ok(chunk) => Extracted::Chunk(Ok(chunk), rest),
                Err(e) => {
                    observability::STREAM_ERRORS.click();
                    Extracted::Chunk(
                        Err(Error::serialization(
                            format!("Failed to parse event JSON: {}", e),
                            Some(Box::new(e)),
                        )),
                        rest,
                    )
                }
            }
        }
        None => {
            // Comment or keep-alive event
            Extracted::Skip(rest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::pin_mut;

    #[test]
    fn client_creation() {
        // Test with explicit API key
        let client = Groq::new(Some("test-key".to_string())).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        // Test with custom options
        let client = Groq::with_options(
            Some("test-key".to_string()),
            Some("https://custom-api.example.com/".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, "https://custom-api.example.com/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = Groq::with_options(
            Some("test-key".to_string()),
            Some("https://custom-api.example.com/v1".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(client.base_url, "https://custom-api.example.com/v1/");
    }

    #[test]
    fn invalid_base_url_rejected() {
        let result = Groq::with_options(
            Some("test-key".to_string()),
            Some("not a url".to_string()),
            None,
        );
        assert!(matches!(result, Err(Error::Url { .. })));
    }

    fn byte_stream(
        frames: Vec<&'static str>,
    ) -> impl Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin {
        stream::iter(
            frames
                .into_iter()
                .map(|frame| Ok(Bytes::from_static(frame.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn extract_event_needs_complete_frame() {
        assert!(matches!(
            extract_event("data: {\"id\""),
            Extracted::NeedMore
        ));
    }

    #[test]
    fn extract_event_done_marker() {
        assert!(matches!(extract_event("data: [DONE]\n\n"), Extracted::Done));
    }

    #[tokio::test]
    async fn sse_stream_parses_chunks() {
        let frames = vec![
            "data: {\"id\":\"c1\",\"model\":\"llama-3.3-70b-versatile\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"Hel\"}}]}\n\n",
            "data: {\"id\":\"c1\",\"model\":\"llama-3.3-70b-versatile\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"},\"finish_reason\":\"stop\"}]}\n\ndata: [DONE]\n\n",
        ];
        let stream = process_sse(byte_stream(frames));
        pin_mut!(stream);

        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.unwrap();
            if let Some(delta) = chunk.delta_text() {
                text.push_str(delta);
            }
        }
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn sse_stream_handles_split_frames() {
        // One event delivered across two reads.
        let frames = vec![
            "data: {\"id\":\"c1\",\"model\":\"m\",\"choices\":[{\"index\":0,",
            "\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\n",
        ];
        let stream = process_sse(byte_stream(frames));
        pin_mut!(stream);

        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(chunk.delta_text(), Some("Hi"));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn sse_stream_surfaces_bad_json() {
        let frames = vec!["data: {not json}\n\ndata: [DONE]\n\n"];
        let stream = process_sse(byte_stream(frames));
        pin_mut!(stream);

        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(Error::Serialization { .. })));
        assert!(stream.next().await.is_none());
    }
}
