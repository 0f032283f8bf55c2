use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::sse::{LineDecoder, StreamEvent};
use super::{ChatError, ChatMessage};
use crate::core::settings::{ChatSettings, DEFAULT_MODEL};

/// Running assistant text, re-emitted in full after every fragment.
pub type ChatStream = BoxStream<'static, Result<String, ChatError>>;

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Validates settings up front so a missing key never reaches the network.
    pub fn new(settings: &ChatSettings) -> Result<Self, ChatError> {
        let api_key = settings.api_key.trim();
        if api_key.is_empty() {
            return Err(ChatError::Configuration(
                "Set an API key in settings before using the assistant".into(),
            ));
        }
        let base_url = settings.base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ChatError::Configuration("API base URL is empty".into()));
        }
        let model = match settings.model.trim() {
            "" => DEFAULT_MODEL,
            m => m,
        };

        let http = Client::builder()
            .build()
            .map_err(|e| ChatError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `history` and stream the reply. Each item is the whole reply so far.
    ///
    /// Dropping the returned stream drops the response and ends the request.
    pub async fn stream(&self, history: &[ChatMessage]) -> Result<ChatStream, ChatError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": history,
            "stream": true,
        });

        log::info!(
            "Sending {} messages to {} ({})",
            history.len(),
            self.endpoint,
            self.model
        );

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("API request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = api_error_message(status, &text);
            log::warn!("Chat request rejected: {}", message);
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(accumulate(resp.bytes_stream()))
    }
}

/// Human-readable message for a failed request: the body's `error.message`
/// when present, otherwise one built from the status.
pub fn api_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("API request failed: {}", status.as_u16()))
}

struct Accumulator<S> {
    bytes: Pin<Box<S>>,
    decoder: LineDecoder,
    pending: VecDeque<StreamEvent>,
    text: String,
    eof: bool,
    done: bool,
}

/// Turn a raw body stream into a stream of accumulated reply text.
///
/// Ends at `[DONE]` or when the body ends. A body error is yielded once as
/// [`ChatError::Transport`] and ends the stream.
pub fn accumulate<S, B, E>(bytes: S) -> ChatStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = Accumulator {
        bytes: Box::pin(bytes),
        decoder: LineDecoder::new(),
        pending: VecDeque::new(),
        text: String::new(),
        eof: false,
        done: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if st.done {
                return None;
            }
            if let Some(event) = st.pending.pop_front() {
                match event {
                    StreamEvent::Fragment(f) if !f.is_empty() => {
                        st.text.push_str(&f);
                        let snapshot = st.text.clone();
                        return Some((Ok(snapshot), st));
                    }
                    StreamEvent::Fragment(_) | StreamEvent::Skip => continue,
                    StreamEvent::End => {
                        st.done = true;
                        return None;
                    }
                }
            }
            if st.eof {
                return None;
            }
            match st.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = st.decoder.feed(chunk.as_ref());
                    st.pending.extend(events);
                }
                Some(Err(e)) => {
                    log::warn!("Chat stream interrupted: {}", e);
                    st.done = true;
                    return Some((
                        Err(ChatError::Transport(format!("Connection lost: {}", e))),
                        st,
                    ));
                }
                None => {
                    st.eof = true;
                    st.pending.extend(st.decoder.finish());
                }
            }
        }
    })
    .boxed()
}

/// Drive a reply stream to completion, reporting each update.
///
/// On error the partial text is discarded.
pub async fn collect_reply<F>(mut stream: ChatStream, mut on_update: F) -> Result<String, ChatError>
where
    F: FnMut(&str),
{
    let mut reply = String::new();
    while let Some(item) = stream.next().await {
        reply = item?;
        on_update(&reply);
    }
    Ok(reply)
}
