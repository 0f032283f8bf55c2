use serde_json::Value;

const DATA_PREFIX: &str = "data: ";
const DONE_TOKEN: &str = "[DONE]";

/// What a single line of the completion stream contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Text to append. May be empty when a chunk carries no content.
    Fragment(String),
    /// Not a data line, or a data line that didn't parse.
    Skip,
    /// The server finished the stream.
    End,
}

pub fn decode_line(line: &str) -> StreamEvent {
    let line = line.trim_end_matches('\r');
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return StreamEvent::Skip;
    };
    if payload.trim() == DONE_TOKEN {
        return StreamEvent::End;
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(chunk) => {
            let content = chunk["choices"]
                .as_array()
                .and_then(|choices| choices.first())
                .and_then(|choice| choice["delta"]["content"].as_str())
                .unwrap_or_default();
            StreamEvent::Fragment(content.to_string())
        }
        Err(e) => {
            log::debug!("Skipping malformed stream chunk: {}", e);
            StreamEvent::Skip
        }
    }
}

/// Splits a byte stream into lines, holding partial lines across chunks.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: Vec<u8>,
    /// Bytes of `buf` already known to hold no newline.
    scanned: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and decode every line it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();
        let mut start = 0;
        let mut cursor = self.scanned;
        while let Some(offset) = self.buf[cursor..].iter().position(|&b| b == b'\n') {
            let end = cursor + offset;
            let text = String::from_utf8_lossy(&self.buf[start..end]);
            if !text.trim().is_empty() {
                events.push(decode_line(&text));
            }
            start = end + 1;
            cursor = start;
        }
        // Only the trailing partial line is kept.
        self.buf.drain(..start);
        self.scanned = self.buf.len();
        events
    }

    /// Decode whatever is left once the body ends without a final newline.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        self.scanned = 0;
        let text = String::from_utf8_lossy(&rest);
        if text.trim().is_empty() {
            None
        } else {
            Some(decode_line(&text))
        }
    }
}
