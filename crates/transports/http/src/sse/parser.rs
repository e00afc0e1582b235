//! Incremental `text/event-stream` parser
//!
//! Bytes are fed in arbitrary chunks; complete events are returned as soon
//! as their terminating blank line arrives. Handles LF, CR and CRLF line
//! endings (a CRLF split across chunks is not mistaken for two lines), a
//! leading byte order mark, comment lines and the `event`, `data`, `id` and
//! `retry` fields.

use bytes::{Buf, BytesMut};
use std::str::Utf8Error;
use std::time::Duration;

const LF: u8 = b'\n';
const CR: u8 = b'\r';
const BOM: &[u8] = "\u{FEFF}".as_bytes();

/// Event type used when the stream does not name one
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// One dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type, `"message"` unless an `event:` field set it
    pub event: String,
    /// `data:` lines joined with `\n`
    pub data: String,
    /// Last event id in effect when the event was dispatched
    pub id: String,
}

/// Push parser for one connection's body
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: BytesMut,
    bom_checked: bool,
    event: String,
    data: Option<String>,
    last_event_id: String,
    saw_id: bool,
    retry: Option<Duration>,
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id to resume from, as last set by an `id:` field
    pub fn last_event_id(&self) -> &str {
        &self.last_event_id
    }

    /// Id to resume from, or `None` if this stream never sent an `id:` field
    ///
    /// An empty `id:` field clears the id and yields `Some("")`.
    pub fn id_update(&self) -> Option<&str> {
        self.saw_id.then_some(self.last_event_id.as_str())
    }

    /// Reconnection delay requested by the server, if any
    pub fn reconnect_time(&self) -> Option<Duration> {
        self.retry
    }

    /// Append `chunk` and return every event it completes, in order
    ///
    /// A line that is not valid UTF-8 is dropped and reported in place.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<SseEvent, Utf8Error>> {
        self.buffer.extend_from_slice(chunk);

        if !self.bom_checked {
            if self.buffer.len() < BOM.len() && BOM.starts_with(&self.buffer) {
                return Vec::new();
            }
            if self.buffer.starts_with(BOM) {
                self.buffer.advance(BOM.len());
            }
            self.bom_checked = true;
        }

        let mut out = Vec::new();
        while let Some((line_end, next_start)) = find_eol(&self.buffer) {
            let line = self.buffer.split_to(line_end).freeze();
            self.buffer.advance(next_start - line_end);

            match std::str::from_utf8(&line) {
                Ok(line) => {
                    if let Some(event) = self.process_line(line) {
                        out.push(Ok(event));
                    }
                }
                Err(e) => out.push(Err(e)),
            }
        }
        out
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = value.to_string(),
            "data" => match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            },
            "id" => {
                if !value.contains('\0') {
                    self.last_event_id = value.to_string();
                    self.saw_id = true;
                }
            }
            "retry" => {
                if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(ms) = value.parse() {
                        self.retry = Some(Duration::from_millis(ms));
                    }
                }
            }
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = std::mem::take(&mut self.event);
        let data = self.data.take()?;

        Some(SseEvent {
            event: if event.is_empty() {
                DEFAULT_EVENT_TYPE.to_string()
            } else {
                event
            },
            data,
            id: self.last_event_id.clone(),
        })
    }
}

/// `(line_end, next_line_start)` of the first complete line
///
/// A trailing lone CR needs more input to tell it apart from CRLF.
fn find_eol(bytes: &[u8]) -> Option<(usize, usize)> {
    let pos = bytes.iter().position(|&b| b == CR || b == LF)?;
    if bytes[pos] == LF {
        return Some((pos, pos + 1));
    }
    match bytes.get(pos + 1) {
        None => None,
        Some(&LF) => Some((pos, pos + 2)),
        Some(_) => Some((pos, pos + 1)),
    }
}
