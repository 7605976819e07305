//! Chat-completions wire format.
//!
//! Request bodies for the planning and synthesis calls, parsing of the
//! planning response, and incremental decoding of the synthesis SSE stream.
//!
//! # Stream decoding
//!
//! ```text
//! bytes ─▶ SseDecoder ─▶ data payloads ─▶ StreamAssembler ─▶ SynthesisEvent
//!                                           ├─ delta.content      → Delta
//!                                           ├─ delta.tool_calls   → buffered fragments
//!                                           └─ [DONE] / finish    → Structured, Completed
//! ```

use planner_domain::{Message, SynthesisEvent, ToolInvocation};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::warn;

/// Convert a provider-neutral tool schema (`name`, `description`,
/// `input_schema`) to the chat-completions `tools[]` entry.
pub fn function_tool(schema: &Value) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": schema["name"],
            "description": schema["description"],
            "parameters": schema["input_schema"],
        }
    })
}

/// System prompt followed by the conversation, in wire form
pub fn chat_messages(system_prompt: &str, messages: &[Message]) -> Vec<Value> {
    std::iter::once(json!({ "role": "system", "content": system_prompt }))
        .chain(
            messages
                .iter()
                .map(|m| json!({ "role": m.role.as_str(), "content": m.content })),
        )
        .collect()
}

/// Extract the requested tool calls from a non-streamed planning response.
///
/// Calls whose arguments are not a JSON object are skipped with a warning;
/// the rest of the plan is kept.
pub fn parse_tool_calls(response: &Value) -> Result<Vec<ToolInvocation>, String> {
    let message = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| "response has no choices[0].message".to_string())?;

    let Some(calls) = message.get("tool_calls").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut invocations = Vec::with_capacity(calls.len());
    for call in calls {
        let Some(name) = call
            .get("function")
            .and_then(|f| f.get("name"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        let raw = call
            .get("function")
            .and_then(|f| f.get("arguments"))
            .and_then(Value::as_str)
            .unwrap_or("{}");
        match parse_arguments(raw) {
            Some(arguments) => {
                invocations.push(ToolInvocation::requested(name).with_arguments(arguments))
            }
            None => warn!("Skipping tool call {} with malformed arguments", name),
        }
    }
    Ok(invocations)
}

fn parse_arguments(raw: &str) -> Option<BTreeMap<String, Value>> {
    if raw.trim().is_empty() {
        return Some(BTreeMap::new());
    }
    match serde_json::from_str::<Value>(raw).ok()? {
        Value::Object(map) => Some(map.into_iter().collect()),
        _ => None,
    }
}

/// Splits a byte stream into SSE `data:` payloads.
///
/// Chunks may end inside a multi-byte character; the incomplete tail is
/// held back until the next chunk completes it.
#[derive(Default)]
pub struct SseDecoder {
    buffer: String,
    pending: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes from the response body
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let valid = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_some() => {
                // Invalid sequence rather than a cut-off one
                let text = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                return self.push(&text);
            }
            Err(e) => e.valid_up_to(),
        };
        let rest = self.pending.split_off(valid);
        let complete = std::mem::replace(&mut self.pending, rest);
        match String::from_utf8(complete) {
            Ok(text) => self.push(&text),
            Err(_) => Vec::new(),
        }
    }

    /// Feed a chunk, returning every payload completed by it
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(&chunk.replace("\r\n", "\n"));
        let mut payloads = Vec::new();
        while let Some(end) = self.buffer.find("\n\n") {
            let block: String = self.buffer.drain(..end + 2).collect();
            if let Some(data) = data_of(&block) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Payload left in the buffer when the connection closes
    pub fn finish(&mut self) -> Option<String> {
        let block = std::mem::take(&mut self.buffer);
        data_of(&block)
    }
}

fn data_of(block: &str) -> Option<String> {
    let lines: Vec<&str> = block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Turns decoded stream payloads into [`SynthesisEvent`]s.
///
/// Text is forwarded as it arrives; function-call arguments arrive in
/// fragments keyed by call index and are only parsed once the stream ends.
#[derive(Default)]
pub struct StreamAssembler {
    text: String,
    calls: BTreeMap<u64, (String, String)>,
    finished: bool,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events produced by one payload. `[DONE]` yields the closing events.
    pub fn accept(&mut self, payload: &str) -> Vec<SynthesisEvent> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Vec::new();
        }
        if payload == "[DONE]" {
            return self.finish();
        }

        let value: Value = match serde_json::from_str(payload) {
            Ok(v) => v,
            Err(e) => {
                self.finished = true;
                return vec![SynthesisEvent::Error(format!("invalid stream JSON: {}", e))];
            }
        };
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
        {
            self.finished = true;
            return vec![SynthesisEvent::Error(message.to_string())];
        }

        let mut events = Vec::new();
        let choices = value.get("choices").and_then(Value::as_array);
        for choice in choices.into_iter().flatten() {
            let Some(delta) = choice.get("delta") else {
                continue;
            };
            if let Some(content) = delta.get("content").and_then(Value::as_str)
                && !content.is_empty()
            {
                self.text.push_str(content);
                events.push(SynthesisEvent::Delta(content.to_string()));
            }
            let tool_calls = delta.get("tool_calls").and_then(Value::as_array);
            for call in tool_calls.into_iter().flatten() {
                let index = call.get("index").and_then(Value::as_u64).unwrap_or(0);
                let entry = self.calls.entry(index).or_default();
                let function = call.get("function");
                if let Some(name) = function
                    .and_then(|f| f.get("name"))
                    .and_then(Value::as_str)
                {
                    entry.0.push_str(name);
                }
                if let Some(fragment) = function
                    .and_then(|f| f.get("arguments"))
                    .and_then(Value::as_str)
                {
                    entry.1.push_str(fragment);
                }
            }
        }
        events
    }

    /// Closing events: the structured payload (if any) then `Completed`.
    ///
    /// Idempotent; a second call yields nothing.
    pub fn finish(&mut self) -> Vec<SynthesisEvent> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;

        let mut events = Vec::new();
        let structured = self
            .calls
            .values()
            .find(|(name, _)| name == planner_domain::ANSWER_FUNCTION_NAME)
            .or_else(|| self.calls.values().next());
        if let Some((name, raw)) = structured {
            match serde_json::from_str::<Value>(raw) {
                Ok(value @ Value::Object(_)) => events.push(SynthesisEvent::Structured(value)),
                _ => warn!("Discarding unparseable {} arguments", name),
            }
        }
        events.push(SynthesisEvent::Completed(self.text.clone()));
        events
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
