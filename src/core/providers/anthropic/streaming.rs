//! Anthropic streaming event decoding
//!
//! Anthropic streams typed SSE events; `message_stop` is the
//! end-of-stream sentinel, distinct from transport close.

use serde_json::Value;

/// The stream events this adapter acts on
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StreamEvent {
    /// Text fragment from a `content_block_delta`
    Delta(String),
    /// End-of-stream sentinel (`message_stop`)
    Stop,
    /// In-band error event from the backend
    Error(String),
    /// Anything else (message_start, ping, block boundaries)
    Ignored,
}

/// Decode one `data:` payload into a stream event
pub(crate) fn parse_event(payload: &str) -> Result<StreamEvent, serde_json::Error> {
    let event: Value = serde_json::from_str(payload)?;
    let event_type = event["type"].as_str().unwrap_or("");

    Ok(match event_type {
        "content_block_delta" => {
            let text = event["delta"]["text"].as_str().unwrap_or("");
            if text.is_empty() {
                StreamEvent::Ignored
            } else {
                StreamEvent::Delta(text.to_string())
            }
        }
        "message_stop" => StreamEvent::Stop,
        "error" => {
            let message = event["error"]["message"]
                .as_str()
                .unwrap_or("unknown stream error")
                .to_string();
            StreamEvent::Error(message)
        }
        _ => StreamEvent::Ignored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_events_carry_text() {
        let event = parse_event(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}"#,
        )
        .unwrap();
        assert_eq!(event, StreamEvent::Delta("Hello".to_string()));
    }

    #[test]
    fn message_stop_is_the_sentinel() {
        let event = parse_event(r#"{"type":"message_stop"}"#).unwrap();
        assert_eq!(event, StreamEvent::Stop);
    }

    #[test]
    fn ping_and_boundaries_are_ignored() {
        for payload in [
            r#"{"type":"ping"}"#,
            r#"{"type":"message_start","message":{"id":"msg_1"}}"#,
            r#"{"type":"content_block_stop","index":0}"#,
        ] {
            assert_eq!(parse_event(payload).unwrap(), StreamEvent::Ignored);
        }
    }

    #[test]
    fn error_events_surface_the_message() {
        let event =
            parse_event(r#"{"type":"error","error":{"type":"overloaded_error","message":"busy"}}"#)
                .unwrap();
        assert_eq!(event, StreamEvent::Error("busy".to_string()));
    }
}
