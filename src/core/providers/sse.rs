//! Server-sent-event reassembly shared by all streaming adapters
//!
//! Network reads split SSE events at arbitrary byte boundaries,
//! including mid-character for multi-byte UTF-8; the buffer holds raw
//! bytes and only decodes complete lines, carrying partial tails
//! across reads.

/// Accumulates raw network chunks and yields complete SSE lines
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network read; returns every line completed by it.
    ///
    /// Splitting happens on raw `b'\n'`, which cannot occur inside a
    /// multi-byte UTF-8 sequence, so a character torn across reads is
    /// whole again by the time its line is decoded.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            lines.push(String::from_utf8_lossy(&line[..newline_pos]).trim().to_string());
        }
        lines
    }
}

/// Extract the payload of a `data:` line; comments and event-name
/// lines yield `None`
pub fn data_payload(line: &str) -> Option<&str> {
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    line.strip_prefix("data:").map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reassembles_lines_split_across_reads() {
        // reqwest hands the body over as `Bytes`, split wherever the
        // socket read happened to end
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(&bytes::Bytes::from_static(b"data: {\"te")).is_empty());
        let lines = buffer.push(&bytes::Bytes::from_static(b"xt\":\"hi\"}\n\n"));
        assert_eq!(lines, vec!["data: {\"text\":\"hi\"}".to_string(), String::new()]);
    }

    #[test]
    fn multibyte_character_split_across_reads_stays_intact() {
        // "ش" is 0xD8 0xB4; a TCP read can end between the two bytes
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(b"data: \xD8").is_empty());
        let lines = buffer.push(b"\xB4\n");
        assert_eq!(lines, vec!["data: ش".to_string()]);
    }

    #[test]
    fn yields_multiple_lines_from_one_read() {
        let mut buffer = SseLineBuffer::new();
        let lines = buffer.push(b"data: a\n\ndata: b\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "data: a");
        assert_eq!(lines[2], "data: b");
    }

    #[test]
    fn keeps_partial_tail() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(b"data: [DO").is_empty());
        let lines = buffer.push(b"NE]\n");
        assert_eq!(lines, vec!["data: [DONE]".to_string()]);
    }

    #[test]
    fn data_payload_strips_prefix() {
        assert_eq!(data_payload("data: [DONE]"), Some("[DONE]"));
        assert_eq!(data_payload("data:{\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(data_payload("event: message_start"), None);
        assert_eq!(data_payload(": keep-alive"), None);
        assert_eq!(data_payload(""), None);
    }
}
