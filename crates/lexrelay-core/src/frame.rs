//! Wire frames and the incremental line decoder

use serde::{Deserialize, Serialize};

use crate::error::FrameParseError;

/// Prefix that marks a line as a candidate frame.
pub const DATA_PREFIX: &str = "data: ";

/// One decoded protocol record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamFrame {
    TextDelta {
        #[serde(default)]
        delta: String,
    },
    /// Any other record type, tolerated and ignored.
    #[serde(other)]
    Unknown,
}

impl StreamFrame {
    pub fn text_delta(delta: impl Into<String>) -> Self {
        StreamFrame::TextDelta {
            delta: delta.into(),
        }
    }

    /// The delta to fold, if this frame carries non-empty text.
    pub fn delta(&self) -> Option<&str> {
        match self {
            StreamFrame::TextDelta { delta } if !delta.is_empty() => Some(delta),
            _ => None,
        }
    }

    /// Encode as a complete `data: {...}\n` line.
    pub fn to_line(&self) -> String {
        let record = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("{}{}\n", DATA_PREFIX, record)
    }
}

/// Parse one complete line.
///
/// `None` for lines that are not frames at all (comments, keep-alives,
/// blank separators, other SSE fields).
pub fn parse_line(line: &str) -> Option<Result<StreamFrame, FrameParseError>> {
    let record = line.strip_prefix(DATA_PREFIX)?;
    Some(serde_json::from_str(record).map_err(FrameParseError::from))
}

/// Splits a chunked byte stream into frames.
///
/// Holds the trailing partial line between calls. The carry-over is kept as
/// raw bytes and only decoded once a full line is present, so a multi-byte
/// character split across two chunks decodes the same as an unsplit one.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    carry: Vec<u8>,
    skipped: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every frame completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamFrame> {
        self.carry.extend_from_slice(chunk);
        let Some(last_newline) = self.carry.iter().rposition(|byte| *byte == b'\n') else {
            return Vec::new();
        };

        let complete: Vec<u8> = self.carry.drain(..=last_newline).collect();
        complete
            .split(|byte| *byte == b'\n')
            .filter_map(|line| self.decode_line(line))
            .collect()
    }

    /// Flush the final fragment at end of stream.
    pub fn finish(&mut self) -> Vec<StreamFrame> {
        let rest = std::mem::take(&mut self.carry);
        if rest.is_empty() {
            return Vec::new();
        }
        self.decode_line(&rest).into_iter().collect()
    }

    /// Bytes held back waiting for a newline.
    pub fn pending(&self) -> usize {
        self.carry.len()
    }

    /// Candidate lines dropped because their record did not parse.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<StreamFrame> {
        let text = String::from_utf8_lossy(raw);
        let line = text.strip_suffix('\r').unwrap_or(text.as_ref());
        match parse_line(line)? {
            Ok(frame) => Some(frame),
            Err(err) => {
                self.skipped += 1;
                tracing::debug!(error = %err, "Skipping malformed frame");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deltas(frames: &[StreamFrame]) -> String {
        frames.iter().filter_map(StreamFrame::delta).collect()
    }

    #[test]
    fn test_parse_text_delta() {
        let frame = parse_line(r#"data: {"type":"text-delta","delta":"Hi"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(frame, StreamFrame::text_delta("Hi"));
    }

    #[test]
    fn test_unknown_type_is_tolerated() {
        let frame = parse_line(r#"data: {"type":"finish","reason":"stop"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(frame, StreamFrame::Unknown);
        assert_eq!(frame.delta(), None);
    }

    #[test]
    fn test_non_data_lines_are_not_candidates() {
        assert!(parse_line(": keep-alive").is_none());
        assert!(parse_line("").is_none());
        assert!(parse_line("event: message").is_none());
        assert!(parse_line(r#"data:{"type":"text-delta","delta":"x"}"#).is_none());
    }

    #[test]
    fn test_malformed_record_is_an_error() {
        assert!(parse_line("data: not-json").unwrap().is_err());
    }

    #[test]
    fn test_empty_delta_is_not_folded() {
        let frame = parse_line(r#"data: {"type":"text-delta","delta":""}"#)
            .unwrap()
            .unwrap();
        assert_eq!(frame.delta(), None);
        let frame = parse_line(r#"data: {"type":"text-delta"}"#).unwrap().unwrap();
        assert_eq!(frame.delta(), None);
    }

    #[test]
    fn test_to_line_round_trips_through_parser() {
        let line = StreamFrame::text_delta("a \"quoted\"\nline").to_line();
        assert!(line.ends_with('\n'));
        let frame = parse_line(line.trim_end_matches('\n')).unwrap().unwrap();
        assert_eq!(frame.delta(), Some("a \"quoted\"\nline"));
    }

    #[test]
    fn test_decoder_holds_partial_line() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(br#"data: {"type":"text-de"#).is_empty());
        assert!(decoder.pending() > 0);
        let frames = decoder.push(b"lta\",\"delta\":\"Hello\"}\n");
        assert_eq!(deltas(&frames), "Hello");
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_decoder_emits_multiple_lines_in_order() {
        let mut decoder = FrameDecoder::new();
        let chunk = format!(
            "{}{}{}",
            StreamFrame::text_delta("a").to_line(),
            StreamFrame::text_delta("b").to_line(),
            StreamFrame::text_delta("c").to_line()
        );
        assert_eq!(deltas(&decoder.push(chunk.as_bytes())), "abc");
    }

    #[test]
    fn test_decoder_finish_processes_unterminated_tail() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(br#"data: {"type":"text-delta","delta":"tail"}"#).is_empty());
        assert_eq!(deltas(&decoder.finish()), "tail");
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_decoder_handles_crlf() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(b"data: {\"type\":\"text-delta\",\"delta\":\"x\"}\r\n\r\n");
        assert_eq!(deltas(&frames), "x");
    }

    #[test]
    fn test_decoder_counts_skipped_lines() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(b"data: not-json\ndata: {\"type\":\"text-delta\",\"delta\":\"ok\"}\n");
        assert_eq!(deltas(&frames), "ok");
        assert_eq!(decoder.skipped(), 1);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let line = StreamFrame::text_delta("défense").to_line();
        let bytes = line.as_bytes();
        let split = line.find('é').unwrap() + 1;

        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        assert_eq!(deltas(&decoder.push(&bytes[split..])), "défense");
    }
}
