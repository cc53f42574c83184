//! Data types produced by the transcription stage.

use serde::{Deserialize, Serialize};

/// A word-level sub-segment inside a transcript segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordSpan {
    pub start: f64,
    pub end: f64,
    pub word: String,
}

/// One time-stamped transcript segment, immutable once produced.
///
/// `words` always exists; it is empty unless word timestamps were
/// requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds; `end >= start`.
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub words: Vec<WordSpan>,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words: Vec::new(),
        }
    }

    /// Attach word spans derived proportionally from this segment's span.
    ///
    /// Each word's width is proportional to its character count, so spans
    /// are ordered, non-overlapping, and contained in the parent span.
    pub fn with_proportional_words(mut self) -> Self {
        let words: Vec<&str> = self.text.split_whitespace().collect();
        if words.is_empty() {
            return self;
        }
        let total_chars: usize = words.iter().map(|w| w.chars().count()).sum();
        if total_chars == 0 {
            return self;
        }

        let span = self.end - self.start;
        let mut cursor = self.start;
        let mut spans = Vec::with_capacity(words.len());
        for word in &words {
            let width = span * word.chars().count() as f64 / total_chars as f64;
            spans.push(WordSpan {
                start: cursor,
                end: (cursor + width).min(self.end),
                word: (*word).to_string(),
            });
            cursor += width;
        }
        // Float accumulation may stop short of the segment end
        if let Some(last) = spans.last_mut() {
            last.end = self.end;
        }

        self.words = spans;
        self
    }

    /// Midpoint of the segment span in seconds.
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Full output of the transcription stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Ordered, non-overlapping segments.
    pub segments: Vec<TranscriptSegment>,
    /// Detected (or declared) language code.
    pub language: String,
    /// Total audio duration in seconds.
    pub duration: f64,
}

impl Transcript {
    /// Concatenated segment text.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_segment_has_empty_words() {
        let seg = TranscriptSegment::new(0.0, 2.0, "hello world");
        assert!(seg.words.is_empty());
        assert_eq!(seg.duration(), 2.0);
        assert_eq!(seg.midpoint(), 1.0);
    }

    #[test]
    fn proportional_words_partition_the_span() {
        let seg = TranscriptSegment::new(0.0, 2.0, "hi there friend").with_proportional_words();
        assert_eq!(seg.words.len(), 3);
        assert_eq!(seg.words[0].start, 0.0);
        assert_eq!(seg.words.last().unwrap().end, 2.0);

        // Ordered and non-overlapping
        for pair in seg.words.windows(2) {
            assert!(pair[0].end <= pair[1].start + 1e-9);
        }
        // Contained in the parent span
        for w in &seg.words {
            assert!(w.start >= seg.start && w.end <= seg.end);
        }
    }

    #[test]
    fn proportional_words_scale_with_length() {
        let seg = TranscriptSegment::new(0.0, 10.0, "a abcdefghi").with_proportional_words();
        let first = seg.words[0].end - seg.words[0].start;
        let second = seg.words[1].end - seg.words[1].start;
        assert!(second > first * 5.0);
    }

    #[test]
    fn proportional_words_of_empty_text_is_noop() {
        let seg = TranscriptSegment::new(0.0, 2.0, "   ").with_proportional_words();
        assert!(seg.words.is_empty());
    }

    #[test]
    fn transcript_text_joins_segments() {
        let transcript = Transcript {
            segments: vec![
                TranscriptSegment::new(0.0, 1.0, " hello "),
                TranscriptSegment::new(1.0, 2.0, ""),
                TranscriptSegment::new(2.0, 3.0, "world"),
            ],
            language: "en".to_string(),
            duration: 3.0,
        };
        assert_eq!(transcript.text(), "hello world");
    }

    #[test]
    fn serde_roundtrip_keeps_words_field() {
        let seg = TranscriptSegment::new(0.5, 1.5, "hey").with_proportional_words();
        let json = serde_json::to_string(&seg).unwrap();
        let back: TranscriptSegment = serde_json::from_str(&json).unwrap();
        assert_eq!(seg, back);

        // The field deserializes as empty when absent, never missing
        let bare: TranscriptSegment =
            serde_json::from_str(r#"{"start":0.0,"end":1.0,"text":"x"}"#).unwrap();
        assert!(bare.words.is_empty());
    }
}
