//! Merge of transcript segments with speaker turns.
//!
//! Reconciles two independently computed time-segmented outputs into one
//! ordered, speaker-labeled transcript. The output always has the same
//! count and spans as the input transcript — only the label is added.

use crate::defaults::DEFAULT_SPEAKER;
use crate::diarization::diarizer::SpeakerTurn;
use crate::transcription::segment::TranscriptSegment;
use serde::{Deserialize, Serialize};

/// A transcript segment with its assigned speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSegment {
    pub speaker: String,
    #[serde(flatten)]
    pub segment: TranscriptSegment,
}

/// Output of the merge stage.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTranscript {
    /// Time-ordered labeled segments covering the input transcript's span.
    pub segments: Vec<LabeledSegment>,
    /// Distinct speakers in order of first appearance.
    pub speakers: Vec<String>,
    /// Set when the result is degraded (no usable diarization).
    pub degraded_note: Option<String>,
}

/// Assign one speaker to every transcript segment.
///
/// Each segment gets the speaker of the turn with maximal temporal overlap
/// against the segment's `[start, end)`; ties go to the earlier-starting
/// turn. A segment overlapping no turn takes the nearest turn by midpoint
/// distance. With no turns at all, every segment gets the default speaker
/// and the result is marked degraded.
///
/// A segment whose span truly straddles a speaker change still gets a
/// single label — the majority speaker. Segments are never sub-split;
/// this is a known precision limit of the merge.
pub fn label_segments(segments: &[TranscriptSegment], turns: &[SpeakerTurn]) -> MergedTranscript {
    if turns.is_empty() {
        let labeled = segments
            .iter()
            .map(|segment| LabeledSegment {
                speaker: DEFAULT_SPEAKER.to_string(),
                segment: segment.clone(),
            })
            .collect::<Vec<_>>();
        let speakers = if labeled.is_empty() {
            Vec::new()
        } else {
            vec![DEFAULT_SPEAKER.to_string()]
        };
        return MergedTranscript {
            segments: labeled,
            speakers,
            degraded_note: Some("diarization unavailable, labeled single speaker".to_string()),
        };
    }

    let labeled: Vec<LabeledSegment> = segments
        .iter()
        .map(|segment| LabeledSegment {
            speaker: assign_speaker(segment, turns),
            segment: segment.clone(),
        })
        .collect();

    let mut speakers = Vec::new();
    for labeled_segment in &labeled {
        if !speakers.contains(&labeled_segment.speaker) {
            speakers.push(labeled_segment.speaker.clone());
        }
    }

    MergedTranscript {
        segments: labeled,
        speakers,
        degraded_note: None,
    }
}

/// Pick the speaker for one segment.
fn assign_speaker(segment: &TranscriptSegment, turns: &[SpeakerTurn]) -> String {
    let mut best: Option<(&SpeakerTurn, f64)> = None;
    for turn in turns {
        let overlap = overlap_duration(segment, turn);
        if overlap <= 0.0 {
            continue;
        }
        best = match best {
            // Strictly-greater keeps the earlier turn on equal overlap:
            // turns are ordered by start time.
            Some((_, best_overlap)) if overlap <= best_overlap => best,
            _ => Some((turn, overlap)),
        };
    }

    if let Some((turn, _)) = best {
        return turn.speaker.clone();
    }

    // Gap in diarization coverage: nearest turn by midpoint distance.
    nearest_turn(segment, turns)
        .map(|turn| turn.speaker.clone())
        .unwrap_or_else(|| DEFAULT_SPEAKER.to_string())
}

/// Overlap between `[segment.start, segment.end)` and `[turn.start, turn.end)`.
fn overlap_duration(segment: &TranscriptSegment, turn: &SpeakerTurn) -> f64 {
    let start = segment.start.max(turn.start);
    let end = segment.end.min(turn.end);
    (end - start).max(0.0)
}

fn nearest_turn<'a>(
    segment: &TranscriptSegment,
    turns: &'a [SpeakerTurn],
) -> Option<&'a SpeakerTurn> {
    let midpoint = segment.midpoint();
    turns.iter().min_by(|a, b| {
        let da = (a.midpoint() - midpoint).abs();
        let db = (b.midpoint() - midpoint).abs();
        da.total_cmp(&db)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment::new(start, end, text)
    }

    fn turn(start: f64, end: f64, speaker: &str) -> SpeakerTurn {
        SpeakerTurn::new(start, end, speaker)
    }

    #[test]
    fn output_count_and_spans_match_input() {
        let segments = vec![seg(0.0, 2.0, "a"), seg(2.0, 5.0, "b"), seg(5.0, 6.5, "c")];
        let turns = vec![turn(0.0, 4.0, "A"), turn(4.0, 7.0, "B")];

        let merged = label_segments(&segments, &turns);
        assert_eq!(merged.segments.len(), segments.len());
        for (labeled, original) in merged.segments.iter().zip(segments.iter()) {
            assert_eq!(labeled.segment.start, original.start);
            assert_eq!(labeled.segment.end, original.end);
            assert_eq!(labeled.segment.text, original.text);
        }
        assert!(merged.degraded_note.is_none());
    }

    #[test]
    fn majority_overlap_wins() {
        // Segment [2,5) overlaps A for 1s and B for 2s → B
        let segments = vec![seg(0.0, 2.0, "first"), seg(2.0, 5.0, "second")];
        let turns = vec![turn(0.0, 3.0, "A"), turn(3.0, 5.0, "B")];

        let merged = label_segments(&segments, &turns);
        assert_eq!(merged.segments[0].speaker, "A");
        assert_eq!(merged.segments[1].speaker, "B");
    }

    #[test]
    fn equal_overlap_tie_breaks_to_earlier_turn() {
        // Both turns overlap [1,3) for exactly 1s; A starts earlier
        let segments = vec![seg(1.0, 3.0, "tie")];
        let turns = vec![turn(0.0, 2.0, "A"), turn(2.0, 4.0, "B")];

        let merged = label_segments(&segments, &turns);
        assert_eq!(merged.segments[0].speaker, "A");
    }

    #[test]
    fn uncovered_segment_takes_nearest_turn_by_midpoint() {
        // Segment [10,12) overlaps nothing; B's midpoint (8.0) is closer
        // than A's (1.0)
        let segments = vec![seg(10.0, 12.0, "gap")];
        let turns = vec![turn(0.0, 2.0, "A"), turn(7.0, 9.0, "B")];

        let merged = label_segments(&segments, &turns);
        assert_eq!(merged.segments[0].speaker, "B");
    }

    #[test]
    fn no_turns_degrades_to_single_default_speaker() {
        let segments = vec![seg(0.0, 2.0, "a"), seg(2.0, 4.0, "b")];

        let merged = label_segments(&segments, &[]);
        assert_eq!(merged.segments.len(), 2);
        for labeled in &merged.segments {
            assert_eq!(labeled.speaker, DEFAULT_SPEAKER);
        }
        assert_eq!(merged.speakers, vec![DEFAULT_SPEAKER.to_string()]);
        assert!(merged.degraded_note.is_some());
    }

    #[test]
    fn empty_transcript_with_no_turns_has_no_speakers() {
        let merged = label_segments(&[], &[]);
        assert!(merged.segments.is_empty());
        assert!(merged.speakers.is_empty());
    }

    #[test]
    fn speakers_listed_in_order_of_first_appearance() {
        let segments = vec![
            seg(0.0, 1.0, "a"),
            seg(1.0, 2.0, "b"),
            seg(2.0, 3.0, "c"),
            seg(3.0, 4.0, "d"),
        ];
        let turns = vec![
            turn(0.0, 1.0, "B"),
            turn(1.0, 2.0, "A"),
            turn(2.0, 3.0, "B"),
            turn(3.0, 4.0, "C"),
        ];

        let merged = label_segments(&segments, &turns);
        assert_eq!(merged.speakers, vec!["B", "A", "C"]);
    }

    #[test]
    fn straddling_segment_gets_one_whole_label() {
        // Segment spans a genuine speaker change; it is never sub-split
        let segments = vec![seg(0.0, 10.0, "long monologue interrupted")];
        let turns = vec![turn(0.0, 4.0, "A"), turn(4.0, 10.0, "B")];

        let merged = label_segments(&segments, &turns);
        assert_eq!(merged.segments.len(), 1);
        assert_eq!(merged.segments[0].speaker, "B");
        assert_eq!(merged.segments[0].segment.text, "long monologue interrupted");
    }

    #[test]
    fn zero_length_turn_contributes_no_overlap() {
        let segments = vec![seg(0.0, 2.0, "a")];
        let turns = vec![turn(1.0, 1.0, "Z"), turn(0.0, 2.0, "A")];

        let merged = label_segments(&segments, &turns);
        assert_eq!(merged.segments[0].speaker, "A");
    }

    #[test]
    fn spec_example_two_segments_two_turns() {
        // [0,2) and [2,5) against [0,3)=A, [3,5)=B
        let segments = vec![seg(0.0, 2.0, "first"), seg(2.0, 5.0, "second")];
        let turns = vec![turn(0.0, 3.0, "A"), turn(3.0, 5.0, "B")];

        let merged = label_segments(&segments, &turns);
        // [0,2): full overlap with A
        assert_eq!(merged.segments[0].speaker, "A");
        // [2,5): 1s with A, 2s with B → B
        assert_eq!(merged.segments[1].speaker, "B");
    }

    #[test]
    fn words_survive_the_merge() {
        let segments = vec![seg(0.0, 2.0, "hello world").with_proportional_words()];
        let turns = vec![turn(0.0, 2.0, "A")];

        let merged = label_segments(&segments, &turns);
        assert_eq!(merged.segments[0].segment.words.len(), 2);
    }
}
