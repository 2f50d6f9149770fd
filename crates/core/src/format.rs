use crate::types::{SentimentScores, SummaryResult, TimestampedSegment};

/// Format whole seconds as a MM:SS timestamp. Minutes are not capped at 59.
pub fn format_timestamp(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Format transcript segments with timestamps
pub fn format_segments(segments: &[TimestampedSegment]) -> String {
    segments
        .iter()
        .map(|seg| format!("[{}] {}", format_timestamp(seg.start), seg.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn sentiment_label(scores: &SentimentScores) -> &'static str {
    if scores.compound >= 0.05 {
        "positive"
    } else if scores.compound <= -0.05 {
        "negative"
    } else {
        "neutral"
    }
}

pub fn format_summary_readable(result: &SummaryResult) -> String {
    let mut output = String::new();

    output.push_str("## Summary\n\n");
    output.push_str(result.summary.trim());
    output.push_str("\n\n");

    if !result.transcript_filtered.is_empty() {
        output.push_str("## Keyword mentions\n\n");
        for (chunk, record) in result
            .transcript_filtered
            .iter()
            .zip(result.sentiment_analysis.iter())
        {
            let start = format_timestamp(chunk.start);
            let end = format_timestamp(chunk.end);
            output.push_str(&format!(
                "### [{}-{}] {} ({:+.2})\n\n",
                start,
                end,
                sentiment_label(&record.sentiment),
                record.sentiment.compound
            ));
            output.push_str(&format!("{}\n\n", chunk.text));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContextChunk, SentimentRecord};

    #[test]
    fn timestamps_pad_and_overflow_past_an_hour() {
        assert_eq!(format_timestamp(0), "00:00");
        assert_eq!(format_timestamp(65), "01:05");
        assert_eq!(format_timestamp(3725), "62:05");
    }

    #[test]
    fn segments_are_listed_one_per_line() {
        let segments = vec![
            TimestampedSegment::new(0, 4, " Hello there. "),
            TimestampedSegment::new(61, 63, "Bye."),
        ];

        assert_eq!(format_segments(&segments), "[00:00] Hello there.\n[01:01] Bye.");
    }

    #[test]
    fn readable_summary_lists_mentions_with_sentiment() {
        let result = SummaryResult {
            summary: "A talk about Rust.".into(),
            transcript_filtered: vec![ContextChunk {
                start: 10,
                end: 20,
                text: "I love Rust.".into(),
            }],
            sentiment_analysis: vec![SentimentRecord {
                text: "I love Rust.".into(),
                sentiment: SentimentScores {
                    compound: 0.64,
                    positive: 0.5,
                    neutral: 0.5,
                    negative: 0.0,
                },
            }],
            ..Default::default()
        };

        let output = format_summary_readable(&result);
        assert!(output.starts_with("## Summary\n\nA talk about Rust."));
        assert!(output.contains("### [00:10-00:20] positive (+0.64)"));
        assert!(output.contains("I love Rust."));
    }

    #[test]
    fn readable_summary_skips_empty_mentions_section() {
        let result = SummaryResult {
            summary: "Nothing matched.".into(),
            ..Default::default()
        };

        assert!(!format_summary_readable(&result).contains("Keyword mentions"));
    }
}
