use serde::{Deserialize, Serialize};

/// Output of the speech-to-text stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub segments: Vec<TimestampedSegment>,
    pub language: String,
}

/// One transcribed sentence, timestamps in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedSegment {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

impl TimestampedSegment {
    pub fn new(start: u32, end: u32, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// A keyword-relevant excerpt padded with one segment of context on each side
/// where available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextChunk {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

/// VADER-style polarity scores.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentScores {
    pub compound: f64,
    #[serde(rename = "pos")]
    pub positive: f64,
    #[serde(rename = "neu")]
    pub neutral: f64,
    #[serde(rename = "neg")]
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub text: String,
    pub sentiment: SentimentScores,
}

/// Terminal success payload of a job.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryResult {
    pub transcript: String,
    pub transcript_timestamped: Vec<TimestampedSegment>,
    pub transcript_filtered: Vec<ContextChunk>,
    pub sentiment_analysis: Vec<SentimentRecord>,
    pub summary: String,
}
