//! Sentiment scoring of context chunks.

use crate::{
    error::SentimentError,
    types::{ContextChunk, SentimentRecord, SentimentScores},
};

pub trait SentimentAnalyzer: Send + Sync {
    fn polarity(&self, text: &str) -> Result<SentimentScores, SentimentError>;
}

/// Lexicon and rule based scorer (VADER).
#[derive(Debug, Default, Clone, Copy)]
pub struct VaderAnalyzer;

impl VaderAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentAnalyzer for VaderAnalyzer {
    fn polarity(&self, text: &str) -> Result<SentimentScores, SentimentError> {
        let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
        let scores = analyzer.polarity_scores(text);
        let get = |key: &str| scores.get(key).copied().unwrap_or(0.0);

        Ok(SentimentScores {
            compound: get("compound"),
            positive: get("pos"),
            neutral: get("neu"),
            negative: get("neg"),
        })
    }
}

/// Score every chunk, one record per chunk in input order.
pub fn score(
    analyzer: &dyn SentimentAnalyzer,
    chunks: &[ContextChunk],
) -> Result<Vec<SentimentRecord>, SentimentError> {
    chunks
        .iter()
        .map(|chunk| {
            Ok(SentimentRecord {
                text: chunk.text.clone(),
                sentiment: analyzer.polarity(&chunk.text)?,
            })
        })
        .collect()
}
