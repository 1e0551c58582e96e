use async_trait::async_trait;
use nd_core::{Result, Sentiment};

use super::InferenceModel;

const SUMMARY_SENTENCES: usize = 3;

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Technology",
        &["software", "startup", "computer", "internet", "chip", "app", "digital"],
    ),
    (
        "Business",
        &["market", "economy", "company", "investor", "revenue", "profit", "stock"],
    ),
    (
        "Politics",
        &["election", "government", "minister", "parliament", "senate", "policy", "vote"],
    ),
    (
        "Sports",
        &["match", "league", "tournament", "player", "coach", "season", "championship"],
    ),
    (
        "Science",
        &["research", "study", "scientist", "climate", "space", "vaccine", "experiment"],
    ),
];

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "success", "win", "growth", "improve", "love", "hope", "record", "boost",
];
const NEGATIVE_WORDS: &[&str] = &[
    "bad", "crisis", "loss", "fail", "decline", "fear", "death", "crash", "cut", "attack",
];

/// Deterministic local model: lead sentences, keyword categories and a small
/// sentiment lexicon. The default when no remote endpoint is configured and
/// the workhorse for tests.
#[derive(Debug, Default)]
pub struct HeuristicModel;

impl HeuristicModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InferenceModel for HeuristicModel {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let summary: Vec<&str> = text
            .split_inclusive(&['.', '!', '?'][..])
            .take(SUMMARY_SENTENCES)
            .collect();
        Ok(summary.join("").trim().to_string())
    }

    async fn categorize(&self, text: &str) -> Result<String> {
        let lower = text.to_lowercase();
        let best = CATEGORY_KEYWORDS
            .iter()
            .map(|(category, keywords)| {
                let hits = keywords.iter().filter(|k| lower.contains(*k)).count();
                (*category, hits)
            })
            .max_by_key(|(_, hits)| *hits)
            .filter(|(_, hits)| *hits > 0);

        Ok(best.map(|(category, _)| category).unwrap_or("World").to_string())
    }

    async fn sentiment(&self, text: &str) -> Result<Sentiment> {
        let lower = text.to_lowercase();
        let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as i32;
        let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as i32;

        let total = positive + negative;
        if total == 0 {
            return Ok(Sentiment::new("NEUTRAL", 0.5));
        }

        let label = if positive >= negative { "POSITIVE" } else { "NEGATIVE" };
        let score = (positive - negative).unsigned_abs() as f32 / total as f32;
        Ok(Sentiment::new(label, score.clamp(0.0, 1.0)))
    }
}
