use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::nlu::catalog::{Catalog, IntentCategory};

/// One entry of the ranked distribution returned by `classify`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredIntent {
    pub category: IntentCategory,
    pub confidence: f32,
}

/// Laplace-style smoothing mass. Small on purpose: the catalog vocabulary is
/// tiny, and a full pseudo-count per word flattens the posterior so much that
/// even unambiguous commands never clear the execution threshold.
const SMOOTHING: f32 = 0.1;

/// Words carrying no intent signal, dropped before counting.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "to", "my", "me", "i", "is", "it", "that", "this",
    "please", "of", "in", "on", "for", "and", "do", "what", "are",
];

/// Bag-of-words naive-Bayes classifier over the category catalog.
///
/// Fitted exactly once at startup from the catalog's static pattern lists;
/// after `fit` the parameters never change and `classify` is a single forward
/// pass. Unseen vocabulary contributes nothing to any class, so a fully
/// out-of-vocabulary utterance degrades to a near-uniform distribution
/// instead of a confident guess.
pub struct IntentClassifier {
    vocab: HashMap<String, usize>,
    categories: Vec<IntentCategory>,
    log_prior: Vec<f32>,
    /// log P(word | class), indexed [class][word].
    log_likelihood: Vec<Vec<f32>>,
}

impl IntentClassifier {
    pub fn fit(catalog: &Catalog) -> Self {
        let mut vocab: HashMap<String, usize> = HashMap::new();
        let mut docs: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut categories = Vec::with_capacity(catalog.len());

        for (class_idx, spec) in catalog.entries().iter().enumerate() {
            categories.push(spec.category);
            for pattern in spec.patterns {
                let mut token_ids = Vec::new();
                for token in tokenize(pattern) {
                    let next_id = vocab.len();
                    let id = *vocab.entry(token).or_insert(next_id);
                    token_ids.push(id);
                }
                docs.push((class_idx, token_ids));
            }
        }

        let n_classes = categories.len();
        let vocab_size = vocab.len();

        let mut word_counts = vec![vec![0f32; vocab_size]; n_classes];
        let mut class_tokens = vec![0f32; n_classes];
        let mut class_docs = vec![0f32; n_classes];

        for (class_idx, token_ids) in &docs {
            class_docs[*class_idx] += 1.0;
            for &id in token_ids {
                word_counts[*class_idx][id] += 1.0;
                class_tokens[*class_idx] += 1.0;
            }
        }

        let total_docs: f32 = class_docs.iter().sum();
        let log_prior = class_docs
            .iter()
            .map(|&d| (d.max(1.0) / total_docs.max(1.0)).ln())
            .collect();

        let smoothing_mass = SMOOTHING * vocab_size as f32;
        let log_likelihood = (0..n_classes)
            .map(|c| {
                let denom = class_tokens[c] + smoothing_mass;
                (0..vocab_size)
                    .map(|w| ((word_counts[c][w] + SMOOTHING) / denom).ln())
                    .collect()
            })
            .collect();

        Self {
            vocab,
            categories,
            log_prior,
            log_likelihood,
        }
    }

    /// Score every catalog category for the utterance. The result covers the
    /// full catalog, sums to 1, and is ordered highest-confidence first with
    /// ties broken by catalog declaration order.
    pub fn classify(&self, text: &str) -> Vec<ScoredIntent> {
        let mut scores: Vec<f32> = self.log_prior.clone();

        for token in tokenize(text) {
            if let Some(&id) = self.vocab.get(&token) {
                for (c, score) in scores.iter_mut().enumerate() {
                    *score += self.log_likelihood[c][id];
                }
            }
            // Unknown words are skipped: they shift no class relative to
            // another, which is exactly the graceful-degradation contract.
        }

        let confidences = softmax(&scores);

        let mut ranked: Vec<ScoredIntent> = self
            .categories
            .iter()
            .zip(confidences)
            .map(|(&category, confidence)| ScoredIntent {
                category,
                confidence,
            })
            .collect();

        // Stable sort keeps catalog declaration order for equal scores.
        ranked.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    pub fn categories(&self) -> &[IntentCategory] {
        &self.categories
    }
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}
