//! TF-IDF cosine similarity between product names.
//!
//! The corpus for one query is the subject plus every candidate. Tokens are
//! lower-cased runs of two or more word characters; idf is smoothed
//! (`ln((1 + n) / (1 + df)) + 1`) and every document vector is L2-normalized.
//! All term maps are ordered, so scores are bit-reproducible.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

type TermCounts = BTreeMap<String, f64>;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("static token pattern"))
}

fn term_counts(text: &str) -> TermCounts {
    let lowered = text.to_lowercase();
    let mut counts = TermCounts::new();
    for token in token_pattern().find_iter(&lowered) {
        *counts.entry(token.as_str().to_string()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Tokenized candidate names plus their document frequencies. Built once per
/// candidate catalog and queried once per subject.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    candidates: Vec<TermCounts>,
    doc_freq: BTreeMap<String, usize>,
}

impl SimilarityIndex {
    pub fn new<S: AsRef<str>>(candidates: &[S]) -> Self {
        let candidates: Vec<TermCounts> = candidates.iter().map(|c| term_counts(c.as_ref())).collect();
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for counts in &candidates {
            for term in counts.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
        }
        Self { candidates, doc_freq }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Similarity of `subject` against every candidate, in candidate order.
    pub fn score(&self, subject: &str) -> Vec<f64> {
        if self.candidates.is_empty() {
            return Vec::new();
        }

        let subject_counts = term_counts(subject);
        let n_docs = (self.candidates.len() + 1) as f64;
        let idf = |term: &str| -> f64 {
            let df = self.doc_freq.get(term).copied().unwrap_or(0)
                + usize::from(subject_counts.contains_key(term));
            ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0
        };

        let subject_weights: BTreeMap<&str, f64> = subject_counts
            .iter()
            .map(|(term, tf)| (term.as_str(), tf * idf(term)))
            .collect();
        let subject_norm = l2_norm(subject_weights.values().copied());

        self.candidates
            .iter()
            .map(|counts| {
                if subject_norm == 0.0 || counts.is_empty() {
                    return 0.0;
                }
                if *counts == subject_counts {
                    // Identical vectors; avoid rounding below 1.0.
                    return 1.0;
                }
                let dot: f64 = counts
                    .iter()
                    .filter_map(|(term, tf)| {
                        subject_weights.get(term.as_str()).map(|sw| sw * tf * idf(term))
                    })
                    .sum();
                if dot == 0.0 {
                    return 0.0;
                }
                let norm = l2_norm(counts.iter().map(|(term, tf)| tf * idf(term)));
                (dot / (subject_norm * norm)).clamp(0.0, 1.0)
            })
            .collect()
    }
}

fn l2_norm(weights: impl Iterator<Item = f64>) -> f64 {
    weights.map(|w| w * w).sum::<f64>().sqrt()
}

/// Similarity of `subject` against each of `candidates`, in candidate order.
pub fn score<S: AsRef<str>>(subject: &str, candidates: &[S]) -> Vec<f64> {
    SimilarityIndex::new(candidates).score(subject)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_candidates() {
        let none: [&str; 0] = [];
        assert!(score("Bananas", &none).is_empty());
    }

    #[test]
    fn identical_name_scores_one() {
        let candidates = ["Fresh Bananas", "Royal Gala Apples", "Bananas Cavendish"];
        let scores = score("Fresh Bananas", &candidates);
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0], 1.0);
        assert!(scores.iter().all(|s| *s <= scores[0]));
    }

    #[test]
    fn no_shared_vocabulary_is_zero() {
        let scores = score("Tasmanian Salmon", &["Rolled Oats", "Olive Oil"]);
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn subject_without_tokens_is_zero() {
        let scores = score("a", &["a", "Milk"]);
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn case_insensitive() {
        let scores = score("FULL CREAM MILK", &["full cream milk"]);
        assert_eq!(scores, vec![1.0]);
    }

    #[test]
    fn partial_overlap_is_between_zero_and_one() {
        let scores = score("Full Cream Milk 2L", &["Lite Milk 2L", "Sourdough Bread"]);
        assert!(scores[0] > 0.0 && scores[0] < 1.0);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn rare_terms_weigh_more() {
        // "organic" appears once, "milk" in every candidate.
        let candidates = ["Organic Eggs", "Skim Milk", "Milk Chocolate", "Milk Powder"];
        let scores = score("Organic Milk", &candidates);
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn deterministic() {
        let candidates = ["Chicken Breast Fillets", "Chicken Thigh", "Beef Mince"];
        let a = score("Chicken Breast", &candidates);
        let b = score("Chicken Breast", &candidates);
        assert_eq!(a, b);
    }

    #[test]
    fn index_matches_free_function() {
        let candidates = vec!["Greek Yoghurt".to_string(), "Natural Yoghurt 1kg".to_string()];
        let index = SimilarityIndex::new(candidates.as_slice());
        assert_eq!(index.len(), 2);
        assert_eq!(index.score("Yoghurt"), score("Yoghurt", candidates.as_slice()));
    }
}
