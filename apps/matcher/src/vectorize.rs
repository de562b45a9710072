//! Batch-local TF-IDF model.
//!
//! Fitted once per matching session over the job description plus every
//! resume in the batch, then used to transform each document into a vector
//! over the shared vocabulary. Never persisted or reused across job
//! descriptions — IDF statistics are only meaningful against the batch that
//! produced them.

use std::collections::{HashMap, HashSet};

use tracing::debug;

/// Vocabulary cap. When the corpus produces more distinct features, the
/// highest-frequency ones are kept, ties broken alphabetically so refitting
/// the same corpus always yields the same vocabulary.
pub const MAX_FEATURES: usize = 5000;

/// A TF-IDF model fitted over one batch corpus.
///
/// Features are unigrams and adjacent-pair bigrams of the normalized token
/// stream. IDF uses the smoothed form `ln((1+N)/(1+df)) + 1`, and
/// transformed vectors are L2-normalized.
#[derive(Debug, Clone)]
pub struct TfidfModel {
    vocabulary: Vec<String>,
    term_index: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfModel {
    /// Fits vocabulary and IDF statistics over the given tokenized corpus.
    ///
    /// An empty corpus, or one where every document normalized to nothing,
    /// yields an empty vocabulary; `transform` then returns zero-length
    /// vectors and downstream similarity rules to 0. Never an error.
    pub fn fit(corpus: &[Vec<String>]) -> Self {
        let mut corpus_freq: HashMap<String, u64> = HashMap::new();
        let mut doc_freq: HashMap<String, u32> = HashMap::new();

        for doc in corpus {
            let feats = features(doc);
            let mut seen: HashSet<&str> = HashSet::with_capacity(feats.len());
            for feat in &feats {
                if seen.insert(feat.as_str()) {
                    *doc_freq.entry(feat.clone()).or_insert(0) += 1;
                }
                *corpus_freq.entry(feat.clone()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, u64)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(MAX_FEATURES);

        let mut vocabulary: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        vocabulary.sort();

        let term_index: HashMap<String, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        let n = corpus.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        debug!(
            documents = corpus.len(),
            vocabulary = vocabulary.len(),
            "fitted tf-idf model"
        );

        Self {
            vocabulary,
            term_index,
            idf,
        }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Transforms one tokenized document into an L2-normalized TF-IDF vector
    /// of vocabulary dimensionality. Out-of-vocabulary features are ignored;
    /// a document with no in-vocabulary features stays the zero vector.
    pub fn transform(&self, doc: &[String]) -> Vec<f64> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        for feat in features(doc) {
            if let Some(&i) = self.term_index.get(&feat) {
                vector[i] += self.idf[i];
            }
        }

        let norm = vector.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for w in &mut vector {
                *w /= norm;
            }
        }
        vector
    }

    /// The `n` highest-weighted vocabulary terms of a transformed vector,
    /// for downstream display of what drove a document's representation.
    pub fn top_terms(&self, vector: &[f64], n: usize) -> Vec<(String, f64)> {
        let mut terms: Vec<(String, f64)> = vector
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > 0.0)
            .map(|(i, w)| (self.vocabulary[i].clone(), *w))
            .collect();
        terms.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(n);
        terms
    }
}

/// Unigram + adjacent-bigram feature stream for one tokenized document.
fn features(tokens: &[String]) -> Vec<String> {
    let mut feats = Vec::with_capacity(tokens.len() * 2);
    feats.extend(tokens.iter().cloned());
    feats.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    feats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_empty_corpus_yields_empty_vocabulary() {
        let model = TfidfModel::fit(&[]);
        assert_eq!(model.vocabulary_len(), 0);
        assert!(model.transform(&doc(&["anything"])).is_empty());
    }

    #[test]
    fn test_all_empty_documents_yield_zero_vectors() {
        let model = TfidfModel::fit(&[vec![], vec![]]);
        assert_eq!(model.vocabulary_len(), 0);
        assert!(model.transform(&[]).is_empty());
    }

    #[test]
    fn test_transformed_vector_is_unit_length() {
        let corpus = vec![doc(&["rust", "systems"]), doc(&["rust", "tooling"])];
        let model = TfidfModel::fit(&corpus);
        let vector = model.transform(&corpus[0]);
        let norm: f64 = vector.iter().map(|w| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9, "norm was {norm}");
    }

    #[test]
    fn test_out_of_vocabulary_document_stays_zero() {
        let corpus = vec![doc(&["rust", "systems"])];
        let model = TfidfModel::fit(&corpus);
        let vector = model.transform(&doc(&["gardening", "pottery"]));
        assert!(vector.iter().all(|w| *w == 0.0));
    }

    #[test]
    fn test_rare_term_outweighs_common_term() {
        // "shared" appears in both documents, "rare" in one.
        let corpus = vec![doc(&["shared", "rare"]), doc(&["shared", "other"])];
        let model = TfidfModel::fit(&corpus);
        let vector = model.transform(&corpus[0]);
        let weight_of = |term: &str| {
            model
                .top_terms(&vector, 10)
                .into_iter()
                .find(|(t, _)| t == term)
                .map(|(_, w)| w)
                .unwrap_or(0.0)
        };
        assert!(weight_of("rare") > weight_of("shared"));
    }

    #[test]
    fn test_bigrams_enter_the_vocabulary() {
        let corpus = vec![doc(&["machine", "learning"])];
        let model = TfidfModel::fit(&corpus);
        let vector = model.transform(&corpus[0]);
        let terms: Vec<String> = model
            .top_terms(&vector, 10)
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert!(terms.contains(&"machine learning".to_string()));
    }

    #[test]
    fn test_vocabulary_capped_at_max_features() {
        let big: Vec<String> = (0..6000).map(|i| format!("term{i:05}")).collect();
        let model = TfidfModel::fit(&[big]);
        assert_eq!(model.vocabulary_len(), MAX_FEATURES);
    }

    #[test]
    fn test_refitting_same_corpus_is_deterministic() {
        let corpus = vec![
            doc(&["python", "backend", "sql"]),
            doc(&["python", "frontend", "css"]),
            doc(&["ops", "terraform"]),
        ];
        let a = TfidfModel::fit(&corpus);
        let b = TfidfModel::fit(&corpus);
        for document in &corpus {
            assert_eq!(a.transform(document), b.transform(document));
        }
    }
}
