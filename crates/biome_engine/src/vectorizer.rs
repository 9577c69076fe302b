//! Bag-of-words TF-IDF vector space over script exemplars.
//!
//! All exemplar rows are unit-normalized at learn time so retrieval is a
//! plain dot product per row. Ties at the maximum score are returned as the
//! full candidate set; choosing among them is the encoder's job.

use std::collections::HashMap;

/// Result of one vector-space query.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieval {
    /// Highest cosine similarity over all exemplar rows.
    pub score: f32,
    /// Script line indices of every row tied at the maximum. A line appears
    /// once per tied exemplar, exactly as authored.
    pub tied: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Vectorizer {
    vocab: HashMap<String, usize>,
    idf: Vec<f32>,
    /// Unit-normalized TF-IDF row per exemplar.
    rows: Vec<Vec<f32>>,
    /// Exemplar row -> script line index.
    index: Vec<usize>,
}

impl Vectorizer {
    /// Build the vector space from `(line_index, tokens)` exemplars.
    pub fn learn(exemplars: &[(usize, Vec<String>)]) -> Self {
        let mut vocab: HashMap<String, usize> = HashMap::new();
        for (_, tokens) in exemplars {
            for token in tokens {
                let next = vocab.len();
                vocab.entry(token.clone()).or_insert(next);
            }
        }

        let vocab_len = vocab.len();
        let mut counts: Vec<Vec<f32>> = Vec::with_capacity(exemplars.len());
        let mut index = Vec::with_capacity(exemplars.len());
        for (line, tokens) in exemplars {
            let mut row = vec![0.0f32; vocab_len];
            for token in tokens {
                if let Some(&pos) = vocab.get(token) {
                    row[pos] += 1.0;
                }
            }
            counts.push(row);
            index.push(*line);
        }

        // df(t) = share of exemplar rows containing t; idf(t) = ln(1 + 1/df)
        let num_rows = counts.len().max(1) as f32;
        let mut idf = vec![0.0f32; vocab_len];
        for (pos, w) in idf.iter_mut().enumerate() {
            let df = counts.iter().filter(|row| row[pos] > 0.0).count() as f32 / num_rows;
            if df > 0.0 {
                *w = (1.0 + 1.0 / df).ln();
            }
        }

        // tf (row-normalized by token count) * idf, then unit length
        let mut rows = counts;
        for row in &mut rows {
            let total: f32 = row.iter().sum();
            if total > 0.0 {
                for (value, w) in row.iter_mut().zip(&idf) {
                    *value = *value / total * w;
                }
            }
            normalize(row);
        }

        Self {
            vocab,
            idf,
            rows,
            index,
        }
    }

    pub fn vocab(&self) -> &HashMap<String, usize> {
        &self.vocab
    }

    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty() || self.rows.is_empty()
    }

    /// Vectorize a query identically to the exemplars and return the tied
    /// maximum. `None` when no query token is in the vocabulary (or the
    /// space is empty); a recovered condition, not an error.
    pub fn query(&self, tokens: &[String]) -> Option<Retrieval> {
        if self.is_empty() {
            return None;
        }

        let mut wv = vec![0.0f32; self.idf.len()];
        for token in tokens {
            if let Some(&pos) = self.vocab.get(token) {
                wv[pos] += 1.0;
            }
        }
        let total: f32 = wv.iter().sum();
        if total == 0.0 {
            return None;
        }
        for (value, w) in wv.iter_mut().zip(&self.idf) {
            *value = *value / total * w;
        }
        normalize(&mut wv);

        let scores: Vec<f32> = self.rows.iter().map(|row| dot(row, &wv)).collect();
        let score = scores.iter().copied().fold(f32::MIN, f32::max);
        let tied = scores
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == score)
            .map(|(i, _)| self.index[i])
            .collect();
        Some(Retrieval { score, tied })
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split(' ').map(str::to_string).collect()
    }

    fn space() -> Vectorizer {
        Vectorizer::learn(&[
            (0, toks("こんにちは")),
            (1, toks("おはよう ござい ます")),
            (2, toks("今日 は いい 天気")),
        ])
    }

    #[test]
    fn exemplar_query_scores_one() {
        let v = space();
        let r = v.query(&toks("おはよう ござい ます")).unwrap();
        assert!((r.score - 1.0).abs() < 1e-5);
        assert_eq!(r.tied, vec![1]);
    }

    #[test]
    fn unknown_vocabulary_recovers_as_none() {
        let v = space();
        assert!(v.query(&toks("ボンジュール")).is_none());
    }

    #[test]
    fn every_row_is_unit_length() {
        let v = space();
        for row in &v.rows {
            let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn duplicate_exemplars_tie_at_the_maximum() {
        let v = Vectorizer::learn(&[
            (0, toks("やあ")),
            (1, toks("やあ")),
            (2, toks("さよなら")),
        ]);
        let r = v.query(&toks("やあ")).unwrap();
        assert!((r.score - 1.0).abs() < 1e-5);
        assert_eq!(r.tied, vec![0, 1]);
    }

    #[test]
    fn empty_space_yields_none() {
        let v = Vectorizer::learn(&[]);
        assert!(v.query(&toks("x")).is_none());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Cosine over nonnegative vectors; every answered query must
            // score inside the unit interval with a nonempty tie set.
            #[test]
            fn scores_stay_within_the_unit_interval(
                corpus in prop::collection::vec(
                    prop::collection::vec("[あ-ん]{1,3}", 1..5), 1..8),
                query in prop::collection::vec("[あ-ん]{1,3}", 1..5),
            ) {
                let exemplars: Vec<(usize, Vec<String>)> =
                    corpus.into_iter().enumerate().collect();
                let v = Vectorizer::learn(&exemplars);
                if let Some(r) = v.query(&query) {
                    prop_assert!(r.score >= -1e-5);
                    prop_assert!(r.score <= 1.0 + 1e-5);
                    prop_assert!(!r.tied.is_empty());
                }
            }

            // Identical exemplar lines are indistinguishable, so any query
            // they answer must list both as tied candidates.
            #[test]
            fn duplicate_lines_always_tie(
                line in prop::collection::vec("[あ-ん]{1,3}", 1..4),
                query in prop::collection::vec("[あ-ん]{1,3}", 1..4),
            ) {
                let exemplars = vec![(0, line.clone()), (1, line)];
                let v = Vectorizer::learn(&exemplars);
                if let Some(r) = v.query(&query) {
                    prop_assert_eq!(r.tied, vec![0, 1]);
                }
            }
        }
    }
}
