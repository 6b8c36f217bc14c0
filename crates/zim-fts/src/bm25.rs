// Stract is an open source web search engine.
// Copyright (C) 2023 Stract ApS
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Okapi BM25 reranking over a small candidate set (§4.9).
//!
//! Deliberately scores against the *candidate* corpus's own document
//! frequencies, not the whole archive's — this is the source tool's
//! semantics (re-rank the hit set against itself) and the spec requires it
//! be preserved rather than "fixed" to archive-wide IDF.

#[derive(Debug, Clone, Copy)]
pub struct Bm25 {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25 {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

impl Bm25 {
    pub fn new(k1: f64, b: f64) -> Self {
        Self { k1, b }
    }

    /// Ranks `docs` (candidate titles) against `query_terms`. Returns
    /// indices into `docs`, sorted by descending score; ties keep the
    /// original candidate order (stable sort).
    pub fn rank(&self, query_terms: &[String], docs: &[String]) -> Vec<usize> {
        if docs.is_empty() {
            return Vec::new();
        }

        let tokenized: Vec<Vec<String>> = docs
            .iter()
            .map(|d| d.to_lowercase().split_whitespace().map(str::to_string).collect())
            .collect();

        let n = tokenized.len() as f64;
        let avg_len: f64 =
            tokenized.iter().map(|d| d.len() as f64).sum::<f64>() / n;

        let query_terms: Vec<String> = query_terms.iter().map(|t| t.to_lowercase()).collect();

        let mut scores = vec![0.0f64; tokenized.len()];

        for term in &query_terms {
            let df = tokenized
                .iter()
                .filter(|doc| doc.iter().any(|w| w == term))
                .count() as f64;
            if df == 0.0 {
                continue;
            }
            let idf = ((df + 0.5) / (n - df + 0.5)).ln();

            for (i, doc) in tokenized.iter().enumerate() {
                let tf = doc.iter().filter(|w| *w == term).count() as f64;
                if tf == 0.0 {
                    continue;
                }
                let len = doc.len() as f64;
                let denom = tf + self.k1 * (1.0 - self.b + self.b * len / avg_len);
                scores[i] += idf * (tf * (self.k1 + 1.0)) / denom;
            }
        }

        let mut order: Vec<usize> = (0..docs.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_match_the_spec_worked_example() {
        let docs = vec![
            "cat dog".to_string(),
            "dog".to_string(),
            "cat cat".to_string(),
        ];
        let bm25 = Bm25::default();
        let order = bm25.rank(&["cat".to_string()], &docs);
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn search_is_idempotent() {
        let docs = vec![
            "paris".to_string(),
            "partisan".to_string(),
            "rome".to_string(),
        ];
        let bm25 = Bm25::default();
        let first = bm25.rank(&["par".to_string()], &docs);
        let second = bm25.rank(&["par".to_string()], &docs);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_corpus_has_no_order() {
        let bm25 = Bm25::default();
        assert!(bm25.rank(&["anything".to_string()], &[]).is_empty());
    }
}
