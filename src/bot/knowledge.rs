//! Question/answer knowledge base with fuzzy lookup.
//!
//! Lookup tries, in order: an exact question match, the most similar question
//! whose similarity reaches the cutoff, and the question sharing the most
//! words with the query.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::KnowledgeError;

/// Similarity a question must reach to count as a fuzzy match.
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// One question and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: String,
}

/// In-memory knowledge base.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    cutoff: f64,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_CUTOFF)
    }
}

impl KnowledgeBase {
    /// Build a knowledge base. Questions are stored trimmed and lowercased.
    #[must_use]
    pub fn new(entries: Vec<KnowledgeEntry>, cutoff: f64) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| KnowledgeEntry {
                question: e.question.trim().to_lowercase(),
                answer: e.answer,
            })
            .collect();
        Self { entries, cutoff }
    }

    /// Load entries from a JSON array file.
    ///
    /// A missing file yields an empty knowledge base.
    pub fn load(path: impl AsRef<Path>, cutoff: f64) -> Result<Self, KnowledgeError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                name: "knowledge.missing",
                path = %path.display(),
                "Knowledge base file not found, continuing without it"
            );
            return Ok(Self::new(Vec::new(), cutoff));
        }

        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<KnowledgeEntry> = serde_json::from_str(&raw)?;
        info!(
            name: "knowledge.loaded",
            path = %path.display(),
            entries = entries.len(),
            "Knowledge base loaded"
        );
        Ok(Self::new(entries, cutoff))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the answer for `query`, if any entry is close enough.
    #[must_use]
    pub fn search(&self, query: &str) -> Option<&str> {
        let query = query.trim().to_lowercase();

        if let Some(entry) = self.entries.iter().find(|e| e.question == query) {
            return Some(&entry.answer);
        }

        if let Some(entry) = self.closest(&query) {
            return Some(&entry.answer);
        }

        self.most_overlapping(&query).map(|e| e.answer.as_str())
    }

    /// Highest-scoring question at or above the cutoff. Equal scores go to
    /// the lexicographically greater question; duplicates keep the first.
    fn closest(&self, query: &str) -> Option<&KnowledgeEntry> {
        let mut best: Option<(f64, &KnowledgeEntry)> = None;
        for entry in &self.entries {
            let score = similarity(&entry.question, query);
            if score < self.cutoff {
                continue;
            }
            let better = best.is_none_or(|(s, b)| {
                (score, entry.question.as_str()) > (s, b.question.as_str())
            });
            if better {
                best = Some((score, entry));
            }
        }
        best.map(|(_, e)| e)
    }

    fn most_overlapping(&self, query: &str) -> Option<&KnowledgeEntry> {
        let query_words: HashSet<&str> = query.split_whitespace().collect();
        let mut best: Option<(usize, &KnowledgeEntry)> = None;
        for entry in &self.entries {
            let overlap = entry
                .question
                .split_whitespace()
                .collect::<HashSet<_>>()
                .intersection(&query_words)
                .count();
            if overlap > 0 && best.is_none_or(|(o, _)| overlap > o) {
                best = Some((overlap, entry));
            }
        }
        best.map(|(_, e)| e)
    }
}

/// Ratcliff/Obershelp similarity in `[0, 1]`: twice the number of matching
/// characters over the total length.
///
/// Not symmetric: when several longest blocks tie, the earliest in `a` wins,
/// so pass the stored question as `a` and the query as `b`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * matching_chars(&a, &b)) as f64 / total as f64
}

/// Sum of the lengths of the matching blocks found by recursively taking the
/// longest common substring and matching what lies left and right of it.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut ranges = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = ranges.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            ranges.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            ranges.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]`, earliest in
/// `a` first, then earliest in `b`. Returns `(start_a, start_b, len)`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0);
    let mut prev = vec![0usize; width + 1];
    let mut cur = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[col - 1] + 1;
                cur[col] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            } else {
                cur[col] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}
