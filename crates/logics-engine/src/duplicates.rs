//! Duplicate similarity scorer
//!
//! `score = 0.75 * title_ratio + 0.25 * content_jaccard` where `title_ratio`
//! is the block-matching ratio of the normalized titles and `content_jaccard`
//! the token-set overlap of the first 5000 characters of each document's text
//! below the title line.

use logics_model::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::debug;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("static regex"));

/// Characters of raw text considered for content similarity
pub const CONTENT_PREFIX_CHARS: usize = 5000;

const TITLE_WEIGHT: f64 = 0.75;
const CONTENT_WEIGHT: f64 = 0.25;

/// Whether documents sharing a slug are compared
///
/// Same-slug documents are normally the request → backlog → task chain of a
/// single piece of work, so they are skipped unless asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelatedPairs {
    /// Ignore pairs with identical slugs
    #[default]
    Skip,
    /// Score every pair
    Include,
}

/// Options for [`find_duplicates`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateOptions {
    /// Minimum score kept
    pub threshold: f64,
    /// Same-slug policy
    pub related: RelatedPairs,
    /// Keep at most this many pairs
    pub top: Option<usize>,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            related: RelatedPairs::Skip,
            top: None,
        }
    }
}

/// One side of a duplicate pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairMember {
    /// Doc ref
    pub doc_ref: String,
    /// Path relative to the project root
    pub path: PathBuf,
    /// Title
    pub title: String,
}

impl PairMember {
    fn of(doc: &Document) -> Self {
        Self {
            doc_ref: doc.doc_ref().to_string(),
            path: doc.path().to_path_buf(),
            title: doc.title().to_string(),
        }
    }
}

/// A likely duplicate
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicatePair {
    /// Similarity in `[0, 1]`
    pub score: f64,
    /// Earlier document in load order
    pub left: PairMember,
    /// Later document in load order
    pub right: PairMember,
}

/// Lowercase alphanumeric tokens joined by single spaces
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `2 * M / (len(a) + len(b))` where `M` is the total size of the matching
/// blocks found by recursive longest-common-substring search
#[must_use]
pub fn block_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = BlockMatcher::new(&a, &b).matched_len();
    #[allow(clippy::cast_precision_loss)]
    let ratio = 2.0 * matched as f64 / total as f64;
    ratio
}

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }
        Self { a, b, b2j }
    }

    /// Longest common block in `a[alo..ahi]` × `b[blo..bhi]`; ties resolve to
    /// the earliest start in `a`, then in `b`. Returns `(i, j, size)`.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next;
        }
        (best_i, best_j, best_size)
    }

    fn matched_len(&self) -> usize {
        let mut total = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                pending.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }
}

fn content_tokens(text: &str) -> HashSet<String> {
    let prefix: String = text.chars().take(CONTENT_PREFIX_CHARS).collect();
    let lowered = prefix.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    #[allow(clippy::cast_precision_loss)]
    let index = shared as f64 / union as f64;
    index
}

struct Profile {
    title: String,
    tokens: HashSet<String>,
}

impl Profile {
    /// Content tokens come from the body below the title so a title edit only moves the title term
    fn of(doc: &Document) -> Self {
        Self {
            title: normalize_title(doc.title()),
            tokens: content_tokens(&doc.body_text()),
        }
    }

    fn score(&self, other: &Self) -> f64 {
        if self.title.is_empty() || other.title.is_empty() {
            return 0.0;
        }
        TITLE_WEIGHT * block_ratio(&self.title, &other.title)
            + CONTENT_WEIGHT * jaccard(&self.tokens, &other.tokens)
    }
}

/// Similarity of two documents in `[0, 1]`
#[must_use]
pub fn score(a: &Document, b: &Document) -> f64 {
    Profile::of(a).score(&Profile::of(b))
}

/// Every unordered pair scoring at least `threshold`, best first
///
/// Ties keep discovery order (by first then second document index).
#[must_use]
pub fn find_duplicates(docs: &[Document], options: &DuplicateOptions) -> Vec<DuplicatePair> {
    let profiles: Vec<Profile> = docs.iter().map(Profile::of).collect();
    let mut pairs = Vec::new();
    for (i, left) in docs.iter().enumerate() {
        for (j, right) in docs.iter().enumerate().skip(i + 1) {
            if options.related == RelatedPairs::Skip && left.doc_ref().slug() == right.doc_ref().slug() {
                continue;
            }
            let score = profiles[i].score(&profiles[j]);
            if score >= options.threshold {
                pairs.push(DuplicatePair {
                    score,
                    left: PairMember::of(left),
                    right: PairMember::of(right),
                });
            }
        }
    }
    pairs.sort_by(|a, b| b.score.total_cmp(&a.score));
    if let Some(top) = options.top {
        pairs.truncate(top);
    }
    debug!(documents = docs.len(), pairs = pairs.len(), "scored duplicates");
    pairs
}
