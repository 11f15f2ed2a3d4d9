//! Structured Logics document
//!
//! A [`Document`] is built from the typed token stream of [`crate::lexer`]:
//!
//! ```text
//! preamble*            lines before the title (normally none)
//! ## <ref> - <Title>   title heading
//! > Key: value         indicator block (contiguous, directly under the title)
//! intro*               lines up to the first section
//! # Header             sections, each running to the next `# ` line
//! body*
//! ```
//!
//! Serializing with [`Document::to_text`] and rebuilding with
//! [`Document::from_text`] reproduces the same structure for any text this
//! crate wrote itself.

use crate::doc_ref::{DocKind, DocRef};
use crate::lexer::{classify_line, LineToken, INDICATOR_PREFIX};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

static REF_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:req|item|task|spec)_\d{3}_[a-z0-9_]+\b").expect("static regex")
});

/// Find every doc_ref-shaped token in `text`
pub fn scan_ref_tokens(text: &str) -> impl Iterator<Item = &str> {
    REF_TOKEN_RE.find_iter(text).map(|m| m.as_str())
}

/// The `## <ref> - <Title>` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    raw: String,
    label: Option<String>,
    title: String,
}

impl Heading {
    /// Render a canonical heading line
    #[must_use]
    pub fn new(label: &str, title: &str) -> Self {
        Self {
            raw: format!("## {label} - {title}"),
            label: Some(label.to_string()),
            title: title.to_string(),
        }
    }

    /// Ref as written on the line (no correction against the filename)
    #[inline]
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Title text
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Original line
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// One `> ...` line of the indicator block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorLine {
    raw: String,
    key: Option<String>,
    value: String,
}

impl IndicatorLine {
    /// Render a canonical `> key: value` line
    #[must_use]
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            raw: format!("{INDICATOR_PREFIX}{key}: {value}"),
            key: Some(key.to_string()),
            value: value.to_string(),
        }
    }

    fn from_token(raw: &str, key: Option<&str>, value: &str) -> Self {
        Self {
            raw: raw.to_string(),
            key: key.map(str::to_string),
            value: value.to_string(),
        }
    }

    /// Key, when the line contains a colon
    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Trimmed value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Original line
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Contiguous run of indicator lines directly beneath the title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorBlock {
    lines: Vec<IndicatorLine>,
}

impl IndicatorBlock {
    /// Value of the first line carrying `key` (case-sensitive)
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|l| l.key() == Some(key))
            .map(IndicatorLine::value)
    }

    /// Position of the first line carrying `key`
    #[must_use]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.key() == Some(key))
    }

    /// Whether `key` is present
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Replace the line at `index` with a canonical `> key: value` line.
    /// Returns `false` when the value was already identical.
    pub fn replace(&mut self, index: usize, key: &str, value: &str) -> bool {
        match self.lines.get(index) {
            Some(line) if line.key() == Some(key) && line.value() == value => false,
            Some(_) => {
                self.lines[index] = IndicatorLine::new(key, value);
                true
            }
            None => false,
        }
    }

    /// Insert a new line at `index` (clamped to the block length)
    pub fn insert(&mut self, index: usize, key: &str, value: &str) {
        let index = index.min(self.lines.len());
        self.lines.insert(index, IndicatorLine::new(key, value));
    }

    /// Lines in document order
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[IndicatorLine] {
        &self.lines
    }

    /// Ordered key/value mapping (first occurrence of a key wins)
    #[must_use]
    pub fn to_map(&self) -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        for line in &self.lines {
            if let Some(key) = line.key() {
                map.entry(key.to_string())
                    .or_insert_with(|| line.value().to_string());
            }
        }
        map
    }

    /// Number of lines
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the block has no lines
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A level-1 section and its body lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    heading_line: String,
    header: String,
    body: Vec<String>,
}

impl Section {
    /// Create a section from a header (`# Name`) and body lines
    #[must_use]
    pub fn new(header: &str, body: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            heading_line: header.to_string(),
            header: header.trim().to_string(),
            body: body.into_iter().map(Into::into).collect(),
        }
    }

    /// Identity: the trimmed header line, e.g. `# Plan`
    #[inline]
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Body lines, including separating blank lines
    #[inline]
    #[must_use]
    pub fn body(&self) -> &[String] {
        &self.body
    }

    /// Mutable body lines
    #[inline]
    pub fn body_mut(&mut self) -> &mut Vec<String> {
        &mut self.body
    }

    /// Body without trailing blank lines
    #[must_use]
    pub fn content(&self) -> &[String] {
        let end = self
            .body
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |i| i + 1);
        &self.body[..end]
    }

    /// `(done, total)` checklist counts in the body
    #[must_use]
    pub fn checklist(&self) -> (usize, usize) {
        self.body
            .iter()
            .fold((0, 0), |(done, total), line| match classify_line(line) {
                LineToken::ChecklistLine { done: true, .. } => (done + 1, total + 1),
                LineToken::ChecklistLine { done: false, .. } => (done, total + 1),
                _ => (done, total),
            })
    }

    fn ends_with_blank(&self) -> bool {
        self.body.last().is_some_and(|l| l.trim().is_empty())
    }
}

#[derive(Clone, Copy)]
enum BuildState {
    Preamble,
    Indicators,
    Intro,
    Sections,
}

/// Parsed Logics document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    doc_ref: DocRef,
    path: PathBuf,
    preamble: Vec<String>,
    heading: Option<Heading>,
    indicators: IndicatorBlock,
    intro: Vec<String>,
    sections: Vec<Section>,
}

impl Document {
    /// Build the structural model from text. Never fails: irregular
    /// structure is tolerated and left for the linter to report.
    #[must_use]
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let mut doc = Self::empty(DocRef::from_stem(stem), path.clone());

        let mut lines: Vec<&str> = text.lines().collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }

        let mut state = BuildState::Preamble;
        for line in lines {
            let token = classify_line(line);
            state = match (state, token) {
                (BuildState::Preamble, LineToken::TitleHeading { label, title }) => {
                    doc.heading = Some(Heading {
                        raw: line.to_string(),
                        label: label.map(str::to_string),
                        title: title.to_string(),
                    });
                    BuildState::Indicators
                }
                (BuildState::Indicators, LineToken::IndicatorLine { key, value }) => {
                    doc.indicators
                        .lines
                        .push(IndicatorLine::from_token(line, key, value));
                    BuildState::Indicators
                }
                (_, LineToken::SectionHeading(_)) => {
                    doc.sections.push(Section::new(line, Vec::<String>::new()));
                    BuildState::Sections
                }
                (BuildState::Preamble, _) => {
                    doc.preamble.push(line.to_string());
                    BuildState::Preamble
                }
                (BuildState::Indicators | BuildState::Intro, _) => {
                    doc.intro.push(line.to_string());
                    BuildState::Intro
                }
                (BuildState::Sections, _) => {
                    if let Some(section) = doc.sections.last_mut() {
                        section.body.push(line.to_string());
                    }
                    BuildState::Sections
                }
            };
        }
        doc
    }

    /// Start a new document with a canonical title heading
    #[must_use]
    pub fn with_heading(doc_ref: DocRef, path: impl Into<PathBuf>, title: &str) -> Self {
        let mut doc = Self::empty(doc_ref, path.into());
        doc.heading = Some(Heading::new(doc.doc_ref.as_str(), title));
        doc
    }

    fn empty(doc_ref: DocRef, path: PathBuf) -> Self {
        Self {
            doc_ref,
            path,
            preamble: Vec::new(),
            heading: None,
            indicators: IndicatorBlock::default(),
            intro: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Serialize back to Markdown, ending with exactly one newline
    #[must_use]
    pub fn to_text(&self) -> String {
        Self::join_lines(self.lines(true))
    }

    /// Text below the title heading (preamble, indicators, intro, sections)
    #[must_use]
    pub fn body_text(&self) -> String {
        Self::join_lines(self.lines(false))
    }

    fn lines(&self, with_heading: bool) -> Vec<&str> {
        let mut lines: Vec<&str> = Vec::new();
        lines.extend(self.preamble.iter().map(String::as_str));
        if let (true, Some(heading)) = (with_heading, &self.heading) {
            lines.push(heading.raw());
        }
        lines.extend(self.indicators.lines.iter().map(IndicatorLine::raw));
        lines.extend(self.intro.iter().map(String::as_str));
        for section in &self.sections {
            lines.push(&section.heading_line);
            lines.extend(section.body.iter().map(String::as_str));
        }
        lines
    }

    fn join_lines(mut lines: Vec<&str>) -> String {
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Identity derived from the filename
    #[inline]
    #[must_use]
    pub fn doc_ref(&self) -> &DocRef {
        &self.doc_ref
    }

    /// Kind derived from the filename prefix
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<DocKind> {
        self.doc_ref.kind()
    }

    /// Owning file, relative to the project root
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Title heading, if the document has one
    #[inline]
    #[must_use]
    pub fn heading(&self) -> Option<&Heading> {
        self.heading.as_ref()
    }

    /// Title, falling back to the filename stem
    #[must_use]
    pub fn title(&self) -> &str {
        self.heading
            .as_ref()
            .map_or(self.doc_ref.as_str(), Heading::title)
    }

    /// Indicator block
    #[inline]
    #[must_use]
    pub fn indicators(&self) -> &IndicatorBlock {
        &self.indicators
    }

    /// Mutable indicator block
    #[inline]
    pub fn indicators_mut(&mut self) -> &mut IndicatorBlock {
        &mut self.indicators
    }

    /// Lines between the indicator block and the first section
    #[inline]
    #[must_use]
    pub fn intro(&self) -> &[String] {
        &self.intro
    }

    /// Lines before the title heading
    #[inline]
    #[must_use]
    pub fn preamble(&self) -> &[String] {
        &self.preamble
    }

    /// Sections in document order
    #[inline]
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Header sequence in document order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(Section::header)
    }

    /// First section with the given header (exact, trimmed match)
    #[must_use]
    pub fn section(&self, header: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.header == header.trim())
    }

    /// Mutable access to the first section with the given header
    pub fn section_mut(&mut self, header: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.header == header.trim())
    }

    /// Index of the first section with the given header
    #[must_use]
    pub fn section_index(&self, header: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.header == header.trim())
    }

    /// Whether a section with this header exists
    #[inline]
    #[must_use]
    pub fn has_section(&self, header: &str) -> bool {
        self.section_index(header).is_some()
    }

    /// Insert a section at `index`, keeping a blank line on both sides.
    /// Separators are added as trailing blank lines only, so the content of
    /// neighbouring sections is untouched.
    pub fn insert_section(&mut self, index: usize, mut section: Section) {
        let index = index.min(self.sections.len());
        if index > 0 {
            let previous = &mut self.sections[index - 1];
            if !previous.ends_with_blank() {
                previous.body.push(String::new());
            }
        } else {
            let has_lead = self.heading.is_some() || !self.preamble.is_empty();
            let intro_ends_blank = self.intro.last().is_some_and(|l| l.trim().is_empty());
            if (has_lead || !self.intro.is_empty()) && !intro_ends_blank {
                self.intro.push(String::new());
            }
        }
        if index < self.sections.len() && !section.ends_with_blank() {
            section.body.push(String::new());
        }
        self.sections.insert(index, section);
    }

    /// Append a section at the end of the document
    pub fn push_section(&mut self, section: Section) {
        self.insert_section(self.sections.len(), section);
    }

    /// Ensure a blank line separates the indicator block from what follows
    pub fn separate_indicators(&mut self) {
        let next_is_content = match self.intro.first() {
            Some(line) => !line.trim().is_empty(),
            None => !self.sections.is_empty(),
        };
        if !self.indicators.is_empty() && next_is_content {
            self.intro.insert(0, String::new());
        }
    }

    /// Doc-ref tokens mentioned anywhere in the text, excluding this document
    #[must_use]
    pub fn outgoing_refs(&self) -> BTreeSet<String> {
        let text = self.to_text();
        scan_ref_tokens(&text)
            .filter(|token| *token != self.doc_ref.as_str())
            .map(str::to_string)
            .collect()
    }
}
