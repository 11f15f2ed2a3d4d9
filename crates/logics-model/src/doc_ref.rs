//! Document identities
//!
//! Provides [`DocKind`] and [`DocRef`], the `{prefix}_{id}_{slug}` identifier
//! that names every Logics document and is derived from its filename.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

static WELL_FORMED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(req|item|task|spec)_(\d{3})_([a-z0-9_]+)$").expect("static regex")
});

/// The four document kinds of the workflow lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    /// `req_*` documents under `request/`
    Request,
    /// `item_*` documents under `backlog/`
    Backlog,
    /// `task_*` documents under `tasks/`
    Task,
    /// `spec_*` documents under `specs/`
    Spec,
}

impl DocKind {
    /// All kinds in lifecycle order
    pub const ALL: [DocKind; 4] = [Self::Request, Self::Backlog, Self::Task, Self::Spec];

    /// Filename prefix
    #[inline]
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Request => "req",
            Self::Backlog => "item",
            Self::Task => "task",
            Self::Spec => "spec",
        }
    }

    /// Directory name below the docs root
    #[inline]
    #[must_use]
    pub const fn directory(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Backlog => "backlog",
            Self::Task => "tasks",
            Self::Spec => "specs",
        }
    }

    /// Human readable name
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Backlog => "backlog",
            Self::Task => "task",
            Self::Spec => "spec",
        }
    }

    /// Resolve a kind from its filename prefix
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.prefix() == prefix)
    }

    /// Whether documents of this kind carry a `Progress` indicator
    #[inline]
    #[must_use]
    pub const fn tracks_progress(self) -> bool {
        matches!(self, Self::Backlog | Self::Task)
    }
}

impl Display for DocKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DocKind {
    type Err = DocRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s || k.prefix() == s)
            .ok_or_else(|| DocRefError::UnknownPrefix(s.to_string()))
    }
}

/// Identifier of a document, derived from its filename stem
///
/// A well-formed ref has the shape `{prefix}_{3-digit-id}_{slug}`. Refs built
/// from malformed stems are still usable as graph nodes; they simply carry no
/// id and possibly no kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct DocRef {
    raw: String,
    kind: Option<DocKind>,
    id: Option<u32>,
    slug: String,
    well_formed: bool,
}

impl DocRef {
    /// Build a well-formed ref from its parts
    #[must_use]
    pub fn new(kind: DocKind, id: u32, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            raw: format!("{}_{:03}_{}", kind.prefix(), id, slug),
            kind: Some(kind),
            id: Some(id),
            slug,
            well_formed: true,
        }
    }

    /// Interpret a filename stem, tolerating malformed names
    #[must_use]
    pub fn from_stem(stem: &str) -> Self {
        if let Some(caps) = WELL_FORMED_RE.captures(stem) {
            return Self {
                raw: stem.to_string(),
                kind: DocKind::from_prefix(&caps[1]),
                id: caps[2].parse().ok(),
                slug: caps[3].to_string(),
                well_formed: true,
            };
        }

        let mut parts = stem.splitn(3, '_');
        let prefix = parts.next().unwrap_or_default();
        let _id = parts.next();
        let slug = parts.next().unwrap_or(stem);
        Self {
            raw: stem.to_string(),
            kind: DocKind::from_prefix(prefix),
            id: None,
            slug: slug.to_string(),
            well_formed: false,
        }
    }

    /// The ref as a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Kind derived from the prefix, if recognized
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<DocKind> {
        self.kind
    }

    /// Numeric id (well-formed refs only)
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    /// Slug part used to relate documents across the lifecycle
    #[inline]
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Whether the stem matched `{prefix}_{ddd}_{slug}`
    #[inline]
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.well_formed
    }
}

impl Display for DocRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DocRef {
    type Err = DocRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = Self::from_stem(s);
        if parsed.well_formed {
            return Ok(parsed);
        }
        if parsed.kind.is_none() {
            let prefix = s.split('_').next().unwrap_or_default();
            return Err(DocRefError::UnknownPrefix(prefix.to_string()));
        }
        Err(DocRefError::Malformed(s.to_string()))
    }
}

impl AsRef<str> for DocRef {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl From<DocRef> for String {
    fn from(value: DocRef) -> Self {
        value.raw
    }
}

impl From<String> for DocRef {
    fn from(value: String) -> Self {
        Self::from_stem(&value)
    }
}

/// Errors related to document refs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocRefError {
    /// Prefix is not one of req/item/task/spec
    #[error("unknown document prefix: '{0}'")]
    UnknownPrefix(String),

    /// Known prefix but not `{prefix}_{ddd}_{slug}`
    #[error("malformed document ref: '{0}' (expected {{prefix}}_{{3-digit-id}}_{{slug}})")]
    Malformed(String),
}

/// Normalize a title into a filename slug
///
/// Lowercases, collapses every run of non `[a-z0-9]` characters into a single
/// underscore and trims underscores. Empty results become `untitled`.
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_sep = false;
    for c in value.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c);
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_stem() {
        let r = DocRef::from_stem("item_007_login_button");
        assert!(r.is_well_formed());
        assert_eq!(r.kind(), Some(DocKind::Backlog));
        assert_eq!(r.id(), Some(7));
        assert_eq!(r.slug(), "login_button");
        assert_eq!(r.to_string(), "item_007_login_button");
    }

    #[test]
    fn malformed_stem_keeps_raw_and_kind() {
        let r = DocRef::from_stem("task_12_short_id");
        assert!(!r.is_well_formed());
        assert_eq!(r.kind(), Some(DocKind::Task));
        assert_eq!(r.id(), None);
        assert_eq!(r.slug(), "short_id");
        assert_eq!(r.as_str(), "task_12_short_id");
    }

    #[test]
    fn unknown_prefix_has_no_kind() {
        let r = DocRef::from_stem("notes");
        assert_eq!(r.kind(), None);
        assert_eq!(r.slug(), "notes");
    }

    #[test]
    fn new_pads_id() {
        let r = DocRef::new(DocKind::Spec, 3, "api");
        assert_eq!(r.as_str(), "spec_003_api");
        assert!(r.is_well_formed());
    }

    #[test]
    fn from_str_strict() {
        assert!("req_001_a".parse::<DocRef>().is_ok());
        assert!(matches!(
            "req_1_a".parse::<DocRef>(),
            Err(DocRefError::Malformed(_))
        ));
        assert!(matches!(
            "adr_001_a".parse::<DocRef>(),
            Err(DocRefError::UnknownPrefix(p)) if p == "adr"
        ));
    }

    #[test]
    fn kind_roundtrip_names() {
        for kind in DocKind::ALL {
            assert_eq!(kind.name().parse::<DocKind>().unwrap(), kind);
            assert_eq!(DocKind::from_prefix(kind.prefix()), Some(kind));
        }
        assert!(DocKind::Task.tracks_progress());
        assert!(!DocKind::Request.tracks_progress());
    }

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("  Add Login -- Button! "), "add_login_button");
        assert_eq!(slugify("v2.0 API"), "v2_0_api");
        assert_eq!(slugify("***"), "untitled");
    }
}
