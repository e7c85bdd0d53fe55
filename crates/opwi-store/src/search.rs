//! Case-insensitive substring search over titles, content and tags.

use opwi_document::Document;

/// Which fields a search looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchScope {
    pub title: bool,
    pub content: bool,
    pub tags: bool,
}

impl SearchScope {
    pub fn all() -> Self {
        Self {
            title: true,
            content: true,
            tags: true,
        }
    }

    pub fn title_only() -> Self {
        Self {
            title: true,
            content: false,
            tags: false,
        }
    }

    pub fn content_only() -> Self {
        Self {
            title: false,
            content: true,
            tags: false,
        }
    }

    pub fn tags_only() -> Self {
        Self {
            title: false,
            content: false,
            tags: true,
        }
    }

    /// Returns `true` if matching needs more than the index entry.
    pub fn needs_document(&self) -> bool {
        self.content || self.tags
    }
}

impl Default for SearchScope {
    fn default() -> Self {
        Self::all()
    }
}

/// How a document matched. Variants are ordered best first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    TitleExact,
    TitlePartial,
    Content,
    Tag,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub address: String,
    pub title: String,
    pub namespace: String,
    pub kind: MatchKind,
}

/// Best match of an already lower-cased `query` against a title alone.
pub fn match_title(query: &str, title: &str) -> Option<MatchKind> {
    let title = title.to_lowercase();
    if title == query {
        Some(MatchKind::TitleExact)
    } else if title.contains(query) {
        Some(MatchKind::TitlePartial)
    } else {
        None
    }
}

/// Best match of an already lower-cased `query` against every field in `scope`.
pub fn match_document(query: &str, document: &Document, scope: SearchScope) -> Option<MatchKind> {
    if scope.title {
        if let Some(kind) = match_title(query, document.title()) {
            return Some(kind);
        }
    }
    if scope.content && document.content().to_lowercase().contains(query) {
        return Some(MatchKind::Content);
    }
    if scope.tags && document.tags().iter().any(|t| t.to_lowercase().contains(query)) {
        return Some(MatchKind::Tag);
    }
    None
}

/// Order hits best first, then by case-folded title, then by address.
/// Titles that differ only in case fall back to byte order.
pub fn rank(hits: &mut [SearchHit]) {
    hits.sort_by_cached_key(|hit| {
        (
            hit.kind,
            hit.title.to_lowercase(),
            hit.title.clone(),
            hit.address.clone(),
        )
    });
}
