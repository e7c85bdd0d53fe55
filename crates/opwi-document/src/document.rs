use opwi_diff::{diff, replay, DiffStats};
use opwi_types::{DocumentId, Revision, Timestamp};
use tracing::debug;

use crate::contributors::Contributors;
use crate::error::{DocumentError, DocumentResult};

/// Identity and metadata of a document (everything except its history).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentHeader {
    pub doc_id: DocumentId,
    pub title: String,
    pub namespace: String,
    pub created_at: Timestamp,
    pub tags: Vec<String>,
    pub category: String,
}

/// Result of [`Document::update`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A new revision was appended.
    Applied(Revision),
    /// The submitted content equals the current content; nothing was recorded.
    NoChange,
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn revision(&self) -> Option<&Revision> {
        match self {
            Self::Applied(rev) => Some(rev),
            Self::NoChange => None,
        }
    }
}

/// A text document and its complete revision chain.
///
/// Fields are private so that `content` and `contributors` can only move in
/// step with `revisions`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    header: DocumentHeader,
    content: String,
    contributors: Contributors,
    revisions: Vec<Revision>,
}

impl Document {
    /// Create a document whose first revision inserts all of `content`.
    pub fn create(
        title: &str,
        namespace: &str,
        content: &str,
        author: &str,
        origin_address: &str,
    ) -> DocumentResult<Self> {
        validate_title(title)?;
        validate_namespace(namespace)?;
        validate_revision_input(content, author, origin_address)?;

        let created_at = Timestamp::now();
        let genesis = Revision::new(author, origin_address, created_at.clone(), diff("", content));
        let mut contributors = Contributors::new();
        contributors.insert(author);

        Ok(Self {
            header: DocumentHeader {
                doc_id: DocumentId::new(),
                title: title.to_string(),
                namespace: namespace.to_string(),
                created_at,
                tags: Vec::new(),
                category: String::new(),
            },
            content: content.to_string(),
            contributors,
            revisions: vec![genesis],
        })
    }

    /// Reassemble a document from decoded parts. Content and contributors are
    /// derived from the revisions, never taken on trust.
    pub fn from_parts(header: DocumentHeader, revisions: Vec<Revision>) -> DocumentResult<Self> {
        let content = replay(&revisions)?;
        let contributors = revisions.iter().map(|r| r.author.as_str()).collect();
        Ok(Self {
            header,
            content,
            contributors,
            revisions,
        })
    }

    /// Record `content` as the new current text.
    ///
    /// Diffs against the current content. An empty diff appends nothing and
    /// returns [`UpdateOutcome::NoChange`].
    pub fn update(
        &mut self,
        content: &str,
        author: &str,
        origin_address: &str,
    ) -> DocumentResult<UpdateOutcome> {
        validate_revision_input(content, author, origin_address)?;

        let ops = diff(&self.content, content);
        if ops.is_empty() {
            debug!(doc_id = %self.header.doc_id, author, "update carries no changes");
            return Ok(UpdateOutcome::NoChange);
        }

        let stats = DiffStats::of(&ops);
        let timestamp = Timestamp::now_after(self.latest_timestamp());
        let revision = Revision::new(author, origin_address, timestamp, ops);

        self.content = content.to_string();
        self.contributors.insert(author);
        self.revisions.push(revision.clone());

        debug!(
            doc_id = %self.header.doc_id,
            revision = %revision.revision_id().short_hex(),
            additions = stats.additions,
            deletions = stats.deletions,
            "revision appended"
        );
        Ok(UpdateOutcome::Applied(revision))
    }

    /// Rebuild the content from empty by replaying every revision.
    pub fn replay(&self) -> DocumentResult<String> {
        Ok(replay(&self.revisions)?)
    }

    /// Replace the tag list (order kept, duplicates dropped).
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.into();
            if !unique.contains(&tag) {
                unique.push(tag);
            }
        }
        self.header.tags = unique;
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.header.category = category.into();
    }

    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    pub fn doc_id(&self) -> &DocumentId {
        &self.header.doc_id
    }

    pub fn title(&self) -> &str {
        &self.header.title
    }

    pub fn namespace(&self) -> &str {
        &self.header.namespace
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.header.created_at
    }

    pub fn tags(&self) -> &[String] {
        &self.header.tags
    }

    pub fn category(&self) -> &str {
        &self.header.category
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn contributors(&self) -> &Contributors {
        &self.contributors
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    pub fn revision_count(&self) -> usize {
        self.revisions.len()
    }

    /// Time of the last revision, or `created_at` for a document without one.
    pub fn latest_timestamp(&self) -> &Timestamp {
        self.revisions
            .last()
            .map(|r| &r.timestamp)
            .unwrap_or(&self.header.created_at)
    }
}

fn validate_title(title: &str) -> DocumentResult<()> {
    if title.trim().is_empty() {
        return Err(DocumentError::invalid("title", "must not be empty"));
    }
    if title == "." || title == ".." {
        return Err(DocumentError::invalid("title", "must not be a relative path"));
    }
    if title.contains(['/', '\\', '\n', '\r', '\0']) {
        return Err(DocumentError::invalid(
            "title",
            "must not contain path separators or control characters",
        ));
    }
    Ok(())
}

fn validate_namespace(namespace: &str) -> DocumentResult<()> {
    if namespace.is_empty() {
        return Ok(());
    }
    for segment in namespace.split('/') {
        if segment.trim().is_empty() || segment == "." || segment == ".." {
            return Err(DocumentError::invalid(
                "namespace",
                format!("invalid segment {segment:?}"),
            ));
        }
        if segment.contains(['\\', '\n', '\r', '\0']) {
            return Err(DocumentError::invalid(
                "namespace",
                "must not contain backslashes or control characters",
            ));
        }
    }
    Ok(())
}

fn validate_revision_input(content: &str, author: &str, origin_address: &str) -> DocumentResult<()> {
    if content.contains('\0') {
        return Err(DocumentError::invalid("content", "contains a NUL character"));
    }
    if author.is_empty() {
        return Err(DocumentError::invalid("author", "must not be empty"));
    }
    if author.contains([':', '\n', '\r']) {
        return Err(DocumentError::invalid(
            "author",
            "must not contain ':' or line breaks",
        ));
    }
    if origin_address.contains(['\n', '\r']) {
        return Err(DocumentError::invalid(
            "origin address",
            "must not contain line breaks",
        ));
    }
    // REVUSER lines are trimmed on read.
    if author.trim() != author {
        return Err(DocumentError::invalid("author", "must not have surrounding whitespace"));
    }
    if origin_address.trim_end() != origin_address {
        return Err(DocumentError::invalid(
            "origin address",
            "must not end with whitespace",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opwi_types::ChangeOp;

    fn home() -> Document {
        Document::create("Home", "main", "Hello world", "alice", "127.0.0.1").unwrap()
    }

    #[test]
    fn create_records_genesis_insert() {
        let doc = home();
        assert_eq!(doc.content(), "Hello world");
        assert_eq!(doc.revision_count(), 1);
        assert!(doc.revisions()[0].is_pure_insert());
        assert_eq!(
            doc.revisions()[0].ops,
            vec![ChangeOp::insert(0, 1, "Hello world")]
        );
        assert_eq!(doc.contributors().as_slice(), ["alice"]);
        assert_eq!(doc.created_at(), &doc.revisions()[0].timestamp);
    }

    #[test]
    fn create_allocates_unique_ids() {
        assert_ne!(home().doc_id(), home().doc_id());
    }

    #[test]
    fn update_appends_line_insert() {
        let mut doc = home();
        let outcome = doc
            .update("Hello world\nSecond line", "bob", "10.0.0.2")
            .unwrap();
        let rev = outcome.revision().unwrap();
        assert_eq!(rev.ops, vec![ChangeOp::insert(1, 1, "Second line")]);
        assert_eq!(doc.content(), "Hello world\nSecond line");
        assert_eq!(doc.revision_count(), 2);
        assert_eq!(doc.contributors().as_slice(), ["alice", "bob"]);
    }

    #[test]
    fn identical_update_is_no_change() {
        let mut doc = home();
        let before = doc.clone();
        let outcome = doc.update("Hello world", "bob", "10.0.0.2").unwrap();
        assert_eq!(outcome, UpdateOutcome::NoChange);
        assert_eq!(doc, before);
        assert!(!doc.contributors().contains("bob"));
    }

    #[test]
    fn timestamps_strictly_increase() {
        let mut doc = home();
        for i in 0..20 {
            doc.update(&format!("v{i}"), "alice", "127.0.0.1").unwrap();
        }
        for pair in doc.revisions().windows(2) {
            assert!(pair[0].timestamp.is_before(&pair[1].timestamp));
        }
    }

    #[test]
    fn replay_matches_content() {
        let mut doc = home();
        doc.update("Hello\nworld\n", "bob", "::1").unwrap();
        doc.update("world\n", "carol", "::1").unwrap();
        doc.update("", "alice", "::1").unwrap();
        doc.update("reborn", "dave", "::1").unwrap();
        assert_eq!(doc.replay().unwrap(), doc.content());
        assert_eq!(doc.content(), "reborn");
    }

    #[test]
    fn from_parts_derives_content_and_contributors() {
        let mut doc = home();
        doc.update("Hello world\nmore", "bob", "::1").unwrap();
        let rebuilt =
            Document::from_parts(doc.header().clone(), doc.revisions().to_vec()).unwrap();
        assert_eq!(rebuilt, doc);
    }

    #[test]
    fn from_parts_rejects_broken_chain() {
        let doc = home();
        let mut revisions = doc.revisions().to_vec();
        revisions.push(Revision::new(
            "mallory",
            "::1",
            Timestamp::now(),
            vec![ChangeOp::delete(7, 1, "x")],
        ));
        let err = Document::from_parts(doc.header().clone(), revisions).unwrap_err();
        assert!(matches!(err, DocumentError::Replay(_)));
    }

    #[test]
    fn empty_document_is_allowed() {
        let doc = Document::create("Blank", "main", "", "alice", "::1").unwrap();
        assert_eq!(doc.content(), "");
        assert!(doc.revisions()[0].is_empty());
    }

    #[test]
    fn invalid_inputs_rejected() {
        let cases = [
            Document::create("", "main", "x", "alice", "::1"),
            Document::create("a/b", "main", "x", "alice", "::1"),
            Document::create("..", "main", "x", "alice", "::1"),
            Document::create("Home", "main//x", "x", "alice", "::1"),
            Document::create("Home", "../etc", "x", "alice", "::1"),
            Document::create("Home", "main", "nul\0byte", "alice", "::1"),
            Document::create("Home", "main", "x", "al:ice", "::1"),
            Document::create("Home", "main", "x", "", "::1"),
            Document::create("Home", "main", "x", "alice", "a\nb"),
            Document::create("Home", "main", "x", " alice", "::1"),
        ];
        for case in cases {
            assert!(matches!(case, Err(DocumentError::InvalidContent { .. })));
        }
    }

    #[test]
    fn nested_namespace_accepted() {
        let doc = Document::create("Page", "wiki/guides", "x", "alice", "::1").unwrap();
        assert_eq!(doc.namespace(), "wiki/guides");
    }

    #[test]
    fn tags_are_deduplicated() {
        let mut doc = home();
        doc.set_tags(["intro", "home", "intro"]);
        doc.set_category("Landing");
        assert_eq!(doc.tags(), ["intro", "home"]);
        assert_eq!(doc.category(), "Landing");
    }
}
