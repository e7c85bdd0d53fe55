use opwi_diff::apply_ops;

use crate::contributors::Contributors;
use crate::document::Document;

/// Result of document validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub revision_count: usize,
    pub replay_consistent: bool,
    pub genesis_is_insert: bool,
    pub timestamps_ordered: bool,
    pub contributors_match: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Index of the offending revision, if the violation is tied to one.
    pub revision: Option<usize>,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    MissingGenesis,
    GenesisNotInsert,
    ReplayFailed,
    ContentMismatch,
    TimestampRegression,
    ContributorMismatch,
}

/// Document integrity validator.
pub struct DocumentValidator;

impl DocumentValidator {
    /// Check every document invariant, collecting violations instead of failing.
    pub fn validate(document: &Document) -> ValidationReport {
        let revisions = document.revisions();
        let mut violations = Vec::new();
        let mut replay_consistent = true;
        let mut genesis_is_insert = true;
        let mut timestamps_ordered = true;

        match revisions.first() {
            None => {
                genesis_is_insert = false;
                violations.push(Violation {
                    revision: None,
                    kind: ViolationKind::MissingGenesis,
                    description: "document has no revisions".into(),
                });
            }
            Some(first) if !first.is_pure_insert() => {
                genesis_is_insert = false;
                violations.push(Violation {
                    revision: Some(0),
                    kind: ViolationKind::GenesisNotInsert,
                    description: "first revision contains non-insert ops".into(),
                });
            }
            Some(_) => {}
        }

        let mut content = String::new();
        for (index, revision) in revisions.iter().enumerate() {
            if index > 0 && revision.timestamp.is_before(&revisions[index - 1].timestamp) {
                timestamps_ordered = false;
                violations.push(Violation {
                    revision: Some(index),
                    kind: ViolationKind::TimestampRegression,
                    description: format!(
                        "{} is earlier than {}",
                        revision.timestamp,
                        revisions[index - 1].timestamp
                    ),
                });
            }

            if replay_consistent {
                match apply_ops(&content, &revision.ops) {
                    Ok(next) => content = next,
                    Err(e) => {
                        replay_consistent = false;
                        violations.push(Violation {
                            revision: Some(index),
                            kind: ViolationKind::ReplayFailed,
                            description: e.to_string(),
                        });
                    }
                }
            }
        }

        if replay_consistent && content != document.content() {
            replay_consistent = false;
            violations.push(Violation {
                revision: None,
                kind: ViolationKind::ContentMismatch,
                description: "materialized content differs from replay".into(),
            });
        }

        let expected: Contributors = revisions.iter().map(|r| r.author.as_str()).collect();
        let contributors_match = &expected == document.contributors();
        if !contributors_match {
            violations.push(Violation {
                revision: None,
                kind: ViolationKind::ContributorMismatch,
                description: "contributors differ from revision authors".into(),
            });
        }

        ValidationReport {
            revision_count: revisions.len(),
            replay_consistent,
            genesis_is_insert,
            timestamps_ordered,
            contributors_match,
            violations,
        }
    }
}
