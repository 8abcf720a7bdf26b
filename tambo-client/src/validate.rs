//! Tool-result validation for the message-based submission flow.
//!
//! Before a caller-built message with `tool_result` blocks is submitted as a
//! continuation, its results are deduplicated and checked against the
//! thread's unresolved `tool_use` ids. Violations are structured values the
//! caller can render, not errors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use tambo_core::content::ContentBlock;

/// A `tool_result` block lifted out of message content.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResultEntry {
    /// The tool call this result answers.
    pub tool_use_id: String,
    /// Result content.
    pub content: Vec<ContentBlock>,
    /// Whether the tool failed.
    pub is_error: bool,
}

/// Deduplicated results plus the duplicate diagnostic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DedupedResults {
    /// One result per id, keeping first-appearance order.
    pub results: Vec<ToolResultEntry>,
    /// Ids that appeared more than once, in first-duplicate-encountered
    /// order. Diagnostic only.
    pub duplicate_tool_call_ids: Vec<String>,
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ValidationError {
    /// The submission leaves pending calls unanswered.
    #[serde(rename = "MISSING_RESULTS", rename_all = "camelCase")]
    MissingResults {
        /// Pending ids with no submitted result, in pending order.
        missing_tool_call_ids: Vec<String>,
    },
    /// The submission answers calls the thread never made (or already
    /// resolved).
    #[serde(rename = "EXTRA_RESULTS", rename_all = "camelCase")]
    ExtraResults {
        /// Submitted ids that match no pending call, in submission order.
        extra_tool_call_ids: Vec<String>,
    },
}

/// Pull `tool_result` blocks out of message content, in order.
#[must_use]
pub fn extract_tool_results(content: &[ContentBlock]) -> Vec<ToolResultEntry> {
    content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Some(ToolResultEntry {
                tool_use_id: tool_use_id.clone(),
                content: content.clone(),
                is_error: *is_error,
            }),
            _ => None,
        })
        .collect()
}

/// Collapse duplicate results for the same id.
///
/// Last write wins: a later result for an id replaces the earlier one in
/// place, so the output keeps first-appearance order with the freshest
/// content.
#[must_use]
pub fn dedupe_tool_results(results: Vec<ToolResultEntry>) -> DedupedResults {
    let mut by_id: IndexMap<String, ToolResultEntry> = IndexMap::new();
    let mut duplicates = Vec::new();
    for entry in results {
        let id = entry.tool_use_id.clone();
        if by_id.insert(id.clone(), entry).is_some() && !duplicates.contains(&id) {
            duplicates.push(id);
        }
    }
    DedupedResults {
        results: by_id.into_values().collect(),
        duplicate_tool_call_ids: duplicates,
    }
}

/// Check a deduplicated submission against the pending ids.
///
/// Missing results take priority over extra results when both hold. An empty
/// submission against no pending calls is valid.
pub fn validate_tool_results(
    submitted_ids: &[String],
    pending_ids: &[String],
) -> Result<(), ValidationError> {
    let missing: Vec<String> = pending_ids
        .iter()
        .filter(|id| !submitted_ids.contains(id))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingResults {
            missing_tool_call_ids: missing,
        });
    }

    let extra: Vec<String> = submitted_ids
        .iter()
        .filter(|id| !pending_ids.contains(id))
        .cloned()
        .collect();
    if !extra.is_empty() {
        return Err(ValidationError::ExtraResults {
            extra_tool_call_ids: extra,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn entry(id: &str, text: &str) -> ToolResultEntry {
        ToolResultEntry {
            tool_use_id: id.into(),
            content: vec![ContentBlock::text(text)],
            is_error: false,
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_skips_other_blocks() {
        let content = vec![
            ContentBlock::text("note"),
            ContentBlock::tool_result("c1", vec![ContentBlock::text("ok")], false),
        ];
        let results = extract_tool_results(&content);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tool_use_id, "c1");
    }

    #[test]
    fn test_dedupe_last_write_wins() {
        let deduped = dedupe_tool_results(vec![
            entry("c1", "first"),
            entry("c2", "only"),
            entry("c1", "second"),
        ]);
        assert_eq!(deduped.results.len(), 2);
        assert_eq!(deduped.results[0].tool_use_id, "c1");
        assert_eq!(deduped.results[0].content, vec![ContentBlock::text("second")]);
        assert_eq!(deduped.duplicate_tool_call_ids, ids(&["c1"]));
    }

    #[test]
    fn test_dedupe_reports_each_duplicate_once() {
        let deduped = dedupe_tool_results(vec![
            entry("c1", "a"),
            entry("c1", "b"),
            entry("c1", "c"),
            entry("c2", "d"),
            entry("c2", "e"),
        ]);
        assert_eq!(deduped.duplicate_tool_call_ids, ids(&["c1", "c2"]));
    }

    #[test]
    fn test_empty_submission_against_no_pending_is_valid() {
        assert_eq!(validate_tool_results(&[], &[]), Ok(()));
    }

    #[test]
    fn test_missing_results_in_pending_order() {
        let result = validate_tool_results(&ids(&["c1"]), &ids(&["c1", "c2", "c3"]));
        assert_eq!(
            result,
            Err(ValidationError::MissingResults {
                missing_tool_call_ids: ids(&["c2", "c3"]),
            })
        );
    }

    #[test]
    fn test_extra_results() {
        let result = validate_tool_results(&ids(&["c1", "c9"]), &ids(&["c1"]));
        assert_eq!(
            result,
            Err(ValidationError::ExtraResults {
                extra_tool_call_ids: ids(&["c9"]),
            })
        );
    }

    #[test]
    fn test_missing_takes_priority_over_extra() {
        let result = validate_tool_results(&ids(&["c9"]), &ids(&["c1"]));
        assert_eq!(
            result,
            Err(ValidationError::MissingResults {
                missing_tool_call_ids: ids(&["c1"]),
            })
        );
    }

    #[rstest]
    #[case(&["c1", "c2"], &["c1", "c2"], true)]
    #[case(&["c2", "c1"], &["c1", "c2"], true)]
    #[case(&[], &["c1"], false)]
    #[case(&["c1"], &[], false)]
    fn test_validate_cases(
        #[case] submitted: &[&str],
        #[case] pending: &[&str],
        #[case] valid: bool,
    ) {
        let result = validate_tool_results(&ids(submitted), &ids(pending));
        assert_eq!(result.is_ok(), valid);
    }

    #[test]
    fn test_validation_error_wire_codes() {
        let value = serde_json::to_value(ValidationError::MissingResults {
            missing_tool_call_ids: ids(&["c2"]),
        })
        .unwrap();
        assert_eq!(value["code"], "MISSING_RESULTS");
        assert_eq!(value["missingToolCallIds"], serde_json::json!(["c2"]));
    }
}
