//! Merge engine: prefix-aware combination of two transcripts

use serde::{Deserialize, Serialize};

use crate::llm::Message;

/// Which merge rule applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// Target was a prefix of source; target now holds source in full
    Prefix,
    /// Source was a prefix of target; target unchanged
    ReversePrefix,
    /// Histories diverge; source appended after target
    Concatenated,
}

impl MergeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMode::Prefix => "prefix",
            MergeMode::ReversePrefix => "reverse-prefix",
            MergeMode::Concatenated => "concatenated",
        }
    }
}

impl std::fmt::Display for MergeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the merged transcript of `target` absorbing `source`.
///
/// Equal transcripts resolve as [`MergeMode::Prefix`] with an unchanged result.
/// Divergent histories are concatenated without deduplication, even when
/// they share a leading run of messages.
pub fn merge_transcripts(target: &[Message], source: &[Message]) -> (Vec<Message>, MergeMode) {
    if source.starts_with(target) {
        (source.to_vec(), MergeMode::Prefix)
    } else if target.starts_with(source) {
        (target.to_vec(), MergeMode::ReversePrefix)
    } else {
        let mut merged = Vec::with_capacity(target.len() + source.len());
        merged.extend_from_slice(target);
        merged.extend_from_slice(source);
        (merged, MergeMode::Concatenated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(contents: &[&str]) -> Vec<Message> {
        contents.iter().map(|c| Message::user(*c)).collect()
    }

    #[test]
    fn test_target_prefix_of_source() {
        let (merged, mode) = merge_transcripts(&users(&["hi"]), &users(&["hi", "there"]));
        assert_eq!(mode, MergeMode::Prefix);
        assert_eq!(merged, users(&["hi", "there"]));
    }

    #[test]
    fn test_source_prefix_of_target() {
        let (merged, mode) = merge_transcripts(&users(&["hi", "there"]), &users(&["hi"]));
        assert_eq!(mode, MergeMode::ReversePrefix);
        assert_eq!(merged, users(&["hi", "there"]));
    }

    #[test]
    fn test_disjoint_concatenates() {
        let (merged, mode) = merge_transcripts(&users(&["a"]), &users(&["b"]));
        assert_eq!(mode, MergeMode::Concatenated);
        assert_eq!(merged, users(&["a", "b"]));
    }

    #[test]
    fn test_shared_prefix_then_divergence_concatenates_everything() {
        let (merged, mode) = merge_transcripts(&users(&["x", "a"]), &users(&["x", "b"]));
        assert_eq!(mode, MergeMode::Concatenated);
        assert_eq!(merged, users(&["x", "a", "x", "b"]));
    }

    #[test]
    fn test_role_mismatch_is_divergence() {
        let target = vec![Message::user("same")];
        let source = vec![Message::assistant("same")];
        let (_, mode) = merge_transcripts(&target, &source);
        assert_eq!(mode, MergeMode::Concatenated);
    }

    #[test]
    fn test_empty_and_identical_inputs() {
        let (merged, mode) = merge_transcripts(&[], &users(&["a"]));
        assert_eq!((merged, mode), (users(&["a"]), MergeMode::Prefix));

        let (merged, mode) = merge_transcripts(&users(&["a"]), &[]);
        assert_eq!((merged, mode), (users(&["a"]), MergeMode::ReversePrefix));

        let (merged, mode) = merge_transcripts(&users(&["a", "b"]), &users(&["a", "b"]));
        assert_eq!((merged, mode), (users(&["a", "b"]), MergeMode::Prefix));
    }

    #[test]
    fn test_remerge_is_idempotent() {
        let target = users(&["hi"]);
        let source = users(&["hi", "there"]);
        let (once, _) = merge_transcripts(&target, &source);
        let (twice, mode) = merge_transcripts(&once, &source);
        assert_eq!(once, twice);
        assert_eq!(mode, MergeMode::Prefix);
    }

    #[test]
    fn test_mode_serializes_kebab_case() {
        let json = serde_json::to_value(MergeMode::ReversePrefix).unwrap();
        assert_eq!(json, "reverse-prefix");
        assert_eq!(MergeMode::Concatenated.to_string(), "concatenated");
    }
}
