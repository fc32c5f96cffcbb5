//! Node id generation

/// Prefix of generated branch ids (`BRANCH-1`, `BRANCH-2`, ...)
pub const BRANCH_PREFIX: &str = "BRANCH";

/// Prefix of summary branch ids
pub const SUMMARY_PREFIX: &str = "SUMM";

/// Smallest `<prefix>-<n>` (n >= 1) for which `taken` is false
pub fn next_free_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut n: u64 = 1;
    loop {
        let candidate = format!("{}-{}", prefix, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Preferred id for a summary of `source_id`.
///
/// Strips any leading non-numeric part (`BRANCH-2A` becomes `SUMM-2A`);
/// ids without digits are kept whole (`ROOT` becomes `SUMM-ROOT`).
pub fn default_summary_id(source_id: &str) -> String {
    let suffix = source_id
        .find(|c: char| c.is_ascii_digit())
        .map(|idx| &source_id[idx..])
        .unwrap_or(source_id);
    format!("{}-{}", SUMMARY_PREFIX, suffix)
}
