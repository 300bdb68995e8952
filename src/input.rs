// Parsers for the free-text answers typed at the prompts.

/// Roles used when the user leaves the roles prompt empty.
pub const DEFAULT_INVITE_ROLES: [&str; 1] = ["read"];

/// Turn a 1-based menu answer into an index into a list of `len` items.
/// Non-numeric or out-of-range answers give `None`.
pub fn parse_selection(answer: &str, len: usize) -> Option<usize> {
    let k: usize = answer.trim().parse().ok()?;
    if (1..=len).contains(&k) {
        Some(k - 1)
    } else {
        None
    }
}

/// Split a comma-separated answer, trimming each element and dropping the
/// empty ones.
pub fn split_list(answer: &str) -> Vec<String> {
    answer
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Roles for an invitation; nothing typed means read-only.
pub fn parse_roles(answer: &str) -> Vec<String> {
    let roles = split_list(answer);
    if roles.is_empty() {
        DEFAULT_INVITE_ROLES.iter().map(|r| r.to_string()).collect()
    } else {
        roles
    }
}

/// `true` only for "yes", in any case.
pub fn parse_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

/// `answer`, or `default` when the answer is blank.
pub fn or_default(answer: &str, default: &str) -> String {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}
