// ============== Command Helpers ==============

/// Split `/cmd@botname rest...` into (`cmd`, `rest`).
///
/// Returns `None` when the text is not a command.
pub fn parse_command(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }

    let mut parts = text.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    Some((cmd, rest))
}

// ============== Handle Helpers ==============

/// Normalize free text into a bare handle: trim, then drop one leading `@`.
///
/// Returns `None` when nothing is left.
pub fn normalize_handle(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let bare = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
    if bare.is_empty() {
        None
    } else {
        Some(bare.to_string())
    }
}
