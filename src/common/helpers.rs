// Helper functions for safe logging and client scoping

/// Masks email addresses for safe logging
///
/// # Example
/// ```ignore
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***@***.***".to_string(),
    }
}

/// Masks bearer tokens for safe logging; shows only the first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

/// Local-storage namespace for a browser. Uses the client id header when the
/// browser sends one, otherwise the portal user id so the namespace outlives
/// any single login token.
pub fn storage_scope(client_id: Option<&str>, user_id: &str) -> String {
    match client_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => format!("client:{}", id),
        None => format!("user:{}", user_id),
    }
}
