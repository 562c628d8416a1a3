use tracing::warn;

/// Trim `raw`, drop trailing slashes and default the scheme to `http://`.
///
/// Returns `None` for blank input so callers can fall through to the next
/// layer.
pub fn normalize_api_base(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.contains("://") {
        return Some(trimmed.to_string());
    }

    warn!(
        base = trimmed,
        "API base has no scheme; assuming http://"
    );
    Some(format!("http://{trimmed}"))
}

/// Split a comma separated list, dropping blank entries.
pub fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_base_urls() {
        assert_eq!(
            normalize_api_base(" https://panel.example/api/admin/ ").as_deref(),
            Some("https://panel.example/api/admin")
        );
        assert_eq!(
            normalize_api_base("localhost:3000/api/admin").as_deref(),
            Some("http://localhost:3000/api/admin")
        );
        assert_eq!(normalize_api_base("  /  "), None);
    }

    #[test]
    fn csv_drops_blank_entries() {
        assert_eq!(parse_csv("A, ,B,"), vec!["A".to_string(), "B".to_string()]);
    }
}
