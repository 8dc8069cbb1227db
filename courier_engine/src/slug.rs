/// Normalize a campaign title or slug into a filesystem-safe directory name.
///
/// Alphanumerics are lowercased, runs of other characters become a single dash, and
/// `-`/`_` are kept. Leading and trailing separators are dropped.
pub fn sanitize_slug(raw: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else if ch == '-' || ch == '_' {
            if !slug.is_empty() {
                slug.push(ch);
            }
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    let slug = slug.trim_matches(&['-', '_'][..]);
    if slug.is_empty() {
        "campaign".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_become_dashed_lowercase() {
        assert_eq!(sanitize_slug("The Last Post!"), "the-last-post");
        assert_eq!(sanitize_slug("  harbor_route  "), "harbor_route");
    }

    #[test]
    fn empty_or_symbol_only_input_uses_default() {
        assert_eq!(sanitize_slug(""), "campaign");
        assert_eq!(sanitize_slug("?!*"), "campaign");
    }
}
