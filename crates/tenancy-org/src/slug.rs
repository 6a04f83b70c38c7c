//! Slug helpers
//!
//! Deterministic slug derivation from names and numeric-suffix candidates
//! for collision disambiguation. Uniqueness itself is enforced by the store.

/// Derive a slug from a name.
///
/// Lowercases ASCII letters and digits, keeps `_`, turns runs of whitespace
/// and hyphens into a single `-`, and drops every other character. Leading
/// and trailing separators are removed and the result is cut to `max_len`.
///
/// # Examples
///
/// ```
/// use tenancy_org::slug::slugify;
///
/// assert_eq!(slugify("Acme Corp", 50), "acme-corp");
/// assert_eq!(slugify("  Hello,   World!! ", 50), "hello-world");
/// assert_eq!(slugify("Café Déjà", 50), "caf-dj");
/// ```
pub fn slugify(name: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }

    truncate(out.trim_matches(|c| c == '-' || c == '_'), max_len)
}

/// Slug for the `n`-th collision candidate.
///
/// Candidate 1 is the base itself; later candidates append `-n`, shortening
/// the base so the result stays within `max_len`.
///
/// # Examples
///
/// ```
/// use tenancy_org::slug::candidate;
///
/// assert_eq!(candidate("acme", 1, 50), "acme");
/// assert_eq!(candidate("acme", 2, 50), "acme-2");
/// assert_eq!(candidate("abcdef", 12, 6), "abc-12");
/// ```
pub fn candidate(base: &str, n: u32, max_len: usize) -> String {
    if n <= 1 {
        return truncate(base, max_len);
    }
    let suffix = format!("-{}", n);
    let room = max_len.saturating_sub(suffix.len());
    format!("{}{}", truncate(base, room), suffix)
}

/// Check that a caller-supplied slug is well formed.
///
/// Valid slugs are non-empty, at most `max_len` long, and contain only
/// ASCII letters, digits, `-` and `_`.
///
/// # Examples
///
/// ```
/// use tenancy_org::slug::is_valid_slug;
///
/// assert!(is_valid_slug("my-company", 50));
/// assert!(!is_valid_slug("my company", 50));
/// assert!(!is_valid_slug("", 50));
/// ```
pub fn is_valid_slug(slug: &str, max_len: usize) -> bool {
    !slug.is_empty()
        && slug.len() <= max_len
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn truncate(s: &str, max_len: usize) -> String {
    // slugs are ASCII, so byte indexing is safe
    let cut = if s.len() > max_len { &s[..max_len] } else { s };
    cut.trim_end_matches('-').to_string()
}
