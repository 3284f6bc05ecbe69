//! Service-side identifiers derived from human-readable names.

/// Normalise `value` into a slug.
///
/// ASCII letters, digits, `_`, `-` and whitespace survive; everything else
/// (dots included) is dropped. The result is trimmed, lowercased, and runs of
/// `-`/whitespace collapse into a single `-`. `messages.po` becomes
/// `messagespo`, `onshape-newton` stays as is.
pub fn slugify(value: &str) -> String {
    let kept: String = value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_run = false;
    for c in kept.trim().chars() {
        if c == '-' || c.is_whitespace() {
            if !in_run {
                slug.push('-');
            }
            in_run = true;
        } else {
            slug.push(c.to_ascii_lowercase());
            in_run = false;
        }
    }
    slug
}
