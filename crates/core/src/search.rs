//! Title search helpers shared by the PostgreSQL and in-memory stores.

/// Escape `LIKE`/`ILIKE` wildcards so the query matches literally.
///
/// The result is meant for a pattern built as `'%' || $1 || '%'` with
/// `ESCAPE '\'`.
pub fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Case-insensitive substring match, the in-memory twin of `ILIKE '%q%'`.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
