//! Case- and diacritic-insensitive substring matching.
//!
//! # Invariants
//! - Matching is plain containment after folding both sides (lowercase,
//!   canonical decomposition, combining marks removed): not prefix, not
//!   tokenized.
//! - An empty needle matches every haystack, including `NULL`.
//! - SQL and Rust callers share one implementation (`contains_ignore_case`).

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// SQL name of the registered containment function.
pub const CONTAINS_FN: &str = "todo_contains";

/// Returns whether `haystack` contains `needle`, ignoring case and diacritics.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    fold(haystack).contains(&fold(needle))
}

/// Lowercases, decomposes (NFD) and strips combining marks, so `"Café"`
/// and `"CAFE"` both fold to `"cafe"`.
fn fold(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Registers `todo_contains(haystack, needle)` on `conn`.
///
/// `NULL` haystacks behave like empty strings, matching how nullable
/// `title`/`description` columns are normalized on read.
pub fn register_search_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CONTAINS_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = ctx.get::<Option<String>>(0)?.unwrap_or_default();
            let needle = ctx.get::<Option<String>>(1)?.unwrap_or_default();
            Ok(contains_ignore_case(&haystack, &needle))
        },
    )
}
