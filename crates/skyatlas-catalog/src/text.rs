//! Text folding and collation helpers.

use std::cmp::Ordering;

/// Fold a string for comparison: transliterate to ASCII, then lowercase.
///
/// ```
/// use skyatlas_catalog::text::fold_key;
///
/// assert_eq!(fold_key("Łódź"), "lodz");
/// ```
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s).to_lowercase()
}

/// Collate two display strings the way a user-facing table sorts them.
///
/// Accents and case are ignored at the first level, so `"árbol"` sorts next
/// to `"arbol"` and `"berlin"` next to `"Berlin"`. Strings that fold equal are
/// ordered by lowercase form; strings differing only in case put lowercase
/// first, as ICU collation does.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    fold_key(a)
        .cmp(&fold_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}
