//! Cell reference scanning in formula text.
//!
//! Finds the reference tokens (e.g. `A1`, `$B$2`) of an arithmetic formula so
//! the evaluator can check for self-reference and substitute cell values.
//! Exponent literals such as `1e3` are not mistaken for references.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::cell_ref::CellRef;

/// Regex matching a single reference token, with optional `$` anchors.
pub fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"(?:\$|\b)[A-Za-z]+\$?[0-9]+\b")
            .expect("cell reference regex must compile")
    })
}

/// Extract every cell reference in `expr`, in order of appearance.
pub fn extract_references(expr: &str) -> Vec<CellRef> {
    cell_ref_re()
        .find_iter(expr)
        .filter_map(|m| CellRef::from_str(m.as_str()))
        .collect()
}

/// Replace every reference token in `expr` with `value_of(reference)`.
/// Tokens that do not parse are left untouched.
pub fn substitute_references<F>(expr: &str, mut value_of: F) -> String
where
    F: FnMut(&CellRef) -> String,
{
    cell_ref_re()
        .replace_all(expr, |caps: &Captures| {
            let token = &caps[0];
            match CellRef::from_str(token) {
                Some(cell_ref) => value_of(&cell_ref),
                None => token.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_references_empty() {
        assert!(extract_references("").is_empty());
        assert!(extract_references("10 + 20").is_empty());
    }

    #[test]
    fn test_extract_references_multiple() {
        let refs = extract_references("A1 + $B$1 * (C2 - A10)");
        assert_eq!(
            refs,
            vec![
                CellRef::new(0, 0),
                CellRef::new(0, 1),
                CellRef::new(1, 2),
                CellRef::new(9, 0)
            ]
        );
    }

    #[test]
    fn test_exponent_literal_is_not_a_reference() {
        assert!(extract_references("1e3 + 2E5").is_empty());
    }

    #[test]
    fn test_substitute_references() {
        let out = substitute_references("A1+A10*B$2", |r| format!("[{}]", r));
        assert_eq!(out, "[A1]+[A10]*[B2]");
    }
}
