//! Multivalue cell splitting.
//!
//! A single cell may carry several logical values separated by the
//! configured multivalue separator. Splitting an empty cell yields exactly
//! one empty token; [`EmptyCellPolicy`] decides whether such tokens survive.

use curio_model::EmptyCellPolicy;

/// Split a cell on the multivalue separator, keeping tokens raw.
///
/// Tokens are not trimmed and empty tokens are kept, so
/// `split_cell("", ";")` yields `[""]` and `split_cell("a;;b", ";")` yields
/// `["a", "", "b"]`. The separator must be non-empty (configuration
/// validation guarantees this); an empty separator returns the cell whole.
pub fn split_cell<'a>(cell: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return vec![cell];
    }
    cell.split(separator).collect()
}

/// Split a cell, dropping empty tokens when the policy says so.
///
/// Tokens stay raw either way; under [`EmptyCellPolicy::Skip`] a token whose
/// trimmed form is empty is removed, so a blank cell produces no tokens.
pub fn split_with_policy<'a>(
    cell: &'a str,
    separator: &str,
    policy: EmptyCellPolicy,
) -> Vec<&'a str> {
    let tokens = split_cell(cell, separator);
    match policy {
        EmptyCellPolicy::Emit => tokens,
        EmptyCellPolicy::Skip => tokens
            .into_iter()
            .filter(|token| !token.trim().is_empty())
            .collect(),
    }
}

/// Split a cell and keep only non-empty trimmed tokens.
///
/// Used by the property and item-set mappers, which never emit empty values.
pub fn split_trimmed<'a>(cell: &'a str, separator: &str) -> Vec<&'a str> {
    split_cell(cell, separator)
        .into_iter()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}
