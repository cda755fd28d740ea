//! Operator index selection parsing.
//!
//! Two input forms:
//! - range form (`0,2,5-7,9-8`): bare indices and inclusive ranges in either
//!   direction; malformed tokens are dropped.
//! - strict form (`0,2,5`): bare indices only; any malformed token rejects
//!   the whole input.
//!
//! [`parse_operator_selection`] picks the form from the input.
//!
//! Both yield a sorted, de-duplicated list and reject the input when it is
//! empty or any index falls outside `[0, len)`.

use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

/// Why a selection was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Nothing valid was entered.
    Empty,
    /// An index is not in `[0, len)`.
    OutOfRange { index: usize, len: usize },
    /// A token is not a plain index (strict form only).
    Malformed(String),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::Empty => write!(f, "Select at least one valid index"),
            SelectionError::OutOfRange { index, len } => write!(
                f,
                "Index {} is out of range (valid: 0-{})",
                index,
                len.saturating_sub(1)
            ),
            SelectionError::Malformed(token) => write!(f, "'{}' is not a valid index", token),
        }
    }
}

impl std::error::Error for SelectionError {}

fn range_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s*-\s*(\d+)$").expect("valid regex"))
}

fn index_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("valid regex"))
}

/// Digit-only token to an index; values past `usize::MAX` saturate so they
/// fail the bounds check instead of vanishing.
fn parse_index(digits: &str) -> usize {
    digits.parse::<usize>().unwrap_or(usize::MAX)
}

/// Parse the range form against an inventory of `len` items.
pub fn parse_selection(input: &str, len: usize) -> Result<Vec<usize>, SelectionError> {
    let mut selected = BTreeSet::new();

    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(caps) = range_pattern().captures(token) {
            let (a, b) = (parse_index(&caps[1]), parse_index(&caps[2]));
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            // Check the upper bound before expanding the range.
            if end >= len {
                return Err(SelectionError::OutOfRange { index: end, len });
            }
            selected.extend(start..=end);
        } else if index_pattern().is_match(token) {
            let index = parse_index(token);
            if index >= len {
                return Err(SelectionError::OutOfRange { index, len });
            }
            selected.insert(index);
        }
    }

    if selected.is_empty() {
        return Err(SelectionError::Empty);
    }

    Ok(selected.into_iter().collect())
}

/// Parse the strict form against an inventory of `len` items.
pub fn parse_indices(input: &str, len: usize) -> Result<Vec<usize>, SelectionError> {
    let mut selected = BTreeSet::new();

    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !index_pattern().is_match(token) {
            return Err(SelectionError::Malformed(token.to_string()));
        }
        let index = parse_index(token);
        if index >= len {
            return Err(SelectionError::OutOfRange { index, len });
        }
        selected.insert(index);
    }

    if selected.is_empty() {
        return Err(SelectionError::Empty);
    }

    Ok(selected.into_iter().collect())
}

/// Parse operator input: the range form when it contains a `-`, else the
/// strict form, so a stray word in a plain list is rejected, not dropped.
pub fn parse_operator_selection(input: &str, len: usize) -> Result<Vec<usize>, SelectionError> {
    if input.contains('-') {
        parse_selection(input, len)
    } else {
        parse_indices(input, len)
    }
}
