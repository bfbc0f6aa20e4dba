//! Page selection and position mini-language
//!
//! Both parsers are lenient: a term that cannot be understood is dropped
//! and the rest of the input still counts. Strict validation, if wanted,
//! belongs to whoever collects the text.

mod positions;
mod range;

pub use positions::parse_positions;
pub use range::parse_range;

use std::num::IntErrorKind;

/// Split `term` into the two sides of an `a-b` range.
///
/// Returns `None` for anything with more or fewer than one `-`.
fn split_range(term: &str) -> Option<(&str, &str)> {
    let (start, end) = term.split_once('-')?;
    if end.contains('-') {
        return None;
    }
    Some((start.trim(), end.trim()))
}

/// Parse a page number, saturating values too large for `usize`.
fn parse_number(text: &str) -> Option<usize> {
    match text.trim().parse::<usize>() {
        Ok(value) => Some(value),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(usize::MAX),
        Err(_) => None,
    }
}

/// Parse an `a-b` term and clamp it to `[1, upper]`.
///
/// `None` when either side is not a number; an empty range when the
/// clamped start lies past the clamped end.
fn parse_clamped_range(term: &str, upper: usize) -> Option<std::ops::RangeInclusive<usize>> {
    let (start, end) = split_range(term)?;
    let start = parse_number(start)?.max(1);
    let end = parse_number(end)?.min(upper);
    Some(start..=end)
}
