use super::{parse_clamped_range, parse_number};
use crate::constants::{END_KEYWORD, MID_KEYWORD};
use crate::types::PositionList;

/// Parse insertion positions such as `"2,4,mid,end"`.
///
/// Positions are 1-based and may go up to `max_pages + 1`, which means
/// "after the last page". Unlike [`parse_range`](crate::parse_range) the
/// caller's order is kept and duplicates survive.
///
/// ```
/// use pdf_insert::parse_positions;
///
/// assert_eq!(parse_positions("mid", 10), vec![6]);
/// assert_eq!(parse_positions("end,1", 10), vec![11, 1]);
/// ```
pub fn parse_positions(text: &str, max_pages: usize) -> PositionList {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let upper = max_pages.saturating_add(1);
    let mut positions = Vec::new();

    for term in text.split(',') {
        let term = term.trim().to_lowercase();

        if term == MID_KEYWORD {
            positions.push(max_pages / 2 + 1);
        } else if term == END_KEYWORD {
            positions.push(upper);
        } else if term.contains('-') {
            if let Some(range) = parse_clamped_range(&term, upper) {
                positions.extend(range);
            }
        } else if let Some(position) = parse_number(&term) {
            if (1..=upper).contains(&position) {
                positions.push(position);
            }
        }
    }

    log::debug!("Parsed positions {:?} -> {:?}", text, positions);
    positions
}
