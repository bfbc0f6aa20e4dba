use super::{parse_clamped_range, parse_number};
use crate::constants::ALL_KEYWORD;
use crate::types::PageSelection;
use std::collections::BTreeSet;

/// Parse a page selection such as `"1-5,7,9-12"` or `"all"`.
///
/// Every returned page lies in `[1, max_pages]`; the result is ascending
/// and free of duplicates. Empty input selects nothing unless
/// `select_all_on_empty` is set, in which case it selects every page.
///
/// ```
/// use pdf_insert::parse_range;
///
/// assert_eq!(parse_range("3,1-2,2", 10, false), vec![1, 2, 3]);
/// assert_eq!(parse_range("ALL", 3, false), vec![1, 2, 3]);
/// assert_eq!(parse_range("", 3, true), vec![1, 2, 3]);
/// ```
pub fn parse_range(text: &str, max_pages: usize, select_all_on_empty: bool) -> PageSelection {
    let text = text.trim();

    if text.is_empty() {
        return if select_all_on_empty {
            (1..=max_pages).collect()
        } else {
            Vec::new()
        };
    }

    if text.eq_ignore_ascii_case(ALL_KEYWORD) {
        return (1..=max_pages).collect();
    }

    let mut pages = BTreeSet::new();

    for term in text.split(',').map(str::trim) {
        if term.contains('-') {
            if let Some(range) = parse_clamped_range(term, max_pages) {
                pages.extend(range);
            }
        } else if let Some(page) = parse_number(term) {
            if (1..=max_pages).contains(&page) {
                pages.insert(page);
            }
        }
    }

    let pages: PageSelection = pages.into_iter().collect();
    log::debug!("Parsed selection {:?} -> {:?}", text, pages);
    pages
}
