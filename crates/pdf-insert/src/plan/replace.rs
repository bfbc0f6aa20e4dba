//! Replace policy: source pages take over base page slots

use super::pair_by_order;
use crate::types::{Geometry, PageRef};

/// Walk the base document once, swapping in source pages at their targets.
///
/// Pairs are sorted by target position so a single forward pass suffices.
/// A target the walk has already passed (a repeated position) is dropped,
/// and targets past the last base page never land, so the output always
/// has exactly `base_pages.len()` entries.
pub(super) fn plan_replace(
    base_pages: &[Geometry],
    selection: &[usize],
    positions: &[usize],
) -> Vec<PageRef> {
    let mut pairs = pair_by_order(selection, positions);
    pairs.sort_unstable();

    let mut pending = pairs.iter().peekable();
    let mut entries = Vec::with_capacity(base_pages.len());

    for (index, geometry) in base_pages.iter().enumerate() {
        while let Some(&&(position, page)) = pending.peek() {
            if position.saturating_sub(1) >= index {
                break;
            }
            log::warn!(
                "Base position {} already replaced; source page {} dropped",
                position,
                page
            );
            pending.next();
        }

        match pending.peek() {
            Some(&&(position, page)) if position.saturating_sub(1) == index => {
                entries.push(PageRef::Source {
                    index: page.saturating_sub(1),
                    target: *geometry,
                });
                pending.next();
            }
            _ => entries.push(PageRef::Base { index }),
        }
    }

    for &(position, page) in pending {
        log::warn!(
            "Base position {} is past the last page; source page {} dropped",
            position,
            page
        );
    }

    entries
}
