//! Insert-before, insert-after and append policies

use super::{InsertSide, pair_by_order, reference_geometry};
use crate::types::{Geometry, PageRef};

/// Insert source pages around base positions.
///
/// Offsets are computed against the untouched base order and applied
/// from the highest down, so an insertion never shifts an offset that
/// still has to be processed. Pages sharing an offset come out in
/// ascending page order.
pub(super) fn plan_insert(
    base_pages: &[Geometry],
    selection: &[usize],
    positions: &[usize],
    side: InsertSide,
) -> Vec<PageRef> {
    let count = base_pages.len();
    let target = reference_geometry(base_pages);

    let mut pairs: Vec<(usize, usize)> = pair_by_order(selection, positions)
        .into_iter()
        .map(|(position, page)| (insertion_offset(position, count, side), page))
        .collect();
    pairs.sort_unstable_by(|a, b| b.cmp(a));

    let mut entries: Vec<PageRef> = (0..count).map(|index| PageRef::Base { index }).collect();
    entries.reserve(pairs.len());

    for (offset, page) in pairs {
        entries.insert(
            offset,
            PageRef::Source {
                index: page.saturating_sub(1),
                target,
            },
        );
    }

    entries
}

/// Every base page, then every selected page in selection order
pub(super) fn plan_append(base_pages: &[Geometry], selection: &[usize]) -> Vec<PageRef> {
    let target = reference_geometry(base_pages);

    (0..base_pages.len())
        .map(|index| PageRef::Base { index })
        .chain(selection.iter().map(|&page| PageRef::Source {
            index: page.saturating_sub(1),
            target,
        }))
        .collect()
}

/// 0-based offset into the base order for a 1-based position.
///
/// "After" the slot past the last page would overflow, so both sides are
/// clamped to `count` (a plain append).
fn insertion_offset(position: usize, count: usize, side: InsertSide) -> usize {
    match side {
        InsertSide::Before => position.saturating_sub(1).min(count),
        InsertSide::After => position.min(count),
    }
}
