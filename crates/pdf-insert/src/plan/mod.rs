//! Insertion planning
//!
//! Turns a source page selection, a list of base positions and an
//! insertion policy into an [`AssemblyPlan`]: the exact page order of the
//! output document, decided before any document is touched.
//!
//! All inputs are 1-based page numbers; the plan's [`PageRef`]s are 0-based.

mod insert;
mod replace;

use crate::constants::DEFAULT_REFERENCE_GEOMETRY;
use crate::types::*;

/// Build the output page order.
///
/// `base_pages` holds the geometry of every base page, so its length is
/// the base page count. `selection` lists 1-based source pages in the
/// order they should be placed; `positions` lists 1-based base positions
/// (`base_pages.len() + 1` meaning "after the last page").
///
/// # Errors
/// - [`InsertError::EmptySelection`] if `selection` is empty
/// - [`InsertError::MissingPositions`] if the policy needs positions and
///   none were given
pub fn build_plan(
    base_pages: &[Geometry],
    selection: &[usize],
    positions: &[usize],
    policy: InsertionPolicy,
) -> Result<AssemblyPlan> {
    if selection.is_empty() {
        return Err(InsertError::EmptySelection);
    }
    if policy.uses_positions() && positions.is_empty() {
        return Err(InsertError::MissingPositions);
    }

    let entries = match policy {
        InsertionPolicy::Replace => replace::plan_replace(base_pages, selection, positions),
        InsertionPolicy::InsertBefore => {
            insert::plan_insert(base_pages, selection, positions, InsertSide::Before)
        }
        InsertionPolicy::InsertAfter => {
            insert::plan_insert(base_pages, selection, positions, InsertSide::After)
        }
        InsertionPolicy::Append => insert::plan_append(base_pages, selection),
    };

    let plan = AssemblyPlan {
        policy,
        base_page_count: base_pages.len(),
        entries,
    };

    log::info!(
        "Planned {:?}: {} base pages + {} source pages -> {} output pages",
        policy,
        plan.base_page_count,
        plan.source_page_count(),
        plan.len()
    );

    Ok(plan)
}

/// Which side of a base position inserted pages land on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertSide {
    Before,
    After,
}

/// Shared target frame for inserted and appended pages: the first base
/// page, or A4 when the base document is empty.
pub fn reference_geometry(base_pages: &[Geometry]) -> Geometry {
    base_pages
        .first()
        .copied()
        .unwrap_or(DEFAULT_REFERENCE_GEOMETRY)
}

/// Pair each selected page with a position, by list order.
///
/// When there are fewer positions than pages the last position is
/// repeated; positions beyond the selection are left unused. Both values
/// are returned 1-based as given. `positions` must not be empty.
pub(crate) fn pair_by_order(selection: &[usize], positions: &[usize]) -> Vec<(usize, usize)> {
    let last = positions.last().copied().unwrap_or(1);

    if positions.len() > selection.len() {
        log::warn!(
            "{} positions given for {} pages; ignoring {:?}",
            positions.len(),
            selection.len(),
            &positions[selection.len()..]
        );
    }

    selection
        .iter()
        .enumerate()
        .map(|(i, &page)| (positions.get(i).copied().unwrap_or(last), page))
        .collect()
}
