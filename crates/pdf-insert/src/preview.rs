use crate::constants::DEFAULT_REFERENCE_GEOMETRY;
use crate::options::InsertOptions;
use crate::parse::{parse_positions, parse_range};
use crate::plan::build_plan;
use crate::types::*;
use std::fmt;

/// Where one source page ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageMapping {
    /// 1-based source page
    pub source_page: usize,
    /// 1-based base slot: the replaced page for Replace, the base page
    /// the source page follows for InsertAfter (0 on an empty base), and
    /// otherwise the base page it lands in front of (`base_pages + 1`
    /// meaning after the last page)
    pub base_position: usize,
}

/// What a merge would do, computed from page counts alone
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergePreview {
    pub policy: InsertionPolicy,
    pub base_pages: usize,
    pub selection: PageSelection,
    pub positions: PositionList,
    pub output_pages: usize,
    pub mappings: Vec<PageMapping>,
}

/// Resolve `options` against the page counts and describe the result.
///
/// No document is opened; the plan is built against placeholder page
/// geometry, which does not affect page order.
///
/// # Errors
/// Same as [`build_plan`]: an empty selection, or no positions for a
/// positional policy.
pub fn generate_preview(
    base_pages: usize,
    source_pages: usize,
    options: &InsertOptions,
) -> Result<MergePreview> {
    let selection = parse_range(&options.pages, source_pages, options.select_all_on_empty);
    let positions = if options.policy.uses_positions() {
        parse_positions(&options.positions, base_pages)
    } else {
        Vec::new()
    };

    let geometries = vec![DEFAULT_REFERENCE_GEOMETRY; base_pages];
    let plan = build_plan(&geometries, &selection, &positions, options.policy)?;

    Ok(MergePreview {
        policy: options.policy,
        base_pages,
        output_pages: plan.len(),
        mappings: page_mappings(&plan),
        selection,
        positions,
    })
}

fn page_mappings(plan: &AssemblyPlan) -> Vec<PageMapping> {
    let mut mappings = Vec::new();
    let mut base_seen = 0;

    for (offset, entry) in plan.iter().enumerate() {
        match entry {
            PageRef::Base { .. } => base_seen += 1,
            PageRef::Source { index, .. } => {
                let base_position = match plan.policy {
                    InsertionPolicy::Replace => offset + 1,
                    InsertionPolicy::InsertAfter => base_seen,
                    _ => base_seen + 1,
                };
                mappings.push(PageMapping {
                    source_page: index + 1,
                    base_position,
                });
            }
        }
    }

    mappings
}

impl fmt::Display for MergePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mode: {}", self.policy.label())?;
        writeln!(f, "Base pages: {}", self.base_pages)?;
        writeln!(f, "Source pages selected: {:?}", self.selection)?;
        if self.policy.uses_positions() {
            writeln!(f, "Positions: {:?}", self.positions)?;
        }
        writeln!(f, "Output pages: {}", self.output_pages)?;

        match self.policy {
            InsertionPolicy::Replace => {
                writeln!(f, "Replacement mapping:")?;
                for mapping in &self.mappings {
                    writeln!(
                        f,
                        "  source page {} -> base page {}",
                        mapping.source_page, mapping.base_position
                    )?;
                }
            }
            InsertionPolicy::InsertBefore | InsertionPolicy::InsertAfter => {
                writeln!(f, "Insertion points:")?;
                for mapping in &self.mappings {
                    let position = mapping.base_position;
                    let side = if self.policy == InsertionPolicy::InsertAfter {
                        "after"
                    } else {
                        "before"
                    };
                    if position == 0 || position > self.base_pages {
                        writeln!(f, "  source page {} -> end", mapping.source_page)?;
                    } else {
                        writeln!(
                            f,
                            "  source page {} -> {} base page {}",
                            mapping.source_page, side, position
                        )?;
                    }
                }
            }
            InsertionPolicy::Append => {
                writeln!(
                    f,
                    "Appending {} pages after base page {}",
                    self.mappings.len(),
                    self.base_pages
                )?;
            }
        }

        Ok(())
    }
}
