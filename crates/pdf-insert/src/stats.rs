use crate::types::*;

/// Count what a plan does to the base document
pub fn calculate_statistics(plan: &AssemblyPlan) -> MergeStatistics {
    let inserted_pages = plan.source_page_count();
    let kept_base_pages = plan.len() - inserted_pages;

    MergeStatistics {
        base_pages: plan.base_page_count,
        output_pages: plan.len(),
        inserted_pages,
        replaced_pages: plan.base_page_count.saturating_sub(kept_base_pages),
    }
}
