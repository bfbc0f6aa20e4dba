//! End-to-end merge of two loaded documents

use crate::assemble::pdf::PdfPageWriter;
use crate::assemble::{NoProgress, PageDocument, ProgressSink, assemble};
use crate::options::InsertOptions;
use crate::parse::{parse_positions, parse_range};
use crate::plan::build_plan;
use crate::stats::calculate_statistics;
use crate::types::*;
use lopdf::Document;

/// Resolve `options` against two documents into an assembly plan
pub fn plan_merge<D: PageDocument + ?Sized>(
    base: &D,
    source: &D,
    options: &InsertOptions,
) -> Result<AssemblyPlan> {
    let selection = parse_range(
        &options.pages,
        source.page_count(),
        options.select_all_on_empty,
    );
    let positions = if options.policy.uses_positions() {
        parse_positions(&options.positions, base.page_count())
    } else {
        Vec::new()
    };

    build_plan(&base.page_geometries()?, &selection, &positions, options.policy)
}

/// Merge `source` into `base` as `options` describe
pub fn merge_documents(
    base: &Document,
    source: &Document,
    options: &InsertOptions,
) -> Result<(Document, MergeStatistics)> {
    merge_documents_with_progress(base, source, options, &mut NoProgress)
}

/// [`merge_documents`], reporting progress once per output page
pub fn merge_documents_with_progress<P: ProgressSink + ?Sized>(
    base: &Document,
    source: &Document,
    options: &InsertOptions,
    progress: &mut P,
) -> Result<(Document, MergeStatistics)> {
    let plan = plan_merge(base, source, options)?;

    let mut writer = PdfPageWriter::new();
    assemble(&plan, base, source, &mut writer, progress)?;
    let output = writer.finish();

    let stats = calculate_statistics(&plan);
    log::info!(
        "Merged {} source pages into {} base pages -> {} pages ({} replaced)",
        stats.inserted_pages,
        stats.base_pages,
        stats.output_pages,
        stats.replaced_pages
    );
    Ok((output, stats))
}

/// Async merge; the work runs on tokio's blocking pool
pub async fn merge(
    base: Document,
    source: Document,
    options: &InsertOptions,
) -> Result<(Document, MergeStatistics)> {
    let options = options.clone();
    tokio::task::spawn_blocking(move || merge_documents(&base, &source, &options)).await?
}
