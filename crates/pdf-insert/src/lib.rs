pub mod assemble;
pub mod constants;
mod fit;
mod merge;
mod options;
mod parse;
mod plan;
mod preview;
mod stats;
mod types;

pub use assemble::io::{load_pdf, save_pdf};
pub use assemble::pdf::PdfPageWriter;
pub use assemble::{NoProgress, PageDocument, PageWriter, ProgressSink, assemble};
pub use fit::{fit_page, fit_transform};
pub use merge::{merge, merge_documents, merge_documents_with_progress, plan_merge};
pub use options::*;
pub use parse::{parse_positions, parse_range};
pub use plan::{build_plan, reference_geometry};
pub use preview::{MergePreview, PageMapping, generate_preview};
pub use stats::calculate_statistics;
pub use types::*;
