//! Shared constants for page insertion
//!
//! Position keywords and fallback geometry used by the parsers, the
//! planner and the lopdf page writer.

use crate::types::Geometry;

// =============================================================================
// Selection and Position Keywords
// =============================================================================

/// Selects every page of the source document
pub const ALL_KEYWORD: &str = "all";

/// Resolves to the middle of the base document (`count / 2 + 1`)
pub const MID_KEYWORD: &str = "mid";

/// Resolves to the slot after the last base page (`count + 1`)
pub const END_KEYWORD: &str = "end";

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Reference page width in points when the base document has no pages (A4)
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 595.0;

/// Reference page height in points when the base document has no pages (A4)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 842.0;

/// Reference geometry used when the base document is empty
pub const DEFAULT_REFERENCE_GEOMETRY: Geometry =
    Geometry::new(DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Output
// =============================================================================

/// PDF version written for assembled documents
pub const OUTPUT_PDF_VERSION: &str = "1.7";

/// Resource name of the Form XObject holding a fitted source page
pub const FITTED_PAGE_XOBJECT: &str = "Src0";

/// Page attributes a page may inherit from its ancestors in the page tree
pub const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Deepest page tree walked when resolving inherited attributes
pub const MAX_PAGE_TREE_DEPTH: usize = 64;
