use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsertError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No source pages selected")]
    EmptySelection,
    #[error("No insertion positions given for a positional insertion policy")]
    MissingPositions,
    #[error("Page {page} out of range for a document with {count} pages")]
    PageOutOfRange { page: usize, count: usize },
    #[error("Invalid page geometry: {width} x {height}")]
    InvalidGeometry { width: f32, height: f32 },
    #[error("Failed to assemble plan entry {entry}: {source}")]
    Assembly {
        entry: usize,
        #[source]
        source: Box<InsertError>,
    },
}

pub type Result<T> = std::result::Result<T, InsertError>;

/// Ascending, duplicate-free 1-based page numbers
pub type PageSelection = Vec<usize>;

/// 1-based positions in caller order. `page_count + 1` means "after the last page".
pub type PositionList = Vec<usize>;

/// How selected source pages are combined with the base document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InsertionPolicy {
    /// Source pages take the place of base pages at the given positions
    #[default]
    Replace,
    /// Source pages go immediately before the given base positions
    InsertBefore,
    /// Source pages go immediately after the given base positions
    InsertAfter,
    /// Source pages go after the last base page; positions are ignored
    Append,
}

impl InsertionPolicy {
    /// Whether this policy needs a position list
    pub fn uses_positions(self) -> bool {
        !matches!(self, InsertionPolicy::Append)
    }

    pub fn label(self) -> &'static str {
        match self {
            InsertionPolicy::Replace => "Replace existing pages",
            InsertionPolicy::InsertBefore => "Insert before position",
            InsertionPolicy::InsertAfter => "Insert after position",
            InsertionPolicy::Append => "Append at end",
        }
    }
}

/// Page rectangle size in points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    pub width: f32,
    pub height: f32,
}

impl Geometry {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when both sides are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Uniform scale followed by a translation, in target page space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Transform {
    /// PDF content stream `cm` operator for this transform
    pub fn cm_operator(&self) -> String {
        format!(
            "{} 0 0 {} {} {} cm",
            self.scale, self.scale, self.offset_x, self.offset_y
        )
    }
}

/// Everything the page writer needs to refit a foreign page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFit {
    /// Frame of the output page
    pub target: Geometry,
    /// Placement of the source content inside `target`
    pub transform: Transform,
}

/// Which input document a page comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentRole {
    Base,
    Source,
}

/// A single output page. Indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageRef {
    /// Copy base page `index` as-is
    Base { index: usize },
    /// Copy source page `index`, fitted onto `target`
    Source { index: usize, target: Geometry },
}

impl PageRef {
    pub fn role(&self) -> DocumentRole {
        match self {
            PageRef::Base { .. } => DocumentRole::Base,
            PageRef::Source { .. } => DocumentRole::Source,
        }
    }

    /// 0-based index within the owning document
    pub fn index(&self) -> usize {
        match self {
            PageRef::Base { index } | PageRef::Source { index, .. } => *index,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, PageRef::Source { .. })
    }
}

/// Fully resolved page order of the output document
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyPlan {
    pub policy: InsertionPolicy,
    pub base_page_count: usize,
    pub entries: Vec<PageRef>,
}

impl AssemblyPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageRef> {
        self.entries.iter()
    }

    /// Number of source pages that made it into the output
    pub fn source_page_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_source()).count()
    }
}

impl<'a> IntoIterator for &'a AssemblyPlan {
    type Item = &'a PageRef;
    type IntoIter = std::slice::Iter<'a, PageRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Counts describing a finished (or planned) merge
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeStatistics {
    /// Pages in the base document
    pub base_pages: usize,
    /// Pages in the output document
    pub output_pages: usize,
    /// Source pages placed in the output
    pub inserted_pages: usize,
    /// Base pages dropped because a source page took their place
    pub replaced_pages: usize,
}
