//! lopdf backend for document assembly
//!
//! Base pages are copied object-for-object. Source pages that need
//! refitting are wrapped in a Form XObject and drawn onto a fresh page
//! the size of the target frame.

use super::{PageDocument, PageWriter};
use crate::constants::{
    DEFAULT_REFERENCE_GEOMETRY, FITTED_PAGE_XOBJECT, INHERITABLE_PAGE_KEYS, MAX_PAGE_TREE_DEPTH,
    OUTPUT_PDF_VERSION,
};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Object id remapping from one input document into the output
type ObjectCache = HashMap<ObjectId, ObjectId>;

/// `[llx lly urx ury]` used when a page has no usable MediaBox
const DEFAULT_MEDIA_BOX: [f32; 4] = [
    0.0,
    0.0,
    DEFAULT_REFERENCE_GEOMETRY.width,
    DEFAULT_REFERENCE_GEOMETRY.height,
];

const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

// =============================================================================
// Reading
// =============================================================================

impl PageDocument for Document {
    fn page_count(&self) -> usize {
        self.get_pages().len()
    }

    fn page_geometry(&self, index: usize) -> Result<Geometry> {
        let page_id = page_id(self, index)?;
        Ok(page_frame(self, page_id).geometry())
    }

    fn page_geometries(&self) -> Result<Vec<Geometry>> {
        Ok(self
            .get_pages()
            .into_values()
            .map(|page_id| page_frame(self, page_id).geometry())
            .collect())
    }
}

/// Object id of page `index` (0-based)
fn page_id(document: &Document, index: usize) -> Result<ObjectId> {
    let pages = document.get_pages();
    pages
        .values()
        .nth(index)
        .copied()
        .ok_or(InsertError::PageOutOfRange {
            page: index + 1,
            count: pages.len(),
        })
}

/// Visible area of a page in its own user space, plus its display rotation
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageFrame {
    /// `[llx lly urx ury]` with the lower-left corner first
    rect: [f32; 4],
    /// Clockwise quarter turns applied when the page is shown
    quarter_turns: u8,
}

impl PageFrame {
    fn width(&self) -> f32 {
        self.rect[2] - self.rect[0]
    }

    fn height(&self) -> f32 {
        self.rect[3] - self.rect[1]
    }

    /// Size of the page as a viewer shows it
    fn geometry(&self) -> Geometry {
        if self.quarter_turns % 2 == 1 {
            Geometry::new(self.height(), self.width())
        } else {
            Geometry::new(self.width(), self.height())
        }
    }

    /// Form matrix mapping the visible area, turned upright, onto
    /// `[0 0 width height]` of [`PageFrame::geometry`]
    fn form_matrix(&self) -> [f32; 6] {
        let [llx, lly, urx, ury] = self.rect;
        match self.quarter_turns {
            1 => [0.0, -1.0, 1.0, 0.0, 0.0 - lly, urx],
            2 => [-1.0, 0.0, 0.0, -1.0, urx, ury],
            3 => [0.0, 1.0, -1.0, 0.0, ury, 0.0 - llx],
            _ => [1.0, 0.0, 0.0, 1.0, 0.0 - llx, 0.0 - lly],
        }
    }
}

/// CropBox clipped to the MediaBox, with the page's `/Rotate`.
///
/// A missing CropBox, or one that misses the MediaBox entirely, shows the
/// whole MediaBox. A missing MediaBox reads as A4.
fn page_frame(document: &Document, page_id: ObjectId) -> PageFrame {
    let media_box = page_rectangle(document, page_id, b"MediaBox").unwrap_or_else(|| {
        log::debug!(
            "Page {:?} has no usable MediaBox, assuming {} x {}",
            page_id,
            DEFAULT_REFERENCE_GEOMETRY.width,
            DEFAULT_REFERENCE_GEOMETRY.height
        );
        DEFAULT_MEDIA_BOX
    });

    let rect = page_rectangle(document, page_id, b"CropBox")
        .and_then(|crop_box| intersect(crop_box, media_box))
        .unwrap_or(media_box);

    PageFrame {
        rect,
        quarter_turns: page_rotation(document, page_id),
    }
}

/// Rectangle stored under `key` on the page or an ancestor
fn page_rectangle(document: &Document, page_id: ObjectId, key: &[u8]) -> Option<[f32; 4]> {
    inherited_attribute(document, page_id, key)
        .and_then(|obj| document.dereference(obj).ok())
        .and_then(|(_, obj)| obj.as_array().ok())
        .and_then(|values| rectangle(values))
}

/// `/Rotate` as clockwise quarter turns; values off the 90 degree grid read as 0
fn page_rotation(document: &Document, page_id: ObjectId) -> u8 {
    let Some(degrees) = inherited_attribute(document, page_id, b"Rotate")
        .and_then(|obj| document.dereference(obj).ok())
        .and_then(|(_, obj)| extract_number(obj))
        .map(|value| value.round() as i64)
    else {
        return 0;
    };

    if degrees % 90 != 0 {
        log::debug!("Page {:?} has /Rotate {}, ignoring it", page_id, degrees);
        return 0;
    }
    (degrees.rem_euclid(360) / 90) as u8
}

/// Look `key` up on the page, then on each ancestor in the page tree
fn inherited_attribute<'a>(
    document: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = document.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = document.get_dictionary(parent).ok()?;
    }

    None
}

/// A `[llx lly urx ury]` rectangle with its corners put in order
fn rectangle(values: &[Object]) -> Option<[f32; 4]> {
    let [x0, y0, x1, y1] = values else {
        return None;
    };
    let (x0, y0) = (extract_number(x0)?, extract_number(y0)?);
    let (x1, y1) = (extract_number(x1)?, extract_number(y1)?);
    Some([x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)])
}

/// Overlap of two ordered rectangles, `None` when it has no area
fn intersect(a: [f32; 4], b: [f32; 4]) -> Option<[f32; 4]> {
    let rect = [a[0].max(b[0]), a[1].max(b[1]), a[2].min(b[2]), a[3].min(b[3])];
    (rect[0] < rect[2] && rect[1] < rect[3]).then_some(rect)
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// =============================================================================
// Writing
// =============================================================================

/// Builds the output document one page at a time.
///
/// Each input document gets its own object cache, so resources shared
/// between pages of the same input are copied once. Page ids are read
/// from the page tree on the first copy for a role, so a role must be
/// given the same document every time.
pub struct PdfPageWriter {
    output: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    caches: HashMap<DocumentRole, ObjectCache>,
    page_ids: HashMap<DocumentRole, Vec<ObjectId>>,
}

impl PdfPageWriter {
    pub fn new() -> Self {
        let mut output = Document::with_version(OUTPUT_PDF_VERSION);
        let pages_id = output.new_object_id();

        Self {
            output,
            pages_id,
            kids: Vec::new(),
            caches: HashMap::new(),
            page_ids: HashMap::new(),
        }
    }

    /// Pages written so far
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Write the page tree and catalog and hand back the finished document
    pub fn finish(mut self) -> Document {
        let count = self.kids.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.kids)),
            ("Count", Object::Integer(count)),
        ]);
        self.output
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.output.trailer.set("Root", catalog_id);

        log::debug!("Finished output document with {} pages", count);
        self.output
    }

    /// Copy a page dictionary as-is, pulling inherited attributes onto it
    fn copy_verbatim(
        &mut self,
        role: DocumentRole,
        document: &Document,
        page_id: ObjectId,
    ) -> Result<ObjectId> {
        let page = document.get_dictionary(page_id)?;
        let cache = self.caches.entry(role).or_default();

        // Reserve the id first so annotations pointing back at the page
        // (/P) resolve to the copy instead of pulling in the input page.
        let new_id = self.output.new_object_id();
        cache.insert(page_id, new_id);

        let mut copied = Dictionary::new();
        for (key, value) in page.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            copied.set(
                key.clone(),
                copy_object_deep(&mut self.output, document, value, cache)?,
            );
        }

        for key in INHERITABLE_PAGE_KEYS {
            if copied.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(document, page_id, key) {
                copied.set(
                    key.to_vec(),
                    copy_object_deep(&mut self.output, document, value, cache)?,
                );
            }
        }

        copied.set("Parent", Object::Reference(self.pages_id));
        self.output
            .objects
            .insert(new_id, Object::Dictionary(copied));
        Ok(new_id)
    }

    /// Draw a page onto a new page of `fit.target` size
    fn copy_fitted(
        &mut self,
        role: DocumentRole,
        document: &Document,
        page_id: ObjectId,
        fit: &PageFit,
    ) -> Result<ObjectId> {
        let cache = self.caches.entry(role).or_default();
        let xobject_id = create_page_xobject(&mut self.output, document, page_id, cache)?;

        let content = format!(
            "q {} /{} Do Q\n",
            fit.transform.cm_operator(),
            FITTED_PAGE_XOBJECT
        );
        let content_id = self
            .output
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut xobjects = Dictionary::new();
        xobjects.set(FITTED_PAGE_XOBJECT, Object::Reference(xobject_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let page_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(fit.target.width),
                    Object::Real(fit.target.height),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
        ]);

        Ok(self.output.add_object(page_dict))
    }
}

impl Default for PdfPageWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PageWriter<Document> for PdfPageWriter {
    fn copy_page(
        &mut self,
        role: DocumentRole,
        document: &Document,
        index: usize,
        fit: Option<&PageFit>,
    ) -> Result<()> {
        let page_ids = self
            .page_ids
            .entry(role)
            .or_insert_with(|| document.get_pages().into_values().collect());
        let page_id = page_ids
            .get(index)
            .copied()
            .ok_or(InsertError::PageOutOfRange {
                page: index + 1,
                count: page_ids.len(),
            })?;

        let new_page = match fit {
            Some(fit) => self.copy_fitted(role, document, page_id, fit)?,
            None => self.copy_verbatim(role, document, page_id)?,
        };

        self.kids.push(Object::Reference(new_page));
        Ok(())
    }
}

// =============================================================================
// XObject Creation
// =============================================================================

/// Wrap a page's content and resources in a Form XObject.
///
/// The bounding box is the page's visible area. The form matrix turns it
/// upright and moves it to the origin, so the fit transform sees content
/// spanning `[0 0 width height]` of the page's displayed geometry.
fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut ObjectCache,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;
    let frame = page_frame(source, page_id);

    let content_data = get_page_content(source, page_dict)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set(
        "BBox",
        Object::Array(frame.rect.iter().map(|&v| Object::Real(v)).collect()),
    );

    let matrix = frame.form_matrix();
    if matrix != IDENTITY_MATRIX {
        xobject_dict.set(
            "Matrix",
            Object::Array(matrix.iter().map(|&v| Object::Real(v)).collect()),
        );
    }

    if let Some(resources) = inherited_attribute(source, page_id, b"Resources") {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content_data)))
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Decoded content of a page, with multiple streams joined by newlines
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()), // blank page
    };

    match doc.dereference(contents)? {
        (_, Object::Stream(stream)) => Ok(stream_content(stream)),
        (_, Object::Array(refs)) => {
            let mut result = Vec::new();
            for obj in refs {
                if let (_, Object::Stream(stream)) = doc.dereference(obj)? {
                    result.extend_from_slice(&stream_content(stream));
                    result.push(b'\n');
                }
            }
            Ok(result)
        }
        _ => Ok(Vec::new()),
    }
}

fn stream_content(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object into `output`, following references.
///
/// The output id of a referenced object is reserved and cached before its
/// body is copied, so reference cycles terminate and shared objects are
/// copied once. Page tree nodes not already in the cache become `null`:
/// following them would pull the whole input document along. Dangling
/// references are also written as `null`.
fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut ObjectCache,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let Ok(referenced) = source.get_object(*id) else {
                log::debug!("Dangling reference {:?} replaced with null", id);
                return Ok(Object::Null);
            };
            if is_page_tree_node(referenced) {
                return Ok(Object::Null);
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut ObjectCache,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

fn is_page_tree_node(obj: &Object) -> bool {
    obj.as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"Page" || name == b"Pages")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Apply a PDF matrix `[a b c d e f]` to a point
    fn apply(m: [f32; 6], x: f32, y: f32) -> (f32, f32) {
        (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
    }

    fn numbers(values: [i64; 4]) -> Vec<Object> {
        values.into_iter().map(Object::Integer).collect()
    }

    #[test]
    fn test_rectangle() {
        let values = vec![
            Object::Integer(10),
            Object::Integer(20),
            Object::Real(110.5),
            Object::Integer(220),
        ];
        assert_eq!(rectangle(&values), Some([10.0, 20.0, 110.5, 220.0]));
        assert_eq!(
            rectangle(&numbers([100, 200, 0, 0])),
            Some([0.0, 0.0, 100.0, 200.0])
        );

        assert_eq!(rectangle(&values[..3]), None);
        assert_eq!(
            rectangle(&[
                Object::Integer(0),
                Object::Integer(0),
                Object::Name(b"x".to_vec()),
                Object::Integer(1)
            ]),
            None
        );
    }

    #[test]
    fn test_intersect() {
        let media = [0.0, 0.0, 612.0, 792.0];
        assert_eq!(
            intersect([50.0, 50.0, 350.0, 350.0], media),
            Some([50.0, 50.0, 350.0, 350.0])
        );
        assert_eq!(
            intersect([500.0, -10.0, 700.0, 100.0], media),
            Some([500.0, 0.0, 612.0, 100.0])
        );
        assert_eq!(intersect([700.0, 0.0, 800.0, 100.0], media), None);
    }

    #[test]
    fn test_frame_matrix_turns_visible_area_upright() {
        let rect = [10.0, 20.0, 110.0, 220.0];

        for quarter_turns in 0..4 {
            let frame = PageFrame {
                rect,
                quarter_turns,
            };
            let geometry = frame.geometry();
            let m = frame.form_matrix();

            // Corners of the visible area land exactly on the displayed frame
            let mut corners: Vec<(f32, f32)> = [
                (10.0, 20.0),
                (110.0, 20.0),
                (10.0, 220.0),
                (110.0, 220.0),
            ]
            .into_iter()
            .map(|(x, y)| apply(m, x, y))
            .collect();
            corners.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(
                corners,
                vec![
                    (0.0, 0.0),
                    (0.0, geometry.height),
                    (geometry.width, 0.0),
                    (geometry.width, geometry.height)
                ],
                "quarter turns {quarter_turns}"
            );
        }

        // A clockwise quarter turn brings the original top-left to the top-right
        let turned = PageFrame {
            rect,
            quarter_turns: 1,
        };
        assert_eq!(turned.geometry(), Geometry::new(200.0, 100.0));
        assert_eq!(apply(turned.form_matrix(), 10.0, 220.0), (200.0, 100.0));
        assert_eq!(apply(turned.form_matrix(), 10.0, 20.0), (0.0, 100.0));

        let upright = PageFrame {
            rect: [0.0, 0.0, 612.0, 792.0],
            quarter_turns: 0,
        };
        assert_eq!(upright.form_matrix(), IDENTITY_MATRIX);
    }

    #[test]
    fn test_page_frame_reads_crop_and_rotation() {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("CropBox", Object::Array(numbers([50, 50, 350, 250]))),
        ]));
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("MediaBox", Object::Array(numbers([0, 0, 612, 792]))),
                ("Rotate", Object::Integer(-90)),
            ])),
        );

        let frame = page_frame(&doc, page);
        assert_eq!(frame.rect, [50.0, 50.0, 350.0, 250.0]);
        assert_eq!(frame.quarter_turns, 3);
        assert_eq!(frame.geometry(), Geometry::new(200.0, 300.0));

        doc.get_dictionary_mut(pages_id)
            .unwrap()
            .set("Rotate", Object::Integer(45));
        assert_eq!(page_rotation(&doc, page), 0);
    }

    #[test]
    fn test_deep_copy_terminates_on_cycles() {
        let mut source = Document::with_version("1.7");
        let a = source.new_object_id();
        let b = source.new_object_id();
        source.objects.insert(
            a,
            Object::Dictionary(Dictionary::from_iter(vec![("Next", Object::Reference(b))])),
        );
        source.objects.insert(
            b,
            Object::Dictionary(Dictionary::from_iter(vec![("Next", Object::Reference(a))])),
        );

        let mut output = Document::with_version("1.7");
        let mut cache = ObjectCache::new();
        let copied = copy_object_deep(&mut output, &source, &Object::Reference(a), &mut cache)
            .unwrap();

        let new_a = copied.as_reference().unwrap();
        let new_b = output
            .get_dictionary(new_a)
            .unwrap()
            .get(b"Next")
            .unwrap()
            .as_reference()
            .unwrap();
        let back = output
            .get_dictionary(new_b)
            .unwrap()
            .get(b"Next")
            .unwrap()
            .as_reference()
            .unwrap();
        assert_eq!(back, new_a);
        assert_eq!(output.objects.len(), 2);
    }

    #[test]
    fn test_deep_copy_shares_cached_objects() {
        let mut source = Document::with_version("1.7");
        let font = source.add_object(Dictionary::from_iter(vec![(
            "Type",
            Object::Name(b"Font".to_vec()),
        )]));
        let holder = Object::Array(vec![Object::Reference(font), Object::Reference(font)]);

        let mut output = Document::with_version("1.7");
        let mut cache = ObjectCache::new();
        let copied = copy_object_deep(&mut output, &source, &holder, &mut cache).unwrap();

        let refs = copied.as_array().unwrap();
        assert_eq!(
            refs[0].as_reference().unwrap(),
            refs[1].as_reference().unwrap()
        );
        assert_eq!(output.objects.len(), 1);
    }

    #[test]
    fn test_deep_copy_drops_page_tree_and_dangling_refs() {
        let mut source = Document::with_version("1.7");
        let page = source.add_object(Dictionary::from_iter(vec![(
            "Type",
            Object::Name(b"Page".to_vec()),
        )]));
        let link = Object::Array(vec![Object::Reference(page), Object::Reference((99, 0))]);

        let mut output = Document::with_version("1.7");
        let mut cache = ObjectCache::new();
        let copied = copy_object_deep(&mut output, &source, &link, &mut cache).unwrap();

        let values = copied.as_array().unwrap();
        assert_eq!(values.len(), 2);
        assert!(values.iter().all(|value| matches!(value, Object::Null)));
        assert!(output.objects.is_empty());
    }
}
