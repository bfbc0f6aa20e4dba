//! Document assembly
//!
//! Realizes an [`AssemblyPlan`] one entry at a time through a
//! [`PageWriter`]. The driver here knows nothing about PDF; the lopdf
//! backend lives in [`pdf`] and the async file helpers in [`io`].

pub mod io;
pub mod pdf;

use crate::fit::fit_page;
use crate::types::*;

/// Read access to an input document
pub trait PageDocument {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Geometry of page `index` (0-based)
    fn page_geometry(&self, index: usize) -> Result<Geometry>;

    /// Geometry of every page, in page order
    fn page_geometries(&self) -> Result<Vec<Geometry>> {
        (0..self.page_count())
            .map(|index| self.page_geometry(index))
            .collect()
    }
}

/// Copies pages into an output document under construction
pub trait PageWriter<D: ?Sized> {
    /// Append page `index` (0-based) of `document` to the output.
    ///
    /// With `fit` set, the page content is scaled into `fit.target`
    /// rather than copied verbatim.
    fn copy_page(
        &mut self,
        role: DocumentRole,
        document: &D,
        index: usize,
        fit: Option<&PageFit>,
    ) -> Result<()>;
}

/// Receives the fraction of the plan realized so far, once per entry
pub trait ProgressSink {
    fn report_progress(&mut self, fraction_done: f32);
}

impl<F: FnMut(f32)> ProgressSink for F {
    fn report_progress(&mut self, fraction_done: f32) {
        self(fraction_done)
    }
}

/// Progress sink that discards every report
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report_progress(&mut self, _fraction_done: f32) {}
}

/// Copy every plan entry, in order, into `writer`.
///
/// Source entries are fitted onto their target frame. Any failure aborts
/// the remaining entries and is wrapped in [`InsertError::Assembly`] with
/// the 0-based entry index; whatever the writer holds at that point must
/// be discarded.
pub fn assemble<D, W, P>(
    plan: &AssemblyPlan,
    base: &D,
    source: &D,
    writer: &mut W,
    progress: &mut P,
) -> Result<()>
where
    D: PageDocument + ?Sized,
    W: PageWriter<D> + ?Sized,
    P: ProgressSink + ?Sized,
{
    let total = plan.len();
    let source_geometries = source.page_geometries()?;

    for (entry, page) in plan.iter().enumerate() {
        copy_entry(page, base, source, &source_geometries, writer).map_err(|e| InsertError::Assembly {
            entry,
            source: Box::new(e),
        })?;

        progress.report_progress((entry + 1) as f32 / total as f32);
    }

    log::debug!("Assembled {} plan entries", total);
    Ok(())
}

fn copy_entry<D, W>(
    page: &PageRef,
    base: &D,
    source: &D,
    source_geometries: &[Geometry],
    writer: &mut W,
) -> Result<()>
where
    D: PageDocument + ?Sized,
    W: PageWriter<D> + ?Sized,
{
    match *page {
        PageRef::Base { index } => {
            log::debug!("Copying base page {}", index + 1);
            writer.copy_page(DocumentRole::Base, base, index, None)
        }
        PageRef::Source { index, target } => {
            let geometry = source_geometries.get(index).copied().ok_or(
                InsertError::PageOutOfRange {
                    page: index + 1,
                    count: source_geometries.len(),
                },
            )?;
            let fit = fit_page(geometry, target)?;
            log::debug!(
                "Copying source page {} fitted by {}",
                index + 1,
                fit.transform.cm_operator()
            );
            writer.copy_page(DocumentRole::Source, source, index, Some(&fit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4: Geometry = Geometry::new(595.0, 842.0);
    const LETTER: Geometry = Geometry::new(612.0, 792.0);

    struct FakeDocument {
        pages: Vec<Geometry>,
    }

    impl PageDocument for FakeDocument {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_geometry(&self, index: usize) -> Result<Geometry> {
            self.pages
                .get(index)
                .copied()
                .ok_or_else(|| InsertError::Config(format!("no page {index}")))
        }
    }

    /// Records every copy request instead of writing anything
    #[derive(Default)]
    struct RecordingWriter {
        copies: Vec<(DocumentRole, usize, Option<PageFit>)>,
        fail_at: Option<usize>,
    }

    impl PageWriter<FakeDocument> for RecordingWriter {
        fn copy_page(
            &mut self,
            role: DocumentRole,
            _document: &FakeDocument,
            index: usize,
            fit: Option<&PageFit>,
        ) -> Result<()> {
            if self.fail_at == Some(self.copies.len()) {
                return Err(InsertError::Config("writer refused".into()));
            }
            self.copies.push((role, index, fit.copied()));
            Ok(())
        }
    }

    fn documents() -> (FakeDocument, FakeDocument) {
        (
            FakeDocument {
                pages: vec![A4; 3],
            },
            FakeDocument {
                pages: vec![LETTER; 2],
            },
        )
    }

    #[test]
    fn test_copies_in_plan_order() {
        let (base, source) = documents();
        let geometries = base.page_geometries().unwrap();
        let plan =
            crate::build_plan(&geometries, &[2], &[2], InsertionPolicy::InsertBefore).unwrap();

        let mut writer = RecordingWriter::default();
        assemble(&plan, &base, &source, &mut writer, &mut NoProgress).unwrap();

        let order: Vec<_> = writer.copies.iter().map(|(r, i, _)| (*r, *i)).collect();
        assert_eq!(
            order,
            vec![
                (DocumentRole::Base, 0),
                (DocumentRole::Source, 1),
                (DocumentRole::Base, 1),
                (DocumentRole::Base, 2),
            ]
        );
        assert!(writer.copies[0].2.is_none());

        let fit = writer.copies[1].2.unwrap();
        assert_eq!(fit.target, A4);
        assert_eq!(fit, crate::fit::fit_page(LETTER, A4).unwrap());
    }

    #[test]
    fn test_progress_reported_once_per_entry() {
        let (base, source) = documents();
        let plan = crate::build_plan(&[A4; 3], &[1, 2], &[], InsertionPolicy::Append).unwrap();

        let mut reports = Vec::new();
        let mut sink = |fraction: f32| reports.push(fraction);
        assemble(&plan, &base, &source, &mut RecordingWriter::default(), &mut sink).unwrap();

        assert_eq!(reports.len(), 5);
        assert!(reports.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*reports.last().unwrap(), 1.0);
    }

    #[test]
    fn test_failure_names_the_entry() {
        let (base, source) = documents();
        let plan = crate::build_plan(&[A4; 3], &[1], &[], InsertionPolicy::Append).unwrap();

        let mut writer = RecordingWriter {
            fail_at: Some(2),
            ..Default::default()
        };
        let mut reports = 0;
        let result = assemble(&plan, &base, &source, &mut writer, &mut |_: f32| reports += 1);

        assert!(matches!(result, Err(InsertError::Assembly { entry: 2, .. })));
        assert_eq!(reports, 2);
    }

    #[test]
    fn test_missing_source_page_names_the_entry() {
        let (base, source) = documents();
        let plan = crate::build_plan(&[A4; 3], &[5], &[], InsertionPolicy::Append).unwrap();

        let result = assemble(
            &plan,
            &base,
            &source,
            &mut RecordingWriter::default(),
            &mut NoProgress,
        );
        match result {
            Err(InsertError::Assembly { entry, source }) => {
                assert_eq!(entry, 3);
                assert!(matches!(
                    *source,
                    InsertError::PageOutOfRange { page: 5, count: 2 }
                ));
            }
            other => panic!("expected assembly error, got {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_source_page_aborts() {
        let base = FakeDocument { pages: vec![A4] };
        let source = FakeDocument {
            pages: vec![Geometry::new(0.0, 100.0)],
        };
        let plan = crate::build_plan(&[A4], &[1], &[1], InsertionPolicy::Replace).unwrap();

        let result = assemble(
            &plan,
            &base,
            &source,
            &mut RecordingWriter::default(),
            &mut NoProgress,
        );
        match result {
            Err(InsertError::Assembly { entry, source }) => {
                assert_eq!(entry, 0);
                assert!(matches!(*source, InsertError::InvalidGeometry { .. }));
            }
            other => panic!("expected assembly error, got {other:?}"),
        }
    }
}
