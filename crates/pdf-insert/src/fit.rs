//! Fitting a foreign page onto the base document's page frame
//!
//! Source content is scaled uniformly so it fits entirely inside the
//! target frame, then centered along the axis with slack.

use crate::types::{Geometry, InsertError, PageFit, Result, Transform};

/// Compute the scale + translate that fits `source` into `target`.
///
/// # Errors
/// [`InsertError::InvalidGeometry`] if either rectangle has a zero,
/// negative or non-finite side.
///
/// ```
/// use pdf_insert::{Geometry, fit_transform};
///
/// let t = fit_transform(Geometry::new(100.0, 200.0), Geometry::new(100.0, 100.0)).unwrap();
/// assert_eq!(t.scale, 0.5);
/// assert_eq!(t.offset_x, 25.0);
/// assert_eq!(t.offset_y, 0.0);
/// ```
pub fn fit_transform(source: Geometry, target: Geometry) -> Result<Transform> {
    ensure_valid(source)?;
    ensure_valid(target)?;

    let scale = calculate_scale(source, target);
    let scaled_width = source.width * scale;
    let scaled_height = source.height * scale;

    Ok(Transform {
        scale,
        offset_x: ((target.width - scaled_width) / 2.0).max(0.0),
        offset_y: ((target.height - scaled_height) / 2.0).max(0.0),
    })
}

/// Fit `source` into `target` and keep the target frame alongside the transform
pub fn fit_page(source: Geometry, target: Geometry) -> Result<PageFit> {
    Ok(PageFit {
        target,
        transform: fit_transform(source, target)?,
    })
}

/// Largest uniform scale that keeps the whole source inside the target
fn calculate_scale(source: Geometry, target: Geometry) -> f32 {
    let scale_w = target.width / source.width;
    let scale_h = target.height / source.height;
    scale_w.min(scale_h)
}

fn ensure_valid(geometry: Geometry) -> Result<()> {
    if geometry.is_valid() {
        Ok(())
    } else {
        Err(InsertError::InvalidGeometry {
            width: geometry.width,
            height: geometry.height,
        })
    }
}
