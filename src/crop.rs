use lopdf::{Document, Object};

use crate::error::ReviseError;

pub const POINTS_PER_INCH: f32 = 72.0;

/// Crop rectangle in PDF point units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

/// Strips the decorative header and footer that confuse table extraction
/// on the pre-split document vintage.
pub const HEADER_FOOTER_CROP: PageBox = PageBox {
    left: 0.0,
    bottom: 1.0 * POINTS_PER_INCH,
    right: 11.0 * POINTS_PER_INCH,
    top: 16.4 * POINTS_PER_INCH,
};

/// Rewrites every page's visible bounding box. The page content is left
/// untouched; extraction engines honor the MediaBox when deciding what to
/// read.
pub fn crop_to_box(pdf: &[u8], page_box: &PageBox) -> Result<Vec<u8>, ReviseError> {
    let mut document = Document::load_mem(pdf)?;
    let pages = document.get_pages();
    for page_id in pages.into_values() {
        let page = document
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)?;
        page.set(
            "MediaBox",
            vec![
                Object::Real(page_box.left),
                Object::Real(page_box.bottom),
                Object::Real(page_box.right),
                Object::Real(page_box.top),
            ],
        );
    }

    let mut output = Vec::new();
    document.save_to(&mut output)?;
    Ok(output)
}

/// Splits a document into independent left and right halves, for sources
/// where the extractor otherwise fuses side-by-side tables into one.
pub fn split_vertical(pdf: &[u8]) -> Result<(Vec<u8>, Vec<u8>), ReviseError> {
    let (width, height) = page_dimensions(pdf)?;
    let left = crop_to_box(
        pdf,
        &PageBox {
            left: 0.0,
            bottom: 0.0,
            right: width / 2.0,
            top: height,
        },
    )?;
    let right = crop_to_box(
        pdf,
        &PageBox {
            left: width / 2.0,
            bottom: 0.0,
            right: width,
            top: height,
        },
    )?;
    Ok((left, right))
}

/// Width and height of the first page, following the MediaBox inheritance
/// chain up the page tree when the page itself carries none.
pub fn page_dimensions(pdf: &[u8]) -> Result<(f32, f32), ReviseError> {
    let document = Document::load_mem(pdf)?;
    let pages = document.get_pages();
    let first = pages
        .values()
        .next()
        .copied()
        .ok_or_else(|| ReviseError::MalformedPdf("document has no pages".to_string()))?;

    let mut object_id = first;
    for _ in 0..8 {
        let dict = document.get_object(object_id).and_then(Object::as_dict)?;
        if let Ok(media_box) = dict.get(b"MediaBox") {
            let values = media_box.as_array().map_err(ReviseError::PdfLoad)?;
            let [left, bottom, right, top] = values.as_slice() else {
                return Err(ReviseError::MalformedPdf(
                    "MediaBox does not hold four coordinates".to_string(),
                ));
            };
            let (Some(left), Some(bottom), Some(right), Some(top)) =
                (number(left), number(bottom), number(right), number(top))
            else {
                return Err(ReviseError::MalformedPdf(
                    "MediaBox holds non-numeric coordinates".to_string(),
                ));
            };
            return Ok((right - left, top - bottom));
        }

        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => object_id = parent,
            Err(_) => break,
        }
    }

    Err(ReviseError::MalformedPdf(
        "no MediaBox found on the first page or its ancestors".to_string(),
    ))
}

#[allow(clippy::cast_precision_loss)]
fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}
