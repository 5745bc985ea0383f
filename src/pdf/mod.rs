//! PDF access layer
//!
//! [`surface::DocumentSurface`] is the contract the annotation core is
//! written against; [`pdfium`] is the production backend.

#[cfg(test)]
pub(crate) mod fake;
pub mod pdfium;
pub mod surface;

pub use pdfium::{create_pdfium, validate_pdf_header, PdfiumSurface};
pub use surface::{Color, DocumentSurface, PageSize, Point, Rect, TextStyle};

use crate::error::{Error, Result};

/// Parse a page selection string (e.g. "1-3,5") into 1-indexed page
/// numbers, validated against the document's page count
pub fn parse_page_range(range: &str, max_pages: usize) -> Result<Vec<usize>> {
    let mut pages = Vec::new();

    for part in range.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start: usize = start.trim().parse().map_err(|_| Error::InvalidPageRange {
                range: range.to_string(),
            })?;
            let end: usize = end.trim().parse().map_err(|_| Error::InvalidPageRange {
                range: range.to_string(),
            })?;

            if start < 1 || end > max_pages || start > end {
                return Err(Error::InvalidPageRange {
                    range: range.to_string(),
                });
            }

            for page in start..=end {
                pages.push(page);
            }
        } else {
            let page: usize = part.parse().map_err(|_| Error::InvalidPageRange {
                range: range.to_string(),
            })?;

            if page < 1 || page > max_pages {
                return Err(Error::InvalidPageRange {
                    range: range.to_string(),
                });
            }

            pages.push(page);
        }
    }

    if pages.is_empty() {
        return Err(Error::InvalidPageRange {
            range: range.to_string(),
        });
    }

    pages.sort_unstable();
    pages.dedup();

    Ok(pages)
}
