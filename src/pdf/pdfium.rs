//! PDFium-backed document surface

use crate::error::{Error, Result};
use crate::pdf::surface::{Color, DocumentSurface, PageSize, Point, Rect, TextStyle};
use pdfium_render::prelude::*;
use std::path::Path;

/// Get a PDFium instance (created per document - PDFium is not thread-safe)
pub fn create_pdfium() -> Result<Pdfium> {
    // Try to bind to system library or use static linking
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Error::Pdfium {
            reason: format!("Failed to initialize PDFium: {}", e),
        })?;

    Ok(Pdfium::new(bindings))
}

/// Map PDFium errors to our error type
pub fn map_pdfium_error(err: PdfiumError) -> Error {
    Error::Pdfium {
        reason: format!("{}", err),
    }
}

/// Validate the `%PDF` header before handing bytes to PDFium
pub fn validate_pdf_header(data: &[u8]) -> Result<()> {
    if data.len() < 4 || &data[0..4] != b"%PDF" {
        return Err(Error::InvalidPdf {
            reason: "Not a valid PDF file".to_string(),
        });
    }
    Ok(())
}

/// Open, searchable, drawable PDF document
///
/// Holds the document open for the whole annotation run; unlike a
/// read-only reader, page text cannot be snapshotted up front because
/// inserted annotation text becomes part of the page content stream.
/// All coordinates on the trait are top-down; PDFium's bottom-up y is
/// converted at this boundary.
pub struct PdfiumSurface<'a> {
    document: PdfDocument<'a>,
    font: PdfFontToken,
    page_sizes: Vec<PageSize>,
}

impl<'a> PdfiumSurface<'a> {
    /// Wrap an open document, loading the annotation font and caching
    /// page extents
    pub fn new(mut document: PdfDocument<'a>) -> Result<Self> {
        let font = document.fonts_mut().helvetica();

        let mut page_sizes = Vec::new();
        for page in document.pages().iter() {
            page_sizes.push(PageSize {
                width: page.width().value,
                height: page.height().value,
            });
        }

        Ok(Self {
            document,
            font,
            page_sizes,
        })
    }

    fn page(&self, index: usize) -> Result<PdfPage<'_>> {
        if index >= self.page_sizes.len() {
            return Err(Error::PageOutOfBounds {
                page: index,
                total: self.page_sizes.len(),
            });
        }
        self.document
            .pages()
            .get(index as u16)
            .map_err(|e| Error::Pdfium {
                reason: format!("Failed to get page {}: {}", index, e),
            })
    }

    fn page_height(&self, index: usize) -> Result<f32> {
        self.page_size(index).map(|s| s.height)
    }

    /// Extract text from a page with Y-coordinate based ordering
    /// (preserves reading order)
    fn extract_page_text_with_layout(page: &PdfPage, height: f32) -> String {
        let text_obj = match page.text() {
            Ok(t) => t,
            Err(_) => return String::new(),
        };

        // Collect all characters with top-down positions
        let mut chars_with_pos: Vec<(char, f32, f32)> = Vec::new();

        for segment in text_obj.segments().iter() {
            if let Ok(chars) = segment.chars() {
                for char_result in chars.iter() {
                    if let Some(c) = char_result.unicode_char() {
                        if let Ok(bounds) = char_result.loose_bounds() {
                            let x = bounds.left().value;
                            let y = height - bounds.top().value;
                            chars_with_pos.push((c, x, y));
                        }
                    }
                }
            }
        }

        if chars_with_pos.is_empty() {
            return String::new();
        }

        // Tolerance of ~5 points accounts for slight vertical variations
        // within a line
        const Y_TOLERANCE: f32 = 5.0;
        const SPACE_THRESHOLD: f32 = 10.0;

        // Sort top to bottom, then left to right
        chars_with_pos.sort_by(|a, b| {
            let y_cmp = a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal);
            if y_cmp == std::cmp::Ordering::Equal {
                a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal)
            } else {
                y_cmp
            }
        });

        // Group into lines based on Y-coordinate proximity
        let mut lines: Vec<Vec<(char, f32)>> = Vec::new();
        let mut current_line: Vec<(char, f32)> = Vec::new();
        let mut current_y: Option<f32> = None;

        for (c, x, y) in chars_with_pos {
            match current_y {
                Some(cur_y) if (cur_y - y).abs() <= Y_TOLERANCE => {
                    current_line.push((c, x));
                }
                _ => {
                    if !current_line.is_empty() {
                        lines.push(current_line);
                    }
                    current_line = vec![(c, x)];
                    current_y = Some(y);
                }
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }

        // Sort each line left to right, inserting spaces at word gaps
        let mut result = String::new();
        for mut line in lines {
            line.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            let mut prev_x: Option<f32> = None;
            for (c, x) in line {
                if let Some(px) = prev_x {
                    if x - px > SPACE_THRESHOLD && c != ' ' {
                        result.push(' ');
                    }
                }
                result.push(c);
                prev_x = Some(x);
            }
            result.push('\n');
        }

        result.trim_end().to_string()
    }
}

impl DocumentSurface for PdfiumSurface<'_> {
    fn page_count(&self) -> usize {
        self.page_sizes.len()
    }

    fn page_size(&self, page: usize) -> Result<PageSize> {
        self.page_sizes
            .get(page)
            .copied()
            .ok_or(Error::PageOutOfBounds {
                page,
                total: self.page_sizes.len(),
            })
    }

    fn page_text(&self, page: usize) -> Result<String> {
        let height = self.page_height(page)?;
        let page = self.page(page)?;
        Ok(Self::extract_page_text_with_layout(&page, height))
    }

    fn search(&self, page: usize, needle: &str) -> Result<Vec<Rect>> {
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let height = self.page_height(page)?;
        let page = self.page(page)?;
        let text_obj = match page.text() {
            Ok(t) => t,
            Err(_) => return Ok(Vec::new()),
        };

        let options = PdfSearchOptions::new().match_case(true);
        let mut occurrences = Vec::new();

        let search = match text_obj.search(needle, &options) {
            Ok(s) => s,
            Err(_) => return Ok(Vec::new()),
        };
        for segments in search.iter(PdfSearchDirection::SearchForward) {
            // One occurrence may span several text segments; merge their
            // bounds into a single rectangle
            let mut merged: Option<Rect> = None;
            for segment in segments.iter() {
                let b = segment.bounds();
                let rect = Rect::new(
                    b.left().value,
                    height - b.top().value,
                    b.right().value,
                    height - b.bottom().value,
                );
                merged = Some(match merged {
                    None => rect,
                    Some(m) => Rect::new(
                        m.x0.min(rect.x0),
                        m.y0.min(rect.y0),
                        m.x1.max(rect.x1),
                        m.y1.max(rect.y1),
                    ),
                });
            }
            if let Some(rect) = merged {
                occurrences.push(rect);
            }
        }

        Ok(occurrences)
    }

    fn insert_text(&mut self, page: usize, at: Point, text: &str, style: &TextStyle) -> Result<()> {
        let height = self.page_height(page)?;

        let mut object = PdfPageTextObject::new(
            &self.document,
            text,
            self.font,
            PdfPoints::new(style.font_size),
        )
        .map_err(|e| Error::Draw {
            page,
            reason: format!("text object: {}", e),
        })?;

        object
            .set_fill_color(PdfColor::new(
                style.color.r,
                style.color.g,
                style.color.b,
                255,
            ))
            .map_err(|e| Error::Draw {
                page,
                reason: format!("fill color: {}", e),
            })?;

        object
            .translate(PdfPoints::new(at.x), PdfPoints::new(height - at.y))
            .map_err(|e| Error::Draw {
                page,
                reason: format!("translate: {}", e),
            })?;

        let mut target = self.page(page)?;
        target
            .objects_mut()
            .add_text_object(object)
            .map_err(|e| Error::Draw {
                page,
                reason: format!("add text: {}", e),
            })?;

        Ok(())
    }

    fn draw_line(
        &mut self,
        page: usize,
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    ) -> Result<()> {
        let height = self.page_height(page)?;

        let object = PdfPagePathObject::new_line(
            &self.document,
            PdfPoints::new(from.x),
            PdfPoints::new(height - from.y),
            PdfPoints::new(to.x),
            PdfPoints::new(height - to.y),
            PdfColor::new(color.r, color.g, color.b, 255),
            PdfPoints::new(width),
        )
        .map_err(|e| Error::Draw {
            page,
            reason: format!("line object: {}", e),
        })?;

        let mut target = self.page(page)?;
        target
            .objects_mut()
            .add_path_object(object)
            .map_err(|e| Error::Draw {
                page,
                reason: format!("add line: {}", e),
            })?;

        Ok(())
    }

    fn text_width(&self, text: &str, font_size: f32) -> Result<f32> {
        // An unattached text object carries valid bounds, which is the
        // cheapest way PDFium exposes string metrics
        let object =
            PdfPageTextObject::new(&self.document, text, self.font, PdfPoints::new(font_size))
                .map_err(map_pdfium_error)?;
        let width = object.width().map_err(map_pdfium_error)?;
        Ok(width.value)
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.document.save_to_file(&path).map_err(|e| Error::Save {
            path: path.display().to_string(),
            reason: format!("{}", e),
        })
    }
}
