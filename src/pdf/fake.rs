//! In-memory document surface for unit tests
//!
//! Pages are lists of (y, text) lines on a fixed glyph grid, so tests
//! can plant content at known coordinates and assert on the exact ink
//! the annotation passes produce.

use crate::error::Result;
use crate::pdf::surface::{Color, DocumentSurface, PageSize, Point, Rect, TextStyle};
use std::path::{Path, PathBuf};

/// Fixed glyph advance on the fake grid
pub(crate) const CHAR_WIDTH: f32 = 5.0;
/// Fixed line height on the fake grid
pub(crate) const LINE_HEIGHT: f32 = 10.0;
/// Left edge of planted text
pub(crate) const LEFT_MARGIN: f32 = 40.0;

#[derive(Debug, Clone)]
pub(crate) struct FakePage {
    pub width: f32,
    pub height: f32,
    /// (top y, text) in top-down order
    pub lines: Vec<(f32, String)>,
    /// When set, returned as the page text instead of the joined lines
    /// (lets tests desynchronize text extraction from search)
    pub text_override: Option<String>,
}

impl FakePage {
    pub fn new(lines: &[(f32, &str)]) -> Self {
        Self {
            width: 595.0,
            height: 800.0,
            lines: lines
                .iter()
                .map(|(y, text)| (*y, text.to_string()))
                .collect(),
            text_override: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    Text {
        page: usize,
        at: Point,
        text: String,
        font_size: f32,
        color: Color,
    },
    Line {
        page: usize,
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    },
}

#[derive(Debug, Default)]
pub(crate) struct FakeSurface {
    pub pages: Vec<FakePage>,
    pub ops: Vec<DrawOp>,
    pub saved_to: Option<PathBuf>,
}

impl FakeSurface {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            ops: Vec::new(),
            saved_to: None,
        }
    }

    /// Single page populated from (y, text) lines
    pub fn single_page(lines: &[(f32, &str)]) -> Self {
        Self::new(vec![FakePage::new(lines)])
    }

    pub fn texts(&self) -> Vec<&DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { .. }))
            .collect()
    }

    pub fn lines_drawn(&self) -> Vec<&DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .collect()
    }
}

impl DocumentSurface for FakeSurface {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page: usize) -> Result<PageSize> {
        let p = &self.pages[page];
        Ok(PageSize {
            width: p.width,
            height: p.height,
        })
    }

    fn page_text(&self, page: usize) -> Result<String> {
        if let Some(text) = &self.pages[page].text_override {
            return Ok(text.clone());
        }
        let lines: Vec<&str> = self.pages[page]
            .lines
            .iter()
            .map(|(_, text)| text.as_str())
            .collect();
        Ok(lines.join("\n"))
    }

    fn search(&self, page: usize, needle: &str) -> Result<Vec<Rect>> {
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for (y, text) in &self.pages[page].lines {
            for (byte_idx, _) in text.match_indices(needle) {
                let col = text[..byte_idx].chars().count() as f32;
                let x0 = LEFT_MARGIN + col * CHAR_WIDTH;
                let x1 = x0 + needle.chars().count() as f32 * CHAR_WIDTH;
                out.push(Rect::new(x0, *y, x1, *y + LINE_HEIGHT));
            }
        }
        Ok(out)
    }

    fn insert_text(&mut self, page: usize, at: Point, text: &str, style: &TextStyle) -> Result<()> {
        self.ops.push(DrawOp::Text {
            page,
            at,
            text: text.to_string(),
            font_size: style.font_size,
            color: style.color,
        });
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
        self.ops.push(DrawOp::Line {
            page,
            from,
            to,
            color,
            width,
        });
        Ok(())
    }

    fn text_width(&self, text: &str, font_size: f32) -> Result<f32> {
        Ok(text.chars().count() as f32 * font_size * 0.5)
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.saved_to = Some(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_maps_columns_onto_the_glyph_grid() {
        let surface = FakeSurface::single_page(&[(100.0, "alpha beta alpha")]);
        let hits = surface.search(0, "alpha").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].x0, LEFT_MARGIN);
        assert_eq!(hits[1].x0, LEFT_MARGIN + 11.0 * CHAR_WIDTH);
        assert_eq!(hits[0].y0, 100.0);
        assert_eq!(hits[0].y1, 100.0 + LINE_HEIGHT);
    }

    #[test]
    fn save_records_the_target_path() {
        let mut surface = FakeSurface::single_page(&[]);
        surface.save(Path::new("/tmp/out.pdf")).unwrap();
        assert_eq!(surface.saved_to.as_deref(), Some(Path::new("/tmp/out.pdf")));
    }
}
