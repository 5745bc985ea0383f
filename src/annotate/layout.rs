//! Ink placement
//!
//! Four kinds of ink, all additive: score text beside a question label,
//! word-wrapped comment blocks clipped to a span's vertical band, tick
//! glyphs at line starts, and underline strokes beneath matched
//! phrases.

use crate::annotate::AnnotationConfig;
use crate::error::Result;
use crate::pdf::{DocumentSurface, Point, Rect, TextStyle};
use tracing::{info, warn};

/// Outcome of one comment placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommentPlacement {
    pub lines_drawn: usize,
    pub lines_total: usize,
    pub truncated: bool,
}

/// Greedy word-wrap against the surface's glyph metrics
pub fn wrap_text<S: DocumentSurface>(
    surface: &S,
    text: &str,
    font_size: f32,
    max_width: f32,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if surface.text_width(&candidate, font_size)? <= max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(current);
            }
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    Ok(lines)
}

/// Score text at a fixed offset from the question label's box
pub fn place_score<S: DocumentSurface>(
    surface: &mut S,
    page: usize,
    label_rect: &Rect,
    score: &str,
    config: &AnnotationConfig,
) -> Result<()> {
    let at = Point::new(
        label_rect.x0 + config.score_x_offset,
        label_rect.y0 + config.score_y_offset,
    );
    surface.insert_text(
        page,
        at,
        score,
        &TextStyle {
            font_size: config.score_font_size,
            color: config.score_color,
        },
    )
}

/// Wrapped comment lines emitted top-down from `anchor_y`, clipped so
/// no line's bottom edge crosses `y_limit`. Partial comments are
/// acceptable; drawing past the limit is not.
pub fn place_comment<S: DocumentSurface>(
    surface: &mut S,
    page: usize,
    anchor_y: f32,
    y_limit: f32,
    comment: &str,
    config: &AnnotationConfig,
) -> Result<CommentPlacement> {
    let page_width = surface.page_size(page)?.width;
    let x = page_width - config.comment_width;
    let line_height = config.comment_font_size + config.comment_line_spacing;

    let lines = wrap_text(surface, comment, config.comment_font_size, config.comment_width)?;
    let style = TextStyle {
        font_size: config.comment_font_size,
        color: config.comment_color,
    };

    let mut drawn = 0usize;
    for (i, line) in lines.iter().enumerate() {
        let y = anchor_y + i as f32 * line_height;
        if y + line_height > y_limit {
            warn!(page = page + 1, y_limit, "comment clipped at span boundary");
            return Ok(CommentPlacement {
                lines_drawn: drawn,
                lines_total: lines.len(),
                truncated: true,
            });
        }
        surface.insert_text(page, Point::new(x, y), line, &style)?;
        drawn += 1;
    }

    info!(
        page = page + 1,
        lines = drawn,
        anchor_y,
        "inserted wrapped comment"
    );
    Ok(CommentPlacement {
        lines_drawn: drawn,
        lines_total: lines.len(),
        truncated: false,
    })
}

/// Tick glyph left of and below the first word of a matched line
pub fn place_tick<S: DocumentSurface>(
    surface: &mut S,
    page: usize,
    line_rect: &Rect,
    config: &AnnotationConfig,
) -> Result<()> {
    let x = (line_rect.x0 - config.tick_x_offset).max(config.tick_min_x);
    let y = line_rect.y0 + config.tick_y_offset;

    surface.insert_text(
        page,
        Point::new(x, y),
        &config.tick_glyph.to_string(),
        &TextStyle {
            font_size: config.tick_font_size,
            color: config.tick_color,
        },
    )
}

/// Horizontal stroke just below one phrase occurrence
pub fn underline_occurrence<S: DocumentSurface>(
    surface: &mut S,
    page: usize,
    rect: &Rect,
    config: &AnnotationConfig,
) -> Result<()> {
    let y = rect.y1 + config.underline_y_offset;
    surface.draw_line(
        page,
        Point::new(rect.x0, y),
        Point::new(rect.x1, y),
        config.underline_color,
        config.underline_width,
    )
}
