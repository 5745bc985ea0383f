//! Evidence location and the document-wide tick pass
//!
//! Correct lines arrive in the same top-to-bottom, page-ascending order
//! the student wrote them, so the current-page pointer only ever moves
//! forward: re-anchoring on an earlier, already-ticked page would
//! silently misplace every later line.

use crate::annotate::layout::place_tick;
use crate::annotate::{AnnotationConfig, AnnotationReport};
use crate::error::Result;
use crate::pdf::{DocumentSurface, Rect};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Rounded y positions that already bear a tick. Keys are the matched
/// rectangle's mid-y rounded to one decimal; the set never shrinks
/// within a run.
#[derive(Debug, Default, Clone)]
pub struct TickRegistry {
    keys: HashSet<i32>,
}

impl TickRegistry {
    fn key(y: f32) -> i32 {
        (y * 10.0).round() as i32
    }

    pub fn contains(&self, y: f32) -> bool {
        self.keys.contains(&Self::key(y))
    }

    /// Returns false when the position was already registered
    pub fn insert(&mut self, y: f32) -> bool {
        self.keys.insert(Self::key(y))
    }
}

/// Shared matching state for one document-annotation run: the
/// forward-only page pointer and the tick registry. Threaded through
/// every locate call so separate documents can run concurrently with
/// separate cursors.
#[derive(Debug, Default, Clone)]
pub struct MatchCursor {
    pub page: usize,
    pub ticks: TickRegistry,
}

/// A located evidence line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMatch {
    pub page: usize,
    pub rect: Rect,
}

/// First `max_chars` characters of a line, trimmed, as the search needle
pub fn search_prefix(line: &str, max_chars: usize) -> String {
    line.chars().take(max_chars).collect::<String>().trim().to_string()
}

/// Alphanumeric runs of the needle, used by the fallback tier
fn word_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(String::from)
        .collect()
}

/// Search one page, treating a failed search as no hits so a single bad
/// page never aborts the pass
pub(crate) fn search_hits<S: DocumentSurface>(surface: &S, page: usize, needle: &str) -> Vec<Rect> {
    match surface.search(page, needle) {
        Ok(hits) => hits,
        Err(e) => {
            warn!(page = page + 1, needle, error = %e, "search failed, treating as no hits");
            Vec::new()
        }
    }
}

/// Locate one evidence line, advancing the cursor forward only.
///
/// Tiers, first success wins: exact match on the current page; exact
/// match on a later page (the pointer jumps there); word fallback on
/// the current page then the immediately following page, succeeding
/// once enough distinct words each have a verbatim hit and anchoring on
/// the first hit. Returns `None` when every tier fails.
pub fn locate_line<S: DocumentSurface>(
    surface: &S,
    cursor: &mut MatchCursor,
    line: &str,
    config: &AnnotationConfig,
) -> Option<LineMatch> {
    let page_count = surface.page_count();
    if cursor.page >= page_count {
        return None;
    }

    let needle = search_prefix(line, config.search_prefix_len);
    if needle.is_empty() {
        debug!("skipping empty line");
        return None;
    }

    // Exact match, current page
    let hits = search_hits(surface, cursor.page, &needle);
    if let Some(rect) = hits.first() {
        info!(page = cursor.page + 1, needle = %needle, "exact match");
        return Some(LineMatch {
            page: cursor.page,
            rect: *rect,
        });
    }

    // Exact match, forward lookahead
    for next_page in cursor.page + 1..page_count {
        let hits = search_hits(surface, next_page, &needle);
        if let Some(rect) = hits.first() {
            info!(page = next_page + 1, needle = %needle, "exact match on later page");
            cursor.page = next_page;
            return Some(LineMatch {
                page: next_page,
                rect: *rect,
            });
        }
    }

    // Word fallback on the current page, then the immediately following
    // page
    for fallback_page in [cursor.page, cursor.page + 1] {
        if fallback_page >= page_count {
            continue;
        }
        debug!(
            page = fallback_page + 1,
            needle = %needle,
            "no exact match, trying word fallback"
        );

        let mut seen: HashSet<String> = HashSet::new();
        let mut first_hit: Option<Rect> = None;
        let mut matched_words = 0usize;

        for word in word_tokens(&needle) {
            if !seen.insert(word.clone()) {
                continue;
            }
            let hits = search_hits(surface, fallback_page, &word);
            if let Some(rect) = hits.first() {
                matched_words += 1;
                let anchor = *first_hit.get_or_insert(*rect);
                if matched_words >= config.fallback_word_threshold {
                    info!(
                        page = fallback_page + 1,
                        needle = %needle,
                        words = matched_words,
                        "word fallback matched"
                    );
                    cursor.page = fallback_page;
                    return Some(LineMatch {
                        page: fallback_page,
                        rect: anchor,
                    });
                }
            }
        }
    }

    warn!(line = %line, page = cursor.page + 1, "no match anywhere, skipping line");
    None
}

/// Tick every matched correct line across the whole document, in one
/// forward pass over the flattened line list
pub fn annotate_correct_lines<S: DocumentSurface>(
    surface: &mut S,
    lines: &[String],
    cursor: &mut MatchCursor,
    config: &AnnotationConfig,
    report: &mut AnnotationReport,
) -> Result<()> {
    info!(lines = lines.len(), "starting tick annotation for entire document");

    for line in lines {
        if cursor.page >= surface.page_count() {
            break;
        }

        let Some(matched) = locate_line(surface, cursor, line, config) else {
            report.lines_unmatched += 1;
            continue;
        };
        report.lines_matched += 1;

        let position = matched.rect.mid_y();
        if cursor.ticks.contains(position) {
            debug!(y = position, "tick already present near position, skipping");
            continue;
        }

        match place_tick(surface, matched.page, &matched.rect, config) {
            Ok(()) => {
                cursor.ticks.insert(position);
                report.ticks_placed += 1;
            }
            Err(e) => {
                error!(page = matched.page + 1, error = %e, "tick placement failed");
                report.draw_failures += 1;
            }
        }
    }

    info!(
        matched = report.lines_matched,
        unmatched = report.lines_unmatched,
        "completed annotation of all lines"
    );
    Ok(())
}
