//! Rubric cell grammar
//!
//! `correct_lines` / `correct_words` cells arrive either as a literal
//! encoding of a list of strings (`['line one', "line two"]`) or as a
//! bare string. The two shapes are resolved into [`CellValue`] once at
//! ingestion; malformed list encodings degrade to a single literal
//! value rather than being dropped, since a broken encoding still
//! likely names a real line or phrase.

/// A rubric cell resolved to one of its two legal shapes
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    List(Vec<String>),
    Scalar(String),
}

impl CellValue {
    /// Trimmed, non-empty entries in order
    pub fn entries(&self) -> Vec<String> {
        let items: Vec<&String> = match self {
            CellValue::List(items) => items.iter().collect(),
            CellValue::Scalar(value) => vec![value],
        };
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// Parse a cell, falling back to `Scalar` on anything that is not a
/// well-formed quoted list
pub fn parse_list_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    match try_parse_list(trimmed) {
        Some(items) => CellValue::List(items),
        None => CellValue::Scalar(trimmed.to_string()),
    }
}

fn try_parse_list(text: &str) -> Option<Vec<String>> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&next) = chars.peek() else {
            break;
        };

        let quote = match next {
            '\'' | '"' => {
                chars.next();
                next
            }
            _ => return None,
        };

        let mut item = String::new();
        loop {
            match chars.next()? {
                c if c == quote => break,
                '\\' => match chars.next()? {
                    'n' => item.push('\n'),
                    't' => item.push('\t'),
                    escaped => item.push(escaped),
                },
                c => item.push(c),
            }
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(_) => return None,
        }
    }

    Some(items)
}
