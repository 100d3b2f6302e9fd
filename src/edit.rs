//! Whole-document replacement edits.

use tower_lsp::lsp_types::{Position, Range, TextEdit};

/// Range from the start of the document to the end of its last line.
///
/// Columns are UTF-16 code units, the LSP default position encoding.
/// Lines end at `\r\n`, `\n` or a lone `\r`. A trailing terminator leaves an
/// empty last line, so the range still covers it.
pub fn full_document_range(text: &str) -> Range {
    let (last_line, last_text) = text
        .split("\r\n")
        .flat_map(|chunk| chunk.split(['\r', '\n']))
        .enumerate()
        .last()
        .unwrap_or((0, ""));
    let end_character = last_text.encode_utf16().count();
    Range::new(
        Position::new(0, 0),
        Position::new(last_line as u32, end_character as u32),
    )
}

/// A single edit substituting `formatted` for all of `current`
pub fn replace_document(current: &str, formatted: String) -> TextEdit {
    TextEdit::new(full_document_range(current), formatted)
}

/// Edits for a formatting response; no document means no edits
pub fn formatting_edits(current: Option<&str>, formatted: String) -> Vec<TextEdit> {
    match current {
        Some(text) => vec![replace_document(text, formatted)],
        None => Vec::new(),
    }
}
