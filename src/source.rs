//! Source buffer ownership and line retrieval
//!
//! Owns the original source text and serves line-by-line access for
//! diagnostic reports.

use crate::errors::SourcePosition;

/// An owned source buffer with a precomputed line index
#[derive(Debug, Clone)]
pub struct SourceCode {
    /// Name of the source unit, shown in diagnostics
    filename: String,
    /// The complete source text
    text: String,
    /// Byte offset of the start of each line (index 0 is row 1)
    line_starts: Vec<usize>,
}

impl SourceCode {
    /// Create a new source buffer and index its line starts
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            filename: filename.into(),
            text,
            line_starts,
        }
    }

    /// Name of the source unit
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The complete source text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of lines in the buffer
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Fetch the full text of the given one-based row, with the trailing
    /// newline stripped. Returns `None` for rows outside the buffer.
    pub fn line(&self, row: u32) -> Option<&str> {
        if row == 0 {
            return None;
        }
        let index = (row - 1) as usize;
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let line = &self.text[start..end];
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    /// Map a row/column position to a byte offset into the buffer.
    /// Columns are counted in characters, matching the lexer.
    pub fn byte_offset(&self, pos: SourcePosition) -> Option<usize> {
        if !pos.is_valid() {
            return None;
        }
        let start = *self.line_starts.get((pos.row - 1) as usize)?;
        let line = self.line(pos.row)?;
        let mut offset = start;
        let mut column = 1;
        for ch in line.chars() {
            if column == pos.column {
                break;
            }
            offset += ch.len_utf8();
            column += 1;
        }
        Some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_retrieval() {
        let src = SourceCode::new("test.hlsl", "float4 main() {\n    return x;\n}\n");
        assert_eq!(src.line(1), Some("float4 main() {"));
        assert_eq!(src.line(2), Some("    return x;"));
        assert_eq!(src.line(3), Some("}"));
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(5), None);
    }

    #[test]
    fn test_line_without_trailing_newline() {
        let src = SourceCode::new("test.hlsl", "a\nb");
        assert_eq!(src.line(1), Some("a"));
        assert_eq!(src.line(2), Some("b"));
    }

    #[test]
    fn test_crlf_stripped() {
        let src = SourceCode::new("test.hlsl", "first\r\nsecond\r\n");
        assert_eq!(src.line(1), Some("first"));
        assert_eq!(src.line(2), Some("second"));
    }

    #[test]
    fn test_byte_offset() {
        let src = SourceCode::new("test.hlsl", "ab\ncdef\n");
        assert_eq!(src.byte_offset(SourcePosition::new(1, 1)), Some(0));
        assert_eq!(src.byte_offset(SourcePosition::new(2, 1)), Some(3));
        assert_eq!(src.byte_offset(SourcePosition::new(2, 3)), Some(5));
        assert_eq!(src.byte_offset(SourcePosition::IGNORE), None);
    }

    #[test]
    fn test_byte_offset_multibyte() {
        // 'é' is two bytes but one column
        let src = SourceCode::new("test.hlsl", "aé b\n");
        assert_eq!(src.byte_offset(SourcePosition::new(1, 3)), Some(3));
    }
}
