use crate::{ByteSpan, SourceLocation};

/// Maps byte offsets into `{line, column}` pairs by recording the byte
/// offset of every line start once, up front, rather than rescanning the
/// source for every token the scanner produces.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the first byte of each line; `line_starts[0] == 0`.
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0usize];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        LineIndex { line_starts }
    }

    /// Resolve a byte offset to a 1-based `{line, column}` location.
    ///
    /// `offset` past the end of the source resolves against the last known
    /// line, which is what the scanner wants when it reports EOF.
    pub fn resolve(&self, offset: usize) -> SourceLocation {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        SourceLocation {
            line: (line_idx + 1) as u32,
            column: (offset - line_start + 1) as u32,
            byte_offset: offset,
        }
    }

    /// 0-based index of the line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Raw half-open span of line `line_idx`, including its trailing `\n`
    /// (or `\r\n`) if the source has one. `source_len` bounds the last line,
    /// which has no recorded successor to derive an end from.
    pub fn line_span(&self, line_idx: usize, source_len: usize) -> ByteSpan {
        let start = self.line_starts[line_idx];
        let end = self
            .line_starts
            .get(line_idx + 1)
            .copied()
            .unwrap_or(source_len);
        ByteSpan::new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line() {
        let idx = LineIndex::new("echo hi");
        let loc = idx.resolve(5);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 6);
    }

    #[test]
    fn multi_line() {
        let idx = LineIndex::new("a\nbc\nd");
        assert_eq!(idx.resolve(0).line, 1);
        assert_eq!(idx.resolve(2).line, 2);
        assert_eq!(idx.resolve(2).column, 1);
        assert_eq!(idx.resolve(5).line, 3);
    }

    #[test]
    fn line_span_covers_terminator() {
        let src = "ab\ncd\nef";
        let idx = LineIndex::new(src);
        assert_eq!(idx.line_span(0, src.len()), ByteSpan::new(0, 3));
        assert_eq!(idx.line_span(1, src.len()), ByteSpan::new(3, 6));
        assert_eq!(idx.line_span(2, src.len()), ByteSpan::new(6, 8));
        assert_eq!(idx.line_of(4), 1);
    }
}
