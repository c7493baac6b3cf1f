//! Here-document body collector for the lusush scanner.
//!
//! Handles indentation stripping for `<<~`, CRLF-tolerant terminator
//! matching, and FIFO collection of the (possibly several) heredocs
//! attached to a single command line. `<<<` here-strings are a single-word
//! construct handled directly by the parser and never reach this collector.

use lusush_position::{ByteSpan, LineIndex};
use std::collections::VecDeque;
use std::sync::Arc;

/// Whether a heredoc body undergoes expansion, determined by whether its
/// delimiter was quoted: `<<EOF` expands `$`/`` ` ``/`\`; `<<'EOF'` and
/// `<<"EOF"` do not (POSIX: any quoting on the delimiter suppresses
/// expansion of the body).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HeredocQuoting {
    Expand,
    Literal,
}

/// A heredoc declaration captured at scan time, queued for body collection
/// once the rest of the command line has been scanned.
#[derive(Debug, Clone)]
pub struct PendingHeredoc {
    /// Exact terminator text the body search looks for.
    pub label: Arc<str>,
    /// `<<~`: strip the terminator's leading whitespace as a common prefix
    /// from every body line.
    pub strip_indent: bool,
    pub quoting: HeredocQuoting,
    /// Source span of the `<<[-~]WORD` declaration itself.
    pub decl_span: ByteSpan,
}

/// Collected heredoc body: line spans with terminators stripped.
#[derive(Debug, Clone)]
pub struct HeredocContent {
    /// One span per body line, with indentation stripped if `strip_indent`
    /// applied and the trailing newline excluded.
    pub segments: Vec<ByteSpan>,
    /// Span from the start of the first line to the end of the last.
    pub full_span: ByteSpan,
    pub terminated: bool,
}

/// Outcome of collecting every pending heredoc for one command line.
#[derive(Debug)]
pub struct CollectionResult {
    /// Contents in the same order the heredocs were declared (FIFO).
    pub contents: Vec<HeredocContent>,
    pub next_offset: usize,
}

/// Collect every pending heredoc body starting at `offset`, in declaration
/// order — shells require heredoc bodies to appear in the order their
/// `<<WORD` tokens were written, even across a pipeline. `lines` must index
/// `src` (the scanner keeps the two in sync across alias splices, rebuilding
/// `lines` whenever `src` changes).
pub fn collect_all(
    src: &str,
    lines: &LineIndex,
    offset: usize,
    mut pending: VecDeque<PendingHeredoc>,
) -> CollectionResult {
    let mut contents = Vec::with_capacity(pending.len());
    let mut line_idx = lines.line_of(offset);
    while let Some(hd) = pending.pop_front() {
        let (content, next_line) = collect_one(src, lines, line_idx, &hd);
        contents.push(content);
        line_idx = next_line;
    }
    let next_offset = if line_idx < lines.line_count() {
        lines.line_span(line_idx, src.len()).start
    } else {
        src.len()
    };
    CollectionResult {
        contents,
        next_offset,
    }
}

/// Walk whole lines (via `lines`, never a raw byte scan) from `start_line`
/// looking for `hd.label`, terminating on the line that matches after
/// leading-whitespace and CR normalization. Returns the content plus the
/// index of the first line after the terminator (or after the unterminated
/// tail, if EOF was hit first).
fn collect_one(
    src: &str,
    lines: &LineIndex,
    start_line: usize,
    hd: &PendingHeredoc,
) -> (HeredocContent, usize) {
    let mut body_lines: Vec<ByteSpan> = Vec::new();
    let mut baseline_indent = "";
    let mut line_idx = start_line;
    let mut terminator_line: Option<usize> = None;

    while line_idx < lines.line_count() {
        let raw = lines.line_span(line_idx, src.len());
        if raw.is_empty() && raw.start == src.len() {
            // `LineIndex` records a line start right after a trailing '\n';
            // that's the end of the source, not another line to search.
            break;
        }
        let text = strip_eol(raw.slice(src));
        let trimmed = text.trim_start_matches([' ', '\t']);

        if trimmed == hd.label.as_ref() {
            baseline_indent = if hd.strip_indent {
                &text[..text.len() - trimmed.len()]
            } else {
                ""
            };
            terminator_line = Some(line_idx + 1);
            break;
        }

        body_lines.push(ByteSpan::new(raw.start, raw.start + text.len()));
        line_idx += 1;
    }

    let segments: Vec<ByteSpan> = body_lines
        .iter()
        .map(|span| {
            if baseline_indent.is_empty() {
                *span
            } else {
                let text = span.slice(src);
                let strip = common_prefix_len(text, baseline_indent);
                ByteSpan::new(span.start + strip, span.end)
            }
        })
        .collect();

    let full_span = match (segments.first(), segments.last()) {
        (Some(first), Some(last)) => ByteSpan::new(first.start, last.end),
        _ => {
            let fallback = lines
                .line_span(
                    line_idx.min(lines.line_count().saturating_sub(1)),
                    src.len(),
                )
                .start;
            ByteSpan::new(fallback, fallback)
        }
    };

    match terminator_line {
        Some(next_line) => (
            HeredocContent {
                segments,
                full_span,
                terminated: true,
            },
            next_line,
        ),
        None => (
            HeredocContent {
                segments,
                full_span,
                terminated: false,
            },
            line_idx,
        ),
    }
}

/// Drop a line span's trailing `\n` and, if present, the `\r` before it —
/// `LineIndex::line_span` includes the terminator since it was built for
/// offset resolution, not content extraction.
fn strip_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(label: &str, strip_indent: bool, quoting: HeredocQuoting) -> PendingHeredoc {
        PendingHeredoc {
            label: Arc::from(label),
            strip_indent,
            quoting,
            decl_span: ByteSpan::new(0, 0),
        }
    }

    #[test]
    fn collects_simple_body() {
        let src = "line one\nline two\nEOF\nrest\n";
        let lines = LineIndex::new(src);
        let mut q = VecDeque::new();
        q.push_back(pending("EOF", false, HeredocQuoting::Expand));
        let result = collect_all(src, &lines, 0, q);
        assert_eq!(result.contents.len(), 1);
        let content = &result.contents[0];
        assert!(content.terminated);
        assert_eq!(content.segments.len(), 2);
        assert_eq!(content.segments[0].slice(src), "line one");
        assert_eq!(&src[result.next_offset..], "rest\n");
    }

    #[test]
    fn strips_common_indent_for_tilde_heredoc() {
        let src = "    a\n    b\n    EOF\n";
        let lines = LineIndex::new(src);
        let mut q = VecDeque::new();
        q.push_back(pending("EOF", true, HeredocQuoting::Expand));
        let result = collect_all(src, &lines, 0, q);
        let content = &result.contents[0];
        let text: Vec<&str> = content.segments.iter().map(|s| s.slice(src)).collect();
        assert_eq!(text, vec!["a", "b"]);
    }

    #[test]
    fn unterminated_heredoc_reports_false() {
        let src = "a\nb\n";
        let lines = LineIndex::new(src);
        let mut q = VecDeque::new();
        q.push_back(pending("EOF", false, HeredocQuoting::Expand));
        let result = collect_all(src, &lines, 0, q);
        assert!(!result.contents[0].terminated);
    }

    #[test]
    fn multiple_heredocs_collect_fifo() {
        let src = "first\nA\nsecond\nB\n";
        let lines = LineIndex::new(src);
        let mut q = VecDeque::new();
        q.push_back(pending("A", false, HeredocQuoting::Expand));
        q.push_back(pending("B", false, HeredocQuoting::Literal));
        let result = collect_all(src, &lines, 0, q);
        assert_eq!(result.contents.len(), 2);
        assert!(result.contents[0].terminated && result.contents[1].terminated);
    }

    #[test]
    fn crlf_terminator_matches_despite_trailing_cr() {
        let src = "body\r\nEOF\r\nrest\r\n";
        let lines = LineIndex::new(src);
        let mut q = VecDeque::new();
        q.push_back(pending("EOF", false, HeredocQuoting::Expand));
        let result = collect_all(src, &lines, 0, q);
        let content = &result.contents[0];
        assert!(content.terminated);
        assert_eq!(content.segments[0].slice(src), "body");
    }
}
