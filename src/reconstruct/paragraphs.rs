//! Regrouping decoded text segments into paragraphs.
//!
//! Two or more consecutive newlines end a paragraph; a single newline is a
//! hard break inside it. Segments keep their marks on every text node they
//! produce.

use crate::editor::{EditorNode, Mark};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run<'a> {
    Text(&'a str),
    Newlines(usize),
}

fn runs(text: &str) -> Vec<Run<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    while start < bytes.len() {
        let newline = bytes[start] == b'\n';
        let mut end = start + 1;
        while end < bytes.len() && (bytes[end] == b'\n') == newline {
            end += 1;
        }
        // '\n' is ASCII, so run boundaries are always char boundaries.
        out.push(if newline {
            Run::Newlines(end - start)
        } else {
            Run::Text(&text[start..end])
        });
        start = end;
    }
    out
}

#[derive(Debug, Default)]
pub(crate) struct ParagraphBuilder {
    paragraphs: Vec<EditorNode>,
    current: Vec<EditorNode>,
}

impl ParagraphBuilder {
    pub fn push(&mut self, text: &str, marks: &[Mark]) {
        for run in runs(text) {
            match run {
                Run::Newlines(count) if count >= 2 => self.flush(),
                Run::Newlines(_) => self.current.push(EditorNode::hard_break()),
                Run::Text(text) => self
                    .current
                    .push(EditorNode::marked_text(text, marks.to_vec())),
            }
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            let content = std::mem::take(&mut self.current);
            self.paragraphs.push(EditorNode::paragraph(content));
        }
    }

    /// Closes the open paragraph. Never returns an empty list.
    pub fn finish(mut self) -> Vec<EditorNode> {
        self.flush();
        if self.paragraphs.is_empty() {
            self.paragraphs.push(EditorNode::paragraph(Vec::new()));
        }
        self.paragraphs
    }
}

/// Inline nodes for a single-paragraph context (headings, list content):
/// every newline becomes a hard break.
pub(crate) fn push_inline(out: &mut Vec<EditorNode>, text: &str, marks: &[Mark]) {
    for run in runs(text) {
        match run {
            Run::Newlines(count) => {
                out.extend(std::iter::repeat_with(EditorNode::hard_break).take(count))
            }
            Run::Text(text) => out.push(EditorNode::marked_text(text, marks.to_vec())),
        }
    }
}
