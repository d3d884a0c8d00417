//! Sibling compaction.
//!
//! Lowering emits one phrasing chain per editor text run, so adjacent runs
//! that share marks come out as sibling `strong`/`text`/`html` nodes. This pass
//! folds them back together:
//!
//! - same-shape literal siblings concatenate their `value`
//! - same-shape parent siblings concatenate their `children` (and the seam is
//!   compacted again)
//! - tag-only `html` nodes cancel open/close pairs, so `</u>` followed by
//!   `<u>` disappears and an underline span stays contiguous
//!
//! Running the pass twice yields the same tree as running it once.

use super::{Node, Root};
use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*<(/?)([A-Za-z][A-Za-z0-9-]*)\s*>").expect("valid tag pattern")
});

fn is_mergeable(node: &Node) -> bool {
    matches!(
        node,
        Node::Text { .. }
            | Node::Blockquote { .. }
            | Node::Strong { .. }
            | Node::Emphasis { .. }
            | Node::Delete { .. }
            | Node::InlineCode { .. }
            | Node::Html { .. }
            | Node::Link { .. }
            | Node::LinkReference { .. }
            | Node::Image { .. }
            | Node::ImageReference { .. }
            | Node::FootnoteReference { .. }
    )
}

pub fn compact_root(root: &mut Root) {
    compact_children(&mut root.children);
}

/// Compacts the subtree below `node` in document order.
pub fn compact(node: &mut Node) {
    if let Some(children) = node.children_mut() {
        compact_children(children);
    }
}

pub fn compact_children(children: &mut Vec<Node>) {
    let mut out: Vec<Node> = Vec::with_capacity(children.len());
    for mut child in children.drain(..) {
        compact(&mut child);

        if let Node::Html { value } = &mut child
            && let Some(collapsed) = collapse_tags(value)
        {
            if collapsed.is_empty() {
                continue;
            }
            *value = collapsed;
        }

        let Some(prev) = out.last_mut() else {
            out.push(child);
            continue;
        };
        if !is_mergeable(&child) || !prev.same_shape(&child) {
            out.push(child);
            continue;
        }

        if let (Some(prev_value), Some(value)) = (prev.value_mut(), child.value()) {
            prev_value.push_str(value);
            if let Node::Html { value } = prev
                && let Some(collapsed) = collapse_tags(value)
            {
                if collapsed.is_empty() {
                    out.pop();
                } else {
                    *value = collapsed;
                }
            }
            continue;
        }

        if prev.children().is_none() || child.children().is_none() {
            out.push(child);
            continue;
        }
        if let (Some(prev_children), Some(children)) = (prev.children_mut(), child.children_mut()) {
            prev_children.append(children);
            compact_children(prev_children);
        }
    }
    *children = out;
}

/// One tag of a tag-only html string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tag<'a> {
    pub closing: bool,
    pub name: &'a str,
    pub raw: &'a str,
}

/// Splits `html` into tags. `None` when it holds anything besides tags and
/// whitespace.
pub(crate) fn parse_tags(html: &str) -> Option<Vec<Tag<'_>>> {
    let mut rest = html;
    let mut tags = Vec::new();
    while !rest.trim().is_empty() {
        let captures = HTML_TAG.captures(rest)?;
        let whole = captures.get(0)?;
        tags.push(Tag {
            closing: !captures[1].is_empty(),
            name: captures.get(2)?.as_str(),
            raw: whole.as_str().trim_start(),
        });
        rest = &rest[whole.end()..];
    }
    Some(tags)
}

/// Cancels adjacent inverse tags in a tag-only html string.
///
/// Returns `None` when the string has content other than tags, in which case
/// it is left alone. `<u></u>` and `</u><u>` both collapse to `""`.
fn collapse_tags(html: &str) -> Option<String> {
    let mut kept: Vec<Tag<'_>> = Vec::new();
    for tag in parse_tags(html)? {
        match kept.last() {
            Some(last) if last.closing != tag.closing && last.name.eq_ignore_ascii_case(tag.name) => {
                kept.pop();
            }
            _ => kept.push(tag),
        }
    }
    Some(kept.into_iter().map(|tag| tag.raw).collect())
}
