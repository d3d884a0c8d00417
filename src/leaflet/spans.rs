use std::ops::Range;

/// A maximal byte run over which the mark set does not change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<M> {
    pub start: usize,
    pub end: usize,
    pub marks: Vec<M>,
}

impl<M> Span<M> {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Splits `0..len` into runs of equal mark sets.
///
/// Every mark is added to each byte position its range covers, so ranges may
/// overlap freely; a new span starts wherever the sorted set changes. Ranges
/// are clamped to `len`. Mark sets within a span are sorted and deduplicated.
pub fn render_spans<M, I>(len: usize, marked: I) -> Vec<Span<M>>
where
    M: Ord + Clone,
    I: IntoIterator<Item = (Range<usize>, M)>,
{
    let mut marks_at: Vec<Vec<M>> = vec![Vec::new(); len];
    for (range, mark) in marked {
        let to = range.end.min(len);
        let from = range.start.min(to);
        for marks in &mut marks_at[from..to] {
            marks.push(mark.clone());
        }
    }

    for marks in &mut marks_at {
        marks.sort();
        marks.dedup();
    }

    let mut spans = Vec::with_capacity(len.min(64));
    let mut start = 0usize;
    while start < len {
        let current = std::mem::take(&mut marks_at[start]);
        let mut end = start + 1;
        while end < len && marks_at[end] == current {
            end += 1;
        }
        spans.push(Span {
            start,
            end,
            marks: current,
        });
        start = end;
    }

    spans
}
