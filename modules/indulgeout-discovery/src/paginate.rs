use serde::Serialize;

/// A validated page cursor. Always `page >= 1` and `page_size >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// Clamp caller-supplied values instead of rejecting them.
    pub fn clamped(page: Option<i64>, page_size: Option<i64>, default_page_size: usize) -> Self {
        Self {
            page: page.map(at_least_one).unwrap_or(1),
            page_size: page_size
                .map(at_least_one)
                .unwrap_or_else(|| default_page_size.max(1)),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// The window of `items` this cursor points at. Empty past the end.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = start.saturating_add(self.page_size).min(items.len());
        &items[start..end]
    }
}

fn at_least_one(value: i64) -> usize {
    usize::try_from(value.max(1)).unwrap_or(usize::MAX)
}
