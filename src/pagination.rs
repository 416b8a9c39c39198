/// Client-side pager over an in-memory, already-filtered list.
///
/// Pages are 1-based. Navigation clamps: stepping past either end is a
/// no-op. When the filtered list empties while the pager sits on a later
/// page, `sync` snaps it back to page 1.
#[derive(Debug, Clone)]
pub struct Paginator {
    page: usize,
    per_page: usize,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// ceil(len / per_page); zero for an empty list.
    pub fn page_count(&self, len: usize) -> usize {
        (len + self.per_page - 1) / self.per_page
    }

    /// Current page's slice of `items`.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page - 1) * self.per_page;
        if start >= items.len() {
            return &[];
        }
        let end = (start + self.per_page).min(items.len());
        &items[start..end]
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// No-op when already on the last page (or the list is empty).
    pub fn next_page(&mut self, len: usize) {
        let last = self.page_count(len).max(1);
        if self.page < last {
            self.page += 1;
        }
    }

    /// No-op when already on page 1.
    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Snap back to page 1 when the filtered list can no longer reach the
    /// current page.
    pub fn sync(&mut self, len: usize) {
        if len == 0 && self.page > 1 {
            self.page = 1;
        }
    }
}
