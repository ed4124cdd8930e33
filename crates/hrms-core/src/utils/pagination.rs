//! Client-side pagination over already-fetched records.

/// One page of a slice. Pages are 1-based.
#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice out page `page` of `per_page` items. A page past the end is empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_pages = items.len().div_ceil(per_page);

    let start = (page - 1).saturating_mul(per_page).min(items.len());
    let end = start.saturating_add(per_page).min(items.len());

    Page {
        items: &items[start..end],
        page,
        total_pages,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Number(usize),
    Ellipsis,
}

/// Compact page list: the first two, the last two and the neighbours of
/// `current`, with runs of hidden pages collapsed into one ellipsis.
pub fn page_numbers(current: usize, total_pages: usize) -> Vec<PageMarker> {
    let mut markers = Vec::new();
    for p in 1..=total_pages {
        let shown = p <= 2
            || p + 2 > total_pages
            || (p + 1 >= current && p <= current + 1);
        if shown {
            markers.push(PageMarker::Number(p));
        } else if markers.last() != Some(&PageMarker::Ellipsis) {
            markers.push(PageMarker::Ellipsis);
        }
    }
    markers
}
