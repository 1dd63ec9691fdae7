use serde::Serialize;

pub const PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub posts: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            posts: self.posts.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
        }
    }
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Zero-based offset of a 1-indexed page. Page 0 is read as page 1.
pub fn offset(page: usize, page_size: usize) -> usize {
    page.max(1).saturating_sub(1).saturating_mul(page_size)
}

/// Slices an already ordered collection. Out-of-range pages are empty, not errors.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let total = items.len();
    let page = page.max(1);
    let posts = items
        .into_iter()
        .skip(offset(page, page_size))
        .take(page_size)
        .collect();
    Page {
        posts,
        total,
        page,
        total_pages: total_pages(total, page_size),
    }
}
