//! Fixed-size pagination over ordered collections.
//!
//! Out-of-range page numbers never fail: requests below one clamp to the
//! first page, requests past the end clamp to the last valid page, and an
//! empty collection still resolves to a single empty page.

/// Items per listing page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// A raw page request as it arrives from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number; zero and negative values clamp to the first page.
    pub number: i64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(number: i64, size: u64) -> Self {
        Self { number, size }
    }

    pub fn first(size: u64) -> Self {
        Self { number: 1, size }
    }

    /// Clamp against a total item count, producing the concrete window to
    /// fetch.
    pub fn resolve(self, total_items: u64) -> PageWindow {
        let size = self.size.max(1);
        let total_pages = total_items.div_ceil(size).max(1);
        let number = if self.number < 1 {
            1
        } else {
            (self.number as u64).min(total_pages)
        };
        PageWindow {
            number,
            size,
            offset: (number - 1) * size,
            total_items,
            total_pages,
        }
    }
}

/// A resolved, in-range window of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub size: u64,
    pub offset: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// A bounded window of items plus paging metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            number: window.number,
            size: window.size,
            total_items: window.total_items,
            total_pages: window.total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// Slice an in-memory collection into the requested page.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let window = request.resolve(items.len() as u64);
    let items = items
        .into_iter()
        .skip(window.offset as usize)
        .take(window.size as usize)
        .collect();
    Page::new(items, window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_page_holds_the_remainder() {
        let page = paginate((0..25).collect::<Vec<_>>(), PageRequest::new(3, 10));
        assert_eq!(page.items, vec![20, 21, 22, 23, 24]);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn exact_multiple_fills_the_last_page() {
        let page = paginate((0..20).collect::<Vec<_>>(), PageRequest::new(2, 10));
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn page_zero_and_negative_clamp_to_first() {
        let items: Vec<_> = (0..5).collect();
        for number in [0, -1, -99] {
            let page = paginate(items.clone(), PageRequest::new(number, 2));
            assert_eq!(page.number, 1);
            assert_eq!(page.items, vec![0, 1]);
        }
    }

    #[test]
    fn overshooting_clamps_to_last_valid_page() {
        let page = paginate((0..25).collect::<Vec<_>>(), PageRequest::new(99, 10));
        assert_eq!(page.number, 3);
        assert_eq!(page.items, vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn empty_collection_yields_one_empty_page() {
        let page = paginate(Vec::<i32>::new(), PageRequest::new(4, 10));
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn zero_size_is_treated_as_one() {
        let page = paginate(vec![1, 2, 3], PageRequest::new(2, 0));
        assert_eq!(page.items, vec![2]);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn window_offsets_follow_page_numbers() {
        let window = PageRequest::new(2, 10).resolve(25);
        assert_eq!(window.offset, 10);
        assert_eq!(window.total_pages, 3);
    }
}
