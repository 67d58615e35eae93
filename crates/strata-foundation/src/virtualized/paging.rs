//! Contract between the virtual layouts and a paginated data source.
//!
//! Layouts only consume `items` and `total`. Request deduplication, retries
//! and ordering of overlapping responses belong to the source.

/// A request for the next page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// The request following this one.
    pub fn next(self) -> Self {
        Self {
            offset: self.offset + self.limit,
            limit: self.limit,
        }
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Total number of items available from the source.
    pub total: usize,
}

impl<T> Page<T> {
    /// Whether a collection of `loaded` items still has pages to fetch.
    pub fn has_more(&self, loaded: usize) -> bool {
        loaded < self.total
    }
}

/// A paginated item source.
pub trait PageSource<T> {
    type Error;

    fn fetch_next_page(&mut self, request: PageRequest) -> Result<Page<T>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_request() {
        assert_eq!(PageRequest::new(0, 100).next(), PageRequest::new(100, 100));
    }

    #[test]
    fn test_has_more() {
        let page = Page {
            items: vec![1, 2, 3],
            total: 5,
        };
        assert!(page.has_more(3));
        assert!(!page.has_more(5));
    }
}
