use crate::models::Page;

pub(crate) const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PageStatus {
    NotStarted,
    HasMore,
    Exhausted,
}

/// A fetch that was handed out by [`PagedList::begin_fetch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub page: u32,
    pub generation: u64,
}

/// Accumulates server pages. Pagination state is whatever the server last
/// reported; this only tracks what to ask for next.
#[derive(Clone, Debug)]
pub(crate) struct PagedList<T> {
    items: Vec<T>,
    status: PageStatus,
    next_page: u32,
    in_flight: bool,
    generation: u64,
}

impl<T> Default for PagedList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: PageStatus::NotStarted,
            next_page: 1,
            in_flight: false,
            generation: 0,
        }
    }
}

impl<T> PagedList<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn has_more(&self) -> bool {
        self.status != PageStatus::Exhausted
    }

    /// Drops everything and starts over from page 1. Responses to earlier
    /// requests are ignored from now on.
    pub fn reset(&mut self) {
        self.items.clear();
        self.status = PageStatus::NotStarted;
        self.next_page = 1;
        self.in_flight = false;
        self.generation += 1;
    }

    pub fn begin_fetch(&mut self) -> Option<PageRequest> {
        if self.in_flight || self.status == PageStatus::Exhausted {
            return None;
        }
        self.in_flight = true;
        Some(PageRequest {
            page: self.next_page,
            generation: self.generation,
        })
    }

    /// Returns `false` when the response belongs to an older generation.
    pub fn complete(&mut self, req: PageRequest, page: Page<T>) -> bool {
        if req.generation != self.generation {
            return false;
        }
        self.in_flight = false;
        self.items.extend(page.result);
        // Never step backwards, even if the server echoes an older page number.
        let reached = page.current_page.max(req.page);
        if reached >= page.total_pages {
            self.status = PageStatus::Exhausted;
        } else {
            self.status = PageStatus::HasMore;
            self.next_page = reached + 1;
        }
        true
    }

    /// Any failure stops pagination; there is no retry.
    pub fn fail(&mut self, req: PageRequest) -> bool {
        if req.generation != self.generation {
            return false;
        }
        self.in_flight = false;
        self.status = PageStatus::Exhausted;
        true
    }
}

/// Appends `page`/`size` query parameters to `endpoint`.
pub(crate) fn with_page(endpoint: &str, page: u32, size: u32) -> String {
    let sep = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{sep}page={page}&size={size}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(current: u32, total: u32, items: Vec<u32>) -> Page<u32> {
        Page {
            current_page: current,
            total_pages: total,
            total_items: None,
            page_size: None,
            result: items,
        }
    }

    /// Serves page `n` with `n` items, the way a backend with `total` pages would.
    fn drain(list: &mut PagedList<u32>, total: u32) -> Vec<u32> {
        let mut requested = vec![];
        while let Some(req) = list.begin_fetch() {
            requested.push(req.page);
            let items = (0..req.page).collect();
            assert!(list.complete(req, page(req.page, total, items)));
        }
        requested
    }

    #[test]
    fn fetches_every_page_in_order_then_stops() {
        let mut list = PagedList::default();
        assert_eq!(list.status(), PageStatus::NotStarted);

        let requested = drain(&mut list, 4);
        assert_eq!(requested, vec![1, 2, 3, 4]);
        assert_eq!(list.items().len(), 1 + 2 + 3 + 4);
        assert_eq!(list.status(), PageStatus::Exhausted);
        assert!(list.begin_fetch().is_none());
    }

    #[test]
    fn single_or_empty_listing_exhausts_after_first_page() {
        let mut list: PagedList<u32> = PagedList::default();
        let req = list.begin_fetch().expect("first page");
        list.complete(req, page(1, 0, vec![]));
        assert!(!list.has_more());
        assert!(list.items().is_empty());
    }

    #[test]
    fn no_second_fetch_while_one_is_in_flight() {
        let mut list: PagedList<u32> = PagedList::default();
        let first = list.begin_fetch().expect("first page");
        assert!(list.begin_fetch().is_none());
        list.complete(first, page(1, 3, vec![7]));
        assert_eq!(list.status(), PageStatus::HasMore);
        assert_eq!(list.begin_fetch().map(|r| r.page), Some(2));
    }

    #[test]
    fn reset_clears_and_restarts_from_page_one() {
        let mut list: PagedList<u32> = PagedList::default();
        drain(&mut list, 2);
        assert!(!list.items().is_empty());

        list.reset();
        assert!(list.items().is_empty());
        assert_eq!(list.status(), PageStatus::NotStarted);
        assert_eq!(list.begin_fetch().map(|r| r.page), Some(1));
    }

    #[test]
    fn responses_from_before_a_reset_are_dropped() {
        let mut list: PagedList<u32> = PagedList::default();
        let stale = list.begin_fetch().expect("first page");
        list.reset();
        let fresh = list.begin_fetch().expect("first page again");

        assert!(!list.complete(stale, page(1, 1, vec![99])));
        assert!(list.items().is_empty());
        assert!(list.is_loading());

        assert!(list.complete(fresh, page(1, 1, vec![1])));
        assert_eq!(list.items(), &[1]);
    }

    #[test]
    fn failure_stops_pagination() {
        let mut list: PagedList<u32> = PagedList::default();
        let req = list.begin_fetch().expect("first page");
        assert!(list.fail(req));
        assert!(!list.has_more());
        assert!(!list.is_loading());
        assert!(list.begin_fetch().is_none());
    }

    #[test]
    fn lagging_current_page_still_advances() {
        let mut list: PagedList<u32> = PagedList::default();
        let first = list.begin_fetch().expect("first page");
        list.complete(first, page(1, 3, vec![1]));
        let second = list.begin_fetch().expect("second page");
        assert_eq!(second.page, 2);

        // Server answers page 2 but reports currentPage = 1.
        list.complete(second, page(1, 3, vec![2]));
        assert_eq!(list.begin_fetch().map(|r| r.page), Some(3));
    }

    #[test]
    fn lagging_current_page_on_last_request_exhausts() {
        let mut list: PagedList<u32> = PagedList::default();
        let first = list.begin_fetch().expect("first page");
        list.complete(first, page(1, 2, vec![1]));
        let second = list.begin_fetch().expect("second page");
        list.complete(second, page(0, 2, vec![2]));
        assert_eq!(list.status(), PageStatus::Exhausted);
        assert_eq!(list.items(), &[1, 2]);
    }

    #[test]
    fn with_page_respects_existing_query() {
        assert_eq!(
            with_page("/api/secure/my-files", 2, 20),
            "/api/secure/my-files?page=2&size=20"
        );
        assert_eq!(
            with_page("/api/secure/search-files?keyword=a", 1, 10),
            "/api/secure/search-files?keyword=a&page=1&size=10"
        );
    }
}
