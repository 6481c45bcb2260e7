use shared::protocol::Page;

/// Cursor plus stale-response bookkeeping for one paginated listing.
///
/// Overlapping loads are never cancelled; instead every issued request is
/// tagged with a monotonically increasing sequence number and a completed
/// response is applied only if it belongs to the most recently issued
/// request. The cursor always tracks the server-reported page, never the
/// requested one, so drift stays on the server's side.
pub(crate) struct ListingState<T> {
    cursor: u32,
    latest_seq: u64,
    current: Option<Page<T>>,
}

impl<T> Default for ListingState<T> {
    fn default() -> Self {
        Self {
            cursor: 1,
            latest_seq: 0,
            current: None,
        }
    }
}

impl<T> ListingState<T> {
    /// Registers a new in-flight request and returns its sequence number.
    pub fn begin(&mut self) -> u64 {
        self.latest_seq += 1;
        self.latest_seq
    }

    /// Applies a completed response unless a newer request has been issued
    /// since; returns false when the response is stale and discarded.
    pub fn apply(&mut self, seq: u64, page: Page<T>) -> bool {
        if seq != self.latest_seq {
            return false;
        }
        self.cursor = page.page.max(1);
        self.current = Some(page);
        true
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn current(&self) -> Option<&Page<T>> {
        self.current.as_ref()
    }

    pub fn has_prev(&self) -> bool {
        self.current.as_ref().is_some_and(|page| page.has_prev)
    }

    pub fn has_next(&self) -> bool {
        self.current.as_ref().is_some_and(|page| page.has_next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32) -> Page<u8> {
        Page {
            items: vec![],
            total: 0,
            page: number,
            per_page: None,
            has_prev: number > 1,
            has_next: false,
        }
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut listing = ListingState::default();
        let first = listing.begin();
        let second = listing.begin();
        assert!(listing.apply(second, page(2)));
        assert!(!listing.apply(first, page(1)));
        assert_eq!(listing.cursor(), 2);
    }

    #[test]
    fn cursor_follows_server_reported_page() {
        let mut listing = ListingState::default();
        let seq = listing.begin();
        // Requested page 5, server answered with page 3.
        assert!(listing.apply(seq, page(3)));
        assert_eq!(listing.cursor(), 3);
    }

    #[test]
    fn flags_are_false_before_first_load() {
        let listing: ListingState<u8> = ListingState::default();
        assert!(!listing.has_prev());
        assert!(!listing.has_next());
        assert_eq!(listing.cursor(), 1);
    }
}
