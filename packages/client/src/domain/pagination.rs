//! Cursor for loading older history pages.

use super::value_object::MessageId;

/// Oldest loaded message plus whether the server has more history.
///
/// Once the server reports no further history, no request is issued until
/// the history is reloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationCursor {
    oldest: Option<MessageId>,
    more_available: bool,
    in_flight: bool,
}

impl PaginationCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset after a full history load
    pub fn reset(&mut self, oldest: Option<MessageId>, has_more: bool) {
        self.oldest = oldest;
        self.more_available = has_more && self.oldest.is_some();
        self.in_flight = false;
    }

    /// Claim the next page request.
    ///
    /// Returns the id to page before, or `None` if a request is already in
    /// flight, nothing more is available, or nothing is loaded yet.
    pub fn begin_request(&mut self) -> Option<MessageId> {
        if self.in_flight || !self.more_available {
            return None;
        }
        let oldest = self.oldest.clone()?;
        self.in_flight = true;
        Some(oldest)
    }

    /// Record the arrival of an older page.
    ///
    /// An empty page keeps the current cursor.
    pub fn complete(&mut self, new_oldest: Option<MessageId>, has_more: bool) {
        if new_oldest.is_some() {
            self.oldest = new_oldest;
        }
        self.more_available = has_more && self.oldest.is_some();
        self.in_flight = false;
    }

    /// Follow the deletion of the oldest loaded message
    pub fn replace_oldest(&mut self, deleted: &MessageId, next_oldest: Option<MessageId>) {
        if self.oldest.as_ref() == Some(deleted) {
            self.oldest = next_oldest;
            if self.oldest.is_none() {
                self.more_available = false;
            }
        }
    }

    pub fn oldest(&self) -> Option<&MessageId> {
        self.oldest.as_ref()
    }

    pub fn more_available(&self) -> bool {
        self.more_available
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> MessageId {
        MessageId::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_begin_request_twice_claims_once() {
        // テスト項目: 応答前に 2 回要求しても 1 回しか発行されない
        // given (前提条件):
        let mut cursor = PaginationCursor::new();
        cursor.reset(Some(id("m1")), true);

        // when (操作):
        let first = cursor.begin_request();
        let second = cursor.begin_request();

        // then (期待する結果):
        assert_eq!(first, Some(id("m1")));
        assert_eq!(second, None);
        assert!(cursor.in_flight());
    }

    #[test]
    fn test_no_request_after_history_exhausted() {
        // テスト項目: サーバーが履歴の終わりを返した後は要求しない
        // given (前提条件):
        let mut cursor = PaginationCursor::new();
        cursor.reset(Some(id("m20")), true);
        cursor.begin_request();

        // when (操作):
        cursor.complete(Some(id("m1")), false);

        // then (期待する結果):
        assert_eq!(cursor.oldest(), Some(&id("m1")));
        assert!(!cursor.more_available());
        assert_eq!(cursor.begin_request(), None);
    }

    #[test]
    fn test_empty_page_keeps_cursor() {
        // テスト項目: 空のページを受け取ってもカーソルは変わらない
        // given (前提条件):
        let mut cursor = PaginationCursor::new();
        cursor.reset(Some(id("m5")), true);
        cursor.begin_request();

        // when (操作):
        cursor.complete(None, true);

        // then (期待する結果):
        assert_eq!(cursor.oldest(), Some(&id("m5")));
        assert!(!cursor.in_flight());
        assert!(cursor.more_available());
    }

    #[test]
    fn test_empty_history_has_nothing_to_page() {
        // テスト項目: 履歴が空なら has_more でも要求しない
        // given (前提条件):
        let mut cursor = PaginationCursor::new();

        // when (操作):
        cursor.reset(None, true);

        // then (期待する結果):
        assert_eq!(cursor.begin_request(), None);
    }
}
