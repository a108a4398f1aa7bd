//! Rendered feed: entries in server order, indexed by message id, plus the viewport.
//!
//! Heights are counted in terminal lines. An entry is "visible" when all of
//! its lines are inside the viewport.

use std::collections::HashMap;

use crate::domain::{Message, MessageId, MessageText, Reactions, UserName};

use super::render::{RenderedMessage, render_message};

/// One rendered message with the state the feed tracks alongside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub rendered: RenderedMessage,
    /// Current text, compared against edits
    pub text: Option<MessageText>,
    pub reactions: Reactions,
    /// Someone other than the current user has read it
    pub seen_by_others: bool,
    /// Temporarily highlighted after a jump from a reply
    pub highlighted: bool,
}

impl FeedEntry {
    pub fn from_message(message: &Message, current_user: &UserName) -> Self {
        let rendered = render_message(message, current_user);
        let seen_by_others = rendered.is_own() && message.is_read_by_other_than(current_user);
        Self {
            rendered,
            text: message.text.clone(),
            reactions: message.reactions.clone(),
            seen_by_others,
            highlighted: false,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.rendered.id
    }

    pub fn author(&self) -> &UserName {
        &self.rendered.author
    }

    /// Text quoted when replying to this entry
    pub fn snippet(&self) -> String {
        self.rendered.body.clone()
    }

    pub fn set_text(&mut self, text: MessageText) {
        self.rendered.body = text.as_str().to_string();
        self.text = Some(text);
    }

    /// Lines taken on screen: header, then optional reply, image and reactions lines
    pub fn height(&self) -> usize {
        1 + usize::from(self.rendered.reply.is_some())
            + usize::from(self.rendered.image.is_some())
            + usize::from(!self.reactions.is_empty())
    }
}

/// Ordered feed with an id index and a scrollable viewport
#[derive(Debug, Clone)]
pub struct FeedView {
    order: Vec<MessageId>,
    entries: HashMap<MessageId, FeedEntry>,
    viewport_height: usize,
    scroll_top: usize,
}

impl FeedView {
    pub fn new(viewport_height: usize) -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
            viewport_height: viewport_height.max(1),
            scroll_top: 0,
        }
    }

    /// Replace every entry and scroll to the bottom
    pub fn replace_all(&mut self, entries: Vec<FeedEntry>) {
        self.order.clear();
        self.entries.clear();
        for entry in entries {
            self.insert_last(entry);
        }
        self.scroll_to_bottom();
    }

    /// Append an entry in arrival order and scroll to the bottom.
    ///
    /// An id that is already rendered is updated in place.
    pub fn append(&mut self, entry: FeedEntry) {
        self.insert_last(entry);
        self.scroll_to_bottom();
    }

    /// Insert older entries before the first one.
    ///
    /// The viewport keeps its distance from the bottom, so what the user was
    /// looking at does not move.
    pub fn prepend(&mut self, entries: Vec<FeedEntry>) {
        let distance = self.distance_from_bottom();
        let mut older = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = entry.id().clone();
            if self.entries.contains_key(&id) {
                continue;
            }
            self.entries.insert(id.clone(), entry);
            older.push(id);
        }
        older.append(&mut self.order);
        self.order = older;
        self.scroll_top = self.max_scroll_top().saturating_sub(distance);
    }

    /// Remove an entry, returning it if it was rendered
    pub fn remove(&mut self, id: &MessageId) -> Option<FeedEntry> {
        let entry = self.entries.remove(id)?;
        self.order.retain(|o| o != id);
        self.clamp_scroll();
        Some(entry)
    }

    pub fn get(&self, id: &MessageId) -> Option<&FeedEntry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &MessageId) -> Option<&mut FeedEntry> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn first_id(&self) -> Option<&MessageId> {
        self.order.first()
    }

    /// Message ids in feed order
    pub fn ids(&self) -> &[MessageId] {
        &self.order
    }

    /// Entries in feed order
    pub fn entries(&self) -> impl Iterator<Item = &FeedEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn content_height(&self) -> usize {
        self.entries().map(FeedEntry::height).sum()
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    fn max_scroll_top(&self) -> usize {
        self.content_height().saturating_sub(self.viewport_height)
    }

    /// Lines between the bottom of the viewport and the end of the feed
    pub fn distance_from_bottom(&self) -> usize {
        self.max_scroll_top().saturating_sub(self.scroll_top)
    }

    pub fn is_at_top(&self) -> bool {
        self.scroll_top == 0
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.max_scroll_top();
    }

    /// Scroll by `delta` lines, negative is up
    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_top = self.scroll_top.saturating_add_signed(delta);
        self.clamp_scroll();
    }

    /// Keep the viewport inside the content after heights changed
    pub fn clamp_scroll(&mut self) {
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
    }

    /// Center the viewport on `id`. Returns `false` if it is not rendered.
    pub fn scroll_to(&mut self, id: &MessageId) -> bool {
        let Some((offset, height)) = self.offset_of(id) else {
            return false;
        };
        let center = offset + height / 2;
        self.scroll_top = center.saturating_sub(self.viewport_height / 2);
        self.clamp_scroll();
        true
    }

    /// Ids whose lines are all inside the viewport
    pub fn visible_ids(&self) -> Vec<MessageId> {
        let top = self.scroll_top;
        let bottom = top + self.viewport_height;
        let mut offset = 0;
        let mut visible = Vec::new();
        for entry in self.entries() {
            let height = entry.height();
            if offset >= top && offset + height <= bottom {
                visible.push(entry.id().clone());
            }
            offset += height;
            if offset >= bottom {
                break;
            }
        }
        visible
    }

    fn offset_of(&self, id: &MessageId) -> Option<(usize, usize)> {
        let mut offset = 0;
        for entry in self.entries() {
            if entry.id() == id {
                return Some((offset, entry.height()));
            }
            offset += entry.height();
        }
        None
    }

    fn insert_last(&mut self, entry: FeedEntry) {
        let id = entry.id().clone();
        if self.entries.insert(id.clone(), entry).is_none() {
            self.order.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageText, ReplyRef};

    fn user(name: &str) -> UserName {
        UserName::new(name.to_string()).unwrap()
    }

    fn id(value: &str) -> MessageId {
        MessageId::new(value.to_string()).unwrap()
    }

    fn entry(msg_id: &str) -> FeedEntry {
        let message = Message::new(id(msg_id), user("bob"))
            .with_text(MessageText::new(msg_id).unwrap());
        FeedEntry::from_message(&message, &user("alice"))
    }

    fn feed_with(ids: &[&str], viewport: usize) -> FeedView {
        let mut feed = FeedView::new(viewport);
        feed.replace_all(ids.iter().map(|i| entry(i)).collect());
        feed
    }

    #[test]
    fn test_append_keeps_arrival_order_and_scrolls_to_bottom() {
        // テスト項目: 追加したエントリは到着順に並び、表示は最下部に移動する
        // given (前提条件):
        let mut feed = FeedView::new(2);

        // when (操作):
        for i in ["c", "a", "b"] {
            feed.append(entry(i));
        }

        // then (期待する結果):
        assert_eq!(feed.ids(), &[id("c"), id("a"), id("b")]);
        assert_eq!(feed.distance_from_bottom(), 0);
        assert_eq!(feed.visible_ids(), vec![id("a"), id("b")]);
    }

    #[test]
    fn test_prepend_preserves_distance_from_bottom() {
        // テスト項目: 古いページを先頭に追加しても下端からの距離が変わらない
        // given (前提条件):
        let mut feed = feed_with(&["m3", "m4", "m5", "m6"], 2);
        feed.scroll_by(-1);
        let before = feed.distance_from_bottom();
        let visible_before = feed.visible_ids();

        // when (操作):
        feed.prepend(vec![entry("m1"), entry("m2")]);

        // then (期待する結果):
        assert_eq!(feed.distance_from_bottom(), before);
        assert_eq!(feed.visible_ids(), visible_before);
        assert_eq!(feed.first_id(), Some(&id("m1")));
        assert_eq!(feed.len(), 6);
    }

    #[test]
    fn test_prepend_skips_rendered_ids() {
        // テスト項目: 既に表示中の ID は先頭追加で重複しない
        // given (前提条件):
        let mut feed = feed_with(&["m2", "m3"], 10);

        // when (操作):
        feed.prepend(vec![entry("m1"), entry("m2")]);

        // then (期待する結果):
        assert_eq!(feed.ids(), &[id("m1"), id("m2"), id("m3")]);
    }

    #[test]
    fn test_remove_unknown_id_returns_none() {
        // テスト項目: 表示されていない ID の削除は何もしない
        // given (前提条件):
        let mut feed = feed_with(&["m1"], 10);

        // when (操作):
        let removed = feed.remove(&id("zz"));

        // then (期待する結果):
        assert!(removed.is_none());
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn test_scroll_to_centers_target() {
        // テスト項目: 指定したエントリが表示範囲に入るようにスクロールする
        // given (前提条件):
        let mut feed = feed_with(&["m1", "m2", "m3", "m4", "m5", "m6"], 2);

        // when (操作):
        let found = feed.scroll_to(&id("m2"));

        // then (期待する結果):
        assert!(found);
        assert!(feed.visible_ids().contains(&id("m2")));
    }

    #[test]
    fn test_height_counts_optional_lines() {
        // テスト項目: 返信・画像・リアクションの行数が高さに含まれる
        // given (前提条件):
        let message = Message::new(id("m1"), user("bob"))
            .with_image("https://example.com/a.png")
            .with_reply_to(ReplyRef {
                target: id("m0"),
                snippet: "hey".to_string(),
            });
        let mut entry = FeedEntry::from_message(&message, &user("alice"));

        // when (操作):
        entry.reactions.replace_with(vec![("👍".to_string(), 1)]);

        // then (期待する結果):
        assert_eq!(entry.height(), 4);
    }
}
