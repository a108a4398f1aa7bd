//! Set of remote users currently typing in the room.

use super::value_object::{Timestamp, UserName};

/// Users currently typing, with the time of their latest typing signal.
///
/// Membership is what matters; names are kept in arrival order so the
/// summary line is stable between redraws.
#[derive(Debug, Clone, Default)]
pub struct TypingSet {
    users: Vec<(UserName, Timestamp)>,
}

impl TypingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a typing signal from `user`, refreshing its last-seen time.
    ///
    /// Returns `true` if the user was not typing before.
    pub fn insert(&mut self, user: UserName, now: Timestamp) -> bool {
        match self.users.iter_mut().find(|(u, _)| *u == user) {
            Some(entry) => {
                entry.1 = now;
                false
            }
            None => {
                self.users.push((user, now));
                true
            }
        }
    }

    /// Remove `user`. Returns `true` if it was present.
    pub fn remove(&mut self, user: &UserName) -> bool {
        let before = self.users.len();
        self.users.retain(|(u, _)| u != user);
        self.users.len() != before
    }

    /// Drop users whose last signal is at least `ttl_millis` old.
    ///
    /// Returns `true` if anyone was dropped.
    pub fn expire(&mut self, now: Timestamp, ttl_millis: u64) -> bool {
        let before = self.users.len();
        self.users
            .retain(|(_, seen)| seen.millis_until(now) < ttl_millis);
        self.users.len() != before
    }

    /// Earliest time at which a member would expire under `ttl_millis`
    pub fn next_expiry(&self, ttl_millis: u64) -> Option<Timestamp> {
        self.users
            .iter()
            .map(|(_, seen)| seen.add_millis(ttl_millis))
            .min()
    }

    pub fn contains(&self, user: &UserName) -> bool {
        self.users.iter().any(|(u, _)| u == user)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Human-readable indicator text, `None` when nobody is typing (indicator hidden).
    ///
    /// 1 user: `X is typing…`, 2 users: `X and Y are typing…`,
    /// 3 or more: `X, Y, and N more are typing…`.
    pub fn summary(&self) -> Option<String> {
        match self.users.as_slice() {
            [] => None,
            [(a, _)] => Some(format!("{a} is typing…")),
            [(a, _), (b, _)] => Some(format!("{a} and {b} are typing…")),
            [(a, _), (b, _), rest @ ..] => {
                Some(format!("{a}, {b}, and {} more are typing…", rest.len()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserName {
        UserName::new(name.to_string()).unwrap()
    }

    fn typing_set(names: &[&str]) -> TypingSet {
        let mut set = TypingSet::new();
        for name in names {
            set.insert(user(name), Timestamp::new(0));
        }
        set
    }

    #[test]
    fn test_summary_empty_is_hidden() {
        // テスト項目: 誰も入力していなければインジケーターは非表示
        assert_eq!(typing_set(&[]).summary(), None);
    }

    #[test]
    fn test_summary_one_user() {
        // テスト項目: 1 人の場合の表示
        assert_eq!(
            typing_set(&["alice"]).summary().as_deref(),
            Some("alice is typing…")
        );
    }

    #[test]
    fn test_summary_two_users() {
        // テスト項目: 2 人の場合の表示
        assert_eq!(
            typing_set(&["alice", "bob"]).summary().as_deref(),
            Some("alice and bob are typing…")
        );
    }

    #[test]
    fn test_summary_three_or_more_users() {
        // テスト項目: 3 人以上の場合は先頭 2 人と残り人数を表示
        assert_eq!(
            typing_set(&["alice", "bob", "carol"]).summary().as_deref(),
            Some("alice, bob, and 1 more are typing…")
        );
        assert_eq!(
            typing_set(&["alice", "bob", "carol", "dave"]).summary().as_deref(),
            Some("alice, bob, and 2 more are typing…")
        );
    }

    #[test]
    fn test_insert_twice_refreshes_without_duplicating() {
        // テスト項目: 同じユーザーの入力通知は重複せず最終時刻だけ更新される
        // given (前提条件):
        let mut set = TypingSet::new();
        set.insert(user("alice"), Timestamp::new(0));

        // when (操作):
        let inserted = set.insert(user("alice"), Timestamp::new(500));

        // then (期待する結果):
        assert!(!inserted);
        assert_eq!(set.len(), 1);
        assert_eq!(set.next_expiry(1_000), Some(Timestamp::new(1_500)));
    }

    #[test]
    fn test_expire_drops_stale_users() {
        // テスト項目: 一定時間通知のないユーザーは取り除かれる
        // given (前提条件):
        let mut set = TypingSet::new();
        set.insert(user("alice"), Timestamp::new(0));
        set.insert(user("bob"), Timestamp::new(4_000));

        // when (操作):
        let changed = set.expire(Timestamp::new(6_000), 6_000);

        // then (期待する結果):
        assert!(changed);
        assert!(!set.contains(&user("alice")));
        assert!(set.contains(&user("bob")));
    }
}
