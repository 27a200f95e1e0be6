//! Newest-first in-memory comment list.
//!
//! [`FeedStore`] is owned by the connection loop and only mutated when an
//! inbound comment arrives. Readers get snapshots.

use std::collections::{HashSet, VecDeque};

use super::{Comment, CommentId};

/// What to do with a comment whose identifier is already in the feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// At-least-once: every delivery becomes a visible entry.
    #[default]
    Keep,
    /// Discard re-deliveries of an identifier already present.
    DropById,
}

/// Ordered comment list, index 0 is the most recent insert.
///
/// No size cap is enforced.
#[derive(Debug, Default)]
pub struct FeedStore {
    comments: VecDeque<Comment>,
    seen: HashSet<CommentId>,
    policy: DuplicatePolicy,
}

impl FeedStore {
    /// Creates an empty store with the given duplicate policy.
    #[must_use]
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            comments: VecDeque::new(),
            seen: HashSet::new(),
            policy,
        }
    }

    /// Adds a comment at the front.
    ///
    /// Returns `false` if the comment was dropped by [`DuplicatePolicy::DropById`].
    pub fn prepend(&mut self, comment: Comment) -> bool {
        // Ids are only tracked when they can cause a drop.
        if self.policy == DuplicatePolicy::DropById && !self.seen.insert(comment.id.clone()) {
            tracing::debug!(id = %comment.id, "dropping duplicate comment");
            return false;
        }
        self.comments.push_front(comment);
        true
    }

    /// Returns the current feed, newest first.
    #[must_use]
    pub fn all(&self) -> Vec<Comment> {
        self.comments.iter().cloned().collect()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    /// Returns `true` if the feed is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};

    fn make_comment(id: i64, content: &str) -> Comment {
        let Ok(created_on) = DateTime::<FixedOffset>::parse_from_rfc3339("2026-10-19T16:52:00+07:00")
        else {
            panic!("valid timestamp");
        };
        Comment {
            id: CommentId::Number(id),
            content: content.to_string(),
            created_on,
        }
    }

    #[test]
    fn prepend_puts_newest_first() {
        let mut store = FeedStore::default();
        for i in 1..=4 {
            store.prepend(make_comment(i, &format!("c{i}")));
        }
        let ids: Vec<_> = store.all().into_iter().map(|c| c.id).collect();
        assert_eq!(
            ids,
            vec![
                CommentId::Number(4),
                CommentId::Number(3),
                CommentId::Number(2),
                CommentId::Number(1)
            ]
        );
        assert_eq!(store.all().first().map(|c| c.content.as_str()), Some("c4"));
    }

    #[test]
    fn order_ignores_content_and_timestamps() {
        let mut store = FeedStore::default();
        store.prepend(make_comment(9, "zzz"));
        store.prepend(make_comment(1, "aaa"));
        let contents: Vec<_> = store.all().into_iter().map(|c| c.content).collect();
        assert_eq!(contents, vec!["aaa", "zzz"]);
    }

    #[test]
    fn keep_policy_shows_duplicates() {
        let mut store = FeedStore::new(DuplicatePolicy::Keep);
        assert!(store.prepend(make_comment(1, "a")));
        assert!(store.prepend(make_comment(1, "a")));
        assert_eq!(store.len(), 2);
        assert!(store.seen.is_empty());
    }

    #[test]
    fn drop_policy_discards_duplicates() {
        let mut store = FeedStore::new(DuplicatePolicy::DropById);
        assert!(store.prepend(make_comment(1, "a")));
        assert!(store.prepend(make_comment(2, "b")));
        assert!(!store.prepend(make_comment(1, "a again")));
        assert_eq!(store.len(), 2);
        assert_eq!(store.all().first().map(|c| c.content.as_str()), Some("b"));
    }

    #[test]
    fn snapshot_is_detached() {
        let mut store = FeedStore::default();
        store.prepend(make_comment(1, "a"));
        let snapshot = store.all();
        store.prepend(make_comment(2, "b"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
    }
}
