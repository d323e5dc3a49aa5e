//! In-process storage backend.
//!
//! Holds comments, rates and known users behind a single async `RwLock`.
//! Nothing survives a restart; the backend exists so the server runs without
//! external infrastructure and so the API can be tested end to end.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use marginalia_core::content::RichContent;
use marginalia_core::roles::Role;
use marginalia_core::schemas::{SortOrder, ValidatedPost};
use marginalia_core::types::{AuthInfo, UserProfile};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::adapter::{StorageAdapter, UserDirectory};
use crate::error::{StorageError, StorageResult};
use crate::models::{Comment, CommentQuery, CommentRef, SerializedComment};

/// Maximum number of users returned by a mention lookup.
pub const MAX_USER_RESULTS: usize = 10;

#[derive(Default)]
struct Inner {
    comments: HashMap<String, StoredComment>,
    /// `(comment_id, user_id) -> like`.
    rates: HashMap<(String, String), bool>,
    users: HashMap<String, UserProfile>,
    next_seq: u64,
}

struct StoredComment {
    comment: Comment,
    /// Insertion order, breaks ties between equal timestamps.
    seq: u64,
}

/// Comment storage kept entirely in memory.
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<Inner>,
    admins: HashSet<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant the moderator role to the given user ids.
    pub fn with_admins<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: RwLock::default(),
            admins: admins.into_iter().map(Into::into).collect(),
        }
    }

    /// Make a user known to mention lookup before they have commented.
    pub async fn register_user(&self, user: UserProfile) {
        self.inner.write().await.users.insert(user.id.clone(), user);
    }

    /// Number of stored comments across all pages.
    pub async fn comment_count(&self) -> usize {
        self.inner.read().await.comments.len()
    }
}

impl Inner {
    fn find(&self, page: &str, id: &str) -> Option<&StoredComment> {
        self.comments.get(id).filter(|s| s.comment.page == page)
    }

    fn serialize(&self, stored: &StoredComment, viewer: Option<&AuthInfo>) -> SerializedComment {
        let comment = &stored.comment;
        let (mut likes, mut dislikes) = (0, 0);
        for ((comment_id, _), like) in &self.rates {
            if comment_id == &comment.id {
                if *like {
                    likes += 1;
                } else {
                    dislikes += 1;
                }
            }
        }
        let replies = self
            .comments
            .values()
            .filter(|s| s.comment.thread.as_deref() == Some(comment.id.as_str()))
            .count() as u32;
        let liked = viewer.and_then(|v| {
            self.rates
                .get(&(comment.id.clone(), v.id.clone()))
                .copied()
        });
        let author = self
            .users
            .get(&comment.author_id)
            .cloned()
            .unwrap_or_else(|| UserProfile {
                id: comment.author_id.clone(),
                name: "Deleted User".to_string(),
                image: None,
            });

        SerializedComment {
            id: comment.id.clone(),
            page: comment.page.clone(),
            thread: comment.thread.clone(),
            author,
            content: comment.content.clone(),
            timestamp: comment.created_at,
            edited: comment.edited,
            likes,
            dislikes,
            replies,
            liked,
        }
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn get_comments(
        &self,
        page: &str,
        query: &CommentQuery,
        viewer: Option<&AuthInfo>,
    ) -> StorageResult<Vec<SerializedComment>> {
        let inner = self.inner.read().await;

        let mut matching: Vec<&StoredComment> = inner
            .comments
            .values()
            .filter(|s| s.comment.page == page)
            .filter(|s| s.comment.thread == query.thread)
            .filter(|s| query.before.map_or(true, |b| s.comment.created_at < b))
            .filter(|s| query.after.map_or(true, |a| s.comment.created_at > a))
            .collect();

        matching.sort_by_key(|s| (s.comment.created_at, s.seq));
        if query.sort == SortOrder::Newest {
            matching.reverse();
        }

        Ok(matching
            .into_iter()
            .take(query.limit)
            .map(|s| inner.serialize(s, viewer))
            .collect())
    }

    async fn post_comment(
        &self,
        page: &str,
        post: ValidatedPost,
        author: &AuthInfo,
    ) -> StorageResult<SerializedComment> {
        let mut inner = self.inner.write().await;

        let seq = inner.next_seq;
        inner.next_seq += 1;

        let comment = Comment {
            id: Uuid::now_v7().to_string(),
            page: page.to_string(),
            thread: post.thread,
            author_id: author.id.clone(),
            content: post.content,
            // Listing cursors are Unix milliseconds, so stored times are too.
            created_at: Utc::now().trunc_subsecs(3),
            updated_at: None,
            edited: false,
        };
        let id = comment.id.clone();

        inner
            .users
            .insert(author.id.clone(), UserProfile::from(author.clone()));
        inner.comments.insert(id.clone(), StoredComment { comment, seq });

        let stored = inner
            .comments
            .get(&id)
            .ok_or_else(|| StorageError::Backend("comment vanished after insert".into()))?;
        Ok(inner.serialize(stored, Some(author)))
    }

    async fn update_comment(
        &self,
        page: &str,
        id: &str,
        content: RichContent,
        _auth: &AuthInfo,
    ) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .comments
            .get_mut(id)
            .filter(|s| s.comment.page == page)
            .ok_or_else(|| StorageError::comment_not_found(id))?;

        stored.comment.content = content;
        stored.comment.updated_at = Some(Utc::now().trunc_subsecs(3));
        stored.comment.edited = true;
        Ok(())
    }

    async fn delete_comment(&self, page: &str, id: &str, _auth: &AuthInfo) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        if inner.find(page, id).is_none() {
            return Err(StorageError::comment_not_found(id));
        }

        // Walk down the reply tree so no reply outlives its thread.
        let mut removed: HashSet<String> = HashSet::from([id.to_string()]);
        let mut frontier = vec![id.to_string()];
        while let Some(parent) = frontier.pop() {
            for stored in inner.comments.values() {
                if stored.comment.thread.as_deref() == Some(parent.as_str())
                    && removed.insert(stored.comment.id.clone())
                {
                    frontier.push(stored.comment.id.clone());
                }
            }
        }

        inner.comments.retain(|key, _| !removed.contains(key));
        inner
            .rates
            .retain(|(comment_id, _), _| !removed.contains(comment_id));

        tracing::debug!(page, id, removed = removed.len(), "Comment deleted");
        Ok(())
    }

    async fn set_rate(
        &self,
        page: &str,
        id: &str,
        like: bool,
        auth: &AuthInfo,
    ) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        if inner.find(page, id).is_none() {
            return Err(StorageError::comment_not_found(id));
        }
        inner
            .rates
            .insert((id.to_string(), auth.id.clone()), like);
        Ok(())
    }

    async fn delete_rate(&self, page: &str, id: &str, auth: &AuthInfo) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        if inner.find(page, id).is_none() {
            return Err(StorageError::comment_not_found(id));
        }
        inner.rates.remove(&(id.to_string(), auth.id.clone()));
        Ok(())
    }

    async fn get_role(&self, auth: &AuthInfo) -> StorageResult<Option<Role>> {
        Ok(self.admins.contains(&auth.id).then(Role::admin))
    }

    async fn get_comment_ref(&self, page: &str, id: &str) -> StorageResult<Option<CommentRef>> {
        let inner = self.inner.read().await;
        Ok(inner.find(page, id).map(|s| CommentRef {
            author_id: s.comment.author_id.clone(),
            thread: s.comment.thread.clone(),
        }))
    }
}

#[async_trait]
impl UserDirectory for MemoryStorage {
    async fn query_users(&self, _page: &str, name: &str) -> StorageResult<Vec<UserProfile>> {
        let needle = name.to_lowercase();
        let inner = self.inner.read().await;

        let mut users: Vec<UserProfile> = inner
            .users
            .values()
            .filter(|u| u.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        users.truncate(MAX_USER_RESULTS);
        Ok(users)
    }
}
