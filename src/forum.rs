// 6.0 forum.rs: shared message board. independent of the squad core.

use crate::types::{AgentId, PostId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub agent_id: AgentId,
    pub content: String,
    pub upvotes: u64,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct Forum {
    posts: Vec<Post>,
    next_id: u64,
}

impl Forum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Length is checked on the content as sent, in characters. The stored text is trimmed.
    pub fn create(
        &mut self,
        agent_id: AgentId,
        content: &str,
        max_len: usize,
        timestamp: Timestamp,
    ) -> Result<&Post, ForumError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ForumError::EmptyContent);
        }
        let len = content.chars().count();
        if len > max_len {
            return Err(ForumError::ContentTooLong { len, max: max_len });
        }

        self.next_id += 1;
        self.posts.push(Post {
            id: PostId(self.next_id),
            agent_id,
            content: trimmed.to_string(),
            upvotes: 0,
            created_at: timestamp,
        });
        Ok(&self.posts[self.posts.len() - 1])
    }

    /// Newest first. ids are assigned in creation order so they break timestamp ties.
    pub fn latest(&self, limit: usize) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        posts.truncate(limit);
        posts
    }

    pub fn upvote(&mut self, id: PostId) -> Result<&Post, ForumError> {
        let post = self
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ForumError::PostNotFound(id))?;
        post.upvotes = post.upvotes.saturating_add(1);
        Ok(post)
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForumError {
    #[error("Missing content")]
    EmptyContent,

    #[error("Content too long: {len} characters, maximum {max}")]
    ContentTooLong { len: usize, max: usize },

    #[error("Invalid post ID '{0}'")]
    InvalidPostId(String),

    #[error("Post {0} not found")]
    PostNotFound(PostId),
}
