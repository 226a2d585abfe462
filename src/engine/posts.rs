// 10.6 engine/posts.rs: forum operations.

use super::core::Engine;
use super::results::{EngineError, PostView};
use crate::events::{EventPayload, PostCreatedEvent, PostUpvotedEvent};
use crate::forum::{ForumError, Post};
use crate::types::{AgentId, PostId};
use tracing::debug;

impl Engine {
    pub fn create_post(&self, agent_id: AgentId, content: &str) -> Result<Post, EngineError> {
        let now = self.time();
        let post = self
            .store
            .forum_mut()?
            .create(agent_id, content, self.game.max_post_len, now)?
            .clone();

        debug!(post_id = %post.id, %agent_id, "post created");
        self.emit_event(EventPayload::PostCreated(PostCreatedEvent {
            post_id: post.id,
            agent_id,
        }));
        Ok(post)
    }

    /// Newest posts first, at most one page, with author names resolved.
    pub fn list_posts(&self) -> Result<Vec<PostView>, EngineError> {
        // agents before forum, per store lock order
        let agents = self.store.agents()?;
        let forum = self.store.forum()?;
        let posts = forum
            .latest(self.game.post_page_size)
            .into_iter()
            .map(|post| PostView {
                id: post.id,
                author: agents
                    .get(post.agent_id)
                    .map_or_else(|| "unknown".to_string(), |a| a.name.clone()),
                content: post.content.clone(),
                upvotes: post.upvotes,
                created_at: post.created_at,
            })
            .collect();
        Ok(posts)
    }

    /// `post_id` comes straight off the wire and must be a positive integer.
    pub fn upvote_post(&self, post_id: &str) -> Result<Post, EngineError> {
        let id = PostId::parse(post_id.trim()).ok_or_else(|| ForumError::InvalidPostId(post_id.to_string()))?;
        let post = self.store.forum_mut()?.upvote(id)?.clone();

        self.emit_event(EventPayload::PostUpvoted(PostUpvotedEvent {
            post_id: post.id,
            upvotes: post.upvotes,
        }));
        Ok(post)
    }
}
