//! The access policy for mutations.
//!
//! One explicit function composed with each handler, replacing inherited
//! per-view permission checks. Denial is soft: instead of an error, the
//! actor is sent to the canonical read view of the resource.

use uuid::Uuid;

use crate::domain::{Comment, Post};

/// Mutations guarded by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Send the actor to the detail view of this post instead of failing.
    RedirectToPost(Uuid),
}

/// A resource owned by the user who created it.
pub trait Authored {
    fn author_id(&self) -> Uuid;

    /// The post whose detail view is the canonical read view for this
    /// resource.
    fn anchor_post_id(&self) -> Uuid;
}

impl Authored for Post {
    fn author_id(&self) -> Uuid {
        self.author_id
    }

    fn anchor_post_id(&self) -> Uuid {
        self.id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Uuid {
        self.author_id
    }

    fn anchor_post_id(&self) -> Uuid {
        self.post_id
    }
}

/// Only the author may mutate a post or comment.
pub fn can_mutate(actor_id: Uuid, resource: &impl Authored) -> bool {
    actor_id == resource.author_id()
}

/// Authorize `action` on `resource` for `actor_id`.
pub fn authorize(actor_id: Uuid, resource: &impl Authored, action: Action) -> Access {
    match action {
        Action::Update | Action::Delete if can_mutate(actor_id, resource) => Access::Granted,
        Action::Update | Action::Delete => Access::RedirectToPost(resource.anchor_post_id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post() -> Post {
        Post::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            "Title".into(),
            "Text".into(),
            Utc::now(),
        )
    }

    #[test]
    fn author_may_mutate_own_post() {
        let post = post();
        assert!(can_mutate(post.author_id, &post));
        assert_eq!(
            authorize(post.author_id, &post, Action::Delete),
            Access::Granted
        );
    }

    #[test]
    fn stranger_is_redirected_to_post_detail() {
        let post = post();
        let stranger = Uuid::new_v4();
        assert!(!can_mutate(stranger, &post));
        assert_eq!(
            authorize(stranger, &post, Action::Update),
            Access::RedirectToPost(post.id)
        );
    }

    #[test]
    fn comment_denial_anchors_at_parent_post() {
        let post = post();
        let comment = Comment::new(post.id, Uuid::new_v4(), "hi".into());
        let stranger = Uuid::new_v4();
        assert_eq!(
            authorize(stranger, &comment, Action::Delete),
            Access::RedirectToPost(post.id)
        );
    }
}
