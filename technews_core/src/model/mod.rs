//! The user aggregate: [`User`] and the [`Post`], [`Vote`] and
//! [`Comment`] collections it owns.

mod comment;
mod post;
mod user;
mod vote;

pub use comment::Comment;
pub use post::Post;
pub use user::{User, UserRelation};
pub use vote::Vote;
