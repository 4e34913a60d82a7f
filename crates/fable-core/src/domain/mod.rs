//! Domain entities - the core business objects.

mod post;
mod user;

pub use post::{Comment, Post, ReactionKind, Reactions};
pub use user::{Role, User};
