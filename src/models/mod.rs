pub mod link;
pub mod user;

pub use link::{normalize_tags, Link, LinkView};
pub use user::{User, UserView};
