//! Domain entities - row-backed records and the write descriptors
//! controllers build to describe an intended insert or update.

mod category;
mod post;
mod user;

pub use category::Category;
pub use post::{NewPost, Post, PostDetail, PostPatch};
pub use user::{NewUser, User, UserPatch};
