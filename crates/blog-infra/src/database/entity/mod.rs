//! SeaORM entity definitions - the explicit schema the tables are created
//! from at startup.

pub mod category;
pub mod post;
pub mod post_category;
pub mod user;
