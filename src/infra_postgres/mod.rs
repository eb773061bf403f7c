mod auth_repo_pg;
mod book_repo_pg;
mod category_repo_pg;

pub use auth_repo_pg::*;
pub use book_repo_pg::*;
pub use category_repo_pg::*;

mod util;
