// store

mod token_registry;

pub use token_registry::*;

// repo

mod auth_repo;
mod book_repo;
mod category_repo;

pub use auth_repo::*;
pub use book_repo::*;
pub use category_repo::*;
