mod auth_repo_memory;
mod catalog_repo_memory;
mod token_registry_memory;

pub use auth_repo_memory::*;
pub use catalog_repo_memory::*;
pub use token_registry_memory::*;
