mod auth_service;
mod catalog_service;
mod session_manager;
mod token_codec;

pub use auth_service::*;
pub use catalog_service::*;
pub use session_manager::*;
pub use token_codec::*;
