mod access_guard;
mod auth_service_impl;
mod book_service_impl;
mod category_service_impl;
mod credential_hasher_argon2;
mod session_manager_impl;
mod token_codec_jwt;

pub use access_guard::*;
pub use auth_service_impl::*;
pub use book_service_impl::*;
pub use category_service_impl::*;
pub use credential_hasher_argon2::*;
pub use session_manager_impl::*;
pub use token_codec_jwt::*;
