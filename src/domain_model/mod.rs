mod book;
mod category;
mod token;
mod user;

pub use book::*;
pub use category::*;
pub use token::*;
pub use user::*;
