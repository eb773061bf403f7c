mod token_registry_redis;

pub use token_registry_redis::*;
