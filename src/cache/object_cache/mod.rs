pub mod moka;
pub mod redis;

pub use moka::MokaObjectCache;
pub use redis::RedisObjectCache;
