mod in_memory;
mod redis;

pub use in_memory::InMemorySessionHistory;
pub use redis::RedisSessionHistory;
