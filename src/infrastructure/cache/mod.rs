mod file_cache;
mod memory_cache;

pub use file_cache::FileJobCache;
pub use memory_cache::InMemoryJobCache;
