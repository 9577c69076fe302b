pub mod backend;
pub mod store;

pub use backend::{InMemoryBackend, MemoryBackend};
pub use store::MemoryStore;
