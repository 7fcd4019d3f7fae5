pub mod document;
pub mod error;
pub mod memory;
pub mod store;

pub use document::{Document, Fields, Filter};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use store::DocumentStore;
