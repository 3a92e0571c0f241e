pub mod error;
pub mod memorydb;
pub mod schema;

pub use memorydb::MemoryDB;
