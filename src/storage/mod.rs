pub mod engine;
pub mod memory;
pub mod table;

pub use engine::EntityStore;
pub use memory::InMemoryStore;
pub use table::EntityTable;
