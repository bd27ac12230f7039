/*!
 * Persistence Module
 * Store abstraction, process record codec and persisted-state validation
 */

pub mod record;
pub mod state;
pub mod store;

// Re-export public API
pub use record::ProcessRecord;
pub use state::{empty_memory, PersistedState};
pub use store::{FileStore, MemoryStore, Store};
