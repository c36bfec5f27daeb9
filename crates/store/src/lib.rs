pub mod memory;
pub mod session;
pub mod sqlite;

pub use memory::MemoryStore;
pub use session::{Message, Role, Session, SessionMap, SessionStore, StoreError};
pub use sqlite::SqliteStore;
