pub mod command;
pub mod key_value;
pub mod registry;
pub mod roster;
pub mod snapshot;

pub use command::{Command, Outcome};
pub use key_value::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use registry::{Change, Registry, RegistryError};
pub use roster::{Roster, SearchHit};
pub use snapshot::{JsonSnapshot, LoadError, Persistence, SaveError};
