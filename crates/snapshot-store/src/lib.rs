pub mod error;
pub mod file;
pub mod memory;
pub mod store;
pub mod version;

pub use error::{Result, StoreError};
pub use file::FileSnapshotStore;
pub use memory::InMemorySnapshotStore;
pub use store::SnapshotStore;
pub use version::Version;
