//! Persistence for forms and their responses, plus the desk that runs
//! submissions and viewer requests against a store.

pub mod desk;
pub mod fs;
pub mod memory;
pub mod store;

pub use desk::{DeskSettings, FormDesk};
pub use fs::FsStore;
pub use memory::MemoryStore;
pub use store::{FormStore, StoreError};
