pub mod backend;
pub mod hosted;
pub mod local_store;
pub mod memory;

pub use backend::{BackendError, Direction, HostedBackend, Query, SharedBackend};
