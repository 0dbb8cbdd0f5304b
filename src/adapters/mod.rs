// Adapters layer: concrete implementations of the domain ports (storage, http, export sink, clock).

pub mod clock;
pub mod http;
pub mod sink;
pub mod storage;

pub use clock::{FixedClock, SystemClock};
pub use http::HttpStore;
pub use sink::DirectorySink;
pub use storage::{FallbackStore, LocalStore};
