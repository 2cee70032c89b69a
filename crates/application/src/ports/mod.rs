//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and external
//! systems. Each port is a trait implemented by an adapter in the
//! infrastructure layer, or by an in-memory fake in tests.

mod clock;
mod gateway;
mod navigation;
mod storage;
mod transport;

pub use clock::Clock;
pub use gateway::{AuthGateway, RefreshOutcome};
pub use navigation::Navigator;
pub use storage::KeyValueStorage;
pub use transport::{ApiMethod, ApiRequest, ApiResponse, ApiTransport};
