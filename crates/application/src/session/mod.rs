//! Session storage, facade, and background monitoring

mod facade;
mod monitor;
mod store;

pub use facade::SessionFacade;
pub use monitor::{SessionMonitor, SessionSignal};
pub use store::SessionStore;
