//! Warden Application - Session and token lifecycle core
//!
//! This crate contains the session subsystem behind the Warden client:
//! the session store, the request pipeline that stamps bearer credentials
//! and recovers from authentication failures, the refresh coordinator
//! that collapses concurrent refresh attempts into one shared operation,
//! and the background session monitor. All external effects (storage,
//! clock, network, navigation) go through the ports in [`ports`].

pub mod client;
pub mod ports;
pub mod session;
pub mod testing;

pub use client::{ApiClient, RefreshCoordinator};
pub use ports::{
    ApiMethod, ApiRequest, ApiResponse, ApiTransport, AuthGateway, Clock, KeyValueStorage,
    Navigator, RefreshOutcome,
};
pub use session::{SessionFacade, SessionMonitor, SessionSignal, SessionStore};
