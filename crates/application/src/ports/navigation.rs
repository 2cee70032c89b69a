//! Navigation port

/// Port for the "go to login screen" side effect.
///
/// The coordinator invokes this exactly once per terminal refresh
/// failure; what "navigating" means is up to the consuming front end.
pub trait Navigator: Send + Sync {
    /// Directs the user to the login entry point.
    fn to_login(&self);
}
