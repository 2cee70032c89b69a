//! Small adapters with no external service behind them

mod navigator;
mod system_clock;

pub use navigator::TracingNavigator;
pub use system_clock::SystemClock;
