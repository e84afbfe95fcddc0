//! Timers used to record setup and solve times.

#[allow(clippy::module_inception)]
mod timers;
pub use timers::*;
