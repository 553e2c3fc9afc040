//! State Module - Runtime state shared by the sentinel and its host
//!
//! - **Bus** - Load signals, subscriptions, the shared default bus
//! - **Scroll** - Viewport offset, clamping, scroll listeners
//! - **Timers** - Cancellable one-shot timers on a host-driven clock

mod bus;
mod scroll;
mod timers;

pub use bus::*;
pub use scroll::*;
pub use timers::*;
