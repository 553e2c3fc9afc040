//! TUI Primitives - Component building blocks.
//!
//! - [`infinite_loading`] / [`InfiniteLoading`] - Scroll sentinel that asks
//!   the host for the next page
//! - [`Indicator`] / [`SentinelView`] - What the sentinel shows while loading
//!
//! # Reactivity
//!
//! The sentinel's visibility lives in a `spark_signals::Signal<bool>`
//! ([`InfiniteLoading::loading_done_signal`]). Read it inside an effect and
//! the sentinel redraws whenever loading starts or all data is loaded:
//!
//! ```ignore
//! let loading_done = widget.loading_done_signal();
//! let stop = effect(move || {
//!     let hidden = loading_done.get();
//!     redraw(hidden);
//! });
//! ```

mod types;
mod indicator;
mod infinite_loading;

pub use types::*;
pub use indicator::*;
pub use infinite_loading::{infinite_loading, InfiniteLoading};
