//! # spark-infinite-loading
//!
//! Event-driven infinite loading for reactive terminal UIs.
//!
//! A sentinel sits below the last row of a scrolling list. When the viewport
//! scrolls far enough for the sentinel to come within `offset` rows of the
//! bottom, it publishes a load request on an [`EventBus`] and then waits: no
//! further request goes out until the host answers `LoadingFinished` (more
//! pages remain) or `AllLoaded` (stop for good, until `Reinitialize`).
//!
//! ## Architecture
//!
//! ```text
//! Viewport --scroll--> InfiniteLoading --INIT_LOADING/LOADING--> EventBus --> host
//!                           ^                                       |
//!                           +----LOADING_FINISHED/ALL_LOADED/-------+
//!                                REINITIALIZE
//! ```
//!
//! Everything runs on the UI thread. Scroll events come from [`Viewport`],
//! delays are scheduled on a [`TimerQueue`] the host advances once per frame,
//! and the sentinel measures itself through an injected [`Measure`].
//!
//! ## Modules
//!
//! - [`types`] - Signals, measurements, widget phases, text attributes
//! - [`state`] - Event bus, viewport scroll state, timer queue
//! - [`primitives`] - The sentinel component and its indicator
//! - [`error`] - Props validation errors

pub mod error;
pub mod primitives;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::PropsError;

pub use state::{
    // Bus
    EventBus, Payload, Subscription, Completion,
    // Scroll
    Viewport, ScrollEvent, ScrollListener, LINE_SCROLL, WHEEL_SCROLL, PAGE_SCROLL_FACTOR,
    // Timers
    TimerQueue, TimerHandle,
};

pub use primitives::{
    infinite_loading, Cleanup, Indicator, InfiniteLoading, InfiniteLoadingProps, SentinelView,
};

/// Everything a host needs to wire a sentinel into its event loop.
pub mod prelude {
    pub use crate::primitives::{
        infinite_loading, Cleanup, Indicator, InfiniteLoading, InfiniteLoadingProps, SentinelView,
    };
    pub use crate::state::{EventBus, Payload, Subscription, TimerQueue, Viewport};
    pub use crate::types::{LoadSignal, Measure, SentinelRect, WidgetPhase};
}
