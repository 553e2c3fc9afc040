//! Primitive types - Props and cleanup.
//!
//! Props are plain structs with defaults; build them with struct update
//! syntax and let the primitive validate them on construction.

use std::fmt;
use std::time::Duration;

use crate::error::PropsError;
use crate::state::EventBus;
use super::indicator::Indicator;

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by components.
///
/// Call this to unmount the component and release resources.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Infinite Loading Props
// =============================================================================

/// Properties for the infinite loading sentinel.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use spark_infinite_loading::primitives::InfiniteLoadingProps;
///
/// let props = InfiniteLoadingProps {
///     offset: 2.0,
///     delay: Duration::from_millis(150),
///     class_name: Some("feed-loader".into()),
///     ..Default::default()
/// };
/// ```
#[derive(Clone)]
pub struct InfiniteLoadingProps {
    /// Trigger once the sentinel's bottom edge is at least this far above
    /// the viewport's bottom (rows). May be negative to trigger early.
    pub offset: f32,
    /// Wait before publishing a trigger, for the initial load and for
    /// scroll-triggered loads alike.
    pub delay: Duration,
    /// Publish INIT_LOADING on start.
    pub initial_load: bool,
    /// Bus to talk on. Falls back to [`EventBus::shared`].
    pub emitter: Option<EventBus>,
    /// Content shown while loading. Defaults to [`Indicator::Spinner`].
    pub loading_indicator: Option<Indicator>,
    /// Extra class added to the root element.
    pub class_name: Option<String>,
}

impl Default for InfiniteLoadingProps {
    fn default() -> Self {
        Self {
            offset: 0.0,
            delay: Duration::ZERO,
            initial_load: true,
            emitter: None,
            loading_indicator: None,
            class_name: None,
        }
    }
}

impl InfiniteLoadingProps {
    /// Check the props describe a usable sentinel.
    pub fn validate(&self) -> Result<(), PropsError> {
        if !self.offset.is_finite() {
            return Err(PropsError::NonFiniteOffset(self.offset));
        }
        if self.class_name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(PropsError::EmptyClassName);
        }
        Ok(())
    }

    /// The bus the sentinel will use.
    pub fn bus(&self) -> EventBus {
        self.emitter.clone().unwrap_or_else(EventBus::shared)
    }

    /// The indicator the sentinel will render.
    pub fn indicator(&self) -> Indicator {
        self.loading_indicator.clone().unwrap_or_default()
    }
}

impl fmt::Debug for InfiniteLoadingProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfiniteLoadingProps")
            .field("offset", &self.offset)
            .field("delay", &self.delay)
            .field("initial_load", &self.initial_load)
            .field("emitter", &self.emitter.is_some())
            .field("loading_indicator", &self.loading_indicator)
            .field("class_name", &self.class_name)
            .finish()
    }
}
