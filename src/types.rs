//! Core types shared by the bus, the viewport and the sentinel widget.

use std::fmt;

// =============================================================================
// Load Signals
// =============================================================================

/// Named signals exchanged between the sentinel widget and its host.
///
/// The widget publishes [`LoadSignal::InitLoading`] and [`LoadSignal::Loading`].
/// The host answers with [`LoadSignal::LoadingFinished`] or
/// [`LoadSignal::AllLoaded`], and may publish [`LoadSignal::Reinitialize`]
/// to reset the widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LoadSignal {
    /// First load, fired on start without a scroll event.
    InitLoading,
    /// Load the next page.
    Loading,
    /// No more data. Suppresses triggering until reinitialized.
    AllLoaded,
    /// The current load completed; triggering may resume.
    LoadingFinished,
    /// Tear the widget down and initialize it again.
    Reinitialize,
}

impl LoadSignal {
    /// Every signal, in declaration order.
    pub const ALL: [LoadSignal; 5] = [
        LoadSignal::InitLoading,
        LoadSignal::Loading,
        LoadSignal::AllLoaded,
        LoadSignal::LoadingFinished,
        LoadSignal::Reinitialize,
    ];

    /// Stable name of the signal.
    pub fn name(self) -> &'static str {
        match self {
            LoadSignal::InitLoading => "IL_INIT_LOADING",
            LoadSignal::Loading => "IL_LOADING",
            LoadSignal::AllLoaded => "IL_ALL_LOADED",
            LoadSignal::LoadingFinished => "IL_LOADING_FINISHED",
            LoadSignal::Reinitialize => "IL_REINITIALIZE",
        }
    }

    /// Whether the widget publishes this signal (as opposed to consuming it).
    pub fn is_trigger(self) -> bool {
        matches!(self, LoadSignal::InitLoading | LoadSignal::Loading)
    }
}

impl fmt::Display for LoadSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Sentinel Measurement
// =============================================================================

/// Position of the sentinel relative to the viewport, in cells.
///
/// `bottom` is the sentinel's bottom edge measured from the top of the
/// viewport. It goes negative once the sentinel has scrolled above the top.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SentinelRect {
    pub bottom: f32,
    pub viewport_height: f32,
}

impl SentinelRect {
    pub fn new(bottom: f32, viewport_height: f32) -> Self {
        Self { bottom, viewport_height }
    }

    /// Space left between the sentinel's bottom edge and the viewport's bottom.
    ///
    /// Negative while the sentinel still hangs below the viewport.
    pub fn distance_to_viewport_bottom(&self) -> f32 {
        self.viewport_height - self.bottom
    }
}

/// Measures the sentinel on demand.
///
/// Returns `None` while no sentinel is mounted.
pub trait Measure {
    fn measure(&self) -> Option<SentinelRect>;
}

impl<F> Measure for F
where
    F: Fn() -> Option<SentinelRect>,
{
    fn measure(&self) -> Option<SentinelRect> {
        self()
    }
}

// =============================================================================
// Widget Phase
// =============================================================================

/// Lifecycle phase of a sentinel widget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidgetPhase {
    /// Created, never started.
    #[default]
    Uninitialized,
    /// Listening for scroll events.
    Active,
    /// Host reported all data loaded; waiting for a reinitialize.
    AllLoaded,
    /// Stopped.
    Unmounted,
}

impl WidgetPhase {
    /// Mounted phases keep the reinitialize subscription alive.
    pub fn is_mounted(self) -> bool {
        matches!(self, WidgetPhase::Active | WidgetPhase::AllLoaded)
    }
}

// =============================================================================
// Cell Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes applied to indicator lines.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const INVERSE = 1 << 5;
    }
}
