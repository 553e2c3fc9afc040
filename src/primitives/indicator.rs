//! Loading indicator and the rendered sentinel view.
//!
//! The sentinel renders to a [`SentinelView`]: its classes, whether it is
//! visible, and the indicator lines for the current spinner frame. Hosts
//! either lay the lines out themselves or print [`SentinelView::to_ansi`].

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crossterm::style::{Attribute, ContentStyle};

use crate::types::Attr;

// =============================================================================
// Constants
// =============================================================================

/// Class every sentinel root carries.
pub const ROOT_CLASS: &str = "infinite-loading";

/// Label shown next to the built-in spinner.
pub const DEFAULT_LABEL: &str = "Loading...";

/// Built-in spinner frames.
pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Time each spinner frame stays on screen.
pub const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

// =============================================================================
// Indicator
// =============================================================================

/// Renders custom indicator lines for a spinner frame.
pub type IndicatorRenderer = Rc<dyn Fn(usize) -> Vec<String>>;

/// Content shown while a load is in flight.
#[derive(Clone, Default)]
pub enum Indicator {
    /// Animated spinner followed by [`DEFAULT_LABEL`].
    #[default]
    Spinner,
    /// Fixed text, one entry per line.
    Text(String),
    /// Caller-rendered lines, given the current frame number.
    Custom(IndicatorRenderer),
}

impl Indicator {
    /// Indicator rendered by a closure.
    pub fn custom<F>(render: F) -> Self
    where
        F: Fn(usize) -> Vec<String> + 'static,
    {
        Indicator::Custom(Rc::new(render))
    }

    /// Lines for the given animation frame.
    pub fn lines(&self, frame: usize) -> Vec<String> {
        match self {
            Indicator::Spinner => {
                let glyph = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()];
                vec![format!("{glyph} {DEFAULT_LABEL}")]
            }
            Indicator::Text(text) => text.lines().map(str::to_string).collect(),
            Indicator::Custom(render) => render(frame),
        }
    }

    /// Default text attributes.
    pub fn attrs(&self) -> Attr {
        match self {
            Indicator::Spinner => Attr::DIM,
            _ => Attr::NONE,
        }
    }
}

impl fmt::Debug for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indicator::Spinner => f.write_str("Spinner"),
            Indicator::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Indicator::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Spinner frame shown at a given clock time.
///
/// Saturates at `usize::MAX` instead of wrapping on very long clocks.
pub fn frame_at(now: Duration) -> usize {
    usize::try_from(now.as_millis() / SPINNER_INTERVAL.as_millis()).unwrap_or(usize::MAX)
}

// =============================================================================
// Sentinel View
// =============================================================================

/// Rendered state of a sentinel.
#[derive(Clone, Debug, PartialEq)]
pub struct SentinelView {
    /// Space separated classes: [`ROOT_CLASS`] plus the configured extra.
    pub class_name: String,
    /// False once loading is done (indicator hidden).
    pub visible: bool,
    pub lines: Vec<String>,
    pub attrs: Attr,
}

impl SentinelView {
    pub fn new(extra_class: Option<&str>, visible: bool, lines: Vec<String>, attrs: Attr) -> Self {
        let class_name = match extra_class {
            Some(extra) => format!("{ROOT_CLASS} {}", extra.trim()),
            None => ROOT_CLASS.to_string(),
        };
        Self {
            class_name,
            visible,
            lines,
            attrs,
        }
    }

    /// Whether the root carries a class.
    pub fn has_class(&self, class: &str) -> bool {
        self.class_name.split_whitespace().any(|c| c == class)
    }

    /// Rows taken on screen. Zero while hidden.
    pub fn height(&self) -> u16 {
        if self.visible {
            self.lines.len().min(u16::MAX as usize) as u16
        } else {
            0
        }
    }

    /// Lines joined with newlines and styled with the view's attributes.
    /// Empty while hidden.
    pub fn to_ansi(&self) -> String {
        if !self.visible {
            return String::new();
        }
        let style = content_style(self.attrs);
        self.lines
            .iter()
            .map(|line| style.apply(line.as_str()).to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn content_style(attrs: Attr) -> ContentStyle {
    let mut style = ContentStyle::new();
    let mapping = [
        (Attr::BOLD, Attribute::Bold),
        (Attr::DIM, Attribute::Dim),
        (Attr::ITALIC, Attribute::Italic),
        (Attr::UNDERLINE, Attribute::Underlined),
        (Attr::BLINK, Attribute::SlowBlink),
        (Attr::INVERSE, Attribute::Reverse),
    ];
    for (flag, attribute) in mapping {
        if attrs.contains(flag) {
            style.attributes.set(attribute);
        }
    }
    style
}
