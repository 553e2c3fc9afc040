//! Scroll Module - Viewport scroll state and scroll listeners
//!
//! Manages the scrolling viewport a sentinel lives in:
//! - Scroll offset with clamping to the content bounds
//! - Line, wheel and page scroll amounts
//! - Scroll listeners, notified synchronously whenever the offset moves
//!
//! Coordinates:
//! - Content space: rows from the top of the scrolled content
//! - Viewport space: rows from the top of the visible area (content - offset)

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::types::SentinelRect;

// =============================================================================
// SCROLL CONSTANTS
// =============================================================================

/// Default scroll amount for arrow keys (lines).
pub const LINE_SCROLL: f32 = 1.0;

/// Default scroll amount for mouse wheel.
pub const WHEEL_SCROLL: f32 = 3.0;

/// Default scroll amount for Page Up/Down (90% of viewport).
pub const PAGE_SCROLL_FACTOR: f32 = 0.9;

// =============================================================================
// TYPES
// =============================================================================

/// Delivered to scroll listeners after the offset changed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollEvent {
    /// Offset after the scroll.
    pub offset: f32,
    /// Signed change applied by this scroll (0 for a manual dispatch).
    pub delta: f32,
}

/// Scroll listener callback.
pub type ScrollHandler = Rc<dyn Fn(&ScrollEvent)>;

struct ViewportState {
    height: f32,
    content_height: f32,
    offset: f32,
    listeners: Vec<(usize, ScrollHandler)>,
    next_id: usize,
}

impl ViewportState {
    fn max_offset(&self) -> f32 {
        (self.content_height - self.height).max(0.0)
    }

    fn clamp(&self, offset: f32) -> f32 {
        offset.clamp(0.0, self.max_offset())
    }
}

// =============================================================================
// VIEWPORT
// =============================================================================

/// A vertically scrolling viewport.
///
/// Cloning yields another handle to the same viewport.
#[derive(Clone)]
pub struct Viewport {
    state: Rc<RefCell<ViewportState>>,
}

impl Viewport {
    /// Create a viewport showing `height` rows of `content_height` rows.
    pub fn new(height: f32, content_height: f32) -> Self {
        Self {
            state: Rc::new(RefCell::new(ViewportState {
                height: height.max(0.0),
                content_height: content_height.max(0.0),
                offset: 0.0,
                listeners: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Visible height.
    pub fn height(&self) -> f32 {
        self.state.borrow().height
    }

    /// Resize the visible area. The offset is re-clamped, listeners are not
    /// notified.
    pub fn set_height(&self, height: f32) {
        let mut state = self.state.borrow_mut();
        state.height = height.max(0.0);
        state.offset = state.clamp(state.offset);
    }

    /// Total height of the scrolled content.
    pub fn content_height(&self) -> f32 {
        self.state.borrow().content_height
    }

    /// Grow or shrink the content (e.g. after a page was appended).
    /// The offset is re-clamped, listeners are not notified.
    pub fn set_content_height(&self, content_height: f32) {
        let mut state = self.state.borrow_mut();
        state.content_height = content_height.max(0.0);
        state.offset = state.clamp(state.offset);
    }

    /// Current scroll offset.
    pub fn offset(&self) -> f32 {
        self.state.borrow().offset
    }

    /// Largest valid offset.
    pub fn max_offset(&self) -> f32 {
        self.state.borrow().max_offset()
    }

    /// Project a bottom edge given in content space into the viewport.
    pub fn sentinel_rect(&self, content_bottom: f32) -> SentinelRect {
        let state = self.state.borrow();
        SentinelRect::new(content_bottom - state.offset, state.height)
    }

    // =========================================================================
    // SCROLL OPERATIONS
    // =========================================================================

    /// Scroll by a delta amount.
    ///
    /// Returns `true` if scrolling occurred, `false` if already at boundary.
    /// Listeners are only notified when the offset moved.
    pub fn scroll_by(&self, delta: f32) -> bool {
        let current = self.offset();
        self.scroll_to(current + delta)
    }

    /// Scroll to an absolute offset (clamped to valid range).
    pub fn scroll_to(&self, offset: f32) -> bool {
        let (moved, event) = {
            let mut state = self.state.borrow_mut();
            let current = state.offset;
            let next = state.clamp(offset);
            state.offset = next;
            (
                next != current,
                ScrollEvent {
                    offset: next,
                    delta: next - current,
                },
            )
        };

        if moved {
            self.notify(&event);
        }
        moved
    }

    /// Scroll to top.
    pub fn scroll_to_top(&self) -> bool {
        self.scroll_to(0.0)
    }

    /// Scroll to bottom.
    pub fn scroll_to_bottom(&self) -> bool {
        let max = self.max_offset();
        self.scroll_to(max)
    }

    /// Scroll one page (90% of the viewport) down or up.
    pub fn scroll_page(&self, down: bool) -> bool {
        let page = (self.height() * PAGE_SCROLL_FACTOR).max(LINE_SCROLL);
        self.scroll_by(if down { page } else { -page })
    }

    /// Notify listeners of the current position without moving.
    pub fn dispatch_scroll(&self) {
        let event = ScrollEvent {
            offset: self.offset(),
            delta: 0.0,
        };
        self.notify(&event);
    }

    // =========================================================================
    // LISTENERS
    // =========================================================================

    /// Register a scroll listener.
    pub fn add_scroll_listener<F>(&self, handler: F) -> ScrollListener
    where
        F: Fn(&ScrollEvent) + 'static,
    {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.listeners.push((id, Rc::new(handler)));
            id
        };

        ScrollListener {
            viewport: Rc::downgrade(&self.state),
            id,
            active: Cell::new(true),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    fn notify(&self, event: &ScrollEvent) {
        let snapshot: Vec<(usize, ScrollHandler)> = self.state.borrow().listeners.clone();

        for (id, handler) in snapshot {
            // A listener detached by an earlier one must not run
            let registered = self
                .state
                .borrow()
                .listeners
                .iter()
                .any(|(listener_id, _)| *listener_id == id);
            if registered {
                handler(event);
            }
        }
    }
}

impl fmt::Debug for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Viewport")
            .field("height", &state.height)
            .field("content_height", &state.content_height)
            .field("offset", &state.offset)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

/// Registration of a scroll listener on a [`Viewport`].
///
/// Dropping the value does not detach the listener.
pub struct ScrollListener {
    viewport: Weak<RefCell<ViewportState>>,
    id: usize,
    active: Cell<bool>,
}

impl ScrollListener {
    /// Detach the listener. Safe to call more than once.
    pub fn remove(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(state) = self.viewport.upgrade() {
            state
                .borrow_mut()
                .listeners
                .retain(|(listener_id, _)| *listener_id != self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get() && self.viewport.upgrade().is_some()
    }
}

impl fmt::Debug for ScrollListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollListener")
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}
