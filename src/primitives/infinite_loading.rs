//! Infinite Loading - Scroll sentinel that asks the host for more data.
//!
//! The sentinel sits below the last item of a scrolling list. Whenever the
//! viewport scrolls it measures itself; once its bottom edge is at least
//! `offset` rows above the viewport's bottom it publishes
//! [`LoadSignal::Loading`] (after `delay`) and stays quiet until the host
//! publishes [`LoadSignal::LoadingFinished`] or [`LoadSignal::AllLoaded`].
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --start--> Active --AllLoaded--> AllLoaded
//!                            ^  \                  |
//!                            |   +-----stop-----+  | Reinitialize
//!                            +------Reinitialize---+
//!                                               v
//!                                           Unmounted
//! ```
//!
//! Every (re)initialization installs a fresh generation: runtime flags,
//! the scroll listener, the LoadingFinished/AllLoaded subscriptions and at
//! most one pending timer. Teardown removes all of them synchronously.
//!
//! # Example
//!
//! ```ignore
//! use spark_infinite_loading::prelude::*;
//!
//! let bus = EventBus::new();
//! let viewport = Viewport::new(24.0, 0.0);
//! let timers = TimerQueue::new();
//!
//! let measure = {
//!     let viewport = viewport.clone();
//!     move || Some(viewport.sentinel_rect(viewport.content_height()))
//! };
//!
//! let widget = InfiniteLoading::new(
//!     InfiniteLoadingProps { emitter: Some(bus.clone()), ..Default::default() },
//!     viewport.clone(),
//!     timers.clone(),
//!     measure,
//! )?;
//! widget.start();
//!
//! // event loop: viewport.scroll_by(..), timers.advance(frame_time), widget.render()
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use spark_signals::{signal, Signal};

use crate::error::PropsError;
use crate::state::{EventBus, Payload, ScrollListener, Subscription, TimerHandle, TimerQueue, Viewport};
use crate::types::{LoadSignal, Measure, WidgetPhase};
use super::indicator::{frame_at, Indicator, SentinelView};
use super::types::{Cleanup, InfiniteLoadingProps};

// =============================================================================
// Runtime State
// =============================================================================

/// Per-generation flags, recreated on every initialization.
#[derive(Clone, Copy, Debug, Default)]
struct RuntimeState {
    loading: bool,
    all_loaded: bool,
    offset: f32,
    delay: Duration,
    viewport_height: f32,
}

/// Resources owned by the current generation.
#[derive(Default)]
struct Hooks {
    scroll: Option<ScrollListener>,
    timer: Option<TimerHandle>,
    loading_finished: Option<Subscription>,
    all_loaded: Option<Subscription>,
}

impl Hooks {
    fn release(self, timers: &TimerQueue) {
        if let Some(listener) = self.scroll {
            listener.remove();
        }
        if let Some(handle) = self.timer {
            timers.clear_timeout(handle);
        }
        if let Some(sub) = self.loading_finished {
            sub.remove();
        }
        if let Some(sub) = self.all_loaded {
            sub.remove();
        }
    }
}

#[derive(Default)]
struct Lifecycle {
    phase: WidgetPhase,
    generation: u64,
    runtime: RuntimeState,
    hooks: Hooks,
    /// Lives from start to stop, across generations.
    reinitialize: Option<Subscription>,
}

struct Inner {
    props: InfiniteLoadingProps,
    indicator: Indicator,
    bus: EventBus,
    viewport: Viewport,
    timers: TimerQueue,
    measure: Box<dyn Measure>,
    loading_done: Signal<bool>,
    state: RefCell<Lifecycle>,
}

// =============================================================================
// Infinite Loading
// =============================================================================

/// Controller of a scroll sentinel.
///
/// Cloning yields another handle to the same sentinel. Dropping the last
/// handle tears it down.
#[derive(Clone)]
pub struct InfiniteLoading {
    inner: Rc<Inner>,
}

impl InfiniteLoading {
    /// Build a sentinel. Nothing is subscribed until [`start`](Self::start).
    pub fn new<M>(
        props: InfiniteLoadingProps,
        viewport: Viewport,
        timers: TimerQueue,
        measure: M,
    ) -> Result<Self, PropsError>
    where
        M: Measure + 'static,
    {
        props.validate()?;

        let bus = props.bus();
        let indicator = props.indicator();
        Ok(Self {
            inner: Rc::new(Inner {
                props,
                indicator,
                bus,
                viewport,
                timers,
                measure: Box::new(measure),
                loading_done: signal(false),
                state: RefCell::new(Lifecycle::default()),
            }),
        })
    }

    /// Mount: initialize a generation and listen for reinitialize requests.
    ///
    /// No-op while already mounted. Starting after [`stop`](Self::stop)
    /// mounts again from scratch.
    ///
    /// With `initial_load` set, `INIT_LOADING` is scheduled on the
    /// [`TimerQueue`], not published here. Even with a zero `delay` the host
    /// must call [`TimerQueue::run_due`] or [`TimerQueue::advance`] to get
    /// the first page.
    pub fn start(&self) {
        if self.phase().is_mounted() {
            log::debug!("infinite loading already started");
            return;
        }

        Inner::initialize(&self.inner);

        let weak = Rc::downgrade(&self.inner);
        let sub = self.inner.bus.subscribe(LoadSignal::Reinitialize, move |payload| {
            if let Some(inner) = weak.upgrade() {
                Inner::reinitialize(&inner, payload);
            }
        });
        self.inner.state.borrow_mut().reinitialize = Some(sub);
    }

    /// Unmount: detach from scroll, cancel the pending timer and drop every
    /// subscription. Safe to call more than once.
    pub fn stop(&self) {
        self.inner.teardown();

        let sub = {
            let mut state = self.inner.state.borrow_mut();
            if state.phase != WidgetPhase::Uninitialized {
                state.phase = WidgetPhase::Unmounted;
            }
            state.reinitialize.take()
        };
        if let Some(sub) = sub {
            sub.remove();
        }
    }

    /// Sample the sentinel as if the viewport had scrolled.
    ///
    /// The attached scroll listener calls this on every scroll event.
    pub fn handle_scroll(&self) {
        Inner::on_scroll(&self.inner);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn phase(&self) -> WidgetPhase {
        self.inner.state.borrow().phase
    }

    /// Increments on every (re)initialization.
    pub fn generation(&self) -> u64 {
        self.inner.state.borrow().generation
    }

    /// A trigger is armed or published and not yet acknowledged.
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().runtime.loading
    }

    pub fn is_all_loaded(&self) -> bool {
        self.inner.state.borrow().runtime.all_loaded
    }

    /// Whether a delayed trigger is waiting on the timer queue.
    pub fn has_pending_trigger(&self) -> bool {
        self.inner.state.borrow().hooks.timer.is_some()
    }

    pub fn offset(&self) -> f32 {
        self.inner.state.borrow().runtime.offset
    }

    pub fn delay(&self) -> Duration {
        self.inner.state.borrow().runtime.delay
    }

    /// Viewport height captured at initialization, refreshed by each sample.
    pub fn viewport_height(&self) -> f32 {
        self.inner.state.borrow().runtime.viewport_height
    }

    /// True while the indicator is hidden.
    pub fn loading_done(&self) -> bool {
        self.inner.loading_done.get()
    }

    /// Reactive indicator-hidden flag, for effects that redraw the sentinel.
    pub fn loading_done_signal(&self) -> Signal<bool> {
        self.inner.loading_done.clone()
    }

    pub fn bus(&self) -> EventBus {
        self.inner.bus.clone()
    }

    pub fn props(&self) -> &InfiniteLoadingProps {
        &self.inner.props
    }

    /// Render the sentinel for the current clock time.
    pub fn render(&self) -> SentinelView {
        let frame = frame_at(self.inner.timers.now());
        SentinelView::new(
            self.inner.props.class_name.as_deref(),
            !self.inner.loading_done.get(),
            self.inner.indicator.lines(frame),
            self.inner.indicator.attrs(),
        )
    }
}

impl fmt::Debug for InfiniteLoading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("InfiniteLoading")
            .field("phase", &state.phase)
            .field("generation", &state.generation)
            .field("runtime", &state.runtime)
            .field("pending_trigger", &state.hooks.timer.is_some())
            .finish()
    }
}

// =============================================================================
// State Machine
// =============================================================================

impl Inner {
    fn initialize(this: &Rc<Inner>) {
        let weak = Rc::downgrade(this);

        let loading_finished = this.bus.subscribe(LoadSignal::LoadingFinished, {
            let weak = weak.clone();
            move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_loading_finished();
                }
            }
        });

        let all_loaded = this.bus.subscribe(LoadSignal::AllLoaded, {
            let weak = weak.clone();
            move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_all_loaded();
                }
            }
        });

        let scroll = this.viewport.add_scroll_listener(move |_| {
            if let Some(inner) = weak.upgrade() {
                Inner::on_scroll(&inner);
            }
        });

        let generation = {
            let mut state = this.state.borrow_mut();
            state.phase = WidgetPhase::Active;
            state.generation += 1;
            state.runtime = RuntimeState {
                loading: false,
                all_loaded: false,
                offset: this.props.offset,
                delay: this.props.delay,
                viewport_height: this.viewport.height(),
            };
            state.hooks = Hooks {
                scroll: Some(scroll),
                timer: None,
                loading_finished: Some(loading_finished),
                all_loaded: Some(all_loaded),
            };
            state.generation
        };
        log::debug!("infinite loading initialized (generation {generation})");

        if this.props.initial_load {
            Inner::arm(this, LoadSignal::InitLoading);
        }
    }

    /// Schedule `signal` after the configured delay.
    fn arm(this: &Rc<Inner>, signal: LoadSignal) {
        let delay = this.state.borrow().runtime.delay;
        let weak = Rc::downgrade(this);
        let handle = this.timers.set_timeout(delay, move || {
            if let Some(inner) = weak.upgrade() {
                inner.fire(signal);
            }
        });
        this.state.borrow_mut().hooks.timer = Some(handle);
    }

    fn fire(&self, signal: LoadSignal) {
        {
            let mut state = self.state.borrow_mut();
            state.hooks.timer = None;
            if state.phase != WidgetPhase::Active {
                return;
            }
        }

        log::debug!("emitting {signal}");
        self.loading_done.set(false);
        self.bus.publish(signal);
    }

    fn on_scroll(this: &Rc<Inner>) {
        let offset = {
            let state = this.state.borrow();
            let runtime = &state.runtime;
            if state.phase != WidgetPhase::Active
                || runtime.loading
                || runtime.all_loaded
                || state.hooks.timer.is_some()
            {
                return;
            }
            runtime.offset
        };

        let Some(rect) = this.measure.measure() else {
            log::warn!("scroll ignored: sentinel is not mounted");
            return;
        };

        {
            let mut state = this.state.borrow_mut();
            state.runtime.viewport_height = rect.viewport_height;
            if rect.distance_to_viewport_bottom() < offset {
                return;
            }
            state.runtime.loading = true;
        }
        Inner::arm(this, LoadSignal::Loading);
    }

    fn on_loading_finished(&self) {
        self.state.borrow_mut().runtime.loading = false;
        log::debug!("current loading done");
    }

    fn on_all_loaded(&self) {
        let (scroll, timer) = {
            let mut state = self.state.borrow_mut();
            state.runtime.all_loaded = true;
            state.runtime.loading = false;
            if state.phase == WidgetPhase::Active {
                state.phase = WidgetPhase::AllLoaded;
            }
            (state.hooks.scroll.take(), state.hooks.timer.take())
        };

        if let Some(listener) = scroll {
            listener.remove();
        }
        if let Some(handle) = timer {
            self.timers.clear_timeout(handle);
        }
        self.loading_done.set(true);
        log::debug!("all loaded");
    }

    fn reinitialize(this: &Rc<Inner>, payload: &Payload) {
        log::debug!("reinitializing infinite loading");
        this.loading_done.set(true);
        this.teardown();
        Inner::initialize(this);
        payload.complete();
    }

    /// Release the current generation's listener, timer and subscriptions.
    fn teardown(&self) {
        let hooks = {
            let mut state = self.state.borrow_mut();
            state.runtime.loading = false;
            std::mem::take(&mut state.hooks)
        };
        hooks.release(&self.timers);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        std::mem::take(&mut state.hooks).release(&self.timers);
        if let Some(sub) = state.reinitialize.take() {
            sub.remove();
        }
    }
}

// =============================================================================
// Component Function
// =============================================================================

/// Create and start a sentinel.
///
/// Returns a cleanup function that stops it.
pub fn infinite_loading<M>(
    props: InfiniteLoadingProps,
    viewport: Viewport,
    timers: TimerQueue,
    measure: M,
) -> Result<Cleanup, PropsError>
where
    M: Measure + 'static,
{
    let widget = InfiniteLoading::new(props, viewport, timers, measure)?;
    widget.start();
    Ok(Box::new(move || widget.stop()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::types::SentinelRect;

    const VIEWPORT_HEIGHT: f32 = 800.0;

    /// Sentinel, bus and a host that records every trigger.
    struct Harness {
        bus: EventBus,
        viewport: Viewport,
        timers: TimerQueue,
        bottom: Rc<Cell<Option<f32>>>,
        published: Rc<RefCell<Vec<LoadSignal>>>,
        widget: InfiniteLoading,
        _host: Vec<Subscription>,
    }

    impl Harness {
        fn new(props: InfiniteLoadingProps) -> Self {
            let bus = EventBus::new();
            let viewport = Viewport::new(VIEWPORT_HEIGHT, 4000.0);
            let timers = TimerQueue::new();
            // Sentinel starts well below the fold
            let bottom = Rc::new(Cell::new(Some(2000.0)));

            let published = Rc::new(RefCell::new(Vec::new()));
            let host: Vec<Subscription> = [LoadSignal::InitLoading, LoadSignal::Loading]
                .into_iter()
                .map(|signal| {
                    let published = published.clone();
                    bus.subscribe(signal, move |_| published.borrow_mut().push(signal))
                })
                .collect();

            let measure = {
                let bottom = bottom.clone();
                move || bottom.get().map(|b| SentinelRect::new(b, VIEWPORT_HEIGHT))
            };

            let widget = InfiniteLoading::new(
                InfiniteLoadingProps {
                    emitter: Some(bus.clone()),
                    ..props
                },
                viewport.clone(),
                timers.clone(),
                measure,
            )
            .unwrap();

            Self {
                bus,
                viewport,
                timers,
                bottom,
                published,
                widget,
                _host: host,
            }
        }

        /// Place the sentinel and deliver one scroll event.
        fn scroll_with_bottom(&self, bottom: f32) {
            self.bottom.set(Some(bottom));
            self.viewport.dispatch_scroll();
        }

        fn published(&self) -> Vec<LoadSignal> {
            self.published.borrow().clone()
        }

        fn count(&self, signal: LoadSignal) -> usize {
            self.published.borrow().iter().filter(|s| **s == signal).count()
        }
    }

    fn no_initial_load() -> InfiniteLoadingProps {
        InfiniteLoadingProps {
            initial_load: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_load_fires_once() {
        let h = Harness::new(InfiniteLoadingProps::default());
        h.widget.start();
        assert_eq!(h.widget.phase(), WidgetPhase::Active);
        assert!(h.published().is_empty()); // Deferred to the timer queue

        h.timers.run_due();
        assert_eq!(h.published(), vec![LoadSignal::InitLoading]);

        h.timers.advance(Duration::from_secs(5));
        assert_eq!(h.count(LoadSignal::InitLoading), 1);
        assert!(!h.widget.loading_done());
    }

    #[test]
    fn test_initial_load_waits_for_delay() {
        let h = Harness::new(InfiniteLoadingProps {
            delay: Duration::from_millis(100),
            ..Default::default()
        });
        h.widget.start();

        h.timers.advance(Duration::from_millis(99));
        assert!(h.published().is_empty());

        h.timers.advance(Duration::from_millis(1));
        assert_eq!(h.published(), vec![LoadSignal::InitLoading]);
    }

    #[test]
    fn test_initial_load_disabled() {
        let h = Harness::new(no_initial_load());
        h.widget.start();
        h.timers.advance(Duration::from_secs(1));
        assert!(h.published().is_empty());
        assert!(!h.widget.has_pending_trigger());
    }

    #[test]
    fn test_threshold() {
        // 800 - 500 = 300 rows of room
        let far = Harness::new(InfiniteLoadingProps {
            offset: 400.0,
            ..no_initial_load()
        });
        far.widget.start();
        far.scroll_with_bottom(500.0);
        far.timers.run_due();
        assert!(far.published().is_empty());
        assert!(!far.widget.is_loading());

        let near = Harness::new(InfiniteLoadingProps {
            offset: 200.0,
            ..no_initial_load()
        });
        near.widget.start();
        near.scroll_with_bottom(500.0);
        assert!(near.widget.is_loading());
        near.timers.run_due();
        assert_eq!(near.published(), vec![LoadSignal::Loading]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let h = Harness::new(InfiniteLoadingProps {
            offset: 300.0,
            ..no_initial_load()
        });
        h.widget.start();
        h.scroll_with_bottom(500.0);
        h.timers.run_due();
        assert_eq!(h.published(), vec![LoadSignal::Loading]);
    }

    #[test]
    fn test_below_fold_does_not_trigger() {
        let h = Harness::new(no_initial_load());
        h.widget.start();
        h.scroll_with_bottom(801.0);
        h.timers.run_due();
        assert!(h.published().is_empty());

        h.scroll_with_bottom(800.0);
        h.timers.run_due();
        assert_eq!(h.published(), vec![LoadSignal::Loading]);
    }

    #[test]
    fn test_loading_guard_until_finished() {
        let h = Harness::new(no_initial_load());
        h.widget.start();

        h.scroll_with_bottom(700.0);
        h.timers.run_due();
        for _ in 0..10 {
            h.scroll_with_bottom(600.0);
            h.timers.run_due();
        }
        assert_eq!(h.count(LoadSignal::Loading), 1);

        h.bus.publish(LoadSignal::LoadingFinished);
        assert!(!h.widget.is_loading());

        h.scroll_with_bottom(600.0);
        h.timers.run_due();
        assert_eq!(h.count(LoadSignal::Loading), 2);
    }

    #[test]
    fn test_debounce_arms_single_timer() {
        let h = Harness::new(InfiniteLoadingProps {
            delay: Duration::from_millis(50),
            ..no_initial_load()
        });
        h.widget.start();

        h.scroll_with_bottom(700.0);
        h.timers.advance(Duration::from_millis(20));
        h.scroll_with_bottom(650.0);
        h.scroll_with_bottom(600.0);
        assert_eq!(h.timers.pending(), 1);
        assert!(h.published().is_empty());

        h.timers.advance(Duration::from_millis(30));
        assert_eq!(h.published(), vec![LoadSignal::Loading]);
        assert!(!h.widget.has_pending_trigger());
    }

    #[test]
    fn test_scroll_ignored_while_initial_load_pending() {
        let h = Harness::new(InfiniteLoadingProps {
            delay: Duration::from_millis(100),
            ..Default::default()
        });
        h.widget.start();

        h.scroll_with_bottom(100.0);
        assert_eq!(h.timers.pending(), 1);
        assert!(!h.widget.is_loading());

        h.timers.advance(Duration::from_millis(100));
        assert_eq!(h.published(), vec![LoadSignal::InitLoading]);
    }

    #[test]
    fn test_all_loaded_stops_triggering() {
        let h = Harness::new(no_initial_load());
        h.widget.start();
        h.timers.run_due();

        h.bus.publish(LoadSignal::AllLoaded);
        assert_eq!(h.widget.phase(), WidgetPhase::AllLoaded);
        assert!(h.widget.is_all_loaded());
        assert!(h.widget.loading_done());
        assert!(!h.widget.render().visible);
        assert_eq!(h.viewport.listener_count(), 0);

        for _ in 0..5 {
            h.scroll_with_bottom(0.0);
            h.widget.handle_scroll();
        }
        h.timers.advance(Duration::from_secs(1));
        assert!(h.published().is_empty());
    }

    #[test]
    fn test_all_loaded_cancels_pending_trigger() {
        let h = Harness::new(InfiniteLoadingProps {
            delay: Duration::from_millis(100),
            ..no_initial_load()
        });
        h.widget.start();
        h.scroll_with_bottom(100.0);
        assert!(h.widget.has_pending_trigger());

        h.bus.publish(LoadSignal::AllLoaded);
        h.timers.advance(Duration::from_secs(1));
        assert!(h.published().is_empty());
        assert_eq!(h.timers.pending(), 0);
    }

    #[test]
    fn test_all_loaded_cancels_initial_load() {
        let h = Harness::new(InfiniteLoadingProps {
            delay: Duration::from_millis(100),
            ..Default::default()
        });
        h.widget.start();
        assert!(h.widget.has_pending_trigger());

        h.bus.publish(LoadSignal::AllLoaded);
        h.timers.advance(Duration::from_secs(1));
        assert!(h.published().is_empty());
        assert_eq!(h.timers.pending(), 0);
        assert_eq!(h.widget.phase(), WidgetPhase::AllLoaded);
    }

    #[test]
    fn test_reinitialize_after_all_loaded() {
        let h = Harness::new(no_initial_load());
        h.widget.start();
        let first_generation = h.widget.generation();
        h.bus.publish(LoadSignal::AllLoaded);

        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let published = h.published.clone();
        let widget = h.widget.clone();
        h.bus.publish_with(
            LoadSignal::Reinitialize,
            Payload::with_completion(move || {
                calls_clone.set(calls_clone.get() + 1);
                // Ready before anything was triggered
                assert!(published.borrow().is_empty());
                assert_eq!(widget.phase(), WidgetPhase::Active);
            }),
        );

        assert_eq!(calls.get(), 1);
        assert_eq!(h.widget.generation(), first_generation + 1);
        assert!(!h.widget.is_loading());
        assert!(!h.widget.is_all_loaded());
        assert_eq!(h.viewport.listener_count(), 1);
        assert_eq!(h.bus.subscriber_count(LoadSignal::LoadingFinished), 1);
        assert_eq!(h.bus.subscriber_count(LoadSignal::AllLoaded), 1);

        h.scroll_with_bottom(100.0);
        h.timers.run_due();
        assert_eq!(h.published(), vec![LoadSignal::Loading]);
    }

    #[test]
    fn test_reinitialize_resets_loading() {
        let h = Harness::new(InfiniteLoadingProps {
            delay: Duration::from_millis(100),
            ..no_initial_load()
        });
        h.widget.start();
        h.scroll_with_bottom(100.0);
        assert!(h.widget.is_loading());

        h.bus.publish(LoadSignal::Reinitialize);
        assert!(!h.widget.is_loading());
        assert!(!h.widget.has_pending_trigger());
        // Hidden until the next trigger fires
        assert!(h.widget.loading_done());

        // The stale timer was cancelled, not ignored
        assert_eq!(h.timers.pending(), 0);
        h.timers.advance(Duration::from_secs(1));
        assert!(h.published().is_empty());
    }

    #[test]
    fn test_reinitialize_runs_initial_load_again() {
        let h = Harness::new(InfiniteLoadingProps::default());
        h.widget.start();
        h.timers.run_due();
        h.bus.publish(LoadSignal::AllLoaded);

        h.bus.publish(LoadSignal::Reinitialize);
        h.timers.run_due();
        assert_eq!(
            h.published(),
            vec![LoadSignal::InitLoading, LoadSignal::InitLoading]
        );
        assert!(!h.widget.loading_done());
    }

    #[test]
    fn test_stop_releases_everything() {
        let h = Harness::new(InfiniteLoadingProps {
            delay: Duration::from_millis(100),
            ..Default::default()
        });
        h.widget.start();
        assert_eq!(h.timers.pending(), 1);

        h.widget.stop();
        h.widget.stop(); // Idempotent
        assert_eq!(h.widget.phase(), WidgetPhase::Unmounted);
        assert_eq!(h.timers.pending(), 0);
        assert_eq!(h.viewport.listener_count(), 0);
        for signal in [
            LoadSignal::LoadingFinished,
            LoadSignal::AllLoaded,
            LoadSignal::Reinitialize,
        ] {
            assert_eq!(h.bus.subscriber_count(signal), 0);
        }

        h.scroll_with_bottom(0.0);
        h.bus.publish(LoadSignal::Reinitialize);
        h.timers.advance(Duration::from_secs(1));
        assert!(h.published().is_empty());
    }

    #[test]
    fn test_stop_before_start() {
        let h = Harness::new(InfiniteLoadingProps::default());
        h.widget.stop();
        assert_eq!(h.widget.phase(), WidgetPhase::Uninitialized);
    }

    #[test]
    fn test_restart_after_stop() {
        let h = Harness::new(no_initial_load());
        h.widget.start();
        h.widget.stop();
        h.widget.start();

        assert_eq!(h.widget.phase(), WidgetPhase::Active);
        assert_eq!(h.widget.generation(), 2);
        h.scroll_with_bottom(0.0);
        h.timers.run_due();
        assert_eq!(h.published(), vec![LoadSignal::Loading]);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let h = Harness::new(no_initial_load());
        h.widget.start();
        h.widget.start();
        assert_eq!(h.widget.generation(), 1);
        assert_eq!(h.bus.subscriber_count(LoadSignal::Reinitialize), 1);
        assert_eq!(h.viewport.listener_count(), 1);
    }

    #[test]
    fn test_missing_sentinel_is_noop() {
        let h = Harness::new(no_initial_load());
        h.widget.start();
        h.bottom.set(None);
        h.viewport.dispatch_scroll();
        h.timers.run_due();
        assert!(h.published().is_empty());
        assert!(!h.widget.is_loading());
    }

    #[test]
    fn test_drop_releases_subscriptions() {
        let h = Harness::new(InfiniteLoadingProps {
            delay: Duration::from_millis(10),
            ..Default::default()
        });
        h.widget.start();

        let Harness {
            bus,
            viewport,
            timers,
            widget,
            ..
        } = h;
        drop(widget);

        assert_eq!(bus.subscriber_count(LoadSignal::Reinitialize), 0);
        assert_eq!(bus.subscriber_count(LoadSignal::LoadingFinished), 0);
        assert_eq!(viewport.listener_count(), 0);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_shared_bus_fallback() {
        let viewport = Viewport::new(10.0, 10.0);
        let timers = TimerQueue::new();
        let widget = InfiniteLoading::new(
            InfiniteLoadingProps::default(),
            viewport,
            timers.clone(),
            || Some(SentinelRect::new(10.0, 10.0)),
        )
        .unwrap();
        assert!(widget.bus().ptr_eq(&EventBus::shared()));

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let sub = EventBus::shared().subscribe(LoadSignal::InitLoading, move |_| {
            count_clone.set(count_clone.get() + 1);
        });

        widget.start();
        timers.run_due();
        assert_eq!(count.get(), 1);

        widget.stop();
        sub.remove();
    }

    #[test]
    fn test_invalid_props_rejected() {
        let result = InfiniteLoading::new(
            InfiniteLoadingProps {
                offset: f32::INFINITY,
                ..Default::default()
            },
            Viewport::new(10.0, 10.0),
            TimerQueue::new(),
            || -> Option<SentinelRect> { None },
        );
        assert!(matches!(result, Err(PropsError::NonFiniteOffset(_))));
    }

    #[test]
    fn test_render_follows_indicator_visibility() {
        let h = Harness::new(InfiniteLoadingProps {
            class_name: Some("feed".into()),
            loading_indicator: Some(Indicator::Text("More...".into())),
            ..Default::default()
        });
        h.widget.start();
        h.timers.run_due();

        let view = h.widget.render();
        assert!(view.visible);
        assert!(view.has_class("infinite-loading"));
        assert!(view.has_class("feed"));
        assert_eq!(view.lines, vec!["More..."]);

        h.bus.publish(LoadSignal::AllLoaded);
        assert_eq!(h.widget.render().height(), 0);
    }

    #[test]
    fn test_viewport_height_captured() {
        let h = Harness::new(no_initial_load());
        h.widget.start();
        assert_eq!(h.widget.viewport_height(), VIEWPORT_HEIGHT);
        assert_eq!(h.widget.offset(), 0.0);
        assert_eq!(h.widget.delay(), Duration::ZERO);
    }

    #[test]
    fn test_component_cleanup() {
        let bus = EventBus::new();
        let viewport = Viewport::new(10.0, 10.0);
        let cleanup = infinite_loading(
            InfiniteLoadingProps {
                emitter: Some(bus.clone()),
                ..Default::default()
            },
            viewport.clone(),
            TimerQueue::new(),
            || -> Option<SentinelRect> { None },
        )
        .unwrap();
        assert_eq!(viewport.listener_count(), 1);
        assert_eq!(bus.subscriber_count(LoadSignal::Reinitialize), 1);

        cleanup();
        assert_eq!(viewport.listener_count(), 0);
        assert_eq!(bus.subscriber_count(LoadSignal::Reinitialize), 0);
    }
}
