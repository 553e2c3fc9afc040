//! Feed demo - a host paging through 30 records, 10 at a time.
//!
//! Scrolls a simulated 12-row viewport down to the end, prints what the
//! sentinel shows on each step, then presses "try again".
//!
//! Run with: cargo run --example feed

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use spark_infinite_loading::prelude::*;
use spark_infinite_loading::WHEEL_SCROLL;

const TOTAL_RECORDS: usize = 30;
const PAGE_SIZE: usize = 10;
const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use a dedicated bus rather than the shared one
    let bus = EventBus::new();
    let viewport = Viewport::new(12.0, 1.0);
    let timers = TimerQueue::new();
    let rows = Rc::new(Cell::new(0usize));

    let load_page = {
        let bus = bus.clone();
        let viewport = viewport.clone();
        let rows = rows.clone();
        move |_: &Payload| {
            let loaded = (rows.get() + PAGE_SIZE).min(TOTAL_RECORDS);
            rows.set(loaded);
            viewport.set_content_height(loaded as f32 + 1.0);
            println!("  host: loaded records 1-{loaded}");
            bus.publish(if loaded < TOTAL_RECORDS {
                LoadSignal::LoadingFinished
            } else {
                LoadSignal::AllLoaded
            });
        }
    };
    let init_sub = bus.subscribe(LoadSignal::InitLoading, load_page.clone());
    let more_sub = bus.subscribe(LoadSignal::Loading, load_page);

    let measure = {
        let viewport = viewport.clone();
        move || Some(viewport.sentinel_rect(viewport.content_height()))
    };
    let widget = InfiniteLoading::new(
        InfiniteLoadingProps {
            delay: Duration::from_millis(120),
            class_name: Some("feed-loader".into()),
            emitter: Some(bus.clone()),
            ..Default::default()
        },
        viewport.clone(),
        timers.clone(),
        measure,
    )?;
    widget.start();

    for step in 0..40 {
        if step % 4 == 0 {
            viewport.scroll_by(WHEEL_SCROLL);
        }
        timers.advance(FRAME * 4);

        let view = widget.render();
        println!(
            "[{step:02}] offset {:>4.1}/{:<4.1} {:?} {}",
            viewport.offset(),
            viewport.max_offset(),
            widget.phase(),
            view.to_ansi()
        );
    }

    println!("try again");
    rows.set(0);
    viewport.set_content_height(1.0);
    viewport.scroll_to_top();
    bus.publish_with(
        LoadSignal::Reinitialize,
        Payload::with_completion(|| println!("  sentinel ready")),
    );
    timers.advance(Duration::from_millis(120));
    println!("records after reset: {}", rows.get());

    widget.stop();
    init_sub.remove();
    more_sub.remove();
    Ok(())
}
