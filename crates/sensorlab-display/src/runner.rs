//! Display tick loop
//!
//! Drives [`LiveDisplay::tick`] from a tokio interval. The display is shared
//! with the rest of the single-threaded shell, so the loop is meant to run on
//! a current-thread runtime and is never spawned onto a worker pool.

use crate::display::LiveDisplay;
use sensorlab_core::{DisplayError, Shared};
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

fn ticker(period: Duration) -> Result<Interval, DisplayError> {
    if period.is_zero() {
        return Err(DisplayError::InvalidInterval { interval_ms: 0 });
    }
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Ok(ticker)
}

/// Tick `display` at its refresh interval until `shutdown` completes.
///
/// `on_tick` runs after every tick with the display borrowed; it must not
/// borrow the display again. An interval change restarts the ticker at once,
/// so the next tick comes one new period after the change. Returns the number
/// of ticks run.
pub async fn run_display<F>(
    display: Shared<LiveDisplay>,
    shutdown: impl Future<Output = ()>,
    mut on_tick: F,
) -> Result<u64, DisplayError>
where
    F: FnMut(&LiveDisplay),
{
    tokio::pin!(shutdown);

    let interval_changed = display.borrow().interval_changed();
    let mut period = display.borrow().interval();
    let mut interval = ticker(period)?;
    let mut ticks = 0u64;
    info!(interval_ms = period.as_millis() as u64, "Display loop started");

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval_changed.notified() => {
                let current = display.borrow().interval();
                if current != period {
                    debug!(
                        "Display loop interval {}ms -> {}ms",
                        period.as_millis(),
                        current.as_millis()
                    );
                    period = current;
                    interval = ticker(period)?;
                }
            }
            _ = interval.tick() => {
                let mut display = display.borrow_mut();
                display.tick();
                on_tick(&display);
                ticks += 1;
            }
        }
    }

    info!(ticks, "Display loop stopped");
    Ok(ticks)
}
