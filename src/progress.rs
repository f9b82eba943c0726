use reel_library::BusyState;
use std::sync::Arc;
use std::time::Duration;

/// How often the busy indicator would be redrawn.
const FRAME: Duration = Duration::from_millis(120);
/// Frames between "still working" log lines.
const FRAMES_PER_REPORT: u64 = 50;

/// Advance the busy gauge's cycle once per frame for as long as anything is
/// busy, and sleep on the gauge's change feed otherwise. Runs until aborted.
pub async fn tick(busy: Arc<BusyState>) {
    let mut changes = busy.subscribe();
    let mut frames = tokio::time::interval(FRAME);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        if !busy.is_busy() {
            if changes.changed().await.is_err() {
                return;
            }
            continue;
        }
        frames.tick().await;
        let cycle = busy.next_cycle();
        if cycle % FRAMES_PER_REPORT == 0 {
            tracing::debug!(operations = busy.count(), cycle, "Still working");
        }
    }
}
