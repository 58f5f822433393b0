use std::time::Duration;

pub const TICK: Duration = Duration::from_millis(1);
// Second frame of a send twice command must arrive within this time
pub const SEND_TWICE_WINDOW: Duration = Duration::from_millis(100);
// Minimum time between the end of a forward frame and a backward frame
pub const FORWARD_BACKWARD_DELAY: Duration = Duration::from_millis(3);
pub const BACKWARD_FRAME_DURATION: Duration = Duration::from_millis(10);
pub const BUS_FAILURE_TIMEOUT: Duration = Duration::from_millis(500);
pub const SPECIAL_MODE_TIMEOUT: Duration = Duration::from_secs(15 * 60);
// Duration covered by UP and DOWN
pub const UP_DOWN_DURATION: Duration = Duration::from_millis(200);

/// Number of ticks in `d`
pub const fn ticks(d: Duration) -> u32 {
    (d.as_millis() / TICK.as_millis()) as u32
}

#[test]
fn tick_counts() {
    assert_eq!(ticks(SEND_TWICE_WINDOW), 100);
    assert_eq!(ticks(SPECIAL_MODE_TIMEOUT), 900_000);
    assert_eq!(ticks(FORWARD_BACKWARD_DELAY) + ticks(BACKWARD_FRAME_DURATION), 13);
}
