//! Driver for running a gear in real time on a host.
//!
//! The tick source and frame reception are tasks of the owner. Backward
//! frames are forwarded on a channel.
use crate::drivers::driver::{BusDriver, Clock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

pub struct HostDriver {
    bus_present: Arc<AtomicBool>,
    answers: mpsc::UnboundedSender<u8>,
    start: Instant,
}

impl HostDriver {
    /// Returns the driver and the receiving end for backward frames
    pub fn new(bus_present: Arc<AtomicBool>) -> (HostDriver, mpsc::UnboundedReceiver<u8>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            HostDriver {
                bus_present,
                answers: tx,
                start: Instant::now(),
            },
            rx,
        )
    }
}

impl BusDriver for HostDriver {
    fn bus_idle_high(&mut self) -> bool {
        self.bus_present.load(Ordering::Acquire)
    }

    fn transmit(&mut self, answer: u8) {
        // Nobody listening is the same as an empty bus
        let _ = self.answers.send(answer);
    }
}

impl Clock for HostDriver {
    fn timer_sample(&self) -> u16 {
        self.start.elapsed().as_micros() as u16
    }

    fn sleep_ticks(&mut self, ticks: u16) {
        std::thread::sleep(Duration::from_millis(ticks as u64));
    }
}
