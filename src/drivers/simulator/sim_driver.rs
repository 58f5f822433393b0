//! Simulated hardware for running a gear without a bus.
//!
//! Time only passes when the gear sleeps or when the owner of the
//! [`TickCounter`] ticks it, so tests are deterministic.
use crate::drivers::driver::{BusDriver, Clock};
use crate::drivers::frame_latch::TickCounter;
use std::sync::{Arc, Mutex};

// Data shared by the driver and the bus handle
struct SimBusCtxt {
    bus_present: bool,
    // Backward frames, oldest first
    answers: Vec<u8>,
    // Total number of ticks slept
    slept: u32,
    timer: u16,
}

pub struct SimDriver {
    ctxt: Arc<Mutex<SimBusCtxt>>,
    ticks: Arc<TickCounter>,
}

/// Test side of a [`SimDriver`]
#[derive(Clone)]
pub struct SimBus {
    ctxt: Arc<Mutex<SimBusCtxt>>,
}

impl SimDriver {
    /// Create a driver that advances `ticks` while sleeping. `seed` is the
    /// initial value of the free running timer.
    pub fn new(ticks: Arc<TickCounter>, seed: u16) -> (SimDriver, SimBus) {
        let ctxt = Arc::new(Mutex::new(SimBusCtxt {
            bus_present: true,
            answers: Vec::new(),
            slept: 0,
            timer: seed,
        }));
        (
            SimDriver {
                ctxt: ctxt.clone(),
                ticks,
            },
            SimBus { ctxt },
        )
    }
}

impl BusDriver for SimDriver {
    fn bus_idle_high(&mut self) -> bool {
        self.ctxt.lock().map(|c| c.bus_present).unwrap_or(true)
    }

    fn transmit(&mut self, answer: u8) {
        if let Ok(mut ctxt) = self.ctxt.lock() {
            ctxt.answers.push(answer);
        }
    }
}

impl Clock for SimDriver {
    fn timer_sample(&self) -> u16 {
        self.ctxt.lock().map(|c| c.timer).unwrap_or(0)
    }

    fn sleep_ticks(&mut self, ticks: u16) {
        if let Ok(mut ctxt) = self.ctxt.lock() {
            ctxt.slept += ticks as u32;
            ctxt.timer = ctxt.timer.wrapping_add(ticks);
        }
        for _ in 0..ticks {
            self.ticks.tick();
        }
    }
}

impl SimBus {
    pub fn set_bus_present(&self, present: bool) {
        if let Ok(mut ctxt) = self.ctxt.lock() {
            ctxt.bus_present = present;
        }
    }

    /// Remove and return all backward frames sent so far
    pub fn take_answers(&self) -> Vec<u8> {
        match self.ctxt.lock() {
            Ok(mut ctxt) => std::mem::take(&mut ctxt.answers),
            Err(_) => Vec::new(),
        }
    }

    pub fn slept_ticks(&self) -> u32 {
        self.ctxt.lock().map(|c| c.slept).unwrap_or(0)
    }
}
