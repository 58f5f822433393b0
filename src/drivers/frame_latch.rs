//! State shared between interrupt context and the main loop.
//!
//! Each cell has exactly one writer (an interrupt source) and one
//! consumer (the main loop), so plain atomics are enough.
use super::driver::ForwardFrame;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

/// Holds the latest received forward frame until the main loop takes it.
pub struct FrameLatch {
    frame: AtomicU16,
    ready: AtomicBool,
}

impl FrameLatch {
    pub const fn new() -> FrameLatch {
        FrameLatch {
            frame: AtomicU16::new(0),
            ready: AtomicBool::new(false),
        }
    }

    /// Called from the receive interrupt with a frame that had no
    /// framing errors. An unconsumed frame is overwritten.
    pub fn post(&self, frame: ForwardFrame) {
        self.frame.store(frame.to_bits(), Ordering::Release);
        self.ready.store(true, Ordering::Release);
    }

    pub fn take(&self) -> Option<ForwardFrame> {
        if self.ready.swap(false, Ordering::AcqRel) {
            Some(ForwardFrame::from_bits(self.frame.load(Ordering::Acquire)))
        } else {
            None
        }
    }

    /// Drop any latched frame
    pub fn discard(&self) {
        self.ready.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl Default for FrameLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Millisecond tick count since the main loop last looked.
pub struct TickCounter {
    ticks: AtomicU16,
}

impl TickCounter {
    pub const fn new() -> TickCounter {
        TickCounter {
            ticks: AtomicU16::new(0),
        }
    }

    /// Called from the 1ms timer interrupt
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of ticks since the last call. Resets the count.
    pub fn take(&self) -> u16 {
        self.ticks.swap(0, Ordering::AcqRel)
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}
