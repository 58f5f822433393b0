use super::registers::Registers;
use super::timing::{self, BACKWARD_FRAME_DURATION, BUS_FAILURE_TIMEOUT, FORWARD_BACKWARD_DELAY};
use crate::base::address::MASK;
use crate::drivers::driver::GearDriver;
use crate::drivers::frame_latch::FrameLatch;
use log::info;

/// Watches the bus line for a missing bus
#[derive(Debug, Clone, Default)]
pub struct BusSupervisor {
    // Time the bus line has been low, saturates at the timeout
    failure_ticks: u32,
}

impl BusSupervisor {
    pub fn new() -> BusSupervisor {
        BusSupervisor { failure_ticks: 0 }
    }

    pub fn is_bus_failure(&self) -> bool {
        self.failure_ticks >= timing::ticks(BUS_FAILURE_TIMEOUT)
    }

    /// Check the bus line after `elapsed` ticks. Returns true if the
    /// system failure level was applied.
    pub fn check(
        &mut self,
        driver: &mut dyn GearDriver,
        latch: &FrameLatch,
        regs: &mut Registers,
        elapsed: u16,
    ) -> bool {
        if driver.bus_idle_high() {
            if self.is_bus_failure() {
                info!("Bus restored");
            }
            self.failure_ticks = 0;
            return false;
        }
        // Anything received while the line is low is garbage
        latch.discard();
        if !self.is_bus_failure() {
            self.failure_ticks += elapsed as u32;
            if self.is_bus_failure() {
                info!("Bus failure");
            }
            false
        } else if regs.system_failure_level != MASK {
            regs.actual_level = regs.system_failure_level;
            true
        } else {
            false
        }
    }
}

/// Send a backward frame.
///
/// Blocks for the forward to backward delay, the frame itself and then
/// drops anything received meanwhile.
pub fn answer(driver: &mut dyn GearDriver, latch: &FrameLatch, byte: u8) {
    driver.sleep_ticks(timing::ticks(FORWARD_BACKWARD_DELAY) as u16);
    driver.transmit(byte);
    driver.sleep_ticks(timing::ticks(BACKWARD_FRAME_DURATION) as u16);
    latch.discard();
}
