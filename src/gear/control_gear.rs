//! Control gear main loop.
//!
//! Interrupt context only touches the [`FrameLatch`] and the
//! [`TickCounter`]. Everything else is owned by [`ControlGear`] and only
//! changed from [`ControlGear::poll`].
use super::classify::{Classifier, CommandCategory};
use super::command_table::{self, GearCommand};
use super::commissioning::Commissioning;
use super::fade::FadeEngine;
use super::registers::Registers;
use super::supervisor::{self, BusSupervisor};
use crate::config::GearConfig;
use crate::drivers::driver::{ForwardFrame, GearDriver};
use crate::drivers::frame_latch::{FrameLatch, TickCounter};
use crate::utils::nv_store::NvStore;
use log::debug;
use std::sync::Arc;

pub struct ControlGear {
    pub(super) config: GearConfig,
    pub(super) driver: Box<dyn GearDriver>,
    pub(super) store: Box<dyn NvStore>,
    latch: Arc<FrameLatch>,
    ticks: Arc<TickCounter>,
    pub(super) regs: Registers,
    classifier: Classifier,
    pub(super) fade: FadeEngine,
    pub(super) commissioning: Commissioning,
    supervisor: BusSupervisor,
    // At least one frame received since start
    running: bool,
}

impl ControlGear {
    /// Power up. The registers are restored from `store`, or reset values
    /// are written to it if it hasn't been initialized.
    pub fn new(
        config: GearConfig,
        driver: Box<dyn GearDriver>,
        mut store: Box<dyn NvStore>,
        latch: Arc<FrameLatch>,
        ticks: Arc<TickCounter>,
    ) -> ControlGear {
        let mut regs = Registers::initialize(&config, store.as_mut(), None);
        let mut fade = FadeEngine::new();
        fade.stop(&mut regs);
        ControlGear {
            config,
            driver,
            store,
            latch,
            ticks,
            regs,
            classifier: Classifier::new(),
            fade,
            commissioning: Commissioning::new(),
            supervisor: BusSupervisor::new(),
            running: false,
        }
    }

    /// One pass of the main loop. Should be called at least once per
    /// tick. `lamp_failure` is the state of the lamp failure input.
    ///
    /// Returns the level for the output stage, 0 when the lamp is off.
    pub fn poll(&mut self, lamp_failure: bool) -> u8 {
        let elapsed = self.ticks.take();
        if elapsed != 0 {
            self.commissioning.advance(elapsed);
            self.classifier.advance(elapsed);
            self.fade.advance(&mut self.regs, elapsed);
            if self
                .supervisor
                .check(self.driver.as_mut(), &self.latch, &mut self.regs, elapsed)
            {
                self.fade.stop(&mut self.regs);
            }
        }

        if let Some(frame) = self.latch.take() {
            self.running = true;
            self.handle_frame(frame);
        }

        let level = self.regs.output_level();
        self.commissioning.lamp_failure(&mut self.regs, lamp_failure);
        level
    }

    fn handle_frame(&mut self, frame: ForwardFrame) {
        self.regs.address_byte = frame.address;
        self.regs.command_byte = frame.command;
        let category = self
            .classifier
            .classify(frame, self.regs.short_address, self.regs.group);
        if category == CommandCategory::None {
            return;
        }
        self.clear_status_flags(category);
        let entry = match command_table::lookup(category, frame) {
            Some(entry) => entry,
            None => {
                debug!("{}: Unknown command", frame);
                return;
            }
        };
        debug!("{}: {}", frame, entry.name);
        if let Some(answer) = self.execute(category, entry.command(frame)) {
            debug!("Answer {:02x}", answer);
            supervisor::answer(self.driver.as_mut(), &self.latch, answer);
        }
    }

    fn clear_status_flags(&mut self, category: CommandCategory) {
        match category {
            CommandCategory::DirectArcPower | CommandCategory::IndirectArcPower => {
                self.regs.status.reset_state = false;
                self.regs.status.power_failure = false;
            }
            CommandCategory::ConfigCommand | CommandCategory::SpecialCommand => {
                self.regs.status.reset_state = false;
            }
            CommandCategory::QueryCommand | CommandCategory::None => {}
        }
    }

    /// Run a decoded command. Returns the backward frame, if any.
    fn execute(&mut self, category: CommandCategory, command: GearCommand) -> Option<u8> {
        match category {
            CommandCategory::DirectArcPower | CommandCategory::IndirectArcPower => {
                self.arc_power(command);
                None
            }
            CommandCategory::ConfigCommand => {
                self.settings(command);
                None
            }
            CommandCategory::QueryCommand => self.query(command),
            CommandCategory::SpecialCommand => self.special(command),
            CommandCategory::None => None,
        }
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    pub fn fade(&self) -> &FadeEngine {
        &self.fade
    }

    pub fn commissioning(&self) -> &Commissioning {
        &self.commissioning
    }

    pub fn config(&self) -> &GearConfig {
        &self.config
    }

    pub fn is_bus_failure(&self) -> bool {
        self.supervisor.is_bus_failure()
    }

    /// True once a valid frame has been received
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Power down, returning the store
    pub fn into_store(self) -> Box<dyn NvStore> {
        self.store
    }
}
