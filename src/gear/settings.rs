use super::command_table::GearCommand;
use super::control_gear::ControlGear;
use super::registers::{Persisted, Registers};
use crate::base::address::{Short, MASK};
use log::info;

const MAX_LEVEL: u8 = 0xfe;

impl ControlGear {
    /// Configuration commands. Everything changed is written to the store.
    pub(super) fn settings(&mut self, command: GearCommand) {
        let regs = &mut self.regs;
        let dtr = regs.dtr;
        let persisted = match command {
            GearCommand::Reset => {
                self.reset();
                return;
            }
            GearCommand::StoreActualLevelInDtr => {
                regs.dtr = regs.actual_level;
                return;
            }
            GearCommand::StoreDtrAsMaxLevel => {
                regs.max_level = dtr.min(MAX_LEVEL);
                if regs.max_level <= regs.min_level {
                    regs.max_level = regs.min_level.saturating_add(1);
                }
                if regs.actual_level > regs.max_level {
                    regs.actual_level = regs.max_level;
                }
                Persisted::MaxLevel
            }
            GearCommand::StoreDtrAsMinLevel => {
                regs.min_level = dtr.max(self.config.physical_min_level);
                if regs.min_level >= regs.max_level {
                    regs.min_level = regs.max_level.saturating_sub(1);
                }
                if regs.actual_level < regs.min_level {
                    regs.actual_level = regs.min_level;
                }
                Persisted::MinLevel
            }
            GearCommand::StoreDtrAsSystemFailureLevel => {
                regs.system_failure_level = dtr;
                Persisted::SystemFailureLevel
            }
            GearCommand::StoreDtrAsPowerOnLevel => {
                regs.power_on_level = dtr.min(MAX_LEVEL);
                Persisted::PowerOnLevel
            }
            GearCommand::StoreDtrAsFadeTime => {
                regs.fade_time = dtr & 0x0f;
                Persisted::FadeTime
            }
            GearCommand::StoreDtrAsFadeRate => {
                // 0 is not a valid fade rate
                if dtr & 0x0f == 0 {
                    return;
                }
                regs.fade_rate = dtr & 0x0f;
                Persisted::FadeRate
            }
            GearCommand::StoreDtrAsScene(n) => {
                regs.scene[(n & 0x0f) as usize] = dtr;
                Persisted::Scene(n)
            }
            GearCommand::RemoveFromScene(n) => {
                regs.scene[(n & 0x0f) as usize] = MASK;
                Persisted::Scene(n)
            }
            GearCommand::AddToGroup(n) => {
                regs.group |= 1 << (n & 0x0f);
                Persisted::Group
            }
            GearCommand::RemoveFromGroup(n) => {
                regs.group &= !(1 << (n & 0x0f));
                Persisted::Group
            }
            GearCommand::StoreDtrAsShortAddress => {
                if dtr == MASK {
                    regs.set_short_address(None);
                } else if let Some(short) = Short::from_payload(dtr) {
                    regs.set_short_address(Some(short));
                } else {
                    return;
                }
                Persisted::ShortAddress
            }
            _ => return,
        };
        regs.persist(self.store.as_mut(), persisted);
    }

    /// Restore reset values, keeping the short address
    fn reset(&mut self) {
        info!("Reset");
        Registers::invalidate_store(self.store.as_mut());
        let short = self.regs.short_address;
        let dtr = self.regs.dtr;
        self.regs = Registers::initialize(&self.config, self.store.as_mut(), short);
        self.regs.dtr = dtr;
        self.regs.status.reset_state = true;
        self.regs.status.power_failure = false;
        self.fade.stop(&mut self.regs);
    }
}
