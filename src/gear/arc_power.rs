use super::command_table::GearCommand;
use super::control_gear::ControlGear;

impl ControlGear {
    /// Direct and indirect arc power commands
    pub(super) fn arc_power(&mut self, command: GearCommand) {
        let regs = &mut self.regs;
        match command {
            GearCommand::DirectArcPower(level) => self.fade.fade_to(regs, level),
            GearCommand::GoToScene(n) => {
                let level = regs.scene[(n & 0x0f) as usize];
                self.fade.fade_to(regs, level)
            }
            GearCommand::Up => self.fade.up_with_fade_rate(regs),
            GearCommand::Down => self.fade.down_with_fade_rate(regs),
            GearCommand::Off => {
                regs.actual_level = 0;
                self.fade.stop(regs);
            }
            GearCommand::StepUp => {
                if regs.actual_level < regs.max_level && regs.status.lamp_on {
                    regs.actual_level += 1;
                }
                self.fade.stop(regs);
            }
            GearCommand::StepDown => {
                if regs.actual_level > regs.min_level && regs.status.lamp_on {
                    regs.actual_level -= 1;
                }
                self.fade.stop(regs);
            }
            GearCommand::RecallMaxLevel => {
                regs.actual_level = regs.max_level;
                self.fade.stop(regs);
            }
            GearCommand::RecallMinLevel => {
                regs.actual_level = regs.min_level;
                self.fade.stop(regs);
            }
            GearCommand::StepDownAndOff => {
                if regs.status.lamp_on {
                    if regs.actual_level > regs.min_level {
                        regs.actual_level -= 1;
                    } else {
                        regs.actual_level = 0;
                    }
                }
                self.fade.stop(regs);
            }
            GearCommand::OnAndStepUp => {
                if !regs.status.lamp_on {
                    regs.actual_level = regs.min_level;
                } else if regs.actual_level < regs.max_level {
                    regs.actual_level += 1;
                }
                self.fade.stop(regs);
            }
            _ => {}
        }
    }
}
