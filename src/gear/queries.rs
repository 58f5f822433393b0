use super::cmd_defs::YES;
use super::command_table::GearCommand;
use super::control_gear::ControlGear;
use crate::base::address;

// No answer means no
fn yes_if(cond: bool) -> Option<u8> {
    if cond {
        Some(YES)
    } else {
        None
    }
}

impl ControlGear {
    pub(super) fn query(&self, command: GearCommand) -> Option<u8> {
        let regs = &self.regs;
        let status = &regs.status;
        let [random_h, random_m, random_l] = address::long_bytes(regs.random_address);
        match command {
            GearCommand::QueryStatus => Some(status.value()),
            GearCommand::QueryBallast => Some(YES),
            GearCommand::QueryLampFailure => yes_if(status.lamp_failure),
            GearCommand::QueryLampPowerOn => yes_if(status.lamp_on),
            GearCommand::QueryLimitError => yes_if(status.limit_error),
            GearCommand::QueryResetState => yes_if(status.reset_state),
            GearCommand::QueryMissingShortAddress => yes_if(status.missing_short_address),
            GearCommand::QueryPowerFailure => yes_if(status.power_failure),
            GearCommand::QueryVersionNumber => Some(self.config.version_number),
            GearCommand::QueryContentDtr => Some(regs.dtr),
            GearCommand::QueryDeviceType => Some(self.config.device_type),
            GearCommand::QueryPhysicalMinimumLevel => Some(self.config.physical_min_level),
            GearCommand::QueryActualLevel => Some(regs.actual_level),
            GearCommand::QueryMaxLevel => Some(regs.max_level),
            GearCommand::QueryMinLevel => Some(regs.min_level),
            GearCommand::QueryPowerOnLevel => Some(regs.power_on_level),
            GearCommand::QuerySystemFailureLevel => Some(regs.system_failure_level),
            GearCommand::QueryFadeSettings => Some((regs.fade_time << 4) | (regs.fade_rate & 0x0f)),
            GearCommand::QuerySceneLevel(n) => Some(regs.scene[(n & 0x0f) as usize]),
            GearCommand::QueryGroups0_7 => Some(regs.group as u8),
            GearCommand::QueryGroups8_15 => Some((regs.group >> 8) as u8),
            GearCommand::QueryRandomAddressH => Some(random_h),
            GearCommand::QueryRandomAddressM => Some(random_m),
            GearCommand::QueryRandomAddressL => Some(random_l),
            _ => None,
        }
    }
}
