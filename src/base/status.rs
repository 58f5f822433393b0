use crate::defs::gear::status as flag;
use std::fmt;

/// Status register of the control gear. Each flag is kept separately and
/// packed into the "query status" byte on demand.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct GearStatus {
    pub power_failure: bool,
    pub missing_short_address: bool,
    pub reset_state: bool,
    pub fade_running: bool,
    pub limit_error: bool,
    pub lamp_on: bool,
    pub lamp_failure: bool,
    pub ballast_failure: bool,
}

impl GearStatus {
    pub fn new(status: u8) -> GearStatus {
        GearStatus {
            power_failure: status & flag::POWER_FAILURE != 0,
            missing_short_address: status & flag::MISSING_SHORT_ADDRESS != 0,
            reset_state: status & flag::RESET_STATE != 0,
            fade_running: status & flag::FADE_RUNNING != 0,
            limit_error: status & flag::LIMIT_ERROR != 0,
            lamp_on: status & flag::LAMP_ON != 0,
            lamp_failure: status & flag::LAMP_FAILURE != 0,
            ballast_failure: status & flag::BALLAST_FAILURE != 0,
        }
    }

    pub fn value(&self) -> u8 {
        let bit = |set: bool, mask: u8| if set { mask } else { 0 };
        bit(self.power_failure, flag::POWER_FAILURE)
            | bit(self.missing_short_address, flag::MISSING_SHORT_ADDRESS)
            | bit(self.reset_state, flag::RESET_STATE)
            | bit(self.fade_running, flag::FADE_RUNNING)
            | bit(self.limit_error, flag::LIMIT_ERROR)
            | bit(self.lamp_on, flag::LAMP_ON)
            | bit(self.lamp_failure, flag::LAMP_FAILURE)
            | bit(self.ballast_failure, flag::BALLAST_FAILURE)
    }
}

impl fmt::Display for GearStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut strs = Vec::<&'static str>::new();
        if self.ballast_failure {
            strs.push("ballast failure");
        }
        if self.lamp_failure {
            strs.push("lamp failure");
        }
        if self.lamp_on {
            strs.push("lamp on");
        }
        if self.limit_error {
            strs.push("limit error");
        }
        if self.fade_running {
            strs.push("fade running");
        }
        if self.reset_state {
            strs.push("reset state");
        }
        if self.missing_short_address {
            strs.push("no address");
        }
        if self.power_failure {
            strs.push("power failure");
        }
        f.write_str(&strs.join(", "))
    }
}

#[test]
fn status_bits() {
    let s = GearStatus {
        power_failure: true,
        lamp_on: true,
        ..Default::default()
    };
    assert_eq!(s.value(), 0x84);
    assert_eq!(GearStatus::new(0x84), s);
    assert_eq!(GearStatus::new(0xe4).value(), 0xe4);
    assert_eq!(s.to_string(), "lamp on, power failure");
}
