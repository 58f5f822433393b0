pub const BALLAST_FAILURE: u8 = 0x01;
pub const LAMP_FAILURE: u8 = 0x02;
pub const LAMP_ON: u8 = 0x04;
pub const LIMIT_ERROR: u8 = 0x08;
pub const FADE_RUNNING: u8 = 0x10;
pub const RESET_STATE: u8 = 0x20;
pub const MISSING_SHORT_ADDRESS: u8 = 0x40;
pub const POWER_FAILURE: u8 = 0x80;
