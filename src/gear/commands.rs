//! Forward frame builders, mainly for controllers and tests talking to a
//! gear.
use crate::base::address::AddressByte;
use crate::drivers::driver::ForwardFrame;
use crate::gear::cmd_defs as cmd;

/// A forward frame. `ANSWER` is true if the gear may reply, `TWICE` if it
/// must be sent twice within 100ms to take effect.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Command<const ANSWER: bool, const TWICE: bool>(pub [u8; 2]);

impl<const ANSWER: bool, const TWICE: bool> Command<ANSWER, TWICE> {
    pub const fn expects_answer(&self) -> bool {
        ANSWER
    }

    pub const fn send_twice(&self) -> bool {
        TWICE
    }

    pub fn frame(&self) -> ForwardFrame {
        ForwardFrame::new(self.0[0], self.0[1])
    }
}

macro_rules! cmd_type {
    () => {Command<false,false>};
    (Answer) => {Command<true,false>};
    (Twice) => {Command<false,true>};
}

macro_rules! dev_cmd_def {
    ($sym: ident, $opcode: expr $(,$attr: ident)?) => {
        #[allow(non_snake_case)]
        #[inline(always)]
        pub fn $sym<A>(addr: A) -> cmd_type!($($attr)?)
        where
            A: Into<AddressByte>,
        {
            Command([addr.into().0 | 1, $opcode])
        }
    };
}

macro_rules! offset_cmd_def {
    ($sym: ident, $opcode: expr $(,$attr: ident)?) => {
        #[allow(non_snake_case)]
        #[inline(always)]
        pub fn $sym<A>(addr: A, offset: u8) -> cmd_type!($($attr)?)
        where
            A: Into<AddressByte>,
        {
            Command([addr.into().0 | 1, $opcode + (offset & 0x0f)])
        }
    };
}

macro_rules! special_cmd_def {
    ($sym: ident, $byte1: expr, $byte2: expr $(,$attr: ident)?) => {
        #[allow(non_snake_case)]
        #[inline(always)]
        pub const fn $sym() -> cmd_type!($($attr)?) {
            Command([$byte1, $byte2])
        }
    };
}

macro_rules! special_data_cmd_def {
    ($sym: ident, $byte1: expr $(,$attr: ident)?) => {
        #[allow(non_snake_case)]
        #[inline(always)]
        pub const fn $sym(data: u8) ->cmd_type!($($attr)?) {
            Command([$byte1, data])
        }
    };
}

/// Direct arc power control
#[allow(non_snake_case)]
#[inline(always)]
pub fn DAPC<A>(addr: A, level: u8) -> Command<false, false>
where
    A: Into<AddressByte>,
{
    Command([addr.into().0 & 0xfe, level])
}

dev_cmd_def!(OFF, cmd::OFF);
dev_cmd_def!(UP, cmd::UP);
dev_cmd_def!(DOWN, cmd::DOWN);
dev_cmd_def!(STEP_UP, cmd::STEP_UP);
dev_cmd_def!(STEP_DOWN, cmd::STEP_DOWN);
dev_cmd_def!(RECALL_MAX_LEVEL, cmd::RECALL_MAX_LEVEL);
dev_cmd_def!(RECALL_MIN_LEVEL, cmd::RECALL_MIN_LEVEL);
dev_cmd_def!(STEP_DOWN_AND_OFF, cmd::STEP_DOWN_AND_OFF);
dev_cmd_def!(ON_AND_STEP_UP, cmd::ON_AND_STEP_UP);
offset_cmd_def!(GOTO_SCENE, cmd::GO_TO_SCENE);

dev_cmd_def!(RESET, cmd::RESET, Twice);
dev_cmd_def!(STORE_ACTUAL_LEVEL_IN_DTR, cmd::STORE_ACTUAL_LEVEL_IN_DTR, Twice);
dev_cmd_def!(SET_MAX_LEVEL, cmd::STORE_DTR_AS_MAX_LEVEL, Twice);
dev_cmd_def!(SET_MIN_LEVEL, cmd::STORE_DTR_AS_MIN_LEVEL, Twice);
dev_cmd_def!(SET_SYSTEM_FAILURE_LEVEL, cmd::STORE_DTR_AS_SYSTEM_FAILURE_LEVEL, Twice);
dev_cmd_def!(SET_POWER_ON_LEVEL, cmd::STORE_DTR_AS_POWER_ON_LEVEL, Twice);
dev_cmd_def!(SET_FADE_TIME, cmd::STORE_DTR_AS_FADE_TIME, Twice);
dev_cmd_def!(SET_FADE_RATE, cmd::STORE_DTR_AS_FADE_RATE, Twice);
offset_cmd_def!(SET_SCENE, cmd::STORE_DTR_AS_SCENE, Twice);
offset_cmd_def!(REMOVE_FROM_SCENE, cmd::REMOVE_FROM_SCENE, Twice);
offset_cmd_def!(ADD_TO_GROUP, cmd::ADD_TO_GROUP, Twice);
offset_cmd_def!(REMOVE_FROM_GROUP, cmd::REMOVE_FROM_GROUP, Twice);
dev_cmd_def!(SET_SHORT_ADDRESS, cmd::STORE_DTR_AS_SHORT_ADDRESS, Twice);

dev_cmd_def!(QUERY_STATUS, cmd::QUERY_STATUS, Answer);
dev_cmd_def!(QUERY_CONTROL_GEAR_PRESENT, cmd::QUERY_BALLAST, Answer);
dev_cmd_def!(QUERY_LAMP_FAILURE, cmd::QUERY_LAMP_FAILURE, Answer);
dev_cmd_def!(QUERY_LAMP_POWER_ON, cmd::QUERY_LAMP_POWER_ON, Answer);
dev_cmd_def!(QUERY_LIMIT_ERROR, cmd::QUERY_LIMIT_ERROR, Answer);
dev_cmd_def!(QUERY_RESET_STATE, cmd::QUERY_RESET_STATE, Answer);
dev_cmd_def!(QUERY_MISSING_SHORT_ADDRESS, cmd::QUERY_MISSING_SHORT_ADDRESS, Answer);
dev_cmd_def!(QUERY_VERSION_NUMBER, cmd::QUERY_VERSION_NUMBER, Answer);
dev_cmd_def!(QUERY_CONTENT_DTR, cmd::QUERY_CONTENT_DTR, Answer);
dev_cmd_def!(QUERY_DEVICE_TYPE, cmd::QUERY_DEVICE_TYPE, Answer);
dev_cmd_def!(QUERY_PHYSICAL_MINIMUM, cmd::QUERY_PHYSICAL_MINIMUM_LEVEL, Answer);
dev_cmd_def!(QUERY_POWER_FAILURE, cmd::QUERY_POWER_FAILURE, Answer);
dev_cmd_def!(QUERY_ACTUAL_LEVEL, cmd::QUERY_ACTUAL_LEVEL, Answer);
dev_cmd_def!(QUERY_MAX_LEVEL, cmd::QUERY_MAX_LEVEL, Answer);
dev_cmd_def!(QUERY_MIN_LEVEL, cmd::QUERY_MIN_LEVEL, Answer);
dev_cmd_def!(QUERY_POWER_ON_LEVEL, cmd::QUERY_POWER_ON_LEVEL, Answer);
dev_cmd_def!(QUERY_SYSTEM_FAILURE_LEVEL, cmd::QUERY_SYSTEM_FAILURE_LEVEL, Answer);
dev_cmd_def!(QUERY_FADE, cmd::QUERY_FADE_SETTINGS, Answer);
offset_cmd_def!(QUERY_SCENE_LEVEL, cmd::QUERY_SCENE_LEVEL, Answer);
dev_cmd_def!(QUERY_GROUPS_0_7, cmd::QUERY_GROUPS_0_7, Answer);
dev_cmd_def!(QUERY_GROUPS_8_15, cmd::QUERY_GROUPS_8_15, Answer);
dev_cmd_def!(QUERY_RANDOM_ADDRESS_H, cmd::QUERY_RANDOM_ADDRESS_H, Answer);
dev_cmd_def!(QUERY_RANDOM_ADDRESS_M, cmd::QUERY_RANDOM_ADDRESS_M, Answer);
dev_cmd_def!(QUERY_RANDOM_ADDRESS_L, cmd::QUERY_RANDOM_ADDRESS_L, Answer);

special_cmd_def!(TERMINATE, cmd::TERMINATE, 0x00);
special_data_cmd_def!(DTR, cmd::DTR);

#[allow(non_snake_case)]
#[inline(always)]
pub fn INITIALISE_ADDR<A>(addr: A) -> Command<false, true>
where
    A: Into<AddressByte>,
{
    Command([cmd::INITIALISE, addr.into().0])
}

special_cmd_def!(INITIALISE_ALL, cmd::INITIALISE, cmd::INITIALISE_ALL, Twice);
special_cmd_def!(INITIALISE_NO_ADDR, cmd::INITIALISE, cmd::INITIALISE_NO_ADDR, Twice);
special_cmd_def!(RANDOMISE, cmd::RANDOMISE, 0x00, Twice);
special_cmd_def!(COMPARE, cmd::COMPARE, 0x00, Answer);
special_cmd_def!(WITHDRAW, cmd::WITHDRAW, 0x00);
special_data_cmd_def!(SEARCHADDRH, cmd::SEARCHADDRH);
special_data_cmd_def!(SEARCHADDRM, cmd::SEARCHADDRM);
special_data_cmd_def!(SEARCHADDRL, cmd::SEARCHADDRL);

#[allow(non_snake_case)]
#[inline(always)]
pub fn PROGRAM_SHORT_ADDRESS<A>(addr: A) -> Command<false, false>
where
    A: Into<AddressByte>,
{
    Command([cmd::PROGRAM_SHORT_ADDRESS, addr.into().0])
}

#[allow(non_snake_case)]
#[inline(always)]
pub fn VERIFY_SHORT_ADDRESS<A>(addr: A) -> Command<true, false>
where
    A: Into<AddressByte>,
{
    Command([cmd::VERIFY_SHORT_ADDRESS, addr.into().0])
}

special_cmd_def!(QUERY_SHORT_ADDRESS, cmd::QUERY_SHORT_ADDRESS, 0x00, Answer);
special_cmd_def!(PHYSICAL_SELECTION, cmd::PHYSICAL_SELECTION, 0x00);
special_data_cmd_def!(ENABLE_DEVICE_TYPE, cmd::ENABLE_DEVICE_TYPE);
