//! Mapping from opcodes to gear commands.
//!
//! Each category has its own table. Device commands are looked up by the
//! command byte, special commands by the address byte.
use super::classify::CommandCategory;
use super::cmd_defs as cmd;
use crate::drivers::driver::ForwardFrame;
use std::ops::RangeInclusive;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GearCommand {
    DirectArcPower(u8),

    Off,
    Up,
    Down,
    StepUp,
    StepDown,
    RecallMaxLevel,
    RecallMinLevel,
    StepDownAndOff,
    OnAndStepUp,
    GoToScene(u8),

    Reset,
    StoreActualLevelInDtr,
    StoreDtrAsMaxLevel,
    StoreDtrAsMinLevel,
    StoreDtrAsSystemFailureLevel,
    StoreDtrAsPowerOnLevel,
    StoreDtrAsFadeTime,
    StoreDtrAsFadeRate,
    StoreDtrAsScene(u8),
    RemoveFromScene(u8),
    AddToGroup(u8),
    RemoveFromGroup(u8),
    StoreDtrAsShortAddress,

    QueryStatus,
    QueryBallast,
    QueryLampFailure,
    QueryLampPowerOn,
    QueryLimitError,
    QueryResetState,
    QueryMissingShortAddress,
    QueryVersionNumber,
    QueryContentDtr,
    QueryDeviceType,
    QueryPhysicalMinimumLevel,
    QueryPowerFailure,
    QueryActualLevel,
    QueryMaxLevel,
    QueryMinLevel,
    QueryPowerOnLevel,
    QuerySystemFailureLevel,
    QueryFadeSettings,
    QuerySceneLevel(u8),
    QueryGroups0_7,
    QueryGroups8_15,
    QueryRandomAddressH,
    QueryRandomAddressM,
    QueryRandomAddressL,

    Terminate,
    Dtr(u8),
    Initialise(u8),
    Randomise,
    Compare,
    Withdraw,
    SearchAddressH(u8),
    SearchAddressM(u8),
    SearchAddressL(u8),
    ProgramShortAddress(u8),
    VerifyShortAddress(u8),
    QueryShortAddress,
    PhysicalSelection,
    EnableDeviceType(u8),
}

pub struct CommandEntry {
    pub codes: RangeInclusive<u8>,
    pub name: &'static str,
    decode: fn(ForwardFrame) -> GearCommand,
}

impl CommandEntry {
    pub fn command(&self, frame: ForwardFrame) -> GearCommand {
        (self.decode)(frame)
    }
}

macro_rules! entry {
    ($codes: expr, $name: expr, $decode: expr) => {
        CommandEntry {
            codes: $codes,
            name: $name,
            decode: $decode,
        }
    };
}

// Commands with the scene or group number in the low nibble
fn offset(frame: ForwardFrame) -> u8 {
    frame.command & 0x0f
}

static DIRECT_ARC_POWER: [CommandEntry; 1] = [entry!(0x00..=0xff, "Direct arc power", |f| {
    GearCommand::DirectArcPower(f.command)
})];

static INDIRECT_ARC_POWER: [CommandEntry; 10] = [
    entry!(cmd::OFF..=cmd::OFF, "Off", |_| GearCommand::Off),
    entry!(cmd::UP..=cmd::UP, "Up", |_| GearCommand::Up),
    entry!(cmd::DOWN..=cmd::DOWN, "Down", |_| GearCommand::Down),
    entry!(cmd::STEP_UP..=cmd::STEP_UP, "Step up", |_| GearCommand::StepUp),
    entry!(cmd::STEP_DOWN..=cmd::STEP_DOWN, "Step down", |_| {
        GearCommand::StepDown
    }),
    entry!(
        cmd::RECALL_MAX_LEVEL..=cmd::RECALL_MAX_LEVEL,
        "Recall max level",
        |_| GearCommand::RecallMaxLevel
    ),
    entry!(
        cmd::RECALL_MIN_LEVEL..=cmd::RECALL_MIN_LEVEL,
        "Recall min level",
        |_| GearCommand::RecallMinLevel
    ),
    entry!(
        cmd::STEP_DOWN_AND_OFF..=cmd::STEP_DOWN_AND_OFF,
        "Step down and off",
        |_| GearCommand::StepDownAndOff
    ),
    entry!(
        cmd::ON_AND_STEP_UP..=cmd::ON_AND_STEP_UP,
        "On and step up",
        |_| GearCommand::OnAndStepUp
    ),
    entry!(
        cmd::GO_TO_SCENE..=cmd::GO_TO_SCENE + 15,
        "Go to scene",
        |f| GearCommand::GoToScene(offset(f))
    ),
];

static CONFIG: [CommandEntry; 13] = [
    entry!(cmd::RESET..=cmd::RESET, "Reset", |_| GearCommand::Reset),
    entry!(
        cmd::STORE_ACTUAL_LEVEL_IN_DTR..=cmd::STORE_ACTUAL_LEVEL_IN_DTR,
        "Store actual level in DTR",
        |_| GearCommand::StoreActualLevelInDtr
    ),
    entry!(
        cmd::STORE_DTR_AS_MAX_LEVEL..=cmd::STORE_DTR_AS_MAX_LEVEL,
        "Store DTR as max level",
        |_| GearCommand::StoreDtrAsMaxLevel
    ),
    entry!(
        cmd::STORE_DTR_AS_MIN_LEVEL..=cmd::STORE_DTR_AS_MIN_LEVEL,
        "Store DTR as min level",
        |_| GearCommand::StoreDtrAsMinLevel
    ),
    entry!(
        cmd::STORE_DTR_AS_SYSTEM_FAILURE_LEVEL..=cmd::STORE_DTR_AS_SYSTEM_FAILURE_LEVEL,
        "Store DTR as system failure level",
        |_| GearCommand::StoreDtrAsSystemFailureLevel
    ),
    entry!(
        cmd::STORE_DTR_AS_POWER_ON_LEVEL..=cmd::STORE_DTR_AS_POWER_ON_LEVEL,
        "Store DTR as power on level",
        |_| GearCommand::StoreDtrAsPowerOnLevel
    ),
    entry!(
        cmd::STORE_DTR_AS_FADE_TIME..=cmd::STORE_DTR_AS_FADE_TIME,
        "Store DTR as fade time",
        |_| GearCommand::StoreDtrAsFadeTime
    ),
    entry!(
        cmd::STORE_DTR_AS_FADE_RATE..=cmd::STORE_DTR_AS_FADE_RATE,
        "Store DTR as fade rate",
        |_| GearCommand::StoreDtrAsFadeRate
    ),
    entry!(
        cmd::STORE_DTR_AS_SCENE..=cmd::STORE_DTR_AS_SCENE + 15,
        "Store DTR as scene",
        |f| GearCommand::StoreDtrAsScene(offset(f))
    ),
    entry!(
        cmd::REMOVE_FROM_SCENE..=cmd::REMOVE_FROM_SCENE + 15,
        "Remove from scene",
        |f| GearCommand::RemoveFromScene(offset(f))
    ),
    entry!(
        cmd::ADD_TO_GROUP..=cmd::ADD_TO_GROUP + 15,
        "Add to group",
        |f| GearCommand::AddToGroup(offset(f))
    ),
    entry!(
        cmd::REMOVE_FROM_GROUP..=cmd::REMOVE_FROM_GROUP + 15,
        "Remove from group",
        |f| GearCommand::RemoveFromGroup(offset(f))
    ),
    entry!(
        cmd::STORE_DTR_AS_SHORT_ADDRESS..=cmd::STORE_DTR_AS_SHORT_ADDRESS,
        "Store DTR as short address",
        |_| GearCommand::StoreDtrAsShortAddress
    ),
];

static QUERY: [CommandEntry; 24] = [
    entry!(cmd::QUERY_STATUS..=cmd::QUERY_STATUS, "Query status", |_| {
        GearCommand::QueryStatus
    }),
    entry!(cmd::QUERY_BALLAST..=cmd::QUERY_BALLAST, "Query ballast", |_| {
        GearCommand::QueryBallast
    }),
    entry!(
        cmd::QUERY_LAMP_FAILURE..=cmd::QUERY_LAMP_FAILURE,
        "Query lamp failure",
        |_| GearCommand::QueryLampFailure
    ),
    entry!(
        cmd::QUERY_LAMP_POWER_ON..=cmd::QUERY_LAMP_POWER_ON,
        "Query lamp power on",
        |_| GearCommand::QueryLampPowerOn
    ),
    entry!(
        cmd::QUERY_LIMIT_ERROR..=cmd::QUERY_LIMIT_ERROR,
        "Query limit error",
        |_| GearCommand::QueryLimitError
    ),
    entry!(
        cmd::QUERY_RESET_STATE..=cmd::QUERY_RESET_STATE,
        "Query reset state",
        |_| GearCommand::QueryResetState
    ),
    entry!(
        cmd::QUERY_MISSING_SHORT_ADDRESS..=cmd::QUERY_MISSING_SHORT_ADDRESS,
        "Query missing short address",
        |_| GearCommand::QueryMissingShortAddress
    ),
    entry!(
        cmd::QUERY_VERSION_NUMBER..=cmd::QUERY_VERSION_NUMBER,
        "Query version number",
        |_| GearCommand::QueryVersionNumber
    ),
    entry!(
        cmd::QUERY_CONTENT_DTR..=cmd::QUERY_CONTENT_DTR,
        "Query content DTR",
        |_| GearCommand::QueryContentDtr
    ),
    entry!(
        cmd::QUERY_DEVICE_TYPE..=cmd::QUERY_DEVICE_TYPE,
        "Query device type",
        |_| GearCommand::QueryDeviceType
    ),
    entry!(
        cmd::QUERY_PHYSICAL_MINIMUM_LEVEL..=cmd::QUERY_PHYSICAL_MINIMUM_LEVEL,
        "Query physical minimum level",
        |_| GearCommand::QueryPhysicalMinimumLevel
    ),
    entry!(
        cmd::QUERY_POWER_FAILURE..=cmd::QUERY_POWER_FAILURE,
        "Query power failure",
        |_| GearCommand::QueryPowerFailure
    ),
    entry!(
        cmd::QUERY_ACTUAL_LEVEL..=cmd::QUERY_ACTUAL_LEVEL,
        "Query actual level",
        |_| GearCommand::QueryActualLevel
    ),
    entry!(
        cmd::QUERY_MAX_LEVEL..=cmd::QUERY_MAX_LEVEL,
        "Query max level",
        |_| GearCommand::QueryMaxLevel
    ),
    entry!(
        cmd::QUERY_MIN_LEVEL..=cmd::QUERY_MIN_LEVEL,
        "Query min level",
        |_| GearCommand::QueryMinLevel
    ),
    entry!(
        cmd::QUERY_POWER_ON_LEVEL..=cmd::QUERY_POWER_ON_LEVEL,
        "Query power on level",
        |_| GearCommand::QueryPowerOnLevel
    ),
    entry!(
        cmd::QUERY_SYSTEM_FAILURE_LEVEL..=cmd::QUERY_SYSTEM_FAILURE_LEVEL,
        "Query system failure level",
        |_| GearCommand::QuerySystemFailureLevel
    ),
    entry!(
        cmd::QUERY_FADE_SETTINGS..=cmd::QUERY_FADE_SETTINGS,
        "Query fade time/fade rate",
        |_| GearCommand::QueryFadeSettings
    ),
    entry!(
        cmd::QUERY_SCENE_LEVEL..=cmd::QUERY_SCENE_LEVEL + 15,
        "Query scene level",
        |f| GearCommand::QuerySceneLevel(offset(f))
    ),
    entry!(
        cmd::QUERY_GROUPS_0_7..=cmd::QUERY_GROUPS_0_7,
        "Query groups 0-7",
        |_| GearCommand::QueryGroups0_7
    ),
    entry!(
        cmd::QUERY_GROUPS_8_15..=cmd::QUERY_GROUPS_8_15,
        "Query groups 8-15",
        |_| GearCommand::QueryGroups8_15
    ),
    entry!(
        cmd::QUERY_RANDOM_ADDRESS_H..=cmd::QUERY_RANDOM_ADDRESS_H,
        "Query random address (H)",
        |_| GearCommand::QueryRandomAddressH
    ),
    entry!(
        cmd::QUERY_RANDOM_ADDRESS_M..=cmd::QUERY_RANDOM_ADDRESS_M,
        "Query random address (M)",
        |_| GearCommand::QueryRandomAddressM
    ),
    entry!(
        cmd::QUERY_RANDOM_ADDRESS_L..=cmd::QUERY_RANDOM_ADDRESS_L,
        "Query random address (L)",
        |_| GearCommand::QueryRandomAddressL
    ),
];

static SPECIAL: [CommandEntry; 14] = [
    entry!(cmd::TERMINATE..=cmd::TERMINATE, "Terminate", |_| {
        GearCommand::Terminate
    }),
    entry!(cmd::DTR..=cmd::DTR, "Set DTR", |f| GearCommand::Dtr(f.command)),
    entry!(cmd::INITIALISE..=cmd::INITIALISE, "Initialise", |f| {
        GearCommand::Initialise(f.command)
    }),
    entry!(cmd::RANDOMISE..=cmd::RANDOMISE, "Randomise", |_| {
        GearCommand::Randomise
    }),
    entry!(cmd::COMPARE..=cmd::COMPARE, "Compare", |_| GearCommand::Compare),
    entry!(cmd::WITHDRAW..=cmd::WITHDRAW, "Withdraw", |_| {
        GearCommand::Withdraw
    }),
    entry!(
        cmd::SEARCHADDRH..=cmd::SEARCHADDRH,
        "Search address high",
        |f| GearCommand::SearchAddressH(f.command)
    ),
    entry!(
        cmd::SEARCHADDRM..=cmd::SEARCHADDRM,
        "Search address middle",
        |f| GearCommand::SearchAddressM(f.command)
    ),
    entry!(
        cmd::SEARCHADDRL..=cmd::SEARCHADDRL,
        "Search address low",
        |f| GearCommand::SearchAddressL(f.command)
    ),
    entry!(
        cmd::PROGRAM_SHORT_ADDRESS..=cmd::PROGRAM_SHORT_ADDRESS,
        "Program short address",
        |f| GearCommand::ProgramShortAddress(f.command)
    ),
    entry!(
        cmd::VERIFY_SHORT_ADDRESS..=cmd::VERIFY_SHORT_ADDRESS,
        "Verify short address",
        |f| GearCommand::VerifyShortAddress(f.command)
    ),
    entry!(
        cmd::QUERY_SHORT_ADDRESS..=cmd::QUERY_SHORT_ADDRESS,
        "Query short address",
        |_| GearCommand::QueryShortAddress
    ),
    entry!(
        cmd::PHYSICAL_SELECTION..=cmd::PHYSICAL_SELECTION,
        "Physical selection",
        |_| GearCommand::PhysicalSelection
    ),
    entry!(
        cmd::ENABLE_DEVICE_TYPE..=cmd::ENABLE_DEVICE_TYPE,
        "Enable device type",
        |f| GearCommand::EnableDeviceType(f.command)
    ),
];

/// Table for a category and the frame byte used as key
fn table(category: CommandCategory, frame: ForwardFrame) -> (&'static [CommandEntry], u8) {
    let entries: &'static [CommandEntry] = match category {
        CommandCategory::None => &[],
        CommandCategory::DirectArcPower => &DIRECT_ARC_POWER,
        CommandCategory::IndirectArcPower => &INDIRECT_ARC_POWER,
        CommandCategory::ConfigCommand => &CONFIG,
        CommandCategory::QueryCommand => &QUERY,
        CommandCategory::SpecialCommand => &SPECIAL,
    };
    let code = match category {
        CommandCategory::SpecialCommand => frame.address,
        _ => frame.command,
    };
    (entries, code)
}

/// Find the table entry for a classified frame
pub fn lookup(category: CommandCategory, frame: ForwardFrame) -> Option<&'static CommandEntry> {
    let (entries, code) = table(category, frame);
    entries.iter().find(|e| e.codes.contains(&code))
}

/// Decode a classified frame. Unknown opcodes give `None`.
pub fn decode(category: CommandCategory, frame: ForwardFrame) -> Option<GearCommand> {
    lookup(category, frame).map(|e| e.command(frame))
}
