// Opcodes understood by the control gear.
// Device commands are found in the second byte of a frame with the
// selector bit set, special commands in the first byte.

pub const YES: u8 = 0xff;

// Address byte analysis
pub const BROADCAST: u8 = 0xfe;
pub const SPECIAL_CMD_MASK: u8 = 0xe1;
pub const SPECIAL_CMD_1: u8 = 0xa1;
pub const SPECIAL_CMD_2: u8 = 0xc1;
pub const SELECTOR_BIT: u8 = 0x01;

// Indirect arc power
pub const OFF: u8 = 0x00;
pub const UP: u8 = 0x01;
pub const DOWN: u8 = 0x02;
pub const STEP_UP: u8 = 0x03;
pub const STEP_DOWN: u8 = 0x04;
pub const RECALL_MAX_LEVEL: u8 = 0x05;
pub const RECALL_MIN_LEVEL: u8 = 0x06;
pub const STEP_DOWN_AND_OFF: u8 = 0x07;
pub const ON_AND_STEP_UP: u8 = 0x08;
pub const GO_TO_SCENE: u8 = 0x10;

// Configuration, must be received twice
pub const RESET: u8 = 0x20;
pub const STORE_ACTUAL_LEVEL_IN_DTR: u8 = 0x21;
pub const STORE_DTR_AS_MAX_LEVEL: u8 = 0x2a;
pub const STORE_DTR_AS_MIN_LEVEL: u8 = 0x2b;
pub const STORE_DTR_AS_SYSTEM_FAILURE_LEVEL: u8 = 0x2c;
pub const STORE_DTR_AS_POWER_ON_LEVEL: u8 = 0x2d;
pub const STORE_DTR_AS_FADE_TIME: u8 = 0x2e;
pub const STORE_DTR_AS_FADE_RATE: u8 = 0x2f;
pub const STORE_DTR_AS_SCENE: u8 = 0x40;
pub const REMOVE_FROM_SCENE: u8 = 0x50;
pub const ADD_TO_GROUP: u8 = 0x60;
pub const REMOVE_FROM_GROUP: u8 = 0x70;
pub const STORE_DTR_AS_SHORT_ADDRESS: u8 = 0x80;

// Queries
pub const QUERY_STATUS: u8 = 0x90;
pub const QUERY_BALLAST: u8 = 0x91;
pub const QUERY_LAMP_FAILURE: u8 = 0x92;
pub const QUERY_LAMP_POWER_ON: u8 = 0x93;
pub const QUERY_LIMIT_ERROR: u8 = 0x94;
pub const QUERY_RESET_STATE: u8 = 0x95;
pub const QUERY_MISSING_SHORT_ADDRESS: u8 = 0x96;
pub const QUERY_VERSION_NUMBER: u8 = 0x97;
pub const QUERY_CONTENT_DTR: u8 = 0x98;
pub const QUERY_DEVICE_TYPE: u8 = 0x99;
pub const QUERY_PHYSICAL_MINIMUM_LEVEL: u8 = 0x9a;
pub const QUERY_POWER_FAILURE: u8 = 0x9b;
pub const QUERY_ACTUAL_LEVEL: u8 = 0xa0;
pub const QUERY_MAX_LEVEL: u8 = 0xa1;
pub const QUERY_MIN_LEVEL: u8 = 0xa2;
pub const QUERY_POWER_ON_LEVEL: u8 = 0xa3;
pub const QUERY_SYSTEM_FAILURE_LEVEL: u8 = 0xa4;
pub const QUERY_FADE_SETTINGS: u8 = 0xa5;
pub const QUERY_SCENE_LEVEL: u8 = 0xb0;
pub const QUERY_GROUPS_0_7: u8 = 0xc0;
pub const QUERY_GROUPS_8_15: u8 = 0xc1;
pub const QUERY_RANDOM_ADDRESS_H: u8 = 0xc2;
pub const QUERY_RANDOM_ADDRESS_M: u8 = 0xc3;
pub const QUERY_RANDOM_ADDRESS_L: u8 = 0xc4;

// Special commands
pub const TERMINATE: u8 = 0xa1;
pub const DTR: u8 = 0xa3;
pub const INITIALISE: u8 = 0xa5; // Twice
pub const RANDOMISE: u8 = 0xa7; // Twice
pub const COMPARE: u8 = 0xa9;
pub const WITHDRAW: u8 = 0xab;
pub const SEARCHADDRH: u8 = 0xb1;
pub const SEARCHADDRM: u8 = 0xb3;
pub const SEARCHADDRL: u8 = 0xb5;
pub const PROGRAM_SHORT_ADDRESS: u8 = 0xb7;
pub const VERIFY_SHORT_ADDRESS: u8 = 0xb9;
pub const QUERY_SHORT_ADDRESS: u8 = 0xbb;
pub const PHYSICAL_SELECTION: u8 = 0xbd;
pub const ENABLE_DEVICE_TYPE: u8 = 0xc1;

// INITIALISE payloads
pub const INITIALISE_ALL: u8 = 0x00;
pub const INITIALISE_NO_ADDR: u8 = 0xff;
