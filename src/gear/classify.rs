use super::cmd_defs as cmd;
use super::timing::{self, SEND_TWICE_WINDOW};
use crate::base::address::{Address, Short};
use crate::drivers::driver::ForwardFrame;
use log::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommandCategory {
    None,
    DirectArcPower,
    ConfigCommand,
    QueryCommand,
    SpecialCommand,
    IndirectArcPower,
}

#[derive(Debug, Copy, Clone)]
struct Pending {
    frame: ForwardFrame,
    // Ticks left of the confirmation window
    remaining: u32,
}

/// Turns received frames into command categories.
///
/// Configuration commands, INITIALISE and RANDOMISE only take effect when
/// the identical frame is received twice within 100ms. The first frame is
/// kept here until confirmed, replaced or timed out.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    pending: Option<Pending>,
}

pub fn is_special(address: u8) -> bool {
    let a = address & cmd::SPECIAL_CMD_MASK;
    a == cmd::SPECIAL_CMD_1 || a == cmd::SPECIAL_CMD_2
}

/// Category of a frame, ignoring confirmation. Second value is true if
/// the frame must be confirmed.
fn category(frame: ForwardFrame, short: Option<Short>, groups: u16) -> (CommandCategory, bool) {
    if is_special(frame.address) {
        let twice = frame.address == cmd::INITIALISE || frame.address == cmd::RANDOMISE;
        return (CommandCategory::SpecialCommand, twice);
    }
    let accepted = match Address::from_bus_address(frame.address) {
        Ok(addr) => addr.matches(short, groups),
        Err(_) => false,
    };
    if !accepted {
        return (CommandCategory::None, false);
    }
    if frame.address & cmd::SELECTOR_BIT == 0 {
        return (CommandCategory::DirectArcPower, false);
    }
    match frame.command {
        c if c < cmd::RESET => (CommandCategory::IndirectArcPower, false),
        c if c <= cmd::STORE_DTR_AS_SHORT_ADDRESS => (CommandCategory::ConfigCommand, true),
        c if c <= cmd::QUERY_RANDOM_ADDRESS_L => (CommandCategory::QueryCommand, false),
        _ => (CommandCategory::None, false),
    }
}

impl Classifier {
    pub fn new() -> Classifier {
        Classifier { pending: None }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Advance the confirmation window
    pub fn advance(&mut self, elapsed: u16) {
        if let Some(p) = &mut self.pending {
            p.remaining = p.remaining.saturating_sub(elapsed as u32);
            if p.remaining == 0 {
                debug!("Confirmation of {} timed out", p.frame);
                self.pending = None;
            }
        }
    }

    /// Classify a frame for a gear with the given short address and group
    /// mask.
    pub fn classify(
        &mut self,
        frame: ForwardFrame,
        short: Option<Short>,
        groups: u16,
    ) -> CommandCategory {
        let (category, twice) = category(frame, short, groups);
        // Any other frame cancels a pending confirmation
        let pending = self.pending.take();
        if !twice {
            return category;
        }
        match pending {
            Some(p) if p.frame == frame => {
                debug!("{} confirmed", frame);
                category
            }
            Some(p) => {
                debug!("{} cancelled by {}", p.frame, frame);
                CommandCategory::None
            }
            None => {
                self.pending = Some(Pending {
                    frame,
                    remaining: timing::ticks(SEND_TWICE_WINDOW),
                });
                CommandCategory::None
            }
        }
    }
}
