//! Random address assignment.
//!
//! A controller puts all gear in special mode with INITIALISE, has them pick
//! random addresses and then does a binary search using the search address
//! and COMPARE. The gear with the lowest random address is given a short
//! address and withdrawn, then the search is repeated.
use super::cmd_defs as cmd;
use super::registers::{Persisted, Registers};
use super::timing::{self, SPECIAL_MODE_TIMEOUT};
use crate::base::address::{Long, Short, LONG_MASK, MASK};
use crate::utils::nv_store::NvStore;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PhysicalSelection {
    Disabled,
    // Selected by the controller, waiting for the lamp to be removed
    Requested,
    // Lamp removed while requested
    Enabled,
}

#[derive(Debug, Clone)]
pub struct Commissioning {
    // Ticks left of special mode
    special_mode_remaining: u32,
    compare_enabled: bool,
    physical_selection: PhysicalSelection,
}

impl Commissioning {
    pub fn new() -> Commissioning {
        Commissioning {
            special_mode_remaining: 0,
            compare_enabled: false,
            physical_selection: PhysicalSelection::Disabled,
        }
    }

    pub fn is_special_mode(&self) -> bool {
        self.special_mode_remaining != 0
    }

    pub fn special_mode_remaining(&self) -> u32 {
        self.special_mode_remaining
    }

    pub fn is_compare_enabled(&self) -> bool {
        self.compare_enabled
    }

    pub fn physical_selection(&self) -> PhysicalSelection {
        self.physical_selection
    }

    /// Count down special mode
    pub fn advance(&mut self, elapsed: u16) {
        if self.special_mode_remaining != 0 {
            self.special_mode_remaining =
                self.special_mode_remaining.saturating_sub(elapsed as u32);
            if self.special_mode_remaining == 0 {
                info!("Special mode timed out");
            }
        }
    }

    pub fn terminate(&mut self) {
        self.special_mode_remaining = 0;
        self.compare_enabled = false;
        self.physical_selection = PhysicalSelection::Disabled;
    }

    /// Enter special mode if `data` selects this gear: 0x00 for all gear,
    /// 0xff for gear without short address, or `0AAAAAA1` for the gear with
    /// that short address.
    pub fn initialise(&mut self, regs: &Registers, data: u8) {
        let selected = data == cmd::INITIALISE_ALL
            || (data == cmd::INITIALISE_NO_ADDR && regs.short_address.is_none())
            || (Short::from_payload(data).is_some()
                && Short::from_payload(data) == regs.short_address);
        if selected {
            info!("Entering special mode");
            self.special_mode_remaining = timing::ticks(SPECIAL_MODE_TIMEOUT);
            self.compare_enabled = true;
        }
    }

    /// Pick a new random address. `seed` should be a sample of a free
    /// running timer.
    pub fn randomise(&self, regs: &mut Registers, store: &mut dyn NvStore, seed: u16) {
        if !self.is_special_mode() {
            return;
        }
        let mut rng = StdRng::seed_from_u64(seed as u64);
        regs.random_address = rng.gen_range(0..=LONG_MASK);
        debug!("Random address {:06x}", regs.random_address);
        regs.persist(store, Persisted::RandomAddress);
    }

    /// Yes if the random address is less than or equal to the search
    /// address.
    pub fn compare(&self, regs: &Registers) -> Option<u8> {
        if self.is_special_mode() && self.compare_enabled && regs.random_address <= regs.search_address
        {
            Some(cmd::YES)
        } else {
            None
        }
    }

    pub fn withdraw(&mut self, regs: &Registers) {
        if self.is_special_mode() && regs.random_address == regs.search_address {
            debug!("Withdrawn from compare");
            self.compare_enabled = false;
        }
    }

    /// Set one byte of the search address. `shift` is 16 for H, 8 for M
    /// and 0 for L.
    pub fn set_search_address(&self, regs: &mut Registers, shift: u8, data: u8) {
        if self.is_special_mode() {
            let mask: Long = 0xff << shift;
            regs.search_address = (regs.search_address & !mask) | ((data as Long) << shift);
        }
    }

    // Selected either by search address or physically
    fn is_selected(&self, regs: &Registers) -> bool {
        (regs.random_address == regs.search_address
            && self.physical_selection == PhysicalSelection::Disabled)
            || self.physical_selection == PhysicalSelection::Enabled
    }

    pub fn program_short_address(&self, regs: &mut Registers, store: &mut dyn NvStore, data: u8) {
        if !self.is_special_mode() || !self.is_selected(regs) {
            return;
        }
        let short = if data == MASK {
            None
        } else {
            Short::from_stored(data >> 1)
        };
        info!(
            "Short address programmed: {}",
            short.map_or("none".to_string(), |s| s.to_string())
        );
        regs.set_short_address(short);
        regs.persist(store, Persisted::ShortAddress);
    }

    pub fn verify_short_address(&self, regs: &Registers, data: u8) -> Option<u8> {
        match regs.short_address {
            Some(short) if self.is_special_mode() && data >> 1 == short.value() => Some(cmd::YES),
            _ => None,
        }
    }

    pub fn query_short_address(&self, regs: &Registers) -> Option<u8> {
        if self.is_special_mode() && self.is_selected(regs) {
            Some(match regs.short_address {
                Some(short) => (short.value() << 1) | 1,
                None => MASK,
            })
        } else {
            None
        }
    }

    /// Toggle physical selection. Compare is disabled while it is active.
    pub fn physical_selection_toggle(&mut self) {
        if !self.is_special_mode() {
            return;
        }
        if self.physical_selection == PhysicalSelection::Disabled {
            self.physical_selection = PhysicalSelection::Requested;
            self.compare_enabled = false;
        } else {
            self.physical_selection = PhysicalSelection::Disabled;
            self.compare_enabled = true;
        }
    }

    /// Track the lamp failure input. Removing the lamp while physical
    /// selection is requested selects this gear.
    pub fn lamp_failure(&mut self, regs: &mut Registers, failed: bool) {
        regs.status.lamp_failure = failed;
        self.physical_selection = match (self.physical_selection, failed) {
            (PhysicalSelection::Requested, true) => PhysicalSelection::Enabled,
            (PhysicalSelection::Enabled, false) => PhysicalSelection::Requested,
            (s, _) => s,
        };
    }
}

impl Default for Commissioning {
    fn default() -> Self {
        Self::new()
    }
}
