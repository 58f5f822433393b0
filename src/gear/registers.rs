use crate::base::address::{self, Long, Short, LONG_MASK, MASK};
use crate::base::status::GearStatus;
use crate::config::GearConfig;
use crate::utils::nv_store::{self as nv, NvStore, StoreError};
use log::{info, warn};

/// A register that is kept in the non-volatile store
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Persisted {
    PowerOnLevel,
    SystemFailureLevel,
    MinLevel,
    MaxLevel,
    FadeRate,
    FadeTime,
    ShortAddress,
    RandomAddress,
    Group,
    Scene(u8),
}

/// Register set of the control gear
#[derive(Debug, Clone, PartialEq)]
pub struct Registers {
    // Last received frame
    pub address_byte: u8,
    pub command_byte: u8,

    pub dtr: u8,
    pub actual_level: u8,
    pub power_on_level: u8,
    pub system_failure_level: u8,
    pub min_level: u8,
    pub max_level: u8,
    pub fade_rate: u8,
    pub fade_time: u8,
    pub short_address: Option<Short>,
    pub search_address: Long,
    pub random_address: Long,
    // Bit n set if member of group n
    pub group: u16,
    pub scene: [u8; 16],
    pub status: GearStatus,
}

impl Registers {
    /// Reset values, as mandated by the standard
    pub fn new(config: &GearConfig) -> Registers {
        Registers {
            address_byte: 0,
            command_byte: 0,
            dtr: 0,
            actual_level: 0xfe,
            power_on_level: 0xfe,
            system_failure_level: 0xfe,
            min_level: config.physical_min_level,
            max_level: 0xfe,
            fade_rate: 0x07,
            fade_time: 0x00,
            short_address: None,
            search_address: LONG_MASK,
            random_address: LONG_MASK,
            group: 0x0000,
            scene: [MASK; 16],
            status: GearStatus {
                power_failure: true,
                missing_short_address: true,
                reset_state: true,
                lamp_on: true,
                ..Default::default()
            },
        }
    }

    /// Create the register set at power up.
    ///
    /// If the store has been initialized the persisted registers are
    /// restored, otherwise the reset values are written to it. A store that
    /// can't be read or holds values out of range is treated as never
    /// written. `short_address` is kept
    /// when the store is written.
    pub fn initialize(
        config: &GearConfig,
        store: &mut dyn NvStore,
        short_address: Option<Short>,
    ) -> Registers {
        let mut regs = Registers::new(config);
        regs.short_address = short_address;
        let restored = match regs.restore(store) {
            Ok(true) if regs.is_consistent() => true,
            Ok(true) => {
                warn!("Store contents out of range");
                false
            }
            Ok(false) => {
                info!("Store not initialized");
                false
            }
            Err(e) => {
                warn!("Failed to read store: {}", e);
                false
            }
        };
        if restored {
            info!("Registers restored from store");
            regs.status.reset_state = false;
        } else {
            info!("Writing reset values to store");
            regs = Registers::new(config);
            regs.short_address = short_address;
            regs.write_all(store);
        }
        regs.status.missing_short_address = regs.short_address.is_none();
        regs.actual_level = regs.power_on_level;
        regs
    }

    fn restore(&mut self, store: &dyn NvStore) -> Result<bool, StoreError> {
        if store.read_byte(nv::ADDR_INITIALIZED)? != nv::INITIALIZED {
            return Ok(false);
        }
        // Read everything before touching the registers
        let mut image = [0u8; nv::STORE_SIZE];
        for (addr, b) in image.iter_mut().enumerate() {
            *b = store.read_byte(addr as u16)?;
        }
        let byte = |addr: u16| image[addr as usize];
        self.power_on_level = byte(nv::ADDR_POWER_ON_LEVEL);
        self.system_failure_level = byte(nv::ADDR_SYSTEM_FAILURE_LEVEL);
        self.min_level = byte(nv::ADDR_MIN_LEVEL);
        self.max_level = byte(nv::ADDR_MAX_LEVEL);
        self.fade_rate = byte(nv::ADDR_FADE_RATE);
        self.fade_time = byte(nv::ADDR_FADE_TIME);
        self.short_address = Short::from_stored(byte(nv::ADDR_SHORT_ADDRESS));
        self.random_address = address::long_from_bytes([
            byte(nv::ADDR_RANDOM_ADDRESS_H),
            byte(nv::ADDR_RANDOM_ADDRESS_M),
            byte(nv::ADDR_RANDOM_ADDRESS_L),
        ]);
        self.group = ((byte(nv::ADDR_GROUP_H) as u16) << 8) | byte(nv::ADDR_GROUP_L) as u16;
        for (n, scene) in self.scene.iter_mut().enumerate() {
            *scene = byte(nv::ADDR_SCENE_0 + n as u16);
        }
        Ok(true)
    }

    // Restored levels and fade settings must be something the settings
    // commands could have produced
    fn is_consistent(&self) -> bool {
        self.min_level != 0
            && self.min_level < self.max_level
            && self.max_level <= 0xfe
            && self.power_on_level <= 0xfe
            && self.fade_time <= 0x0f
            && (1..=0x0f).contains(&self.fade_rate)
    }

    fn write_all(&self, store: &mut dyn NvStore) {
        self.persist(store, Persisted::PowerOnLevel);
        self.persist(store, Persisted::SystemFailureLevel);
        self.persist(store, Persisted::MinLevel);
        self.persist(store, Persisted::MaxLevel);
        self.persist(store, Persisted::FadeRate);
        self.persist(store, Persisted::FadeTime);
        self.persist(store, Persisted::ShortAddress);
        self.persist(store, Persisted::RandomAddress);
        self.persist(store, Persisted::Group);
        for n in 0..16 {
            self.persist(store, Persisted::Scene(n));
        }
        // Last, so an interrupted write is redone on next power up
        write_logged(store, nv::ADDR_INITIALIZED, nv::INITIALIZED);
    }

    /// Write one register to the store. Failures are logged, the register
    /// keeps its new value.
    pub fn persist(&self, store: &mut dyn NvStore, reg: Persisted) {
        match reg {
            Persisted::PowerOnLevel => {
                write_logged(store, nv::ADDR_POWER_ON_LEVEL, self.power_on_level)
            }
            Persisted::SystemFailureLevel => write_logged(
                store,
                nv::ADDR_SYSTEM_FAILURE_LEVEL,
                self.system_failure_level,
            ),
            Persisted::MinLevel => write_logged(store, nv::ADDR_MIN_LEVEL, self.min_level),
            Persisted::MaxLevel => write_logged(store, nv::ADDR_MAX_LEVEL, self.max_level),
            Persisted::FadeRate => write_logged(store, nv::ADDR_FADE_RATE, self.fade_rate),
            Persisted::FadeTime => write_logged(store, nv::ADDR_FADE_TIME, self.fade_time),
            Persisted::ShortAddress => write_logged(
                store,
                nv::ADDR_SHORT_ADDRESS,
                address::stored_short(self.short_address),
            ),
            Persisted::RandomAddress => {
                let [h, m, l] = address::long_bytes(self.random_address);
                write_logged(store, nv::ADDR_RANDOM_ADDRESS_H, h);
                write_logged(store, nv::ADDR_RANDOM_ADDRESS_M, m);
                write_logged(store, nv::ADDR_RANDOM_ADDRESS_L, l);
            }
            Persisted::Group => {
                write_logged(store, nv::ADDR_GROUP_H, (self.group >> 8) as u8);
                write_logged(store, nv::ADDR_GROUP_L, self.group as u8);
            }
            Persisted::Scene(n) => {
                let n = n & 0x0f;
                write_logged(store, nv::ADDR_SCENE_0 + n as u16, self.scene[n as usize]);
            }
        }
    }

    /// Mark the store as not initialized, so the next initialization
    /// writes reset values.
    pub fn invalidate_store(store: &mut dyn NvStore) {
        write_logged(store, nv::ADDR_INITIALIZED, nv::NOT_INITIALIZED);
    }

    pub fn set_short_address(&mut self, short: Option<Short>) {
        self.short_address = short;
        self.status.missing_short_address = short.is_none();
    }

    /// Level handed to the output stage.
    ///
    /// A level below the minimum level means that the lamp is off. A level
    /// above the maximum level is clamped to it.
    pub fn output_level(&mut self) -> u8 {
        if self.actual_level >= self.min_level {
            if self.actual_level > self.max_level {
                self.actual_level = self.max_level;
            }
            self.status.lamp_on = true;
            self.actual_level
        } else {
            self.status.lamp_on = false;
            0
        }
    }
}

fn write_logged(store: &mut dyn NvStore, addr: u16, value: u8) {
    if let Err(e) = store.write_byte(addr, value) {
        warn!("Failed to write {:02x} to store address {}: {}", value, addr, e);
    }
}
