//! Non-volatile byte storage.
//!
//! The gear sees the storage as a small EEPROM: bytes read and written by
//! address, erased bytes reading as 0xff.
use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// Layout of persisted registers
pub const ADDR_INITIALIZED: u16 = 0;
pub const ADDR_POWER_ON_LEVEL: u16 = 1;
pub const ADDR_SYSTEM_FAILURE_LEVEL: u16 = 2;
pub const ADDR_MIN_LEVEL: u16 = 3;
pub const ADDR_MAX_LEVEL: u16 = 4;
pub const ADDR_FADE_RATE: u16 = 5;
pub const ADDR_FADE_TIME: u16 = 6;
pub const ADDR_SHORT_ADDRESS: u16 = 7;
pub const ADDR_RANDOM_ADDRESS_H: u16 = 8;
pub const ADDR_RANDOM_ADDRESS_M: u16 = 9;
pub const ADDR_RANDOM_ADDRESS_L: u16 = 10;
pub const ADDR_GROUP_H: u16 = 11;
pub const ADDR_GROUP_L: u16 = 12;
pub const ADDR_SCENE_0: u16 = 13;
pub const STORE_SIZE: usize = ADDR_SCENE_0 as usize + 16;

/// Written to `ADDR_INITIALIZED` once all defaults are stored
pub const INITIALIZED: u8 = 0xaa;
pub const NOT_INITIALIZED: u8 = 0x00;

const ERASED: u8 = 0xff;

#[derive(Debug)]
pub enum StoreError {
    OutOfRange(u16),
    Io(io::Error),
}

impl Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> StoreError {
        StoreError::Io(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::OutOfRange(addr) => write!(f, "Store address {} out of range", addr),
            StoreError::Io(err) => write!(f, "{}", err),
        }
    }
}

pub trait NvStore: Send {
    fn read_byte(&self, addr: u16) -> Result<u8, StoreError>;
    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), StoreError>;
}

/// Volatile image of the store
#[derive(Debug, Clone)]
pub struct MemoryStore {
    bytes: Vec<u8>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            bytes: vec![ERASED; STORE_SIZE],
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> MemoryStore {
        let mut store = MemoryStore::new();
        let n = bytes.len().min(STORE_SIZE);
        store.bytes[..n].copy_from_slice(&bytes[..n]);
        store
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NvStore for MemoryStore {
    fn read_byte(&self, addr: u16) -> Result<u8, StoreError> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(StoreError::OutOfRange(addr))
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), StoreError> {
        let b = self
            .bytes
            .get_mut(addr as usize)
            .ok_or(StoreError::OutOfRange(addr))?;
        *b = value;
        Ok(())
    }
}

/// Store backed by a file. Every write rewrites the whole image.
pub struct FileStore {
    path: PathBuf,
    image: MemoryStore,
}

impl FileStore {
    /// Open the store at `path`. A missing file gives an erased store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<FileStore, StoreError> {
        let path = path.as_ref().to_path_buf();
        let image = match fs::read(&path) {
            Ok(bytes) => MemoryStore::from_bytes(&bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => MemoryStore::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(FileStore { path, image })
    }
}

impl NvStore for FileStore {
    fn read_byte(&self, addr: u16) -> Result<u8, StoreError> {
        self.image.read_byte(addr)
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), StoreError> {
        self.image.write_byte(addr, value)?;
        fs::write(&self.path, self.image.bytes())?;
        Ok(())
    }
}
