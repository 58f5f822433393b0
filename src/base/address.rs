use core::ops::RangeInclusive;
use core::str::FromStr;

/// Address byte as it appears first in a forward frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddressByte(pub u8);

/// Value used for display, normally 1 based
pub trait DisplayValue {
    fn display_value(&self) -> u8;
    fn from_display_value<A>(value: A) -> Result<Self, AddressError>
    where
        A: TryInto<u8>,
        Self: Sized;
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AddressError {
    NotShort,
    NotGroup,
    InvalidAddress,
}

impl std::fmt::Display for AddressError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        match self {
            AddressError::NotShort => write!(fmt, "Not a short address"),
            AddressError::NotGroup => write!(fmt, "Not a group address"),
            AddressError::InvalidAddress => write!(fmt, "InvalidAddress"),
        }
    }
}

impl std::error::Error for AddressError {}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Short(u8);

impl Short {
    const DISPLAY_RANGE: RangeInclusive<u8> = 1..=64;
    pub fn new(a: u8) -> Short {
        assert!(a < 64);
        Short(a)
    }

    /// Decode a stored short address byte. Anything outside 0..64 means
    /// unassigned.
    pub fn from_stored(b: u8) -> Option<Short> {
        if b < 64 {
            Some(Short(b))
        } else {
            None
        }
    }

    /// Decode the `0AAAAAA1` form used as command payload.
    pub fn from_payload(b: u8) -> Option<Short> {
        if (b & 0x81) == 0x01 {
            Some(Short(b >> 1))
        } else {
            None
        }
    }

    /// Address 0..64
    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Byte written to the store for an optional short address.
pub fn stored_short(short: Option<Short>) -> u8 {
    short.map_or(MASK, |s| s.0)
}

pub const MASK: u8 = 0xff;

impl From<Short> for AddressByte {
    fn from(short: Short) -> Self {
        AddressByte((short.0 << 1) | 1)
    }
}

impl From<Option<Short>> for AddressByte {
    fn from(short_or_mask: Option<Short>) -> AddressByte {
        if let Some(addr) = short_or_mask {
            AddressByte::from(addr)
        } else {
            AddressByte(MASK)
        }
    }
}

impl DisplayValue for Short {
    fn display_value(&self) -> u8 {
        self.0 + Self::DISPLAY_RANGE.start()
    }
    fn from_display_value<A>(a: A) -> Result<Short, AddressError>
    where
        A: TryInto<u8>,
    {
        let Ok(a) = a.try_into() else {
            return Err(AddressError::InvalidAddress);
        };
        if !Self::DISPLAY_RANGE.contains(&a) {
            return Err(AddressError::InvalidAddress);
        }
        Ok(Short(a - Self::DISPLAY_RANGE.start()))
    }
}

impl std::convert::TryFrom<Address> for Short {
    type Error = AddressError;
    fn try_from(addr: Address) -> Result<Short, Self::Error> {
        if let Address::Short(s) = addr {
            Ok(s)
        } else {
            Err(AddressError::NotShort)
        }
    }
}

impl std::fmt::Display for Short {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        self.display_value().fmt(fmt)
    }
}

impl FromStr for Short {
    type Err = AddressError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u8::from_str(s).map_or(Err(AddressError::InvalidAddress), |a| {
            Self::from_display_value(a)
        })
    }
}

/// 24 bit random/search address
pub type Long = u32;

pub const LONG_MASK: Long = 0xffffff;

/// Split a long address into its H, M and L bytes.
pub fn long_bytes(long: Long) -> [u8; 3] {
    [(long >> 16) as u8, (long >> 8) as u8, long as u8]
}

pub fn long_from_bytes(bytes: [u8; 3]) -> Long {
    ((bytes[0] as Long) << 16) | ((bytes[1] as Long) << 8) | (bytes[2] as Long)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Group(u8);

impl Group {
    pub const MAX: u8 = 16;
    pub fn new(a: u8) -> Group {
        assert!(a < Self::MAX);
        Group(a)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Bit in the 16 bit group membership mask
    pub fn mask(&self) -> u16 {
        1 << self.0
    }
}

impl std::convert::TryFrom<Address> for Group {
    type Error = AddressError;
    fn try_from(addr: Address) -> Result<Group, Self::Error> {
        if let Address::Group(g) = addr {
            Ok(g)
        } else {
            Err(AddressError::NotGroup)
        }
    }
}

impl From<Group> for AddressByte {
    fn from(group: Group) -> AddressByte {
        AddressByte((group.0 << 1) | 0x81)
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        self.0.fmt(fmt)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Address {
    Short(Short),
    Group(Group),
    Broadcast,
}

impl Address {
    /// Decode the addressing part of a forward frame. The selector bit
    /// is ignored.
    pub fn from_bus_address(bus: u8) -> Result<Address, AddressError> {
        match bus >> 1 {
            a @ 0..=0x3f => Ok(Address::Short(Short::new(a))),
            a @ 0x40..=0x4f => Ok(Address::Group(Group::new(a & 0x0f))),
            0x7f => Ok(Address::Broadcast),
            _ => Err(AddressError::InvalidAddress),
        }
    }

    /// True if a device with the given short address and group mask
    /// should act on frames sent to this address.
    pub fn matches(&self, short: Option<Short>, groups: u16) -> bool {
        match self {
            Address::Short(s) => short == Some(*s),
            Address::Group(g) => groups & g.mask() != 0,
            Address::Broadcast => true,
        }
    }
}

impl std::convert::From<Short> for Address {
    fn from(a: Short) -> Self {
        Address::Short(a)
    }
}

impl std::convert::From<Group> for Address {
    fn from(a: Group) -> Self {
        Address::Group(a)
    }
}

impl From<Address> for AddressByte {
    fn from(addr: Address) -> AddressByte {
        match addr {
            Address::Short(a) => a.into(),
            Address::Group(a) => a.into(),
            Address::Broadcast => AddressByte(0xff),
        }
    }
}
