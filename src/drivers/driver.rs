use std::fmt;

/// A decoded 16 bit forward frame
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ForwardFrame {
    pub address: u8,
    pub command: u8,
}

impl ForwardFrame {
    pub const fn new(address: u8, command: u8) -> ForwardFrame {
        ForwardFrame { address, command }
    }

    pub const fn to_bits(self) -> u16 {
        ((self.address as u16) << 8) | self.command as u16
    }

    pub const fn from_bits(bits: u16) -> ForwardFrame {
        ForwardFrame {
            address: (bits >> 8) as u8,
            command: bits as u8,
        }
    }
}

impl fmt::Display for ForwardFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x} {:02x}", self.address, self.command)
    }
}

/// Bus side of the hardware. Reception is handled by the receive
/// interrupt posting to a [`FrameLatch`](super::frame_latch::FrameLatch).
pub trait BusDriver {
    /// Level of the bus line. The idle state is high, a low line means
    /// that no bus is present.
    fn bus_idle_high(&mut self) -> bool;
    /// Start transmission of a backward frame.
    fn transmit(&mut self, answer: u8);
}

pub trait Clock {
    /// Sample of a free running timer. Only used as a random seed.
    fn timer_sample(&self) -> u16;
    /// Block the caller for `ticks` milliseconds.
    ///
    /// The delay always runs to completion, there is no way of cancelling
    /// it. The tick source keeps counting while blocked.
    fn sleep_ticks(&mut self, ticks: u16);
}

pub trait GearDriver: BusDriver + Clock + Send {}

impl<T> GearDriver for T where T: BusDriver + Clock + Send {}

#[test]
fn frame_bits() {
    let f = ForwardFrame::new(0xa5, 0x01);
    assert_eq!(f.to_bits(), 0xa501);
    assert_eq!(ForwardFrame::from_bits(0xa501), f);
    assert_eq!(f.to_string(), "a5 01");
}
