//! Register-level I2C bus abstraction
//!
//! All devices on the payload board expose 16-bit registers, so the bus
//! contract is a pair of 16-bit transfers with an explicit byte order.
//! Retry policy belongs to the caller; an adapter performs exactly one
//! transfer per call and never holds the bus open between calls.

use std::fmt;

/// 7-bit I2C device address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BusAddr(pub u8);

impl fmt::Display for BusAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// Register (or command byte) within a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusReg(pub u8);

impl fmt::Display for BusReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

// The MSP430 maps its ADC inputs to registers by channel address
impl From<BusAddr> for BusReg {
    fn from(addr: BusAddr) -> Self {
        BusReg(addr.0)
    }
}

/// Byte order of a 16-bit register transfer
///
/// The MSP430 controller speaks little-endian; the ADS7828 and MAX31725
/// return big-endian conversion results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// Decode a 2-byte transfer into an unsigned 16-bit value
    pub fn decode_u16(&self, raw: [u8; 2]) -> u16 {
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(raw),
            ByteOrder::BigEndian => u16::from_be_bytes(raw),
        }
    }

    /// Encode an unsigned 16-bit value for a 2-byte transfer
    pub fn encode_u16(&self, value: u16) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
        }
    }
}

/// Errors that can occur on a bus transfer
///
/// Transport failures are always recoverable from the board's point of
/// view: callers collapse them to a diagnostic value (NaN, `Unknown`,
/// `None`) at the boundary where they occur.
#[derive(Debug)]
pub enum BusError {
    /// Device did not acknowledge its address
    NoAck(BusAddr),
    /// Transfer timed out
    Timeout,
    /// Bus unavailable or held by another master
    Busy,
    /// Underlying transport failure
    Transport(String),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::NoAck(addr) => write!(f, "no ACK from device {addr}"),
            BusError::Timeout => write!(f, "bus transfer timed out"),
            BusError::Busy => write!(f, "bus busy"),
            BusError::Transport(msg) => write!(f, "bus transport error: {msg}"),
        }
    }
}

impl std::error::Error for BusError {}

/// Result type for bus operations
pub type BusResult<T> = Result<T, BusError>;

/// 16-bit register access on an I2C bus
///
/// Implementations must acquire and release the bus within each call so
/// that a handle never leaks across logical operations. No retries: a
/// failed transfer surfaces as a [`BusError`] and the caller decides.
pub trait RegisterBus {
    /// Read an unsigned 16-bit register
    ///
    /// # Arguments
    /// * `addr` - 7-bit device address
    /// * `reg` - register or command byte
    /// * `order` - byte order of the 2-byte payload
    fn read_u16(&self, addr: BusAddr, reg: BusReg, order: ByteOrder) -> BusResult<u16>;

    /// Write an unsigned 16-bit register
    fn write_u16(&self, addr: BusAddr, reg: BusReg, value: u16, order: ByteOrder)
        -> BusResult<()>;

    /// Read a signed 16-bit register (two's-complement reinterpretation)
    fn read_i16(&self, addr: BusAddr, reg: BusReg, order: ByteOrder) -> BusResult<i16> {
        self.read_u16(addr, reg, order).map(|v| v as i16)
    }
}
