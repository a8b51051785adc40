//! Linux implementation of the Thermion bus traits
//!
//! Talks to `/dev/i2c-N` through the kernel's i2c-dev interface. Each
//! register operation opens the device node, performs a single 2-byte
//! SMBus block transfer, and drops the handle, so the bus is never held
//! across logical operations. Callers sharing one physical bus from
//! multiple threads must still serialize access externally; the kernel
//! interface is not reentrant per file handle.

#![deny(unsafe_code)]

use std::path::Path;

use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
use log::{debug, warn};

use thermion_hal::{BusAddr, BusError, BusReg, BusResult, ByteOrder, RegisterBus};

// Linux errno values relevant to i2c-dev transfers
const ENXIO: i32 = 6; // no such device or address (address NACK)
const EAGAIN: i32 = 11; // bus arbitration lost
const EBUSY: i32 = 16; // bus in use
const ENODEV: i32 = 19; // adapter went away
const ETIMEDOUT: i32 = 110;
const EREMOTEIO: i32 = 121; // data NACK

/// An I2C bus identified by its kernel index
///
/// Holds no open file handle; the device node is opened per call.
#[derive(Debug, Clone, Copy)]
pub struct LinuxI2cBus {
    id: u8,
}

impl LinuxI2cBus {
    pub fn new(id: u8) -> Self {
        LinuxI2cBus { id }
    }

    /// Device node path, e.g. `/dev/i2c-1`
    pub fn path(&self) -> String {
        format!("/dev/i2c-{}", self.id)
    }

    /// Whether the device node exists on this host
    pub fn exists(&self) -> bool {
        Path::new(&self.path()).exists()
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    fn open(&self, addr: BusAddr) -> BusResult<LinuxI2CDevice> {
        LinuxI2CDevice::new(self.path(), u16::from(addr.0))
            .map_err(|e| map_bus_error(addr, e))
    }
}

fn map_bus_error(addr: BusAddr, err: LinuxI2CError) -> BusError {
    let io = std::io::Error::from(err);
    match io.raw_os_error() {
        Some(ENXIO) | Some(ENODEV) | Some(EREMOTEIO) => BusError::NoAck(addr),
        Some(ETIMEDOUT) => BusError::Timeout,
        Some(EBUSY) | Some(EAGAIN) => BusError::Busy,
        _ => BusError::Transport(io.to_string()),
    }
}

impl RegisterBus for LinuxI2cBus {
    fn read_u16(&self, addr: BusAddr, reg: BusReg, order: ByteOrder) -> BusResult<u16> {
        let mut dev = self.open(addr)?;
        let data = dev
            .smbus_read_i2c_block_data(reg.0, 2)
            .map_err(|e| map_bus_error(addr, e))?;
        if data.len() != 2 {
            warn!(
                "i2c{}: short read from {} reg {}: {} bytes",
                self.id,
                addr,
                reg,
                data.len()
            );
            return Err(BusError::Transport(format!(
                "short read: {} bytes",
                data.len()
            )));
        }
        let value = order.decode_u16([data[0], data[1]]);
        debug!("i2c{}: read {} reg {} -> {}", self.id, addr, reg, value);
        Ok(value)
    }

    fn write_u16(
        &self,
        addr: BusAddr,
        reg: BusReg,
        value: u16,
        order: ByteOrder,
    ) -> BusResult<()> {
        let mut dev = self.open(addr)?;
        let data = order.encode_u16(value);
        debug!("i2c{}: write {} reg {} <- {}", self.id, addr, reg, value);
        dev.smbus_write_i2c_block_data(reg.0, &data)
            .map_err(|e| map_bus_error(addr, e))
    }
}
