//! Shared mock bus for unit tests
//!
//! Register map keyed by (device, register), with scriptable failing
//! addresses and a journal of writes for asserting on heater traffic.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use thermion_hal::{BusAddr, BusError, BusReg, BusResult, ByteOrder, RegisterBus};

#[derive(Default)]
pub(crate) struct MockBus {
    regs: RefCell<HashMap<(u8, u8), u16>>,
    failing: RefCell<HashSet<u8>>,
    writes: RefCell<Vec<(u8, u8, u16)>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a register value
    pub fn set(&self, addr: u8, reg: u8, value: u16) {
        self.regs.borrow_mut().insert((addr, reg), value);
    }

    /// Make every transfer to `addr` fail with a NACK
    pub fn fail(&self, addr: u8) {
        self.failing.borrow_mut().insert(addr);
    }

    /// All writes performed, in order
    pub fn writes(&self) -> Vec<(u8, u8, u16)> {
        self.writes.borrow().clone()
    }

    /// Last write to a given (device, register), if any
    pub fn last_write(&self, addr: u8, reg: u8) -> Option<u16> {
        self.writes
            .borrow()
            .iter()
            .rev()
            .find(|(a, r, _)| *a == addr && *r == reg)
            .map(|(_, _, v)| *v)
    }
}

impl RegisterBus for MockBus {
    fn read_u16(&self, addr: BusAddr, reg: BusReg, _order: ByteOrder) -> BusResult<u16> {
        if self.failing.borrow().contains(&addr.0) {
            return Err(BusError::NoAck(addr));
        }
        self.regs
            .borrow()
            .get(&(addr.0, reg.0))
            .copied()
            .ok_or(BusError::NoAck(addr))
    }

    fn write_u16(&self, addr: BusAddr, reg: BusReg, value: u16, _order: ByteOrder) -> BusResult<()> {
        if self.failing.borrow().contains(&addr.0) {
            return Err(BusError::NoAck(addr));
        }
        self.writes.borrow_mut().push((addr.0, reg.0, value));
        self.regs.borrow_mut().insert((addr.0, reg.0), value);
        Ok(())
    }
}
