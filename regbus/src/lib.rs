#![cfg_attr(not(test), no_std)]

//! Register access over a chip-selected SPI link.
//!
//! Each access is a single 16 bit word exchange framed by one chip select
//! assertion. The position and width of the address, value and read flag
//! fields are described by a [`WordLayout`]. Out-of-range addresses and values
//! are masked to their field width, never rejected.

use core::marker::PhantomData;
use embedded_hal::spi::{self, SpiDevice};

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("SPI")]
    Bus(spi::ErrorKind),
}

impl<E: spi::Error> From<E> for Error {
    fn from(value: E) -> Self {
        Self::Bus(value.kind())
    }
}

/// Field layout of a 16 bit command word.
pub trait WordLayout {
    /// Bit position of the address field LSB.
    const ADDR_SHIFT: u32;
    /// Width of the address field.
    const ADDR_BITS: u32;
    /// Width of the value field, starting at bit 0.
    const VALUE_BITS: u32;
    /// Bit set in read requests.
    const READ_BIT: u32;

    const ADDR_MASK: u16 = ((1u32 << Self::ADDR_BITS) - 1) as u16;
    const VALUE_MASK: u16 = ((1u32 << Self::VALUE_BITS) - 1) as u16;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Write,
    Read,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegisterWord {
    pub addr: u8,
    pub value: u16,
    pub access: Access,
}

impl RegisterWord {
    pub const fn write(addr: u8, value: u16) -> Self {
        Self {
            addr,
            value,
            access: Access::Write,
        }
    }

    pub const fn read(addr: u8) -> Self {
        Self {
            addr,
            value: 0,
            access: Access::Read,
        }
    }

    /// Pack into the command word. Fields are truncated to their width.
    pub fn encode<L: WordLayout>(&self) -> u16 {
        let addr = (self.addr as u16 & L::ADDR_MASK) << L::ADDR_SHIFT;
        let read = match self.access {
            Access::Read => 1u16 << L::READ_BIT,
            Access::Write => 0,
        };
        addr | read | (self.value & L::VALUE_MASK)
    }

    /// Whether encoding drops any set address or value bits.
    pub fn truncates<L: WordLayout>(&self) -> bool {
        self.addr as u16 & !L::ADDR_MASK != 0 || self.value & !L::VALUE_MASK != 0
    }
}

/// Register transport bound to one chip select.
pub struct RegisterBus<B, L> {
    bus: B,
    _layout: PhantomData<L>,
}

impl<B, L> RegisterBus<B, L> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            _layout: PhantomData,
        }
    }

    pub fn free(self) -> B {
        self.bus
    }
}

impl<B: SpiDevice<u8>, L: WordLayout> RegisterBus<B, L> {
    pub fn write(&mut self, addr: u8, value: u16) -> Result<(), Error> {
        let word = RegisterWord::write(addr, value);
        if word.truncates::<L>() {
            log::debug!("Truncating register write {addr:#x} <- {value:#x}");
        }
        self.bus.write(&word.encode::<L>().to_be_bytes())?;
        Ok(())
    }

    /// Send a read request and return the value field of the word clocked
    /// in during the same transaction.
    pub fn read(&mut self, addr: u8) -> Result<u16, Error> {
        let mut rx = [0; 2];
        self.bus
            .transfer(&mut rx, &RegisterWord::read(addr).encode::<L>().to_be_bytes())?;
        Ok(u16::from_be_bytes(rx) & L::VALUE_MASK)
    }
}
