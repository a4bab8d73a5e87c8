#![cfg_attr(not(test), no_std)]

//! MAX5864 dual 8 bit ADC/DAC.
//!
//! The mode is configured over a 3-wire control link, samples move over the
//! parallel DDR bus handled by [`stream`].

use arbitrary_int::u7;
use bitbybit::{bitenum, bitfield};
use embedded_hal::spi::{self, SpiDevice};

use regbus::{RegisterBus, WordLayout};

pub use regbus::Error;

pub mod stream;

/// SPI mode 0 at 1 MHz.
pub const SPI_MODE: spi::Mode = spi::MODE_0;
pub const SPI_FREQUENCY: u32 = 1_000_000;

/// Command byte `register << 1 | rw` followed by one data byte.
pub struct Layout;

impl WordLayout for Layout {
    const ADDR_SHIFT: u32 = 9;
    const ADDR_BITS: u32 = 7;
    const VALUE_BITS: u32 = 8;
    const READ_BIT: u32 = 8;
}

#[bitenum(u7, exhaustive = false)]
#[derive(PartialEq, Debug)]
pub enum Addr {
    Control = 0x00,
    Status = 0x01,
}

#[bitfield(u8, default = 0)]
#[derive(Debug, PartialEq)]
pub struct Control {
    #[bit(0, rw)]
    pub adc_enable: bool,
    #[bit(1, rw)]
    pub dac_enable: bool,
}

pub struct Max5864<B> {
    bus: RegisterBus<B, Layout>,
    control: Control,
}

impl<B: SpiDevice<u8>> Max5864<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus: RegisterBus::new(bus),
            control: Control::default(),
        }
    }

    /// Bits above the data byte are dropped.
    pub fn write(&mut self, addr: u7, value: u16) -> Result<(), Error> {
        self.bus.write(addr.value(), value)
    }

    pub fn read(&mut self, addr: u7) -> Result<u8, Error> {
        Ok(self.bus.read(addr.value())? as u8)
    }

    pub fn control(&self) -> Control {
        self.control
    }

    pub fn set_control(&mut self, control: Control) -> Result<(), Error> {
        self.write(Addr::Control.raw_value(), control.raw_value() as u16)?;
        self.control = control;
        Ok(())
    }

    pub fn set_mode(
        &mut self,
        adc_enable: bool,
        dac_enable: bool,
    ) -> Result<(), Error> {
        self.set_control(
            Control::builder()
                .with_adc_enable(adc_enable)
                .with_dac_enable(dac_enable)
                .build(),
        )?;
        log::info!("MAX5864 mode: ADC {adc_enable}, DAC {dac_enable}");
        Ok(())
    }

    pub fn status(&mut self) -> Result<u8, Error> {
        self.read(Addr::Status.raw_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::spi::{ErrorType, Operation};
    use std::{cell::RefCell, rc::Rc, vec::Vec};

    /// Records command/data byte pairs and answers reads with `response`.
    #[derive(Default, Clone)]
    struct Recorder {
        frames: Rc<RefCell<Vec<[u8; 2]>>>,
        response: u8,
    }

    impl ErrorType for Recorder {
        type Error = Infallible;
    }

    impl SpiDevice for Recorder {
        fn transaction(
            &mut self,
            operations: &mut [Operation<'_, u8>],
        ) -> Result<(), Infallible> {
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(w) => {
                        self.frames.borrow_mut().push([w[0], w[1]])
                    }
                    Operation::Transfer(r, w) => {
                        self.frames.borrow_mut().push([w[0], w[1]]);
                        r.copy_from_slice(&[0xff, self.response]);
                    }
                    _ => unreachable!(),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn set_mode() {
        let spi = Recorder::default();
        let frames = spi.frames.clone();
        let mut dev = Max5864::new(spi);
        dev.set_mode(true, true).unwrap();
        dev.set_mode(true, false).unwrap();
        dev.set_mode(false, true).unwrap();
        assert_eq!(*frames.borrow(), [[0x00, 0x03], [0x00, 0x01], [0x00, 0x02]]);
        assert!(!dev.control().adc_enable());
        assert!(dev.control().dac_enable());
    }

    #[test]
    fn status() {
        let spi = Recorder {
            response: 0x42,
            ..Default::default()
        };
        let frames = spi.frames.clone();
        let mut dev = Max5864::new(spi);
        assert_eq!(dev.status().unwrap(), 0x42);
        assert_eq!(*frames.borrow(), [[0x03, 0x00]]);
    }

    #[test]
    fn command_byte() {
        let spi = Recorder::default();
        let frames = spi.frames.clone();
        let mut dev = Max5864::new(spi);
        dev.write(u7::new(0x45), 0x1a5).unwrap();
        assert_eq!(*frames.borrow(), [[0x8a, 0xa5]]);
    }
}
