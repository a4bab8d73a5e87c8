//! DDR I/Q sample streaming.
//!
//! One period of the shared sample clock carries one sample pair: I is valid
//! while the clock is low and Q while it is high. The converter samples
//! phase-locked to this convention, so every transfer strategy must keep it.
//!
//! Two strategies implement [`IqStream`]:
//! * [`HardwareStream`]: a clocked shift engine runs fixed micro-programs and
//!   software moves whole 16 bit words through its bounded FIFOs.
//! * [`ManualStream`]: bit-level pin toggling and clock polling from the
//!   calling thread.

use bitbybit::bitfield;
use embedded_hal::digital::{self, InputPin, OutputPin};
use serde::{Deserialize, Serialize};

mod hardware;
mod manual;

pub use hardware::*;
pub use manual::*;

#[cfg(test)]
mod sim;

/// One I/Q pair as carried on the wire: `I << 8 | Q`, MSB first.
#[bitfield(u16, default = 0)]
#[derive(Debug, PartialEq, Eq)]
pub struct Sample {
    #[bits(8..=15, rw)]
    pub i: u8,
    #[bits(0..=7, rw)]
    pub q: u8,
}

impl Sample {
    pub fn from_iq(i: u8, q: u8) -> Self {
        Self::new_with_raw_value(((i as u16) << 8) | q as u16)
    }
}

/// Transfer strategy, fixed for the lifetime of a stream.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum StreamMode {
    #[default]
    Hardware,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Not supported in {0:?} mode")]
    Unsupported(StreamMode),
    #[error("Sample clock {0} Hz out of range")]
    SampleClock(u32),
    #[error("Timed out waiting for a clock edge")]
    Timeout,
    #[error("Pin")]
    Pin(digital::ErrorKind),
}

impl<E: digital::Error> From<E> for Error {
    fn from(value: E) -> Self {
        Self::Pin(value.kind())
    }
}

/// Blocking sample transfer.
pub trait IqStream {
    fn mode(&self) -> StreamMode;

    /// Send one sample pair, blocking while the link cannot take it.
    fn transmit(&mut self, sample: Sample) -> Result<(), Error>;

    /// Block until one sample pair has been received.
    fn receive(&mut self) -> Result<Sample, Error>;

    /// Send a block of sample pairs.
    ///
    /// Only [`StreamMode::Hardware`] supports this.
    fn send_buffer(&mut self, samples: &[Sample]) -> Result<(), Error> {
        log::warn!(
            "Bulk transfer of {} samples unsupported in {:?} mode",
            samples.len(),
            self.mode()
        );
        Err(Error::Unsupported(self.mode()))
    }
}

/// Stream with the strategy selected at construction.
pub enum Stream<E, C, O, I> {
    Hardware(HardwareStream<E>),
    Manual(ManualStream<C, O, I>),
}

impl<E, C, O, I> IqStream for Stream<E, C, O, I>
where
    E: ShiftEngine,
    C: OutputPin + InputPin,
    O: OutputPin,
    I: InputPin,
{
    fn mode(&self) -> StreamMode {
        match self {
            Self::Hardware(s) => s.mode(),
            Self::Manual(s) => s.mode(),
        }
    }

    fn transmit(&mut self, sample: Sample) -> Result<(), Error> {
        match self {
            Self::Hardware(s) => s.transmit(sample),
            Self::Manual(s) => s.transmit(sample),
        }
    }

    fn receive(&mut self) -> Result<Sample, Error> {
        match self {
            Self::Hardware(s) => s.receive(),
            Self::Manual(s) => s.receive(),
        }
    }

    fn send_buffer(&mut self, samples: &[Sample]) -> Result<(), Error> {
        match self {
            Self::Hardware(s) => s.send_buffer(samples),
            Self::Manual(s) => s.send_buffer(samples),
        }
    }
}
