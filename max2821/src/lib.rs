#![cfg_attr(not(test), no_std)]

use arbitrary_int::{u12, u24};
use bitbybit::{bitenum, bitfield};
use embedded_hal::spi::{self, SpiDevice};
use serde::{Deserialize, Serialize};

use regbus::{RegisterBus, WordLayout};

pub use regbus::Error;

/// SPI mode 0 at 1 MHz.
pub const SPI_MODE: spi::Mode = spi::MODE_0;
pub const SPI_FREQUENCY: u32 = 1_000_000;

/// Synthesizer reference clock in MHz.
pub const REFERENCE: f32 = 20.0;

/// 16 bit words: `addr << 12 | value`, reads set bit 15.
///
/// The read flag shares bit 15 with the address MSB.
pub struct Layout;

impl WordLayout for Layout {
    const ADDR_SHIFT: u32 = 12;
    const ADDR_BITS: u32 = 4;
    const VALUE_BITS: u32 = 12;
    const READ_BIT: u32 = 15;
}

#[bitenum(u4, exhaustive = false)]
#[derive(PartialEq, Debug)]
pub enum Addr {
    TxA = 0x0,
    TxB = 0x1,
    Lpf = 0x2,
    Shutdown = 0x3,
    RxA = 0x4,
    RxB = 0x5,
    SynA = 0x6,
    SynB = 0x7,
    SynC = 0x8,
    SynD = 0x9,
    SynE = 0xa,
    Test = 0xb,
}

#[bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum TxGain {
    Db0 = 0,
    Db2 = 1,
    Db4 = 2,
    Db6 = 3,
}

#[bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum TxBias {
    Ma1_5 = 0,
    Ma2_0 = 1,
    Ma2_5 = 2,
    Ma3_0 = 3,
}

#[bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum RxGain {
    Db0 = 0,
    Db15 = 1,
    Db30 = 2,
    Db45 = 3,
}

#[bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum LnaGain {
    Low = 0,
    Medium = 1,
    High = 2,
    Max = 3,
}

/// Baseband low-pass filter corner.
#[bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum Bandwidth {
    Mhz7 = 0,
    Mhz11 = 1,
    Mhz14 = 2,
    Mhz18 = 3,
}

#[bitenum(u2, exhaustive = true)]
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum ChargePump {
    Low = 0,
    Medium = 1,
    High = 2,
    Max = 3,
}

#[bitfield(u12, default = 0)]
#[derive(Debug, PartialEq)]
pub struct TxA {
    #[bits(0..=1, rw)]
    pub gain: TxGain,
    #[bits(2..=3, rw)]
    pub bias: TxBias,
}

#[bitfield(u12, default = 0)]
#[derive(Debug, PartialEq)]
pub struct RxA {
    #[bits(0..=1, rw)]
    pub gain: RxGain,
    #[bits(2..=3, rw)]
    pub lna: LnaGain,
}

#[bitfield(u12, default = 0)]
#[derive(Debug, PartialEq)]
pub struct Lpf {
    #[bits(0..=1, rw)]
    pub bandwidth: Bandwidth,
}

#[bitfield(u12, default = 0)]
#[derive(Debug, PartialEq)]
pub struct Shutdown {
    #[bit(0, rw)]
    pub shutdown: bool,
}

#[bitfield(u12, default = 0)]
#[derive(Debug, PartialEq)]
pub struct SynD {
    #[bits(0..=1, rw)]
    pub charge_pump: ChargePump,
}

/// Synthesizer integer divider and fractional remainder.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Divider {
    pub n: u12,
    pub frac: u24,
}

/// Divider for `frequency` against `reference` (both MHz).
///
/// `n = trunc(f / ref)`, `frac = trunc((f mod ref) * 1000)`, both wrapped to
/// their register width. This is a simplified model of the synthesizer, not the
/// datasheet PLL equations.
pub fn frequency_to_divider(frequency: f32, reference: f32) -> Divider {
    let n = (frequency / reference) as u32;
    let frac = ((frequency % reference) * 1000.0) as u32;
    Divider {
        n: u12::new((n & u12::MASK as u32) as u16),
        frac: u24::new(frac & u24::MASK),
    }
}

pub struct Max2821<B> {
    bus: RegisterBus<B, Layout>,
    reference: f32,
    tx_a: TxA,
    rx_a: RxA,
    lpf: Lpf,
    shutdown: Shutdown,
    syn_d: SynD,
}

impl<B: SpiDevice<u8>> Max2821<B> {
    /// The shadow registers start out zeroed, nothing is written.
    pub fn new(bus: B, reference: f32) -> Self {
        Self {
            bus: RegisterBus::new(bus),
            reference,
            tx_a: TxA::default(),
            rx_a: RxA::default(),
            lpf: Lpf::default(),
            shutdown: Shutdown::default(),
            syn_d: SynD::default(),
        }
    }

    /// Bits above the 12 bit value field are dropped.
    pub fn write(&mut self, addr: Addr, value: u16) -> Result<(), Error> {
        self.bus.write(addr.raw_value().value(), value)
    }

    pub fn read(&mut self, addr: Addr) -> Result<u12, Error> {
        Ok(u12::new(self.bus.read(addr.raw_value().value())?))
    }

    pub fn reference(&self) -> f32 {
        self.reference
    }

    pub fn tx_a(&self) -> TxA {
        self.tx_a
    }

    pub fn rx_a(&self) -> RxA {
        self.rx_a
    }

    pub fn lpf(&self) -> Lpf {
        self.lpf
    }

    pub fn syn_d(&self) -> SynD {
        self.syn_d
    }

    pub fn is_enabled(&self) -> bool {
        !self.shutdown.shutdown()
    }

    pub fn set_tx_a(&mut self, tx_a: TxA) -> Result<(), Error> {
        self.write(Addr::TxA, tx_a.raw_value().value())?;
        self.tx_a = tx_a;
        Ok(())
    }

    pub fn set_rx_a(&mut self, rx_a: RxA) -> Result<(), Error> {
        self.write(Addr::RxA, rx_a.raw_value().value())?;
        self.rx_a = rx_a;
        Ok(())
    }

    pub fn set_tx_gain(&mut self, gain: TxGain) -> Result<(), Error> {
        self.set_tx_a(self.tx_a.with_gain(gain))
    }

    pub fn set_tx_bias(&mut self, bias: TxBias) -> Result<(), Error> {
        self.set_tx_a(self.tx_a.with_bias(bias))
    }

    pub fn set_rx_gain(&mut self, gain: RxGain) -> Result<(), Error> {
        self.set_rx_a(self.rx_a.with_gain(gain))
    }

    pub fn set_lna_gain(&mut self, lna: LnaGain) -> Result<(), Error> {
        self.set_rx_a(self.rx_a.with_lna(lna))
    }

    pub fn set_lpf_bandwidth(
        &mut self,
        bandwidth: Bandwidth,
    ) -> Result<(), Error> {
        let lpf = self.lpf.with_bandwidth(bandwidth);
        self.write(Addr::Lpf, lpf.raw_value().value())?;
        self.lpf = lpf;
        Ok(())
    }

    pub fn set_charge_pump(&mut self, cp: ChargePump) -> Result<(), Error> {
        let syn_d = self.syn_d.with_charge_pump(cp);
        self.write(Addr::SynD, syn_d.raw_value().value())?;
        self.syn_d = syn_d;
        Ok(())
    }

    fn set_shutdown(&mut self, shutdown: bool) -> Result<(), Error> {
        let reg = self.shutdown.with_shutdown(shutdown);
        self.write(Addr::Shutdown, reg.raw_value().value())?;
        self.shutdown = reg;
        log::info!("MAX2821 {}", if shutdown { "disabled" } else { "enabled" });
        Ok(())
    }

    pub fn enable(&mut self) -> Result<(), Error> {
        self.set_shutdown(false)
    }

    pub fn disable(&mut self) -> Result<(), Error> {
        self.set_shutdown(true)
    }

    /// Writes SYN_A, SYN_B and SYN_C in that order.
    pub fn set_divider(&mut self, divider: Divider) -> Result<(), Error> {
        let frac = divider.frac.value();
        self.write(Addr::SynA, divider.n.value())?;
        self.write(Addr::SynB, (frac & 0xfff) as u16)?;
        self.write(Addr::SynC, ((frac >> 12) & 0xfff) as u16)
    }

    /// Tune the synthesizer to `frequency` in MHz.
    pub fn set_frequency(&mut self, frequency: f32) -> Result<Divider, Error> {
        let divider = frequency_to_divider(frequency, self.reference);
        log::debug!(
            "Tuning to {frequency} MHz: N={} frac={}",
            divider.n,
            divider.frac
        );
        self.set_divider(divider)?;
        Ok(divider)
    }
}
