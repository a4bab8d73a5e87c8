//! MSDR front end settings
//!
//! All settings are applied at construction and bring-up. The stream strategy
//! in particular cannot change afterwards: the hardware and manual strategies
//! own different pins and resources.
use embedded_hal::digital::{InputPin, OutputPin};
use max2821::{Bandwidth, ChargePump, LnaGain, RxGain, TxBias, TxGain};
use max5864::stream::{
    EdgeWait, HardwareStream, ManualStream, ShiftEngine, StreamMode,
};
use serde::{Deserialize, Serialize};

use crate::{design_parameters, Error};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// I/Q stream strategy.
    pub mode: StreamMode,
    /// Converter sample clock in Hz.
    pub sample_clock: u32,
    /// Synthesizer reference in MHz.
    pub reference: f32,
    /// Carrier in MHz.
    pub frequency: f32,
    pub tx_gain: TxGain,
    pub tx_bias: TxBias,
    pub rx_gain: RxGain,
    pub lna_gain: LnaGain,
    pub bandwidth: Bandwidth,
    pub charge_pump: ChargePump,
    pub adc_enable: bool,
    pub dac_enable: bool,
    /// Clock edge bound of the manual strategy.
    pub edge_wait: EdgeWait,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: StreamMode::Hardware,
            sample_clock: design_parameters::SAMPLE_CLOCK,
            reference: design_parameters::REFERENCE_MHZ,
            frequency: design_parameters::DEFAULT_FREQUENCY_MHZ,
            tx_gain: TxGain::Db0,
            tx_bias: TxBias::Ma1_5,
            rx_gain: RxGain::Db0,
            lna_gain: LnaGain::Low,
            bandwidth: Bandwidth::Mhz7,
            charge_pump: ChargePump::Low,
            adc_enable: true,
            dac_enable: true,
            edge_wait: EdgeWait::Forever,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing entries take their default.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let (settings, _) =
            serde_json_core::from_str(json).map_err(Error::Settings)?;
        Ok(settings)
    }

    /// Start the shift engine at the configured sample clock.
    pub fn hardware_stream<E: ShiftEngine>(
        &self,
        engine: E,
    ) -> Result<HardwareStream<E>, Error> {
        Ok(HardwareStream::new(engine, self.sample_clock)?)
    }

    pub fn manual_stream<C, O, I>(
        &self,
        clock: C,
        tx: [O; 8],
        rx: [I; 8],
    ) -> ManualStream<C, O, I>
    where
        C: OutputPin + InputPin,
        O: OutputPin,
        I: InputPin,
    {
        ManualStream::new(clock, tx, rx).with_edge_wait(self.edge_wait)
    }
}
