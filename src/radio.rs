//! Both front end chips and the sample stream behind one handle.
use embedded_hal::spi::SpiDevice;
use max2821::{Divider, Max2821};
use max5864::{
    stream::{IqStream, Sample},
    Max5864,
};

use crate::{Error, Settings};

pub struct Radio<T, C, S> {
    transceiver: Max2821<T>,
    converter: Max5864<C>,
    stream: S,
}

impl<T, C, S> Radio<T, C, S>
where
    T: SpiDevice<u8>,
    C: SpiDevice<u8>,
    S: IqStream,
{
    /// Bind the transceiver and converter control buses and the sample
    /// stream. Nothing is written to either chip.
    pub fn new(
        transceiver: T,
        converter: C,
        stream: S,
        settings: &Settings,
    ) -> Result<Self, Error> {
        if stream.mode() != settings.mode {
            return Err(Error::Mode {
                configured: settings.mode,
                actual: stream.mode(),
            });
        }
        Ok(Self {
            transceiver: Max2821::new(transceiver, settings.reference),
            converter: Max5864::new(converter),
            stream,
        })
    }

    fn configure_transceiver(
        &mut self,
        settings: &Settings,
    ) -> Result<Divider, regbus::Error> {
        let dev = &mut self.transceiver;
        let divider = dev.set_frequency(settings.frequency)?;
        dev.set_tx_gain(settings.tx_gain)?;
        dev.set_tx_bias(settings.tx_bias)?;
        dev.set_rx_gain(settings.rx_gain)?;
        dev.set_lna_gain(settings.lna_gain)?;
        dev.set_lpf_bandwidth(settings.bandwidth)?;
        dev.set_charge_pump(settings.charge_pump)?;
        dev.enable()?;
        Ok(divider)
    }

    /// Tune and configure the transceiver, enable it, then set the converter
    /// mode.
    pub fn apply(&mut self, settings: &Settings) -> Result<(), Error> {
        let divider = self
            .configure_transceiver(settings)
            .map_err(Error::Transceiver)?;
        self.converter
            .set_mode(settings.adc_enable, settings.dac_enable)
            .map_err(Error::Converter)?;
        log::info!(
            "Front end at {} MHz (N={} frac={}), {:?} streaming",
            settings.frequency,
            divider.n,
            divider.frac,
            self.stream.mode()
        );
        Ok(())
    }

    pub fn transceiver(&mut self) -> &mut Max2821<T> {
        &mut self.transceiver
    }

    pub fn converter(&mut self) -> &mut Max5864<C> {
        &mut self.converter
    }

    pub fn stream(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn transmit(&mut self, sample: Sample) -> Result<(), Error> {
        Ok(self.stream.transmit(sample)?)
    }

    pub fn receive(&mut self) -> Result<Sample, Error> {
        Ok(self.stream.receive()?)
    }

    pub fn send_buffer(&mut self, samples: &[Sample]) -> Result<(), Error> {
        Ok(self.stream.send_buffer(samples)?)
    }
}
