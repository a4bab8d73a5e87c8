use embedded_hal::digital::{InputPin, OutputPin, PinState};
use serde::{Deserialize, Serialize};

use super::{Error, IqStream, Sample, StreamMode};

/// Bound on the clock edge busy-wait of [`ManualStream::receive`].
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum EdgeWait {
    /// Spin until the edge arrives. A dead clock hangs the caller.
    #[default]
    Forever,
    /// Give up with [`Error::Timeout`] after this many clock polls. The
    /// clock is always polled at least once.
    Polls(u32),
}

/// Bit-banged DDR stream. Data pin `k` carries bit `k` of I or Q.
///
/// Every call busy-waits on the calling thread for the whole sample period.
pub struct ManualStream<C, O, I> {
    clock: C,
    tx: [O; 8],
    rx: [I; 8],
    edge_wait: EdgeWait,
}

impl<C, O, I> ManualStream<C, O, I>
where
    C: OutputPin + InputPin,
    O: OutputPin,
    I: InputPin,
{
    pub fn new(clock: C, tx: [O; 8], rx: [I; 8]) -> Self {
        Self {
            clock,
            tx,
            rx,
            edge_wait: EdgeWait::Forever,
        }
    }

    pub fn with_edge_wait(mut self, edge_wait: EdgeWait) -> Self {
        self.edge_wait = edge_wait;
        self
    }

    pub fn edge_wait(&self) -> EdgeWait {
        self.edge_wait
    }

    fn write_byte(&mut self, value: u8) -> Result<(), Error> {
        for (k, pin) in self.tx.iter_mut().enumerate() {
            pin.set_state(PinState::from(value & (1 << k) != 0))?;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, Error> {
        let mut value = 0;
        for (k, pin) in self.rx.iter_mut().enumerate() {
            value |= (pin.is_high()? as u8) << k;
        }
        Ok(value)
    }

    fn wait_clock(&mut self, level: PinState) -> Result<(), Error> {
        let high = level == PinState::High;
        match self.edge_wait {
            EdgeWait::Forever => {
                while self.clock.is_high()? != high {
                    core::hint::spin_loop();
                }
                Ok(())
            }
            EdgeWait::Polls(polls) => {
                for _ in 0..polls.max(1) {
                    if self.clock.is_high()? == high {
                        return Ok(());
                    }
                    core::hint::spin_loop();
                }
                log::warn!("No sample clock edge after {polls} polls");
                Err(Error::Timeout)
            }
        }
    }
}

impl<C, O, I> IqStream for ManualStream<C, O, I>
where
    C: OutputPin + InputPin,
    O: OutputPin,
    I: InputPin,
{
    fn mode(&self) -> StreamMode {
        StreamMode::Manual
    }

    fn transmit(&mut self, sample: Sample) -> Result<(), Error> {
        self.clock.set_low()?;
        self.write_byte(sample.i())?;
        self.clock.set_high()?;
        self.write_byte(sample.q())?;
        self.clock.set_low()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<Sample, Error> {
        self.wait_clock(PinState::High)?;
        let i = self.read_byte()?;
        self.wait_clock(PinState::Low)?;
        let q = self.read_byte()?;
        Ok(Sample::from_iq(i, q))
    }
}
