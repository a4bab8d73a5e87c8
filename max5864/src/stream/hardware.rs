use embedded_hal::digital::PinState;

use super::{Error, IqStream, Sample, StreamMode};

/// Shift engine instruction. Each one takes a single engine clock cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Shift `bits` from the output shift register onto the data pins while
    /// driving the sample clock to `clock`.
    Out { bits: u8, clock: PinState },
    /// Drive the sample clock only.
    Nop { clock: PinState },
    /// Stall until the sample clock reads `clock`.
    Wait { clock: PinState },
    /// Shift `bits` from the data pins into the input shift register.
    In { bits: u8 },
}

/// I out with the clock low, Q out with the clock high: one clock period per
/// sample pair.
pub const TX_PROGRAM: [Step; 4] = [
    Step::Out {
        bits: 8,
        clock: PinState::Low,
    },
    Step::Nop {
        clock: PinState::High,
    },
    Step::Out {
        bits: 8,
        clock: PinState::High,
    },
    Step::Nop {
        clock: PinState::Low,
    },
];

/// Latch I after the rising edge and Q after the falling edge.
pub const RX_PROGRAM: [Step; 4] = [
    Step::Wait {
        clock: PinState::High,
    },
    Step::In { bits: 8 },
    Step::Wait {
        clock: PinState::Low,
    },
    Step::In { bits: 8 },
];

/// Autopull/autopush threshold. One FIFO word per sample pair.
pub const WORD_BITS: u8 = 16;

/// Engine clock in units of the sample clock.
pub const CLOCK_MULTIPLIER: u32 = 2;

/// A clocked shift/sequencing unit with bounded transmit and receive FIFOs,
/// e.g. an RP2040 PIO state machine pair.
///
/// Once started the engine runs on its own clock, shifting MSB first and
/// pulling/pushing a FIFO word every [`WORD_BITS`].
pub trait ShiftEngine {
    /// Load the programs and start them at `frequency` Hz.
    fn start(&mut self, tx: &[Step], rx: &[Step], frequency: u32);

    /// Queue a word for transmission. `false` if the transmit FIFO is full.
    fn push(&mut self, word: u16) -> bool;

    /// Take a received word, if any.
    fn pull(&mut self) -> Option<u16>;
}

/// Hardware timed DDR stream. Backpressure is the FIFO depth: callers block,
/// samples are never dropped.
pub struct HardwareStream<E> {
    engine: E,
}

impl<E: ShiftEngine> HardwareStream<E> {
    /// Program and start the engine for a sample clock of `sample_clock` Hz.
    ///
    /// The engine is left untouched if it cannot be clocked at
    /// [`CLOCK_MULTIPLIER`] times `sample_clock`.
    pub fn new(mut engine: E, sample_clock: u32) -> Result<Self, Error> {
        let frequency = sample_clock
            .checked_mul(CLOCK_MULTIPLIER)
            .ok_or(Error::SampleClock(sample_clock))?;
        engine.start(&TX_PROGRAM, &RX_PROGRAM, frequency);
        log::info!("DDR shift engine running at {frequency} Hz");
        Ok(Self { engine })
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn free(self) -> E {
        self.engine
    }

    pub fn try_transmit(&mut self, sample: Sample) -> nb::Result<(), Error> {
        if self.engine.push(sample.raw_value()) {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    pub fn try_receive(&mut self) -> nb::Result<Sample, Error> {
        self.engine
            .pull()
            .map(Sample::new_with_raw_value)
            .ok_or(nb::Error::WouldBlock)
    }
}

impl<E: ShiftEngine> IqStream for HardwareStream<E> {
    fn mode(&self) -> StreamMode {
        StreamMode::Hardware
    }

    fn transmit(&mut self, sample: Sample) -> Result<(), Error> {
        nb::block!(self.try_transmit(sample))
    }

    fn receive(&mut self) -> Result<Sample, Error> {
        nb::block!(self.try_receive())
    }

    /// Words are pushed one by one, blocking on a full FIFO.
    // TODO: hand the buffer to a DMA channel paced by the TX FIFO DREQ.
    fn send_buffer(&mut self, samples: &[Sample]) -> Result<(), Error> {
        for sample in samples {
            self.transmit(*sample)?;
        }
        Ok(())
    }
}
