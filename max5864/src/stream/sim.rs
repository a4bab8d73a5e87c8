//! Bus models for the stream tests.

use super::{ManualStream, ShiftEngine, Step};
use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};
use heapless::Deque;
use std::{cell::RefCell, rc::Rc, vec::Vec};

pub const SAMPLE_CLOCK: u32 = 20_000_000;
pub const DEPTH: usize = 4;

/// Clock level and data byte after every change on the bus.
pub type Trace = Vec<(PinState, u8)>;

/// Execute one pass of a transmit program for `word`, appending the bus
/// state after every step.
pub fn run_tx(program: &[Step], word: u16, trace: &mut Trace) {
    let mut osr = word;
    let (mut clock, mut data) =
        trace.last().copied().unwrap_or((PinState::Low, 0));
    for step in program {
        match *step {
            Step::Out { bits, clock: level } => {
                data = (osr >> (16 - bits as u32)) as u8;
                osr <<= bits as u32;
                clock = level;
            }
            Step::Nop { clock: level } => clock = level,
            _ => panic!("{step:?} in transmit program"),
        }
        trace.push((clock, data));
    }
}

/// Run a receive program over a recorded bus until the trace is exhausted.
/// `In` latches the data present when the preceding `Wait` was satisfied.
pub fn run_rx(program: &[Step], trace: &[(PinState, u8)]) -> Vec<u16> {
    let mut words = Vec::new();
    let mut cursor = 0;
    let mut latched = 0u8;
    loop {
        let mut isr = 0u16;
        for step in program {
            match *step {
                Step::Wait { clock } => loop {
                    let Some(&(level, data)) = trace.get(cursor) else {
                        return words;
                    };
                    cursor += 1;
                    if level == clock {
                        latched = data;
                        break;
                    }
                },
                Step::In { bits } => isr = (isr << bits as u32) | latched as u16,
                _ => panic!("{step:?} in receive program"),
            }
        }
        words.push(isr);
    }
}

/// Shift engine with the loaded programs looped back onto each other.
#[derive(Default)]
pub struct Pio {
    pub tx: Deque<u16, DEPTH>,
    pub rx: Deque<u16, DEPTH>,
    pub tx_program: Vec<Step>,
    pub rx_program: Vec<Step>,
    pub frequency: u32,
    pub trace: Trace,
}

impl ShiftEngine for Pio {
    fn start(&mut self, tx: &[Step], rx: &[Step], frequency: u32) {
        self.tx_program = tx.to_vec();
        self.rx_program = rx.to_vec();
        self.frequency = frequency;
    }

    fn push(&mut self, word: u16) -> bool {
        self.tx.push_back(word).is_ok()
    }

    fn pull(&mut self) -> Option<u16> {
        self.rx.pop_front()
    }
}

impl Pio {
    /// Drain the transmit FIFO over the bus into the receive FIFO.
    pub fn run(&mut self) {
        let start = self.trace.len();
        while let Some(word) = self.tx.pop_front() {
            run_tx(&self.tx_program, word, &mut self.trace);
        }
        for word in run_rx(&self.rx_program, &self.trace[start..]) {
            self.rx.push_back(word).unwrap();
        }
    }
}

/// Parallel bus shared by the manual pins. Outputs append to `trace`,
/// clock polls step through `replay`.
pub struct Wire {
    clock: PinState,
    data: u8,
    pub trace: Trace,
    pub replay: Trace,
    cursor: usize,
    current: (PinState, u8),
}

pub type Shared = Rc<RefCell<Wire>>;

impl Wire {
    pub fn shared() -> Shared {
        Rc::new(RefCell::new(Self {
            clock: PinState::Low,
            data: 0,
            trace: Trace::new(),
            replay: Trace::new(),
            cursor: 0,
            current: (PinState::Low, 0),
        }))
    }

    pub fn replay_trace(&mut self) {
        self.replay = core::mem::take(&mut self.trace);
        self.cursor = 0;
    }

    fn record(&mut self) {
        self.trace.push((self.clock, self.data));
    }

    /// Once the replay runs out the clock stays where it is.
    fn poll(&mut self) -> PinState {
        if let Some(&state) = self.replay.get(self.cursor) {
            self.current = state;
            self.cursor += 1;
        }
        self.current.0
    }
}

pub struct Clock(pub Shared);
pub struct Data(pub Shared, pub u8);

impl ErrorType for Clock {
    type Error = Infallible;
}

impl ErrorType for Data {
    type Error = Infallible;
}

impl OutputPin for Clock {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.set_state(PinState::Low)
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.set_state(PinState::High)
    }

    fn set_state(&mut self, state: PinState) -> Result<(), Infallible> {
        let mut wire = self.0.borrow_mut();
        wire.clock = state;
        wire.record();
        Ok(())
    }
}

impl InputPin for Clock {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.borrow_mut().poll() == PinState::High)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.borrow_mut().poll() == PinState::Low)
    }
}

impl OutputPin for Data {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.set_state(PinState::Low)
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.set_state(PinState::High)
    }

    fn set_state(&mut self, state: PinState) -> Result<(), Infallible> {
        let mut wire = self.0.borrow_mut();
        let bit = 1 << self.1;
        match state {
            PinState::High => wire.data |= bit,
            PinState::Low => wire.data &= !bit,
        }
        wire.record();
        Ok(())
    }
}

impl InputPin for Data {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.borrow().current.1 & (1 << self.1) != 0)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.is_high()?)
    }
}

pub fn manual(wire: &Shared) -> ManualStream<Clock, Data, Data> {
    ManualStream::new(
        Clock(wire.clone()),
        core::array::from_fn(|k| Data(wire.clone(), k as u8)),
        core::array::from_fn(|k| Data(wire.clone(), k as u8)),
    )
}
