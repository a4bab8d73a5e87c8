/// The converter sample clock in Hz. The DDR shift engine runs at twice this.
pub const SAMPLE_CLOCK: u32 = 20_000_000;

/// The transceiver synthesizer reference clock in MHz.
pub const REFERENCE_MHZ: f32 = max2821::REFERENCE;

/// The control bus clock, shared by both chips.
pub const SPI_FREQUENCY: u32 = max2821::SPI_FREQUENCY;

// Channel 6 of the 2.4 GHz ISM band.
pub const DEFAULT_FREQUENCY_MHZ: f32 = 2437.0;
