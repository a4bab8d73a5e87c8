#![cfg_attr(not(test), no_std)]

//! MSDR front end: a MAX2821 transceiver tuned and configured over its
//! register bus, and a MAX5864 converter moving I/Q pairs over the DDR bus.

use max5864::stream::StreamMode;

pub mod design_parameters;
pub mod radio;
pub mod settings;

pub use radio::Radio;
pub use settings::Settings;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Transceiver")]
    Transceiver(#[source] regbus::Error),
    #[error("Converter")]
    Converter(#[source] regbus::Error),
    #[error("Stream")]
    Stream(#[from] max5864::stream::Error),
    #[error("Configured for {configured:?} streaming, stream is {actual:?}")]
    Mode {
        configured: StreamMode,
        actual: StreamMode,
    },
    #[error("Settings: {0}")]
    Settings(serde_json_core::de::Error),
}
