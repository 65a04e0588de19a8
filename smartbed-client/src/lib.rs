pub mod client;
pub mod configs;
mod error;
pub mod models;

pub use client::{ConnectionEvent, ConnectionState, DeviceApiClient};
pub use error::{Error, Result};
pub use models::{CommandOutcome, DeviceState, MotorCommand, MotorType};
