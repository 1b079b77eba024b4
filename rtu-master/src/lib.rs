//! An async implementation of a [Modbus](http://modbus.org/) RTU master
//! using [Tokio](https://docs.rs/tokio) and Rust's `async/await` syntax.
//!
//! # Features
//!
//! * Panic-free parsing of RTU frames out of an unframed byte stream
//! * One request on the wire at a time, queued requests run in FIFO order
//! * Configurable response timeout and inter-request throttle
//! * Optional table of named request presets ("drafts")
//! * Runs over a serial port or any `AsyncRead + AsyncWrite` stream
//!
//! # Supported Functions
//!
//! * Read Coils
//! * Read Discrete Inputs
//! * Read Holding Registers
//! * Read Input Registers
//! * Write Single Coil
//! * Write Single Register
//! * Write Multiple Coils
//! * Write Multiple Registers
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use rtu_master::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut master = spawn_rtu_master(
//!         "/dev/ttyUSB0",
//!         SerialSettings::default(),
//!         MasterOptions::default().threshold(Duration::from_millis(500)),
//!     )?;
//!
//!     loop {
//!         match master.read_holding_registers(1, ReadRange::new(0, 5)).await {
//!             Ok(values) => println!("registers: {values:?}"),
//!             Err(err) => println!("error: {err}"),
//!         }
//!         tokio::time::sleep(Duration::from_secs(3)).await;
//!     }
//! }
//! ```

pub use crate::client::*;
pub use crate::common::frame::{Packet, Request, Response};
pub use crate::common::function::FunctionCode;
pub use crate::constants::limits;
pub use crate::decode::*;
pub use crate::error::*;
pub use crate::exception::*;
pub use crate::serial::extractor::RtuExtractor;
pub use crate::serial::frame::{
    crc16, decode_request, decode_response, encode_request, encode_response,
};
pub use crate::serial::*;
pub use crate::types::*;

mod client;
mod common {
    pub(crate) mod bits;
    pub(crate) mod cursor;
    pub(crate) mod frame;
    pub(crate) mod function;
    pub(crate) mod parse;
    pub(crate) mod phys;
    pub(crate) mod serialize;
    pub(crate) mod traits;
}
mod constants;
mod decode;
mod error;
mod exception;
#[cfg(test)]
mod mock;
mod serial;
mod types;
