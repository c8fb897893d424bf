//! # Canbus Core
//!
//! A parser for DBC network descriptions of CAN buses.
//!
//! This library provides:
//! - A line-oriented parser for the DBC record grammar
//! - A cross-referenced bus graph of nodes, messages, signals and attribute
//!   definitions
//! - Lookups by node name, message id and (message id, signal name)
//! - Post-parse consistency checks of signal layouts
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dbc`] - Record grammars, line dispatcher and parse entry points
//! - [`network`] - Bus graph representation and validation
//! - [`error`] - Error type shared by all modules
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! canbus network.dbc --ignore-receiver Vector__XXX --validate
//! ```
//!
//! ### Library
//!
//! ```
//! use canbus_core::{dbc, network::MessageId};
//!
//! let bus = dbc::parse(
//!     "BU_: ECU1 ECU2\n\
//!      BO_ 100 EngineData: 8 ECU1\n\
//!      SG_ RPM : 0|16@1+ (0.25,0) [0|16000] \"rpm\" ECU2\n",
//! )?;
//!
//! let rpm = bus.signal_by_message_id_and_name(MessageId(100), "RPM")?;
//! assert_eq!(rpm.unit, "rpm");
//! # Ok::<(), canbus_core::DbcError>(())
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmNetwork } from 'canbus_core';
//!
//! const net = new WasmNetwork(dbcText);
//! net.message_name(100);
//! ```
//!
//! ## Parse Model
//!
//! Input is consumed one line at a time and every record is applied to the
//! bus before the next line is read. References (senders, receivers,
//! description targets) must name entities declared earlier in the file.
//! Any error aborts the parse; no partially built bus is returned.

pub mod dbc;
pub mod error;
pub mod network;

// Re-export main types for convenience
pub use dbc::{parse, parse_file, Parser, ParserConfig};
pub use error::{DbcError, Result};
pub use network::Bus;

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmNetwork;

/// Placeholder node name written by common DBC tools for "no node".
pub const PLACEHOLDER_NODE: &str = "Vector__XXX";
