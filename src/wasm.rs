//! WASM bindings for Canbus Core.
//!
//! This module provides JavaScript-friendly bindings for inspecting a DBC
//! network description in the browser.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmNetwork } from 'canbus_core';
//!
//! await init();
//!
//! const net = new WasmNetwork(`
//! BU_: ECU1 ECU2
//! BO_ 100 EngineData: 8 ECU1
//!  SG_ RPM : 0|16@1+ (0.25,0) [0|16000] "rpm" ECU2
//! `);
//!
//! net.node_names();         // ["ECU1", "ECU2"]
//! net.message_name(100);    // "EngineData"
//! net.signal_names(100);    // ["RPM"]
//! ```

use wasm_bindgen::prelude::*;

use crate::dbc::{self, ParserConfig};
use crate::network::{Bus, MessageId};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// WASM-compatible view of a parsed network.
#[wasm_bindgen]
pub struct WasmNetwork {
    bus: Bus,
}

#[wasm_bindgen]
impl WasmNetwork {
    /// Parse a network from DBC text.
    ///
    /// # Returns
    /// A new `WasmNetwork` instance or an error message if the text is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(dbc_text: &str) -> Result<WasmNetwork, JsValue> {
        Self::with_ignored_receiver(dbc_text, crate::PLACEHOLDER_NODE)
    }

    /// Parse a network, dropping receivers named `ignored_receiver`.
    #[wasm_bindgen]
    pub fn with_ignored_receiver(
        dbc_text: &str,
        ignored_receiver: &str,
    ) -> Result<WasmNetwork, JsValue> {
        let config = ParserConfig::new().with_ignored_receiver(ignored_receiver);
        let bus = dbc::parse_with_config(dbc_text, config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmNetwork { bus })
    }

    /// Format version, or `undefined`.
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> Option<String> {
        self.bus.version.clone()
    }

    /// Bus speed, or `undefined` when not declared.
    #[wasm_bindgen(getter)]
    pub fn speed(&self) -> Option<u32> {
        self.bus.speed
    }

    /// Names of all nodes in declaration order.
    #[wasm_bindgen]
    pub fn node_names(&self) -> Vec<String> {
        self.bus.nodes().map(|n| n.name.clone()).collect()
    }

    /// Ids of all messages in ascending order.
    #[wasm_bindgen]
    pub fn message_ids(&self) -> Vec<u32> {
        self.bus.messages().map(|m| m.id.0).collect()
    }

    /// Name of the message with this id, or `undefined`.
    #[wasm_bindgen]
    pub fn message_name(&self, id: u32) -> Option<String> {
        self.bus.message_by_id(MessageId(id)).ok().map(|m| m.name.clone())
    }

    /// Payload length in bytes of the message with this id.
    #[wasm_bindgen]
    pub fn message_length(&self, id: u32) -> Option<u32> {
        self.bus.message_by_id(MessageId(id)).ok().map(|m| m.length)
    }

    /// Name of the node sending the message with this id.
    #[wasm_bindgen]
    pub fn message_sender(&self, id: u32) -> Option<String> {
        self.bus
            .message_by_id(MessageId(id))
            .ok()
            .map(|m| self.bus.node_name(m.sender).to_string())
    }

    /// Names of the signals of a message, in declaration order.
    #[wasm_bindgen]
    pub fn signal_names(&self, id: u32) -> Vec<String> {
        self.bus
            .message_by_id(MessageId(id))
            .map(|m| m.signals().iter().map(|s| s.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Description of a message, or of one of its signals when `signal` is given.
    #[wasm_bindgen]
    pub fn description(&self, id: u32, signal: Option<String>) -> Option<String> {
        match signal {
            Some(name) => self
                .bus
                .signal_by_message_id_and_name(MessageId(id), &name)
                .ok()
                .and_then(|s| s.description.clone()),
            None => self
                .bus
                .message_by_id(MessageId(id))
                .ok()
                .and_then(|m| m.description.clone()),
        }
    }

    /// Description of a node, or `undefined`.
    #[wasm_bindgen]
    pub fn node_description(&self, name: &str) -> Option<String> {
        self.bus
            .node_by_name(name)
            .ok()
            .and_then(|n| n.description.clone())
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
