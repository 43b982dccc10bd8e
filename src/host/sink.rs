//! [`HostSink`] that reports everything through `tracing`.
//!
//! Used by the standalone binary, where there is no host surface to drive.

use super::{HostSink, Value};
use tracing::{debug, info};

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl HostSink for TracingSink {
    fn set_variable(&self, name: &str, value: Value) {
        debug!(target: "host::variable", name = %name, value = %value, "Variable updated");
    }

    fn emit_event(&self, name: &str, payload: serde_json::Value) {
        info!(target: "host::event", name = %name, payload = %payload, "Event");
    }

    fn send_parameter(&self, name: &str, value: Value) {
        debug!(target: "host::parameter", name = %name, value = %value, "Parameter");
    }
}
