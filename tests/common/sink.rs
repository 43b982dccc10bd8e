//! Host sink that records everything it is given.

use parking_lot::Mutex;
use slirc_bridge::host::{HostSink, Value};

#[derive(Default)]
pub struct RecordingSink {
    variables: Mutex<Vec<(String, Value)>>,
    events: Mutex<Vec<(String, serde_json::Value)>>,
    parameters: Mutex<Vec<(String, Value)>>,
}

#[allow(dead_code)]
impl RecordingSink {
    /// Latest value published for `name`.
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.variables
            .lock()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// Payloads of every event named `name`.
    pub fn events(&self, name: &str) -> Vec<serde_json::Value> {
        self.events
            .lock()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Names of every event, in emission order.
    pub fn event_names(&self) -> Vec<String> {
        self.events.lock().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Values sent for parameter `name`, in order.
    pub fn parameter_values(&self, name: &str) -> Vec<Value> {
        self.parameters
            .lock()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .collect()
    }
}

impl HostSink for RecordingSink {
    fn set_variable(&self, name: &str, value: Value) {
        self.variables.lock().push((name.to_string(), value));
    }

    fn emit_event(&self, name: &str, payload: serde_json::Value) {
        self.events.lock().push((name.to_string(), payload));
    }

    fn send_parameter(&self, name: &str, value: Value) {
        self.parameters.lock().push((name.to_string(), value));
    }
}
