//! Shared fixtures for command tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reaper_core::Simulator;
use serde_json::{Map, Value};

use super::{CommandClient, Configure, ReaperClient};

/// Configure step with a fixed outcome that counts its runs
#[derive(Clone)]
pub struct ScriptedSetup {
    succeeds: bool,
    runs: Arc<AtomicUsize>,
}

impl ScriptedSetup {
    pub fn new(succeeds: bool) -> Self {
        Self {
            succeeds,
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl Configure for ScriptedSetup {
    fn configure(&self) -> bool {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.succeeds
    }
}

/// A client on a fresh 120 BPM 4/4 simulated project
pub fn offline_client() -> (Simulator, ReaperClient) {
    client_on(Simulator::new())
}

pub fn client_on(sim: Simulator) -> (Simulator, ReaperClient) {
    let client = ReaperClient::new(
        Box::new(sim.connector()),
        Box::new(ScriptedSetup::new(true)),
    );
    (sim, client)
}

/// `send_command` with a JSON object literal, panicking on failure
pub fn run(client: &mut ReaperClient, command: &str, params: Value) -> Value {
    match client.send_command(command, as_params(params)) {
        Ok(value) => value,
        Err(err) => panic!("{} failed: {}", command, err),
    }
}

/// `send_command` expected to fail, returning the message
pub fn fail(client: &mut ReaperClient, command: &str, params: Value) -> String {
    match client.send_command(command, as_params(params)) {
        Ok(value) => panic!("{} unexpectedly returned {}", command, value),
        Err(err) => err.message().to_string(),
    }
}

fn as_params(params: Value) -> Option<Map<String, Value>> {
    match params {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

pub fn approx(actual: &Value, expected: f64) -> bool {
    actual
        .as_f64()
        .map_or(false, |a| (a - expected).abs() < 1e-6)
}
