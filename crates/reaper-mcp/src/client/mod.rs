//! Command Client
//!
//! Maps a command name plus a parameter mapping onto REAPER calls. The
//! connection is opened on first use; the first time REAPER turns out to be
//! unreachable the client runs the auto-configure step once and tells the
//! caller to restart REAPER.

mod convert;
mod fx;
mod item;
mod lookup;
mod marker;
mod midi;
mod project;
mod track;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashMap;

use reaper_core::{ApiResult, Connect, ReaScript};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{CommandError, CommandResult, DispatchError};

/// Returned once REAPER has been set up but still needs a restart
pub const AUTO_CONFIGURED_MESSAGE: &str =
    "Could not connect to REAPER. The ReaScript bridge has been \
     auto-configured, please restart REAPER and try again.";

/// Returned when the auto-configure step itself failed
pub const AUTO_CONFIGURE_FAILED_MESSAGE: &str =
    "Could not connect to REAPER and auto-configuration \
     failed. Please run `reaper-mcp configure` then restart REAPER.";

/// Anything that executes named commands against REAPER
pub trait CommandClient: Send {
    /// Run `command`; `None` parameters behave like an empty mapping
    fn send_command(
        &mut self,
        command: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<Value, DispatchError>;
}

/// One-shot setup run when REAPER cannot be reached
pub trait Configure: Send {
    /// Returns whether REAPER was configured
    fn configure(&self) -> bool;
}

type Handler = Box<dyn Fn(&mut Connection, Map<String, Value>) -> CommandResult + Send + Sync>;

/// Command name to handler, fixed after construction
pub struct CommandTable {
    handlers: HashMap<&'static str, Handler>,
}

impl CommandTable {
    pub fn new() -> Self {
        let mut table = Self {
            handlers: HashMap::new(),
        };
        project::register(&mut table);
        track::register(&mut table);
        item::register(&mut table);
        midi::register(&mut table);
        transport::register(&mut table);
        fx::register(&mut table);
        marker::register(&mut table);
        table
    }

    /// Parameters are decoded before the connection is touched
    fn register<P, F>(&mut self, name: &'static str, handler: F)
    where
        P: DeserializeOwned + 'static,
        F: Fn(&mut dyn ReaScript, P) -> CommandResult + Send + Sync + 'static,
    {
        let handler: Handler = Box::new(
            move |connection: &mut Connection, params: Map<String, Value>| {
                let params: P = serde_json::from_value(Value::Object(params))?;
                let api: &mut dyn ReaScript = connection.api()?;
                handler(api, params)
            },
        );
        self.handlers.insert(name, handler);
    }

    fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered command names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazily opened, resettable session with REAPER
pub struct Connection {
    connector: Box<dyn Connect>,
    handle: Option<Box<dyn ReaScript + Send>>,
}

impl Connection {
    pub fn new(connector: Box<dyn Connect>) -> Self {
        Self {
            connector,
            handle: None,
        }
    }

    /// The open session, connecting first if there is none
    pub fn api(&mut self) -> ApiResult<&mut (dyn ReaScript + Send)> {
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => {
                debug!("Connecting to REAPER");
                self.connector.connect()?
            }
        };
        Ok(&mut **self.handle.insert(handle))
    }

    /// Drop the session so the next call reconnects
    pub fn invalidate(&mut self) {
        if self.handle.take().is_some() {
            debug!("Dropped REAPER session");
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }
}

/// The production [`CommandClient`]
pub struct ReaperClient {
    commands: CommandTable,
    connection: Connection,
    configurator: Box<dyn Configure>,
    auto_configured: bool,
}

impl ReaperClient {
    pub fn new(connector: Box<dyn Connect>, configurator: Box<dyn Configure>) -> Self {
        Self {
            commands: CommandTable::new(),
            connection: Connection::new(connector),
            configurator,
            auto_configured: false,
        }
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_open()
    }

    fn dispatch_error(&mut self, command: &str, err: CommandError) -> DispatchError {
        match err {
            CommandError::Runtime(message) => DispatchError::new(message),
            err if err.is_connection() => self.connection_failed(err),
            err => {
                debug!(command, error = %err, "Command failed");
                DispatchError::new(err.to_string())
            }
        }
    }

    fn connection_failed(&mut self, err: CommandError) -> DispatchError {
        warn!("Could not reach REAPER: {}", err);
        self.connection.invalidate();

        if self.auto_configured {
            return DispatchError::new(err.to_string());
        }
        self.auto_configured = true;

        info!("Running auto-configuration");
        if self.configurator.configure() {
            DispatchError::new(AUTO_CONFIGURED_MESSAGE)
        } else {
            DispatchError::new(AUTO_CONFIGURE_FAILED_MESSAGE)
        }
    }
}

impl CommandClient for ReaperClient {
    fn send_command(
        &mut self,
        command: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<Value, DispatchError> {
        let Some(handler) = self.commands.get(command) else {
            warn!("Unknown command: {}", command);
            return Err(DispatchError::new(format!("Unknown command: {}", command)));
        };

        debug!(command, "Dispatching");
        let result = handler(&mut self.connection, params.unwrap_or_default());
        result.map_err(|err| self.dispatch_error(command, err))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{offline_client, ScriptedSetup};
    use super::*;
    use reaper_core::Simulator;
    use serde_json::json;

    const COMMANDS: [&str; 33] = [
        "get_project_info",
        "get_track_info",
        "create_track",
        "delete_track",
        "delete_all_tracks",
        "set_track_name",
        "set_track_volume",
        "set_track_pan",
        "set_track_mute",
        "set_track_solo",
        "get_items",
        "create_midi_item",
        "delete_item",
        "duplicate_item",
        "set_item_name",
        "get_item_notes",
        "set_item_notes",
        "start_playback",
        "stop_playback",
        "set_tempo",
        "set_time_signature",
        "undo",
        "set_cursor_position",
        "get_loop_region",
        "set_loop_region",
        "add_fx",
        "remove_fx",
        "get_fx_parameters",
        "set_fx_parameter",
        "create_track_with_fx",
        "add_marker",
        "add_region",
        "get_markers",
    ];

    #[test]
    fn test_every_command_is_registered() {
        let table = CommandTable::new();
        for name in COMMANDS {
            assert!(table.contains(name), "missing {}", name);
        }
        assert_eq!(table.names().len(), COMMANDS.len());
    }

    #[test]
    fn test_unknown_command() {
        let (_sim, mut client) = offline_client();
        let err = client.send_command("explode", None).unwrap_err();
        assert_eq!(err.message(), "Unknown command: explode");
        assert!(!client.is_connected());
    }

    #[test]
    fn test_none_params_is_empty_mapping() {
        let (_sim, mut client) = offline_client();
        let a = client.send_command("get_project_info", None).unwrap();
        let b = client
            .send_command("get_project_info", Some(Map::new()))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_connection_is_lazy() {
        let (_sim, mut client) = offline_client();
        assert!(!client.is_connected());
        client.send_command("get_project_info", None).unwrap();
        assert!(client.is_connected());
    }

    #[test]
    fn test_bad_params_do_not_connect() {
        let (_sim, mut client) = offline_client();
        let err = client.send_command("get_track_info", None).unwrap_err();
        assert!(err.message().contains("track_index"));
        assert!(!client.is_connected());
    }

    #[test]
    fn test_validation_message_is_kept() {
        let (_sim, mut client) = offline_client();
        let params = json!({"track_index": 0}).as_object().cloned();
        let err = client.send_command("delete_track", params).unwrap_err();
        assert_eq!(err.message(), "Track index 0 out of range (0--1)");
    }

    #[test]
    fn test_auto_configure_runs_once() {
        let sim = Simulator::new();
        sim.set_reachable(false);
        let setup = ScriptedSetup::new(true);
        let mut client = ReaperClient::new(Box::new(sim.connector()), Box::new(setup.clone()));

        let first = client.send_command("get_project_info", None).unwrap_err();
        assert!(first.message().contains("auto-configured"));
        assert!(first.message().contains("please restart REAPER and try again"));

        let second = client.send_command("get_project_info", None).unwrap_err();
        assert_eq!(second.message(), "Connection refused");
        assert_eq!(setup.runs(), 1);
    }

    #[test]
    fn test_auto_configure_failure_names_manual_step() {
        let sim = Simulator::new();
        sim.set_reachable(false);
        let setup = ScriptedSetup::new(false);
        let mut client = ReaperClient::new(Box::new(sim.connector()), Box::new(setup.clone()));

        let err = client.send_command("start_playback", None).unwrap_err();
        assert!(err.message().contains("auto-configuration failed"));
        assert!(err.message().contains("reaper-mcp configure"));
        assert!(err.message().contains("restart REAPER"));
        assert_eq!(setup.runs(), 1);
    }

    #[test]
    fn test_runtime_errors_pass_through() {
        let sim = Simulator::new();
        sim.refuse("SetTempoTimeSigMarker");
        let setup = ScriptedSetup::new(true);
        let mut client = ReaperClient::new(Box::new(sim.connector()), Box::new(setup.clone()));

        let params = json!({"numerator": 7, "denominator": 8}).as_object().cloned();
        let err = client.send_command("set_time_signature", params).unwrap_err();
        assert_eq!(err.message(), "REAPER rejected time signature 7/8");
        assert_eq!(setup.runs(), 0);
        assert!(client.is_connected());
    }

    #[test]
    fn test_reconnects_after_restart() {
        let (sim, mut client) = offline_client();
        client.send_command("get_project_info", None).unwrap();

        // REAPER goes away mid-session, then comes back
        sim.set_reachable(false);
        let err = client.send_command("get_project_info", None).unwrap_err();
        assert!(err.message().contains("auto-configured"));
        assert!(!client.is_connected());

        sim.set_reachable(true);
        let info = client.send_command("get_project_info", None).unwrap();
        assert_eq!(info["track_count"], 0);
    }

    #[test]
    fn test_native_errors_keep_their_message() {
        let (_sim, mut client) = offline_client();
        client.send_command("create_track", None).unwrap();
        let params = json!({"track_index": 0, "fx_name": "NoSuchPlugin"})
            .as_object()
            .cloned();
        let err = client.send_command("add_fx", params).unwrap_err();
        assert_eq!(err.message(), "FX not found: NoSuchPlugin");
    }
}
