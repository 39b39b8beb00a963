//! Tool Handler
//!
//! The facade between MCP tool calls and the command client: checks and
//! defaults the arguments, forwards them, and turns the outcome into the
//! JSON text agents read.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::client::CommandClient;
use crate::params::*;
use crate::protocol::ToolResult;

type Params = Option<Map<String, Value>>;

/// Decode `args` as `P`, applying its defaults, and re-encode for the client
fn typed<P: DeserializeOwned + Serialize>(
    tool: &str,
    args: Map<String, Value>,
) -> Result<Params, String> {
    let invalid = |e: serde_json::Error| format!("Invalid arguments for {}: {}", tool, e);
    let params: P = serde_json::from_value(Value::Object(args)).map_err(invalid)?;
    match serde_json::to_value(params).map_err(invalid)? {
        Value::Object(map) => Ok(Some(map)),
        _ => Ok(None),
    }
}

/// Parameter mapping for `tool`, `Ok(None)` for tools without arguments
fn tool_params(tool: &str, args: Map<String, Value>) -> Result<Params, String> {
    match tool {
        "get_project_info" | "delete_all_tracks" | "start_playback" | "stop_playback"
        | "undo" | "get_loop_region" | "get_markers" => Ok(None),

        "get_track_info" | "delete_track" | "get_items" => typed::<TrackParams>(tool, args),
        "create_track" => typed::<CreateTrackParams>(tool, args),
        "set_track_name" => typed::<SetTrackNameParams>(tool, args),
        "set_track_volume" => typed::<SetTrackVolumeParams>(tool, args),
        "set_track_pan" => typed::<SetTrackPanParams>(tool, args),
        "set_track_mute" => typed::<SetTrackMuteParams>(tool, args),
        "set_track_solo" => typed::<SetTrackSoloParams>(tool, args),

        "create_midi_item" => typed::<CreateMidiItemParams>(tool, args),
        "delete_item" | "get_item_notes" => typed::<ItemParams>(tool, args),
        "duplicate_item" => typed::<DuplicateItemParams>(tool, args),
        "set_item_name" => typed::<SetItemNameParams>(tool, args),
        "set_item_notes" => typed::<SetItemNotesParams>(tool, args),

        "set_tempo" => typed::<SetTempoParams>(tool, args),
        "set_time_signature" => typed::<TimeSignatureParams>(tool, args),
        "set_cursor_position" => typed::<CursorParams>(tool, args),
        "set_loop_region" => typed::<LoopRegionParams>(tool, args),

        "add_fx" => typed::<AddFxParams>(tool, args),
        "remove_fx" | "get_fx_parameters" => typed::<FxParams>(tool, args),
        "set_fx_parameter" => typed::<SetFxParameterParams>(tool, args),
        "create_track_with_fx" => typed::<CreateTrackWithFxParams>(tool, args),

        "add_marker" => typed::<AddMarkerParams>(tool, args),
        "add_region" => typed::<AddRegionParams>(tool, args),

        _ => Err(format!("Unknown tool: {}", tool)),
    }
}

fn error_payload(message: &str) -> String {
    json!({"error": message}).to_string()
}

/// Tool facade over a [`CommandClient`]
pub struct ToolFacade<C> {
    client: C,
}

impl<C: CommandClient> ToolFacade<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run a tool; `Err` carries the `{"error": ...}` payload
    fn invoke(&mut self, tool: &str, arguments: Map<String, Value>) -> Result<String, String> {
        let params = tool_params(tool, arguments).map_err(|message| {
            warn!("{}", message);
            error_payload(&message)
        })?;

        debug!("Forwarding {} with {:?}", tool, params);
        let result = self
            .client
            .send_command(tool, params)
            .map_err(|e| error_payload(e.message()))?;

        serde_json::to_string_pretty(&result).map_err(|e| error_payload(&e.to_string()))
    }

    /// Text payload of a tool call: pretty JSON result or `{"error": "..."}`
    pub fn call(&mut self, tool: &str, arguments: Map<String, Value>) -> String {
        self.invoke(tool, arguments).unwrap_or_else(|payload| payload)
    }

    /// Same as [`ToolFacade::call`], flagged for MCP
    pub fn call_tool(&mut self, tool: &str, arguments: Map<String, Value>) -> ToolResult {
        match self.invoke(tool, arguments) {
            Ok(text) => ToolResult::success(text),
            Err(payload) => ToolResult::error(payload),
        }
    }
}
