//! REAPER Tool Definitions
//!
//! One MCP tool per command. Positions and lengths are in beats (quarter
//! notes) everywhere; indices are zero-based.

use serde_json::{json, Value};

use crate::protocol::{InputSchema, Tool};

/// Create a tool definition with the given name, description, and schema properties
fn tool(name: &str, description: &str, properties: Value, required: Vec<&str>) -> Tool {
    let props = properties.as_object().cloned().unwrap_or_default();
    Tool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: InputSchema {
            schema_type: "object".to_string(),
            properties: props,
            required: required.into_iter().map(|s| s.to_string()).collect(),
        },
    }
}

fn track_index() -> Value {
    json!({"type": "integer", "description": "Track index (0-based)"})
}

fn item_index() -> Value {
    json!({"type": "integer", "description": "Item index on the track (0-based, see get_items)"})
}

fn fx_index() -> Value {
    json!({"type": "integer", "description": "FX index in the track's chain (0-based)"})
}

/// Get all REAPER tools
pub fn all_tools() -> Vec<Tool> {
    vec![
        // =========================================================================
        // Project / info
        // =========================================================================
        tool(
            "get_project_info",
            "Get current REAPER project info: tempo, time signature, track count, play state, and cursor position.",
            json!({}),
            vec![],
        ),
        tool(
            "get_track_info",
            "Get detailed info about a track: name, mute/solo/arm state, volume, pan, media items, and FX chain.",
            json!({"track_index": track_index()}),
            vec!["track_index"],
        ),

        // =========================================================================
        // Track management
        // =========================================================================
        tool(
            "create_track",
            "Create a new track. Use index=-1 to append at the end. REAPER tracks handle both audio and MIDI.",
            json!({
                "index": {"type": "integer", "description": "Insert position, -1 appends", "default": -1}
            }),
            vec![],
        ),
        tool(
            "delete_track",
            "Delete a track by index.",
            json!({"track_index": track_index()}),
            vec!["track_index"],
        ),
        tool(
            "delete_all_tracks",
            "Delete all tracks. Useful for clearing a project before building a fresh arrangement. Returns the count of deleted tracks.",
            json!({}),
            vec![],
        ),
        tool(
            "set_track_name",
            "Rename a track.",
            json!({
                "track_index": track_index(),
                "name": {"type": "string", "description": "New track name"}
            }),
            vec!["track_index", "name"],
        ),
        tool(
            "set_track_volume",
            "Set track volume. Range: 0.0 (silence) to 1.0 (unity gain), up to 4.0 (+12 dB).",
            json!({
                "track_index": track_index(),
                "volume": {"type": "number", "description": "Linear gain, clamped to 0.0-4.0", "minimum": 0.0, "maximum": 4.0}
            }),
            vec!["track_index", "volume"],
        ),
        tool(
            "set_track_pan",
            "Set track pan. Range: -1.0 (full left) to 1.0 (full right), 0.0 is center.",
            json!({
                "track_index": track_index(),
                "pan": {"type": "number", "description": "Pan, clamped to -1.0-1.0", "minimum": -1.0, "maximum": 1.0}
            }),
            vec!["track_index", "pan"],
        ),
        tool(
            "set_track_mute",
            "Mute or unmute a track.",
            json!({
                "track_index": track_index(),
                "mute": {"type": "boolean", "description": "True to mute"}
            }),
            vec!["track_index", "mute"],
        ),
        tool(
            "set_track_solo",
            "Solo or unsolo a track.",
            json!({
                "track_index": track_index(),
                "solo": {"type": "boolean", "description": "True to solo"}
            }),
            vec!["track_index", "solo"],
        ),

        // =========================================================================
        // Media items
        // =========================================================================
        tool(
            "get_items",
            "Get all media items on a track. Returns each item's index, name, position, length, and whether it contains MIDI.",
            json!({"track_index": track_index()}),
            vec!["track_index"],
        ),
        tool(
            "create_midi_item",
            "Create an empty MIDI item on a track. Position and length are in beats.",
            json!({
                "track_index": track_index(),
                "position": {"type": "number", "description": "Start in beats"},
                "length": {"type": "number", "description": "Length in beats", "default": 4.0}
            }),
            vec!["track_index", "position"],
        ),
        tool(
            "delete_item",
            "Delete a media item from a track by index. Use get_items to find the item_index.",
            json!({"track_index": track_index(), "item_index": item_index()}),
            vec!["track_index", "item_index"],
        ),
        tool(
            "duplicate_item",
            "Duplicate a media item to a new position on the same track. destination_time is in beats.",
            json!({
                "track_index": track_index(),
                "item_index": item_index(),
                "destination_time": {"type": "number", "description": "Where the copy starts, in beats"}
            }),
            vec!["track_index", "item_index", "destination_time"],
        ),
        tool(
            "set_item_name",
            "Rename a media item's active take.",
            json!({
                "track_index": track_index(),
                "item_index": item_index(),
                "name": {"type": "string", "description": "New take name"}
            }),
            vec!["track_index", "item_index", "name"],
        ),

        // =========================================================================
        // MIDI notes
        // =========================================================================
        tool(
            "get_item_notes",
            "Read all MIDI notes from a media item's active take. Returns a list of notes with pitch, start_time (beats), duration (beats), velocity, and mute.",
            json!({"track_index": track_index(), "item_index": item_index()}),
            vec!["track_index", "item_index"],
        ),
        tool(
            "set_item_notes",
            "Set MIDI notes on a media item's active take. By default this replaces all existing notes. Set append=true to keep existing notes and add new ones.",
            json!({
                "track_index": track_index(),
                "item_index": item_index(),
                "notes": {
                    "type": "array",
                    "description": "Notes to write",
                    "items": {
                        "type": "object",
                        "properties": {
                            "pitch": {"type": "integer", "description": "MIDI pitch 0-127", "default": 60},
                            "start_time": {"type": "number", "description": "Start in beats (project time)", "default": 0.0},
                            "duration": {"type": "number", "description": "Length in beats", "default": 0.5},
                            "velocity": {"type": "integer", "description": "Velocity 0-127", "default": 100},
                            "mute": {"type": "boolean", "description": "Muted note", "default": false}
                        }
                    }
                },
                "append": {"type": "boolean", "description": "Keep existing notes", "default": false}
            }),
            vec!["track_index", "item_index", "notes"],
        ),

        // =========================================================================
        // Transport and time
        // =========================================================================
        tool("start_playback", "Start project playback.", json!({}), vec![]),
        tool("stop_playback", "Stop project playback.", json!({}), vec![]),
        tool(
            "set_tempo",
            "Set the project tempo in BPM (clamped to 1-960).",
            json!({
                "tempo": {"type": "number", "description": "Beats per minute", "minimum": 1.0, "maximum": 960.0}
            }),
            vec!["tempo"],
        ),
        tool(
            "set_time_signature",
            "Set the project time signature (e.g. 4/4, 5/4, 7/8).",
            json!({
                "numerator": {"type": "integer", "description": "Beats per measure"},
                "denominator": {"type": "integer", "description": "Beat unit"}
            }),
            vec!["numerator", "denominator"],
        ),
        tool(
            "undo",
            "Trigger REAPER's undo. Safety net for destructive operations.",
            json!({}),
            vec![],
        ),
        tool(
            "set_cursor_position",
            "Set the edit cursor position in beats.",
            json!({
                "time": {"type": "number", "description": "Position in beats, negative values clamp to 0"}
            }),
            vec!["time"],
        ),
        tool(
            "get_loop_region",
            "Get the loop/repeat region position and length in beats.",
            json!({}),
            vec![],
        ),
        tool(
            "set_loop_region",
            "Set the loop/repeat region. start and length are in beats.",
            json!({
                "start": {"type": "number", "description": "Loop start in beats"},
                "length": {"type": "number", "description": "Loop length in beats"}
            }),
            vec!["start", "length"],
        ),

        // =========================================================================
        // FX
        // =========================================================================
        tool(
            "add_fx",
            "Add an FX plugin to a track by name. The name is searched against installed VST/AU/JS plugins. Returns the FX index and resolved name.",
            json!({
                "track_index": track_index(),
                "fx_name": {"type": "string", "description": "Plugin name, e.g. ReaEQ"}
            }),
            vec!["track_index", "fx_name"],
        ),
        tool(
            "remove_fx",
            "Remove an FX from a track's FX chain by index.",
            json!({"track_index": track_index(), "fx_index": fx_index()}),
            vec!["track_index", "fx_index"],
        ),
        tool(
            "get_fx_parameters",
            "List all parameters of an FX on a track. Returns fx_name and a list of parameters with name, value, min, max.",
            json!({"track_index": track_index(), "fx_index": fx_index()}),
            vec!["track_index", "fx_index"],
        ),
        tool(
            "set_fx_parameter",
            "Set an FX parameter value. Value is clamped to the parameter's min/max range. Use get_fx_parameters to discover available parameters.",
            json!({
                "track_index": track_index(),
                "fx_index": fx_index(),
                "param_index": {"type": "integer", "description": "Parameter index (0-based)"},
                "value": {"type": "number", "description": "New value"}
            }),
            vec!["track_index", "fx_index", "param_index", "value"],
        ),
        tool(
            "create_track_with_fx",
            "Create a new track and add an FX plugin in a single operation. Faster than separate create_track + add_fx calls. Use index=-1 to append at the end. Optionally set the track name.",
            json!({
                "fx_name": {"type": "string", "description": "Plugin name, e.g. ReaSynth"},
                "index": {"type": "integer", "description": "Insert position, -1 appends", "default": -1},
                "name": {"type": "string", "description": "Track name", "default": ""}
            }),
            vec!["fx_name"],
        ),

        // =========================================================================
        // Markers / regions
        // =========================================================================
        tool(
            "add_marker",
            "Add a project marker at a position in beats.",
            json!({
                "position": {"type": "number", "description": "Position in beats"},
                "name": {"type": "string", "description": "Marker name", "default": ""}
            }),
            vec!["position"],
        ),
        tool(
            "add_region",
            "Add a project region spanning from start to end (in beats).",
            json!({
                "start": {"type": "number", "description": "Region start in beats"},
                "end": {"type": "number", "description": "Region end in beats"},
                "name": {"type": "string", "description": "Region name", "default": ""}
            }),
            vec!["start", "end"],
        ),
        tool(
            "get_markers",
            "List all project markers and regions with their positions in beats.",
            json!({}),
            vec![],
        ),
    ]
}
