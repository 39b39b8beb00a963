//! Typed parameters for each command
//!
//! The facade deserializes tool arguments into these (applying defaults),
//! the command table deserializes the forwarded mapping back into them.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Index meaning "append after the last track"
pub const APPEND: i32 = -1;

fn default_append() -> i32 {
    APPEND
}

fn default_item_length() -> f64 {
    4.0
}

fn default_pitch() -> i32 {
    60
}

fn default_duration() -> f64 {
    0.5
}

fn default_velocity() -> i32 {
    100
}

/// Integer field that also takes integral floats such as `2.0`
fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return Err(D::Error::custom(format!("expected an integer, got {}", value)));
    }
    Ok(value as i32)
}

fn is_blank(name: &Option<String>) -> bool {
    name.as_deref().map_or(true, str::is_empty)
}

/// Commands without arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoParams {}

// ── Tracks ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrackParams {
    #[serde(default = "default_append", deserialize_with = "int")]
    pub index: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTrackNameParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTrackVolumeParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    /// Linear gain, 1.0 is unity
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTrackPanParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    pub pan: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTrackMuteParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    pub mute: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTrackSoloParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    pub solo: bool,
}

// ── Items ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    #[serde(deserialize_with = "int")]
    pub item_index: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMidiItemParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    /// Beats
    pub position: f64,
    /// Beats
    #[serde(default = "default_item_length")]
    pub length: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateItemParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    #[serde(deserialize_with = "int")]
    pub item_index: i32,
    /// Beats
    pub destination_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetItemNameParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    #[serde(deserialize_with = "int")]
    pub item_index: i32,
    pub name: String,
}

// ── MIDI ────────────────────────────────────────────────────────

/// One note as agents describe it, times in beats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSpec {
    #[serde(default = "default_pitch", deserialize_with = "int")]
    pub pitch: i32,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default = "default_velocity", deserialize_with = "int")]
    pub velocity: i32,
    #[serde(default)]
    pub mute: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetItemNotesParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    #[serde(deserialize_with = "int")]
    pub item_index: i32,
    pub notes: Vec<NoteSpec>,
    /// Keep existing notes instead of replacing them
    #[serde(default)]
    pub append: bool,
}

// ── Transport and time ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTempoParams {
    pub tempo: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSignatureParams {
    #[serde(deserialize_with = "int")]
    pub numerator: i32,
    #[serde(deserialize_with = "int")]
    pub denominator: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorParams {
    /// Beats
    pub time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopRegionParams {
    pub start: f64,
    pub length: f64,
}

// ── FX ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddFxParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    pub fx_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    #[serde(deserialize_with = "int")]
    pub fx_index: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFxParameterParams {
    #[serde(deserialize_with = "int")]
    pub track_index: i32,
    #[serde(deserialize_with = "int")]
    pub fx_index: i32,
    #[serde(deserialize_with = "int")]
    pub param_index: i32,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTrackWithFxParams {
    pub fx_name: String,
    #[serde(default = "default_append", deserialize_with = "int")]
    pub index: i32,
    /// Left out of the forwarded mapping when empty
    #[serde(default, skip_serializing_if = "is_blank")]
    pub name: Option<String>,
}

// ── Markers ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMarkerParams {
    pub position: f64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRegionParams {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_note_defaults() {
        let note: NoteSpec = serde_json::from_value(json!({"pitch": 64})).unwrap();
        assert_eq!(
            note,
            NoteSpec {
                pitch: 64,
                start_time: 0.0,
                duration: 0.5,
                velocity: 100,
                mute: false,
            }
        );
    }

    #[test]
    fn test_blank_track_name_is_dropped() {
        let params: CreateTrackWithFxParams =
            serde_json::from_value(json!({"fx_name": "ReaEQ", "name": ""})).unwrap();
        assert_eq!(params.index, APPEND);
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"fx_name": "ReaEQ", "index": -1})
        );
    }

    #[test]
    fn test_integral_floats_are_indices() {
        let params: ItemParams =
            serde_json::from_value(json!({"track_index": 0.0, "item_index": 2})).unwrap();
        assert_eq!((params.track_index, params.item_index), (0, 2));

        let note: NoteSpec = serde_json::from_value(json!({"pitch": 64.0})).unwrap();
        assert_eq!(note.pitch, 64);
    }

    #[test]
    fn test_fractional_index_is_rejected() {
        let err = serde_json::from_value::<TrackParams>(json!({"track_index": 0.5})).unwrap_err();
        assert!(err.to_string().contains("expected an integer, got 0.5"));

        let err = serde_json::from_value::<TrackParams>(json!({"track_index": 3e10})).unwrap_err();
        assert!(err.to_string().contains("expected an integer"));
    }

    #[test]
    fn test_missing_required_field() {
        let err = serde_json::from_value::<TrackParams>(json!({})).unwrap_err();
        assert!(err.to_string().contains("track_index"));
    }
}
