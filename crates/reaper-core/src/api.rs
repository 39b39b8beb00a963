//! The ReaScript API surface used by reaper-mcp
//!
//! Each method maps onto one native ReaScript function (named in its doc
//! line). Project arguments are always the current project (`0` natively),
//! so they are left out of the Rust signatures.

use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

/// `Item: Copy items`
pub const ACTION_COPY_ITEMS: i32 = 40698;
/// `Item: Paste items/tracks`
pub const ACTION_PASTE_ITEMS: i32 = 42398;
/// `Transport: Play`
pub const ACTION_PLAY: i32 = 1007;
/// `Transport: Stop`
pub const ACTION_STOP: i32 = 1016;

/// Opaque `MediaTrack*`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaTrack(pub u64);

/// Opaque `MediaItem*`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaItem(pub u64);

/// Opaque `MediaItem_Take*`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaItemTake(pub u64);

/// A MIDI note as stored in a take, positions in take-relative ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiNote {
    pub selected: bool,
    pub muted: bool,
    pub start_ppq: f64,
    pub end_ppq: f64,
    pub channel: i32,
    pub pitch: i32,
    pub velocity: i32,
}

/// Current value and range of an FX parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxParam {
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// One entry from `EnumProjectMarkers`, positions in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMarker {
    pub is_region: bool,
    pub position: f64,
    pub region_end: f64,
    pub name: String,
    /// Displayed marker/region number
    pub index: i32,
}

/// Arguments of `SetTempoTimeSigMarker`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoMarkerEdit {
    /// Existing point to edit, `-1` to add
    pub point_index: i32,
    pub time: f64,
    pub measure: i32,
    pub beat: f64,
    pub bpm: f64,
    pub numerator: i32,
    pub denominator: i32,
    pub linear: bool,
}

/// REAPER's native scripting API, as far as reaper-mcp needs it
pub trait ReaScript {
    // ---------------------------------------------------------------------
    // Project and tempo map
    // ---------------------------------------------------------------------

    /// `CountTracks`
    fn count_tracks(&mut self) -> ApiResult<i32>;
    /// `GetTrack`
    fn get_track(&mut self, index: i32) -> ApiResult<MediaTrack>;
    /// `GetProjectTimeSignature2`, returns `(bpm, beats per measure)`
    fn project_time_signature(&mut self) -> ApiResult<(f64, f64)>;
    /// `GetPlayState`, bit 1 = playing, bit 2 = paused, bit 4 = recording
    fn play_state(&mut self) -> ApiResult<i32>;
    /// `GetCursorPosition`
    fn cursor_position(&mut self) -> ApiResult<f64>;
    /// `TimeMap2_timeToQN`
    fn time_to_qn(&mut self, time: f64) -> ApiResult<f64>;
    /// `TimeMap2_QNToTime`
    fn qn_to_time(&mut self, qn: f64) -> ApiResult<f64>;

    // ---------------------------------------------------------------------
    // Tracks
    // ---------------------------------------------------------------------

    /// `InsertTrackAtIndex`
    fn insert_track_at_index(&mut self, index: i32, want_defaults: bool) -> ApiResult<()>;
    /// `DeleteTrack`
    fn delete_track(&mut self, track: MediaTrack) -> ApiResult<()>;
    /// `GetSetMediaTrackInfo_String(track, "P_NAME", "", false)`
    fn track_name(&mut self, track: MediaTrack) -> ApiResult<String>;
    /// `GetSetMediaTrackInfo_String(track, "P_NAME", name, true)`
    fn set_track_name(&mut self, track: MediaTrack, name: &str) -> ApiResult<()>;
    /// `GetMediaTrackInfo_Value`
    fn track_info_value(&mut self, track: MediaTrack, param: &str) -> ApiResult<f64>;
    /// `SetMediaTrackInfo_Value`
    fn set_track_info_value(&mut self, track: MediaTrack, param: &str, value: f64) -> ApiResult<()>;

    // ---------------------------------------------------------------------
    // Items and takes
    // ---------------------------------------------------------------------

    /// `CountTrackMediaItems`
    fn count_track_media_items(&mut self, track: MediaTrack) -> ApiResult<i32>;
    /// `GetTrackMediaItem`
    fn get_track_media_item(&mut self, track: MediaTrack, index: i32) -> ApiResult<MediaItem>;
    /// `GetMediaItemInfo_Value`
    fn item_info_value(&mut self, item: MediaItem, param: &str) -> ApiResult<f64>;
    /// `GetActiveTake`, `None` for an empty item
    fn active_take(&mut self, item: MediaItem) -> ApiResult<Option<MediaItemTake>>;
    /// `GetSetMediaItemTakeInfo_String(take, "P_NAME", "", false)`
    fn take_name(&mut self, take: MediaItemTake) -> ApiResult<String>;
    /// `GetSetMediaItemTakeInfo_String(take, "P_NAME", name, true)`
    fn set_take_name(&mut self, take: MediaItemTake, name: &str) -> ApiResult<()>;
    /// `TakeIsMIDI`
    fn take_is_midi(&mut self, take: MediaItemTake) -> ApiResult<bool>;
    /// `CreateNewMIDIItemInProj` with times in seconds
    fn create_new_midi_item(
        &mut self,
        track: MediaTrack,
        start: f64,
        end: f64,
    ) -> ApiResult<MediaItem>;
    /// `DeleteTrackMediaItem`
    fn delete_track_media_item(&mut self, track: MediaTrack, item: MediaItem) -> ApiResult<bool>;
    /// `SelectAllMediaItems`
    fn select_all_media_items(&mut self, selected: bool) -> ApiResult<()>;
    /// `SetMediaItemSelected`
    fn set_media_item_selected(&mut self, item: MediaItem, selected: bool) -> ApiResult<()>;
    /// `Main_OnCommand`
    fn main_on_command(&mut self, command: i32) -> ApiResult<()>;
    /// `SetEditCurPos`
    fn set_edit_cur_pos(&mut self, time: f64, move_view: bool, seek_play: bool) -> ApiResult<()>;

    // ---------------------------------------------------------------------
    // MIDI
    // ---------------------------------------------------------------------

    /// `MIDI_CountEvts`, note count only
    fn midi_count_notes(&mut self, take: MediaItemTake) -> ApiResult<i32>;
    /// `MIDI_GetNote`
    fn midi_get_note(&mut self, take: MediaItemTake, index: i32) -> ApiResult<MidiNote>;
    /// `MIDI_DeleteNote`
    fn midi_delete_note(&mut self, take: MediaItemTake, index: i32) -> ApiResult<bool>;
    /// `MIDI_InsertNote`
    fn midi_insert_note(
        &mut self,
        take: MediaItemTake,
        note: &MidiNote,
        no_sort: bool,
    ) -> ApiResult<bool>;
    /// `MIDI_Sort`
    fn midi_sort(&mut self, take: MediaItemTake) -> ApiResult<()>;
    /// `MIDI_GetProjTimeFromPPQPos`
    fn midi_proj_time_from_ppq(&mut self, take: MediaItemTake, ppq: f64) -> ApiResult<f64>;
    /// `MIDI_GetPPQPosFromProjTime`
    fn midi_ppq_from_proj_time(&mut self, take: MediaItemTake, time: f64) -> ApiResult<f64>;

    // ---------------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------------

    /// `OnPlayButton`
    fn on_play_button(&mut self) -> ApiResult<()>;
    /// `OnStopButton`
    fn on_stop_button(&mut self) -> ApiResult<()>;
    /// `SetCurrentBPM`
    fn set_current_bpm(&mut self, bpm: f64, want_undo: bool) -> ApiResult<()>;
    /// `Master_GetTempo`
    fn master_tempo(&mut self) -> ApiResult<f64>;
    /// `SetTempoTimeSigMarker`
    fn set_tempo_time_sig_marker(&mut self, edit: &TempoMarkerEdit) -> ApiResult<bool>;
    /// `UpdateTimeline`
    fn update_timeline(&mut self) -> ApiResult<()>;
    /// `Undo_DoUndo2`
    fn undo(&mut self) -> ApiResult<bool>;
    /// `GetSet_LoopTimeRange(false, true, ...)`, returns `(start, end)`
    fn loop_time_range(&mut self) -> ApiResult<(f64, f64)>;
    /// `GetSet_LoopTimeRange(true, true, start, end, false)`
    fn set_loop_time_range(&mut self, start: f64, end: f64) -> ApiResult<()>;

    // ---------------------------------------------------------------------
    // FX
    // ---------------------------------------------------------------------

    /// `TrackFX_AddByName`, `-1` when the host cannot resolve the name
    fn track_fx_add_by_name(
        &mut self,
        track: MediaTrack,
        name: &str,
        instantiate: i32,
    ) -> ApiResult<i32>;
    /// `TrackFX_GetCount`
    fn track_fx_count(&mut self, track: MediaTrack) -> ApiResult<i32>;
    /// `TrackFX_GetFXName`
    fn track_fx_name(&mut self, track: MediaTrack, fx: i32) -> ApiResult<String>;
    /// `TrackFX_Delete`
    fn track_fx_delete(&mut self, track: MediaTrack, fx: i32) -> ApiResult<bool>;
    /// `TrackFX_GetNumParams`
    fn track_fx_num_params(&mut self, track: MediaTrack, fx: i32) -> ApiResult<i32>;
    /// `TrackFX_GetParamName`
    fn track_fx_param_name(&mut self, track: MediaTrack, fx: i32, param: i32) -> ApiResult<String>;
    /// `TrackFX_GetParam`
    fn track_fx_param(&mut self, track: MediaTrack, fx: i32, param: i32) -> ApiResult<FxParam>;
    /// `TrackFX_SetParam`
    fn track_fx_set_param(
        &mut self,
        track: MediaTrack,
        fx: i32,
        param: i32,
        value: f64,
    ) -> ApiResult<bool>;

    // ---------------------------------------------------------------------
    // Markers and regions
    // ---------------------------------------------------------------------

    /// `AddProjectMarker`, returns the assigned marker/region number
    fn add_project_marker(
        &mut self,
        is_region: bool,
        position: f64,
        region_end: f64,
        name: &str,
        want_index: i32,
    ) -> ApiResult<i32>;
    /// `CountProjectMarkers`, returns `(markers, regions)`
    fn count_project_markers(&mut self) -> ApiResult<(i32, i32)>;
    /// `EnumProjectMarkers`
    fn enum_project_markers(&mut self, index: i32) -> ApiResult<ProjectMarker>;
}

/// Opens connections to a ReaScript backend
pub trait Connect: Send {
    fn connect(&self) -> ApiResult<Box<dyn ReaScript + Send>>;
}
