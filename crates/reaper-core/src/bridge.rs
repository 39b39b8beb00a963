//! ReaScript bridge client
//!
//! Talks to a bridge running inside REAPER over TCP. The wire format is one
//! JSON object per line:
//!
//! ```text
//! -> {"id": 7, "fn": "TrackFX_GetParam", "args": [140230000, 0, 1]}
//! <- {"id": 7, "ret": [0.5, 0.0, 1.0]}
//! <- {"id": 7, "error": {"kind": "call", "message": "invalid FX index"}}
//! ```
//!
//! `args` follow the native ReaScript argument order with out-parameters
//! omitted. Functions with out-parameters answer with an array holding the
//! return value followed by the out-values, except where noted on the call
//! site. Handles travel as pointer-sized integers, `0` being null.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::api::{
    Connect, FxParam, MediaItem, MediaItemTake, MediaTrack, MidiNote, ProjectMarker, ReaScript,
    TempoMarkerEdit,
};
use crate::error::{ApiError, ApiResult};

/// Default bridge address, the same port REAPER's distributed API listens on
pub const DEFAULT_BRIDGE_ADDR: &str = "127.0.0.1:2306";

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    id: u64,
    #[serde(rename = "fn")]
    function: &'a str,
    args: Value,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    id: u64,
    #[serde(default)]
    ret: Value,
    #[serde(default)]
    error: Option<BridgeFault>,
}

#[derive(Debug, Deserialize)]
struct BridgeFault {
    kind: String,
    message: String,
}

/// Opens TCP connections to the ReaScript bridge
#[derive(Debug, Clone)]
pub struct BridgeConnector {
    addr: String,
}

impl BridgeConnector {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

impl Default for BridgeConnector {
    fn default() -> Self {
        Self::new(DEFAULT_BRIDGE_ADDR)
    }
}

impl Connect for BridgeConnector {
    fn connect(&self) -> ApiResult<Box<dyn ReaScript + Send>> {
        debug!("Connecting to ReaScript bridge at {}", self.addr);
        let stream = TcpStream::connect(&self.addr)?;
        stream.set_nodelay(true)?;
        Ok(Box::new(BridgeReaScript::new(stream)?))
    }
}

/// A live connection to the bridge
pub struct BridgeReaScript {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    next_id: u64,
}

impl BridgeReaScript {
    pub fn new(stream: TcpStream) -> ApiResult<Self> {
        let writer = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
            next_id: 1,
        })
    }

    /// Send one call and wait for its answer
    fn call(&mut self, function: &str, args: Value) -> ApiResult<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let request = BridgeRequest { id, function, args };
        let mut line = serde_json::to_string(&request)
            .map_err(|e| ApiError::Protocol(format!("Failed to encode {}: {}", function, e)))?;
        debug!("bridge -> {}", line);
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;

        let mut reply = String::new();
        if self.reader.read_line(&mut reply)? == 0 {
            return Err(ApiError::DisconnectedClient(
                "REAPER closed the bridge connection".to_string(),
            ));
        }
        debug!("bridge <- {}", reply.trim_end());

        let response: BridgeResponse = serde_json::from_str(&reply)
            .map_err(|e| ApiError::Protocol(format!("Invalid reply to {}: {}", function, e)))?;
        if response.id != id {
            return Err(ApiError::Protocol(format!(
                "Reply id {} does not match request id {}",
                response.id, id
            )));
        }

        match response.error {
            Some(fault) => Err(fault_to_error(function, fault)),
            None => Ok(response.ret),
        }
    }

    fn call_tuple(&mut self, function: &str, args: Value, len: usize) -> ApiResult<Vec<Value>> {
        match self.call(function, args)? {
            Value::Array(values) if values.len() >= len => Ok(values),
            other => Err(ApiError::Protocol(format!(
                "{} returned {}, expected {} values",
                function, other, len
            ))),
        }
    }

    fn call_unit(&mut self, function: &str, args: Value) -> ApiResult<()> {
        self.call(function, args).map(|_| ())
    }

    fn call_f64(&mut self, function: &str, args: Value) -> ApiResult<f64> {
        let ret = self.call(function, args)?;
        number(function, &ret)
    }

    fn call_i32(&mut self, function: &str, args: Value) -> ApiResult<i32> {
        let ret = self.call(function, args)?;
        integer(function, &ret)
    }

    fn call_bool(&mut self, function: &str, args: Value) -> ApiResult<bool> {
        let ret = self.call(function, args)?;
        flag(function, &ret)
    }

    fn call_handle(&mut self, function: &str, args: Value) -> ApiResult<u64> {
        let ret = self.call(function, args)?;
        handle(function, &ret)
    }

    /// `(retval, string out-param)` calls, e.g. `TrackFX_GetFXName`
    fn call_string(&mut self, function: &str, args: Value) -> ApiResult<String> {
        let values = self.call_tuple(function, args, 2)?;
        text(function, &values[1])
    }
}

fn fault_to_error(function: &str, fault: BridgeFault) -> ApiError {
    match fault.kind.as_str() {
        "disabled_api" => ApiError::DisabledDistApi(fault.message),
        "disconnected" => ApiError::DisconnectedClient(fault.message),
        _ => ApiError::call(function, fault.message),
    }
}

fn number(function: &str, value: &Value) -> ApiResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| ApiError::Protocol(format!("{} returned non-number {}", function, value)))
}

fn integer(function: &str, value: &Value) -> ApiResult<i32> {
    let n = number(function, value)?;
    Ok(n.round() as i32)
}

/// ReaScript reports booleans either as JSON booleans or as 0/1
fn flag(function: &str, value: &Value) -> ApiResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(_) => Ok(number(function, value)? != 0.0),
        _ => Err(ApiError::Protocol(format!(
            "{} returned non-boolean {}",
            function, value
        ))),
    }
}

fn handle(function: &str, value: &Value) -> ApiResult<u64> {
    match value {
        Value::Null => Ok(0),
        Value::Number(n) => n.as_u64().ok_or_else(|| {
            ApiError::Protocol(format!("{} returned invalid handle {}", function, value))
        }),
        _ => Err(ApiError::Protocol(format!(
            "{} returned invalid handle {}",
            function, value
        ))),
    }
}

fn text(function: &str, value: &Value) -> ApiResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Protocol(format!("{} returned non-string {}", function, value)))
}

impl ReaScript for BridgeReaScript {
    fn count_tracks(&mut self) -> ApiResult<i32> {
        self.call_i32("CountTracks", json!([0]))
    }

    fn get_track(&mut self, index: i32) -> ApiResult<MediaTrack> {
        let ptr = self.call_handle("GetTrack", json!([0, index]))?;
        if ptr == 0 {
            return Err(ApiError::call("GetTrack", format!("no track at index {}", index)));
        }
        Ok(MediaTrack(ptr))
    }

    fn project_time_signature(&mut self) -> ApiResult<(f64, f64)> {
        // -> [bpm, bpi]
        let v = self.call_tuple("GetProjectTimeSignature2", json!([0]), 2)?;
        Ok((
            number("GetProjectTimeSignature2", &v[0])?,
            number("GetProjectTimeSignature2", &v[1])?,
        ))
    }

    fn play_state(&mut self) -> ApiResult<i32> {
        self.call_i32("GetPlayState", json!([]))
    }

    fn cursor_position(&mut self) -> ApiResult<f64> {
        self.call_f64("GetCursorPosition", json!([]))
    }

    fn time_to_qn(&mut self, time: f64) -> ApiResult<f64> {
        self.call_f64("TimeMap2_timeToQN", json!([0, time]))
    }

    fn qn_to_time(&mut self, qn: f64) -> ApiResult<f64> {
        self.call_f64("TimeMap2_QNToTime", json!([0, qn]))
    }

    fn insert_track_at_index(&mut self, index: i32, want_defaults: bool) -> ApiResult<()> {
        self.call_unit("InsertTrackAtIndex", json!([index, want_defaults]))
    }

    fn delete_track(&mut self, track: MediaTrack) -> ApiResult<()> {
        self.call_unit("DeleteTrack", json!([track]))
    }

    fn track_name(&mut self, track: MediaTrack) -> ApiResult<String> {
        self.call_string("GetSetMediaTrackInfo_String", json!([track, "P_NAME", "", false]))
    }

    fn set_track_name(&mut self, track: MediaTrack, name: &str) -> ApiResult<()> {
        self.call_unit("GetSetMediaTrackInfo_String", json!([track, "P_NAME", name, true]))
    }

    fn track_info_value(&mut self, track: MediaTrack, param: &str) -> ApiResult<f64> {
        self.call_f64("GetMediaTrackInfo_Value", json!([track, param]))
    }

    fn set_track_info_value(
        &mut self,
        track: MediaTrack,
        param: &str,
        value: f64,
    ) -> ApiResult<()> {
        self.call_unit("SetMediaTrackInfo_Value", json!([track, param, value]))
    }

    fn count_track_media_items(&mut self, track: MediaTrack) -> ApiResult<i32> {
        self.call_i32("CountTrackMediaItems", json!([track]))
    }

    fn get_track_media_item(&mut self, track: MediaTrack, index: i32) -> ApiResult<MediaItem> {
        let ptr = self.call_handle("GetTrackMediaItem", json!([track, index]))?;
        if ptr == 0 {
            return Err(ApiError::call(
                "GetTrackMediaItem",
                format!("no item at index {}", index),
            ));
        }
        Ok(MediaItem(ptr))
    }

    fn item_info_value(&mut self, item: MediaItem, param: &str) -> ApiResult<f64> {
        self.call_f64("GetMediaItemInfo_Value", json!([item, param]))
    }

    fn active_take(&mut self, item: MediaItem) -> ApiResult<Option<MediaItemTake>> {
        let ptr = self.call_handle("GetActiveTake", json!([item]))?;
        Ok((ptr != 0).then_some(MediaItemTake(ptr)))
    }

    fn take_name(&mut self, take: MediaItemTake) -> ApiResult<String> {
        self.call_string("GetSetMediaItemTakeInfo_String", json!([take, "P_NAME", "", false]))
    }

    fn set_take_name(&mut self, take: MediaItemTake, name: &str) -> ApiResult<()> {
        self.call_unit("GetSetMediaItemTakeInfo_String", json!([take, "P_NAME", name, true]))
    }

    fn take_is_midi(&mut self, take: MediaItemTake) -> ApiResult<bool> {
        self.call_bool("TakeIsMIDI", json!([take]))
    }

    fn create_new_midi_item(
        &mut self,
        track: MediaTrack,
        start: f64,
        end: f64,
    ) -> ApiResult<MediaItem> {
        let ptr = self.call_handle("CreateNewMIDIItemInProj", json!([track, start, end, false]))?;
        if ptr == 0 {
            return Err(ApiError::call("CreateNewMIDIItemInProj", "item was not created"));
        }
        Ok(MediaItem(ptr))
    }

    fn delete_track_media_item(&mut self, track: MediaTrack, item: MediaItem) -> ApiResult<bool> {
        self.call_bool("DeleteTrackMediaItem", json!([track, item]))
    }

    fn select_all_media_items(&mut self, selected: bool) -> ApiResult<()> {
        self.call_unit("SelectAllMediaItems", json!([0, selected]))
    }

    fn set_media_item_selected(&mut self, item: MediaItem, selected: bool) -> ApiResult<()> {
        self.call_unit("SetMediaItemSelected", json!([item, selected]))
    }

    fn main_on_command(&mut self, command: i32) -> ApiResult<()> {
        self.call_unit("Main_OnCommand", json!([command, 0]))
    }

    fn set_edit_cur_pos(&mut self, time: f64, move_view: bool, seek_play: bool) -> ApiResult<()> {
        self.call_unit("SetEditCurPos", json!([time, move_view, seek_play]))
    }

    fn midi_count_notes(&mut self, take: MediaItemTake) -> ApiResult<i32> {
        // -> [retval, notecnt, ccevtcnt, textsyxevtcnt]
        let v = self.call_tuple("MIDI_CountEvts", json!([take]), 2)?;
        integer("MIDI_CountEvts", &v[1])
    }

    fn midi_get_note(&mut self, take: MediaItemTake, index: i32) -> ApiResult<MidiNote> {
        // -> [retval, selected, muted, startppq, endppq, chan, pitch, vel]
        const F: &str = "MIDI_GetNote";
        let v = self.call_tuple(F, json!([take, index]), 8)?;
        if !flag(F, &v[0])? {
            return Err(ApiError::call(F, format!("no note at index {}", index)));
        }
        Ok(MidiNote {
            selected: flag(F, &v[1])?,
            muted: flag(F, &v[2])?,
            start_ppq: number(F, &v[3])?,
            end_ppq: number(F, &v[4])?,
            channel: integer(F, &v[5])?,
            pitch: integer(F, &v[6])?,
            velocity: integer(F, &v[7])?,
        })
    }

    fn midi_delete_note(&mut self, take: MediaItemTake, index: i32) -> ApiResult<bool> {
        self.call_bool("MIDI_DeleteNote", json!([take, index]))
    }

    fn midi_insert_note(
        &mut self,
        take: MediaItemTake,
        note: &MidiNote,
        no_sort: bool,
    ) -> ApiResult<bool> {
        self.call_bool(
            "MIDI_InsertNote",
            json!([
                take,
                note.selected,
                note.muted,
                note.start_ppq,
                note.end_ppq,
                note.channel,
                note.pitch,
                note.velocity,
                no_sort
            ]),
        )
    }

    fn midi_sort(&mut self, take: MediaItemTake) -> ApiResult<()> {
        self.call_unit("MIDI_Sort", json!([take]))
    }

    fn midi_proj_time_from_ppq(&mut self, take: MediaItemTake, ppq: f64) -> ApiResult<f64> {
        self.call_f64("MIDI_GetProjTimeFromPPQPos", json!([take, ppq]))
    }

    fn midi_ppq_from_proj_time(&mut self, take: MediaItemTake, time: f64) -> ApiResult<f64> {
        self.call_f64("MIDI_GetPPQPosFromProjTime", json!([take, time]))
    }

    fn on_play_button(&mut self) -> ApiResult<()> {
        self.call_unit("OnPlayButton", json!([]))
    }

    fn on_stop_button(&mut self) -> ApiResult<()> {
        self.call_unit("OnStopButton", json!([]))
    }

    fn set_current_bpm(&mut self, bpm: f64, want_undo: bool) -> ApiResult<()> {
        self.call_unit("SetCurrentBPM", json!([0, bpm, want_undo]))
    }

    fn master_tempo(&mut self) -> ApiResult<f64> {
        self.call_f64("Master_GetTempo", json!([]))
    }

    fn set_tempo_time_sig_marker(&mut self, edit: &TempoMarkerEdit) -> ApiResult<bool> {
        self.call_bool(
            "SetTempoTimeSigMarker",
            json!([
                0,
                edit.point_index,
                edit.time,
                edit.measure,
                edit.beat,
                edit.bpm,
                edit.numerator,
                edit.denominator,
                edit.linear
            ]),
        )
    }

    fn update_timeline(&mut self) -> ApiResult<()> {
        self.call_unit("UpdateTimeline", json!([]))
    }

    fn undo(&mut self) -> ApiResult<bool> {
        self.call_bool("Undo_DoUndo2", json!([0]))
    }

    fn loop_time_range(&mut self) -> ApiResult<(f64, f64)> {
        // -> [start, end]
        const F: &str = "GetSet_LoopTimeRange";
        let v = self.call_tuple(F, json!([false, true, 0.0, 0.0, false]), 2)?;
        Ok((number(F, &v[0])?, number(F, &v[1])?))
    }

    fn set_loop_time_range(&mut self, start: f64, end: f64) -> ApiResult<()> {
        self.call_unit("GetSet_LoopTimeRange", json!([true, true, start, end, false]))
    }

    fn track_fx_add_by_name(
        &mut self,
        track: MediaTrack,
        name: &str,
        instantiate: i32,
    ) -> ApiResult<i32> {
        self.call_i32("TrackFX_AddByName", json!([track, name, false, instantiate]))
    }

    fn track_fx_count(&mut self, track: MediaTrack) -> ApiResult<i32> {
        self.call_i32("TrackFX_GetCount", json!([track]))
    }

    fn track_fx_name(&mut self, track: MediaTrack, fx: i32) -> ApiResult<String> {
        self.call_string("TrackFX_GetFXName", json!([track, fx]))
    }

    fn track_fx_delete(&mut self, track: MediaTrack, fx: i32) -> ApiResult<bool> {
        self.call_bool("TrackFX_Delete", json!([track, fx]))
    }

    fn track_fx_num_params(&mut self, track: MediaTrack, fx: i32) -> ApiResult<i32> {
        self.call_i32("TrackFX_GetNumParams", json!([track, fx]))
    }

    fn track_fx_param_name(&mut self, track: MediaTrack, fx: i32, param: i32) -> ApiResult<String> {
        self.call_string("TrackFX_GetParamName", json!([track, fx, param]))
    }

    fn track_fx_param(&mut self, track: MediaTrack, fx: i32, param: i32) -> ApiResult<FxParam> {
        // -> [value, min, max]
        const F: &str = "TrackFX_GetParam";
        let v = self.call_tuple(F, json!([track, fx, param]), 3)?;
        Ok(FxParam {
            value: number(F, &v[0])?,
            min: number(F, &v[1])?,
            max: number(F, &v[2])?,
        })
    }

    fn track_fx_set_param(
        &mut self,
        track: MediaTrack,
        fx: i32,
        param: i32,
        value: f64,
    ) -> ApiResult<bool> {
        self.call_bool("TrackFX_SetParam", json!([track, fx, param, value]))
    }

    fn add_project_marker(
        &mut self,
        is_region: bool,
        position: f64,
        region_end: f64,
        name: &str,
        want_index: i32,
    ) -> ApiResult<i32> {
        self.call_i32(
            "AddProjectMarker",
            json!([0, is_region, position, region_end, name, want_index]),
        )
    }

    fn count_project_markers(&mut self) -> ApiResult<(i32, i32)> {
        // -> [total, markers, regions]
        const F: &str = "CountProjectMarkers";
        let v = self.call_tuple(F, json!([0]), 3)?;
        Ok((integer(F, &v[1])?, integer(F, &v[2])?))
    }

    fn enum_project_markers(&mut self, index: i32) -> ApiResult<ProjectMarker> {
        // -> [retval, isrgn, pos, rgnend, name, markrgnindexnumber]
        const F: &str = "EnumProjectMarkers";
        let v = self.call_tuple(F, json!([index]), 6)?;
        Ok(ProjectMarker {
            is_region: flag(F, &v[1])?,
            position: number(F, &v[2])?,
            region_end: number(F, &v[3])?,
            name: text(F, &v[4])?,
            index: integer(F, &v[5])?,
        })
    }
}
