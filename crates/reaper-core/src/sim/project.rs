//! In-memory REAPER project
//!
//! Behaves like the parts of REAPER reaper-mcp drives: positional tracks
//! and items, take-relative MIDI ticks at 960 PPQ, a piecewise tempo map,
//! the item clipboard and an undo history.

use std::collections::HashSet;

use crate::api::{
    FxParam, MediaItem, MediaItemTake, MediaTrack, MidiNote, ProjectMarker, TempoMarkerEdit,
    ACTION_COPY_ITEMS, ACTION_PASTE_ITEMS, ACTION_PLAY, ACTION_STOP,
};
use crate::error::{ApiError, ApiResult};

use super::catalog;
use super::tempo::TempoMap;

/// Ticks per quarter note in MIDI takes
pub const PPQ: f64 = 960.0;

#[derive(Debug, Clone)]
pub struct Track {
    pub id: u64,
    pub name: String,
    pub volume: f64,
    pub pan: f64,
    pub mute: bool,
    pub solo: i32,
    pub rec_arm: bool,
    pub items: Vec<Item>,
    pub fx: Vec<Fx>,
}

impl Track {
    fn new(id: u64) -> Self {
        Self {
            id,
            name: String::new(),
            volume: 1.0,
            pan: 0.0,
            mute: false,
            solo: 0,
            rec_arm: false,
            items: Vec::new(),
            fx: Vec::new(),
        }
    }

    fn info(&self, param: &str) -> Option<f64> {
        Some(match param {
            "D_VOL" => self.volume,
            "D_PAN" => self.pan,
            "B_MUTE" => bool_value(self.mute),
            "I_SOLO" => self.solo as f64,
            "I_RECARM" => bool_value(self.rec_arm),
            _ => return None,
        })
    }

    fn set_info(&mut self, param: &str, value: f64) -> bool {
        match param {
            "D_VOL" => self.volume = value,
            "D_PAN" => self.pan = value,
            "B_MUTE" => self.mute = value != 0.0,
            "I_SOLO" => self.solo = value as i32,
            "I_RECARM" => self.rec_arm = value != 0.0,
            _ => return false,
        }
        true
    }
}

fn bool_value(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    pub id: u64,
    pub position: f64,
    pub length: f64,
    pub selected: bool,
    pub takes: Vec<Take>,
    pub active_take: usize,
}

#[derive(Debug, Clone)]
pub struct Take {
    pub id: u64,
    pub name: String,
    /// `None` for audio takes
    pub notes: Option<Vec<MidiNote>>,
}

#[derive(Debug, Clone)]
pub struct Fx {
    pub name: String,
    pub params: Vec<FxParamState>,
}

#[derive(Debug, Clone)]
pub struct FxParamState {
    pub name: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone)]
pub struct Marker {
    pub is_region: bool,
    pub position: f64,
    pub end: f64,
    pub name: String,
    pub number: i32,
}

/// Everything an undo step restores
#[derive(Debug, Clone)]
pub struct ProjectState {
    pub tracks: Vec<Track>,
    pub markers: Vec<Marker>,
    pub tempo: TempoMap,
}

#[derive(Debug, Clone, Default)]
struct Transport {
    cursor: f64,
    play_state: i32,
    loop_range: (f64, f64),
}

/// A simulated project plus the session state around it
#[derive(Debug)]
pub struct SimProject {
    pub(crate) state: ProjectState,
    transport: Transport,
    history: Vec<ProjectState>,
    /// An undo point is already open for an unsorted MIDI edit
    midi_edit_open: bool,
    /// Copied items with the index of the track they came from
    clipboard: Vec<(usize, Item)>,
    next_id: u64,
    pub(crate) reachable: bool,
    /// Native functions that report failure
    pub(crate) refused: HashSet<&'static str>,
}

impl SimProject {
    pub fn new(bpm: f64, numerator: i32, denominator: i32) -> Self {
        Self {
            state: ProjectState {
                tracks: Vec::new(),
                markers: Vec::new(),
                tempo: TempoMap::new(bpm, numerator, denominator),
            },
            transport: Transport::default(),
            history: Vec::new(),
            midi_edit_open: false,
            clipboard: Vec::new(),
            next_id: 0x1000,
            reachable: true,
            refused: HashSet::new(),
        }
    }

    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    pub(crate) fn refuses(&self, function: &str) -> bool {
        self.refused.contains(function)
    }

    pub fn tempo_mut(&mut self) -> &mut TempoMap {
        &mut self.state.tempo
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Record an undo point before an edit
    fn checkpoint(&mut self) {
        self.history.push(self.state.clone());
        self.midi_edit_open = false;
    }

    /// Note edits between two `MIDI_Sort` calls share one undo point
    fn midi_checkpoint(&mut self) {
        if !self.midi_edit_open {
            self.checkpoint();
            self.midi_edit_open = true;
        }
    }

    // -------------------------------------------------------------------------
    // Handle lookups
    // -------------------------------------------------------------------------

    fn track_pos(&self, function: &str, track: MediaTrack) -> ApiResult<usize> {
        self.state
            .tracks
            .iter()
            .position(|t| t.id == track.0)
            .ok_or_else(|| ApiError::call(function, "invalid MediaTrack"))
    }

    fn track(&self, function: &str, track: MediaTrack) -> ApiResult<&Track> {
        let pos = self.track_pos(function, track)?;
        Ok(&self.state.tracks[pos])
    }

    fn track_mut(&mut self, function: &str, track: MediaTrack) -> ApiResult<&mut Track> {
        let pos = self.track_pos(function, track)?;
        Ok(&mut self.state.tracks[pos])
    }

    fn item_pos(&self, function: &str, item: MediaItem) -> ApiResult<(usize, usize)> {
        for (t, track) in self.state.tracks.iter().enumerate() {
            if let Some(i) = track.items.iter().position(|it| it.id == item.0) {
                return Ok((t, i));
            }
        }
        Err(ApiError::call(function, "invalid MediaItem"))
    }

    fn item(&self, function: &str, item: MediaItem) -> ApiResult<&Item> {
        let (t, i) = self.item_pos(function, item)?;
        Ok(&self.state.tracks[t].items[i])
    }

    fn take_pos(&self, function: &str, take: MediaItemTake) -> ApiResult<(usize, usize, usize)> {
        for (t, track) in self.state.tracks.iter().enumerate() {
            for (i, item) in track.items.iter().enumerate() {
                if let Some(k) = item.takes.iter().position(|tk| tk.id == take.0) {
                    return Ok((t, i, k));
                }
            }
        }
        Err(ApiError::call(function, "invalid MediaItem_Take"))
    }

    fn take(&self, function: &str, take: MediaItemTake) -> ApiResult<&Take> {
        let (t, i, k) = self.take_pos(function, take)?;
        Ok(&self.state.tracks[t].items[i].takes[k])
    }

    fn take_mut(&mut self, function: &str, take: MediaItemTake) -> ApiResult<&mut Take> {
        let (t, i, k) = self.take_pos(function, take)?;
        Ok(&mut self.state.tracks[t].items[i].takes[k])
    }

    fn notes_mut(&mut self, function: &str, take: MediaItemTake) -> ApiResult<&mut Vec<MidiNote>> {
        self.take_mut(function, take)?
            .notes
            .as_mut()
            .ok_or_else(|| ApiError::call(function, "take is not MIDI"))
    }

    /// Quarter-note position where a take's tick zero sits
    fn take_start_qn(&self, function: &str, take: MediaItemTake) -> ApiResult<f64> {
        let (t, i, _) = self.take_pos(function, take)?;
        let position = self.state.tracks[t].items[i].position;
        Ok(self.state.tempo.time_to_qn(position))
    }

    fn fx(&self, function: &str, track: MediaTrack, fx: i32) -> ApiResult<&Fx> {
        let track = self.track(function, track)?;
        usize::try_from(fx)
            .ok()
            .and_then(|i| track.fx.get(i))
            .ok_or_else(|| ApiError::call(function, format!("invalid FX index {}", fx)))
    }

    fn fx_param(
        &self,
        function: &str,
        track: MediaTrack,
        fx: i32,
        param: i32,
    ) -> ApiResult<&FxParamState> {
        let fx = self.fx(function, track, fx)?;
        usize::try_from(param)
            .ok()
            .and_then(|i| fx.params.get(i))
            .ok_or_else(|| ApiError::call(function, format!("invalid parameter index {}", param)))
    }

    fn sorted_markers(&self) -> Vec<&Marker> {
        let mut markers: Vec<&Marker> = self.state.markers.iter().collect();
        markers.sort_by(|a, b| a.position.total_cmp(&b.position));
        markers
    }

    // -------------------------------------------------------------------------
    // Project and tempo map
    // -------------------------------------------------------------------------

    pub fn count_tracks(&self) -> i32 {
        self.state.tracks.len() as i32
    }

    pub fn get_track(&self, index: i32) -> ApiResult<MediaTrack> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.state.tracks.get(i))
            .map(|t| MediaTrack(t.id))
            .ok_or_else(|| ApiError::call("GetTrack", format!("no track at index {}", index)))
    }

    pub fn project_time_signature(&self) -> (f64, f64) {
        let first = self.state.tempo.first();
        (first.bpm, first.numerator as f64)
    }

    pub fn play_state(&self) -> i32 {
        self.transport.play_state
    }

    pub fn cursor_position(&self) -> f64 {
        self.transport.cursor
    }

    pub fn time_to_qn(&self, time: f64) -> f64 {
        self.state.tempo.time_to_qn(time)
    }

    pub fn qn_to_time(&self, qn: f64) -> f64 {
        self.state.tempo.qn_to_time(qn)
    }

    // -------------------------------------------------------------------------
    // Tracks
    // -------------------------------------------------------------------------

    pub fn insert_track_at_index(&mut self, index: i32, _want_defaults: bool) {
        self.checkpoint();
        let id = self.alloc_id();
        let index = (index.max(0) as usize).min(self.state.tracks.len());
        self.state.tracks.insert(index, Track::new(id));
    }

    pub fn delete_track(&mut self, track: MediaTrack) -> ApiResult<()> {
        let pos = self.track_pos("DeleteTrack", track)?;
        self.checkpoint();
        self.state.tracks.remove(pos);
        Ok(())
    }

    pub fn track_name(&self, track: MediaTrack) -> ApiResult<String> {
        Ok(self.track("GetSetMediaTrackInfo_String", track)?.name.clone())
    }

    pub fn set_track_name(&mut self, track: MediaTrack, name: &str) -> ApiResult<()> {
        self.track_pos("GetSetMediaTrackInfo_String", track)?;
        self.checkpoint();
        self.track_mut("GetSetMediaTrackInfo_String", track)?.name = name.to_string();
        Ok(())
    }

    pub fn track_info_value(&self, track: MediaTrack, param: &str) -> ApiResult<f64> {
        self.track("GetMediaTrackInfo_Value", track)?
            .info(param)
            .ok_or_else(|| {
                ApiError::call(
                    "GetMediaTrackInfo_Value",
                    format!("unknown parameter {}", param),
                )
            })
    }

    pub fn set_track_info_value(
        &mut self,
        track: MediaTrack,
        param: &str,
        value: f64,
    ) -> ApiResult<()> {
        self.track_pos("SetMediaTrackInfo_Value", track)?;
        self.checkpoint();
        if self.track_mut("SetMediaTrackInfo_Value", track)?.set_info(param, value) {
            Ok(())
        } else {
            Err(ApiError::call("SetMediaTrackInfo_Value", format!("unknown parameter {}", param)))
        }
    }

    // -------------------------------------------------------------------------
    // Items and takes
    // -------------------------------------------------------------------------

    pub fn count_track_media_items(&self, track: MediaTrack) -> ApiResult<i32> {
        Ok(self.track("CountTrackMediaItems", track)?.items.len() as i32)
    }

    pub fn get_track_media_item(&self, track: MediaTrack, index: i32) -> ApiResult<MediaItem> {
        let track = self.track("GetTrackMediaItem", track)?;
        usize::try_from(index)
            .ok()
            .and_then(|i| track.items.get(i))
            .map(|it| MediaItem(it.id))
            .ok_or_else(|| {
                ApiError::call("GetTrackMediaItem", format!("no item at index {}", index))
            })
    }

    pub fn item_info_value(&self, item: MediaItem, param: &str) -> ApiResult<f64> {
        let item = self.item("GetMediaItemInfo_Value", item)?;
        match param {
            "D_POSITION" => Ok(item.position),
            "D_LENGTH" => Ok(item.length),
            "B_UISEL" => Ok(bool_value(item.selected)),
            _ => Err(ApiError::call(
                "GetMediaItemInfo_Value",
                format!("unknown parameter {}", param),
            )),
        }
    }

    pub fn active_take(&self, item: MediaItem) -> ApiResult<Option<MediaItemTake>> {
        let item = self.item("GetActiveTake", item)?;
        Ok(item.takes.get(item.active_take).map(|t| MediaItemTake(t.id)))
    }

    pub fn take_name(&self, take: MediaItemTake) -> ApiResult<String> {
        Ok(self.take("GetSetMediaItemTakeInfo_String", take)?.name.clone())
    }

    pub fn set_take_name(&mut self, take: MediaItemTake, name: &str) -> ApiResult<()> {
        self.take_pos("GetSetMediaItemTakeInfo_String", take)?;
        self.checkpoint();
        self.take_mut("GetSetMediaItemTakeInfo_String", take)?.name = name.to_string();
        Ok(())
    }

    pub fn take_is_midi(&self, take: MediaItemTake) -> ApiResult<bool> {
        Ok(self.take("TakeIsMIDI", take)?.notes.is_some())
    }

    /// Add an audio item with no source; used to seed projects
    pub fn add_audio_item(
        &mut self,
        track: MediaTrack,
        start: f64,
        end: f64,
        name: &str,
    ) -> ApiResult<MediaItem> {
        self.new_item(track, "AddMediaItemToTrack", start, end, name, None)
    }

    pub fn create_new_midi_item(
        &mut self,
        track: MediaTrack,
        start: f64,
        end: f64,
    ) -> ApiResult<MediaItem> {
        self.new_item(track, "CreateNewMIDIItemInProj", start, end, "", Some(Vec::new()))
    }

    fn new_item(
        &mut self,
        track: MediaTrack,
        function: &str,
        start: f64,
        end: f64,
        name: &str,
        notes: Option<Vec<MidiNote>>,
    ) -> ApiResult<MediaItem> {
        let pos = self.track_pos(function, track)?;
        if end <= start {
            return Err(ApiError::call(function, "item end must be after its start"));
        }
        self.checkpoint();
        let item_id = self.alloc_id();
        let take_id = self.alloc_id();
        let item = Item {
            id: item_id,
            position: start,
            length: end - start,
            selected: false,
            takes: vec![Take {
                id: take_id,
                name: name.to_string(),
                notes,
            }],
            active_take: 0,
        };
        let items = &mut self.state.tracks[pos].items;
        items.push(item);
        items.sort_by(|a, b| a.position.total_cmp(&b.position));
        Ok(MediaItem(item_id))
    }

    pub fn delete_track_media_item(
        &mut self,
        track: MediaTrack,
        item: MediaItem,
    ) -> ApiResult<bool> {
        let t = self.track_pos("DeleteTrackMediaItem", track)?;
        let Some(i) = self.state.tracks[t].items.iter().position(|it| it.id == item.0) else {
            return Ok(false);
        };
        self.checkpoint();
        self.state.tracks[t].items.remove(i);
        Ok(true)
    }

    pub fn select_all_media_items(&mut self, selected: bool) {
        for track in &mut self.state.tracks {
            for item in &mut track.items {
                item.selected = selected;
            }
        }
    }

    pub fn set_media_item_selected(&mut self, item: MediaItem, selected: bool) -> ApiResult<()> {
        let (t, i) = self.item_pos("SetMediaItemSelected", item)?;
        self.state.tracks[t].items[i].selected = selected;
        Ok(())
    }

    pub fn main_on_command(&mut self, command: i32) {
        match command {
            ACTION_COPY_ITEMS => self.copy_selected_items(),
            ACTION_PASTE_ITEMS => self.paste_items(),
            ACTION_PLAY => self.transport.play_state = 1,
            ACTION_STOP => self.transport.play_state = 0,
            // REAPER ignores action ids it does not know
            _ => {}
        }
    }

    fn copy_selected_items(&mut self) {
        let copied: Vec<(usize, Item)> = self
            .state
            .tracks
            .iter()
            .enumerate()
            .flat_map(|(t, track)| {
                track
                    .items
                    .iter()
                    .filter(|it| it.selected)
                    .map(move |it| (t, it.clone()))
            })
            .collect();
        if !copied.is_empty() {
            self.clipboard = copied;
        }
    }

    /// Paste at the edit cursor, keeping relative offsets and source tracks
    fn paste_items(&mut self) {
        if self.clipboard.is_empty() || self.state.tracks.is_empty() {
            return;
        }
        self.checkpoint();
        let origin = self
            .clipboard
            .iter()
            .map(|(_, it)| it.position)
            .fold(f64::INFINITY, f64::min);
        let cursor = self.transport.cursor;

        self.select_all_media_items(false);
        let clipboard = self.clipboard.clone();
        let mut end = cursor;
        for (t, mut item) in clipboard {
            item.id = self.alloc_id();
            for take in &mut item.takes {
                take.id = self.alloc_id();
            }
            item.position = cursor + (item.position - origin);
            item.selected = true;
            end = end.max(item.position + item.length);

            let t = t.min(self.state.tracks.len() - 1);
            let items = &mut self.state.tracks[t].items;
            items.push(item);
            items.sort_by(|a, b| a.position.total_cmp(&b.position));
        }
        self.transport.cursor = end;
    }

    pub fn set_edit_cur_pos(&mut self, time: f64) {
        self.transport.cursor = time.max(0.0);
    }

    // -------------------------------------------------------------------------
    // MIDI
    // -------------------------------------------------------------------------

    pub fn midi_count_notes(&self, take: MediaItemTake) -> ApiResult<i32> {
        let take = self.take("MIDI_CountEvts", take)?;
        Ok(take.notes.as_ref().map_or(0, |n| n.len() as i32))
    }

    pub fn midi_get_note(&self, take: MediaItemTake, index: i32) -> ApiResult<MidiNote> {
        let take = self.take("MIDI_GetNote", take)?;
        take.notes
            .as_ref()
            .and_then(|notes| usize::try_from(index).ok().and_then(|i| notes.get(i)))
            .cloned()
            .ok_or_else(|| ApiError::call("MIDI_GetNote", format!("no note at index {}", index)))
    }

    pub fn midi_delete_note(&mut self, take: MediaItemTake, index: i32) -> ApiResult<bool> {
        let len = self.notes_mut("MIDI_DeleteNote", take)?.len();
        let Some(i) = usize::try_from(index).ok().filter(|&i| i < len) else {
            return Ok(false);
        };
        self.midi_checkpoint();
        self.notes_mut("MIDI_DeleteNote", take)?.remove(i);
        Ok(true)
    }

    pub fn midi_insert_note(
        &mut self,
        take: MediaItemTake,
        note: &MidiNote,
        no_sort: bool,
    ) -> ApiResult<bool> {
        self.notes_mut("MIDI_InsertNote", take)?;
        self.midi_checkpoint();
        let notes = self.notes_mut("MIDI_InsertNote", take)?;
        // Takes store whole ticks
        notes.push(MidiNote {
            start_ppq: note.start_ppq.round(),
            end_ppq: note.end_ppq.round(),
            ..note.clone()
        });
        if !no_sort {
            sort_notes(notes);
        }
        Ok(true)
    }

    pub fn midi_sort(&mut self, take: MediaItemTake) -> ApiResult<()> {
        sort_notes(self.notes_mut("MIDI_Sort", take)?);
        self.midi_edit_open = false;
        Ok(())
    }

    pub fn midi_proj_time_from_ppq(&self, take: MediaItemTake, ppq: f64) -> ApiResult<f64> {
        let start_qn = self.take_start_qn("MIDI_GetProjTimeFromPPQPos", take)?;
        Ok(self.state.tempo.qn_to_time(start_qn + ppq / PPQ))
    }

    pub fn midi_ppq_from_proj_time(&self, take: MediaItemTake, time: f64) -> ApiResult<f64> {
        let start_qn = self.take_start_qn("MIDI_GetPPQPosFromProjTime", take)?;
        Ok((self.state.tempo.time_to_qn(time) - start_qn) * PPQ)
    }

    // -------------------------------------------------------------------------
    // Transport
    // -------------------------------------------------------------------------

    pub fn on_play_button(&mut self) {
        self.transport.play_state = 1;
    }

    pub fn on_stop_button(&mut self) {
        self.transport.play_state = 0;
    }

    pub fn set_current_bpm(&mut self, bpm: f64, want_undo: bool) {
        if want_undo {
            self.checkpoint();
        }
        let cursor = self.transport.cursor;
        self.state.tempo.set_bpm_at(cursor, bpm);
    }

    pub fn master_tempo(&self) -> f64 {
        self.state.tempo.bpm_at(self.transport.cursor)
    }

    pub fn set_tempo_time_sig_marker(&mut self, edit: &TempoMarkerEdit) -> bool {
        if edit.bpm <= 0.0 {
            return false;
        }
        let current = &self.state.tempo.points()[self.state.tempo.segment_at(edit.time)];
        // Zero keeps the signature already in effect
        let numerator = if edit.numerator > 0 { edit.numerator } else { current.numerator };
        let denominator = if edit.denominator > 0 { edit.denominator } else { current.denominator };

        self.checkpoint();
        if edit.point_index >= 0 {
            self.state
                .tempo
                .edit(edit.point_index as usize, edit.bpm, numerator, denominator)
        } else {
            self.state.tempo.upsert(edit.time, edit.bpm, numerator, denominator);
            true
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.state = previous;
                self.midi_edit_open = false;
                true
            }
            None => false,
        }
    }

    pub fn loop_time_range(&self) -> (f64, f64) {
        self.transport.loop_range
    }

    pub fn set_loop_time_range(&mut self, start: f64, end: f64) {
        self.transport.loop_range = (start.min(end), start.max(end));
    }

    // -------------------------------------------------------------------------
    // FX
    // -------------------------------------------------------------------------

    pub fn track_fx_add_by_name(
        &mut self,
        track: MediaTrack,
        name: &str,
        instantiate: i32,
    ) -> ApiResult<i32> {
        let pos = self.track_pos("TrackFX_AddByName", track)?;
        let Some(fx) = catalog::resolve(name) else {
            return Ok(-1);
        };
        let existing = self.state.tracks[pos]
            .fx
            .iter()
            .position(|f| f.name == fx.name)
            .map(|i| i as i32);
        match (instantiate, existing) {
            (0, found) => Ok(found.unwrap_or(-1)),
            (n, Some(found)) if n > 0 => Ok(found),
            _ => {
                self.checkpoint();
                let chain = &mut self.state.tracks[pos].fx;
                chain.push(fx);
                Ok(chain.len() as i32 - 1)
            }
        }
    }

    pub fn track_fx_count(&self, track: MediaTrack) -> ApiResult<i32> {
        Ok(self.track("TrackFX_GetCount", track)?.fx.len() as i32)
    }

    pub fn track_fx_name(&self, track: MediaTrack, fx: i32) -> ApiResult<String> {
        Ok(self.fx("TrackFX_GetFXName", track, fx)?.name.clone())
    }

    pub fn track_fx_delete(&mut self, track: MediaTrack, fx: i32) -> ApiResult<bool> {
        let pos = self.track_pos("TrackFX_Delete", track)?;
        let Some(i) = usize::try_from(fx)
            .ok()
            .filter(|&i| i < self.state.tracks[pos].fx.len())
        else {
            return Ok(false);
        };
        self.checkpoint();
        self.state.tracks[pos].fx.remove(i);
        Ok(true)
    }

    pub fn track_fx_num_params(&self, track: MediaTrack, fx: i32) -> ApiResult<i32> {
        Ok(self.fx("TrackFX_GetNumParams", track, fx)?.params.len() as i32)
    }

    pub fn track_fx_param_name(&self, track: MediaTrack, fx: i32, param: i32) -> ApiResult<String> {
        Ok(self.fx_param("TrackFX_GetParamName", track, fx, param)?.name.clone())
    }

    pub fn track_fx_param(&self, track: MediaTrack, fx: i32, param: i32) -> ApiResult<FxParam> {
        let p = self.fx_param("TrackFX_GetParam", track, fx, param)?;
        Ok(FxParam {
            value: p.value,
            min: p.min,
            max: p.max,
        })
    }

    pub fn track_fx_set_param(
        &mut self,
        track: MediaTrack,
        fx: i32,
        param: i32,
        value: f64,
    ) -> ApiResult<bool> {
        self.fx_param("TrackFX_SetParam", track, fx, param)?;
        self.checkpoint();
        let t = self.track_pos("TrackFX_SetParam", track)?;
        let p = &mut self.state.tracks[t].fx[fx as usize].params[param as usize];
        p.value = value.clamp(p.min, p.max);
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Markers and regions
    // -------------------------------------------------------------------------

    pub fn add_project_marker(
        &mut self,
        is_region: bool,
        position: f64,
        region_end: f64,
        name: &str,
        want_index: i32,
    ) -> i32 {
        let taken = |n: i32, markers: &[Marker]| {
            markers.iter().any(|m| m.is_region == is_region && m.number == n)
        };
        let number = if want_index > 0 && !taken(want_index, &self.state.markers) {
            want_index
        } else {
            (1..)
                .find(|&n| !taken(n, &self.state.markers))
                .unwrap_or(1)
        };

        self.checkpoint();
        self.state.markers.push(Marker {
            is_region,
            position,
            end: if is_region { region_end } else { position },
            name: name.to_string(),
            number,
        });
        number
    }

    pub fn count_project_markers(&self) -> (i32, i32) {
        let regions = self.state.markers.iter().filter(|m| m.is_region).count() as i32;
        (self.state.markers.len() as i32 - regions, regions)
    }

    pub fn enum_project_markers(&self, index: i32) -> ApiResult<ProjectMarker> {
        let markers = self.sorted_markers();
        usize::try_from(index)
            .ok()
            .and_then(|i| markers.get(i))
            .map(|m| ProjectMarker {
                is_region: m.is_region,
                position: m.position,
                region_end: m.end,
                name: m.name.clone(),
                index: m.number,
            })
            .ok_or_else(|| {
                ApiError::call("EnumProjectMarkers", format!("no marker at index {}", index))
            })
    }
}

fn sort_notes(notes: &mut [MidiNote]) {
    notes.sort_by(|a, b| {
        a.start_ppq
            .total_cmp(&b.start_ppq)
            .then(a.pitch.cmp(&b.pitch))
    });
}
