//! Project simulator
//!
//! An in-memory stand-in for a running REAPER. `reaper-mcp --offline` serves
//! it, and the test-suites drive the command layer against it.

mod catalog;
pub mod project;
pub mod tempo;

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::{
    Connect, FxParam, MediaItem, MediaItemTake, MediaTrack, MidiNote, ProjectMarker, ReaScript,
    TempoMarkerEdit,
};
use crate::error::{ApiError, ApiResult};

pub use project::{SimProject, PPQ};

/// Shared handle to one simulated project
///
/// Clones refer to the same project; connections made through
/// [`Simulator::connector`] all see the same state.
#[derive(Debug, Clone)]
pub struct Simulator {
    project: Arc<Mutex<SimProject>>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    /// Empty project at 120 BPM, 4/4
    pub fn new() -> Self {
        Self::with_tempo(120.0, 4, 4)
    }

    pub fn with_tempo(bpm: f64, numerator: i32, denominator: i32) -> Self {
        Self {
            project: Arc::new(Mutex::new(SimProject::new(bpm, numerator, denominator))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimProject> {
        self.project.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn connector(&self) -> SimConnector {
        SimConnector { sim: self.clone() }
    }

    /// A session talking to this project, bypassing the connector
    pub fn session(&self) -> SimReaScript {
        SimReaScript { sim: self.clone() }
    }

    /// Make REAPER look closed (or back up) to every session
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Add a tempo change at `time` seconds, keeping the signature in effect there
    pub fn add_tempo_marker(&self, time: f64, bpm: f64) {
        let mut project = self.lock();
        let tempo = project.tempo_mut();
        let current = tempo.points()[tempo.segment_at(time)].clone();
        tempo.upsert(time, bpm, current.numerator, current.denominator);
    }

    /// Make the native `function` report failure (return `false`) to every session
    pub fn refuse(&self, function: &'static str) {
        self.lock().refused.insert(function);
    }

    /// Add an audio item (no MIDI data) to the track at `track_index`
    pub fn add_audio_item(
        &self,
        track_index: i32,
        start: f64,
        end: f64,
        name: &str,
    ) -> ApiResult<MediaItem> {
        let mut project = self.lock();
        let track = project.get_track(track_index)?;
        project.add_audio_item(track, start, end, name)
    }

    /// Run a closure against the raw project state
    pub fn inspect<R>(&self, f: impl FnOnce(&SimProject) -> R) -> R {
        f(&self.lock())
    }
}

/// Hands out sessions on a [`Simulator`]
#[derive(Debug, Clone)]
pub struct SimConnector {
    sim: Simulator,
}

impl Connect for SimConnector {
    fn connect(&self) -> ApiResult<Box<dyn ReaScript + Send>> {
        if !self.sim.lock().reachable {
            return Err(refused());
        }
        Ok(Box::new(self.sim.session()))
    }
}

fn refused() -> ApiError {
    ApiError::Io(io::Error::new(
        io::ErrorKind::ConnectionRefused,
        "Connection refused",
    ))
}

/// A session on the simulator
#[derive(Debug, Clone)]
pub struct SimReaScript {
    sim: Simulator,
}

impl SimReaScript {
    fn project(&self) -> ApiResult<MutexGuard<'_, SimProject>> {
        let project = self.sim.lock();
        if !project.reachable {
            return Err(ApiError::DisconnectedClient(
                "REAPER is no longer reachable".to_string(),
            ));
        }
        Ok(project)
    }
}

impl ReaScript for SimReaScript {
    fn count_tracks(&mut self) -> ApiResult<i32> {
        Ok(self.project()?.count_tracks())
    }

    fn get_track(&mut self, index: i32) -> ApiResult<MediaTrack> {
        self.project()?.get_track(index)
    }

    fn project_time_signature(&mut self) -> ApiResult<(f64, f64)> {
        Ok(self.project()?.project_time_signature())
    }

    fn play_state(&mut self) -> ApiResult<i32> {
        Ok(self.project()?.play_state())
    }

    fn cursor_position(&mut self) -> ApiResult<f64> {
        Ok(self.project()?.cursor_position())
    }

    fn time_to_qn(&mut self, time: f64) -> ApiResult<f64> {
        Ok(self.project()?.time_to_qn(time))
    }

    fn qn_to_time(&mut self, qn: f64) -> ApiResult<f64> {
        Ok(self.project()?.qn_to_time(qn))
    }

    fn insert_track_at_index(&mut self, index: i32, want_defaults: bool) -> ApiResult<()> {
        self.project()?.insert_track_at_index(index, want_defaults);
        Ok(())
    }

    fn delete_track(&mut self, track: MediaTrack) -> ApiResult<()> {
        self.project()?.delete_track(track)
    }

    fn track_name(&mut self, track: MediaTrack) -> ApiResult<String> {
        self.project()?.track_name(track)
    }

    fn set_track_name(&mut self, track: MediaTrack, name: &str) -> ApiResult<()> {
        self.project()?.set_track_name(track, name)
    }

    fn track_info_value(&mut self, track: MediaTrack, param: &str) -> ApiResult<f64> {
        self.project()?.track_info_value(track, param)
    }

    fn set_track_info_value(
        &mut self,
        track: MediaTrack,
        param: &str,
        value: f64,
    ) -> ApiResult<()> {
        self.project()?.set_track_info_value(track, param, value)
    }

    fn count_track_media_items(&mut self, track: MediaTrack) -> ApiResult<i32> {
        self.project()?.count_track_media_items(track)
    }

    fn get_track_media_item(&mut self, track: MediaTrack, index: i32) -> ApiResult<MediaItem> {
        self.project()?.get_track_media_item(track, index)
    }

    fn item_info_value(&mut self, item: MediaItem, param: &str) -> ApiResult<f64> {
        self.project()?.item_info_value(item, param)
    }

    fn active_take(&mut self, item: MediaItem) -> ApiResult<Option<MediaItemTake>> {
        self.project()?.active_take(item)
    }

    fn take_name(&mut self, take: MediaItemTake) -> ApiResult<String> {
        self.project()?.take_name(take)
    }

    fn set_take_name(&mut self, take: MediaItemTake, name: &str) -> ApiResult<()> {
        self.project()?.set_take_name(take, name)
    }

    fn take_is_midi(&mut self, take: MediaItemTake) -> ApiResult<bool> {
        self.project()?.take_is_midi(take)
    }

    fn create_new_midi_item(
        &mut self,
        track: MediaTrack,
        start: f64,
        end: f64,
    ) -> ApiResult<MediaItem> {
        self.project()?.create_new_midi_item(track, start, end)
    }

    fn delete_track_media_item(&mut self, track: MediaTrack, item: MediaItem) -> ApiResult<bool> {
        let mut project = self.project()?;
        if project.refuses("DeleteTrackMediaItem") {
            return Ok(false);
        }
        project.delete_track_media_item(track, item)
    }

    fn select_all_media_items(&mut self, selected: bool) -> ApiResult<()> {
        self.project()?.select_all_media_items(selected);
        Ok(())
    }

    fn set_media_item_selected(&mut self, item: MediaItem, selected: bool) -> ApiResult<()> {
        self.project()?.set_media_item_selected(item, selected)
    }

    fn main_on_command(&mut self, command: i32) -> ApiResult<()> {
        self.project()?.main_on_command(command);
        Ok(())
    }

    fn set_edit_cur_pos(&mut self, time: f64, _move_view: bool, _seek_play: bool) -> ApiResult<()> {
        self.project()?.set_edit_cur_pos(time);
        Ok(())
    }

    fn midi_count_notes(&mut self, take: MediaItemTake) -> ApiResult<i32> {
        self.project()?.midi_count_notes(take)
    }

    fn midi_get_note(&mut self, take: MediaItemTake, index: i32) -> ApiResult<MidiNote> {
        self.project()?.midi_get_note(take, index)
    }

    fn midi_delete_note(&mut self, take: MediaItemTake, index: i32) -> ApiResult<bool> {
        let mut project = self.project()?;
        if project.refuses("MIDI_DeleteNote") {
            return Ok(false);
        }
        project.midi_delete_note(take, index)
    }

    fn midi_insert_note(
        &mut self,
        take: MediaItemTake,
        note: &MidiNote,
        no_sort: bool,
    ) -> ApiResult<bool> {
        let mut project = self.project()?;
        if project.refuses("MIDI_InsertNote") {
            return Ok(false);
        }
        project.midi_insert_note(take, note, no_sort)
    }

    fn midi_sort(&mut self, take: MediaItemTake) -> ApiResult<()> {
        self.project()?.midi_sort(take)
    }

    fn midi_proj_time_from_ppq(&mut self, take: MediaItemTake, ppq: f64) -> ApiResult<f64> {
        self.project()?.midi_proj_time_from_ppq(take, ppq)
    }

    fn midi_ppq_from_proj_time(&mut self, take: MediaItemTake, time: f64) -> ApiResult<f64> {
        self.project()?.midi_ppq_from_proj_time(take, time)
    }

    fn on_play_button(&mut self) -> ApiResult<()> {
        self.project()?.on_play_button();
        Ok(())
    }

    fn on_stop_button(&mut self) -> ApiResult<()> {
        self.project()?.on_stop_button();
        Ok(())
    }

    fn set_current_bpm(&mut self, bpm: f64, want_undo: bool) -> ApiResult<()> {
        self.project()?.set_current_bpm(bpm, want_undo);
        Ok(())
    }

    fn master_tempo(&mut self) -> ApiResult<f64> {
        Ok(self.project()?.master_tempo())
    }

    fn set_tempo_time_sig_marker(&mut self, edit: &TempoMarkerEdit) -> ApiResult<bool> {
        let mut project = self.project()?;
        if project.refuses("SetTempoTimeSigMarker") {
            return Ok(false);
        }
        Ok(project.set_tempo_time_sig_marker(edit))
    }

    fn update_timeline(&mut self) -> ApiResult<()> {
        self.project().map(|_| ())
    }

    fn undo(&mut self) -> ApiResult<bool> {
        Ok(self.project()?.undo())
    }

    fn loop_time_range(&mut self) -> ApiResult<(f64, f64)> {
        Ok(self.project()?.loop_time_range())
    }

    fn set_loop_time_range(&mut self, start: f64, end: f64) -> ApiResult<()> {
        self.project()?.set_loop_time_range(start, end);
        Ok(())
    }

    fn track_fx_add_by_name(
        &mut self,
        track: MediaTrack,
        name: &str,
        instantiate: i32,
    ) -> ApiResult<i32> {
        self.project()?.track_fx_add_by_name(track, name, instantiate)
    }

    fn track_fx_count(&mut self, track: MediaTrack) -> ApiResult<i32> {
        self.project()?.track_fx_count(track)
    }

    fn track_fx_name(&mut self, track: MediaTrack, fx: i32) -> ApiResult<String> {
        self.project()?.track_fx_name(track, fx)
    }

    fn track_fx_delete(&mut self, track: MediaTrack, fx: i32) -> ApiResult<bool> {
        let mut project = self.project()?;
        if project.refuses("TrackFX_Delete") {
            return Ok(false);
        }
        project.track_fx_delete(track, fx)
    }

    fn track_fx_num_params(&mut self, track: MediaTrack, fx: i32) -> ApiResult<i32> {
        self.project()?.track_fx_num_params(track, fx)
    }

    fn track_fx_param_name(
        &mut self,
        track: MediaTrack,
        fx: i32,
        param: i32,
    ) -> ApiResult<String> {
        self.project()?.track_fx_param_name(track, fx, param)
    }

    fn track_fx_param(&mut self, track: MediaTrack, fx: i32, param: i32) -> ApiResult<FxParam> {
        self.project()?.track_fx_param(track, fx, param)
    }

    fn track_fx_set_param(
        &mut self,
        track: MediaTrack,
        fx: i32,
        param: i32,
        value: f64,
    ) -> ApiResult<bool> {
        self.project()?.track_fx_set_param(track, fx, param, value)
    }

    fn add_project_marker(
        &mut self,
        is_region: bool,
        position: f64,
        region_end: f64,
        name: &str,
        want_index: i32,
    ) -> ApiResult<i32> {
        Ok(self
            .project()?
            .add_project_marker(is_region, position, region_end, name, want_index))
    }

    fn count_project_markers(&mut self) -> ApiResult<(i32, i32)> {
        Ok(self.project()?.count_project_markers())
    }

    fn enum_project_markers(&mut self, index: i32) -> ApiResult<ProjectMarker> {
        self.project()?.enum_project_markers(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_share_one_project() {
        let sim = Simulator::new();
        let mut a = sim.connector().connect().unwrap();
        let mut b = sim.connector().connect().unwrap();

        a.insert_track_at_index(0, true).unwrap();
        assert_eq!(b.count_tracks().unwrap(), 1);
    }

    #[test]
    fn test_unreachable_project() {
        let sim = Simulator::new();
        let mut session = sim.session();
        sim.set_reachable(false);

        let err = sim.connector().connect().err().unwrap();
        assert!(matches!(err, ApiError::Io(_)));
        assert!(session.count_tracks().unwrap_err().is_connection());

        sim.set_reachable(true);
        assert_eq!(session.count_tracks().unwrap(), 0);
    }

    #[test]
    fn test_tempo_marker_shifts_conversion() {
        let sim = Simulator::new();
        sim.add_tempo_marker(4.0, 60.0);
        let mut session = sim.session();
        assert!((session.time_to_qn(6.0).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_refused_call_reports_failure() {
        let sim = Simulator::new();
        let mut session = sim.session();
        session.insert_track_at_index(0, true).unwrap();
        let track = session.get_track(0).unwrap();
        assert_eq!(session.track_fx_add_by_name(track, "ReaEQ", -1).unwrap(), 0);

        sim.refuse("TrackFX_Delete");
        assert!(!session.track_fx_delete(track, 0).unwrap());
        assert_eq!(session.track_fx_count(track).unwrap(), 1);
    }
}
