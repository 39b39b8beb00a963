//! Transport, tempo and timeline commands

use reaper_core::{ReaScript, TempoMarkerEdit};
use serde_json::json;

use super::{convert, CommandTable};
use crate::error::{CommandError, CommandResult};
use crate::params::{
    CursorParams, LoopRegionParams, NoParams, SetTempoParams, TimeSignatureParams,
};

const MIN_BPM: f64 = 1.0;
const MAX_BPM: f64 = 960.0;

pub(super) fn register(table: &mut CommandTable) {
    table.register("start_playback", start_playback);
    table.register("stop_playback", stop_playback);
    table.register("set_tempo", set_tempo);
    table.register("set_time_signature", set_time_signature);
    table.register("undo", undo);
    table.register("set_cursor_position", set_cursor_position);
    table.register("get_loop_region", get_loop_region);
    table.register("set_loop_region", set_loop_region);
}

fn start_playback(api: &mut dyn ReaScript, _: NoParams) -> CommandResult {
    api.on_play_button()?;
    Ok(json!({"playing": true}))
}

fn stop_playback(api: &mut dyn ReaScript, _: NoParams) -> CommandResult {
    api.on_stop_button()?;
    Ok(json!({"playing": false}))
}

fn set_tempo(api: &mut dyn ReaScript, params: SetTempoParams) -> CommandResult {
    let tempo = params.tempo.max(MIN_BPM).min(MAX_BPM);
    api.set_current_bpm(tempo, true)?;
    Ok(json!({"tempo": api.master_tempo()?}))
}

/// Rewrites the marker at project start, keeping the current tempo
fn set_time_signature(api: &mut dyn ReaScript, params: TimeSignatureParams) -> CommandResult {
    let edit = TempoMarkerEdit {
        point_index: -1,
        time: 0.0,
        measure: -1,
        beat: -1.0,
        bpm: api.master_tempo()?,
        numerator: params.numerator,
        denominator: params.denominator,
        linear: false,
    };
    if !api.set_tempo_time_sig_marker(&edit)? {
        return Err(CommandError::Runtime(format!(
            "REAPER rejected time signature {}/{}",
            params.numerator, params.denominator
        )));
    }
    api.update_timeline()?;

    Ok(json!({
        "signature_numerator": params.numerator,
        "signature_denominator": params.denominator,
    }))
}

fn undo(api: &mut dyn ReaScript, _: NoParams) -> CommandResult {
    api.undo()?;
    Ok(json!({"undone": true}))
}

fn set_cursor_position(api: &mut dyn ReaScript, params: CursorParams) -> CommandResult {
    let time = convert::beats_to_time(api, params.time.max(0.0))?;
    api.set_edit_cur_pos(time, true, false)?;
    let cursor = api.cursor_position()?;
    Ok(json!({"cursor_position": convert::time_to_beats(api, cursor)?}))
}

fn get_loop_region(api: &mut dyn ReaScript, _: NoParams) -> CommandResult {
    let (start, end) = api.loop_time_range()?;
    let start = convert::time_to_beats(api, start)?;
    let end = convert::time_to_beats(api, end)?;
    Ok(json!({"loop_start": start, "loop_length": end - start}))
}

fn set_loop_region(api: &mut dyn ReaScript, params: LoopRegionParams) -> CommandResult {
    let start = convert::beats_to_time(api, params.start.max(0.0))?;
    let end = convert::beats_to_time(api, (params.start + params.length).max(0.0))?;
    api.set_loop_time_range(start, end)?;
    Ok(json!({"loop_start": params.start, "loop_length": params.length}))
}
