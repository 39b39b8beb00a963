//! Project overview commands

use reaper_core::ReaScript;
use serde_json::json;

use super::{convert, item, lookup, CommandTable};
use crate::error::CommandResult;
use crate::params::{NoParams, TrackParams};

/// `GetPlayState` bits
const PLAYING: i32 = 1;
const RECORDING: i32 = 4;

pub(super) fn register(table: &mut CommandTable) {
    table.register("get_project_info", get_project_info);
    table.register("get_track_info", get_track_info);
}

fn get_project_info(api: &mut dyn ReaScript, _: NoParams) -> CommandResult {
    let (tempo, beats_per_measure) = api.project_time_signature()?;
    let play_state = api.play_state()?;
    let cursor = api.cursor_position()?;
    let cursor = convert::time_to_beats(api, cursor)?;

    Ok(json!({
        "tempo": tempo,
        "signature_numerator": beats_per_measure as i32,
        // REAPER only reports beats per measure here
        "signature_denominator": 4,
        "track_count": api.count_tracks()?,
        "is_playing": play_state & PLAYING != 0,
        "is_recording": play_state & RECORDING != 0,
        "cursor_position": cursor,
    }))
}

fn get_track_info(api: &mut dyn ReaScript, params: TrackParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    let name = api.track_name(track)?;
    let items = item::describe_items(api, track)?;

    let mut fx = Vec::new();
    for i in 0..api.track_fx_count(track)? {
        fx.push(json!({"index": i, "name": api.track_fx_name(track, i)?}));
    }

    Ok(json!({
        "name": name,
        "mute": api.track_info_value(track, "B_MUTE")? != 0.0,
        "solo": api.track_info_value(track, "I_SOLO")? != 0.0,
        "arm": api.track_info_value(track, "I_RECARM")? != 0.0,
        "volume": api.track_info_value(track, "D_VOL")?,
        "pan": api.track_info_value(track, "D_PAN")?,
        "items": items,
        "fx": fx,
    }))
}
