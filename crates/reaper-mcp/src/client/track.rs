//! Track management

use reaper_core::ReaScript;
use serde_json::json;

use super::{lookup, CommandTable};
use crate::error::CommandResult;
use crate::params::{
    CreateTrackParams, NoParams, SetTrackMuteParams, SetTrackNameParams, SetTrackPanParams,
    SetTrackSoloParams, SetTrackVolumeParams, TrackParams,
};

pub(super) fn register(table: &mut CommandTable) {
    table.register("create_track", create_track);
    table.register("delete_track", delete_track);
    table.register("delete_all_tracks", delete_all_tracks);
    table.register("set_track_name", set_track_name);
    table.register("set_track_volume", set_track_volume);
    table.register("set_track_pan", set_track_pan);
    table.register("set_track_mute", set_track_mute);
    table.register("set_track_solo", set_track_solo);
}

/// Where a new track lands: negative appends, past-the-end clamps to the end
pub(super) fn insert_position(api: &mut dyn ReaScript, index: i32) -> CommandResult<i32> {
    let count = api.count_tracks()?;
    Ok(if index < 0 || index > count { count } else { index })
}

fn create_track(api: &mut dyn ReaScript, params: CreateTrackParams) -> CommandResult {
    let index = insert_position(api, params.index)?;
    api.insert_track_at_index(index, true)?;
    let track = api.get_track(index)?;
    Ok(json!({"index": index, "name": api.track_name(track)?}))
}

fn delete_track(api: &mut dyn ReaScript, params: TrackParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    api.delete_track(track)?;
    Ok(json!({"deleted": true}))
}

fn delete_all_tracks(api: &mut dyn ReaScript, _: NoParams) -> CommandResult {
    let count = api.count_tracks()?;
    for i in (0..count).rev() {
        let track = api.get_track(i)?;
        api.delete_track(track)?;
    }
    Ok(json!({"deleted": count, "remaining_tracks": 0}))
}

fn set_track_name(api: &mut dyn ReaScript, params: SetTrackNameParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    api.set_track_name(track, &params.name)?;
    Ok(json!({"name": params.name}))
}

fn set_track_volume(api: &mut dyn ReaScript, params: SetTrackVolumeParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    let volume = params.volume.max(0.0).min(4.0);
    api.set_track_info_value(track, "D_VOL", volume)?;
    Ok(json!({"volume": api.track_info_value(track, "D_VOL")?}))
}

fn set_track_pan(api: &mut dyn ReaScript, params: SetTrackPanParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    let pan = params.pan.max(-1.0).min(1.0);
    api.set_track_info_value(track, "D_PAN", pan)?;
    Ok(json!({"pan": api.track_info_value(track, "D_PAN")?}))
}

fn set_track_mute(api: &mut dyn ReaScript, params: SetTrackMuteParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    api.set_track_info_value(track, "B_MUTE", flag(params.mute))?;
    Ok(json!({"mute": api.track_info_value(track, "B_MUTE")? != 0.0}))
}

fn set_track_solo(api: &mut dyn ReaScript, params: SetTrackSoloParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    api.set_track_info_value(track, "I_SOLO", flag(params.solo))?;
    Ok(json!({"solo": api.track_info_value(track, "I_SOLO")? != 0.0}))
}

fn flag(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{fail, offline_client, run};
    use serde_json::json;

    #[test]
    fn test_create_appends_by_default() {
        let (sim, mut client) = offline_client();
        assert_eq!(run(&mut client, "create_track", json!(null))["index"], 0);
        assert_eq!(run(&mut client, "create_track", json!({"index": -1}))["index"], 1);
        run(&mut client, "set_track_name", json!({"track_index": 1, "name": "Last"}));

        let created = run(&mut client, "create_track", json!({"index": 0}));
        assert_eq!(created, json!({"index": 0, "name": ""}));
        assert_eq!(sim.inspect(|p| p.state().tracks[2].name.clone()), "Last");

        // Past the end lands at the end
        assert_eq!(run(&mut client, "create_track", json!({"index": 42}))["index"], 3);
    }

    #[test]
    fn test_delete_all_tracks() {
        let (sim, mut client) = offline_client();
        for _ in 0..5 {
            run(&mut client, "create_track", json!(null));
        }
        let result = run(&mut client, "delete_all_tracks", json!(null));
        assert_eq!(result, json!({"deleted": 5, "remaining_tracks": 0}));
        assert_eq!(sim.inspect(|p| p.count_tracks()), 0);

        let result = run(&mut client, "delete_all_tracks", json!(null));
        assert_eq!(result, json!({"deleted": 0, "remaining_tracks": 0}));
    }

    #[test]
    fn test_delete_track_checks_range() {
        let (sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        run(&mut client, "create_track", json!(null));

        let err = fail(&mut client, "delete_track", json!({"track_index": 2}));
        assert_eq!(err, "Track index 2 out of range (0-1)");
        let err = fail(&mut client, "delete_track", json!({"track_index": -1}));
        assert_eq!(err, "Track index -1 out of range (0-1)");

        assert_eq!(
            run(&mut client, "delete_track", json!({"track_index": 1})),
            json!({"deleted": true})
        );
        assert_eq!(sim.inspect(|p| p.count_tracks()), 1);
    }

    #[test]
    fn test_volume_and_pan_are_clamped() {
        let (_sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));

        let loud = run(&mut client, "set_track_volume", json!({"track_index": 0, "volume": 10.0}));
        assert_eq!(loud, json!({"volume": 4.0}));
        let negative = run(
            &mut client,
            "set_track_volume",
            json!({"track_index": 0, "volume": -1.0}),
        );
        assert_eq!(negative, json!({"volume": 0.0}));
        let unity = run(&mut client, "set_track_volume", json!({"track_index": 0, "volume": 1}));
        assert_eq!(unity, json!({"volume": 1.0}));

        let pan = run(&mut client, "set_track_pan", json!({"track_index": 0, "pan": 5.0}));
        assert_eq!(pan, json!({"pan": 1.0}));
        let pan = run(&mut client, "set_track_pan", json!({"track_index": 0, "pan": -0.25}));
        assert_eq!(pan, json!({"pan": -0.25}));
    }

    #[test]
    fn test_mute_solo_read_back() {
        let (_sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));

        assert_eq!(
            run(&mut client, "set_track_mute", json!({"track_index": 0, "mute": true})),
            json!({"mute": true})
        );
        assert_eq!(
            run(&mut client, "set_track_mute", json!({"track_index": 0, "mute": false})),
            json!({"mute": false})
        );
        assert_eq!(
            run(&mut client, "set_track_solo", json!({"track_index": 0, "solo": true})),
            json!({"solo": true})
        );
    }

    #[test]
    fn test_rename() {
        let (_sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        let renamed = run(&mut client, "set_track_name", json!({"track_index": 0, "name": "Bass"}));
        assert_eq!(renamed, json!({"name": "Bass"}));
        assert_eq!(run(&mut client, "get_track_info", json!({"track_index": 0}))["name"], "Bass");
    }
}
