//! FX chain commands

use reaper_core::{MediaTrack, ReaScript};
use serde_json::json;

use super::{lookup, track, CommandTable};
use crate::error::{CommandError, CommandResult};
use crate::params::{AddFxParams, CreateTrackWithFxParams, FxParams, SetFxParameterParams};

/// `TrackFX_AddByName` instantiate mode: always add a new instance
const ALWAYS_ADD: i32 = -1;

pub(super) fn register(table: &mut CommandTable) {
    table.register("add_fx", add_fx);
    table.register("remove_fx", remove_fx);
    table.register("get_fx_parameters", get_fx_parameters);
    table.register("set_fx_parameter", set_fx_parameter);
    table.register("create_track_with_fx", create_track_with_fx);
}

/// Add `fx_name` to the end of the chain, returning its index and resolved name
fn insert_fx(
    api: &mut dyn ReaScript,
    track: MediaTrack,
    fx_name: &str,
) -> CommandResult<(i32, String)> {
    let index = api.track_fx_add_by_name(track, fx_name, ALWAYS_ADD)?;
    if index < 0 {
        return Err(CommandError::Value(format!("FX not found: {}", fx_name)));
    }
    Ok((index, api.track_fx_name(track, index)?))
}

fn add_fx(api: &mut dyn ReaScript, params: AddFxParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    let (index, name) = insert_fx(api, track, &params.fx_name)?;
    Ok(json!({"fx_index": index, "name": name}))
}

fn remove_fx(api: &mut dyn ReaScript, params: FxParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    lookup::fx(api, track, params.fx_index)?;
    if !api.track_fx_delete(track, params.fx_index)? {
        return Err(CommandError::Runtime(format!(
            "REAPER could not remove FX {}",
            params.fx_index
        )));
    }
    Ok(json!({"removed": true}))
}

fn get_fx_parameters(api: &mut dyn ReaScript, params: FxParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    lookup::fx(api, track, params.fx_index)?;

    let fx_name = api.track_fx_name(track, params.fx_index)?;
    let mut parameters = Vec::new();
    for i in 0..api.track_fx_num_params(track, params.fx_index)? {
        let name = api.track_fx_param_name(track, params.fx_index, i)?;
        let param = api.track_fx_param(track, params.fx_index, i)?;
        parameters.push(json!({
            "index": i,
            "name": name,
            "value": param.value,
            "min": param.min,
            "max": param.max,
        }));
    }
    Ok(json!({"fx_name": fx_name, "parameters": parameters}))
}

fn set_fx_parameter(api: &mut dyn ReaScript, params: SetFxParameterParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    lookup::param(api, track, params.fx_index, params.param_index)?;

    let range = api.track_fx_param(track, params.fx_index, params.param_index)?;
    let value = params.value.max(range.min).min(range.max);
    api.track_fx_set_param(track, params.fx_index, params.param_index, value)?;
    let name = api.track_fx_param_name(track, params.fx_index, params.param_index)?;

    Ok(json!({"name": name, "value": value}))
}

fn create_track_with_fx(api: &mut dyn ReaScript, params: CreateTrackWithFxParams) -> CommandResult {
    let index = track::insert_position(api, params.index)?;
    api.insert_track_at_index(index, true)?;
    let track = api.get_track(index)?;

    if let Some(name) = params.name.as_deref().filter(|n| !n.is_empty()) {
        api.set_track_name(track, name)?;
    }
    let (_, fx_name) = insert_fx(api, track, &params.fx_name)?;

    Ok(json!({
        "track_index": index,
        "name": api.track_name(track)?,
        "fx_name": fx_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{fail, offline_client, run};
    use serde_json::json;

    #[test]
    fn test_add_reaeq() {
        let (_sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        let added = run(&mut client, "add_fx", json!({"track_index": 0, "fx_name": "ReaEQ"}));
        assert!(added["fx_index"].as_i64().unwrap() >= 0);
        assert_eq!(added["name"], "ReaEQ");

        // Same plugin again is a second instance
        let again = run(&mut client, "add_fx", json!({"track_index": 0, "fx_name": "reaeq"}));
        assert_eq!(again["fx_index"], 1);
    }

    #[test]
    fn test_unknown_fx() {
        let (_sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        let err = fail(&mut client, "add_fx", json!({"track_index": 0, "fx_name": "Nope"}));
        assert_eq!(err, "FX not found: Nope");
    }

    #[test]
    fn test_remove_fx_range() {
        let (sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        let err = fail(&mut client, "remove_fx", json!({"track_index": 0, "fx_index": 0}));
        assert_eq!(err, "FX index 0 out of range (0--1)");

        run(&mut client, "add_fx", json!({"track_index": 0, "fx_name": "ReaDelay"}));
        let removed = run(&mut client, "remove_fx", json!({"track_index": 0, "fx_index": 0}));
        assert_eq!(removed, json!({"removed": true}));
        assert!(sim.inspect(|p| p.state().tracks[0].fx.is_empty()));
    }

    #[test]
    fn test_parameters() {
        let (_sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        run(&mut client, "add_fx", json!({"track_index": 0, "fx_name": "ReaEQ"}));

        let listed = run(
            &mut client,
            "get_fx_parameters",
            json!({"track_index": 0, "fx_index": 0}),
        );
        assert_eq!(listed["fx_name"], "ReaEQ");
        let params = listed["parameters"].as_array().unwrap();
        assert_eq!(params.len(), 6);
        assert_eq!(
            params[1],
            json!({"index": 1, "name": "Gain-1", "value": 0.0, "min": -24.0, "max": 24.0})
        );
    }

    #[test]
    fn test_set_parameter_clamps() {
        let (_sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        run(&mut client, "add_fx", json!({"track_index": 0, "fx_name": "ReaEQ"}));
        let target = |param: i64, value: f64| {
            json!({"track_index": 0, "fx_index": 0, "param_index": param, "value": value})
        };

        let set = run(&mut client, "set_fx_parameter", target(1, 30.0));
        assert_eq!(set, json!({"name": "Gain-1", "value": 24.0}));
        let set = run(&mut client, "set_fx_parameter", target(1, -6.5));
        assert_eq!(set, json!({"name": "Gain-1", "value": -6.5}));

        let err = fail(&mut client, "set_fx_parameter", target(6, 0.0));
        assert_eq!(err, "Parameter index 6 out of range (0-5)");
        let err = fail(
            &mut client,
            "set_fx_parameter",
            json!({"track_index": 0, "fx_index": 2, "param_index": 0, "value": 0.0}),
        );
        assert_eq!(err, "FX index 2 out of range (0-0)");
    }

    #[test]
    fn test_create_track_with_fx() {
        let (sim, mut client) = offline_client();
        let created = run(
            &mut client,
            "create_track_with_fx",
            json!({"fx_name": "ReaSynth", "name": "Lead"}),
        );
        assert_eq!(created, json!({"track_index": 0, "name": "Lead", "fx_name": "ReaSynth"}));

        let created = run(
            &mut client,
            "create_track_with_fx",
            json!({"fx_name": "ReaVerbate", "index": 0}),
        );
        assert_eq!(created, json!({"track_index": 0, "name": "", "fx_name": "ReaVerbate"}));
        assert_eq!(sim.inspect(|p| p.count_tracks()), 2);
    }

    #[test]
    fn test_create_track_with_unknown_fx_keeps_track() {
        let (sim, mut client) = offline_client();
        let err = fail(&mut client, "create_track_with_fx", json!({"fx_name": "Ghost"}));
        assert_eq!(err, "FX not found: Ghost");
        assert_eq!(sim.inspect(|p| p.count_tracks()), 1);
    }

    #[test]
    fn test_refused_fx_delete_is_reported() {
        let (sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        run(&mut client, "add_fx", json!({"track_index": 0, "fx_name": "ReaEQ"}));

        sim.refuse("TrackFX_Delete");
        let err = fail(&mut client, "remove_fx", json!({"track_index": 0, "fx_index": 0}));
        assert_eq!(err, "REAPER could not remove FX 0");
        assert_eq!(sim.inspect(|p| p.state().tracks[0].fx.len()), 1);
    }
}
