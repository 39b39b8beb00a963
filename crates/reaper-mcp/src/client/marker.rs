//! Markers and regions

use reaper_core::ReaScript;
use serde_json::json;

use super::{convert, CommandTable};
use crate::error::CommandResult;
use crate::params::{AddMarkerParams, AddRegionParams, NoParams};

/// Let REAPER pick the number
const NEXT_FREE: i32 = -1;

pub(super) fn register(table: &mut CommandTable) {
    table.register("add_marker", add_marker);
    table.register("add_region", add_region);
    table.register("get_markers", get_markers);
}

fn add_marker(api: &mut dyn ReaScript, params: AddMarkerParams) -> CommandResult {
    let position = convert::beats_to_time(api, params.position)?;
    let index = api.add_project_marker(false, position, 0.0, &params.name, NEXT_FREE)?;
    Ok(json!({
        "marker_index": index,
        "position": params.position,
        "name": params.name,
    }))
}

fn add_region(api: &mut dyn ReaScript, params: AddRegionParams) -> CommandResult {
    let start = convert::beats_to_time(api, params.start)?;
    let end = convert::beats_to_time(api, params.end)?;
    let index = api.add_project_marker(true, start, end, &params.name, NEXT_FREE)?;
    Ok(json!({
        "region_index": index,
        "start": params.start,
        "end": params.end,
        "name": params.name,
    }))
}

fn get_markers(api: &mut dyn ReaScript, _: NoParams) -> CommandResult {
    let (markers, regions) = api.count_project_markers()?;

    let mut marker_list = Vec::new();
    let mut region_list = Vec::new();
    for i in 0..markers + regions {
        let marker = api.enum_project_markers(i)?;
        if marker.is_region {
            region_list.push(json!({
                "index": marker.index,
                "name": marker.name,
                "start": convert::time_to_beats(api, marker.position)?,
                "end": convert::time_to_beats(api, marker.region_end)?,
            }));
        } else {
            marker_list.push(json!({
                "index": marker.index,
                "name": marker.name,
                "position": convert::time_to_beats(api, marker.position)?,
            }));
        }
    }
    Ok(json!({"markers": marker_list, "regions": region_list}))
}
