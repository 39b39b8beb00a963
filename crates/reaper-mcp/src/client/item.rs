//! Media items

use reaper_core::{MediaTrack, ReaScript, ACTION_COPY_ITEMS, ACTION_PASTE_ITEMS};
use serde_json::{json, Value};

use super::{convert, lookup, CommandTable};
use crate::error::{CommandError, CommandResult};
use crate::params::{
    CreateMidiItemParams, DuplicateItemParams, ItemParams, SetItemNameParams, TrackParams,
};

pub(super) fn register(table: &mut CommandTable) {
    table.register("get_items", get_items);
    table.register("create_midi_item", create_midi_item);
    table.register("delete_item", delete_item);
    table.register("duplicate_item", duplicate_item);
    table.register("set_item_name", set_item_name);
}

/// Summaries of every item on `track`, positions in beats
pub(super) fn describe_items(
    api: &mut dyn ReaScript,
    track: MediaTrack,
) -> CommandResult<Vec<Value>> {
    let mut items = Vec::new();
    for i in 0..api.count_track_media_items(track)? {
        let item = api.get_track_media_item(track, i)?;
        let position = api.item_info_value(item, "D_POSITION")?;
        let length = api.item_info_value(item, "D_LENGTH")?;

        let (name, is_midi) = match api.active_take(item)? {
            Some(take) => (api.take_name(take)?, api.take_is_midi(take)?),
            None => (String::new(), false),
        };

        items.push(json!({
            "index": i,
            "name": name,
            "position": convert::time_to_beats(api, position)?,
            "length": convert::span_in_beats(api, position, length)?,
            "is_midi": is_midi,
        }));
    }
    Ok(items)
}

fn get_items(api: &mut dyn ReaScript, params: TrackParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    Ok(json!({"items": describe_items(api, track)?}))
}

fn create_midi_item(api: &mut dyn ReaScript, params: CreateMidiItemParams) -> CommandResult {
    let track = lookup::track(api, params.track_index)?;
    let start = convert::beats_to_time(api, params.position)?;
    let end = convert::beats_to_time(api, params.position + params.length)?;
    api.create_new_midi_item(track, start, end)?;

    Ok(json!({
        "track_index": params.track_index,
        "position": params.position,
        "length": params.length,
    }))
}

fn delete_item(api: &mut dyn ReaScript, params: ItemParams) -> CommandResult {
    let (track, item) = lookup::item(api, params.track_index, params.item_index)?;
    if !api.delete_track_media_item(track, item)? {
        return Err(CommandError::Runtime(format!(
            "REAPER could not delete item {} on track {}",
            params.item_index, params.track_index
        )));
    }
    Ok(json!({"deleted": true}))
}

/// Copy and paste through the clipboard, the way a user would in REAPER
fn duplicate_item(api: &mut dyn ReaScript, params: DuplicateItemParams) -> CommandResult {
    let (_, item) = lookup::item(api, params.track_index, params.item_index)?;
    let destination = convert::beats_to_time(api, params.destination_time)?;

    api.select_all_media_items(false)?;
    api.set_media_item_selected(item, true)?;
    api.main_on_command(ACTION_COPY_ITEMS)?;

    api.set_edit_cur_pos(destination, false, false)?;
    api.main_on_command(ACTION_PASTE_ITEMS)?;

    api.select_all_media_items(false)?;

    Ok(json!({
        "duplicated": true,
        "destination_time": params.destination_time,
    }))
}

fn set_item_name(api: &mut dyn ReaScript, params: SetItemNameParams) -> CommandResult {
    let take = lookup::active_take(api, params.track_index, params.item_index)?;
    api.set_take_name(take, &params.name)?;
    Ok(json!({"name": params.name}))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{approx, fail, offline_client, run};
    use serde_json::json;

    #[test]
    fn test_create_midi_item_in_beats() {
        let (sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));

        let created = run(
            &mut client,
            "create_midi_item",
            json!({"track_index": 0, "position": 4}),
        );
        assert_eq!(created, json!({"track_index": 0, "position": 4.0, "length": 4.0}));

        // 120 BPM: beat 4 is 2s, four beats last 2s
        let (position, length) = sim.inspect(|p| {
            let item = &p.state().tracks[0].items[0];
            (item.position, item.length)
        });
        assert!((position - 2.0).abs() < 1e-9);
        assert!((length - 2.0).abs() < 1e-9);

        let items = run(&mut client, "get_items", json!({"track_index": 0}));
        let item = &items["items"][0];
        assert_eq!(item["index"], 0);
        assert_eq!(item["is_midi"], true);
        assert!(approx(&item["position"], 4.0));
        assert!(approx(&item["length"], 4.0));
    }

    #[test]
    fn test_item_length_across_tempo_change() {
        let (sim, mut client) = offline_client();
        sim.add_tempo_marker(4.0, 60.0);
        run(&mut client, "create_track", json!(null));
        run(
            &mut client,
            "create_midi_item",
            json!({"track_index": 0, "position": 6.0, "length": 4.0}),
        );

        let items = run(&mut client, "get_items", json!({"track_index": 0}));
        assert!(approx(&items["items"][0]["position"], 6.0));
        assert!(approx(&items["items"][0]["length"], 4.0));
        // Beats 6..8 at 120 BPM, 8..10 at 60 BPM
        let length = sim.inspect(|p| p.state().tracks[0].items[0].length);
        assert!((length - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_item_index_range() {
        let (_sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        run(&mut client, "create_midi_item", json!({"track_index": 0, "position": 0.0}));

        let err = fail(&mut client, "delete_item", json!({"track_index": 0, "item_index": 1}));
        assert_eq!(err, "Item index 1 out of range (0-0)");
        let err = fail(&mut client, "delete_item", json!({"track_index": 3, "item_index": 0}));
        assert_eq!(err, "Track index 3 out of range (0-0)");

        run(&mut client, "delete_item", json!({"track_index": 0, "item_index": 0}));
        let items = run(&mut client, "get_items", json!({"track_index": 0}));
        assert_eq!(items, json!({"items": []}));
    }

    #[test]
    fn test_duplicate_item() {
        let (sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        run(&mut client, "create_midi_item", json!({"track_index": 0, "position": 0.0}));
        run(
            &mut client,
            "set_item_notes",
            json!({"track_index": 0, "item_index": 0, "notes": [{"pitch": 67}]}),
        );

        let result = run(
            &mut client,
            "duplicate_item",
            json!({"track_index": 0, "item_index": 0, "destination_time": 8}),
        );
        assert_eq!(result, json!({"duplicated": true, "destination_time": 8.0}));

        let items = run(&mut client, "get_items", json!({"track_index": 0}));
        let items = items["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(approx(&items[1]["position"], 8.0));
        assert!(approx(&items[1]["length"], 4.0));

        let notes = run(&mut client, "get_item_notes", json!({"track_index": 0, "item_index": 1}));
        assert_eq!(notes["notes"][0]["pitch"], 67);

        // Nothing is left selected
        assert!(sim.inspect(|p| p.state().tracks[0].items.iter().all(|it| !it.selected)));
    }

    #[test]
    fn test_set_item_name() {
        let (sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        run(&mut client, "create_midi_item", json!({"track_index": 0, "position": 0.0}));

        let renamed = run(
            &mut client,
            "set_item_name",
            json!({"track_index": 0, "item_index": 0, "name": "Verse riff"}),
        );
        assert_eq!(renamed, json!({"name": "Verse riff"}));
        assert_eq!(
            sim.inspect(|p| p.state().tracks[0].items[0].takes[0].name.clone()),
            "Verse riff"
        );
    }

    #[test]
    fn test_refused_delete_is_reported() {
        let (sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        run(&mut client, "create_midi_item", json!({"track_index": 0, "position": 0.0}));

        sim.refuse("DeleteTrackMediaItem");
        let err = fail(&mut client, "delete_item", json!({"track_index": 0, "item_index": 0}));
        assert_eq!(err, "REAPER could not delete item 0 on track 0");
        assert_eq!(sim.inspect(|p| p.state().tracks[0].items.len()), 1);
    }
}
