//! MIDI notes on an item's active take

use reaper_core::{MidiNote, ReaScript};
use serde_json::json;

use super::{convert, lookup, CommandTable};
use crate::error::{CommandError, CommandResult};
use crate::params::{ItemParams, SetItemNotesParams};

pub(super) fn register(table: &mut CommandTable) {
    table.register("get_item_notes", get_item_notes);
    table.register("set_item_notes", set_item_notes);
}

fn get_item_notes(api: &mut dyn ReaScript, params: ItemParams) -> CommandResult {
    let take = lookup::midi_take(api, params.track_index, params.item_index)?;

    let mut notes = Vec::new();
    for i in 0..api.midi_count_notes(take)? {
        let note = api.midi_get_note(take, i)?;
        let start = convert::ppq_to_beats(api, take, note.start_ppq)?;
        let end = convert::ppq_to_beats(api, take, note.end_ppq)?;
        notes.push(json!({
            "pitch": note.pitch,
            "start_time": start,
            "duration": end - start,
            "velocity": note.velocity,
            "mute": note.muted,
        }));
    }
    Ok(json!({"notes": notes}))
}

fn set_item_notes(api: &mut dyn ReaScript, params: SetItemNotesParams) -> CommandResult {
    let take = lookup::midi_take(api, params.track_index, params.item_index)?;

    if !params.append {
        // Highest first so the remaining indices stay valid
        for i in (0..api.midi_count_notes(take)?).rev() {
            if !api.midi_delete_note(take, i)? {
                return Err(CommandError::Runtime(format!(
                    "REAPER could not delete note {} to replace it",
                    i
                )));
            }
        }
    }

    for spec in &params.notes {
        let note = MidiNote {
            selected: false,
            muted: spec.mute,
            start_ppq: convert::beats_to_ppq(api, take, spec.start_time)?,
            end_ppq: convert::beats_to_ppq(api, take, spec.start_time + spec.duration)?,
            channel: 0,
            pitch: spec.pitch,
            velocity: spec.velocity,
        };
        if !api.midi_insert_note(take, &note, true)? {
            return Err(CommandError::Runtime(format!(
                "REAPER rejected note {} at beat {}",
                spec.pitch, spec.start_time
            )));
        }
    }
    api.midi_sort(take)?;

    Ok(json!({"notes_set": params.notes.len()}))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{approx, fail, offline_client, run};
    use serde_json::{json, Value};

    fn assert_notes(actual: &Value, expected: &[(i64, f64, f64, i64, bool)]) {
        let notes = actual["notes"].as_array().unwrap();
        assert_eq!(notes.len(), expected.len());
        for (note, &(pitch, start, duration, velocity, mute)) in notes.iter().zip(expected) {
            assert_eq!(note["pitch"], pitch);
            assert!(
                approx(&note["start_time"], start),
                "start {} != {}",
                note["start_time"],
                start
            );
            assert!(
                approx(&note["duration"], duration),
                "duration {} != {}",
                note["duration"],
                duration
            );
            assert_eq!(note["velocity"], velocity);
            assert_eq!(note["mute"], mute);
        }
    }

    #[test]
    fn test_replace_then_read_back() {
        let (_sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        run(
            &mut client,
            "create_midi_item",
            json!({"track_index": 0, "position": 4.0, "length": 8.0}),
        );

        let notes = json!([
            {"pitch": 64, "start_time": 5.0, "duration": 1.0, "velocity": 90},
            {"pitch": 60, "start_time": 4.0},
            {"pitch": 67, "start_time": 6.5, "duration": 0.25, "mute": true},
        ]);
        let result = run(
            &mut client,
            "set_item_notes",
            json!({"track_index": 0, "item_index": 0, "notes": notes}),
        );
        assert_eq!(result, json!({"notes_set": 3}));

        let read = run(&mut client, "get_item_notes", json!({"track_index": 0, "item_index": 0}));
        assert_notes(
            &read,
            &[
                (60, 4.0, 0.5, 100, false),
                (64, 5.0, 1.0, 90, false),
                (67, 6.5, 0.25, 100, true),
            ],
        );
    }

    #[test]
    fn test_replace_clears_and_append_keeps() {
        let (_sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        run(&mut client, "create_midi_item", json!({"track_index": 0, "position": 0.0}));
        let target = json!({"track_index": 0, "item_index": 0});

        let mut params = target.clone();
        params["notes"] = json!([{"pitch": 60}, {"pitch": 62, "start_time": 1.0}]);
        run(&mut client, "set_item_notes", params);

        let mut params = target.clone();
        params["notes"] = json!([{"pitch": 72, "start_time": 2.0}]);
        run(&mut client, "set_item_notes", params.clone());
        let read = run(&mut client, "get_item_notes", target.clone());
        assert_notes(&read, &[(72, 2.0, 0.5, 100, false)]);

        params["notes"] = json!([{"pitch": 48}]);
        params["append"] = json!(true);
        run(&mut client, "set_item_notes", params);
        let read = run(&mut client, "get_item_notes", target);
        assert_notes(&read, &[(48, 0.0, 0.5, 100, false), (72, 2.0, 0.5, 100, false)]);
    }

    #[test]
    fn test_round_trip_across_tempo_changes() {
        let (sim, mut client) = offline_client();
        // 120 BPM, then 90 BPM from beat 8, then 150 BPM from beat 14
        sim.add_tempo_marker(4.0, 90.0);
        sim.add_tempo_marker(8.0, 150.0);
        run(&mut client, "create_track", json!(null));
        run(
            &mut client,
            "create_midi_item",
            json!({"track_index": 0, "position": 2.0, "length": 16.0}),
        );

        let notes = json!([
            {"pitch": 60, "start_time": 2.0, "duration": 7.0},
            {"pitch": 62, "start_time": 7.75, "duration": 0.5},
            {"pitch": 64, "start_time": 13.5, "duration": 3.25},
        ]);
        run(
            &mut client,
            "set_item_notes",
            json!({"track_index": 0, "item_index": 0, "notes": notes}),
        );

        let read = run(&mut client, "get_item_notes", json!({"track_index": 0, "item_index": 0}));
        assert_notes(
            &read,
            &[
                (60, 2.0, 7.0, 100, false),
                (62, 7.75, 0.5, 100, false),
                (64, 13.5, 3.25, 100, false),
            ],
        );
    }

    #[test]
    fn test_audio_item_is_rejected() {
        let (sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        sim.add_audio_item(0, 0.0, 4.0, "vox.wav").unwrap();

        let err = fail(&mut client, "get_item_notes", json!({"track_index": 0, "item_index": 0}));
        assert_eq!(err, "Item does not contain MIDI data");
        let err = fail(
            &mut client,
            "set_item_notes",
            json!({"track_index": 0, "item_index": 0, "notes": []}),
        );
        assert_eq!(err, "Item does not contain MIDI data");
    }

    #[test]
    fn test_notes_must_be_a_list() {
        let (_sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        run(&mut client, "create_midi_item", json!({"track_index": 0, "position": 0.0}));
        let err = fail(
            &mut client,
            "set_item_notes",
            json!({"track_index": 0, "item_index": 0, "notes": "C4"}),
        );
        assert!(err.starts_with("Invalid parameters"));
    }

    #[test]
    fn test_refused_note_edits_are_reported() {
        let (sim, mut client) = offline_client();
        run(&mut client, "create_track", json!(null));
        run(&mut client, "create_midi_item", json!({"track_index": 0, "position": 0.0}));
        let target = json!({"track_index": 0, "item_index": 0});

        let mut params = target.clone();
        params["notes"] = json!([{"pitch": 60}]);
        run(&mut client, "set_item_notes", params.clone());

        sim.refuse("MIDI_DeleteNote");
        params["notes"] = json!([{"pitch": 62}]);
        let err = fail(&mut client, "set_item_notes", params.clone());
        assert_eq!(err, "REAPER could not delete note 0 to replace it");
        let read = run(&mut client, "get_item_notes", target.clone());
        assert_notes(&read, &[(60, 0.0, 0.5, 100, false)]);

        sim.refuse("MIDI_InsertNote");
        params["notes"] = json!([{"pitch": 64, "start_time": 1.5}]);
        params["append"] = json!(true);
        let err = fail(&mut client, "set_item_notes", params);
        assert_eq!(err, "REAPER rejected note 64 at beat 1.5");
    }
}
