//! Beats at the boundary, seconds and ticks natively
//!
//! Every conversion goes through REAPER's tempo map so tempo changes are
//! honoured; nothing here assumes a fixed BPM or PPQ.

use reaper_core::{ApiResult, MediaItemTake, ReaScript};

pub fn beats_to_time(api: &mut dyn ReaScript, beats: f64) -> ApiResult<f64> {
    api.qn_to_time(beats)
}

pub fn time_to_beats(api: &mut dyn ReaScript, time: f64) -> ApiResult<f64> {
    api.time_to_qn(time)
}

/// Take-relative ticks to project beats
pub fn ppq_to_beats(api: &mut dyn ReaScript, take: MediaItemTake, ppq: f64) -> ApiResult<f64> {
    let time = api.midi_proj_time_from_ppq(take, ppq)?;
    time_to_beats(api, time)
}

/// Project beats to take-relative ticks
pub fn beats_to_ppq(api: &mut dyn ReaScript, take: MediaItemTake, beats: f64) -> ApiResult<f64> {
    let time = beats_to_time(api, beats)?;
    api.midi_ppq_from_proj_time(take, time)
}

/// Length in beats of the span `[start, start + length)` given in seconds
pub fn span_in_beats(api: &mut dyn ReaScript, start: f64, length: f64) -> ApiResult<f64> {
    let end = time_to_beats(api, start + length)?;
    Ok(end - time_to_beats(api, start)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reaper_core::Simulator;

    #[test]
    fn test_tempo_change_is_honoured() {
        let sim = Simulator::new();
        // 60 BPM from 4s, which is beat 8 at 120 BPM
        sim.add_tempo_marker(4.0, 60.0);
        let mut api = sim.session();

        assert!((beats_to_time(&mut api, 10.0).unwrap() - 6.0).abs() < 1e-9);
        assert!((time_to_beats(&mut api, 2.0).unwrap() - 4.0).abs() < 1e-9);
        assert!((span_in_beats(&mut api, 3.0, 2.0).unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_ticks_round_trip_through_take() {
        let sim = Simulator::new();
        let mut api = sim.session();
        api.insert_track_at_index(0, true).unwrap();
        let track = api.get_track(0).unwrap();
        // Item at beat 4
        let item = api.create_new_midi_item(track, 2.0, 4.0).unwrap();
        let take = api.active_take(item).unwrap().unwrap();

        let ppq = beats_to_ppq(&mut api, take, 5.0).unwrap();
        assert!((ppq - 960.0).abs() < 1e-6);
        assert!((ppq_to_beats(&mut api, take, ppq).unwrap() - 5.0).abs() < 1e-9);
    }
}
