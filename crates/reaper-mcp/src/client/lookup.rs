//! Positional lookups, checked against REAPER's current counts

use reaper_core::{MediaItem, MediaItemTake, MediaTrack, ReaScript};

use crate::error::{CommandError, CommandResult};

/// Reject `index` unless it lies in `0..count`
pub fn check_index(kind: &str, index: i32, count: i32) -> CommandResult<()> {
    if index < 0 || index >= count {
        return Err(CommandError::Value(format!(
            "{} index {} out of range (0-{})",
            kind,
            index,
            count - 1
        )));
    }
    Ok(())
}

pub fn track(api: &mut dyn ReaScript, track_index: i32) -> CommandResult<MediaTrack> {
    check_index("Track", track_index, api.count_tracks()?)?;
    Ok(api.get_track(track_index)?)
}

pub fn item(
    api: &mut dyn ReaScript,
    track_index: i32,
    item_index: i32,
) -> CommandResult<(MediaTrack, MediaItem)> {
    let track = track(api, track_index)?;
    check_index("Item", item_index, api.count_track_media_items(track)?)?;
    let item = api.get_track_media_item(track, item_index)?;
    Ok((track, item))
}

pub fn active_take(
    api: &mut dyn ReaScript,
    track_index: i32,
    item_index: i32,
) -> CommandResult<MediaItemTake> {
    let (_, item) = item(api, track_index, item_index)?;
    api.active_take(item)?.ok_or_else(|| {
        CommandError::Value(format!(
            "No active take on item {}, track {}",
            item_index, track_index
        ))
    })
}

/// The active take, which must hold MIDI
pub fn midi_take(
    api: &mut dyn ReaScript,
    track_index: i32,
    item_index: i32,
) -> CommandResult<MediaItemTake> {
    let take = active_take(api, track_index, item_index)?;
    if !api.take_is_midi(take)? {
        return Err(CommandError::Value("Item does not contain MIDI data".to_string()));
    }
    Ok(take)
}

pub fn fx(api: &mut dyn ReaScript, track: MediaTrack, fx_index: i32) -> CommandResult<()> {
    check_index("FX", fx_index, api.track_fx_count(track)?)
}

pub fn param(
    api: &mut dyn ReaScript,
    track: MediaTrack,
    fx_index: i32,
    param_index: i32,
) -> CommandResult<()> {
    fx(api, track, fx_index)?;
    check_index("Parameter", param_index, api.track_fx_num_params(track, fx_index)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_message() {
        assert!(check_index("Track", 2, 3).is_ok());
        let err = check_index("Track", 3, 3).unwrap_err();
        assert_eq!(err.to_string(), "Track index 3 out of range (0-2)");
        let err = check_index("FX", -1, 1).unwrap_err();
        assert_eq!(err.to_string(), "FX index -1 out of range (0-0)");
    }
}
