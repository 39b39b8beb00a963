//! reaper-core - Shared functionality for reaper-mcp
//!
//! Holds the seam to REAPER's native scripting API (`ReaScript`), the two
//! backends that implement it (a TCP bridge into a running REAPER and an
//! in-memory project simulator), and the configuration/paths layer.

pub mod api;
pub mod bridge;
pub mod config;
pub mod error;
pub mod paths;
pub mod sim;

pub use api::{
    Connect, FxParam, MediaItem, MediaItemTake, MediaTrack, MidiNote, ProjectMarker, ReaScript,
    TempoMarkerEdit, ACTION_COPY_ITEMS, ACTION_PASTE_ITEMS,
};
pub use bridge::BridgeConnector;
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use paths::Paths;
pub use sim::Simulator;
