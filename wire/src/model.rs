use serde::{Deserialize, Serialize};

/// One entry of the shared music queue.
///
/// Identity is assigned by the agent and stays stable across reorders; a
/// console never fabricates a [Song]. The agent attaches more bookkeeping
/// fields on the wire (source url, raw duration, added_at) which consoles
/// do not need and silently ignore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Agent-assigned unique id, stable across reorders
    pub id: u64,
    /// Resolved display title
    pub title: String,
    /// Precomputed display duration, e.g. "3:45"
    pub duration_str: String,
    /// Display name of whoever queued the song
    pub added_by: String,
}

/// What the agent is currently doing with the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing is playing and no song is current
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Presence of the agent in the conference call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Which of the two mixer channels a volume command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTarget {
    Music,
    Mic,
}
