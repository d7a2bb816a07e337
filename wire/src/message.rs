use serde::{Deserialize, Serialize};

use crate::model::{BotStatus, PlaybackState, Song};

/// Complete snapshot of the agent-owned shared state. Sent to a console
/// right after it connects and whenever the agent resynchronizes everyone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSyncMessage {
    #[serde(default)]
    pub queue: Vec<Song>,
    #[serde(default)]
    pub current_song: Option<Song>,
    pub playback_state: PlaybackState,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub music_volume: u8,
    pub mic_volume: u8,
    #[serde(default)]
    pub mic_muted: bool,
    #[serde(default)]
    pub meet_link: Option<String>,
    pub bot_status: BotStatus,
}

/// The queue was mutated; carries the full new ordering. A missing or
/// null list means the queue is now empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueUpdateMessage {
    #[serde(default)]
    pub queue: Vec<Song>,
}

/// The playback slice of the shared state changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackUpdateMessage {
    #[serde(default)]
    pub current_song: Option<Song>,
    pub playback_state: PlaybackState,
    #[serde(rename = "loop")]
    pub looping: bool,
}

/// Both mixer volumes, broadcast after any volume change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeUpdateMessage {
    pub music_volume: u8,
    pub mic_volume: u8,
}

/// Microphone mute toggled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicStatusMessage {
    pub muted: bool,
}

/// The agent's presence in the conference call changed. `meet_link` is only
/// carried when known; consoles must not clear their copy when it is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotStatusMessage {
    pub status: BotStatus,
    #[serde(default)]
    pub meet_link: Option<String>,
}

/// A song was accepted into the queue. Informational only; the queue
/// itself arrives in a separate [QueueUpdateMessage].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongAddedMessage {
    pub song: Song,
}

/// Playback position report in seconds. Ephemeral; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdateMessage {
    pub current: f64,
    pub total: f64,
}

/// An error the agent reports back. Cannot be attributed to a specific
/// command because commands carry no correlation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

/// A message the agent broadcasts to its consoles.
/// Messages may be full or partial snapshots; each kind has a fixed merge
/// policy on the console side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    StateSync(StateSyncMessage),
    QueueUpdate(QueueUpdateMessage),
    PlaybackUpdate(PlaybackUpdateMessage),
    VolumeUpdate(VolumeUpdateMessage),
    MicStatus(MicStatusMessage),
    BotStatus(BotStatusMessage),
    SongAdded(SongAddedMessage),
    ProgressUpdate(ProgressUpdateMessage),
    Error(ErrorMessage),
    /// Kinds this console does not understand; ignored without an error so
    /// newer agents can keep talking to older consoles.
    #[serde(other)]
    Unknown,
}
