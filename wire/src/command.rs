use serde::{Deserialize, Serialize};

use crate::model::VolumeTarget;

/// Console command for queueing a new song from a supported content host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddSongCommand {
    // Link to the song on one of the accepted content hosts.
    pub url: String,
    // Display name of the user queueing the song.
    pub added_by: String,
}

/// Console command for removing a queued song by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveSongCommand {
    pub id: u64,
}

/// Console command carrying the full resulting queue order after a
/// drag-and-drop gesture. This is the authoritative new order, not a diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderQueueCommand {
    pub new_ids: Vec<u64>,
}

/// Console command for skipping to the next queued song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipCommand;

/// Console command for stopping playback and clearing the current song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopCommand;

/// Console command for pausing the current song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseCommand;

/// Console command for resuming playback (or starting it from the queue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeCommand;

/// Console command for toggling loop mode on the current song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopCommand;

/// Console command for toggling the agent's microphone mute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleMicCommand;

/// Console command for setting one of the two mixer volumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetVolumeCommand {
    pub target: VolumeTarget,
    // Already clamped to 0..=100 by the sender.
    pub value: u8,
}

/// Console command asking the agent to join (or move to) a conference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinMeetCommand {
    pub link: String,
}

/// Console command asking the agent to leave the conference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveMeetCommand;

/// A command a console can send to the automation agent.
/// All commands are fire-and-forget; the protocol has no per-command
/// correlation id, so replies cannot be matched to the command that
/// caused them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    AddSong(AddSongCommand),
    RemoveSong(RemoveSongCommand),
    ReorderQueue(ReorderQueueCommand),
    Skip(SkipCommand),
    Stop(StopCommand),
    Pause(PauseCommand),
    Resume(ResumeCommand),
    Loop(LoopCommand),
    ToggleMic(ToggleMicCommand),
    SetVolume(SetVolumeCommand),
    JoinMeet(JoinMeetCommand),
    LeaveMeet(LeaveMeetCommand),
}
