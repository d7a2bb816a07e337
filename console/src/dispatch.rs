use std::time::Duration;

use wire::command::{self, Command};
use wire::model::VolumeTarget;

use crate::notify::Notice;

/// Content hosts the agent knows how to fetch audio from.
pub const MUSIC_HOSTS: [&str; 2] = ["youtube.com", "youtu.be"];
/// The only conferencing domain the agent can join.
pub const MEET_HOST: &str = "meet.google.com";

/// How long the add control stays busy after a submission. The protocol
/// has no per-command acknowledgment, so this window is a heuristic; a
/// `song_added` notice clears it early when one arrives.
pub const ADD_BUSY_WINDOW: Duration = Duration::from_millis(3000);

/// How long an optimistically applied reorder may wait for an
/// authoritative queue before the local order reverts.
pub const REORDER_CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

/// Validate an add-song request before any network activity.
pub fn add_song(url: &str, added_by: &str) -> Result<Command, Notice> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Notice::error("enter a link first"));
    }
    if !MUSIC_HOSTS.iter().any(|host| url.contains(host)) {
        return Err(Notice::error("that does not look like a YouTube link"));
    }

    Ok(Command::AddSong(command::AddSongCommand {
        url: url.to_string(),
        added_by: added_by.to_string(),
    }))
}

/// Volumes live in [0,100]; anything outside is pulled to the nearest edge.
pub fn clamp_volume(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

pub fn set_volume(target: VolumeTarget, value: u8) -> Command {
    Command::SetVolume(command::SetVolumeCommand { target, value })
}

/// Validate a join request. Requires the elevated capability flag, which
/// is a client-local UI gate only; the agent itself enforces nothing, so
/// this must never be relied on as a security control.
pub fn join_meet(link: &str, elevated: bool) -> Result<Command, Notice> {
    if !elevated {
        return Err(Notice::error("this action needs the admin unlock"));
    }

    let link = link.trim();
    if link.is_empty() {
        return Err(Notice::error("enter a Meet link first"));
    }
    if !link.contains(MEET_HOST) {
        return Err(Notice::error("that does not look like a Meet link"));
    }

    Ok(Command::JoinMeet(command::JoinMeetCommand {
        link: link.to_string(),
    }))
}

pub fn leave_meet(elevated: bool) -> Result<Command, Notice> {
    if !elevated {
        return Err(Notice::error("this action needs the admin unlock"));
    }

    Ok(Command::LeaveMeet(command::LeaveMeetCommand))
}
