use tokio::time::Instant;

use wire::message::ServerMessage;
use wire::model::{BotStatus, PlaybackState, Song, VolumeTarget};

use crate::connection::ConnectionStatus;
use crate::dispatch::{ADD_BUSY_WINDOW, REORDER_CONFIRM_TIMEOUT};
use crate::notify::{Notice, ProgressUpdate};
use crate::reorder::ReorderGesture;

/// A volume control currently held by the local user. Inbound volume
/// updates still land in the store, but the displayed value stays with
/// the user's hand until release so the agent cannot fight an in-progress
/// drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VolumeHold {
    target: VolumeTarget,
    value: u8,
}

/// An optimistically applied queue order awaiting an authoritative
/// `queue_update`. `previous` is the last order the agent confirmed; the
/// local order reverts to it if no confirmation arrives in time.
#[derive(Debug, Clone, PartialEq)]
struct PendingReorder {
    previous: Vec<Song>,
    deadline: Instant,
}

/// Side effects a merge or a timer expiry can produce for external
/// consumers. None of these mutate the state snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Notice),
    Progress(ProgressUpdate),
}

/// Everything a subscriber needs to render one consistent frame: the
/// mirrored agent-owned state plus local-only interaction state. Mutated
/// exclusively by the single state store task, so no locking is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub connection: ConnectionStatus,
    pub username: String,
    /// Client-local capability flag; unlocks session commands in the UI
    /// and nothing else
    pub elevated: bool,

    // agent-owned, mirrored
    pub queue: Vec<Song>,
    pub current_song: Option<Song>,
    pub playback_state: PlaybackState,
    pub looping: bool,
    pub music_volume: u8,
    pub mic_volume: u8,
    pub mic_muted: bool,
    pub bot_status: BotStatus,
    pub meet_link: Option<String>,

    // local-only interaction state
    pub gesture: ReorderGesture,
    volume_hold: Option<VolumeHold>,
    add_busy_until: Option<Instant>,
    pending_reorder: Option<PendingReorder>,
}

impl Default for State {
    fn default() -> Self {
        State {
            connection: ConnectionStatus::Disconnected,
            username: String::new(),
            elevated: false,
            queue: Vec::new(),
            current_song: None,
            playback_state: PlaybackState::Idle,
            looping: false,
            music_volume: 80,
            mic_volume: 80,
            mic_muted: false,
            bot_status: BotStatus::Disconnected,
            meet_link: None,
            gesture: ReorderGesture::default(),
            volume_hold: None,
            add_busy_until: None,
            pending_reorder: None,
        }
    }
}

impl State {
    /// Merge one inbound message by its fixed per-kind policy. Merges are
    /// last-write-wins in socket arrival order; there is no sequence
    /// numbering to reconcile.
    pub fn handle_server_message(&mut self, message: &ServerMessage) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            ServerMessage::StateSync(sync) => {
                self.queue = sync.queue.clone();
                self.current_song = sync.current_song.clone();
                self.playback_state = sync.playback_state;
                self.looping = sync.looping;
                self.music_volume = sync.music_volume;
                self.mic_volume = sync.mic_volume;
                self.mic_muted = sync.mic_muted;
                self.bot_status = sync.bot_status;
                self.meet_link = sync.meet_link.clone();
                // a full snapshot is as authoritative as a queue gets
                self.pending_reorder = None;
            }
            ServerMessage::QueueUpdate(update) => {
                self.queue = update.queue.clone();
                self.pending_reorder = None;
            }
            ServerMessage::PlaybackUpdate(update) => {
                self.current_song = update.current_song.clone();
                self.playback_state = update.playback_state;
                self.looping = update.looping;
            }
            ServerMessage::VolumeUpdate(update) => {
                // accepted into the store even mid-hold; only the
                // displayed value is suppressed until release
                self.music_volume = update.music_volume;
                self.mic_volume = update.mic_volume;
            }
            ServerMessage::MicStatus(status) => {
                self.mic_muted = status.muted;
            }
            ServerMessage::BotStatus(status) => {
                self.bot_status = status.status;
                // meet_link is sticky: partial updates may omit it
                if let Some(link) = &status.meet_link {
                    self.meet_link = Some(link.clone());
                }
            }
            ServerMessage::SongAdded(added) => {
                // the closest thing to an ack this protocol has
                self.add_busy_until = None;
                effects.push(Effect::Notify(Notice::success(format!(
                    "\"{}\" queued",
                    added.song.title
                ))));
            }
            ServerMessage::ProgressUpdate(progress) => {
                if progress.total > 0.0 {
                    effects.push(Effect::Progress(ProgressUpdate {
                        current: progress.current,
                        total: progress.total,
                    }));
                }
            }
            ServerMessage::Error(error) => {
                effects.push(Effect::Notify(Notice::error(error.message.clone())));
            }
            ServerMessage::Unknown => {}
        }

        effects
    }

    pub fn set_connection(&mut self, status: ConnectionStatus) {
        self.connection = status;
    }

    /// The volume a control should show: the held value wins over the
    /// store while the user is mid-drag.
    pub fn displayed_volume(&self, target: VolumeTarget) -> u8 {
        match self.volume_hold {
            Some(hold) if hold.target == target => hold.value,
            _ => self.stored_volume(target),
        }
    }

    fn stored_volume(&self, target: VolumeTarget) -> u8 {
        match target {
            VolumeTarget::Music => self.music_volume,
            VolumeTarget::Mic => self.mic_volume,
        }
    }

    pub fn grab_volume(&mut self, target: VolumeTarget) {
        self.volume_hold = Some(VolumeHold {
            target,
            value: self.stored_volume(target),
        });
    }

    /// Optimistic echo suppression: the local value reflects immediately,
    /// the agent broadcasts the same value back shortly after.
    pub fn set_volume_local(&mut self, target: VolumeTarget, value: u8) {
        match target {
            VolumeTarget::Music => self.music_volume = value,
            VolumeTarget::Mic => self.mic_volume = value,
        }
        if let Some(hold) = self.volume_hold.as_mut() {
            if hold.target == target {
                hold.value = value;
            }
        }
    }

    pub fn release_volume(&mut self, target: VolumeTarget) {
        if matches!(self.volume_hold, Some(hold) if hold.target == target) {
            self.volume_hold = None;
        }
    }

    /// Whether the add control is inside its post-submission busy window.
    pub fn add_busy(&self) -> bool {
        self.add_busy_until.is_some()
    }

    pub fn mark_add_busy(&mut self, now: Instant) {
        self.add_busy_until = Some(now + ADD_BUSY_WINDOW);
    }

    pub fn reorder_pending(&self) -> bool {
        self.pending_reorder.is_some()
    }

    /// Commit the in-flight drag gesture. On a usable target the local
    /// queue is rearranged immediately and the resulting id sequence is
    /// returned for submission as the authoritative new order.
    pub fn commit_drag(&mut self, now: Instant) -> Option<Vec<u64>> {
        let new_ids = self.gesture.drop_on_target(&self.queue)?;
        self.apply_reorder(&new_ids, now);

        Some(new_ids)
    }

    /// Apply a committed reorder gesture optimistically: rearrange the
    /// local queue to the given id sequence and remember the last
    /// authoritative order in case no confirmation arrives.
    pub fn apply_reorder(&mut self, new_ids: &[u64], now: Instant) {
        let previous = self.queue.clone();

        let mut reordered: Vec<Song> = Vec::with_capacity(self.queue.len());
        for &id in new_ids {
            if let Some(song) = self.queue.iter().find(|song| song.id == id) {
                reordered.push(song.clone());
            }
        }
        // rows the gesture did not cover keep their relative order at the tail
        for song in &self.queue {
            if !new_ids.contains(&song.id) {
                reordered.push(song.clone());
            }
        }

        self.queue = reordered;
        self.pending_reorder = Some(PendingReorder {
            previous,
            deadline: now + REORDER_CONFIRM_TIMEOUT,
        });
    }

    /// Advance local deadlines: expire the add busy window and revert an
    /// unconfirmed optimistic reorder to the last authoritative order.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();

        if self
            .add_busy_until
            .is_some_and(|deadline| deadline <= now)
        {
            self.add_busy_until = None;
        }

        if self
            .pending_reorder
            .as_ref()
            .is_some_and(|pending| pending.deadline <= now)
        {
            if let Some(pending) = self.pending_reorder.take() {
                self.queue = pending.previous;
                effects.push(Effect::Notify(Notice::info(
                    "queue change was not confirmed, restoring the last known order",
                )));
            }
        }

        effects
    }
}
