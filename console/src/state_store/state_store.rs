use std::time::Duration;

use tokio::sync::{
    broadcast,
    mpsc::{self, UnboundedReceiver, UnboundedSender},
};
use tokio::time::Instant;
use tracing::{info, warn};
use wire::command::{self, Command};

use crate::connection::{Connection, SendOutcome};
use crate::dispatch;
use crate::identity::IdentityStore;
use crate::notify::{Notice, ProgressUpdate};
use crate::{Interrupted, Terminator};

use super::{action::Action, Effect, State};

/// Owns the session: the agent link, the canonical state snapshot and the
/// translation of user actions into wire commands. All state mutation
/// happens on this single task, which is the only synchronization the
/// design needs.
pub struct StateStore {
    state_tx: UnboundedSender<State>,
    notice_tx: UnboundedSender<Notice>,
    progress_tx: UnboundedSender<ProgressUpdate>,
}

impl StateStore {
    #[allow(clippy::type_complexity)]
    pub fn new() -> (
        Self,
        UnboundedReceiver<State>,
        UnboundedReceiver<Notice>,
        UnboundedReceiver<ProgressUpdate>,
    ) {
        let (state_tx, state_rx) = mpsc::unbounded_channel::<State>();
        let (notice_tx, notice_rx) = mpsc::unbounded_channel::<Notice>();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel::<ProgressUpdate>();

        (
            StateStore {
                state_tx,
                notice_tx,
                progress_tx,
            },
            state_rx,
            notice_rx,
            progress_rx,
        )
    }

    pub async fn main_loop(
        self,
        url: String,
        identity: IdentityStore,
        mut terminator: Terminator,
        mut action_rx: UnboundedReceiver<Action>,
        mut interrupt_rx: broadcast::Receiver<Interrupted>,
    ) -> anyhow::Result<Interrupted> {
        let mut state = State::default();
        state.username = identity.load().unwrap_or_default();

        let mut conn = Connection::new(url);

        // connect eagerly, like the page does on load; a failure just
        // leaves a reconnect attempt scheduled
        match conn.connect().await {
            Ok(()) => self.notify(Notice::success("connected to the agent")),
            Err(err) => {
                info!(%err, "initial connect failed, retrying");
                self.notify(Notice::error("agent is unreachable, retrying"));
            }
        }
        state.set_connection(conn.status());

        // the initial state once
        self.state_tx.send(state.clone())?;

        let mut ticker = tokio::time::interval(Duration::from_millis(250));

        let result = loop {
            if conn.is_open() {
                tokio::select! {
                    // Merge agent messages as they come in
                    maybe_message = conn.next_message() => match maybe_message {
                        Some(message) => {
                            for effect in state.handle_server_message(&message) {
                                self.emit(effect);
                            }
                        },
                        // agent link dropped; the reconnect is already scheduled
                        None => {
                            conn.mark_closed();
                            state.set_connection(conn.status());
                            self.notify(Notice::error("lost the agent link"));
                        },
                    },
                    // Handle the actions coming from the front end
                    Some(action) = action_rx.recv() => {
                        if let Some(interrupted) = self
                            .handle_action(action, &mut state, &mut conn, &identity, &mut terminator)
                            .await?
                        {
                            break interrupted;
                        }
                    },
                    // Advance the add busy window and reorder confirmation deadline
                    _ = ticker.tick() => {
                        for effect in state.tick(Instant::now()) {
                            self.emit(effect);
                        }
                    },
                    // Catch and handle interrupt signal to gracefully shutdown
                    Ok(interrupted) = interrupt_rx.recv() => {
                        break interrupted;
                    }
                }
            } else {
                tokio::select! {
                    // The single scheduled reconnect attempt
                    _ = conn.reconnect_due() => {
                        match conn.connect().await {
                            Ok(()) => self.notify(Notice::success("connected to the agent")),
                            // the failed attempt scheduled the next one
                            Err(err) => info!(%err, "reconnect attempt failed"),
                        }
                        state.set_connection(conn.status());
                    },
                    // Actions still flow while disconnected; sends drop softly
                    Some(action) = action_rx.recv() => {
                        if let Some(interrupted) = self
                            .handle_action(action, &mut state, &mut conn, &identity, &mut terminator)
                            .await?
                        {
                            break interrupted;
                        }
                    },
                    // Local deadlines do not care about the link; an
                    // optimistic reorder that cannot be confirmed still
                    // reverts and the add busy window still expires
                    _ = ticker.tick() => {
                        for effect in state.tick(Instant::now()) {
                            self.emit(effect);
                        }
                    },
                    // Catch and handle interrupt signal to gracefully shutdown
                    Ok(interrupted) = interrupt_rx.recv() => {
                        break interrupted;
                    }
                }
            }

            self.state_tx.send(state.clone())?;
        };

        Ok(result)
    }

    async fn handle_action(
        &self,
        action: Action,
        state: &mut State,
        conn: &mut Connection,
        identity: &IdentityStore,
        terminator: &mut Terminator,
    ) -> anyhow::Result<Option<Interrupted>> {
        match action {
            Action::SetUsername { name } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    self.notify(Notice::error("name cannot be empty"));
                } else {
                    if let Err(err) = identity.store(&name) {
                        warn!(%err, "could not persist the display name");
                    }
                    state.username = name;
                }
            }
            Action::Elevate { granted } => {
                state.elevated = granted;
                if granted {
                    self.notify(Notice::success("admin actions unlocked"));
                }
            }
            Action::AddSong { url } => {
                if state.add_busy() {
                    self.notify(Notice::info("still queueing the previous link"));
                } else if state.username.is_empty() {
                    self.notify(Notice::error("set a name before queueing songs"));
                } else {
                    match dispatch::add_song(&url, &state.username) {
                        Ok(cmd) => {
                            if self.send(conn, state, &cmd).await == SendOutcome::Sent {
                                state.mark_add_busy(Instant::now());
                            }
                        }
                        Err(notice) => self.notify(notice),
                    }
                }
            }
            Action::RemoveSong { id } => {
                let cmd = Command::RemoveSong(command::RemoveSongCommand { id });
                self.send(conn, state, &cmd).await;
            }
            Action::GrabRow { id } => state.gesture.grab(id),
            Action::HoverRow { id } => state.gesture.hover(id),
            Action::CancelDrag => state.gesture.cancel(),
            Action::DropRow => {
                if let Some(new_ids) = state.commit_drag(Instant::now()) {
                    let cmd = Command::ReorderQueue(command::ReorderQueueCommand { new_ids });
                    self.send(conn, state, &cmd).await;
                }
            }
            Action::Skip => {
                self.send(conn, state, &Command::Skip(command::SkipCommand))
                    .await;
            }
            Action::Stop => {
                self.send(conn, state, &Command::Stop(command::StopCommand))
                    .await;
            }
            Action::Pause => {
                self.send(conn, state, &Command::Pause(command::PauseCommand))
                    .await;
            }
            Action::Resume => {
                self.send(conn, state, &Command::Resume(command::ResumeCommand))
                    .await;
            }
            Action::ToggleLoop => {
                self.send(conn, state, &Command::Loop(command::LoopCommand))
                    .await;
            }
            Action::ToggleMic => {
                self.send(conn, state, &Command::ToggleMic(command::ToggleMicCommand))
                    .await;
            }
            Action::GrabVolume { target } => state.grab_volume(target),
            Action::SetVolume { target, value } => {
                let value = dispatch::clamp_volume(value);
                state.set_volume_local(target, value);
                self.send(conn, state, &dispatch::set_volume(target, value))
                    .await;
            }
            Action::ReleaseVolume { target } => state.release_volume(target),
            Action::JoinMeet { link } => match dispatch::join_meet(&link, state.elevated) {
                Ok(cmd) => {
                    self.send(conn, state, &cmd).await;
                }
                Err(notice) => self.notify(notice),
            },
            Action::LeaveMeet => match dispatch::leave_meet(state.elevated) {
                Ok(cmd) => {
                    self.send(conn, state, &cmd).await;
                }
                Err(notice) => self.notify(notice),
            },
            Action::Exit => {
                let _ = terminator.terminate(Interrupted::UserRequest);

                return Ok(Some(Interrupted::UserRequest));
            }
        }

        Ok(None)
    }

    /// Fire-and-forget towards the agent. A drop is surfaced as a notice
    /// and the connection status in the snapshot is refreshed, since a
    /// failed write may have torn the link down.
    async fn send(&self, conn: &mut Connection, state: &mut State, command: &Command) -> SendOutcome {
        let outcome = conn.send(command).await;
        if outcome == SendOutcome::Dropped {
            state.set_connection(conn.status());
            self.notify(Notice::error("no agent link, command dropped"));
        }

        outcome
    }

    fn emit(&self, effect: Effect) {
        match effect {
            Effect::Notify(notice) => self.notify(notice),
            Effect::Progress(progress) => {
                let _ = self.progress_tx.send(progress);
            }
        }
    }

    // the sink may be gone during teardown; a lost notice is fine
    fn notify(&self, notice: Notice) {
        let _ = self.notice_tx.send(notice);
    }
}
