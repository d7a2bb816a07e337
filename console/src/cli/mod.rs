use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio::sync::{
    broadcast,
    mpsc::{UnboundedReceiver, UnboundedSender},
};
use tokio_stream::{wrappers::LinesStream, StreamExt};
use wire::model::{BotStatus, PlaybackState, VolumeTarget};

use crate::connection::ConnectionStatus;
use crate::notify::{Notice, ProgressUpdate, Severity};
use crate::state_store::{Action, State};
use crate::Interrupted;

const HELP: &str = "\
commands:
  name <display-name>      set and persist your display name
  add <youtube-link>       queue a song
  rm <id>                  remove a queued song
  mv <id> <target-id>      move a row onto another row
  skip | stop | pause | resume | loop | mic
  vol music|mic <0-100>    set a mixer volume
  vol music|mic grab       hold a control so inbound values wait
  vol music|mic release    let go of a held control
  join <meet-link>         send the agent into a call (admin)
  leave                    pull the agent out of the call (admin)
  admin on|off             toggle the local admin unlock
  quit";

/// Reads commands from stdin and prints state snapshots, notices and
/// progress reports. A stand-in for the real renderer; it only consumes
/// the state store's subscription surfaces and never mutates state.
pub async fn main_loop(
    mut interrupt_rx: broadcast::Receiver<Interrupted>,
    action_tx: UnboundedSender<Action>,
    mut state_rx: UnboundedReceiver<State>,
    mut notice_rx: UnboundedReceiver<Notice>,
    mut progress_rx: UnboundedReceiver<ProgressUpdate>,
) -> anyhow::Result<Interrupted> {
    let mut lines = LinesStream::new(BufReader::new(stdin()).lines());
    let mut last: Option<State> = None;

    let result = loop {
        tokio::select! {
            Some(state) = state_rx.recv() => {
                if last.as_ref() != Some(&state) {
                    print_status(&state);
                    last = Some(state);
                }
            },
            Some(notice) = notice_rx.recv() => print_notice(&notice),
            Some(progress) = progress_rx.recv() => {
                println!("  {} / {}", format_time(progress.current), format_time(progress.total));
            },
            Some(line) = lines.next() => {
                let line = line?;
                match parse_line(line.trim()) {
                    Ok(actions) => {
                        for action in actions {
                            action_tx.send(action)?;
                        }
                    }
                    Err(usage) => println!("{}", usage),
                }
            },
            Ok(interrupted) = interrupt_rx.recv() => {
                break interrupted;
            }
        }
    };

    Ok(result)
}

/// Parse one input line into the actions it stands for. A reorder is the
/// whole gesture at once: grab, hover, drop.
fn parse_line(line: &str) -> Result<Vec<Action>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(vec![]);
    };
    let rest = line[verb.len()..].trim();

    let actions = match verb {
        "help" => return Err(HELP.to_string()),
        "name" => vec![Action::SetUsername {
            name: rest.to_string(),
        }],
        "add" => vec![Action::AddSong {
            url: rest.to_string(),
        }],
        "rm" => vec![Action::RemoveSong {
            id: parse_id(words.next())?,
        }],
        "mv" => {
            let src = parse_id(words.next())?;
            let target = parse_id(words.next())?;
            vec![
                Action::GrabRow { id: src },
                Action::HoverRow { id: target },
                Action::DropRow,
            ]
        }
        "skip" => vec![Action::Skip],
        "stop" => vec![Action::Stop],
        "pause" => vec![Action::Pause],
        "resume" => vec![Action::Resume],
        "loop" => vec![Action::ToggleLoop],
        "mic" => vec![Action::ToggleMic],
        "vol" => {
            const USAGE: &str = "usage: vol music|mic grab|release|<0-100>";
            let target = match words.next() {
                Some("music") => VolumeTarget::Music,
                Some("mic") => VolumeTarget::Mic,
                _ => return Err(USAGE.to_string()),
            };
            match words.next() {
                Some("grab") => vec![Action::GrabVolume { target }],
                Some("release") => vec![Action::ReleaseVolume { target }],
                Some(raw) => {
                    let value = raw.parse::<i64>().map_err(|_| USAGE.to_string())?;
                    vec![Action::SetVolume { target, value }]
                }
                None => return Err(USAGE.to_string()),
            }
        }
        "join" => vec![Action::JoinMeet {
            link: rest.to_string(),
        }],
        "leave" => vec![Action::LeaveMeet],
        "admin" => match words.next() {
            Some("on") => vec![Action::Elevate { granted: true }],
            Some("off") => vec![Action::Elevate { granted: false }],
            _ => return Err("usage: admin on|off".to_string()),
        },
        "quit" | "exit" => vec![Action::Exit],
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };

    Ok(actions)
}

fn parse_id(word: Option<&str>) -> Result<u64, String> {
    word.and_then(|raw| raw.parse::<u64>().ok())
        .ok_or_else(|| "expected a numeric song id".to_string())
}

fn print_status(state: &State) {
    let link = match state.connection {
        ConnectionStatus::Open => "online",
        ConnectionStatus::Connecting => "connecting",
        ConnectionStatus::Disconnected => "offline",
    };
    let bot = match state.bot_status {
        BotStatus::Connected => "in the call",
        BotStatus::Connecting => "joining",
        BotStatus::Disconnected => "out of the call",
    };
    let playing = match (&state.current_song, state.playback_state) {
        (Some(song), PlaybackState::Playing) => format!("playing \"{}\"", song.title),
        (Some(song), _) => format!("paused \"{}\"", song.title),
        (None, _) => "nothing playing".to_string(),
    };

    println!(
        "[{}] bot {} | {} | queue {} | music {}% mic {}%{}{}",
        link,
        bot,
        playing,
        state.queue.len(),
        state.displayed_volume(VolumeTarget::Music),
        state.displayed_volume(VolumeTarget::Mic),
        if state.mic_muted { " | mic muted" } else { "" },
        if state.looping { " | loop" } else { "" },
    );
}

fn print_notice(notice: &Notice) {
    let prefix = match notice.severity {
        Severity::Info => "--",
        Severity::Success => "ok",
        Severity::Error => "!!",
    };
    println!("{} {}", prefix, notice.message);
}

fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
