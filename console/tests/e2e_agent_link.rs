use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use console::connection::{Connection, ConnectionStatus, SendOutcome};
use console::identity::IdentityStore;
use console::state_store::{Action, State, StateStore};
use console::{create_termination, Interrupted};
use wire::command::{self, Command};
use wire::message::{MicStatusMessage, ServerMessage, StateSyncMessage};
use wire::model::{BotStatus, PlaybackState};

#[tokio::test]
async fn assert_console_agent_transport() {
    // bind on an ephemeral port to keep parallel test runs apart
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("could not bind to a port");
    let addr = listener.local_addr().expect("listener has no address");

    let (agent_collected_frames, console_collected_messages) =
        tokio::join!(execute_agent(listener), execute_console(addr));

    assert_eq!(
        agent_collected_frames.unwrap(),
        vec![
            r#"{"type":"skip"}"#.to_string(),
            r#"{"type":"remove_song","id":2}"#.to_string(),
        ]
    );

    assert_eq!(
        console_collected_messages.unwrap(),
        vec![
            ServerMessage::StateSync(StateSyncMessage {
                queue: vec![],
                current_song: None,
                playback_state: PlaybackState::Idle,
                looping: false,
                music_volume: 80,
                mic_volume: 80,
                mic_muted: false,
                meet_link: None,
                bot_status: BotStatus::Disconnected,
            }),
            // an unrecognized kind still flows through the transport; the
            // merge layer is what ignores it
            ServerMessage::Unknown,
            ServerMessage::MicStatus(MicStatusMessage { muted: true }),
        ]
    );
}

async fn execute_agent(listener: TcpListener) -> anyhow::Result<Vec<String>> {
    // accept the only console connection we will have
    let (stream, _addr) = listener.accept().await?;
    let mut ws = tokio_tungstenite::accept_async(stream).await?;

    // greet the console with a full snapshot, the way the agent does
    ws.send(WsMessage::Text(
        r#"{"type":"state_sync","queue":[],"current_song":null,"playback_state":"idle","loop":false,"music_volume":80,"mic_volume":80,"mic_muted":false,"meet_link":null,"bot_status":"disconnected"}"#.to_string(),
    ))
    .await?;
    // a frame the console cannot decode; it must be dropped silently
    ws.send(WsMessage::Text("not json at all".to_string()))
        .await?;
    // a kind the console does not recognize
    ws.send(WsMessage::Text(r#"{"type":"future_thing","n":1}"#.to_string()))
        .await?;
    ws.send(WsMessage::Text(
        r#"{"type":"mic_status","muted":true}"#.to_string(),
    ))
    .await?;

    // collect the raw command frames the console sends back
    let mut collected_frames = Vec::new();
    while let Some(frame) = ws.next().await {
        match frame {
            Ok(WsMessage::Text(raw)) => collected_frames.push(raw),
            Ok(WsMessage::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    Ok(collected_frames)
}

async fn execute_console(addr: SocketAddr) -> anyhow::Result<Vec<ServerMessage>> {
    let mut conn = Connection::new(format!("ws://{}/ws", addr));

    conn.connect().await?;
    assert_eq!(conn.status(), ConnectionStatus::Open);
    assert!(!conn.reconnect_scheduled());

    // connect() is idempotent while a connection is up
    conn.connect().await?;
    assert_eq!(conn.status(), ConnectionStatus::Open);

    // the undecodable frame in between must not interrupt the stream
    let mut collected_messages = Vec::new();
    for _ in 0..3 {
        match conn.next_message().await {
            Some(message) => collected_messages.push(message),
            None => return Err(anyhow::anyhow!("agent closed the link early")),
        }
    }

    let outcome = conn.send(&Command::Skip(command::SkipCommand)).await;
    assert_eq!(outcome, SendOutcome::Sent);

    let outcome = conn
        .send(&Command::RemoveSong(command::RemoveSongCommand { id: 2 }))
        .await;
    assert_eq!(outcome, SendOutcome::Sent);

    // dropping the connection ends the agent's read loop
    Ok(collected_messages)
}

#[tokio::test]
async fn assert_offline_reorder_reverts_after_the_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("could not bind to a port");
    let addr = listener.local_addr().expect("listener has no address");

    // an agent that hands out one snapshot and dies
    tokio::spawn(async move {
        let (stream, _addr) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(WsMessage::Text(
            r#"{"type":"state_sync","queue":[{"id":1,"title":"A","duration_str":"1:00","added_by":"umut"},{"id":2,"title":"B","duration_str":"1:00","added_by":"umut"},{"id":3,"title":"C","duration_str":"1:00","added_by":"umut"}],"current_song":null,"playback_state":"idle","loop":false,"music_volume":80,"mic_volume":80,"mic_muted":false,"meet_link":null,"bot_status":"disconnected"}"#
                .to_string(),
        ))
        .await
        .unwrap();
        ws.close(None).await.unwrap();
    });

    let (terminator, interrupt_rx) = create_termination();
    let mut quit = terminator.clone();
    let (state_store, mut state_rx, _notice_rx, _progress_rx) = StateStore::new();
    let (action_tx, action_rx) = mpsc::unbounded_channel();

    let identity = IdentityStore::new(
        std::env::temp_dir().join(format!("console-e2e-offline-{}", std::process::id())),
    );
    let store_handle = tokio::spawn(state_store.main_loop(
        format!("ws://{}/ws", addr),
        identity,
        terminator,
        action_rx,
        interrupt_rx,
    ));

    // the snapshot lands, then the dead link is noticed
    wait_for_state(&mut state_rx, |state| queue_ids(state) == vec![1, 2, 3]).await;
    wait_for_state(&mut state_rx, |state| {
        state.connection == ConnectionStatus::Disconnected
    })
    .await;

    // a full reorder gesture while the link is down
    action_tx.send(Action::GrabRow { id: 3 }).unwrap();
    action_tx.send(Action::HoverRow { id: 1 }).unwrap();
    action_tx.send(Action::DropRow).unwrap();

    // the optimistic order shows even though the command was dropped
    wait_for_state(&mut state_rx, |state| queue_ids(state) == vec![3, 1, 2]).await;

    // with no confirmation possible, the revert deadline must still fire
    wait_for_state(&mut state_rx, |state| queue_ids(state) == vec![1, 2, 3]).await;

    quit.terminate(Interrupted::UserRequest).unwrap();
    let interrupted = store_handle
        .await
        .expect("state store task panicked")
        .expect("state store loop failed");
    assert_eq!(interrupted, Interrupted::UserRequest);
}

fn queue_ids(state: &State) -> Vec<u64> {
    state.queue.iter().map(|song| song.id).collect()
}

async fn wait_for_state(
    state_rx: &mut UnboundedReceiver<State>,
    predicate: impl Fn(&State) -> bool,
) -> State {
    timeout(Duration::from_secs(10), async {
        loop {
            let state = state_rx.recv().await.expect("state stream ended early");
            if predicate(&state) {
                return state;
            }
        }
    })
    .await
    .expect("timed out waiting for a matching state snapshot")
}
