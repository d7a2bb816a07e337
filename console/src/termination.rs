use tokio::sync::broadcast;
#[cfg(unix)]
use tracing::warn;

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    /// SIGINT or SIGTERM from the operating system
    OsSignal,
    /// The user asked the console to quit
    UserRequest,
}

/// Handle for requesting a coordinated shutdown. Both long-running loops
/// subscribe to the same broadcast and wind down on the first reason they
/// see.
#[derive(Debug, Clone)]
pub struct Terminator {
    reason_tx: broadcast::Sender<Interrupted>,
}

impl Terminator {
    pub fn terminate(&mut self, reason: Interrupted) -> anyhow::Result<()> {
        self.reason_tx.send(reason)?;

        Ok(())
    }
}

/// Resolves once the process is told to shut down. A console tends to be
/// left running for the length of a call, so SIGTERM from a supervisor
/// matters as much as Ctrl-C.
#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }

    Ok(())
}

#[cfg(unix)]
async fn relay_os_signals(mut terminator: Terminator) {
    if let Err(err) = shutdown_signal().await {
        warn!(%err, "could not watch shutdown signals");
        return;
    }

    // the loops may already be gone; nothing left to wind down then
    let _ = terminator.terminate(Interrupted::OsSignal);
}

pub fn create_termination() -> (Terminator, broadcast::Receiver<Interrupted>) {
    let (reason_tx, reason_rx) = broadcast::channel(2);
    let terminator = Terminator { reason_tx };

    #[cfg(unix)]
    tokio::spawn(relay_os_signals(terminator.clone()));

    (terminator, reason_rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_terminate_reaches_every_subscriber() {
        let (mut terminator, mut first_rx) = create_termination();
        let mut second_rx = first_rx.resubscribe();

        terminator.terminate(Interrupted::UserRequest).unwrap();

        assert_eq!(first_rx.recv().await.unwrap(), Interrupted::UserRequest);
        assert_eq!(second_rx.recv().await.unwrap(), Interrupted::UserRequest);
    }
}
