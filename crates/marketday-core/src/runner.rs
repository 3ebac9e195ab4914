//! Spawning a session: its dispatcher task and its clock task.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::dispatch::{Dispatcher, SessionHandle};
use crate::session::Session;

/// Feed clock ticks into a session every `interval` until its queue
/// closes.
///
/// Each tick carries the total nominal time elapsed, so the first tick
/// reports `interval`, the second `2 * interval`, and so on. Ticks are sent
/// without waiting for the dispatcher to catch up.
pub async fn run_clock(handle: SessionHandle, interval: Duration) {
    let mut elapsed = Duration::ZERO;
    loop {
        tokio::time::sleep(interval).await;
        elapsed = elapsed.saturating_add(interval);
        if handle.tick(elapsed).is_err() {
            debug!(elapsed_ms = elapsed.as_millis(), "Clock stopped: session closed");
            return;
        }
    }
}

/// A session running on the tokio runtime.
#[derive(Debug)]
pub struct RunningSession {
    handle: SessionHandle,
    dispatcher: JoinHandle<Session>,
    clock: JoinHandle<()>,
}

impl RunningSession {
    /// A handle for enqueueing events into the session.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Stop the clock, release this handle, and wait for the dispatcher to
    /// drain. Completes only once every other handle is dropped as well.
    ///
    /// # Errors
    ///
    /// Returns the [`tokio::task::JoinError`] if the dispatcher task
    /// panicked or was cancelled.
    pub async fn shutdown(self) -> Result<Session, tokio::task::JoinError> {
        self.clock.abort();
        drop(self.handle);
        let session = self.dispatcher.await?;
        info!(session = %session.name(), "Session shut down");
        Ok(session)
    }
}

/// Start `session`'s dispatcher and a clock ticking every `tick_interval`.
pub fn spawn_session(session: Session, tick_interval: Duration) -> RunningSession {
    info!(
        session = %session.name(),
        tick_ms = tick_interval.as_millis(),
        "Spawning session"
    );
    let (dispatcher, handle) = Dispatcher::new(session);
    let dispatcher = tokio::spawn(dispatcher.run());
    let clock = tokio::spawn(run_clock(handle.clone(), tick_interval));
    RunningSession {
        handle,
        dispatcher,
        clock,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use marketday_types::{ClientMessage, Phase, ServerMessage};

    use super::*;
    use crate::config::SessionRules;
    use crate::testing::{test_rng, RecordingBroadcaster, TestPlayer};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn session(broadcaster: &RecordingBroadcaster) -> Session {
        Session::new(
            "test",
            SessionRules::default(),
            Arc::new(broadcaster.clone()),
            test_rng(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn clock_reports_accumulated_intervals() {
        let broadcaster = RecordingBroadcaster::new();
        let running = spawn_session(session(&broadcaster), ms(300));

        tokio::time::sleep(ms(950)).await;
        let session = running.shutdown().await.unwrap();

        assert_eq!(session.clock().now(), ms(900));
    }

    #[tokio::test(start_paused = true)]
    async fn production_times_out_on_the_clock() {
        let broadcaster = RecordingBroadcaster::new();
        let running = spawn_session(session(&broadcaster), ms(300));
        let handle = running.handle();
        let alice = TestPlayer::new("alice");
        let bob = TestPlayer::new("bob");

        for player in [&alice, &bob] {
            handle.send(player.handle(), ClientMessage::Join).unwrap();
            handle.send(player.handle(), ClientMessage::Ready).unwrap();
        }
        drop(handle);

        tokio::time::sleep(ms(10_500)).await;
        let session = running.shutdown().await.unwrap();

        assert_eq!(session.phase(), Phase::Auction);
        assert!(broadcaster.messages().contains(&ServerMessage::StateChanged {
            new_state: Phase::Auction
        }));
    }

    #[tokio::test]
    async fn clock_exits_when_session_closes() {
        let broadcaster = RecordingBroadcaster::new();
        let (dispatcher, handle) = Dispatcher::new(session(&broadcaster));
        drop(dispatcher);

        // Returns on the first failed tick instead of looping forever.
        run_clock(handle, ms(1)).await;
    }
}
