use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::sleep,
};
use tracing::{info, warn};

use crate::{
    dao::stat_store::StatStore,
    dto::ws::LeaderboardOutboundMessage,
    error::ServiceError,
    services::ranking_service,
    state::{SharedState, broadcast::BroadcastSession},
};

/// Internal error type for one tick of the update loop.
#[derive(Debug, Error)]
enum TickError {
    /// Disconnect was requested; the tick must not send anything further.
    #[error("viewer cancelled")]
    Cancelled,
    /// Writer channel closed, the connection is gone.
    #[error("connection closed")]
    ConnectionClosed,
    /// Error from persistence or ranking computation.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
}

/// What one successful tick observed, deciding the next sleep cadence.
#[derive(Debug)]
enum TickOutcome {
    /// No active challenge; re-check at the slower cadence.
    Idle,
    /// Tracking an active challenge; poll at the fast cadence.
    Tracking,
}

/// Handle the full lifecycle for an individual leaderboard viewer connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps pushes flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let mut update_task = tokio::spawn(run_update_loop(
        state.clone(),
        outbound_tx.clone(),
        cancel_rx,
    ));

    info!("leaderboard viewer connected");

    loop {
        tokio::select! {
            // The update loop only finishes on its own after a failure close.
            _ = &mut update_task => break,
            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = outbound_tx.send(Message::Pong(payload));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!("leaderboard viewer closed");
                        let _ = outbound_tx.send(Message::Close(frame));
                        break;
                    }
                    // Viewers are read-only; any other frame is ignored.
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(error = %err, "websocket error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    // Request cancellation and wait for the loop to acknowledge it so no send
    // can happen after this point.
    let _ = cancel_tx.send(true);
    if !update_task.is_finished() {
        let _ = (&mut update_task).await;
    }

    info!("leaderboard viewer disconnected");
    finalize(writer_task, outbound_tx).await;
}

/// Periodic loop pushing change-detected snapshots to one viewer.
async fn run_update_loop(
    state: SharedState,
    outbound: mpsc::UnboundedSender<Message>,
    mut cancel: watch::Receiver<bool>,
) {
    let mut session = BroadcastSession::new();
    let active_tick = state.config().active_tick();
    let idle_tick = state.config().idle_tick();

    loop {
        let delay = match tick(&state, &outbound, &mut session, &cancel).await {
            Ok(TickOutcome::Idle) => idle_tick,
            Ok(TickOutcome::Tracking) => active_tick,
            Err(TickError::Cancelled) | Err(TickError::ConnectionClosed) => return,
            Err(TickError::Service(err)) => {
                warn!(error = %err, "broadcast tick failed; closing viewer connection");
                // Fail closed: one best-effort notice, then drop the connection
                // instead of retrying against a failing store.
                if !*cancel.borrow() {
                    let _ = send_json(&outbound, &LeaderboardOutboundMessage::error(
                        "leaderboard updates interrupted",
                    ));
                    let _ = outbound.send(Message::Close(None));
                }
                return;
            }
        };

        tokio::select! {
            _ = cancel.changed() => return,
            _ = sleep(delay) => {}
        }
    }
}

/// One poll cycle: resolve the active challenge, diff, and push when needed.
async fn tick(
    state: &SharedState,
    outbound: &mpsc::UnboundedSender<Message>,
    session: &mut BroadcastSession,
    cancel: &watch::Receiver<bool>,
) -> Result<TickOutcome, TickError> {
    let store = state.require_stat_store().await?;
    let challenge = store
        .active_challenge()
        .await
        .map_err(ServiceError::from)?;

    let Some(challenge) = challenge else {
        send_if_live(outbound, cancel, &LeaderboardOutboundMessage::no_active_challenge())?;
        return Ok(TickOutcome::Idle);
    };

    let entries = ranking_service::challenge_entries(store.as_ref(), challenge.id).await?;
    if let Some(snapshot) = session.observe(challenge.id, entries) {
        let message = LeaderboardOutboundMessage::update(
            challenge.id,
            snapshot.iter().cloned().map(Into::into).collect(),
        );
        send_if_live(outbound, cancel, &message)?;
    }

    Ok(TickOutcome::Tracking)
}

/// Push a payload unless cancellation has been requested.
///
/// The cancellation flag is checked immediately before the send so the race
/// between "tick fires" and "disconnect requested" always favors the
/// disconnect.
fn send_if_live(
    outbound: &mpsc::UnboundedSender<Message>,
    cancel: &watch::Receiver<bool>,
    payload: &LeaderboardOutboundMessage,
) -> Result<(), TickError> {
    if *cancel.borrow() {
        return Err(TickError::Cancelled);
    }
    send_json(outbound, payload)
}

/// Serialize a payload and queue it on the writer channel.
///
/// Serialization failure is a permanent error (bug in the payload type), so
/// it is logged and swallowed; a closed writer channel is reported so the
/// loop can wind down.
fn send_json(
    outbound: &mpsc::UnboundedSender<Message>,
    payload: &LeaderboardOutboundMessage,
) -> Result<(), TickError> {
    let text = match serde_json::to_string(payload) {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "failed to serialize outbound message");
            return Ok(());
        }
    };

    outbound
        .send(Message::Text(text.into()))
        .map_err(|_| TickError::ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::SystemTime};

    use serde_json::Value;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{AnswerStatEntity, ChallengeEntity},
            stat_store::memory::MemoryStatStore,
        },
        state::AppState,
    };

    async fn test_state() -> (SharedState, MemoryStatStore) {
        let state = AppState::new(AppConfig::default());
        let store = MemoryStatStore::new();
        state.set_stat_store(Arc::new(store.clone())).await;
        (state, store)
    }

    fn drain_one(rx: &mut mpsc::UnboundedReceiver<Message>) -> Value {
        match rx.try_recv().expect("expected an outbound message") {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    async fn record(store: &MemoryStatStore, participant_id: Uuid, challenge_id: Uuid, time: f64) {
        store
            .insert_answer_stat(AnswerStatEntity {
                id: Uuid::new_v4(),
                participant_id,
                challenge_id: Some(challenge_id),
                question_id: 1,
                correct: true,
                time_taken_seconds: time,
                recorded_at: SystemTime::now(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn notice_then_full_snapshot_when_a_challenge_starts() {
        let (state, store) = test_state().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let mut session = BroadcastSession::new();

        // No challenge yet: the viewer gets the explicit notice at idle cadence.
        let outcome = tick(&state, &tx, &mut session, &cancel_rx).await.unwrap();
        assert!(matches!(outcome, TickOutcome::Idle));
        let notice = drain_one(&mut rx);
        assert_eq!(notice["type"], "leaderboard_update");
        assert_eq!(notice["challenge_id"], Value::Null);
        assert_eq!(notice["message"], "No active challenge");
        assert!(notice["leaderboard"].as_array().unwrap().is_empty());

        // A challenge with one answered participant appears.
        let challenge = ChallengeEntity::new("live".to_string());
        store.start_challenge(challenge.clone()).await.unwrap();
        let participant = store.seed_participant_with_code("AAAA1111", "Alice", true);
        record(&store, participant.id, challenge.id, 2.0).await;

        let outcome = tick(&state, &tx, &mut session, &cancel_rx).await.unwrap();
        assert!(matches!(outcome, TickOutcome::Tracking));
        let update = drain_one(&mut rx);
        assert_eq!(update["type"], "leaderboard_update");
        assert_eq!(
            update["challenge_id"],
            Value::String(challenge.id.to_string())
        );
        assert!(update["timestamp"].is_i64());
        let board = update["leaderboard"].as_array().unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0]["rank"], 1);
        assert_eq!(board[0]["code"], "AAAA1111");
    }

    #[tokio::test]
    async fn stable_ranks_stay_quiet() {
        let (state, store) = test_state().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let mut session = BroadcastSession::new();

        let challenge = ChallengeEntity::new("live".to_string());
        store.start_challenge(challenge.clone()).await.unwrap();
        let participant = store.seed_participant_with_code("AAAA1111", "Alice", true);
        record(&store, participant.id, challenge.id, 2.0).await;

        tick(&state, &tx, &mut session, &cancel_rx).await.unwrap();
        drain_one(&mut rx);

        // More answers, same single-entry ranking: nothing is pushed.
        record(&store, participant.id, challenge.id, 4.0).await;
        tick(&state, &tx, &mut session, &cancel_rx).await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancellation_wins_the_race_against_a_pending_send() {
        let (state, store) = test_state().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let mut session = BroadcastSession::new();

        let challenge = ChallengeEntity::new("live".to_string());
        store.start_challenge(challenge.clone()).await.unwrap();
        let participant = store.seed_participant_with_code("AAAA1111", "Alice", true);
        record(&store, participant.id, challenge.id, 2.0).await;

        // The snapshot is ready to go, but the viewer has already disconnected.
        cancel_tx.send(true).unwrap();
        let err = tick(&state, &tx, &mut session, &cancel_rx)
            .await
            .unwrap_err();
        assert!(matches!(err, TickError::Cancelled));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn degraded_store_fails_the_tick() {
        let state = AppState::new(AppConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let mut session = BroadcastSession::new();

        let err = tick(&state, &tx, &mut session, &cancel_rx)
            .await
            .unwrap_err();
        assert!(matches!(err, TickError::Service(ServiceError::Degraded)));
    }
}
