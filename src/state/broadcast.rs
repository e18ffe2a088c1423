//! Per-connection broadcast session state.

use uuid::Uuid;

use crate::state::leaderboard::{LeaderboardEntry, ranking_changed};

/// State held by one viewer connection: the challenge currently being tracked
/// and the last snapshot that was pushed to this viewer. Created on connect,
/// dropped on disconnect, never shared across connections.
#[derive(Debug, Default)]
pub struct BroadcastSession {
    tracked_challenge: Option<Uuid>,
    last_sent: Vec<LeaderboardEntry>,
}

impl BroadcastSession {
    /// Fresh session with no tracked challenge and an empty last-sent snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one freshly computed snapshot into the session.
    ///
    /// When the active challenge differs from the tracked one, the last-sent
    /// snapshot is reset so the next comparison runs against an empty
    /// baseline, forcing a full send even if the ranks happen to match the
    /// previous challenge's. Returns the snapshot to push when the rankings
    /// changed, `None` when the viewer is already up to date.
    pub fn observe(
        &mut self,
        challenge_id: Uuid,
        entries: Vec<LeaderboardEntry>,
    ) -> Option<&[LeaderboardEntry]> {
        if self.tracked_challenge != Some(challenge_id) {
            self.tracked_challenge = Some(challenge_id);
            self.last_sent.clear();
        }

        if ranking_changed(&self.last_sent, &entries) {
            self.last_sent = entries;
            Some(&self.last_sent)
        } else {
            None
        }
    }

    /// Identifier of the challenge this session currently follows.
    pub fn tracked_challenge(&self) -> Option<Uuid> {
        self.tracked_challenge
    }
}
