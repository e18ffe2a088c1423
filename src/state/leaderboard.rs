//! Pure ranking computation and broadcast change detection.
//!
//! Everything in this module operates on plain data so the competitive rules
//! can be tested without a storage backend or a running server.

use std::collections::HashMap;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::dao::models::{AnswerStatEntity, ParticipantEntity};

/// Derived per-participant ranking row. Never persisted; recomputed from the
/// raw answer facts on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    /// Stable identifier of the participant.
    pub participant_id: Uuid,
    /// Participant's short unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Number of answer facts aggregated.
    pub total_answered: u32,
    /// Number of correct answers.
    pub total_correct: u32,
    /// Sum of per-answer elapsed times, rounded to two decimals.
    pub total_time: f64,
    /// 1-based position after sorting.
    pub rank: u32,
}

/// Aggregate raw answer facts into a fully ordered leaderboard.
///
/// Ordering rewards accuracy first and speed second: total correct
/// descending, then total time ascending. Participants are aggregated in
/// ascending id order and the sort is stable, so ties in both keys receive
/// deterministic sequential ranks for a fixed input set.
pub fn rank_entries(
    participants: Vec<ParticipantEntity>,
    stats: &[AnswerStatEntity],
) -> Vec<LeaderboardEntry> {
    let mut participants = participants;
    participants.sort_by(|a, b| a.id.cmp(&b.id));

    let mut aggregates: IndexMap<Uuid, LeaderboardEntry> = participants
        .into_iter()
        .map(|participant| {
            (
                participant.id,
                LeaderboardEntry {
                    participant_id: participant.id,
                    code: participant.code,
                    name: participant.name,
                    total_answered: 0,
                    total_correct: 0,
                    total_time: 0.0,
                    rank: 0,
                },
            )
        })
        .collect();

    for stat in stats {
        let Some(entry) = aggregates.get_mut(&stat.participant_id) else {
            continue;
        };
        entry.total_answered += 1;
        if stat.correct {
            entry.total_correct += 1;
        }
        entry.total_time += stat.time_taken_seconds;
    }

    let mut entries: Vec<LeaderboardEntry> = aggregates
        .into_values()
        .map(|mut entry| {
            entry.total_time = round_centis(entry.total_time);
            entry
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_correct
            .cmp(&a.total_correct)
            .then(a.total_time.total_cmp(&b.total_time))
    });

    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = (index + 1) as u32;
    }

    entries
}

/// Decide whether a freshly computed snapshot is worth broadcasting.
///
/// Returns `true` when the participant set size differs, or when any
/// participant's rank moved. Identical ranks with different raw counts are
/// treated as unchanged: rank stability, not score stability, is the
/// broadcast trigger, trading spectator-visible score movement for less
/// network traffic.
pub fn ranking_changed(previous: &[LeaderboardEntry], current: &[LeaderboardEntry]) -> bool {
    if previous.len() != current.len() {
        return true;
    }

    let old_ranks: HashMap<Uuid, u32> = previous
        .iter()
        .map(|entry| (entry.participant_id, entry.rank))
        .collect();

    current
        .iter()
        .any(|entry| old_ranks.get(&entry.participant_id) != Some(&entry.rank))
}

fn round_centis(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn participant(name: &str) -> ParticipantEntity {
        ParticipantEntity {
            id: Uuid::new_v4(),
            code: name.to_uppercase(),
            name: name.to_string(),
            active: true,
        }
    }

    fn stat(participant_id: Uuid, correct: bool, time_taken_seconds: f64) -> AnswerStatEntity {
        AnswerStatEntity {
            id: Uuid::new_v4(),
            participant_id,
            challenge_id: None,
            question_id: 1,
            correct,
            time_taken_seconds,
            recorded_at: SystemTime::now(),
        }
    }

    fn answered(participant_id: Uuid, results: &[(bool, f64)]) -> Vec<AnswerStatEntity> {
        results
            .iter()
            .map(|&(correct, time)| stat(participant_id, correct, time))
            .collect()
    }

    #[test]
    fn empty_input_yields_empty_leaderboard() {
        assert!(rank_entries(Vec::new(), &[]).is_empty());
    }

    #[test]
    fn aggregates_counts_and_time_per_participant() {
        let alice = participant("alice");
        let mut stats = answered(alice.id, &[(true, 2.0), (false, 3.5), (true, 1.25)]);
        // Rows from someone outside the requested set are ignored.
        stats.push(stat(Uuid::new_v4(), true, 1.0));

        let entries = rank_entries(vec![alice.clone()], &stats);
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.total_answered, 3);
        assert_eq!(entry.total_correct, 2);
        assert_eq!(entry.total_time, 6.75);
        assert_eq!(entry.rank, 1);
    }

    #[test]
    fn total_time_is_rounded_to_two_decimals() {
        let p = participant("rounding");
        let stats = answered(p.id, &[(true, 0.1), (true, 0.2), (true, 0.3)]);
        let entries = rank_entries(vec![p], &stats);
        assert_eq!(entries[0].total_time, 0.6);
    }

    #[test]
    fn output_is_sorted_by_correct_desc_then_time_asc() {
        let a = participant("a");
        let b = participant("b");
        let c = participant("c");
        let mut stats = answered(a.id, &[(true, 5.0), (false, 5.0)]);
        stats.extend(answered(b.id, &[(true, 1.0), (true, 9.0)]));
        stats.extend(answered(c.id, &[(true, 2.0), (true, 3.0)]));

        let entries = rank_entries(vec![a, b, c], &stats);
        for pair in entries.windows(2) {
            let better = &pair[0];
            let worse = &pair[1];
            assert!(
                better.total_correct > worse.total_correct
                    || (better.total_correct == worse.total_correct
                        && better.total_time <= worse.total_time)
            );
        }
        assert_eq!(
            entries.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn correctness_tie_is_broken_by_faster_total_time() {
        let a = participant("a");
        let b = participant("b");
        let mut stats = answered(a.id, &[(true, 4.0), (true, 3.0), (false, 3.0)]);
        stats.extend(answered(b.id, &[(true, 3.0), (true, 2.0), (false, 3.0)]));

        let entries = rank_entries(vec![a.clone(), b.clone()], &stats);
        assert_eq!(entries[0].participant_id, b.id);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].participant_id, a.id);
        assert_eq!(entries[1].rank, 2);
    }

    #[test]
    fn full_ties_get_distinct_sequential_ranks_deterministically() {
        let a = participant("a");
        let b = participant("b");
        let stats: Vec<_> = answered(a.id, &[(true, 2.0)])
            .into_iter()
            .chain(answered(b.id, &[(true, 2.0)]))
            .collect();

        let first = rank_entries(vec![a.clone(), b.clone()], &stats);
        let second = rank_entries(vec![b, a], &stats);

        assert_eq!(first.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2]);
        // Participant order in the input must not influence the result.
        assert_eq!(first, second);
    }

    #[test]
    fn unchanged_snapshot_is_not_reported() {
        let p = participant("p");
        let entries = rank_entries(vec![p], &[]);
        assert!(!ranking_changed(&entries, &entries));
    }

    #[test]
    fn participant_set_difference_is_reported() {
        let a = participant("a");
        let b = participant("b");
        let one = rank_entries(vec![a.clone()], &[]);
        let two = rank_entries(vec![a, b], &[]);
        assert!(ranking_changed(&one, &two));
        assert!(ranking_changed(&two, &one));
    }

    #[test]
    fn rank_swap_is_reported() {
        let a = participant("a");
        let b = participant("b");
        let before: Vec<_> = answered(a.id, &[(true, 1.0)])
            .into_iter()
            .chain(answered(b.id, &[(false, 1.0)]))
            .collect();
        let after: Vec<_> = answered(a.id, &[(false, 1.0)])
            .into_iter()
            .chain(answered(b.id, &[(true, 1.0)]))
            .collect();

        let previous = rank_entries(vec![a.clone(), b.clone()], &before);
        let current = rank_entries(vec![a, b], &after);
        assert!(ranking_changed(&previous, &current));
    }

    #[test]
    fn score_movement_without_rank_movement_is_not_reported() {
        let a = participant("a");
        let b = participant("b");
        let before: Vec<_> = answered(a.id, &[(true, 1.0), (true, 1.0)])
            .into_iter()
            .chain(answered(b.id, &[(true, 5.0)]))
            .collect();
        // Both participants progress, but the ordering stays put.
        let after: Vec<_> = answered(a.id, &[(true, 1.0), (true, 1.0), (true, 1.0)])
            .into_iter()
            .chain(answered(b.id, &[(true, 5.0), (false, 2.0)]))
            .collect();

        let previous = rank_entries(vec![a.clone(), b.clone()], &before);
        let current = rank_entries(vec![a, b], &after);
        assert_ne!(previous, current);
        assert!(!ranking_changed(&previous, &current));
    }
}
