//! Roster lifecycle: generate, add, remove, regenerate.
//!
//! Every operation takes the current roster by reference and returns a new
//! one; the input is never modified. Summary counts are recomputed by the
//! [`ExperimentData`] constructor on every call.

use crate::core::design::build_design;
use crate::domain::model::{
    ExperimentData, Participant, Session, MAX_PARTICIPANTS, SESSIONS_PER_PARTICIPANT,
};
use crate::utils::error::{Result, StudyError};
use crate::utils::validation::validate_participant_count;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Fresh seeds are drawn uniformly from `0..SEED_UPPER_BOUND`.
pub const SEED_UPPER_BOUND: i64 = 1_000_000_000;

/// Builds a participant whose three sessions all replay the design for `seed`.
pub fn build_participant(record_id: u32, seed: i64) -> Participant {
    let design = build_design(seed);
    let sessions = (1..=SESSIONS_PER_PARTICIPANT)
        .map(|session_number| Session {
            session_number,
            design: design.clone(),
        })
        .collect();

    Participant {
        record_id,
        random_seed: seed,
        sessions,
    }
}

fn draw_seed<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    rng.gen_range(0..SEED_UPPER_BOUND)
}

/// 以熵來源產生新的名單
pub fn generate(participant_count: usize, generated_at: DateTime<Utc>) -> Result<ExperimentData> {
    generate_with(participant_count, generated_at, &mut rand::thread_rng())
}

pub fn generate_with<R: Rng + ?Sized>(
    participant_count: usize,
    generated_at: DateTime<Utc>,
    rng: &mut R,
) -> Result<ExperimentData> {
    validate_participant_count(participant_count)?;

    let participants = (1..=participant_count as u32)
        .map(|record_id| build_participant(record_id, draw_seed(rng)))
        .collect();

    tracing::debug!("Generated roster with {} participants", participant_count);
    Ok(ExperimentData::new(generated_at, participants))
}

pub fn add_participant(data: &ExperimentData) -> Result<ExperimentData> {
    add_participant_with(data, &mut rand::thread_rng())
}

pub fn add_participant_with<R: Rng + ?Sized>(
    data: &ExperimentData,
    rng: &mut R,
) -> Result<ExperimentData> {
    if data.is_full() {
        return Err(StudyError::RosterFull {
            capacity: MAX_PARTICIPANTS,
        });
    }

    // 編號只增不減，已刪除的編號不會重新使用
    let record_id = data
        .last_record_id()
        .checked_add(1)
        .ok_or_else(|| StudyError::ValidationError {
            message: format!("record ids are exhausted at {}", data.last_record_id()),
        })?;
    let mut participants = data.participants().to_vec();
    participants.push(build_participant(record_id, draw_seed(rng)));

    tracing::debug!("Added participant #{}", record_id);
    Ok(ExperimentData::from_parts(
        data.generated_at(),
        participants,
        record_id,
    ))
}

/// Removing an id that is not present returns an equal roster.
pub fn remove_participant(data: &ExperimentData, record_id: u32) -> ExperimentData {
    let participants: Vec<Participant> = data
        .participants()
        .iter()
        .filter(|p| p.record_id != record_id)
        .cloned()
        .collect();

    if participants.len() == data.len() {
        tracing::debug!("Participant #{} not in roster, nothing to remove", record_id);
    }

    ExperimentData::from_parts(data.generated_at(), participants, data.last_record_id())
}

pub fn regenerate_participant(data: &ExperimentData, record_id: u32) -> ExperimentData {
    regenerate_participant_with(data, record_id, &mut rand::thread_rng())
}

/// Draws a new seed (never equal to the old one) and rebuilds all sessions.
/// Unknown ids leave the roster unchanged.
pub fn regenerate_participant_with<R: Rng + ?Sized>(
    data: &ExperimentData,
    record_id: u32,
    rng: &mut R,
) -> ExperimentData {
    let participants = data
        .participants()
        .iter()
        .map(|p| {
            if p.record_id != record_id {
                return p.clone();
            }
            let mut seed = draw_seed(rng);
            while seed == p.random_seed {
                seed = draw_seed(rng);
            }
            tracing::debug!(
                "Regenerated participant #{}: seed {} -> {}",
                record_id,
                p.random_seed,
                seed
            );
            build_participant(record_id, seed)
        })
        .collect();

    ExperimentData::from_parts(data.generated_at(), participants, data.last_record_id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    fn roster(count: usize) -> ExperimentData {
        generate_with(count, timestamp(), &mut StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn test_generate_assigns_sequential_ids() {
        let data = roster(5);
        let ids: Vec<u32> = data.participants().iter().map(|p| p.record_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(data.generated_at(), timestamp());
        assert_eq!(data.last_record_id(), 5);
    }

    #[test]
    fn test_generate_summary_counts() {
        let summary = *roster(3).summary();
        assert_eq!(summary.total_participants, 3);
        assert_eq!(summary.measurements_per_session, 80);
        assert_eq!(summary.measurements_per_participant, 240);
        assert_eq!(summary.total_measurements, 720);
    }

    #[test]
    fn test_generate_rejects_out_of_range_counts() {
        for count in [0, 51, 1000] {
            match generate(count, timestamp()) {
                Err(StudyError::InvalidCount { .. }) => {}
                other => panic!("expected InvalidCount for {}, got {:?}", count, other),
            }
        }
        assert!(generate(1, timestamp()).is_ok());
        assert!(generate(50, timestamp()).is_ok());
    }

    #[test]
    fn test_generate_sessions_share_one_design() {
        for participant in roster(4).participants() {
            assert_eq!(participant.sessions.len(), 3);
            let numbers: Vec<u8> = participant.sessions.iter().map(|s| s.session_number).collect();
            assert_eq!(numbers, vec![1, 2, 3]);
            assert!(participant.sessions.iter().all(|s| s.design == participant.sessions[0].design));
            assert_eq!(participant.sessions[0].design, build_design(participant.random_seed));
        }
    }

    #[test]
    fn test_generated_rosters_do_not_coincide() {
        let a = generate(10, timestamp()).unwrap();
        let b = generate(10, timestamp()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_add_participant_appends_next_id() {
        let data = roster(2);
        let updated = add_participant(&data).unwrap();

        assert_eq!(updated.len(), 3);
        assert_eq!(updated.participants()[..2], data.participants()[..]);
        assert_eq!(updated.participants()[2].record_id, 3);
        assert_eq!(updated.summary().total_participants, 3);
        assert_eq!(updated.generated_at(), data.generated_at());
        // input untouched
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_add_participant_to_empty_roster_starts_at_one() {
        let empty = ExperimentData::new(timestamp(), Vec::new());
        let updated = add_participant(&empty).unwrap();
        assert_eq!(updated.participants()[0].record_id, 1);
    }

    #[test]
    fn test_add_participant_never_reuses_removed_id() {
        let data = remove_participant(&roster(3), 3);
        let updated = add_participant(&data).unwrap();
        assert_eq!(updated.participants().last().unwrap().record_id, 4);
    }

    #[test]
    fn test_add_participant_rejects_full_roster() {
        let full = roster(MAX_PARTICIPANTS);
        let before = full.clone();
        match add_participant(&full) {
            Err(StudyError::RosterFull { capacity }) => assert_eq!(capacity, 50),
            other => panic!("expected RosterFull, got {:?}", other),
        }
        assert_eq!(full, before);
    }

    #[test]
    fn test_add_participant_with_exhausted_ids_fails() {
        let data = ExperimentData::from_parts(timestamp(), vec![build_participant(1, 5)], u32::MAX);
        let before = data.clone();
        assert!(matches!(
            add_participant(&data),
            Err(StudyError::ValidationError { .. })
        ));
        assert_eq!(data, before);
    }

    #[test]
    fn test_remove_participant() {
        let data = roster(3);
        let updated = remove_participant(&data, 2);

        let ids: Vec<u32> = updated.participants().iter().map(|p| p.record_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(updated.summary().total_participants, 2);
        assert_eq!(updated.summary().total_measurements, 480);
    }

    #[test]
    fn test_remove_unknown_participant_is_noop() {
        let data = roster(3);
        assert_eq!(remove_participant(&data, 42), data);
    }

    #[test]
    fn test_regenerate_participant_keeps_identity_and_position() {
        let data = roster(3);
        let mut rng = StdRng::seed_from_u64(99);
        let updated = regenerate_participant_with(&data, 2, &mut rng);

        let before = &data.participants()[1];
        let after = &updated.participants()[1];
        assert_eq!(after.record_id, 2);
        assert_ne!(after.random_seed, before.random_seed);
        assert_eq!(after.sessions[0].design, build_design(after.random_seed));
        assert!(after.sessions.iter().all(|s| s.design == after.sessions[0].design));

        assert_eq!(updated.participants()[0], data.participants()[0]);
        assert_eq!(updated.participants()[2], data.participants()[2]);
        assert_eq!(updated.summary(), data.summary());
    }

    #[test]
    fn test_regenerate_unknown_participant_is_noop() {
        let data = roster(2);
        assert_eq!(regenerate_participant(&data, 99), data);
    }
}
