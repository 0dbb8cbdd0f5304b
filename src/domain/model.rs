use crate::utils::error::{Result, StudyError};
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const MAX_PARTICIPANTS: usize = 50;
pub const SESSIONS_PER_PARTICIPANT: u8 = 3;
pub const REPETITIONS_PER_MODEL: u8 = 5;
pub const POSITIONS_PER_MODEL: usize = 4;

/// 2 modalities × 2 model types × 5 repetitions × 4 positions
pub const MEASUREMENTS_PER_SESSION: usize =
    Modality::ALL.len() * ModelType::ALL.len() * REPETITIONS_PER_MODEL as usize * POSITIONS_PER_MODEL;
pub const MEASUREMENTS_PER_PARTICIPANT: usize =
    MEASUREMENTS_PER_SESSION * SESSIONS_PER_PARTICIPANT as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    Ultrasound,
    Palpation,
}

impl Modality {
    pub const ALL: [Modality; 2] = [Modality::Ultrasound, Modality::Palpation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Ultrasound => "Ultrasound",
            Modality::Palpation => "Palpation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    Ball,
    Balloon,
}

impl ModelType {
    pub const ALL: [ModelType; 2] = [ModelType::Ball, ModelType::Balloon];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Ball => "Ball",
            ModelType::Balloon => "Balloon",
        }
    }
}

/// A measurable location on one of the physical models.
pub trait ModelPosition: Copy {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallSphere {
    S1,
    S2,
    S3,
    S4,
}

impl BallSphere {
    pub const ALL: [BallSphere; POSITIONS_PER_MODEL] =
        [BallSphere::S1, BallSphere::S2, BallSphere::S3, BallSphere::S4];
}

impl ModelPosition for BallSphere {
    fn id(&self) -> &'static str {
        match self {
            BallSphere::S1 => "S1",
            BallSphere::S2 => "S2",
            BallSphere::S3 => "S3",
            BallSphere::S4 => "S4",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            BallSphere::S1 => "Sphere 1",
            BallSphere::S2 => "Sphere 2",
            BallSphere::S3 => "Sphere 3",
            BallSphere::S4 => "Sphere 4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalloonPoint {
    P1,
    P2,
    P3,
    P4,
}

impl BalloonPoint {
    pub const ALL: [BalloonPoint; POSITIONS_PER_MODEL] = [
        BalloonPoint::P1,
        BalloonPoint::P2,
        BalloonPoint::P3,
        BalloonPoint::P4,
    ];
}

impl ModelPosition for BalloonPoint {
    fn id(&self) -> &'static str {
        match self {
            BalloonPoint::P1 => "P1",
            BalloonPoint::P2 => "P2",
            BalloonPoint::P3 => "P3",
            BalloonPoint::P4 => "P4",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            BalloonPoint::P1 => "Pressure Point 1",
            BalloonPoint::P2 => "Pressure Point 2",
            BalloonPoint::P3 => "Pressure Point 3",
            BalloonPoint::P4 => "Pressure Point 4",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BallSphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl fmt::Display for BalloonPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The four orderings that govern one participant's presentation sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDesign {
    pub modality_order: [Modality; 2],
    pub model_type_order: [ModelType; 2],
    pub ball_sphere_order: [BallSphere; POSITIONS_PER_MODEL],
    pub balloon_point_order: [BalloonPoint; POSITIONS_PER_MODEL],
}

impl SessionDesign {
    /// 回傳指定模型類型的位置順序（id, 顯示名稱）
    pub fn position_order(&self, model_type: ModelType) -> Vec<(&'static str, &'static str)> {
        match model_type {
            ModelType::Ball => self.ball_sphere_order.iter().map(|p| (p.id(), p.name())).collect(),
            ModelType::Balloon => self
                .balloon_point_order
                .iter()
                .map(|p| (p.id(), p.name()))
                .collect(),
        }
    }

    fn check_permutations(&self) -> Result<()> {
        fn distinct<T: Eq + std::hash::Hash>(field: &str, items: &[T]) -> Result<()> {
            let unique: HashSet<&T> = items.iter().collect();
            if unique.len() != items.len() {
                return Err(StudyError::ValidationError {
                    message: format!("{} contains duplicate entries", field),
                });
            }
            Ok(())
        }

        distinct("modalityOrder", &self.modality_order)?;
        distinct("modelTypeOrder", &self.model_type_order)?;
        distinct("ballSphereOrder", &self.ball_sphere_order)?;
        distinct("balloonPointOrder", &self.balloon_point_order)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_number: u8,
    #[serde(flatten)]
    pub design: SessionDesign,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub record_id: u32,
    pub random_seed: i64,
    pub sessions: Vec<Session>,
}

impl Participant {
    /// 所有場次共用同一份設計，取第一場即可
    pub fn design(&self) -> Option<&SessionDesign> {
        self.sessions.first().map(|session| &session.design)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_participants: usize,
    pub measurements_per_session: usize,
    pub measurements_per_participant: usize,
    pub total_measurements: usize,
}

impl Summary {
    pub fn for_participants(participants: &[Participant]) -> Self {
        let total_participants = participants.len();
        Self {
            total_participants,
            measurements_per_session: MEASUREMENTS_PER_SESSION,
            measurements_per_participant: MEASUREMENTS_PER_PARTICIPANT,
            total_measurements: total_participants * MEASUREMENTS_PER_PARTICIPANT,
        }
    }
}

/// The roster: every participant plus the counts derived from them.
///
/// Fields are private so that `summary` can only ever be the one computed from
/// `participants`. Deserialization goes through [`StoredExperimentData`] and
/// recomputes it, so a stale summary on disk is never trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredExperimentData")]
pub struct ExperimentData {
    generated_at: DateTime<Utc>,
    participants: Vec<Participant>,
    summary: Summary,
    last_record_id: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredExperimentData {
    generated_at: DateTime<Utc>,
    participants: Vec<Participant>,
    #[serde(default)]
    last_record_id: u32,
}

impl From<StoredExperimentData> for ExperimentData {
    fn from(stored: StoredExperimentData) -> Self {
        Self::from_parts(stored.generated_at, stored.participants, stored.last_record_id)
    }
}

impl ExperimentData {
    pub fn new(generated_at: DateTime<Utc>, participants: Vec<Participant>) -> Self {
        Self::from_parts(generated_at, participants, 0)
    }

    /// Builds a roster that has already issued ids up to `last_record_id`.
    pub(crate) fn from_parts(
        generated_at: DateTime<Utc>,
        participants: Vec<Participant>,
        last_record_id: u32,
    ) -> Self {
        let highest_present = participants.iter().map(|p| p.record_id).max().unwrap_or(0);
        let summary = Summary::for_participants(&participants);
        Self {
            generated_at,
            participants,
            summary,
            last_record_id: last_record_id.max(highest_present),
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn last_record_id(&self) -> u32 {
        self.last_record_id
    }

    pub fn participant(&self, record_id: u32) -> Option<&Participant> {
        self.participants.iter().find(|p| p.record_id == record_id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= MAX_PARTICIPANTS
    }
}

impl Validate for ExperimentData {
    fn validate(&self) -> Result<()> {
        if self.participants.len() > MAX_PARTICIPANTS {
            return Err(StudyError::ValidationError {
                message: format!(
                    "roster holds {} participants, the maximum is {}",
                    self.participants.len(),
                    MAX_PARTICIPANTS
                ),
            });
        }

        let mut seen = HashSet::new();
        for participant in &self.participants {
            if !seen.insert(participant.record_id) {
                return Err(StudyError::ValidationError {
                    message: format!("duplicate record id {}", participant.record_id),
                });
            }

            if participant.sessions.len() != SESSIONS_PER_PARTICIPANT as usize {
                return Err(StudyError::ValidationError {
                    message: format!(
                        "participant #{} has {} sessions, expected {}",
                        participant.record_id,
                        participant.sessions.len(),
                        SESSIONS_PER_PARTICIPANT
                    ),
                });
            }

            let design = &participant.sessions[0].design;
            design.check_permutations().map_err(|e| StudyError::ValidationError {
                message: format!("participant #{}: {}", participant.record_id, e),
            })?;

            for (index, session) in participant.sessions.iter().enumerate() {
                if session.session_number as usize != index + 1 {
                    return Err(StudyError::ValidationError {
                        message: format!(
                            "participant #{} session {} is numbered {}",
                            participant.record_id,
                            index + 1,
                            session.session_number
                        ),
                    });
                }
                if &session.design != design {
                    return Err(StudyError::ValidationError {
                        message: format!(
                            "participant #{} session {} deviates from the shared design",
                            participant.record_id, session.session_number
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}

/// One atomic scheduled observation, numbered within its participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRow {
    pub participant_id: u32,
    pub random_seed: i64,
    pub session: u8,
    pub modality: Modality,
    pub modality_order: u8,
    pub model_type: ModelType,
    pub model_type_order: u8,
    pub repetition: u8,
    pub model_position: u8,
    pub model_id: String,
    pub model_name: String,
    pub measurement_number: u32,
}
