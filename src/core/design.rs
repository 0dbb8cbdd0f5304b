use crate::core::rng::SeededSequence;
use crate::domain::model::{BallSphere, BalloonPoint, Modality, ModelType, SessionDesign};

/// Derives a participant's session design from its seed.
///
/// The four orderings are drawn in a fixed sequence (modalities, model types,
/// ball spheres, balloon points) from one [`SeededSequence`], so a seed
/// always maps to the same design. Any `i64` is a valid seed.
pub fn build_design(seed: i64) -> SessionDesign {
    let mut sequence = SeededSequence::new(seed);

    let modality_order = sequence.permute(Modality::ALL);
    let model_type_order = sequence.permute(ModelType::ALL);
    let ball_sphere_order = sequence.permute(BallSphere::ALL);
    let balloon_point_order = sequence.permute(BalloonPoint::ALL);

    SessionDesign {
        modality_order,
        model_type_order,
        ball_sphere_order,
        balloon_point_order,
    }
}
