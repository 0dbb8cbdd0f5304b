use crate::domain::model::{
    ExperimentData, MeasurementRow, Participant, REPETITIONS_PER_MODEL,
};

/// Expands every participant into its ordered list of measurements.
pub fn flatten(data: &ExperimentData) -> Vec<MeasurementRow> {
    data.participants()
        .iter()
        .flat_map(flatten_participant)
        .collect()
}

/// Nesting, outermost first: session, modality, model type, repetition,
/// position. `measurement_number` counts 1.. across the whole participant.
pub fn flatten_participant(participant: &Participant) -> Vec<MeasurementRow> {
    let mut rows = Vec::new();
    let mut measurement_number = 0u32;

    for session in &participant.sessions {
        let design = &session.design;

        for (modality_index, modality) in design.modality_order.iter().enumerate() {
            for (model_type_index, model_type) in design.model_type_order.iter().enumerate() {
                let positions = design.position_order(*model_type);

                for repetition in 1..=REPETITIONS_PER_MODEL {
                    for (position_index, (model_id, model_name)) in positions.iter().enumerate() {
                        measurement_number += 1;
                        rows.push(MeasurementRow {
                            participant_id: participant.record_id,
                            random_seed: participant.random_seed,
                            session: session.session_number,
                            modality: *modality,
                            modality_order: modality_index as u8 + 1,
                            model_type: *model_type,
                            model_type_order: model_type_index as u8 + 1,
                            repetition,
                            model_position: position_index as u8 + 1,
                            model_id: model_id.to_string(),
                            model_name: model_name.to_string(),
                            measurement_number,
                        });
                    }
                }
            }
        }
    }

    rows
}
