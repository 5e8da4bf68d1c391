use crate::workflow::runner::WorkflowResult;
use serde::{Deserialize, Serialize};
use trackcore::processing::{Placement, TrajectoryScene};

/// Snapshot served to the visualizer at `GET /payload`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub scene: Option<TrajectoryScene>,
    pub placement: Option<Placement>,
    pub record_count: usize,
    pub notes: Vec<String>,
}

impl VisualizationModel {
    pub fn from_result(result: &WorkflowResult) -> Self {
        Self {
            scene: Some(result.scene.clone()),
            placement: Some(result.placement),
            record_count: result.records.len(),
            notes: result.notes.clone(),
        }
    }
}
