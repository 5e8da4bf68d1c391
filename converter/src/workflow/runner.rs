use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use trackcore::interface::CsvTelemetryReader;
use trackcore::math::stats::StatsHelper;
use trackcore::prelude::{LocalFrameRecord, TelemetryRecord, TelemetrySource, TrajectorySink};
use trackcore::processing::{Placement, TrajectoryProjector, TrajectoryScene};
use trackcore::telemetry::{MetricsRecorder, MetricsSnapshot};

pub struct WorkflowResult {
    pub records: Vec<LocalFrameRecord>,
    pub scene: TrajectoryScene,
    pub placement: Placement,
    pub notes: Vec<String>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    metrics: Arc<MetricsRecorder>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn read_table<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<Vec<TelemetryRecord>> {
        let path_ref = path.as_ref();
        let mut reader = CsvTelemetryReader::from_path(path_ref)
            .with_context(|| format!("opening telemetry table {}", path_ref.display()))?;
        self.read_from(&mut reader)
            .with_context(|| format!("reading telemetry table {}", path_ref.display()))
    }

    pub fn read_from<S: TelemetrySource>(
        &self,
        source: &mut S,
    ) -> anyhow::Result<Vec<TelemetryRecord>> {
        let records = source.read_records()?;
        self.metrics.record_read(records.len());
        Ok(records)
    }

    /// Projects one batch and derives the scene; the batch is all-or-nothing.
    pub fn execute(&self, records: &[TelemetryRecord]) -> anyhow::Result<WorkflowResult> {
        let projector = TrajectoryProjector::new(self.config.projection);
        let projected = match projector.project(records) {
            Ok(projected) => projected,
            Err(err) => {
                self.metrics.record_rejected(records.len());
                return Err(err).context("projecting telemetry batch");
            }
        };
        self.metrics.record_projected(projected.len());

        let scene = TrajectoryScene::build(&projected, &self.config.to_scene_options())
            .context("building trajectory scene")?;
        let placement = Placement::fitted(
            &projected,
            self.config.projection.axis_convention,
            self.config.fit_target_size,
        );

        let mut notes = vec![
            format!(
                "reference {} / cosine {} / axes {}",
                self.config.projection.reference_mode,
                self.config.projection.cosine_latitude,
                self.config.projection.axis_convention
            ),
            format!("duration {:.1} s", scene.duration_seconds),
            format!("fit scale {:.6}", placement.scale),
        ];
        if let Some((shallow, deep)) =
            StatsHelper::extent(projected.iter().map(|record| record.depth_meters))
        {
            notes.push(format!("depth {:.2} m .. {:.2} m", shallow, deep));
        }

        Ok(WorkflowResult {
            records: projected,
            scene,
            placement,
            notes,
        })
    }

    pub fn export<S: TrajectorySink>(
        &self,
        result: &WorkflowResult,
        sink: &mut S,
    ) -> anyhow::Result<()> {
        sink.write_records(&result.records)
            .context("writing projected trajectory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{generate_dive, DiveConfig};
    use trackcore::interface::{EngineDocument, JsonTrajectoryWriter};

    #[test]
    fn runner_executes_workflow() {
        let runner = Runner::new(WorkflowConfig::default());
        let records = generate_dive(&DiveConfig {
            samples: 40,
            ..Default::default()
        })
        .unwrap();
        let result = runner.execute(&records).unwrap();
        assert_eq!(result.records.len(), 40);
        assert_eq!(result.scene.len(), 40);
        assert_eq!(result.records[0].position(), [0.0, 0.0, 0.0]);
        assert!(result.placement.scale > 0.0);
        assert_eq!(runner.metrics().projected, 40);
    }

    #[test]
    fn empty_batch_is_not_projected() {
        let runner = Runner::new(WorkflowConfig::default());
        assert!(runner.execute(&[]).is_err());
        assert_eq!(runner.metrics().projected, 0);
    }

    #[test]
    fn export_writes_engine_document() {
        let runner = Runner::new(WorkflowConfig::default());
        let records = generate_dive(&DiveConfig {
            samples: 3,
            ..Default::default()
        })
        .unwrap();
        let result = runner.execute(&records).unwrap();
        let mut writer = JsonTrajectoryWriter::new(Vec::new(), false);
        runner.export(&result, &mut writer).unwrap();
        let document: EngineDocument = serde_json::from_slice(&writer.into_inner()).unwrap();
        assert_eq!(document.data.len(), 3);
        assert_eq!(document.data[0].x_meters, 0.0);
    }
}
