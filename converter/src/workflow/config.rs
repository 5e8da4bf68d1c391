use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use trackcore::prelude::{
    AltitudeDirection, AxisConvention, CosineLatitude, ProjectionConfig, ReferenceMode,
};
use trackcore::processing::scaling::DEFAULT_TARGET_SIZE;
use trackcore::processing::SceneOptions;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub scene: Option<PathBuf>,
    pub pretty: bool,
    pub projection: ProjectionConfig,
    pub altitude_direction: AltitudeDirection,
    pub scene_title: Option<String>,
    pub fit_target_size: f64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            scene: None,
            pretty: false,
            projection: ProjectionConfig::default(),
            altitude_direction: AltitudeDirection::default(),
            scene_title: None,
            fit_target_size: DEFAULT_TARGET_SIZE,
        }
    }
}

/// Command-line values that take precedence over a loaded workflow file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub scene: Option<PathBuf>,
    pub pretty: bool,
    pub reference_mode: Option<ReferenceMode>,
    pub cosine_latitude: Option<CosineLatitude>,
    pub axis_convention: Option<AxisConvention>,
    pub altitude_direction: Option<AltitudeDirection>,
    pub no_anchor: bool,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if overrides.input.is_some() {
            self.input = overrides.input;
        }
        if overrides.output.is_some() {
            self.output = overrides.output;
        }
        if overrides.scene.is_some() {
            self.scene = overrides.scene;
        }
        self.pretty |= overrides.pretty;
        if let Some(mode) = overrides.reference_mode {
            self.projection.reference_mode = mode;
        }
        if let Some(cosine) = overrides.cosine_latitude {
            self.projection.cosine_latitude = cosine;
        }
        if let Some(axes) = overrides.axis_convention {
            self.projection.axis_convention = axes;
        }
        if let Some(direction) = overrides.altitude_direction {
            self.altitude_direction = direction;
        }
        if overrides.no_anchor {
            self.projection.anchor_to_origin = false;
        }
    }

    pub fn to_scene_options(&self) -> SceneOptions {
        let defaults = SceneOptions::default();
        SceneOptions {
            title: self.scene_title.clone().unwrap_or(defaults.title),
            axis_convention: self.projection.axis_convention,
            altitude_direction: self.altitude_direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn overrides_replace_loaded_values() {
        let mut cfg = WorkflowConfig::default();
        cfg.apply(Overrides {
            reference_mode: Some(ReferenceMode::MeanPosition),
            axis_convention: Some(AxisConvention::NorthEastDown),
            no_anchor: true,
            ..Default::default()
        });
        assert_eq!(cfg.projection.reference_mode, ReferenceMode::MeanPosition);
        assert!(!cfg.projection.anchor_to_origin);
        assert_eq!(
            cfg.to_scene_options().axis_convention,
            AxisConvention::NorthEastDown
        );
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"input: dive.csv\nprojection:\n  reference_mode: mean-position\n  cosine_latitude: per-record\naltitude_direction: above\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.input, Some(PathBuf::from("dive.csv")));
        assert_eq!(cfg.projection.reference_mode, ReferenceMode::MeanPosition);
        assert_eq!(cfg.projection.cosine_latitude, CosineLatitude::PerRecord);
        assert!(cfg.projection.anchor_to_origin);
        assert_eq!(cfg.altitude_direction, AltitudeDirection::Above);
        assert_eq!(cfg.fit_target_size, DEFAULT_TARGET_SIZE);
    }
}
