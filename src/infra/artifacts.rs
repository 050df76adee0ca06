// ============================================================
// Layer 6 — Run Artifacts
// ============================================================
// JSON files written next to the charts:
//
//   out_dir/
//     run_config.json   ← effective TrainConfig for this run
//     evaluation.json   ← test loss/accuracy + confusion matrix
//
// No model weights are stored.

use anyhow::{Context, Result};
use serde::Serialize;
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::evaluator::Evaluation;

pub const CONFIG_FILE:     &str = "run_config.json";
pub const EVALUATION_FILE: &str = "evaluation.json";

pub struct RunArtifacts {
    dir: PathBuf,
}

impl RunArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<PathBuf> {
        self.write_json(CONFIG_FILE, cfg)
    }

    pub fn save_evaluation(&self, evaluation: &Evaluation) -> Result<PathBuf> {
        self.write_json(EVALUATION_FILE, evaluation)
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<PathBuf> {
        let path = self.dir.join(file);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(path)
    }
}

// Read-back is only needed to check what a run wrote
#[cfg(test)]
impl RunArtifacts {
    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json(CONFIG_FILE)
    }

    pub fn load_evaluation(&self) -> Result<Evaluation> {
        self.read_json(EVALUATION_FILE)
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed JSON in '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::encoder::ScalingFit;
    use crate::ml::evaluator::ConfusionMatrix;

    #[test]
    fn test_config_is_restored() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = RunArtifacts::new(dir.path()).unwrap();

        let cfg = TrainConfig { epochs: 5, scaling: ScalingFit::FullDataset, ..TrainConfig::default() };
        artifacts.save_config(&cfg).unwrap();

        let loaded = artifacts.load_config().unwrap();
        assert_eq!(loaded.epochs, 5);
        assert_eq!(loaded.scaling, ScalingFit::FullDataset);
    }

    #[test]
    fn test_evaluation_json() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = RunArtifacts::new(dir.path()).unwrap();

        let evaluation = Evaluation {
            loss: 0.45,
            accuracy: 0.8,
            test_rows: 10,
            confusion: ConfusionMatrix { counts: vec![vec![6, 1], vec![1, 2]] },
            tick_labels: vec!["Retained".into(), "Churned".into()],
        };
        artifacts.save_evaluation(&evaluation).unwrap();

        let text = fs::read_to_string(dir.path().join(EVALUATION_FILE)).unwrap();
        assert!(text.contains("\"accuracy\": 0.8"));
        assert_eq!(artifacts.load_evaluation().unwrap().confusion.counts[0][0], 6);
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = RunArtifacts::new(dir.path()).unwrap();
        assert!(artifacts.load_config().is_err());
    }
}
