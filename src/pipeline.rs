use std::path::{Path, PathBuf};

use log::info;

use crate::error::PipelineError;
use crate::export;
use crate::features;
use crate::labeling::{self, Comparison, LabelRule, Threshold, LABEL_COLUMN};
use crate::logistic_regression::{LogisticRegression, ModelParameters};
use crate::parse;

const LEARNING_RATE: f64 = 0.1;
const L2_REGULARIZATION: f64 = 0.01;
const EPOCHS: usize = 2000;

/// One trainable configuration of the fixed
/// load → clean → label → select → standardize → fit → export chain.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub name: &'static str,
    pub numeric_columns: Vec<String>,
    pub label_rule: LabelRule,
    pub feature_columns: Vec<String>,
    pub standardize: bool,
    pub output_path: Option<PathBuf>,
}

impl PipelineConfig {
    /// Labels a recorded run as high risk when any minutes were spent above
    /// the severe heart-rate threshold.
    pub fn severe_run() -> Self {
        Self {
            name: "severe-run",
            numeric_columns: to_strings(&[
                "BPM",
                "BaselineBPM",
                "PctIncrease",
                "DurationMin",
                "SevereRunMin",
            ]),
            label_rule: LabelRule::Threshold(Threshold {
                column: "SevereRunMin".to_owned(),
                comparison: Comparison::GreaterThan,
                value: 0.0,
            }),
            feature_columns: to_strings(&["BPM", "PctIncrease", "DurationMin"]),
            standardize: true,
            output_path: None,
        }
    }

    /// Labels a reading as high risk on tachycardia or fever. Trains on raw
    /// measurements so the exported weights apply directly to sensor values.
    pub fn heart_rate_temperature<P: Into<PathBuf>>(output_path: P) -> Self {
        Self {
            name: "hr-temperature",
            numeric_columns: to_strings(&["Heart_Rate", "Body_Temperature"]),
            label_rule: LabelRule::AnyOf(vec![
                LabelRule::Threshold(Threshold {
                    column: "Heart_Rate".to_owned(),
                    comparison: Comparison::GreaterThan,
                    value: 120.0,
                }),
                LabelRule::Threshold(Threshold {
                    column: "Body_Temperature".to_owned(),
                    comparison: Comparison::GreaterThan,
                    value: 37.4,
                }),
            ]),
            feature_columns: to_strings(&["Heart_Rate", "Body_Temperature"]),
            standardize: false,
            output_path: Some(output_path.into()),
        }
    }

    pub fn run<P: AsRef<Path>>(&self, input: P) -> Result<ModelParameters, PipelineError> {
        let input = input.as_ref();
        info!("{}: training from {}", self.name, input.display());

        let raw = parse::load(input)?;
        raw.require_columns(&self.numeric_columns)?;
        if raw.headers().iter().any(|header| header == LABEL_COLUMN) {
            return Err(PipelineError::Schema(format!(
                "input already contains a {LABEL_COLUMN:?} column"
            )));
        }

        let mut dataset = parse::clean(&raw, &self.numeric_columns)?;
        if dataset.is_empty() {
            return Err(PipelineError::Empty);
        }

        labeling::label_dataset(&mut dataset, &self.label_rule)?;

        let (matrix, labels) = features::select(&dataset, &self.feature_columns)?;

        let model = LogisticRegression::new(LEARNING_RATE, L2_REGULARIZATION);
        let parameters = if self.standardize {
            let (matrix, scaling) = features::standardize(matrix);
            model.fit(&matrix, &labels, EPOCHS).with_scaling(scaling)
        } else {
            model.fit(&matrix, &labels, EPOCHS)
        };

        export::print_parameters(&parameters);
        if let Some(path) = &self.output_path {
            export::write_parameters(&parameters, path)?;
        }

        Ok(parameters)
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|&name| name.to_owned()).collect()
}
