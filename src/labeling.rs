use log::info;

use crate::error::PipelineError;
use crate::parse::Dataset;

/// Name of the derived risk column appended by `label_dataset`.
pub const LABEL_COLUMN: &str = "label";

#[derive(Debug, Clone, Copy)]
pub enum Comparison {
    GreaterThan,
    LessThan,
    Equal,
}

/// One threshold test against a named column.
#[derive(Debug, Clone)]
pub struct Threshold {
    pub column: String,
    pub comparison: Comparison,
    pub value: f64,
}

/// Labeling policy: threshold leaves combined by boolean operators. The
/// label stands in for an outcome variable the source data does not carry,
/// so the rule is injected per pipeline configuration rather than fixed.
#[derive(Debug, Clone)]
pub enum LabelRule {
    Threshold(Threshold),
    AnyOf(Vec<LabelRule>),
    AllOf(Vec<LabelRule>),
}

impl LabelRule {
    fn evaluate(&self, dataset: &Dataset, row: usize) -> Result<bool, PipelineError> {
        match self {
            Self::Threshold(threshold) => {
                let column = dataset.column_index(&threshold.column)?;
                let value = dataset.value(row, column);

                Ok(match threshold.comparison {
                    Comparison::GreaterThan => value > threshold.value,
                    Comparison::LessThan => value < threshold.value,
                    Comparison::Equal => (value - threshold.value).abs() < f64::EPSILON,
                })
            }
            Self::AnyOf(rules) => {
                for rule in rules {
                    if rule.evaluate(dataset, row)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::AllOf(rules) => {
                for rule in rules {
                    if !rule.evaluate(dataset, row)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

/// Appends the 0/1 `label` column. Each row is evaluated independently, so
/// the label is a pure function of that row's fields.
pub fn label_dataset(dataset: &mut Dataset, rule: &LabelRule) -> Result<(), PipelineError> {
    let mut labels = Vec::with_capacity(dataset.len());
    for row in 0..dataset.len() {
        labels.push(if rule.evaluate(dataset, row)? { 1.0 } else { 0.0 });
    }

    let positives = labels.iter().filter(|&&label| label > 0.5).count();
    info!("labeled {} rows, {positives} positive", labels.len());

    dataset.append_column(LABEL_COLUMN, labels)
}
