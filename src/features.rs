use log::debug;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::labeling::LABEL_COLUMN;
use crate::parse::Dataset;

/// Named, ordered feature columns. Row `i` corresponds to dataset row `i`,
/// and the column order fixes the weight order of any model fitted on it.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

/// Per-column standardization statistics. Kept alongside the fitted model
/// so new raw measurements can be scaled the same way at inference time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScaling {
    pub mean: f64,
    pub std_dev: f64,
}

/// Projects the named columns into a matrix and pulls the label column out
/// into a parallel vector.
pub fn select(
    dataset: &Dataset,
    feature_columns: &[String],
) -> Result<(FeatureMatrix, Array1<f64>), PipelineError> {
    let indices = feature_columns
        .iter()
        .map(|column| dataset.column_index(column))
        .collect::<Result<Vec<usize>, PipelineError>>()?;
    let label_index = dataset.column_index(LABEL_COLUMN)?;

    let mut values = Array2::zeros((dataset.len(), feature_columns.len()));
    let mut labels = Array1::zeros(dataset.len());

    for row in 0..dataset.len() {
        for (j, &index) in indices.iter().enumerate() {
            values[(row, j)] = dataset.value(row, index);
        }
        labels[row] = dataset.value(row, label_index);
    }

    let matrix = FeatureMatrix {
        columns: feature_columns.to_vec(),
        values,
    };

    Ok((matrix, labels))
}

/// Z-score standardization per column over the full matrix, population
/// statistics. A constant column is centered and left at scale 1.
pub fn standardize(matrix: FeatureMatrix) -> (FeatureMatrix, Vec<ColumnScaling>) {
    let FeatureMatrix { columns, mut values } = matrix;
    let rows = values.nrows() as f64;

    let mut scalings = Vec::with_capacity(columns.len());
    for (j, name) in columns.iter().enumerate() {
        let column = values.column(j);
        let mean = column.sum() / rows;
        let variance = column.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / rows;
        let std_dev = variance.sqrt();
        let scale = if std_dev == 0.0 { 1.0 } else { std_dev };

        values
            .column_mut(j)
            .mapv_inplace(|value| (value - mean) / scale);

        debug!("standardized {name}: mean {mean:.6}, std_dev {std_dev:.6}");
        scalings.push(ColumnScaling {
            mean,
            std_dev: scale,
        });
    }

    (FeatureMatrix { columns, values }, scalings)
}
