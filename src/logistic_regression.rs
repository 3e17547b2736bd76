use log::info;
use nalgebra::{DMatrix, DVector};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::features::{ColumnScaling, FeatureMatrix};

/// Fitted classifier parameters. `weights[i]` belongs to
/// `feature_order[i]`; `scaling`, when present, must be applied to raw
/// inputs before the linear score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub feature_order: Vec<String>,
    pub weights: Vec<f64>,
    pub bias: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling: Option<Vec<ColumnScaling>>,
}

impl ModelParameters {
    pub fn with_scaling(mut self, scaling: Vec<ColumnScaling>) -> Self {
        self.scaling = Some(scaling);
        self
    }

    /// Probability that a raw measurement vector, given in `feature_order`,
    /// belongs to the positive class.
    pub fn predict_probability(&self, features: &[f64]) -> f64 {
        assert_eq!(features.len(), self.weights.len(), "feature count mismatch");

        let mut score = self.bias;
        for (index, (&feature, weight)) in features.iter().zip(&self.weights).enumerate() {
            let value = match &self.scaling {
                Some(scaling) => (feature - scaling[index].mean) / scaling[index].std_dev,
                None => feature,
            };
            score += weight * value;
        }

        sigmoid(score)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Binary logistic regression fitted by full-batch gradient descent.
/// Weights and bias start at zero, so a fit is deterministic for a given
/// input and epoch count.
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub l2_regularization: f64,
}

impl LogisticRegression {
    pub fn new(learning_rate: f64, l2_regularization: f64) -> Self {
        Self {
            learning_rate,
            l2_regularization,
        }
    }

    pub fn fit(
        &self,
        features: &FeatureMatrix,
        labels: &Array1<f64>,
        epochs: usize,
    ) -> ModelParameters {
        let samples = features.values.nrows();
        let dimensions = features.values.ncols();

        let x = DMatrix::from_row_iterator(samples, dimensions, features.values.iter().copied());
        let y = DVector::from_iterator(samples, labels.iter().copied());

        let mut weights: DVector<f64> = DVector::zeros(dimensions);
        let mut bias = 0.0;
        let n = samples as f64;

        for _ in 0..epochs {
            let scores = &x * &weights;
            let residuals = scores.map(|score| sigmoid(score + bias)) - &y;

            // The bias is left unregularized.
            let mut gradient = (x.transpose() * &residuals) / n;
            gradient += self.l2_regularization * &weights;
            let bias_gradient = residuals.sum() / n;

            weights -= self.learning_rate * gradient;
            bias -= self.learning_rate * bias_gradient;
        }

        info!(
            "fitted logistic regression: {samples} samples, {dimensions} features, {epochs} epochs"
        );

        ModelParameters {
            feature_order: features.columns.clone(),
            weights: weights.iter().copied().collect(),
            bias,
            scaling: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use pretty_assertions::assert_eq;

    fn single_feature_matrix(values: &[f64]) -> FeatureMatrix {
        FeatureMatrix {
            columns: vec!["Heart_Rate".to_owned()],
            values: arr2(&values.iter().map(|&value| [value]).collect::<Vec<[f64; 1]>>()),
        }
    }

    #[test]
    fn fit_is_deterministic() {
        let matrix = single_feature_matrix(&[-1.0, -0.5, 0.5, 1.0]);
        let labels = Array1::from(vec![0.0, 0.0, 1.0, 1.0]);
        let model = LogisticRegression::new(0.1, 0.01);

        let first = model.fit(&matrix, &labels, 500);
        let second = model.fit(&matrix, &labels, 500);

        assert_eq!(first, second);
    }

    #[test]
    fn fit_separates_a_simple_threshold() {
        let matrix = single_feature_matrix(&[-1.0, -1.0, 1.0, 1.0]);
        let labels = Array1::from(vec![0.0, 0.0, 1.0, 1.0]);
        let model = LogisticRegression::new(0.5, 0.0);

        let parameters = model.fit(&matrix, &labels, 800);

        let low = parameters.predict_probability(&[-1.0]);
        let high = parameters.predict_probability(&[1.0]);
        assert!(low < 0.5, "expected low-side probability < 0.5, got {low}");
        assert!(high > 0.5, "expected high-side probability > 0.5, got {high}");
    }

    #[test]
    fn all_zero_labels_degenerate_without_crashing() {
        let matrix = single_feature_matrix(&[-1.0, 0.0, 1.0]);
        let labels = Array1::from(vec![0.0, 0.0, 0.0]);
        let model = LogisticRegression::new(0.1, 0.01);

        let parameters = model.fit(&matrix, &labels, 2000);

        assert!(parameters.weights.iter().all(|weight| weight.abs() < 1e-6));
        assert!(
            parameters.bias < -2.0,
            "expected a strongly negative bias, got {}",
            parameters.bias
        );
    }

    #[test]
    fn prediction_applies_the_bundled_scaling() {
        let parameters = ModelParameters {
            feature_order: vec!["Heart_Rate".to_owned()],
            weights: vec![1.0],
            bias: 0.0,
            scaling: Some(vec![ColumnScaling {
                mean: 100.0,
                std_dev: 10.0,
            }]),
        };

        let probability = parameters.predict_probability(&[110.0]);

        assert!((probability - sigmoid(1.0)).abs() < 1e-12);
    }

    #[test]
    fn weight_order_follows_the_feature_columns() {
        let matrix = FeatureMatrix {
            columns: vec!["Heart_Rate".to_owned(), "Body_Temperature".to_owned()],
            values: arr2(&[[-1.0, 0.2], [1.0, -0.2], [-1.0, 0.2], [1.0, -0.2]]),
        };
        let labels = Array1::from(vec![0.0, 1.0, 0.0, 1.0]);
        let model = LogisticRegression::new(0.5, 0.0);

        let parameters = model.fit(&matrix, &labels, 500);

        assert_eq!(
            parameters.feature_order,
            vec!["Heart_Rate", "Body_Temperature"]
        );
        // The first column carries the signal; its weight must dominate.
        assert!(parameters.weights[0] > parameters.weights[1].abs());
    }
}
