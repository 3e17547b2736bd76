//! Offline training pipeline for heart-rate risk models: clean a CSV of
//! physiological measurements, derive a threshold-based risk label, fit a
//! logistic regression classifier and export its parameters.

pub mod error;
pub mod export;
pub mod features;
pub mod labeling;
pub mod logistic_regression;
pub mod parse;
pub mod pipeline;
