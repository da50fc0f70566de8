//! Per-row prediction records for tabular export.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::PreparedDataset;
use crate::error::{AttritionError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub meta: BTreeMap<String, String>,
    pub probability: f32,
    pub predicted: u8,
    pub actual: u8,
}

/// Pair every test row of `prepared` with its probability, in test order.
pub fn prediction_records(
    prepared: &PreparedDataset,
    probabilities: &[f32],
    threshold: f32,
) -> Result<Vec<PredictionRecord>> {
    if probabilities.len() != prepared.y_test.len() {
        return Err(AttritionError::configuration(format!(
            "{} probabilities for {} test rows",
            probabilities.len(),
            prepared.y_test.len()
        )));
    }

    Ok(prepared
        .test_meta
        .iter()
        .zip(probabilities)
        .zip(prepared.y_test.iter())
        .map(|((meta, &probability), &actual)| PredictionRecord {
            meta: meta.clone(),
            probability,
            predicted: u8::from(probability >= threshold),
            actual,
        })
        .collect())
}
