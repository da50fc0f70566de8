//! Derived numeric features computed from raw employee attributes.
//!
//! Every ratio divides by `max(1, denominator)` and every indicator compares
//! against an exact string or threshold, so the functions here are total over
//! any `Record`.
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data_handling::{LoadedDataset, Record};
use crate::schema::{self, BASE_NUMERIC_ATTRIBUTES};

/// Names of the engineered features, in feature-vector order.
pub const ENGINEERED_FEATURES: [&str; 7] = [
    "TenureRatio",
    "NoPromotionRatio",
    "IncomePerLevel",
    "OvertimeStress",
    "TravelFreq",
    "IsSingle",
    "LongDistance",
];

/// Human readable formulas, aligned with `ENGINEERED_FEATURES`.
pub const ENGINEERED_FORMULAS: [&str; 7] = [
    "YearsAtCompany / max(1, TotalWorkingYears)",
    "YearsSinceLastPromotion / max(1, YearsAtCompany)",
    "MonthlyIncome / max(1, JobLevel)",
    "1{OverTime = Yes} * (4 - JobSatisfaction)",
    "1{BusinessTravel = Travel_Frequently}",
    "1{MaritalStatus = Single}",
    "1{DistanceFromHome > 20}",
];

const LONG_DISTANCE_THRESHOLD: f32 = 20.0;

fn indicator(condition: bool) -> f32 {
    if condition {
        1.0
    } else {
        0.0
    }
}

/// Compute the 7 engineered features for one record.
pub fn engineered_features(record: &Record) -> [f32; 7] {
    let years_at_company = record.numeric("YearsAtCompany");
    let total_working_years = record.numeric("TotalWorkingYears");
    let since_promotion = record.numeric("YearsSinceLastPromotion");
    let monthly_income = record.numeric("MonthlyIncome");
    let job_level = record.numeric("JobLevel");
    let job_satisfaction = record.numeric("JobSatisfaction");
    let distance = record.numeric("DistanceFromHome");

    let overtime = indicator(record.get("OverTime") == Some("Yes"));

    [
        years_at_company / total_working_years.max(1.0),
        since_promotion / years_at_company.max(1.0),
        monthly_income / job_level.max(1.0),
        overtime * (4.0 - job_satisfaction),
        indicator(record.get("BusinessTravel") == Some("Travel_Frequently")),
        indicator(record.get("MaritalStatus") == Some("Single")),
        indicator(distance > LONG_DISTANCE_THRESHOLD),
    ]
}

/// Base numerics followed by engineered features, plus the label.
///
/// This is the dense (non-categorical) prefix of every feature vector.
pub fn numeric_fragment(record: &Record) -> (Vec<f32>, u8) {
    let mut values = Vec::with_capacity(BASE_NUMERIC_ATTRIBUTES.len() + ENGINEERED_FEATURES.len());
    values.extend(BASE_NUMERIC_ATTRIBUTES.iter().map(|name| record.numeric(name)));
    values.extend_from_slice(&engineered_features(record));
    (values, record.label())
}

/// Featurize every record in parallel, preserving row order.
pub fn numeric_fragments(records: &[Record]) -> Vec<(Vec<f32>, u8)> {
    records.par_iter().map(numeric_fragment).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedFeature {
    pub name: String,
    pub formula: String,
}

/// Which attributes were used, discarded and derived for a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    pub kept: Vec<String>,
    pub dropped: Vec<String>,
    pub created: Vec<CreatedFeature>,
}

impl FeatureReport {
    pub fn from_dataset(dataset: &LoadedDataset) -> Self {
        let kept = dataset
            .header
            .iter()
            .filter(|name| schema::is_base_numeric(name) || schema::is_categorical(name))
            .cloned()
            .collect();
        let dropped = dataset
            .header
            .iter()
            .filter(|name| schema::is_dropped(name) || !schema::is_allowed(name))
            .cloned()
            .collect();
        let created = ENGINEERED_FEATURES
            .iter()
            .zip(ENGINEERED_FORMULAS.iter())
            .map(|(name, formula)| CreatedFeature {
                name: name.to_string(),
                formula: formula.to_string(),
            })
            .collect();
        FeatureReport {
            kept,
            dropped,
            created,
        }
    }
}
