//! Categorical encoding and the canonical feature layout.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data_handling::{LoadedDataset, Record};
use crate::feature_engineering::ENGINEERED_FEATURES;
use crate::schema::BASE_NUMERIC_ATTRIBUTES;

/// Sorted distinct values of one categorical attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMap {
    pub attribute: String,
    pub values: Vec<String>,
}

impl CategoryMap {
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.values.binary_search_by(|v| v.as_str().cmp(value)).ok()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-attribute value-to-index maps, fit once on the whole loaded dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    pub maps: Vec<CategoryMap>,
}

impl CategoricalEncoder {
    /// Fit over every row. Attributes follow canonical order and are limited
    /// to those present in the header.
    pub fn fit(dataset: &LoadedDataset) -> Self {
        let maps = dataset
            .categorical_attributes()
            .into_iter()
            .map(|attribute| {
                let values: BTreeSet<&str> = dataset
                    .records
                    .iter()
                    .filter_map(|r| r.get(attribute))
                    .filter(|v| !v.is_empty())
                    .collect();
                CategoryMap {
                    attribute: attribute.to_string(),
                    values: values.into_iter().map(str::to_string).collect(),
                }
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Fitted categorical encoder: {}",
            maps.iter()
                .map(|m| format!("{}={}", m.attribute, m.len()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        CategoricalEncoder { maps }
    }

    /// Total width of all one-hot blocks.
    pub fn width(&self) -> usize {
        self.maps.iter().map(CategoryMap::len).sum()
    }

    /// Append one-hot blocks for `record` to `out`. Unseen or missing values
    /// leave their block all zero.
    pub fn encode_into(&self, record: &Record, out: &mut Vec<f32>) {
        for map in &self.maps {
            let start = out.len();
            out.resize(start + map.len(), 0.0);
            if let Some(idx) = record.get(&map.attribute).and_then(|v| map.index_of(v)) {
                out[start + idx] = 1.0;
            }
        }
    }
}

/// Ordered feature names; index `i` names column `i` of every feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureLayout {
    pub names: Vec<String>,
    pub dense_width: usize,
}

impl FeatureLayout {
    /// Rebuild the layout from the encoder and the canonical lists alone.
    pub fn from_encoder(encoder: &CategoricalEncoder) -> Self {
        let mut names: Vec<String> = BASE_NUMERIC_ATTRIBUTES
            .iter()
            .chain(ENGINEERED_FEATURES.iter())
            .map(|s| s.to_string())
            .collect();
        let dense_width = names.len();
        for map in &encoder.maps {
            names.extend(map.values.iter().map(|v| format!("{}={}", map.attribute, v)));
        }
        FeatureLayout { names, dense_width }
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }
}
