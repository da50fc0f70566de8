use anyhow::{Context, Result};
use attrition_core::config::{ModelConfig, PipelineConfig, PreparationConfig, TrainingConfig};
use clap::ArgMatches;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

use crate::util::validate_tsv_or_csv_file;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrainConfig {
    pub version: String,
    pub data: String,
    pub output_dir: String,
    pub model_name: String,
    pub device: String,
    pub preparation: PreparationConfig,
    pub model: ModelConfig,
    pub training: TrainingConfig,
    pub decision_threshold: f32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        let pipeline = PipelineConfig::default();
        TrainConfig {
            version: clap::crate_version!().to_string(),
            data: String::new(),
            output_dir: String::from("attrition_output"),
            model_name: String::from("model"),
            device: String::from("cpu"),
            preparation: pipeline.preparation,
            model: pipeline.model,
            training: pipeline.training,
            decision_threshold: pipeline.decision_threshold,
        }
    }
}

impl TrainConfig {
    /// Parse a JSON config. Missing or invalid fields fall back to defaults,
    /// including fields inside the nested sections.
    pub fn from_json(config_json: &str) -> Result<Self> {
        let partial: Value =
            serde_json::from_str(config_json).context("Config is not valid JSON")?;
        let mut config = TrainConfig::default();

        macro_rules! load_or_default {
            ($field:ident) => {
                if let Some(val) = partial.get(stringify!($field)) {
                    if let Ok(parsed) = serde_json::from_value(val.clone()) {
                        config.$field = parsed;
                    } else {
                        log::warn!(
                            "Config Invalid value for '{}', using default: {:?}",
                            stringify!($field),
                            config.$field
                        );
                    }
                } else {
                    log::warn!(
                        "Config Missing field '{}', using default: {:?}",
                        stringify!($field),
                        config.$field
                    );
                }
            };
        }

        load_or_default!(data);
        load_or_default!(output_dir);
        load_or_default!(model_name);
        load_or_default!(device);
        config.preparation =
            section_or_default("preparation", &partial, config.preparation.clone())?;
        config.model = section_or_default("model", &partial, config.model.clone())?;
        config.training = section_or_default("training", &partial, config.training.clone())?;
        load_or_default!(decision_threshold);

        Ok(config)
    }

    pub fn from_arguments(config_path: &PathBuf, matches: &ArgMatches) -> Result<Self> {
        let config_json = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
        let mut config = TrainConfig::from_json(&config_json)?;

        // Apply CLI overrides
        if let Some(data) = matches.get_one::<String>("data") {
            config.data = data.clone();
        }
        validate_tsv_or_csv_file(&config.data)?;

        if let Some(output_dir) = matches.get_one::<String>("output_dir") {
            config.output_dir = output_dir.clone();
        }
        if let Some(device) = matches.get_one::<String>("device") {
            config.device = device.clone();
        }

        Ok(config)
    }

    /// The core pipeline settings, with all clamps applied.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            preparation: self.preparation.clone(),
            model: self.model.clone(),
            training: self.training.clone(),
            decision_threshold: self.decision_threshold,
        }
        .clamped()
    }

    /// This config with the clamped pipeline settings a run actually uses.
    pub fn effective(&self) -> Self {
        let pipeline = self.pipeline();
        TrainConfig {
            preparation: pipeline.preparation,
            model: pipeline.model,
            training: pipeline.training,
            decision_threshold: pipeline.decision_threshold,
            ..self.clone()
        }
    }
}

/// Load a nested config section field by field on top of `default`.
fn section_or_default<T>(name: &str, partial: &Value, default: T) -> Result<T>
where
    T: Serialize + DeserializeOwned + std::fmt::Debug,
{
    let Some(section) = partial.get(name) else {
        log::warn!(
            "Config Missing field '{}', using default: {:?}",
            name,
            default
        );
        return Ok(default);
    };
    if !section.is_object() {
        log::warn!(
            "Config Invalid value for '{}', using default: {:?}",
            name,
            default
        );
        return Ok(default);
    }

    let mut merged = serde_json::to_value(&default)?;
    overlay_fields::<T>(&mut merged, &mut vec![name.to_string()], &mut Vec::new(), section);
    Ok(serde_json::from_value(merged)?)
}

/// Copy each field of `user` into `merged` at `path`, keeping a field only
/// when the whole section still deserializes as `T`.
fn overlay_fields<T: DeserializeOwned>(
    merged: &mut Value,
    label: &mut Vec<String>,
    path: &mut Vec<String>,
    user: &Value,
) {
    let Some(fields) = user.as_object() else {
        return;
    };
    for (key, value) in fields {
        let mut candidate = merged.clone();
        let Some(parent) = value_at_mut(&mut candidate, path).and_then(Value::as_object_mut)
        else {
            continue;
        };
        parent.insert(key.clone(), value.clone());

        path.push(key.clone());
        label.push(key.clone());
        if serde_json::from_value::<T>(candidate.clone()).is_ok() {
            *merged = candidate;
        } else if value.is_object() && value_at_mut(merged, path).is_some_and(|v| v.is_object()) {
            overlay_fields::<T>(merged, label, path, value);
        } else {
            log::warn!(
                "Config Invalid value for '{}', using default: {}",
                label.join("."),
                value_at_mut(merged, path).map_or(Value::Null, |v| v.clone())
            );
        }
        label.pop();
        path.pop();
    }
}

fn value_at_mut<'a>(root: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    path.iter().try_fold(root, |node, key| node.get_mut(key.as_str()))
}
