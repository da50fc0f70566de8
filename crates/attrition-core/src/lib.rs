//! attrition-core: employee attrition prediction with a recurrent classifier.
//!
//! The crate covers the path from a delimited employee table to calibrated
//! attrition probabilities: schema-checked loading, feature engineering,
//! categorical encoding, stratified splitting, standardization, optional
//! minority oversampling, a candle LSTM classifier and threshold tuning.
//!
//! Preparation is a pure function (`dataset::prepare_dataset`) returning an
//! immutable `PreparedDataset`; the classifier consumes its matrices.
pub mod augmentation;
pub mod config;
pub mod data_handling;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod feature_engineering;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod schema;
pub mod split;
pub mod stats;

pub use error::{AttritionError, Result, SchemaError};
