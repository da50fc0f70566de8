pub mod classifier_trait;
pub mod factory;
pub mod sequence_classifier;

pub use classifier_trait::ClassifierModel;
pub use sequence_classifier::{ModelState, SequenceArchitecture, SequenceClassifier};
