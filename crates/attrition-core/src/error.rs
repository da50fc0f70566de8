use std::error::Error;
use std::fmt;

/// Fatal problems with the shape of the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    MissingLabelColumn(String), // Name of the required label column
    EmptyDataset,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SchemaError::MissingLabelColumn(name) => {
                write!(f, "Required label column '{}' is missing from the header", name)
            }
            SchemaError::EmptyDataset => write!(f, "Input table contains no usable data rows"),
        }
    }
}

impl Error for SchemaError {}

/// Error type for every fallible operation in the crate.
#[derive(Debug)]
pub enum AttritionError {
    Schema(SchemaError),
    Configuration(String),
    Tensor(candle_core::Error),
    Io(std::io::Error),
    Csv(csv::Error),
    Serialization(serde_json::Error),
}

impl fmt::Display for AttritionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AttritionError::Schema(e) => write!(f, "Schema error: {}", e),
            AttritionError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AttritionError::Tensor(e) => write!(f, "Tensor error: {}", e),
            AttritionError::Io(e) => write!(f, "I/O error: {}", e),
            AttritionError::Csv(e) => write!(f, "CSV error: {}", e),
            AttritionError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl Error for AttritionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AttritionError::Schema(e) => Some(e),
            AttritionError::Configuration(_) => None,
            AttritionError::Tensor(e) => Some(e),
            AttritionError::Io(e) => Some(e),
            AttritionError::Csv(e) => Some(e),
            AttritionError::Serialization(e) => Some(e),
        }
    }
}

impl From<SchemaError> for AttritionError {
    fn from(e: SchemaError) -> Self {
        AttritionError::Schema(e)
    }
}

impl From<candle_core::Error> for AttritionError {
    fn from(e: candle_core::Error) -> Self {
        AttritionError::Tensor(e)
    }
}

impl From<std::io::Error> for AttritionError {
    fn from(e: std::io::Error) -> Self {
        AttritionError::Io(e)
    }
}

impl From<csv::Error> for AttritionError {
    fn from(e: csv::Error) -> Self {
        AttritionError::Csv(e)
    }
}

impl From<serde_json::Error> for AttritionError {
    fn from(e: serde_json::Error) -> Self {
        AttritionError::Serialization(e)
    }
}

impl AttritionError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        AttritionError::Configuration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AttritionError>;
