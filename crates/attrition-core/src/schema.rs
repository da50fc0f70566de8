//! Canonical attribute lists for the employee table.
//!
//! The order of every list here is part of the feature-vector contract:
//! base numerics first, then engineered features, then one-hot blocks in
//! `CATEGORICAL_ATTRIBUTES` order.

/// Binary outcome column (`Yes` / `No`).
pub const LABEL_ATTRIBUTE: &str = "Attrition";

/// Identifying columns carried through for reporting only.
pub const META_ATTRIBUTES: [&str; 1] = ["EmployeeNumber"];

/// Columns recognised but never used (constant in the source data).
pub const DROPPED_ATTRIBUTES: [&str; 3] = ["EmployeeCount", "Over18", "StandardHours"];

pub const BASE_NUMERIC_ATTRIBUTES: [&str; 23] = [
    "Age",
    "DailyRate",
    "DistanceFromHome",
    "Education",
    "EnvironmentSatisfaction",
    "HourlyRate",
    "JobInvolvement",
    "JobLevel",
    "JobSatisfaction",
    "MonthlyIncome",
    "MonthlyRate",
    "NumCompaniesWorked",
    "PercentSalaryHike",
    "PerformanceRating",
    "RelationshipSatisfaction",
    "StockOptionLevel",
    "TotalWorkingYears",
    "TrainingTimesLastYear",
    "WorkLifeBalance",
    "YearsAtCompany",
    "YearsInCurrentRole",
    "YearsSinceLastPromotion",
    "YearsWithCurrManager",
];

pub const CATEGORICAL_ATTRIBUTES: [&str; 7] = [
    "BusinessTravel",
    "Department",
    "EducationField",
    "Gender",
    "JobRole",
    "MaritalStatus",
    "OverTime",
];

pub fn is_base_numeric(name: &str) -> bool {
    BASE_NUMERIC_ATTRIBUTES.contains(&name)
}

pub fn is_categorical(name: &str) -> bool {
    CATEGORICAL_ATTRIBUTES.contains(&name)
}

pub fn is_meta(name: &str) -> bool {
    META_ATTRIBUTES.contains(&name)
}

pub fn is_dropped(name: &str) -> bool {
    DROPPED_ATTRIBUTES.contains(&name)
}

/// True when the column belongs to the allow-list and is retained per row.
pub fn is_allowed(name: &str) -> bool {
    name == LABEL_ATTRIBUTE
        || is_base_numeric(name)
        || is_categorical(name)
        || is_meta(name)
        || is_dropped(name)
}
