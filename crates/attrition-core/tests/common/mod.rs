use attrition_core::schema::{BASE_NUMERIC_ATTRIBUTES, CATEGORICAL_ATTRIBUTES};

const TRAVEL: [&str; 3] = ["Non-Travel", "Travel_Rarely", "Travel_Frequently"];
const DEPARTMENT: [&str; 3] = ["Human Resources", "Research & Development", "Sales"];
const FIELD: [&str; 4] = ["Life Sciences", "Medical", "Marketing", "Other"];
const GENDER: [&str; 2] = ["Female", "Male"];
const ROLE: [&str; 4] = [
    "Laboratory Technician",
    "Research Scientist",
    "Sales Executive",
    "Manager",
];
const MARITAL: [&str; 3] = ["Divorced", "Married", "Single"];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Deterministic employee table with `n` rows; every fifth row has left.
pub fn employee_table(n: usize) -> String {
    init_logging();
    let mut header: Vec<&str> = vec!["EmployeeNumber", "Attrition"];
    header.extend(BASE_NUMERIC_ATTRIBUTES.iter());
    header.extend(CATEGORICAL_ATTRIBUTES.iter());
    header.extend(["EmployeeCount", "Over18", "StandardHours"]);

    let mut out = header.join(",");
    out.push('\n');
    for i in 0..n {
        let left = i % 5 == 0;
        let mut fields = vec![
            (1000 + i).to_string(),
            if left { "Yes" } else { "No" }.to_string(),
        ];
        for (j, _) in BASE_NUMERIC_ATTRIBUTES.iter().enumerate() {
            fields.push(((i * (j + 3) + j * 7) % 37 + 1).to_string());
        }
        fields.push(TRAVEL[i % 3].to_string());
        fields.push(DEPARTMENT[(i / 2) % 3].to_string());
        fields.push(FIELD[i % 4].to_string());
        fields.push(GENDER[(i / 3) % 2].to_string());
        fields.push(ROLE[(i * 7) % 4].to_string());
        fields.push(MARITAL[(i + 1) % 3].to_string());
        fields.push(if left || i % 7 == 0 { "Yes" } else { "No" }.to_string());
        fields.extend(["1".to_string(), "Y".to_string(), "80".to_string()]);
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}
