use serde::{Deserialize, Serialize};

/// One row of historical model-usage data as returned by the cost endpoint.
///
/// The backing DynamoDB table stores every column as a string, including the
/// token counts and costs, so the fields are kept verbatim for display.
/// Extra columns (e.g. `invocations`) are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model_id: String,
    #[serde(default)]
    pub input_tokens: String,
    #[serde(default)]
    pub output_tokens: String,
    #[serde(default)]
    pub input_cost: String,
    #[serde(default)]
    pub output_cost: String,
    #[serde(default)]
    pub date: String,
}
