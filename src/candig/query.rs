use serde_json::{json, Value};

/// The patient fields requested from the count endpoint
pub const FIELDS: [&str; 15] = [
    "dateOfBirth",
    "gender",
    "ethnicity",
    "race",
    "provinceOfResidence",
    "dateOfDeath",
    "causeOfDeath",
    "autopsyTissueForResearch",
    "dateOfPriorMalignancy",
    "familyHistoryAndRiskFactors",
    "familyHistoryOfPredispositionSyndrome",
    "detailsOfPredispositionSyndrome",
    "geneticCancerSyndrome",
    "otherGeneticConditionOrSignificantComorbidity",
    "occupationalOrEnvironmentalExposure",
];

/// The body of a count query over the patients of `dataset_id` with a complete response.
///
/// Without a dataset id there is no query to send.
pub fn prepare_count_query(dataset_id: Option<&str>) -> Option<Value> {
    match dataset_id {
        Some(dataset_id) if !dataset_id.is_empty() => Some(json!({
            "logic": {
                "and": [{"id": "A"}]
            },
            "components": [{
                "id": "A",
                "outcomes": {
                    "filters": [{
                        "field": "diseaseResponseOrStatus",
                        "operator": "==",
                        "value": "Complete Response"
                    }]
                }
            }],
            "results": [{
                "table": "patients",
                "fields": FIELDS
            }],
            "datasetId": dataset_id
        })),
        _ => {
            log::error!("Dataset ID is missing, no count query prepared");
            None
        }
    }
}

/// The body of a dataset search returning every dataset
pub fn datasets_query() -> Value {
    json!({"pageSize": 1000, "pageToken": 0})
}
