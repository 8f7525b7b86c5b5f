use serde::Deserialize;
use uuid::Uuid;

/// `PUT /games/{id}/participant/{pid}/position` body: the raw placements array.
pub type SetPositionRequest = Vec<i32>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPositionEntry {
    pub participant_id: Uuid,
    pub positions: Vec<i32>,
}

pub type BatchPositionRequest = Vec<BatchPositionEntry>;
