use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Doctor profile as seen by the scheduling core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorRef {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}

/// Patient profile as seen by the scheduling core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRef {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}
