use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ClinicError, ClinicResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Doctor,
    Laboratory,
    Pharmacy,
    Patient,
}

/// The authenticated identity behind a request, as supplied by the session
/// system.
///
/// `doctor_id` / `patient_id` carry the caller's profile id when the role has
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_role(&self, allowed: &[Role]) -> ClinicResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ClinicError::Authorization(
                "Forbidden - Insufficient permissions".to_string(),
            ))
        }
    }

    /// True for admins and for the doctor that owns `doctor_id`.
    pub fn manages_doctor(&self, doctor_id: Uuid) -> bool {
        self.is_admin() || (self.role == Role::Doctor && self.doctor_id == Some(doctor_id))
    }

    pub fn require_doctor_owner(&self, doctor_id: Uuid) -> ClinicResult<()> {
        if self.manages_doctor(doctor_id) {
            Ok(())
        } else {
            Err(ClinicError::Authorization(
                "Only the owning doctor or an admin may manage this availability".to_string(),
            ))
        }
    }

    pub fn is_patient(&self, patient_id: Uuid) -> bool {
        self.role == Role::Patient && self.patient_id == Some(patient_id)
    }
}
