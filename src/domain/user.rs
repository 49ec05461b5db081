use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents an authenticated user of the clinic system.
///
/// The role-specific fields live in [`Profile`], a tagged union keyed by the
/// `role` field on the wire, so a patient never carries doctor-only fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Role-specific portion of a [`User`], discriminated by the `role` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Profile {
    Patient(PatientProfile),
    Doctor(DoctorProfile),
    Staff(StaffProfile),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub specialization: String,
    #[serde(default)]
    pub availability: Vec<AvailabilitySlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    pub department: String,
}

/// Weekly availability window for a doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub id: String,
    pub doctor_id: String,
    /// 0 = Sunday, 1 = Monday, ...
    pub day_of_week: u8,
    /// format: HH:mm
    pub start_time: String,
    /// format: HH:mm
    pub end_time: String,
}

/// Fieldless role discriminant, used for scoping fetches and permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Staff,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Patient => write!(f, "patient"),
            Role::Doctor => write!(f, "doctor"),
            Role::Staff => write!(f, "staff"),
        }
    }
}

impl User {
    pub fn role(&self) -> Role {
        match self.profile {
            Profile::Patient(_) => Role::Patient,
            Profile::Doctor(_) => Role::Doctor,
            Profile::Staff(_) => Role::Staff,
        }
    }
}

/// Entry in the doctor list offered by the booking form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specialization: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_role_tag_round_trip() {
        let json = r#"{
            "id": "u1",
            "email": "jo@example.com",
            "name": "Jo",
            "role": "doctor",
            "specialization": "Cardiology"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role(), Role::Doctor);
        match &user.profile {
            Profile::Doctor(d) => {
                assert_eq!(d.specialization, "Cardiology");
                assert!(d.availability.is_empty());
            }
            other => panic!("unexpected profile: {:?}", other),
        }

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["role"], "doctor");
        assert_eq!(back["specialization"], "Cardiology");
    }

    #[test]
    fn patient_optional_fields_default() {
        let json = r#"{"id":"u2","email":"p@example.com","name":"Pat","role":"patient"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role(), Role::Patient);
        match &user.profile {
            Profile::Patient(p) => assert_eq!(p.phone, None),
            other => panic!("unexpected profile: {:?}", other),
        }
    }
}
