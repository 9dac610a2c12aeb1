use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Patient,
    Doctor,
    Nurse,
    Anesthesiologist,
    Admin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Patient,
        Role::Doctor,
        Role::Nurse,
        Role::Anesthesiologist,
        Role::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "PATIENT",
            Role::Doctor => "DOCTOR",
            Role::Nurse => "NURSE",
            Role::Anesthesiologist => "ANESTHESIOLOGIST",
            Role::Admin => "ADMIN",
        }
    }

    /// Page a user of this role lands on after login or a refused navigation.
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::Patient => "/patient-dashboard",
            _ => "/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown role `{s}`"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityLevel {
    Emergency,
    Urgent,
    #[default]
    Normal,
    Low,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    PendingConfirmation,
    TeamConfirmed,
    DoctorFinalConfirmed,
    Notified,
    InProgress,
    Completed,
    Cancelled,
    Postponed,
}

fn default_active() -> bool {
    true
}

// Nullable backend columns arrive as an explicit `null`, not a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_active<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(default_active))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub department: Option<String>,
    pub professional_title: Option<String>,
    pub license_number: Option<String>,
    #[serde(default = "default_active", deserialize_with = "null_as_active")]
    pub is_active: bool,
}

/// Patient record as the backend serializes it. Fields this client does not
/// model are kept in `extra` and sent back untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default)]
    pub id: i64,
    pub user: Option<User>,
    pub medical_record_number: Option<String>,
    pub id_card: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub medical_history: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub ward_number: Option<String>,
    pub bed_number: Option<String>,
    pub disease_description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity_level: SeverityLevel,
    pub assigned_doctor: Option<User>,
    pub status: Option<String>,
    pub last_visit_date: Option<NaiveDate>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Surgery appointment. `planned_date` stays the raw `YYYY-MM-DD` string the
/// backend sends so date filtering compares exactly what was received.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default)]
    pub id: i64,
    pub patient: Option<Patient>,
    pub doctor: Option<User>,
    pub anesthesiologist: Option<User>,
    pub nurse: Option<User>,
    pub room: Option<Value>,
    pub bed: Option<Value>,
    pub surgery_name: Option<String>,
    pub surgery_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub planned_date: String,
    pub planned_start_time: Option<String>,
    pub planned_end_time: Option<String>,
    pub estimated_duration: Option<i32>,
    pub surgery_description: Option<String>,
    pub pre_surgery_notes: Option<String>,
    pub post_surgery_notes: Option<String>,
    pub cancel_reason: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: AppointmentStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority_level: SeverityLevel,
    #[serde(default, deserialize_with = "null_as_default")]
    pub anesthesiologist_confirmed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nurse_confirmed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub doctor_final_confirmed: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Appointment {
    /// Whether `user_id` is the doctor, nurse or anesthesiologist on this surgery.
    pub fn is_assigned_to(&self, user_id: i64) -> bool {
        [&self.doctor, &self.nurse, &self.anesthesiologist]
            .into_iter()
            .flatten()
            .any(|member| member.id == user_id)
    }

    pub fn patient_user_id(&self) -> Option<i64> {
        self.patient.as_ref()?.user.as_ref().map(|u| u.id)
    }
}

/// Records held in a store list are replaced and removed by id.
pub trait Identified {
    fn id(&self) -> i64;
}

impl Identified for Patient {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Appointment {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Paginated envelope produced by the backend's list endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Cuts one page out of an already filtered and sorted result set.
    pub fn slice(items: Vec<T>, number: u32, size: u32) -> Self {
        let total_elements = items.len() as u64;
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(size as u64) as u32
        };
        let start = (number as usize).saturating_mul(size as usize);
        let content = items
            .into_iter()
            .skip(start)
            .take(size as usize)
            .collect();

        Self {
            content,
            number,
            size,
            total_elements,
            total_pages,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            total: 0,
        }
    }
}

/// A list response: either a bare JSON array or a paginated envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Bare(Vec<T>),
    Paged(Page<T>),
}

impl<T> ListPayload<T> {
    /// Splits the payload into its records and, for envelopes, the pagination.
    pub fn into_parts(self) -> (Vec<T>, Option<Pagination>) {
        match self {
            ListPayload::Bare(items) => (items, None),
            ListPayload::Paged(page) => (
                page.content,
                Some(Pagination {
                    page: page.number,
                    size: page.size,
                    total: page.total_elements,
                }),
            ),
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            ListPayload::Bare(items) => items,
            ListPayload::Paged(page) => &page.content,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type", default)]
    pub token_type: String,
    pub user: User,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub real_name: String,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub department: Option<String>,
    pub professional_title: Option<String>,
    pub license_number: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of appointment create and update calls. Staff and resource
/// assignments are sent by id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub patient_id: i64,
    pub doctor_id: Option<i64>,
    pub nurse_id: Option<i64>,
    pub anesthesiologist_id: Option<i64>,
    pub room_id: Option<i64>,
    pub bed_id: Option<i64>,
    pub surgery_name: String,
    pub surgery_type: Option<String>,
    pub planned_date: NaiveDate,
    pub planned_start_time: Option<String>,
    pub planned_end_time: Option<String>,
    pub estimated_duration: Option<i32>,
    pub surgery_description: Option<String>,
    pub pre_surgery_notes: Option<String>,
    pub priority_level: Option<SeverityLevel>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PatientQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeverityLevel>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}
