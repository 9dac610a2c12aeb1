//! Stub backend and fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use chrono::NaiveDate;

use crate::api::{AppointmentsApi, AuthApi, PatientsApi};
use crate::error::ApiError;
use crate::models::{
    Appointment, AppointmentQuery, AppointmentRequest, ChangePasswordRequest, ListPayload,
    LoginRequest, LoginResponse, MessageResponse, Page, Patient, PatientQuery, RegisterRequest,
    RegisterResponse, Role, User,
};
use crate::utils::format_date;

pub fn sample_user(id: i64, role: Role) -> User {
    User {
        id,
        username: format!("user{id}"),
        email: Some(format!("user{id}@hospital.test")),
        real_name: Some(format!("User {id}")),
        phone: None,
        role,
        gender: None,
        birth_date: None,
        department: None,
        professional_title: None,
        license_number: None,
        is_active: true,
    }
}

pub fn sample_patient(id: i64) -> Patient {
    Patient {
        id,
        disease_description: Some(format!("case {id}")),
        ..Patient::default()
    }
}

pub fn sample_appointment(id: i64, planned_date: &str) -> Appointment {
    Appointment {
        id,
        surgery_name: Some(format!("surgery {id}")),
        planned_date: planned_date.to_string(),
        ..Appointment::default()
    }
}

pub fn rejected(message: &str) -> ApiError {
    ApiError::Status {
        status: StatusCode::BAD_REQUEST,
        message: Some(message.to_string()),
    }
}

/// Auth backend answering from canned values and counting calls.
#[derive(Default)]
pub struct StubAuth {
    pub login_user: Option<User>,
    pub login_error: Option<String>,
    pub me: Option<User>,
    pub logout_fails: bool,
    pub me_calls: AtomicUsize,
    pub calls: AtomicUsize,
    pub last_login: Mutex<Option<String>>,
}

impl StubAuth {
    pub fn accepting(user: User) -> Self {
        Self {
            login_user: Some(user.clone()),
            me: Some(user),
            ..Self::default()
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            login_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn login_result(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_login.lock().unwrap() = Some(credentials.username.clone());
        if let Some(message) = &self.login_error {
            return Err(rejected(message));
        }
        match &self.login_user {
            Some(user) => Ok(LoginResponse {
                token: format!("token-for-{}", user.username),
                token_type: "Bearer".into(),
                user: user.clone(),
            }),
            None => Err(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                message: None,
            }),
        }
    }
}

#[async_trait]
impl AuthApi for StubAuth {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.login_result(credentials)
    }

    async fn admin_login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.login_result(credentials)
    }

    async fn register(&self, user: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RegisterResponse {
            message: "registered".into(),
            user: User {
                username: user.username.clone(),
                ..sample_user(100, user.role.unwrap_or(Role::Patient))
            },
        })
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        self.me.clone().ok_or(ApiError::Unauthorized { message: None })
    }

    async fn logout(&self) -> Result<MessageResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.logout_fails {
            return Err(rejected("backend down"));
        }
        Ok(MessageResponse {
            message: "logged out".into(),
        })
    }

    async fn change_password(
        &self,
        passwords: &ChangePasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if passwords.old_password == passwords.new_password {
            return Err(rejected("New password must differ"));
        }
        Ok(MessageResponse {
            message: "Password changed".into(),
        })
    }
}

fn failure<T>(fail: bool, value: impl FnOnce() -> T) -> Result<T, ApiError> {
    if fail {
        Err(ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        })
    } else {
        Ok(value())
    }
}

/// Patients backend serving a fixed record set.
#[derive(Default)]
pub struct StubPatients {
    pub records: Vec<Patient>,
    pub fail: bool,
}

#[async_trait]
impl PatientsApi for StubPatients {
    async fn list_patients(&self, query: &PatientQuery) -> Result<ListPayload<Patient>, ApiError> {
        failure(self.fail, || {
            ListPayload::Paged(Page::slice(
                self.records.clone(),
                query.page.unwrap_or(0),
                query.size.unwrap_or(10),
            ))
        })
    }

    async fn get_patient(&self, id: i64) -> Result<Patient, ApiError> {
        if self.fail {
            return failure(true, Patient::default);
        }
        self.records
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| rejected("Patient not found"))
    }

    async fn create_patient(&self, patient: &Patient) -> Result<Patient, ApiError> {
        failure(self.fail, || Patient {
            id: 500,
            ..patient.clone()
        })
    }

    async fn update_patient(&self, id: i64, patient: &Patient) -> Result<Patient, ApiError> {
        failure(self.fail, || Patient {
            id,
            ..patient.clone()
        })
    }

    async fn delete_patient(&self, _id: i64) -> Result<MessageResponse, ApiError> {
        failure(self.fail, || MessageResponse {
            message: "deleted".into(),
        })
    }

    async fn my_patient_info(&self) -> Result<Patient, ApiError> {
        if self.fail {
            return Err(rejected("No patient record submitted yet"));
        }
        self.records
            .last()
            .cloned()
            .ok_or_else(|| rejected("No patient record submitted yet"))
    }
}

/// Appointments backend serving a fixed record set.
#[derive(Default)]
pub struct StubAppointments {
    pub records: Vec<Appointment>,
    pub fail: bool,
}

impl StubAppointments {
    pub fn with(records: Vec<Appointment>) -> Self {
        Self {
            records,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            records: Vec::new(),
            fail: true,
        }
    }

    fn from_request(id: i64, request: &AppointmentRequest) -> Appointment {
        Appointment {
            surgery_name: Some(request.surgery_name.clone()),
            ..sample_appointment(id, &format_date(request.planned_date))
        }
    }
}

#[async_trait]
impl AppointmentsApi for StubAppointments {
    async fn list_appointments(
        &self,
        query: &AppointmentQuery,
    ) -> Result<ListPayload<Appointment>, ApiError> {
        failure(self.fail, || {
            ListPayload::Paged(Page::slice(
                self.records.clone(),
                query.page.unwrap_or(0),
                query.size.unwrap_or(10),
            ))
        })
    }

    async fn get_appointment(&self, id: i64) -> Result<Appointment, ApiError> {
        failure(self.fail, || sample_appointment(id, "2024-01-01"))
    }

    async fn create_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        failure(self.fail, || Self::from_request(100, request))
    }

    async fn update_appointment(
        &self,
        id: i64,
        request: &AppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        failure(self.fail, || Self::from_request(id, request))
    }

    async fn confirm_appointment(&self, _id: i64) -> Result<MessageResponse, ApiError> {
        failure(self.fail, || MessageResponse {
            message: "confirmed".into(),
        })
    }

    async fn cancel_appointment(
        &self,
        _id: i64,
        _reason: Option<&str>,
    ) -> Result<MessageResponse, ApiError> {
        failure(self.fail, || MessageResponse {
            message: "cancelled".into(),
        })
    }

    async fn today_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        failure(self.fail, || self.records.clone())
    }

    async fn appointments_for_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, ApiError> {
        let date = format_date(date);
        failure(self.fail, || {
            self.records
                .iter()
                .filter(|a| a.planned_date == date)
                .cloned()
                .collect()
        })
    }

    async fn patient_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        failure(self.fail, || self.records.clone())
    }

    async fn patient_upcoming_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        failure(self.fail, || self.records.clone())
    }
}
