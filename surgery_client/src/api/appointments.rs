use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{
    Appointment, AppointmentQuery, AppointmentRequest, CancelRequest, ListPayload,
    MessageResponse,
};
use crate::utils::format_date;

#[async_trait]
pub trait AppointmentsApi: Send + Sync {
    async fn list_appointments(
        &self,
        query: &AppointmentQuery,
    ) -> Result<ListPayload<Appointment>, ApiError>;
    async fn get_appointment(&self, id: i64) -> Result<Appointment, ApiError>;
    async fn create_appointment(&self, request: &AppointmentRequest)
        -> Result<Appointment, ApiError>;
    async fn update_appointment(
        &self,
        id: i64,
        request: &AppointmentRequest,
    ) -> Result<Appointment, ApiError>;
    async fn confirm_appointment(&self, id: i64) -> Result<MessageResponse, ApiError>;
    async fn cancel_appointment(
        &self,
        id: i64,
        reason: Option<&str>,
    ) -> Result<MessageResponse, ApiError>;
    async fn today_appointments(&self) -> Result<Vec<Appointment>, ApiError>;
    async fn appointments_for_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, ApiError>;
    async fn patient_appointments(&self) -> Result<Vec<Appointment>, ApiError>;
    async fn patient_upcoming_appointments(&self) -> Result<Vec<Appointment>, ApiError>;
}

#[async_trait]
impl AppointmentsApi for ApiClient {
    async fn list_appointments(
        &self,
        query: &AppointmentQuery,
    ) -> Result<ListPayload<Appointment>, ApiError> {
        self.execute(self.request(Method::GET, "/api/appointments")?.query(query))
            .await
    }

    async fn get_appointment(&self, id: i64) -> Result<Appointment, ApiError> {
        self.get(&format!("/api/appointments/{id}")).await
    }

    async fn create_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        self.send(Method::POST, "/api/appointments", request).await
    }

    async fn update_appointment(
        &self,
        id: i64,
        request: &AppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        self.send(Method::PUT, &format!("/api/appointments/{id}"), request)
            .await
    }

    async fn confirm_appointment(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.execute(self.request(Method::POST, &format!("/api/appointments/{id}/confirm"))?)
            .await
    }

    async fn cancel_appointment(
        &self,
        id: i64,
        reason: Option<&str>,
    ) -> Result<MessageResponse, ApiError> {
        let body = CancelRequest {
            reason: reason.map(str::to_string),
        };
        self.send(Method::POST, &format!("/api/appointments/{id}/cancel"), &body)
            .await
    }

    async fn today_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get("/api/appointments/today").await
    }

    async fn appointments_for_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, ApiError> {
        self.get(&format!("/api/appointments/date/{}", format_date(date)))
            .await
    }

    async fn patient_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get("/api/appointments/patient/my-appointments").await
    }

    async fn patient_upcoming_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.get("/api/appointments/patient/upcoming").await
    }
}
