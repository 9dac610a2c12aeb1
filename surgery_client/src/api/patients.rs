use async_trait::async_trait;
use reqwest::Method;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{ListPayload, MessageResponse, Patient, PatientQuery};

#[async_trait]
pub trait PatientsApi: Send + Sync {
    async fn list_patients(&self, query: &PatientQuery) -> Result<ListPayload<Patient>, ApiError>;
    async fn get_patient(&self, id: i64) -> Result<Patient, ApiError>;
    async fn create_patient(&self, patient: &Patient) -> Result<Patient, ApiError>;
    async fn update_patient(&self, id: i64, patient: &Patient) -> Result<Patient, ApiError>;
    async fn delete_patient(&self, id: i64) -> Result<MessageResponse, ApiError>;
    /// The latest patient record owned by the logged-in patient.
    async fn my_patient_info(&self) -> Result<Patient, ApiError>;
}

#[async_trait]
impl PatientsApi for ApiClient {
    async fn list_patients(&self, query: &PatientQuery) -> Result<ListPayload<Patient>, ApiError> {
        self.execute(self.request(Method::GET, "/api/patients")?.query(query))
            .await
    }

    async fn get_patient(&self, id: i64) -> Result<Patient, ApiError> {
        self.get(&format!("/api/patients/{id}")).await
    }

    async fn create_patient(&self, patient: &Patient) -> Result<Patient, ApiError> {
        self.send(Method::POST, "/api/patients", patient).await
    }

    async fn update_patient(&self, id: i64, patient: &Patient) -> Result<Patient, ApiError> {
        self.send(Method::PUT, &format!("/api/patients/{id}"), patient)
            .await
    }

    async fn delete_patient(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.execute(self.request(Method::DELETE, &format!("/api/patients/{id}"))?)
            .await
    }

    async fn my_patient_info(&self) -> Result<Patient, ApiError> {
        self.get("/api/patients/my-info").await
    }
}
