use crate::api::PatientsApi;
use crate::models::{ListPayload, Pagination, Patient, PatientQuery};

use super::{ActionResult, Collection};

#[derive(Debug, Default)]
pub struct PatientsPartition {
    state: Collection<Patient>,
}

impl PatientsPartition {
    pub fn patients(&self) -> &[Patient] {
        self.state.items()
    }

    pub fn current_patient(&self) -> Option<&Patient> {
        self.state.current()
    }

    pub fn loading(&self) -> bool {
        self.state.loading()
    }

    pub fn pagination(&self) -> Pagination {
        self.state.pagination()
    }

    /// Direct access to the mutations.
    pub fn state_mut(&mut self) -> &mut Collection<Patient> {
        &mut self.state
    }

    pub async fn fetch_patients<A: PatientsApi + ?Sized>(
        &mut self,
        api: &A,
        query: &PatientQuery,
    ) -> ActionResult<ListPayload<Patient>> {
        self.state.set_loading(true);
        let result = match api.list_patients(query).await {
            Ok(payload) => {
                self.state.set_list(payload.clone());
                ActionResult::ok(payload)
            }
            Err(err) => {
                ActionResult::from_error("patients/fetchPatients", &err, "Failed to load patients")
            }
        };
        self.state.set_loading(false);
        result
    }

    pub async fn fetch_patient<A: PatientsApi + ?Sized>(
        &mut self,
        api: &A,
        id: i64,
    ) -> ActionResult<Patient> {
        match api.get_patient(id).await {
            Ok(patient) => {
                self.state.set_current(Some(patient.clone()));
                ActionResult::ok(patient)
            }
            Err(err) => ActionResult::from_error("patients/fetchPatient", &err, "Failed to load patient"),
        }
    }

    pub async fn create_patient<A: PatientsApi + ?Sized>(
        &mut self,
        api: &A,
        patient: &Patient,
    ) -> ActionResult<Patient> {
        match api.create_patient(patient).await {
            Ok(created) => {
                self.state.add(created.clone());
                ActionResult::ok(created)
            }
            Err(err) => {
                ActionResult::from_error("patients/createPatient", &err, "Failed to create patient")
            }
        }
    }

    pub async fn update_patient<A: PatientsApi + ?Sized>(
        &mut self,
        api: &A,
        id: i64,
        patient: &Patient,
    ) -> ActionResult<Patient> {
        match api.update_patient(id, patient).await {
            Ok(updated) => {
                self.state.replace_by_id(updated.clone());
                ActionResult::ok(updated)
            }
            Err(err) => {
                ActionResult::from_error("patients/updatePatient", &err, "Failed to update patient")
            }
        }
    }

    pub async fn delete_patient<A: PatientsApi + ?Sized>(
        &mut self,
        api: &A,
        id: i64,
    ) -> ActionResult<()> {
        match api.delete_patient(id).await {
            Ok(_) => {
                self.state.remove_by_id(id);
                ActionResult::done()
            }
            Err(err) => {
                ActionResult::from_error("patients/deletePatient", &err, "Failed to delete patient")
            }
        }
    }

    pub async fn fetch_my_patient_info<A: PatientsApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> ActionResult<Patient> {
        match api.my_patient_info().await {
            Ok(patient) => {
                self.state.set_current(Some(patient.clone()));
                ActionResult::ok(patient)
            }
            Err(err) => ActionResult::from_error(
                "patients/getMyPatientInfo",
                &err,
                "Failed to load your patient record",
            ),
        }
    }
}
