use chrono::NaiveDate;

use crate::api::AppointmentsApi;
use crate::error::ApiError;
use crate::models::{
    Appointment, AppointmentQuery, AppointmentRequest, ListPayload, MessageResponse, Pagination,
};
use crate::utils;

use super::{ActionResult, Collection};

#[derive(Debug, Default)]
pub struct AppointmentsPartition {
    state: Collection<Appointment>,
}

impl AppointmentsPartition {
    pub fn appointments(&self) -> &[Appointment] {
        self.state.items()
    }

    pub fn current_appointment(&self) -> Option<&Appointment> {
        self.state.current()
    }

    pub fn loading(&self) -> bool {
        self.state.loading()
    }

    pub fn pagination(&self) -> Pagination {
        self.state.pagination()
    }

    pub fn state_mut(&mut self) -> &mut Collection<Appointment> {
        &mut self.state
    }

    /// Loaded appointments planned for today's local date.
    pub fn today_appointments(&self) -> Vec<&Appointment> {
        self.appointments_on(&utils::today())
    }

    /// Loaded appointments whose `plannedDate` is exactly `date`.
    pub fn appointments_on(&self, date: &str) -> Vec<&Appointment> {
        self.state
            .items()
            .iter()
            .filter(|apt| apt.planned_date == date)
            .collect()
    }

    pub async fn fetch_appointments<A: AppointmentsApi + ?Sized>(
        &mut self,
        api: &A,
        query: &AppointmentQuery,
    ) -> ActionResult<ListPayload<Appointment>> {
        self.state.set_loading(true);
        let result = match api.list_appointments(query).await {
            Ok(payload) => {
                self.state.set_list(payload.clone());
                ActionResult::ok(payload)
            }
            Err(err) => ActionResult::from_error(
                "appointments/fetchAppointments",
                &err,
                "Failed to load appointments",
            ),
        };
        self.state.set_loading(false);
        result
    }

    pub async fn fetch_appointment<A: AppointmentsApi + ?Sized>(
        &mut self,
        api: &A,
        id: i64,
    ) -> ActionResult<Appointment> {
        match api.get_appointment(id).await {
            Ok(appointment) => {
                self.state.set_current(Some(appointment.clone()));
                ActionResult::ok(appointment)
            }
            Err(err) => ActionResult::from_error(
                "appointments/fetchAppointment",
                &err,
                "Failed to load appointment",
            ),
        }
    }

    pub async fn create_appointment<A: AppointmentsApi + ?Sized>(
        &mut self,
        api: &A,
        request: &AppointmentRequest,
    ) -> ActionResult<Appointment> {
        match api.create_appointment(request).await {
            Ok(created) => {
                self.state.add(created.clone());
                ActionResult::ok(created)
            }
            Err(err) => ActionResult::from_error(
                "appointments/createAppointment",
                &err,
                "Failed to create appointment",
            ),
        }
    }

    pub async fn update_appointment<A: AppointmentsApi + ?Sized>(
        &mut self,
        api: &A,
        id: i64,
        request: &AppointmentRequest,
    ) -> ActionResult<Appointment> {
        match api.update_appointment(id, request).await {
            Ok(updated) => {
                self.state.replace_by_id(updated.clone());
                ActionResult::ok(updated)
            }
            Err(err) => ActionResult::from_error(
                "appointments/updateAppointment",
                &err,
                "Failed to update appointment",
            ),
        }
    }

    pub async fn confirm_appointment<A: AppointmentsApi + ?Sized>(
        &mut self,
        api: &A,
        id: i64,
    ) -> ActionResult<MessageResponse> {
        match api.confirm_appointment(id).await {
            Ok(response) => ActionResult::ok(response),
            Err(err) => ActionResult::from_error(
                "appointments/confirmAppointment",
                &err,
                "Failed to confirm appointment",
            ),
        }
    }

    pub async fn cancel_appointment<A: AppointmentsApi + ?Sized>(
        &mut self,
        api: &A,
        id: i64,
        reason: Option<&str>,
    ) -> ActionResult<MessageResponse> {
        match api.cancel_appointment(id, reason).await {
            Ok(response) => ActionResult::ok(response),
            Err(err) => ActionResult::from_error(
                "appointments/cancelAppointment",
                &err,
                "Failed to cancel appointment",
            ),
        }
    }

    pub async fn fetch_today_appointments<A: AppointmentsApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> ActionResult<Vec<Appointment>> {
        let outcome = api.today_appointments().await;
        self.replace_list(
            outcome,
            "appointments/getTodayAppointments",
            "Failed to load today's appointments",
        )
    }

    pub async fn fetch_appointments_for_date<A: AppointmentsApi + ?Sized>(
        &mut self,
        api: &A,
        date: NaiveDate,
    ) -> ActionResult<Vec<Appointment>> {
        let outcome = api.appointments_for_date(date).await;
        self.replace_list(
            outcome,
            "appointments/getAppointmentsForDate",
            "Failed to load appointments for that date",
        )
    }

    pub async fn fetch_patient_appointments<A: AppointmentsApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> ActionResult<Vec<Appointment>> {
        let outcome = api.patient_appointments().await;
        self.replace_list(
            outcome,
            "appointments/getPatientAppointments",
            "Failed to load your appointments",
        )
    }

    pub async fn fetch_patient_upcoming_appointments<A: AppointmentsApi + ?Sized>(
        &mut self,
        api: &A,
    ) -> ActionResult<Vec<Appointment>> {
        let outcome = api.patient_upcoming_appointments().await;
        self.replace_list(
            outcome,
            "appointments/getPatientUpcomingAppointments",
            "Failed to load upcoming appointments",
        )
    }

    fn replace_list(
        &mut self,
        outcome: Result<Vec<Appointment>, ApiError>,
        action: &'static str,
        fallback: &str,
    ) -> ActionResult<Vec<Appointment>> {
        match outcome {
            Ok(appointments) => {
                self.state.set_list(ListPayload::Bare(appointments.clone()));
                ActionResult::ok(appointments)
            }
            Err(err) => ActionResult::from_error(action, &err, fallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_appointment, StubAppointments};

    fn partition_with(dates: &[&str]) -> AppointmentsPartition {
        let mut partition = AppointmentsPartition::default();
        let records = dates
            .iter()
            .enumerate()
            .map(|(i, date)| sample_appointment(i as i64 + 1, date))
            .collect();
        partition.state_mut().set_list(ListPayload::Bare(records));
        partition
    }

    #[test]
    fn appointments_on_matches_the_exact_date_string() {
        let partition = partition_with(&["2024-06-01", "2024-06-02", "2024-06-01", "2024-6-01", ""]);

        let ids: Vec<i64> = partition.appointments_on("2024-06-01").iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(partition.appointments_on("2030-01-01").is_empty());
    }

    #[test]
    fn today_appointments_uses_local_date() {
        let today = utils::today();
        let partition = partition_with(&["1999-12-31", &today, "2999-01-01", &today]);

        let ids: Vec<i64> = partition.today_appointments().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[tokio::test]
    async fn list_queries_replace_the_list_and_keep_pagination() {
        let mut partition = AppointmentsPartition::default();
        let api = StubAppointments::with(vec![
            sample_appointment(1, "2024-01-01"),
            sample_appointment(2, "2024-01-02"),
        ]);

        let paged = partition
            .fetch_appointments(&api, &AppointmentQuery::default())
            .await;
        assert!(paged.success);
        assert!(!partition.loading());
        assert_eq!(partition.pagination().total, 2);

        let bare = partition.fetch_patient_appointments(&api).await;
        assert!(bare.success);
        assert_eq!(partition.appointments().len(), 2);
        assert_eq!(partition.pagination().total, 2);
    }

    #[tokio::test]
    async fn failures_keep_state_and_report_fallback() {
        let mut partition = partition_with(&["2024-01-01"]);
        let api = StubAppointments::failing();

        let result = partition.fetch_today_appointments(&api).await;
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("Failed to load today's appointments"));
        assert_eq!(partition.appointments().len(), 1);

        let result = partition
            .fetch_appointments(&api, &AppointmentQuery::default())
            .await;
        assert!(!result.success);
        assert!(!partition.loading());
    }

    #[tokio::test]
    async fn create_prepends_and_update_replaces() {
        let mut partition = partition_with(&["2024-01-01"]);
        let api = StubAppointments::with(Vec::new());
        let request = AppointmentRequest {
            patient_id: 1,
            surgery_name: "Appendectomy".into(),
            planned_date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
            ..AppointmentRequest::default()
        };

        let created = partition.create_appointment(&api, &request).await;
        assert!(created.success);
        assert_eq!(partition.appointments()[0].planned_date, "2024-02-02");

        let updated = partition.update_appointment(&api, 1, &request).await;
        assert!(updated.success);
        assert_eq!(partition.appointments()[1].surgery_name.as_deref(), Some("Appendectomy"));
        assert_eq!(partition.appointments().len(), 2);
    }
}
