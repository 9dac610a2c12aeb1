use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use surgery_client::{Appointment, Patient, RegisterRequest, User};

use crate::errors::AppError;

/// Stored user with its bcrypt hash. The hash never leaves the server.
#[derive(Clone, Debug)]
pub struct Account {
    pub user: User,
    pub password_hash: String,
}

/// In-memory tables shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub accounts: Arc<DashMap<i64, Account>>,
    usernames: Arc<DashMap<String, i64>>,
    pub patients: Arc<DashMap<i64, Patient>>,
    pub appointments: Arc<DashMap<i64, Appointment>>,
    pub jwt_secret: Arc<str>,
    pub bcrypt_cost: u32,
    next_id: Arc<AtomicI64>,
}

impl AppState {
    pub fn new(jwt_secret: &str, bcrypt_cost: u32) -> Self {
        AppState {
            accounts: Arc::new(DashMap::new()),
            usernames: Arc::new(DashMap::new()),
            patients: Arc::new(DashMap::new()),
            appointments: Arc::new(DashMap::new()),
            jwt_secret: Arc::from(jwt_secret),
            bcrypt_cost,
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    pub fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn account_by_username(&self, username: &str) -> Option<Account> {
        let id = self.usernames.get(username).map(|entry| *entry.value())?;
        self.accounts.get(&id).map(|entry| entry.value().clone())
    }

    pub fn user(&self, id: i64) -> Option<User> {
        self.accounts.get(&id).map(|entry| entry.user.clone())
    }

    /// Hashes the password and stores a new account. Usernames are unique:
    /// the name is claimed in the index and the account inserted while the
    /// index entry is held.
    pub fn create_account(&self, request: &RegisterRequest) -> Result<User, AppError> {
        if request.username.trim().is_empty() || request.password.is_empty() {
            return Err(AppError::BadRequest(
                "Username and password are required".into(),
            ));
        }
        let password_hash = bcrypt::hash(&request.password, self.bcrypt_cost)?;

        let Entry::Vacant(slot) = self.usernames.entry(request.username.clone()) else {
            return Err(AppError::BadRequest("Username already exists".into()));
        };
        let user = User {
            id: self.next_id(),
            username: request.username.clone(),
            email: Some(request.email.clone()),
            real_name: Some(request.real_name.clone()),
            phone: request.phone.clone(),
            role: request.role.unwrap_or(surgery_client::Role::Patient),
            gender: request.gender.clone(),
            birth_date: request.birth_date,
            department: request.department.clone(),
            professional_title: request.professional_title.clone(),
            license_number: request.license_number.clone(),
            is_active: true,
        };
        self.accounts.insert(
            user.id,
            Account {
                user: user.clone(),
                password_hash,
            },
        );
        slot.insert(user.id);
        Ok(user)
    }

    /// Replaces the stored hash. Returns false when the account is gone.
    pub fn set_password_hash(&self, id: i64, password_hash: String) -> bool {
        match self.accounts.get_mut(&id) {
            Some(mut account) => {
                account.password_hash = password_hash;
                true
            }
            None => false,
        }
    }

    /// The patient record owned by `user_id`, newest first when there are several.
    pub fn patient_for_user(&self, user_id: i64) -> Option<Patient> {
        self.patients
            .iter()
            .filter(|entry| entry.user.as_ref().map(|u| u.id) == Some(user_id))
            .max_by_key(|entry| entry.id)
            .map(|entry| entry.value().clone())
    }

    pub fn set_patient_status(&self, patient_id: i64, status: &str) {
        if let Some(mut patient) = self.patients.get_mut(&patient_id) {
            patient.status = Some(status.to_string());
            patient.updated_at = Some(chrono::Local::now().naive_local());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surgery_client::Role;

    fn request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: "pw".into(),
            email: format!("{username}@hospital.test"),
            real_name: username.to_uppercase(),
            ..RegisterRequest::default()
        }
    }

    #[test]
    fn accounts_get_unique_ids_and_names() {
        let state = AppState::new("secret", 4);

        let first = state.create_account(&request("ann")).unwrap();
        let second = state.create_account(&request("bob")).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.role, Role::Patient);

        let duplicate = state.create_account(&request("ann")).unwrap_err();
        assert_eq!(duplicate.to_string(), "Username already exists");
    }

    #[test]
    fn concurrent_registrations_keep_usernames_unique() {
        let state = AppState::new("secret", 4);
        let barrier = std::sync::Barrier::new(2);

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        state.create_account(&request("twin"))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(state.accounts.len(), 1);
        let winner = results.into_iter().find_map(Result::ok).unwrap();
        assert_eq!(state.account_by_username("twin").unwrap().user.id, winner.id);
    }

    #[test]
    fn password_hash_can_be_replaced() {
        let state = AppState::new("secret", 4);
        let user = state.create_account(&request("ann")).unwrap();

        let hash = bcrypt::hash("new-pw", 4).unwrap();
        assert!(state.set_password_hash(user.id, hash));
        assert!(!state.set_password_hash(9_999, String::new()));

        let account = state.account_by_username("ann").unwrap();
        assert!(bcrypt::verify("new-pw", &account.password_hash).unwrap());
    }

    #[test]
    fn stored_hash_verifies() {
        let state = AppState::new("secret", 4);
        state.create_account(&request("ann")).unwrap();

        let account = state.account_by_username("ann").unwrap();
        assert!(bcrypt::verify("pw", &account.password_hash).unwrap());
    }
}
