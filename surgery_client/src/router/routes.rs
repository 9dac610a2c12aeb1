use std::collections::BTreeMap;

use crate::models::Role;

const STAFF: &[Role] = &[Role::Doctor, Role::Nurse, Role::Anesthesiologist, Role::Admin];
const EVERYONE: &[Role] = &[
    Role::Doctor,
    Role::Nurse,
    Role::Anesthesiologist,
    Role::Patient,
    Role::Admin,
];
const DOCTOR_OR_ADMIN: &[Role] = &[Role::Doctor, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const PATIENT_ONLY: &[Role] = &[Role::Patient];

/// Screen a route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Root,
    Login,
    AdminLogin,
    Register,
    PatientDashboard,
    PatientInfo,
    PatientAppointments,
    PatientNotifications,
    PatientHelp,
    PatientProfile,
    Dashboard,
    PatientList,
    PatientForm,
    PatientDetail,
    AppointmentList,
    AppointmentForm,
    AppointmentCalendar,
    AppointmentDetail,
    Schedule,
    Rooms,
    UserManagement,
    Profile,
    NotificationList,
    NotificationDetail,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMeta {
    pub title: Option<&'static str>,
    pub requires_auth: bool,
    /// `None` admits every authenticated role.
    pub roles: Option<&'static [Role]>,
}

impl RouteMeta {
    const fn public(title: &'static str) -> Self {
        Self {
            title: Some(title),
            requires_auth: false,
            roles: None,
        }
    }

    const fn private(title: Option<&'static str>, roles: Option<&'static [Role]>) -> Self {
        Self {
            title,
            requires_auth: true,
            roles,
        }
    }

    /// Parent metadata overlaid with the child's; set child fields win.
    const fn child(self, title: &'static str, roles: Option<&'static [Role]>) -> Self {
        Self {
            title: Some(title),
            requires_auth: self.requires_auth,
            roles: match roles {
                Some(roles) => Some(roles),
                None => self.roles,
            },
        }
    }

    pub fn admits(&self, role: Role) -> bool {
        self.roles.map_or(true, |roles| roles.contains(&role))
    }
}

#[derive(Debug)]
pub struct Route {
    pub pattern: &'static str,
    pub name: Option<&'static str>,
    pub view: View,
    pub meta: RouteMeta,
}

const DASHBOARD: RouteMeta = RouteMeta::private(Some("Dashboard"), Some(STAFF));
const PATIENT_PAGE: RouteMeta = RouteMeta::private(None, Some(PATIENT_ONLY));

const fn route(
    pattern: &'static str,
    name: &'static str,
    view: View,
    meta: RouteMeta,
) -> Route {
    Route {
        pattern,
        name: Some(name),
        view,
        meta,
    }
}

const fn unnamed(pattern: &'static str, view: View, meta: RouteMeta) -> Route {
    Route {
        pattern,
        name: None,
        view,
        meta,
    }
}

/// Matched top to bottom.
pub static ROUTES: &[Route] = &[
    unnamed("/", View::Root, RouteMeta::private(None, None)),
    route("/login", "Login", View::Login, RouteMeta::public("Login")),
    route(
        "/admin-login",
        "AdminLogin",
        View::AdminLogin,
        RouteMeta::public("Administrator Login"),
    ),
    route("/register", "Register", View::Register, RouteMeta::public("Register")),
    route(
        "/patient-dashboard",
        "PatientDashboard",
        View::PatientDashboard,
        RouteMeta::private(Some("Patient Dashboard"), Some(PATIENT_ONLY)),
    ),
    unnamed("/patient-dashboard/info", View::PatientInfo, PATIENT_PAGE),
    unnamed(
        "/patient-dashboard/appointments",
        View::PatientAppointments,
        PATIENT_PAGE,
    ),
    unnamed(
        "/patient-dashboard/notifications",
        View::PatientNotifications,
        PATIENT_PAGE,
    ),
    unnamed("/patient-dashboard/help", View::PatientHelp, PATIENT_PAGE),
    route(
        "/patient-profile",
        "PatientProfile",
        View::PatientProfile,
        RouteMeta::private(Some("My Profile"), Some(PATIENT_ONLY)),
    ),
    route("/dashboard", "Dashboard", View::Dashboard, DASHBOARD),
    route(
        "/patients",
        "Patients",
        View::PatientList,
        DASHBOARD.child("Patients", Some(DOCTOR_OR_ADMIN)),
    ),
    route(
        "/patients/create",
        "CreatePatient",
        View::PatientForm,
        DASHBOARD.child("Add Patient", Some(ADMIN_ONLY)),
    ),
    route(
        "/patients/:id/edit",
        "EditPatient",
        View::PatientForm,
        DASHBOARD.child("Edit Patient", Some(DOCTOR_OR_ADMIN)),
    ),
    route(
        "/patients/:id",
        "PatientDetail",
        View::PatientDetail,
        DASHBOARD.child("Patient Details", Some(DOCTOR_OR_ADMIN)),
    ),
    route(
        "/appointments",
        "Appointments",
        View::AppointmentList,
        DASHBOARD.child("Surgery Appointments", Some(EVERYONE)),
    ),
    route(
        "/appointments/create",
        "CreateAppointment",
        View::AppointmentForm,
        DASHBOARD.child("New Appointment", Some(DOCTOR_OR_ADMIN)),
    ),
    route(
        "/appointments/calendar",
        "AppointmentCalendar",
        View::AppointmentCalendar,
        DASHBOARD.child("Surgery Calendar", Some(EVERYONE)),
    ),
    route(
        "/appointments/:id",
        "AppointmentDetail",
        View::AppointmentDetail,
        DASHBOARD.child("Appointment Details", Some(EVERYONE)),
    ),
    route(
        "/appointments/:id/edit",
        "EditAppointment",
        View::AppointmentForm,
        DASHBOARD.child("Edit Appointment", Some(DOCTOR_OR_ADMIN)),
    ),
    route(
        "/schedule",
        "Schedule",
        View::Schedule,
        DASHBOARD.child("Staff Schedule", None),
    ),
    route(
        "/rooms",
        "Rooms",
        View::Rooms,
        DASHBOARD.child("Operating Rooms", None),
    ),
    route(
        "/user-management",
        "UserManagement",
        View::UserManagement,
        DASHBOARD.child("User Management", Some(ADMIN_ONLY)),
    ),
    route(
        "/profile",
        "Profile",
        View::Profile,
        DASHBOARD.child("Personal Info", None),
    ),
    route(
        "/notifications",
        "Notifications",
        View::NotificationList,
        DASHBOARD.child("Notifications", Some(EVERYONE)),
    ),
    route(
        "/notifications/:id",
        "NotificationDetail",
        View::NotificationDetail,
        DASHBOARD.child("Notification Details", Some(EVERYONE)),
    ),
];

/// Anything no entry of [`ROUTES`] matches.
pub static NOT_FOUND: Route = route(
    "/:pathMatch*",
    "NotFound",
    View::NotFound,
    RouteMeta::private(Some("Page Not Found"), None),
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub path: String,
    pub name: Option<&'static str>,
    pub view: View,
    pub meta: RouteMeta,
    pub params: BTreeMap<&'static str, String>,
}

impl ResolvedRoute {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Strips query string, fragment and trailing slashes.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn match_pattern(pattern: &'static str, path: &str) -> Option<BTreeMap<&'static str, String>> {
    let expected: Vec<&'static str> = pattern.split('/').collect();
    let actual: Vec<&str> = path.split('/').collect();
    if expected.len() != actual.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (want, got) in expected.into_iter().zip(actual) {
        match want.strip_prefix(':') {
            Some(name) if !got.is_empty() => {
                params.insert(name, got.to_string());
            }
            Some(_) => return None,
            None if want == got => {}
            None => return None,
        }
    }
    Some(params)
}

pub fn resolve(path: &str) -> ResolvedRoute {
    let path = normalize_path(path);
    let (route, params) = ROUTES
        .iter()
        .find_map(|route| match_pattern(route.pattern, &path).map(|params| (route, params)))
        .unwrap_or_else(|| (&NOT_FOUND, BTreeMap::new()));

    ResolvedRoute {
        name: route.name,
        view: route.view,
        meta: route.meta,
        params,
        path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_segments_win_over_params() {
        assert_eq!(resolve("/patients/create").view, View::PatientForm);
        assert_eq!(resolve("/appointments/calendar").view, View::AppointmentCalendar);

        let detail = resolve("/appointments/42");
        assert_eq!(detail.view, View::AppointmentDetail);
        assert_eq!(detail.param("id"), Some("42"));

        let edit = resolve("/patients/7/edit?tab=history");
        assert_eq!(edit.name, Some("EditPatient"));
        assert_eq!(edit.param("id"), Some("7"));
        assert_eq!(edit.path, "/patients/7/edit");
    }

    #[test]
    fn unknown_paths_hit_the_protected_catch_all() {
        let route = resolve("/no/such/page");
        assert_eq!(route.view, View::NotFound);
        assert!(route.meta.requires_auth);
        assert_eq!(route.meta.roles, None);
    }

    #[test]
    fn only_the_entry_pages_are_public() {
        let public: Vec<&str> = ROUTES
            .iter()
            .filter(|route| !route.meta.requires_auth)
            .map(|route| route.pattern)
            .collect();
        assert_eq!(public, vec!["/login", "/admin-login", "/register"]);
    }

    #[test]
    fn dashboard_children_inherit_staff_roles() {
        let schedule = resolve("/schedule").meta;
        assert_eq!(schedule.title, Some("Staff Schedule"));
        assert!(schedule.admits(Role::Nurse));
        assert!(!schedule.admits(Role::Patient));

        let appointments = resolve("/appointments").meta;
        assert!(appointments.admits(Role::Patient));
        assert!(!resolve("/user-management").meta.admits(Role::Doctor));
    }

    #[test]
    fn patient_sub_pages_admit_only_patients() {
        let info = resolve("/patient-dashboard/info/").meta;
        assert_eq!(info.roles, Some(PATIENT_ONLY));
        assert_eq!(info.title, None);
        assert!(!info.admits(Role::Admin));
    }

    #[test]
    fn paths_are_normalized() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/#top"), "/");
        assert_eq!(normalize_path("dashboard/"), "/dashboard");
        assert_eq!(normalize_path("/patients?page=2"), "/patients");
    }
}
