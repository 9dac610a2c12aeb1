use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use surgery_client::config::{self, parse_timeout};
use surgery_client::utils::print_json;
use surgery_client::{
    ApiClient, AppointmentQuery, AppointmentStatus, ChangePasswordRequest, ClientConfig, FileStore,
    LoginRequest, PatientQuery, RegisterRequest, Role, Router, SessionStorage, SeverityLevel, Store,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Command-line client for the surgery scheduling backend", long_about = None)]
struct Args {
    /// Backend base URL
    #[arg(long, env = "SURGERY_API_URL", default_value = config::DEFAULT_API_URL)]
    api_url: String,

    /// File holding the token and user between runs
    #[arg(long, env = "SURGERY_SESSION_FILE", default_value = config::DEFAULT_SESSION_FILE)]
    session_file: PathBuf,

    /// Request timeout in seconds
    #[arg(long, env = "SURGERY_TIMEOUT_SECS", default_value = "10", value_parser = parse_timeout)]
    timeout: Duration,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login { username: String, password: String },
    AdminLogin { username: String, password: String },
    Register {
        username: String,
        password: String,
        email: String,
        real_name: String,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Refresh the signed-in user from the backend
    Me,
    Logout,
    ChangePassword { old_password: String, new_password: String },
    #[command(subcommand)]
    Patients(PatientsCommand),
    #[command(subcommand)]
    Appointments(AppointmentsCommand),
    /// Run the navigation guard for a path and print where it lands
    Navigate { path: String },
}

#[derive(Subcommand, Debug)]
enum PatientsCommand {
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_parser = parse_enum::<SeverityLevel>)]
        severity: Option<SeverityLevel>,
    },
    Get { id: i64 },
    Delete { id: i64 },
    /// The signed-in patient's own record
    Mine,
}

#[derive(Subcommand, Debug)]
enum AppointmentsCommand {
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long, value_parser = parse_enum::<AppointmentStatus>)]
        status: Option<AppointmentStatus>,
        #[arg(long)]
        patient_name: Option<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    Get { id: i64 },
    Today,
    Date { date: NaiveDate },
    Mine,
    Upcoming,
    Confirm { id: i64 },
    Cancel {
        id: i64,
        #[arg(long)]
        reason: Option<String>,
    },
}

/// Accepts `team-confirmed`, `TEAM_CONFIRMED` and the like.
fn parse_enum<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let wire = raw.trim().to_ascii_uppercase().replace('-', "_");
    serde_json::from_value(Value::String(wire)).map_err(|_| format!("unknown value `{raw}`"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ClientConfig::new(&args.api_url)?
        .with_timeout(args.timeout)
        .with_session_file(args.session_file);

    let session = SessionStorage::new(FileStore::open(&config.session_file)?);
    let mut router = Router::new();
    let api = ApiClient::new(&config, session.clone(), router.navigator())?;
    let mut store = Store::new(session);

    match args.command {
        Command::Login { username, password } => {
            let credentials = LoginRequest { username, password };
            print_json(&store.auth.login(&api, &credentials).await)?;
        }
        Command::AdminLogin { username, password } => {
            let credentials = LoginRequest { username, password };
            print_json(&store.auth.admin_login(&api, &credentials).await)?;
        }
        Command::Register {
            username,
            password,
            email,
            real_name,
            role,
            phone,
            department,
        } => {
            let request = RegisterRequest {
                username,
                password,
                email,
                real_name,
                role,
                phone,
                department,
                ..RegisterRequest::default()
            };
            print_json(&store.auth.register(&api, &request).await)?;
        }
        Command::Me => print_json(&store.auth.fetch_current_user(&api).await)?,
        Command::Logout => print_json(&store.auth.logout(&api).await)?,
        Command::ChangePassword {
            old_password,
            new_password,
        } => {
            let passwords = ChangePasswordRequest {
                old_password,
                new_password,
            };
            print_json(&store.auth.change_password(&api, &passwords).await)?;
        }
        Command::Patients(command) => run_patients(command, &mut store, &api).await?,
        Command::Appointments(command) => run_appointments(command, &mut store, &api).await?,
        Command::Navigate { path } => {
            let route = router.navigate(&path, &mut store.auth, &api).await?;
            print_json(&json!({
                "path": route.path,
                "name": route.name,
                "params": route.params,
                "title": router.document_title(),
            }))?;
        }
    }

    if let Some(route) = router.apply_forced_navigation(&mut store.auth, &api).await? {
        tracing::warn!(path = %route.path, "session expired, sign in again");
    }

    Ok(())
}

async fn run_patients(
    command: PatientsCommand,
    store: &mut Store,
    api: &ApiClient,
) -> Result<(), serde_json::Error> {
    let patients = &mut store.patients;
    match command {
        PatientsCommand::List {
            page,
            size,
            search,
            severity,
        } => {
            let query = PatientQuery {
                page,
                size,
                search,
                severity,
            };
            print_json(&patients.fetch_patients(api, &query).await)
        }
        PatientsCommand::Get { id } => print_json(&patients.fetch_patient(api, id).await),
        PatientsCommand::Delete { id } => print_json(&patients.delete_patient(api, id).await),
        PatientsCommand::Mine => print_json(&patients.fetch_my_patient_info(api).await),
    }
}

async fn run_appointments(
    command: AppointmentsCommand,
    store: &mut Store,
    api: &ApiClient,
) -> Result<(), serde_json::Error> {
    let appointments = &mut store.appointments;
    match command {
        AppointmentsCommand::List {
            page,
            size,
            status,
            patient_name,
            from,
            to,
        } => {
            let query = AppointmentQuery {
                page,
                size,
                status,
                patient_name,
                start_date: from,
                end_date: to,
            };
            print_json(&appointments.fetch_appointments(api, &query).await)
        }
        AppointmentsCommand::Get { id } => {
            print_json(&appointments.fetch_appointment(api, id).await)
        }
        AppointmentsCommand::Today => {
            print_json(&appointments.fetch_today_appointments(api).await)
        }
        AppointmentsCommand::Date { date } => {
            print_json(&appointments.fetch_appointments_for_date(api, date).await)
        }
        AppointmentsCommand::Mine => {
            print_json(&appointments.fetch_patient_appointments(api).await)
        }
        AppointmentsCommand::Upcoming => {
            print_json(&appointments.fetch_patient_upcoming_appointments(api).await)
        }
        AppointmentsCommand::Confirm { id } => {
            print_json(&appointments.confirm_appointment(api, id).await)
        }
        AppointmentsCommand::Cancel { id, reason } => {
            print_json(&appointments.cancel_appointment(api, id, reason.as_deref()).await)
        }
    }
}
