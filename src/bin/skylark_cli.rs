use clap::Parser;
use serde_json::json;
use std::env;

use skylark_rs::app::{Action, AppStore, Outcome};
use skylark_rs::client::{CmsClient, SyncConfig};
use skylark_rs::export;
use skylark_rs::location::{self, CommandLocationProvider};
use skylark_rs::models::{
    MetadataPatch, SessionType, SightingDraft, SightingPatch, Species, SyncStatus, UserAccount,
};
use skylark_rs::ui;
use skylark_rs::views;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, rename_all = "snake_case")]
struct Args {
    /// Command to execute: start_session, list_sessions, show_session, record, record_interactive, edit_sighting, remove_sighting, finish_session, resume_session, update_metadata, delete_session, locate, report, export, import, species, add_species, set_user, clear_user, validate_credentials, sync_session, last_active, close
    #[arg(short, long)]
    command: String,

    /// Database path (or set SKYLARK_DB_PATH env var)
    #[arg(long, name = "db_path")]
    db_path: Option<String>,

    /// Session ID (required for session-scoped commands)
    #[arg(long, name = "session_id")]
    session_id: Option<String>,

    /// Session type: trip or counting (for start_session)
    #[arg(long, name = "session_type", default_value = "trip")]
    session_type: String,

    /// Session name (for start_session and update_metadata)
    #[arg(long)]
    name: Option<String>,

    /// Location name (for start_session and update_metadata)
    #[arg(long)]
    location: Option<String>,

    /// Session date as YYYY-MM-DD
    #[arg(long, name = "session_date")]
    session_date: Option<String>,

    /// Start time as HH:MM
    #[arg(long, name = "start_time")]
    start_time: Option<String>,

    /// Observers (free text)
    #[arg(long)]
    observers: Option<String>,

    /// Session notes (for update_metadata)
    #[arg(long)]
    notes: Option<String>,

    /// Latitude (for start_session)
    #[arg(long)]
    latitude: Option<f64>,

    /// Longitude (for start_session)
    #[arg(long)]
    longitude: Option<f64>,

    /// Species ID (for record and add_species)
    #[arg(long, name = "species_id")]
    species_id: Option<String>,

    /// Sighting ID (for edit_sighting and remove_sighting)
    #[arg(long, name = "sighting_id")]
    sighting_id: Option<String>,

    /// Count for record (default 1); replacement count for edit_sighting
    #[arg(long)]
    count: Option<i64>,

    /// Categorical codes, validated against the configured code lists
    #[arg(long)]
    age: Option<String>,

    #[arg(long)]
    sex: Option<String>,

    #[arg(long)]
    direction: Option<String>,

    #[arg(long)]
    distance: Option<String>,

    #[arg(long)]
    morph: Option<String>,

    /// Bird status code (flying, resting, ...)
    #[arg(long, name = "bird_status")]
    bird_status: Option<String>,

    #[arg(long, name = "count_type")]
    count_type: Option<String>,

    /// Free-text comment on a sighting
    #[arg(long)]
    comment: Option<String>,

    /// Replacement time of day HH:MM for edit_sighting; the sighting keeps
    /// its original date
    #[arg(long, name = "time_of_day")]
    time_of_day: Option<String>,

    /// Weather fields (for update_metadata)
    #[arg(long)]
    temperature: Option<String>,

    #[arg(long, name = "cloud_cover")]
    cloud_cover: Option<String>,

    #[arg(long, name = "wind_speed")]
    wind_speed: Option<String>,

    #[arg(long)]
    precipitation: Option<String>,

    /// Search term (for species)
    #[arg(long)]
    search: Option<String>,

    /// Export format: csv, json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Output file for export (stdout when omitted)
    #[arg(long)]
    output: Option<String>,

    /// Input file for import
    #[arg(long)]
    input: Option<String>,

    /// CMS site URL (for set_user)
    #[arg(long, name = "website_url")]
    website_url: Option<String>,

    /// CMS username (for set_user)
    #[arg(long)]
    username: Option<String>,

    /// CMS application password (for set_user)
    #[arg(long, name = "app_password")]
    app_password: Option<String>,

    /// Species abbreviation (for add_species)
    #[arg(long)]
    abbreviation: Option<String>,

    /// Species family (for add_species)
    #[arg(long)]
    family: Option<String>,

    /// Log level
    #[arg(long, name = "log_level", default_value = "info")]
    log_level: String,
}

// example usage:
// skylark_cli --command start_session --name "Autumn count" --location "North dune" --session_date 2025-10-04 --start_time 07:30 --observers "JV, MK" --session_type counting
// skylark_cli --command record --session_id <id> --species_id skylark --count 3 --direction SW --age adult
// skylark_cli --command record_interactive --session_id <id>
// skylark_cli --command edit_sighting --session_id <id> --sighting_id <sid> --count 4 --time_of_day 06:15
// skylark_cli --command finish_session --session_id <id>
// skylark_cli --command report --session_id <id>
// skylark_cli --command export --session_id <id> --format csv --output session.csv
// skylark_cli --command import --input session.json
// skylark_cli --command set_user --website_url https://example.org --username warden --app_password "abcd efgh"
// skylark_cli --command sync_session --session_id <id>

fn resolve_db_path(args: &Args) -> String {
    args.db_path.clone().unwrap_or_else(|| {
        env::var("SKYLARK_DB_PATH").unwrap_or_else(|_| "skylark.db".to_string())
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(format!("skylark_rs={}", args.log_level))
        .init();

    let db_path = resolve_db_path(&args);
    let mut app = AppStore::open(&db_path)?;

    match args.command.as_str() {
        "start_session" => {
            let name = args.name.expect("name required for start_session");
            let location = args.location.expect("location required for start_session");
            let session_date = args
                .session_date
                .expect("session_date required for start_session");
            let start_time = args
                .start_time
                .expect("start_time required for start_session");

            let outcome = app.dispatch(Action::CreateSession {
                session_type: SessionType::from(args.session_type.as_str()),
                name,
                location,
                date: session_date,
                start_time,
                observers: args.observers.unwrap_or_default(),
                latitude: args.latitude,
                longitude: args.longitude,
            });
            match outcome {
                Ok(Outcome::SessionCreated(id)) => {
                    println!("Session started");
                    println!("{}", json!({ "id": id }));
                }
                Ok(_) => unreachable!("start_session dispatches CreateSession"),
                Err(e) => {
                    eprintln!("Failed to start session: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "list_sessions" => {
            let sessions: Vec<serde_json::Value> = app
                .sessions()
                .iter()
                .map(|s| {
                    json!({
                        "id": s.id,
                        "name": s.name,
                        "location": s.location,
                        "date": s.date,
                        "status": s.status,
                        "sync_status": s.sync_status,
                        "sightings": s.sightings.len(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        "show_session" => {
            let session_id = args.session_id.expect("session_id required for show_session");
            match app.session(&session_id) {
                Some(session) => println!("{}", serde_json::to_string_pretty(session)?),
                None => {
                    eprintln!("No session with id {}", session_id);
                    std::process::exit(1);
                }
            }
        }
        "record" => {
            let session_id = args.session_id.expect("session_id required for record");
            let species_id = args.species_id.expect("species_id required for record");

            let outcome = app.dispatch(Action::RecordSighting {
                session_id,
                draft: SightingDraft {
                    species_id,
                    count: args.count.unwrap_or(1),
                    latitude: args.latitude,
                    longitude: args.longitude,
                    direction: args.direction,
                    age: args.age,
                    sex: args.sex,
                    morph: args.morph,
                    distance: args.distance,
                    status: args.bird_status,
                    count_type: args.count_type,
                    comment: args.comment,
                },
            });
            match outcome {
                Ok(Outcome::SightingRecorded(sighting)) => {
                    println!("{}", serde_json::to_string_pretty(&sighting)?);
                }
                Ok(_) => unreachable!("record dispatches RecordSighting"),
                Err(e) => {
                    eprintln!("Failed to record sighting: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "record_interactive" => {
            let session_id = args
                .session_id
                .expect("session_id required for record_interactive");
            let Some(session) = app.session(&session_id).cloned() else {
                eprintln!("No session with id {}", session_id);
                std::process::exit(1);
            };

            let catalogue = app.settings().species.clone();
            let chosen = ui::run_species_selector(catalogue, session).await?;
            match chosen {
                Some(species) => {
                    let outcome = app.dispatch(Action::RecordSighting {
                        session_id,
                        draft: SightingDraft {
                            species_id: species.id.clone(),
                            count: args.count.unwrap_or(1),
                            ..SightingDraft::default()
                        },
                    });
                    match outcome {
                        Ok(Outcome::SightingRecorded(sighting)) => {
                            println!("Recorded {} x {}", sighting.count, species.name);
                        }
                        Ok(_) => unreachable!("record_interactive dispatches RecordSighting"),
                        Err(e) => {
                            eprintln!("Failed to record sighting: {}", e);
                            std::process::exit(1);
                        }
                    }
                }
                None => println!("Cancelled"),
            }
        }
        "edit_sighting" => {
            let session_id = args.session_id.expect("session_id required for edit_sighting");
            let sighting_id = args
                .sighting_id
                .expect("sighting_id required for edit_sighting");

            let outcome = app.dispatch(Action::EditSighting {
                session_id,
                sighting_id: sighting_id.clone(),
                patch: SightingPatch {
                    time_of_day: args.time_of_day,
                    count: args.count,
                    direction: args.direction,
                    age: args.age,
                    sex: args.sex,
                    morph: args.morph,
                    distance: args.distance,
                    status: args.bird_status,
                    count_type: args.count_type,
                    comment: args.comment,
                },
            });
            match outcome {
                Ok(Outcome::SightingEdited(true)) => println!("Sighting updated"),
                Ok(Outcome::SightingEdited(false)) => {
                    eprintln!("No sighting with id {}", sighting_id);
                    std::process::exit(1);
                }
                Ok(_) => unreachable!("edit_sighting dispatches EditSighting"),
                Err(e) => {
                    eprintln!("Failed to edit sighting: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "remove_sighting" => {
            let session_id = args
                .session_id
                .expect("session_id required for remove_sighting");
            let sighting_id = args
                .sighting_id
                .expect("sighting_id required for remove_sighting");

            let outcome = app.dispatch(Action::RemoveSighting {
                session_id,
                sighting_id: sighting_id.clone(),
            });
            match outcome {
                Ok(Outcome::SightingRemoved(true)) => println!("Sighting removed"),
                Ok(Outcome::SightingRemoved(false)) => {
                    eprintln!("No sighting with id {}", sighting_id);
                    std::process::exit(1);
                }
                Ok(_) => unreachable!("remove_sighting dispatches RemoveSighting"),
                Err(e) => {
                    eprintln!("Failed to remove sighting: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "finish_session" => {
            let session_id = args
                .session_id
                .expect("session_id required for finish_session");
            if let Err(e) = app.dispatch(Action::FinishSession { session_id }) {
                eprintln!("Failed to finish session: {}", e);
                std::process::exit(1);
            }
            println!("Session finished");
        }
        "resume_session" => {
            let session_id = args
                .session_id
                .expect("session_id required for resume_session");
            if let Err(e) = app.dispatch(Action::ResumeSession { session_id }) {
                eprintln!("Failed to resume session: {}", e);
                std::process::exit(1);
            }
            println!("Session resumed");
        }
        "update_metadata" => {
            let session_id = args
                .session_id
                .expect("session_id required for update_metadata");
            let Some(current) = app.session(&session_id) else {
                eprintln!("No session with id {}", session_id);
                std::process::exit(1);
            };

            let weather_touched = args.temperature.is_some()
                || args.cloud_cover.is_some()
                || args.wind_speed.is_some()
                || args.precipitation.is_some();
            let weather = if weather_touched {
                let mut weather = current.weather.clone();
                if args.temperature.is_some() {
                    weather.temperature = args.temperature;
                }
                if args.cloud_cover.is_some() {
                    weather.cloud_cover = args.cloud_cover;
                }
                if args.wind_speed.is_some() {
                    weather.wind_speed = args.wind_speed;
                }
                if args.precipitation.is_some() {
                    weather.precipitation = args.precipitation;
                }
                Some(weather)
            } else {
                None
            };

            let outcome = app.dispatch(Action::UpdateMetadata {
                session_id,
                patch: MetadataPatch {
                    name: args.name,
                    location: args.location,
                    observers: args.observers,
                    date: args.session_date,
                    start_time: args.start_time,
                    notes: args.notes,
                    weather,
                },
            });
            match outcome {
                Ok(_) => println!("Metadata updated"),
                Err(e) => {
                    eprintln!("Failed to update metadata: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "delete_session" => {
            let session_id = args
                .session_id
                .expect("session_id required for delete_session");
            match app.dispatch(Action::DeleteSession {
                session_id: session_id.clone(),
            }) {
                Ok(Outcome::SessionDeleted(true)) => println!("Session deleted"),
                Ok(_) => {
                    eprintln!("No session with id {}", session_id);
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Failed to delete session: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "locate" => {
            let session_id = args.session_id.expect("session_id required for locate");
            let provider = match CommandLocationProvider::from_env() {
                Ok(provider) => provider,
                Err(e) => {
                    eprintln!("No location helper configured: {}", e);
                    std::process::exit(1);
                }
            };
            match location::acquire_location(provider).await {
                Ok((latitude, longitude)) => {
                    let outcome = app.dispatch(Action::ApplyLocation {
                        session_id,
                        latitude,
                        longitude,
                    })?;
                    match outcome {
                        Outcome::LocationApplied(true) => {
                            println!("{}", json!({ "latitude": latitude, "longitude": longitude }));
                        }
                        _ => {
                            eprintln!("Session disappeared before the fix arrived; nothing written");
                            std::process::exit(1);
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Geolocation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "report" => {
            let session_id = args.session_id.expect("session_id required for report");
            let Some(session) = app.session(&session_id) else {
                eprintln!("No session with id {}", session_id);
                std::process::exit(1);
            };
            let summary = views::report_summary(session, &app.settings().species);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        "export" => {
            let session_id = args.session_id.expect("session_id required for export");
            let Some(session) = app.session(&session_id) else {
                eprintln!("No session with id {}", session_id);
                std::process::exit(1);
            };

            let rendered = match args.format.as_str() {
                "csv" => export::session_to_csv(session, &app.settings().species)?,
                "json" => export::session_to_json(session)?,
                "text" => export::session_to_text(session, &app.settings().species),
                other => {
                    eprintln!("Unknown export format: {}", other);
                    eprintln!("Available formats: csv, json, text");
                    std::process::exit(1);
                }
            };
            match args.output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("Exported session to {}", path);
                }
                None => println!("{}", rendered),
            }
        }
        "import" => {
            let input = args.input.expect("input required for import");
            let document = std::fs::read_to_string(&input)?;
            match app.dispatch(Action::ImportSession { document }) {
                Ok(Outcome::SessionImported(id)) => {
                    println!("Session imported");
                    println!("{}", json!({ "id": id }));
                }
                Ok(_) => unreachable!("import dispatches ImportSession"),
                Err(e) => {
                    eprintln!("Failed to import session: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "species" => {
            let search = args.search.unwrap_or_default();
            let session = match args.session_id {
                Some(id) => match app.session(&id) {
                    Some(session) => session.clone(),
                    None => {
                        eprintln!("No session with id {}", id);
                        std::process::exit(1);
                    }
                },
                None => Default::default(),
            };
            let listed = views::sorted_catalogue(&app.settings().species, &session, &search);
            println!("{}", serde_json::to_string_pretty(&listed)?);
        }
        "add_species" => {
            let species_id = args.species_id.expect("species_id required for add_species");
            let name = args.name.expect("name required for add_species");
            let abbreviation = args
                .abbreviation
                .expect("abbreviation required for add_species");

            let species = Species::new(
                &species_id,
                &name,
                &abbreviation,
                args.family.as_deref(),
            );
            match app.dispatch(Action::AddSpecies(species)) {
                Ok(_) => println!("Species added to catalogue"),
                Err(e) => {
                    eprintln!("Failed to add species: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "set_user" => {
            let website_url = args.website_url.expect("website_url required for set_user");
            let username = args.username.expect("username required for set_user");
            let app_password = args.app_password.expect("app_password required for set_user");

            let account = UserAccount {
                website_url,
                username,
                app_password,
            };
            // Reject malformed credentials before they are stored.
            if let Err(e) = SyncConfig::from_account(&account) {
                eprintln!("Invalid credentials: {}", e);
                std::process::exit(1);
            }
            app.dispatch(Action::SetUser(account))?;
            println!("Credentials stored");
        }
        "clear_user" => {
            app.dispatch(Action::ClearUser)?;
            println!("Credentials cleared");
        }
        "validate_credentials" => {
            let config = match SyncConfig::from_account_or_env(app.user()) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("No usable credentials: {}", e);
                    std::process::exit(1);
                }
            };
            let client = CmsClient::new(config)?;
            match client.authenticate().await {
                Ok(true) => println!("Credentials accepted"),
                Ok(false) => {
                    eprintln!("Credentials rejected by the backend");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Credential check failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        "sync_session" => {
            let session_id = args.session_id.expect("session_id required for sync_session");
            let config = match SyncConfig::from_account_or_env(app.user()) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("No usable credentials: {}", e);
                    std::process::exit(1);
                }
            };
            let client = CmsClient::new(config)?;
            let status = app.sync_session(&session_id, &client).await?;
            match status {
                SyncStatus::Synced => {
                    let remote_id = app
                        .session(&session_id)
                        .and_then(|s| s.remote_id);
                    println!("Session synced");
                    println!("{}", json!({ "remote_id": remote_id }));
                }
                _ => {
                    eprintln!("Sync failed; session is marked with sync_status = error");
                    std::process::exit(1);
                }
            }
        }
        "last_active" => match app.last_active() {
            Some(id) => println!("{}", json!({ "id": id })),
            None => println!("{{}}"),
        },
        "close" => {
            app.dispatch(Action::CloseSession)?;
            println!("Closed");
        }
        _ => {
            eprintln!("Unknown command: {}", args.command);
            eprintln!(
                "Available commands: start_session, list_sessions, show_session, record, record_interactive, edit_sighting, remove_sighting, finish_session, resume_session, update_metadata, delete_session, locate, report, export, import, species, add_species, set_user, clear_user, validate_credentials, sync_session, last_active, close"
            );
            std::process::exit(1);
        }
    }

    Ok(())
}
