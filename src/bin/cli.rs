//! Eventboard CLI
//! Mission: Drive the REST API from the terminal

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use eventboard_backend::{
    auth::models::ProfileUpdate,
    client::{ApiClient, Session, SessionStore},
    events::models::{CreateEventRequest, UpdateEventRequest},
};

#[derive(Parser)]
#[command(name = "eventboard-cli", about = "Community event listing client")]
struct Cli {
    /// Server base URL
    #[arg(long, env = "EVENTBOARD_URL", default_value = "http://localhost:5000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and log in
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Log in with email and password
    Login { email: String, password: String },
    /// Drop the saved session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// List, inspect, and manage events
    Events {
        #[command(subcommand)]
        command: EventsCommand,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Show the full profile
    Show,
    /// Update profile fields; omitted fields keep their value
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },
}

#[derive(Subcommand)]
enum EventsCommand {
    /// List all events
    List,
    /// Show one event
    Show { id: String },
    /// Create an event (requires login)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        organizer: Option<String>,
    },
    /// Update an event you own; omitted fields keep their value
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        organizer: Option<String>,
    },
    /// Delete an event you own
    Delete { id: String },
    /// RSVP to an event by email (no login required)
    Rsvp { id: String, email: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.server)?;
    let sessions = SessionStore::new(SessionStore::default_path());

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = client.register(&username, &email, &password).await?;
            println!("{}", auth.message);
            sessions.save(&Session {
                token: auth.token,
                user: auth.user,
            })?;
        }
        Command::Login { email, password } => {
            let auth = client.login(&email, &password).await?;
            println!("{}", auth.message);
            sessions.save(&Session {
                token: auth.token,
                user: auth.user,
            })?;
        }
        Command::Logout => {
            sessions.clear()?;
            println!("Logged out");
        }
        Command::Whoami => match sessions.load() {
            Some(session) => {
                println!("{} <{}>", session.user.username, session.user.email)
            }
            None => println!("Not logged in"),
        },
        Command::Profile { command } => {
            let session = require_login(&sessions)?;
            match command {
                ProfileCommand::Show => {
                    let profile = client.profile(&session.token).await?;
                    print_json(&profile)?;
                }
                ProfileCommand::Update {
                    username,
                    email,
                    bio,
                    website,
                } => {
                    let profile = client
                        .update_profile(
                            &session.token,
                            &ProfileUpdate {
                                username,
                                email,
                                bio,
                                website,
                            },
                        )
                        .await?;
                    println!("Profile updated successfully");
                    print_json(&profile)?;
                }
            }
        }
        Command::Events { command } => match command {
            EventsCommand::List => {
                let events = client.list_events().await?;
                print_json(&events)?;
            }
            EventsCommand::Show { id } => {
                let event = client.get_event(&id).await?;
                print_json(&event)?;
            }
            EventsCommand::Create {
                title,
                description,
                date,
                time,
                location,
                organizer,
            } => {
                let session = require_login(&sessions)?;
                let event = client
                    .create_event(
                        &session.token,
                        &CreateEventRequest {
                            title,
                            description,
                            date,
                            time,
                            location,
                            organizer,
                        },
                    )
                    .await?;
                print_json(&event)?;
            }
            EventsCommand::Update {
                id,
                title,
                description,
                date,
                time,
                location,
                organizer,
            } => {
                let session = require_login(&sessions)?;
                let event = client
                    .update_event(
                        &session.token,
                        &id,
                        &UpdateEventRequest {
                            title,
                            description,
                            date,
                            time,
                            location,
                            organizer,
                        },
                    )
                    .await?;
                print_json(&event)?;
            }
            EventsCommand::Delete { id } => {
                let session = require_login(&sessions)?;
                let message = client.delete_event(&session.token, &id).await?;
                println!("{}", message);
            }
            EventsCommand::Rsvp { id, email } => {
                let event = client.rsvp(&id, &email).await?;
                println!("RSVP successful");
                print_json(&event)?;
            }
        },
    }

    Ok(())
}

fn require_login(sessions: &SessionStore) -> Result<Session> {
    match sessions.load() {
        Some(session) => Ok(session),
        None => bail!("Not logged in. Run `eventboard-cli login` first."),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
