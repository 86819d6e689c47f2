mod commands;
mod config;
mod preferences;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "wormi-hub")]
#[command(about = "Wormi Hub community composting network: events, locations and signups")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the site datasets (events.json, ...)
    #[arg(long, global = true, conflicts_with = "data_url")]
    data_dir: Option<String>,

    /// Base URL the site datasets are served from
    #[arg(long, global = true)]
    data_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List events
    Events {
        /// Workshop, Pop-up, Volunteer Shift or All
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Case-insensitive city search
        #[arg(short, long)]
        city: Option<String>,

        /// Only the next few events
        #[arg(long)]
        upcoming: bool,
    },

    /// Save an event as an .ics calendar file
    Export {
        /// Event id
        event_id: String,

        /// Directory to save into
        #[arg(short, long)]
        out_dir: Option<String>,

        /// File name, defaults to <event-id>.ics
        #[arg(short, long)]
        filename: Option<String>,
    },

    /// Generate a calendar document for an ad hoc event
    Ics {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        location: String,

        /// RFC 3339 start, e.g. 2024-05-01T14:00:00Z
        #[arg(long)]
        start: String,

        /// RFC 3339 end
        #[arg(long)]
        end: String,

        #[arg(long)]
        url: Option<String>,

        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<String>,

        /// Use a random UUID instead of a time-based UID
        #[arg(long)]
        random_uid: bool,
    },

    /// List drop-off, dispense and pop-up locations
    Locations {
        /// dropoff, dispense, popup or all
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Search name or address
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List educational resources
    Resources {
        /// SOP, QA/QC, DIY CFT, Safety, Education or All
        #[arg(short, long)]
        category: Option<String>,

        /// Search title or summary
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Network metrics and batch quality control
    Data,

    /// People behind the network
    People,

    /// Sign up or apply
    Signup {
        #[command(subcommand)]
        form: SignupCommands,
    },

    /// Show or change the theme preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeCommands>,
    },
}

#[derive(Subcommand)]
enum SignupCommands {
    /// Volunteer signup
    Volunteer {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        interests: String,
        #[arg(long, default_value = "")]
        availability: String,
    },

    /// Apply to host a drop-off node
    Host {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        space_description: String,
        #[arg(long, default_value = "")]
        commitment: String,
    },

    /// Newsletter subscription
    Newsletter {
        #[arg(long, default_value = "")]
        email: String,
    },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Print the saved theme
    Show,
    /// Save a theme (light or dark)
    Set { theme: String },
    /// Switch between light and dark
    Toggle,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("wormi_hub_cli={0},wormi_hub_core={0}", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let source = config::DataOptions {
        data_dir: cli.data_dir,
        data_url: cli.data_url,
    };

    match cli.command {
        Commands::Events {
            kind,
            city,
            upcoming,
        } => commands::events_command(&source, kind, city, upcoming).await,

        Commands::Export {
            event_id,
            out_dir,
            filename,
        } => commands::export_command(&source, event_id, out_dir, filename).await,

        Commands::Ics {
            title,
            description,
            location,
            start,
            end,
            url,
            output,
            random_uid,
        } => commands::ics_command(commands::IcsParams {
            title,
            description,
            location,
            start,
            end,
            url,
            output,
            random_uid,
        }),

        Commands::Locations { kind, search } => {
            commands::locations_command(&source, kind, search).await
        }

        Commands::Resources { category, search } => {
            commands::resources_command(&source, category, search).await
        }

        Commands::Data => commands::data_command(&source).await,

        Commands::People => commands::people_command(&source).await,

        Commands::Signup { form } => match form {
            SignupCommands::Volunteer {
                name,
                email,
                phone,
                interests,
                availability,
            } => {
                commands::volunteer_command(wormi_hub_core::forms::VolunteerSignup {
                    name,
                    email,
                    phone,
                    interests,
                    availability,
                })
                .await
            }
            SignupCommands::Host {
                name,
                email,
                address,
                space_description,
                commitment,
            } => {
                commands::host_command(wormi_hub_core::forms::HostApplication {
                    name,
                    email,
                    address,
                    space_description,
                    commitment,
                })
                .await
            }
            SignupCommands::Newsletter { email } => {
                commands::newsletter_command(wormi_hub_core::forms::NewsletterSignup { email })
                    .await
            }
        },

        Commands::Theme { action } => match action.unwrap_or(ThemeCommands::Show) {
            ThemeCommands::Show => commands::theme_show_command().await,
            ThemeCommands::Set { theme } => commands::theme_set_command(theme).await,
            ThemeCommands::Toggle => commands::theme_toggle_command().await,
        },
    }
}
