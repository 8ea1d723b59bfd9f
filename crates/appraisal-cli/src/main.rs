//! Performance appraisal operator CLI.

use appraisal_client::{HttpPerformanceApi, UserContext};
use appraisal_config::portal::DEFAULT_API_URL;
use appraisal_core::ResourceId;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "appraisal")]
#[command(about = "Performance appraisal CLI", long_about = None)]
struct Cli {
    /// Backend API URL
    #[arg(long, global = true, env = "APPRAISAL_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Employee profile id to act as
    #[arg(long, global = true, env = "APPRAISAL_USER_ID")]
    user: Option<String>,

    /// Bearer token for the backend
    #[arg(long, global = true, env = "APPRAISAL_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage appraisal cycles
    Cycles {
        #[command(subcommand)]
        command: CycleCommands,
    },
    /// Manage appraisal templates
    Templates {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Manage assignments
    Assignments {
        #[command(subcommand)]
        command: AssignmentCommands,
    },
    /// Work with appraisal records
    Records {
        #[command(subcommand)]
        command: RecordCommands,
    },
    /// Review and resolve disputes
    Disputes {
        #[command(subcommand)]
        command: DisputeCommands,
    },
    /// Show assignment statistics for a cycle
    Dashboard {
        /// Cycle ID (defaults to the first cycle)
        #[arg(long)]
        cycle: Option<String>,
    },
    /// Validate a portal configuration file
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "appraisal.kdl")]
        path: String,
    },
}

#[derive(Subcommand)]
enum CycleCommands {
    /// List all cycles
    List,
    /// Show cycle details
    Show {
        /// Cycle ID
        id: String,
    },
    /// Delete a cycle
    Delete {
        /// Cycle ID
        id: String,
    },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// List all templates
    List,
    /// Show a template and its criteria
    Show {
        /// Template ID
        id: String,
    },
    /// Delete a template
    Delete {
        /// Template ID
        id: String,
    },
}

#[derive(Subcommand)]
enum AssignmentCommands {
    /// List your assignments, or every assignment in a cycle
    List {
        /// Cycle ID
        #[arg(long)]
        cycle: Option<String>,
    },
    /// Delete an assignment
    Delete {
        /// Assignment ID
        id: String,
    },
}

#[derive(Subcommand)]
enum RecordCommands {
    /// List manager-submitted records waiting to be published
    PublishQueue,
    /// Publish a record to the employee
    Publish {
        /// Record ID
        id: String,
    },
    /// Submit a draft record
    Submit {
        /// Record ID
        id: String,
    },
    /// Acknowledge a published record
    Acknowledge {
        /// Record ID
        id: String,
        /// Optional comment
        #[arg(long)]
        comment: Option<String>,
    },
    /// Show a record
    Show {
        /// Record ID
        id: String,
    },
}

#[derive(Subcommand)]
enum DisputeCommands {
    /// List disputes
    List {
        /// Only show disputes with this status (e.g. OPEN)
        #[arg(long)]
        status: Option<String>,
    },
    /// Show dispute details
    Show {
        /// Dispute ID
        id: String,
    },
    /// Approve or reject a dispute
    Resolve {
        /// Dispute ID
        id: String,
        /// approve or reject
        #[arg(long)]
        action: String,
        /// Resolution summary
        #[arg(long)]
        summary: String,
        /// Adjusted score (approve only)
        #[arg(long)]
        score: Option<String>,
        /// Adjusted rating label (approve only)
        #[arg(long)]
        label: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let api = HttpPerformanceApi::new(cli.api_url).with_token(cli.token);
    let user = UserContext::new(
        cli.user
            .filter(|u| !u.trim().is_empty())
            .map(ResourceId::from),
    );

    match cli.command {
        Commands::Cycles { command } => match command {
            CycleCommands::List => commands::cycles::list(&api).await?,
            CycleCommands::Show { id } => commands::cycles::show(&api, &id).await?,
            CycleCommands::Delete { id } => commands::cycles::delete(&api, &id).await?,
        },
        Commands::Templates { command } => match command {
            TemplateCommands::List => commands::templates::list(&api).await?,
            TemplateCommands::Show { id } => commands::templates::show(&api, &id).await?,
            TemplateCommands::Delete { id } => commands::templates::delete(&api, &id).await?,
        },
        Commands::Assignments { command } => match command {
            AssignmentCommands::List { cycle } => {
                commands::assignments::list(&api, &user, cycle).await?;
            }
            AssignmentCommands::Delete { id } => commands::assignments::delete(&api, &id).await?,
        },
        Commands::Records { command } => match command {
            RecordCommands::PublishQueue => commands::records::publish_queue(&api).await?,
            RecordCommands::Publish { id } => commands::records::publish(&api, &id).await?,
            RecordCommands::Submit { id } => commands::records::submit(&api, &id).await?,
            RecordCommands::Acknowledge { id, comment } => {
                commands::records::acknowledge(&api, &id, comment).await?;
            }
            RecordCommands::Show { id } => commands::records::show(&api, &id).await?,
        },
        Commands::Disputes { command } => match command {
            DisputeCommands::List { status } => commands::disputes::list(&api, status).await?,
            DisputeCommands::Show { id } => commands::disputes::show(&api, &id).await?,
            DisputeCommands::Resolve {
                id,
                action,
                summary,
                score,
                label,
            } => {
                let resolution = commands::disputes::Resolution {
                    action,
                    summary,
                    score,
                    label,
                };
                commands::disputes::resolve(&api, &id, resolution).await?;
            }
        },
        Commands::Dashboard { cycle } => commands::dashboard::show(&api, cycle).await?,
        Commands::Validate { path } => commands::validate(&path)?,
    }

    Ok(())
}
