use crate::db::{run_db_command, DbCommand};
use crate::server;
use crate::wizard::{run_wizard_check, WizardCheckArgs};
use amc_directory::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "AMC Directory",
    about = "Serve and administer the appraisal management company directory",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Database maintenance: schema, seed data, diagnostics, CSV import
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
    /// Inspect a saved registration record against the wizard gates
    Wizard {
        #[command(subcommand)]
        command: WizardCommand,
    },
}

#[derive(Subcommand, Debug)]
enum WizardCommand {
    /// Report the current step, progress, and any fields blocking it
    Check(WizardCheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Db { command } => run_db_command(command).await,
        Command::Wizard {
            command: WizardCommand::Check(args),
        } => run_wizard_check(args),
    }
}
