use crate::infra::Components;
use amc_directory::config::AppConfig;
use amc_directory::directory::{CompanyImporter, ImportReport};
use amc_directory::error::AppError;
use amc_directory::telemetry;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::warn;

#[derive(Subcommand, Debug)]
pub(crate) enum DbCommand {
    /// Create the company table and indexes, seeding sample companies when empty
    Init,
    /// Report connectivity and whether the schema is in place
    Health,
    /// Round-trip to the server and print its clock and version
    TestConnection,
    /// Validate and insert companies from a CSV export
    Import(ImportArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV file with a name,phone,email,state,website,signup_url header
    pub(crate) path: PathBuf,
    /// Validate rows and report rejects without writing anything
    #[arg(long)]
    pub(crate) dry_run: bool,
}

pub(crate) async fn run_db_command(command: DbCommand) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let maintenance = Components::maintenance_only(&config);

    match command {
        DbCommand::Init => {
            let outcome = maintenance.initialize().await?;
            println!("Database initialized");
            println!("  Existing companies: {}", outcome.existing);
            println!("  Seeded companies: {}", outcome.seeded);
        }
        DbCommand::Health => {
            let health = maintenance.check_health().await;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
        DbCommand::TestConnection => {
            let probe = maintenance.test_connection().await;
            println!("{}", serde_json::to_string_pretty(&probe)?);
        }
        DbCommand::Import(args) => {
            let report = CompanyImporter::from_path(&args.path)?;
            render_import_report(&report);
            if args.dry_run {
                println!("Dry run: nothing written");
            } else {
                let inserted = maintenance.import(&report.accepted).await?;
                println!("Inserted {} companies", inserted);
            }
        }
    }

    Ok(())
}

fn render_import_report(report: &ImportReport) {
    println!(
        "Validated {} rows: {} accepted, {} rejected",
        report.accepted.len() + report.rejected.len(),
        report.accepted.len(),
        report.rejected.len()
    );
    for rejected in &report.rejected {
        warn!(line = rejected.line, errors = %rejected.errors, "rejected company row");
        println!("  line {}:", rejected.line);
        for error in rejected.errors.errors() {
            println!("    {}: {}", error.field, error.message);
        }
    }
}
