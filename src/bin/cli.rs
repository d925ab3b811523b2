use clap::{Parser, Subcommand};
use jewelstore::{
    config::{DatabaseConfig, CLI_LOG_FILTER},
    db,
    models::NewCatalogItem,
    repositories::{CatalogRepository, PgCatalogRepository},
    schema, seed_data,
    services::{
        bootstrap_service, BootstrapPlan, BootstrapReport, BootstrapService, SeedOutcome,
        SeedPolicy, SeedReport,
    },
    AppError,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jewelstore-cli")]
#[command(about = "Bootstrap and seed the jewelry store database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the schema and seed the catalog in one run
    Bootstrap {
        /// How to treat a catalog that already has rows
        #[arg(long, value_enum, default_value_t = SeedPolicy::Guarded)]
        policy: SeedPolicy,

        /// Seed from this JSON file instead of the built-in baseline
        #[arg(long)]
        seed_file: Option<PathBuf>,

        /// Create a minimal `auth` schema first (plain Postgres only)
        #[arg(long)]
        auth_shim: bool,
    },

    /// Schema commands
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },

    /// Seed the catalog table
    Seed {
        /// How to treat a catalog that already has rows
        #[arg(long, value_enum, default_value_t = SeedPolicy::Guarded)]
        policy: SeedPolicy,

        /// Seed from this JSON file instead of the built-in baseline
        #[arg(long)]
        seed_file: Option<PathBuf>,
    },

    /// Catalog commands
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Create tables, policies and the profile trigger
    Apply {
        /// Create a minimal `auth` schema first (plain Postgres only)
        #[arg(long)]
        auth_shim: bool,
    },

    /// Print the statements as SQL for manual application
    Print {
        /// Include the `auth` schema shim
        #[arg(long)]
        auth_shim: bool,
    },

    /// Show which tables, policies and triggers exist
    Status,
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// List catalog items
    List {
        /// Maximum number of items to display
        #[arg(short, long, default_value_t = 50)]
        limit: i64,
    },
}

fn load_items(seed_file: Option<PathBuf>) -> Result<Vec<NewCatalogItem>, AppError> {
    let items = match seed_file {
        Some(path) => seed_data::load_items_from_file(&path)?,
        None => seed_data::baseline_items()?,
    };
    Ok(items)
}

fn print_seed_report(report: &SeedReport) {
    let outcome = report.outcome();
    match outcome {
        SeedOutcome::Skipped => {
            println!(
                "ℹ️  Catalog already has {} item(s); skipped seeding ({} policy)",
                report.skipped_existing.unwrap_or_default(),
                report.policy
            );
            return;
        }
        SeedOutcome::Complete => println!(
            "✅ Inserted {} catalog item(s) ({} policy)",
            report.inserted, report.policy
        ),
        SeedOutcome::Partial => println!(
            "⚠️  Inserted {} catalog item(s), {} failed ({} policy)",
            report.inserted,
            report.failed.len(),
            report.policy
        ),
        SeedOutcome::NothingInserted => eprintln!(
            "❌ No catalog items inserted, {} failed ({} policy)",
            report.failed.len(),
            report.policy
        ),
    }

    for failure in &report.failed {
        eprintln!("  ⚠️  {}: {}", failure.item, failure.error);
    }

    if outcome == SeedOutcome::NothingInserted {
        std::process::exit(1);
    }
}

fn print_bootstrap_report(report: &BootstrapReport) {
    if report.shim_statements > 0 {
        println!("✅ Applied {} auth shim statement(s)", report.shim_statements);
    }
    if report.schema_statements > 0 {
        println!("✅ Applied {} schema statement(s)", report.schema_statements);
    }
    if let Some(seed) = &report.seed {
        print_seed_report(seed);
    }
}

fn load_config() -> DatabaseConfig {
    DatabaseConfig::from_env()
        .unwrap_or_else(|err| fail("Invalid database configuration", err.into()))
}

fn fail(context: &str, err: AppError) -> ! {
    eprintln!("❌ {}: {}", context, err);
    std::process::exit(1);
}

async fn run_plan(
    config: &DatabaseConfig,
    plan: BootstrapPlan,
    items: &[NewCatalogItem],
    context: &str,
) {
    match bootstrap_service::run(config, plan, items).await {
        Ok(report) => print_bootstrap_report(&report),
        Err(err) => fail(context, err),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| CLI_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Bootstrap {
            policy,
            seed_file,
            auth_shim,
        } => {
            let items = load_items(seed_file)
                .unwrap_or_else(|err| fail("Failed to load seed data", err));
            let plan = BootstrapPlan::full(policy).with_auth_shim(auth_shim);
            run_plan(&load_config(), plan, &items, "Bootstrap failed").await;
        }

        Commands::Seed { policy, seed_file } => {
            let items = load_items(seed_file)
                .unwrap_or_else(|err| fail("Failed to load seed data", err));
            let plan = BootstrapPlan::seed_only(policy);
            run_plan(&load_config(), plan, &items, "Seeding failed").await;
        }

        Commands::Schema { command } => match command {
            SchemaCommands::Apply { auth_shim } => {
                let plan = BootstrapPlan::schema_only().with_auth_shim(auth_shim);
                run_plan(&load_config(), plan, &[], "Schema bootstrap failed").await;
            }

            SchemaCommands::Print { auth_shim } => {
                let mut statements = Vec::new();
                if auth_shim {
                    statements.extend(schema::auth_shim_statements());
                }
                statements.extend(schema::bootstrap_statements());
                print!("{}", schema::render_script(&statements));
            }

            SchemaCommands::Status => {
                let status = db::with_connection(&load_config(), |conn| async move {
                    let status = BootstrapService::from_connection(conn)
                        .schema_service()
                        .status()
                        .await?;
                    Ok::<_, AppError>(status)
                })
                .await
                .unwrap_or_else(|err| fail("Failed to read schema status", err));

                for table in schema::TABLES {
                    let present = status.tables.iter().any(|t| t == table);
                    let rls = status.rls_enabled.iter().any(|t| t == table);
                    println!(
                        "{} table {:<15} rls {}",
                        if present { "✅" } else { "❌" },
                        table,
                        if rls { "on" } else { "off" }
                    );
                }

                let missing = status.missing_policies();
                for policy in schema::POLICIES {
                    let present = !missing.iter().any(|m| **m == policy);
                    println!(
                        "{} policy \"{}\" on {}",
                        if present { "✅" } else { "❌" },
                        policy.name,
                        policy.table
                    );
                }

                println!(
                    "{} trigger {} (registered {} time(s))",
                    if status.trigger_count == 1 { "✅" } else { "❌" },
                    schema::TRIGGER_NAME,
                    status.trigger_count
                );

                if !status.is_complete() {
                    std::process::exit(1);
                }
            }
        },

        Commands::Catalog { command } => match command {
            CatalogCommands::List { limit } => {
                let items = db::with_connection(&load_config(), |conn| async move {
                    let items = PgCatalogRepository::new(conn).list_items(limit).await?;
                    Ok::<_, AppError>(items)
                })
                .await
                .unwrap_or_else(|err| fail("Failed to list catalog items", err));

                if items.is_empty() {
                    println!("No catalog items found.");
                } else {
                    println!("{:<30} {:<12} {:>10}", "Name", "Category", "Price");
                    println!("{}", "-".repeat(54));
                    for item in items {
                        println!(
                            "{:<30} {:<12} {:>10}",
                            item.name,
                            item.category.as_deref().unwrap_or("N/A"),
                            item.price
                        );
                    }
                }
            }
        },
    }

    Ok(())
}
