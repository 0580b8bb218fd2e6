use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use outreach_crm::auth::{verify_passphrase, TokenSigner};
use outreach_crm::db::{self, ListFilters, Pool};
use outreach_crm::error::CrmError;
use outreach_crm::mailer::HttpMailer;
use outreach_crm::model::{BusinessPatch, FunnelStatus, NewBusiness, Priority, SyncItem};
use outreach_crm::{config, export, metrics, outreach, sync};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about = "Outreach CRM backend CLI")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Bearer token for data operations (falls back to $CRM_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Exchange the shared passphrase for a signed token
    Login {
        #[arg(long)]
        passphrase: String,
    },
    /// Check the current token and print its subject
    Verify,
    /// Create a business from a JSON object
    Create {
        /// JSON-encoded business fields (name required, slug optional)
        data: String,
    },
    /// Fetch one business with its event log, newest event first
    Get { id: i64 },
    /// List businesses, newest-updated first
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Apply a sparse JSON update to a business
    Update { id: i64, data: String },
    /// Delete a business and all of its events
    Delete { id: i64 },
    /// Append an outreach event to a business
    LogEvent {
        id: i64,
        #[arg(long)]
        event_type: String,
        #[arg(long, default_value = "")]
        details: String,
    },
    /// Send an outreach email and record it against the business
    SendEmail {
        id: i64,
        #[arg(long)]
        to: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body: String,
    },
    /// Bulk-upsert businesses from a JSON array file
    Sync { file: PathBuf },
    /// Print the funnel metrics snapshot
    Metrics,
    /// Export all businesses as CSV
    ExportCsv {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Liveness probe; requires no credential
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        return match err.downcast::<CrmError>() {
            Ok(crm) => {
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "error": crm.kind(),
                        "message": crm.to_string(),
                    }))
                    .expect("JSON output")
                );
                std::process::exit(1);
            }
            Err(other) => Err(other),
        };
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    if let Command::Health = args.command {
        print_json(&json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "service": "outreach-crm",
        }));
        return Ok(());
    }

    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;
    let signer = TokenSigner::from_config(&cfg.auth);

    if let Command::Login { passphrase } = &args.command {
        if !verify_passphrase(passphrase, &cfg.auth.passphrase_hash) {
            return Err(CrmError::NotAuthenticated("access denied".into()).into());
        }
        let token = signer.issue("charioteer", "admin");
        print_json(&json!({ "token": token, "expires_in": signer.ttl_seconds() }));
        return Ok(());
    }

    // Everything past this point reads or writes business data.
    let token = args
        .token
        .clone()
        .or_else(|| std::env::var("CRM_TOKEN").ok())
        .ok_or_else(|| CrmError::NotAuthenticated("missing token".into()))?;
    let claims = signer.verify(&token)?;

    if let Command::Verify = args.command {
        print_json(&json!({ "valid": true, "user": claims.sub }));
        return Ok(());
    }

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| format!("sqlite://{}/outreach.db", cfg.app.data_dir));
    let pool = db::init_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    run_command(&args, &cfg, &pool).await
}

async fn run_command(args: &Args, cfg: &config::Config, pool: &Pool) -> Result<()> {
    match &args.command {
        Command::Create { data } => {
            let new: NewBusiness =
                serde_json::from_str(data).context("invalid business JSON")?;
            let biz = db::create_business(pool, &new).await?;
            info!(id = biz.id, slug = %biz.slug, "created business");
            print_json(&biz);
        }
        Command::Get { id } => {
            let detail = db::get_business_detail(pool, *id).await?;
            print_json(&detail);
        }
        Command::List {
            status,
            category,
            priority,
            search,
        } => {
            let filters = ListFilters {
                status: parse_filter(status.as_deref(), FunnelStatus::parse, "status")?,
                category: category.clone(),
                priority: parse_filter(priority.as_deref(), Priority::parse, "priority")?,
                search: search.clone(),
            };
            let businesses = db::list_businesses(pool, &filters).await?;
            print_json(&businesses);
        }
        Command::Update { id, data } => {
            let patch: BusinessPatch =
                serde_json::from_str(data).context("invalid update JSON")?;
            let biz = db::update_business(pool, *id, &patch).await?;
            print_json(&biz);
        }
        Command::Delete { id } => {
            let deleted = db::delete_business(pool, *id).await?;
            info!(id = deleted, "deleted business");
            print_json(&json!({ "status": "deleted", "id": deleted }));
        }
        Command::LogEvent {
            id,
            event_type,
            details,
        } => {
            let event = outreach::log_event(pool, *id, event_type, details).await?;
            print_json(&event);
        }
        Command::SendEmail {
            id,
            to,
            subject,
            body,
        } => {
            let mailer = HttpMailer::from_config(&cfg.mailer)?;
            let report =
                outreach::send_outreach_email(pool, &mailer, *id, to, subject, body).await?;
            print_json(&report);
        }
        Command::Sync { file } => {
            let raw = tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let items: Vec<SyncItem> =
                serde_json::from_str(&raw).context("invalid sync JSON")?;
            let outcome = sync::sync_businesses(pool, &items).await?;
            print_json(&outcome);
        }
        Command::Metrics => {
            let snapshot = metrics::compute_metrics(pool).await?;
            print_json(&snapshot);
        }
        Command::ExportCsv { output } => {
            let csv = export::export_csv(pool).await?;
            match output {
                Some(path) => tokio::fs::write(path, csv)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{csv}"),
            }
        }
        Command::Health | Command::Login { .. } | Command::Verify => unreachable!(),
    }
    Ok(())
}

fn parse_filter<T>(
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
    what: &'static str,
) -> Result<Option<T>> {
    match raw {
        None => Ok(None),
        Some(s) => parse(s)
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("unrecognized {} filter '{}'", what, s)),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).expect("JSON output")
    );
}
