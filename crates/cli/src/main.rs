use std::error::Error;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use engine::{
    Client, DocumentDraft, DocumentKind, HttpRemoteStore, Ledger, MovementDraft, MovementKind,
    PullOutcome, PushOutcome, SyncEngine, parse_items_from_text,
};
use uuid::Uuid;

mod config;

type CliResult<T> = Result<T, Box<dyn Error + Send + std::marker::Sync>>;

#[derive(Parser, Debug)]
#[command(name = "nexus")]
#[command(about = "Nexus Finance: movements, invoices and cloud sync")]
struct Cli {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<String>,
    /// Override the remote store base URL.
    #[arg(long)]
    remote_url: Option<String>,
    /// Override the sync identity.
    #[arg(long)]
    identity: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show today's KPIs.
    Dashboard,
    /// Record an income movement.
    Income(MovementArgs),
    /// Record an expense movement.
    Expense(MovementArgs),
    /// List recent movements of one kind.
    Movements {
        #[arg(long, default_value = "income")]
        kind: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Delete a movement by id.
    DeleteMovement {
        #[arg(long)]
        id: Uuid,
    },
    Invoice(Invoice),
    Business(Business),
    /// Export movements as CSV.
    Export {
        /// Restrict to one kind (`income`/`expense`).
        #[arg(long)]
        kind: Option<String>,
        /// Output file; stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Sync(Sync),
}

#[derive(Args, Debug)]
struct MovementArgs {
    /// Economic date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    description: String,
    #[arg(long)]
    category: String,
    #[arg(long, default_value = "Cash")]
    method: String,
    #[arg(long)]
    amount: f64,
}

/// Manage invoices and quotes.
#[derive(Args, Debug)]
struct Invoice {
    #[command(subcommand)]
    command: InvoiceCommand,
}

#[derive(Subcommand, Debug)]
enum InvoiceCommand {
    /// Create or update a document.
    Save(InvoiceSaveArgs),
    /// List documents.
    List,
    /// Delete a document (cascades to its linked movement).
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Convert a quote into an invoice.
    Convert {
        #[arg(long)]
        id: Uuid,
    },
    /// Print the render model consumed by the PDF layer.
    Render {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct InvoiceSaveArgs {
    /// Document to update; omit to create.
    #[arg(long)]
    id: Option<Uuid>,
    #[arg(long)]
    number: String,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    due_date: Option<NaiveDate>,
    #[arg(long)]
    client: String,
    #[arg(long)]
    client_address: Option<String>,
    #[arg(long)]
    client_email: Option<String>,
    #[arg(long)]
    client_phone: Option<String>,
    /// Line item in `qty | description | price` form; repeatable.
    #[arg(long = "item")]
    items: Vec<String>,
    /// Flat tax rate stamped onto every line.
    #[arg(long)]
    tax: Option<f64>,
    #[arg(long, default_value = "")]
    notes: String,
    #[arg(long, default_value = "Cash")]
    method: String,
    /// Save as a quote instead of an invoice.
    #[arg(long)]
    quote: bool,
}

/// Update the business configuration.
#[derive(Args, Debug)]
struct Business {
    #[command(subcommand)]
    command: BusinessCommand,
}

#[derive(Subcommand, Debug)]
enum BusinessCommand {
    /// Print the current configuration.
    Show,
    /// Set business fields; omitted flags keep their value.
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Store a logo image with its pixel dimensions.
    Logo {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
}

/// Synchronize with the remote store.
#[derive(Args, Debug)]
struct Sync {
    #[command(subcommand)]
    command: SyncCommand,
}

#[derive(Subcommand, Debug)]
enum SyncCommand {
    /// Replace the remote snapshot with local state.
    Push,
    /// Fetch the remote snapshot and replace local state.
    Pull,
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let settings = config::load(config::Overrides {
        config_path: cli.config,
        data_dir: cli.data_dir,
        remote_url: cli.remote_url,
        identity: cli.identity,
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "nexus={level},engine={level}",
            level = settings.level
        ))
        .init();

    let mut ledger = Ledger::builder()
        .directory(&settings.data_dir)
        .build()?;

    // A configured identity adopts its existing cloud state exactly once,
    // before any local data exists. Explicit sync commands manage the remote
    // themselves.
    if ledger.is_first_run() && !matches!(cli.command, Command::Sync(_)) {
        pull_on_first_run(&mut ledger, &settings).await;
    }

    match cli.command {
        Command::Dashboard => dashboard(&ledger),
        Command::Income(args) => {
            let id = ledger.income(movement_draft(args))?;
            println!("Recorded income {id}");
        }
        Command::Expense(args) => {
            let id = ledger.expense(movement_draft(args))?;
            println!("Recorded expense {id}");
        }
        Command::Movements { kind, limit } => {
            let kind = MovementKind::try_from(kind.as_str())?;
            let symbol = ledger.config().currency_symbol.clone();
            for movement in ledger.recent_movements(kind, limit) {
                let date = movement
                    .date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "----------".to_string());
                println!(
                    "{}  {}  {}  {}  {}",
                    movement.id,
                    date,
                    movement.description,
                    movement.category,
                    engine::money::format_amount(&symbol, movement.amount),
                );
            }
        }
        Command::DeleteMovement { id } => {
            ledger.delete_movement(id)?;
            println!("Deleted movement {id}");
        }
        Command::Invoice(invoice) => match invoice.command {
            InvoiceCommand::Save(args) => {
                let id = ledger.save_document(document_draft(args))?;
                let document = ledger.document(id)?;
                println!(
                    "Saved {} {} for {}: {}",
                    document.kind.as_str(),
                    document.number,
                    document.client.name,
                    ledger.config().format_amount(document.total),
                );
                push_after_save(&ledger, &settings).await;
            }
            InvoiceCommand::List => {
                for document in ledger.documents() {
                    let date = document
                        .date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "----------".to_string());
                    println!(
                        "{}  {}  {}  {}  {}",
                        document.id,
                        document.kind.as_str(),
                        document.number,
                        date,
                        ledger.config().format_amount(document.total),
                    );
                }
            }
            InvoiceCommand::Delete { id } => {
                ledger.delete_document(id)?;
                println!("Deleted document {id}");
            }
            InvoiceCommand::Convert { id } => {
                ledger.convert_quote_to_invoice(id)?;
                println!("Converted quote {id} to invoice");
                push_after_save(&ledger, &settings).await;
            }
            InvoiceCommand::Render { id } => {
                let render = ledger.render_document(id)?;
                println!("{}", serde_json::to_string_pretty(&render)?);
            }
        },
        Command::Business(business) => match business.command {
            BusinessCommand::Show => {
                let config = ledger.config();
                println!("{}", serde_json::to_string_pretty(config)?);
            }
            BusinessCommand::Set {
                name,
                currency,
                address,
                phone,
                email,
            } => {
                let mut config = ledger.config().clone();
                if let Some(name) = name {
                    config.business_name = name;
                }
                if let Some(currency) = currency {
                    config.currency_symbol = currency;
                }
                if let Some(address) = address {
                    config.address = address;
                }
                if let Some(phone) = phone {
                    config.phone = phone;
                }
                if let Some(email) = email {
                    config.email = email;
                }
                ledger.update_config(config)?;
                println!("Configuration saved");
            }
            BusinessCommand::Logo {
                file,
                width,
                height,
            } => {
                let bytes = std::fs::read(&file)?;
                ledger.set_logo(bytes, width, height)?;
                println!("Logo stored ({}x{})", width, height);
            }
        },
        Command::Export { kind, output } => {
            let csv = match kind {
                Some(kind) => {
                    let kind = MovementKind::try_from(kind.as_str())?;
                    let movements: Vec<_> = ledger
                        .movements_of_kind(kind)
                        .into_iter()
                        .cloned()
                        .collect();
                    engine::movements_to_csv(&movements)
                }
                None => engine::movements_to_csv(ledger.movements()),
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, csv)?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{csv}"),
            }
        }
        Command::Sync(sync) => {
            let (syncer, identity) = sync_engine(&settings)?;
            match sync.command {
                SyncCommand::Push => match syncer.push(&identity, ledger.snapshot()).await? {
                    PushOutcome::Pushed => println!("Pushed snapshot for {identity}"),
                    PushOutcome::Superseded => println!("Push superseded by a newer one"),
                },
                SyncCommand::Pull => match syncer.pull(&identity).await? {
                    PullOutcome::Snapshot(remote) => {
                        ledger.adopt_snapshot(remote.into_snapshot())?;
                        println!(
                            "Adopted remote snapshot for {identity} ({} movements, {} documents)",
                            ledger.movements().len(),
                            ledger.documents().len(),
                        );
                    }
                    PullOutcome::NotFound => {
                        println!("No remote snapshot for {identity} yet; local state kept")
                    }
                    PullOutcome::Superseded => println!("Pull superseded by a newer one"),
                },
            }
        }
    }

    Ok(())
}

fn dashboard(ledger: &Ledger) {
    let today = Local::now().date_naive();
    let summary = ledger.dashboard(today);
    let config = ledger.config();
    println!("{} — {}", config.business_name, today);
    println!(
        "Today:  income {}  expenses {}  balance {}",
        config.format_amount(summary.income_today),
        config.format_amount(summary.expenses_today),
        config.format_amount(summary.balance_today),
    );
    println!(
        "Month:  income {}  expenses {}  balance {}  ({} movements)",
        config.format_amount(summary.income_month),
        config.format_amount(summary.expenses_month),
        config.format_amount(summary.balance_month),
        summary.movements_this_month,
    );
    match &summary.last_movement {
        Some(last) => {
            let date = last
                .date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "undated".to_string());
            let kind = match last.kind {
                MovementKind::Income => "Income",
                MovementKind::Expense => "Expense",
            };
            println!(
                "Last movement: {} of {} on {}",
                kind,
                config.format_amount(last.amount),
                date,
            );
        }
        None => println!("No movements yet"),
    }
}

fn movement_draft(args: MovementArgs) -> MovementDraft {
    MovementDraft {
        date: args.date.or_else(|| Some(Local::now().date_naive())),
        description: args.description,
        category: args.category,
        method: args.method,
        amount: args.amount,
    }
}

fn document_draft(args: InvoiceSaveArgs) -> DocumentDraft {
    DocumentDraft {
        id: args.id,
        kind: if args.quote {
            DocumentKind::Quote
        } else {
            DocumentKind::Invoice
        },
        number: args.number,
        date: args.date.or_else(|| Some(Local::now().date_naive())),
        due_date: args.due_date,
        client: Client {
            name: args.client,
            address: args.client_address,
            email: args.client_email,
            phone: args.client_phone,
        },
        items: parse_items_from_text(&args.items.join("\n")),
        tax_percent: args.tax,
        notes: args.notes,
        method: args.method,
    }
}

fn sync_engine(
    settings: &config::AppConfig,
) -> CliResult<(SyncEngine<HttpRemoteStore>, String)> {
    if settings.remote_url.is_empty() {
        return Err("remote_url is not configured".into());
    }
    if settings.identity.is_empty() {
        return Err("identity is not configured".into());
    }
    let remote = HttpRemoteStore::new(&settings.remote_url)?;
    Ok((SyncEngine::new(remote), settings.identity.clone()))
}

/// First run of a configured installation: adopt the identity's cloud state
/// before anything happens locally. Failures only warn; the run continues on
/// the empty local store.
async fn pull_on_first_run(ledger: &mut Ledger, settings: &config::AppConfig) {
    if settings.remote_url.is_empty() || settings.identity.is_empty() {
        return;
    }
    match sync_engine(settings) {
        Ok((syncer, identity)) => match syncer.pull(&identity).await {
            Ok(PullOutcome::Snapshot(remote)) => {
                match ledger.adopt_snapshot(remote.into_snapshot()) {
                    Ok(()) => tracing::info!("adopted cloud state for {identity}"),
                    Err(err) => tracing::warn!("failed to adopt cloud state: {err}"),
                }
            }
            Ok(PullOutcome::NotFound) => tracing::info!("no cloud state for {identity} yet"),
            Ok(PullOutcome::Superseded) => {}
            Err(err) => tracing::warn!("initial pull failed: {err}"),
        },
        Err(err) => tracing::warn!("sync unavailable: {err}"),
    }
}

/// Mirrors a document save to the cloud when a session is configured. The
/// local save already succeeded; a failed push only warns.
async fn push_after_save(ledger: &Ledger, settings: &config::AppConfig) {
    if settings.remote_url.is_empty() || settings.identity.is_empty() {
        return;
    }
    match sync_engine(settings) {
        Ok((syncer, identity)) => {
            if let Err(err) = syncer.push(&identity, ledger.snapshot()).await {
                tracing::warn!("push after save failed: {err}");
            }
        }
        Err(err) => tracing::warn!("sync unavailable: {err}"),
    }
}
