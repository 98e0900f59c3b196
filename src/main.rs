mod config;
mod contact;
mod filter;
mod logging;
mod remote;
mod sheet;
mod stats;
mod store;
mod ui;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use config::{Config, SourceLocation};
use contact::Contact;
use filter::{FilterEngine, FilterState};
use stats::Stats;
use store::{ContactStore, LoadState};

#[derive(Parser, Debug)]
#[command(name = "sheetdex", version, about)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Read the sheet from a local CSV export instead of the configured source
    #[arg(long, value_name = "CSV", global = true, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Fetch the sheet from this CSV export URL
    #[arg(long, value_name = "URL", global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print contacts matching the given filters
    List(ListArgs),
    /// Print summary counters for the sheet
    Stats(StatsArgs),
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Case-insensitive substring search across the search fields
    #[arg(long)]
    search: Option<String>,

    #[arg(long)]
    list_name: Option<String>,

    #[arg(long)]
    state: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    house_district: Option<String>,

    #[arg(long)]
    senate_district: Option<String>,

    #[arg(long, value_enum)]
    linkedin: Option<Presence>,

    #[arg(long, value_enum)]
    website: Option<Presence>,

    #[arg(long, value_enum)]
    twitter: Option<Presence>,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[command(flatten)]
    filters: FilterArgs,

    /// Emit JSON instead of tab-separated rows
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Emit JSON instead of one counter per line
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Presence {
    Yes,
    No,
}

impl From<Presence> for bool {
    fn from(value: Presence) -> Self {
        matches!(value, Presence::Yes)
    }
}

impl FilterArgs {
    fn into_filter(self) -> FilterState {
        FilterState {
            search: self.search.unwrap_or_default(),
            list_name: self.list_name,
            state: self.state,
            city: self.city,
            house_district: self.house_district,
            senate_district: self.senate_district,
            has_linkedin: self.linkedin.map(bool::from),
            has_website: self.website.map(bool::from),
            has_twitter: self.twitter.map(bool::from),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = config::load(cli.config.as_deref())?;

    if let Some(path) = cli.file {
        config.source.location = Some(SourceLocation::File(config::expand_tilde(&path)));
    } else if let Some(url) = cli.url {
        config.source.location = Some(SourceLocation::Url(url));
    }

    let _log_guard = logging::init(&config.log, cli.command.is_some())?;
    match &config.config_path {
        Some(path) => info!(path = %path.display(), "loaded configuration"),
        None => info!("no configuration file; using defaults"),
    }
    for warning in &config.warnings {
        warn!("{}", warning);
    }

    match cli.command {
        Some(Command::List(args)) => handle_list(args, &config),
        Some(Command::Stats(args)) => handle_stats(args, &config),
        None => {
            let source = config.source.open()?;
            let mut app = ui::app::App::new(&config, source);
            app.run()
        }
    }
}

/// Load the sheet once, failing with the load error.
fn load_contacts(config: &Config) -> Result<Vec<Contact>> {
    let source = config.source.open()?;
    let mut store = ContactStore::new();
    if let LoadState::Error(message) = store.load(source.as_ref(), &config.mapping) {
        bail!("{}", message);
    }
    Ok(store.contacts().to_vec())
}

fn handle_list(args: ListArgs, config: &Config) -> Result<()> {
    let contacts = load_contacts(config)?;
    let engine = FilterEngine::new(config.search_fields.clone());
    let filter = args.filters.into_filter();
    let matches = engine.apply(&contacts, &filter);

    if args.json {
        let json = serde_json::to_string_pretty(&matches).context("failed to encode contacts")?;
        println!("{}", json);
        return Ok(());
    }

    // id<TAB>company<TAB>city<TAB>state<TAB>house<TAB>senate
    for contact in &matches {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            contact.id,
            contact.company_name,
            contact.city,
            contact.state,
            contact.tx_house_district,
            contact.tx_senate_district
        );
    }
    eprintln!("Showing {} of {} companies", matches.len(), contacts.len());

    Ok(())
}

fn handle_stats(args: StatsArgs, config: &Config) -> Result<()> {
    let contacts = load_contacts(config)?;
    let stats = Stats::from_contacts(&contacts);

    if args.json {
        let json = serde_json::to_string_pretty(&stats).context("failed to encode stats")?;
        println!("{}", json);
        return Ok(());
    }

    for (label, count) in stats.entries() {
        println!("{}\t{}", label, count);
    }

    Ok(())
}
