//! `crawldash`: command-line dashboard for the crawl service.
//!
//! ```text
//! crawldash [--config <path>] [--token <t>] [--api-key <k>] <command>
//! ```

mod config;
mod logging;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crawldash_core::{JobId, JobStatus, Query, SortField, SortOrder};
use crawldash_engine::{
    CredentialSource, Dashboard, DetailFetcher, JobsApi, ReqwestTransport, StaticCredentials,
    TransportSettings,
};
use crawldash_logging::{dash_info, dash_warn};

use crate::config::Settings;
use crate::logging::LogDestination;

const WATCH_REDRAW: Duration = Duration::from_millis(250);

/// Manage crawl jobs on a crawl service.
#[derive(Parser)]
#[command(name = "crawldash", version, about = "Manage and watch crawl jobs")]
struct Cli {
    /// Settings file.
    #[arg(long, global = true, default_value = config::DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Session bearer token. Takes precedence over an API key.
    #[arg(long, global = true, env = "CRAWLDASH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, global = true, env = "CRAWLDASH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Overrides the base URL from the settings file for this run.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show one page of jobs.
    List(ListArgs),
    /// Submit a URL for crawling.
    Add {
        url: String,
        /// Only queue the job, even if auto-start is enabled.
        #[arg(long)]
        no_start: bool,
    },
    Start { id: JobId },
    Stop { id: JobId },
    /// Delete one or more jobs.
    Delete {
        #[arg(required = true)]
        ids: Vec<JobId>,
    },
    /// Queue finished or failed jobs again.
    Rerun {
        #[arg(required = true)]
        ids: Vec<JobId>,
    },
    /// Show a job with its broken links.
    Show { id: JobId },
    /// Keep a page on screen and refresh it while jobs are active.
    Watch {
        #[command(flatten)]
        list: ListArgs,
        /// Refresh period in seconds (defaults to the settings file).
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Print the settings, or change and save them.
    Settings(SettingsArgs),
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = crawldash_core::DEFAULT_PAGE_SIZE)]
    limit: u32,
    /// created_at, url, status, page_title, started_at or completed_at.
    #[arg(long, default_value = "created_at")]
    sort: SortField,
    #[arg(long, default_value = "desc")]
    order: SortOrder,
    /// Matches URL or page title.
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    status: Option<JobStatus>,
}

impl ListArgs {
    fn query(&self) -> Query {
        let mut query = Query::new(self.page, self.limit)
            .with_sort(self.sort, self.order)
            .with_status(self.status);
        if let Some(search) = &self.search {
            query = query.with_search(search.clone());
        }
        query
    }
}

#[derive(Args)]
struct SettingsArgs {
    #[arg(long)]
    base_url: Option<String>,
    /// Seconds between refreshes; 2, 5, 10, 30 or 60.
    #[arg(long)]
    poll_interval: Option<u64>,
    #[arg(long)]
    auto_start: Option<bool>,
    /// error, warn, info, debug or trace.
    #[arg(long)]
    log_level: Option<String>,
    #[arg(long, value_enum)]
    log_destination: Option<LogDestination>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = config::load(&cli.config);
    let settings = loaded.settings;
    logging::initialize(settings.log_destination, settings.level_filter());
    if let Some(warning) = loaded.warning {
        dash_warn!("{}", warning);
    }

    let credentials: Arc<dyn CredentialSource> = Arc::new(StaticCredentials::new(
        cli.token.clone(),
        cli.api_key.clone(),
    ));
    let base_url = cli
        .base_url
        .clone()
        .unwrap_or_else(|| settings.base_url.clone());
    let transport = TransportSettings::with_base_url(base_url);
    dash_info!("Using crawl service at {}", transport.base_url);

    match cli.command {
        Command::List(args) => {
            let dashboard = connect(&transport, &credentials, settings.poll_interval())?;
            dashboard.list(args.query()).await?;
            print!("{}", render::render_jobs(&dashboard.view()));
        }
        Command::Add { url, no_start } => {
            let dashboard = connect(&transport, &credentials, settings.poll_interval())?;
            let auto_start = settings.auto_start && !no_start;
            let job = dashboard.add(&url, auto_start).await?;
            let status = dashboard
                .jobs()
                .iter()
                .find(|held| held.id == job.id)
                .map_or(job.status, |held| held.status);
            println!("Added job #{} ({}) for {}", job.id, status, job.url);
            if let Some(error) = dashboard.view().error {
                println!("Warning: {error}");
            }
        }
        Command::Start { id } => {
            let dashboard = connect(&transport, &credentials, settings.poll_interval())?;
            dashboard.start(id).await?;
            println!("Started job #{id}");
        }
        Command::Stop { id } => {
            let dashboard = connect(&transport, &credentials, settings.poll_interval())?;
            dashboard.stop(id).await?;
            println!("Stopped job #{id}");
        }
        Command::Delete { ids } => {
            let dashboard = connect(&transport, &credentials, settings.poll_interval())?;
            dashboard.delete(&ids).await?;
            println!("Deleted {} job(s)", ids.len());
        }
        Command::Rerun { ids } => {
            let dashboard = connect(&transport, &credentials, settings.poll_interval())?;
            dashboard.rerun(&ids).await?;
            println!("Queued {} job(s) again", ids.len());
        }
        Command::Show { id } => {
            let transport = ReqwestTransport::new(transport, credentials)
                .context("building HTTP client")?;
            let fetcher = DetailFetcher::new(JobsApi::new(Arc::new(transport)));
            fetcher.select(Some(id)).await?;
            match fetcher.detail() {
                Some(detail) => print!("{}", render::render_detail(&detail)),
                None => bail!("job #{id} returned no detail"),
            }
        }
        Command::Watch { list, interval } => {
            let period = match interval {
                Some(0) => bail!("--interval must be at least 1 second"),
                Some(secs) => Duration::from_secs(secs),
                None => settings.poll_interval(),
            };
            let dashboard = connect(&transport, &credentials, period)?;
            watch(&dashboard, list.query()).await?;
        }
        Command::Settings(args) => update_settings(&cli.config, settings, args)?,
    }

    Ok(())
}

fn connect(
    transport: &TransportSettings,
    credentials: &Arc<dyn CredentialSource>,
    poll_interval: Duration,
) -> Result<Dashboard> {
    Dashboard::connect(transport.clone(), credentials.clone(), poll_interval)
        .context("connecting to the crawl service")
}

async fn watch(dashboard: &Dashboard, query: Query) -> Result<()> {
    dashboard.list(query).await?;
    dashboard.consume_dirty();
    print!("{}", render::render_jobs(&dashboard.view()));
    if !dashboard.is_polling() {
        println!("No active jobs to watch.");
        return Ok(());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = tokio::time::sleep(WATCH_REDRAW) => {}
        }
        if dashboard.consume_dirty() {
            println!();
            print!("{}", render::render_jobs(&dashboard.view()));
        }
        if !dashboard.is_polling() {
            println!("All jobs finished.");
            break;
        }
    }
    dashboard.shutdown();
    Ok(())
}

fn update_settings(path: &Path, mut settings: Settings, args: SettingsArgs) -> Result<()> {
    let mut changed = false;
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
        changed = true;
    }
    if let Some(secs) = args.poll_interval {
        if !config::is_preset_interval(secs) {
            bail!("poll interval must be one of 2, 5, 10, 30 or 60 seconds");
        }
        settings.poll_interval_secs = secs;
        changed = true;
    }
    if let Some(auto_start) = args.auto_start {
        settings.auto_start = auto_start;
        changed = true;
    }
    if let Some(level) = args.log_level {
        settings.log_level = level;
        changed = true;
    }
    if let Some(destination) = args.log_destination {
        settings.log_destination = destination;
        changed = true;
    }

    if changed {
        config::save(path, &settings)?;
        dash_info!("Saved settings to {:?}", path);
    }

    println!("base_url:      {}", settings.base_url);
    println!("poll_interval: {}s", settings.poll_interval().as_secs());
    println!("auto_start:    {}", settings.auto_start);
    println!("log_level:     {}", settings.level_filter());
    println!("log_dest:      {:?}", settings.log_destination);
    Ok(())
}
