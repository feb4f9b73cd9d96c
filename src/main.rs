//! uptrail command-line entry point.

use uptrail::cli::{Cli, Command};
use uptrail::config::Config;
use uptrail::db::Store;
use uptrail::monitor::Monitor;
use uptrail::names;
use uptrail::probe::HttpProbe;
use uptrail::report::{render_text, Dashboard, Snapshot};
use uptrail::reproduce::{Reproducer, Reproduction, CONTROL_NAMES, EXAMPLE_DOMAIN_NAMES};
use uptrail::web::Server;

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Logs go to stderr so reports on stdout stay clean
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "uptrail=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), BoxError> {
    let mut cfg = Config::load()?;
    cli.apply(&mut cfg);
    cfg.validate()?;

    match cli.command {
        Command::Reproduce { names, attempts, .. } => reproduce(&cfg, names.as_deref(), attempts).await,
        Command::Monitor { .. } => monitor(cfg).await,
        Command::Report => report(&cfg),
        Command::Dashboard { .. } => dashboard(&cfg),
        Command::Serve { .. } => serve(cfg).await,
    }
}

async fn monitor(cfg: Config) -> Result<(), BoxError> {
    tracing::info!("Using database at {}", cfg.db_path);
    let store = Arc::new(Store::new(&cfg.db_path)?);
    let probe = HttpProbe::new(&cfg.api_url, cfg.request_timeout())?;
    let names = names::load_names_or_fallback(&cfg.names_path);

    let summary = Monitor::new(store, probe, names, cfg.interval(), cfg.duration())
        .run()
        .await?;

    println!("Monitoring completed!");
    println!("Total requests made: {}", summary.requests);
    println!("Duration: {:.1} minutes", summary.elapsed.as_secs_f64() / 60.0);
    Ok(())
}

fn report(cfg: &Config) -> Result<(), BoxError> {
    let store = Store::open_existing(&cfg.db_path)?;

    match Snapshot::load(&store, cfg.window_secs)? {
        Some(snapshot) => print!("{}", render_text(&snapshot.report, &cfg.db_path)?),
        None => println!("No data found in database. Run `uptrail monitor` first."),
    }
    Ok(())
}

fn dashboard(cfg: &Config) -> Result<(), BoxError> {
    let store = Store::open_existing(&cfg.db_path)?;
    let snapshot = Snapshot::load(&store, cfg.window_secs)?
        .ok_or("no monitoring data found in database")?;

    let windows = snapshot.windows()?;
    let page = Dashboard {
        report: &snapshot.report,
        windows: &windows,
        endpoint: &cfg.api_url,
        generated_at: chrono::Utc::now(),
    }
    .render()?;
    std::fs::write(&cfg.output_path, page)?;

    let requests = &snapshot.report.request_uptime;
    println!("Dashboard generated: {}", cfg.output_path);
    println!(
        "Results: {:.2}% success rate ({}/{} requests)",
        requests.percentage, requests.successful, requests.total
    );
    Ok(())
}

async fn serve(cfg: Config) -> Result<(), BoxError> {
    tracing::info!("Using database at {}", cfg.db_path);
    let store = Arc::new(Store::new(&cfg.db_path)?);
    Server::new(cfg, store).start().await
}

async fn reproduce(cfg: &Config, names_path: Option<&str>, attempts: u32) -> Result<(), BoxError> {
    let probe = HttpProbe::new(&cfg.api_url, cfg.request_timeout())?;
    let reproducer = Reproducer::new(probe).attempts(attempts);

    println!("Reproducing server errors against {}", cfg.api_url);
    println!("{}", "=".repeat(70));

    let expected = match names_path {
        Some(path) => {
            let names = names::load_names(path)?;
            if names.is_empty() {
                return Err(format!("no names found in {}", path).into());
            }
            println!("\nNames from {}:", path);
            check_all(&reproducer, names.as_slice()).await
        }
        None => {
            println!("\nExample-domain names (expected to fail):");
            let expected = check_all(&reproducer, EXAMPLE_DOMAIN_NAMES).await;

            println!("\nControl names (expected to succeed):");
            let controls = check_all(&reproducer, CONTROL_NAMES).await;
            if controls.reproduced() > 0 {
                println!("  {} control names also failed", controls.reproduced());
            }
            expected
        }
    };

    println!("\n{}", "=".repeat(70));
    println!("Summary:");
    println!("  Bug reproduced: {}/{} names", expected.reproduced(), expected.total());
    println!("  Reproduction rate: {:.1}%", expected.rate());
    Ok(())
}

async fn check_all<S: AsRef<str>>(reproducer: &Reproducer, names: &[S]) -> Reproduction {
    let result = reproducer.run(names).await;
    for finding in &result.findings {
        println!("{}", finding);
    }
    result
}
