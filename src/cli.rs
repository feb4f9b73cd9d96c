//! Command-line interface.

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::reproduce::DEFAULT_ATTEMPTS;

/// Probe an HTTP endpoint and report its uptime.
#[derive(Parser, Debug)]
#[command(name = "uptrail", version)]
pub struct Cli {
    /// SQLite database holding the request log
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Availability window size in seconds
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub window_secs: Option<i64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Poll the endpoint and record every response
    Monitor {
        /// Endpoint that names are posted to
        #[arg(long)]
        api_url: Option<String>,
        /// Seconds between requests
        #[arg(long)]
        interval_secs: Option<u64>,
        /// Length of the run in minutes
        #[arg(long)]
        duration_mins: Option<f64>,
        /// CSV file with a `name` column
        #[arg(long)]
        names: Option<String>,
    },
    /// Print the uptime report to stdout
    Report,
    /// Write the HTML dashboard to a file
    Dashboard {
        /// Output path for the HTML page
        #[arg(long)]
        output: Option<String>,
    },
    /// Serve the dashboard and JSON API over HTTP
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Check which names trigger the endpoint's deterministic server error
    Reproduce {
        /// Endpoint that names are posted to
        #[arg(long)]
        api_url: Option<String>,
        /// CSV file with a `name` column; defaults to built-in URL patterns
        #[arg(long)]
        names: Option<String>,
        /// Attempts per name while the endpoint reports an outage
        #[arg(long, default_value_t = DEFAULT_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
        attempts: u32,
    },
}

impl Cli {
    /// Overlay flags given on the command line onto `cfg`.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(db_path) = &self.db_path {
            cfg.db_path = db_path.clone();
        }
        if let Some(window_secs) = self.window_secs {
            cfg.window_secs = window_secs;
        }

        match &self.command {
            Command::Monitor {
                api_url,
                interval_secs,
                duration_mins,
                names,
            } => {
                if let Some(v) = api_url {
                    cfg.api_url = v.clone();
                }
                if let Some(v) = interval_secs {
                    cfg.interval_secs = *v;
                }
                if let Some(v) = duration_mins {
                    cfg.duration_mins = *v;
                }
                if let Some(v) = names {
                    cfg.names_path = v.clone();
                }
            }
            Command::Dashboard { output } => {
                if let Some(v) = output {
                    cfg.output_path = v.clone();
                }
            }
            Command::Serve { port } => {
                if let Some(v) = port {
                    cfg.http_port = *v;
                }
            }
            Command::Reproduce { api_url, .. } => {
                if let Some(v) = api_url {
                    cfg.api_url = v.clone();
                }
            }
            Command::Report => {}
        }
    }
}
