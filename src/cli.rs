use anyhow::{bail, Context, Result};
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::jenkins::JenkinsClient;
use crate::metrics::{build_metric_set, Property};
use crate::output::{self, FetchProgress, OutputFormat};
use crate::poller::Poller;
use crate::server;
use crate::sink::JobGauges;
use crate::snapshot::Snapshot;

#[derive(Parser)]
#[command(name = "jenkins-exporter")]
#[command(author, version, about = "Jenkins build metrics for Prometheus", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (toml, json or yaml)
    #[arg(short, long, global = true, env = "JENKINS_EXPORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Default log filter when RUST_LOG is not set (e.g. debug, info, warn)
    #[arg(long, global = true, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll Jenkins periodically and serve the gauges on /metrics
    Serve {
        #[command(flatten)]
        jenkins: JenkinsArgs,

        #[command(flatten)]
        exporter: ExporterArgs,
    },
    /// Fetch once and print the derived metrics
    Snapshot {
        #[command(flatten)]
        jenkins: JenkinsArgs,

        /// Also derive skip/fail/total/pass test counts
        #[arg(
            long,
            num_args = 0..=1,
            require_equals = true,
            default_missing_value = "true",
            value_parser = BoolishValueParser::new()
        )]
        test_counts: Option<bool>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,

        #[arg(short, long, default_value_t = false)]
        pretty: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a configuration file with default values
    InitConfig {
        #[arg(default_value = "jenkins-exporter.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct JenkinsArgs {
    #[arg(long, env = "JENKINS_HOST")]
    host: Option<String>,

    #[arg(long, env = "JENKINS_PORT")]
    port: Option<u16>,

    #[arg(long, env = "JENKINS_PATH")]
    path: Option<String>,

    /// Use HTTPS (`--ssl=false` turns it off)
    #[arg(
        long,
        env = "JENKINS_SSL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    ssl: Option<bool>,

    /// Request timeout in seconds
    #[arg(long, env = "JENKINS_TIMEOUT")]
    timeout: Option<u64>,

    #[arg(short, long, env = "JENKINS_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "JENKINS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[arg(short, long, env = "JENKINS_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Args)]
struct ExporterArgs {
    /// Address to serve /metrics on
    #[arg(short, long, env = "EXPORTER_LISTEN")]
    listen: Option<String>,

    /// Seconds between two polls
    #[arg(short = 'r', long, env = "METRICS_UPDATE_RATE")]
    update_rate: Option<u64>,

    /// Prefix of the published metric names
    #[arg(long)]
    namespace: Option<String>,

    /// Also publish skip/fail/total/pass test counts
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    test_counts: Option<bool>,
}

impl JenkinsArgs {
    fn apply(&self, config: &mut Config) {
        let jenkins = &mut config.jenkins;
        if let Some(host) = &self.host {
            jenkins.host.clone_from(host);
        }
        if let Some(port) = self.port {
            jenkins.port = port;
        }
        if let Some(path) = &self.path {
            jenkins.path.clone_from(path);
        }
        if let Some(ssl) = self.ssl {
            jenkins.ssl = ssl;
        }
        if let Some(timeout) = self.timeout {
            jenkins.timeout_secs = timeout;
        }
        if self.username.is_some() {
            jenkins.username.clone_from(&self.username);
        }
        if self.password.is_some() {
            jenkins.password.clone_from(&self.password);
        }
        if self.token.is_some() {
            jenkins.token.clone_from(&self.token);
        }
    }
}

impl ExporterArgs {
    fn apply(&self, config: &mut Config) {
        let exporter = &mut config.exporter;
        if let Some(listen) = &self.listen {
            exporter.listen.clone_from(listen);
        }
        if let Some(rate) = self.update_rate {
            exporter.update_rate_secs = rate;
        }
        if let Some(namespace) = &self.namespace {
            exporter.namespace.clone_from(namespace);
        }
        if let Some(test_counts) = self.test_counts {
            exporter.test_counts = test_counts;
        }
    }
}

impl Cli {
    /// Loads the configuration file and applies command-line overrides on top.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Serve { jenkins, exporter } => {
                jenkins.apply(&mut config);
                exporter.apply(&mut config);
            }
            Commands::Snapshot {
                jenkins,
                test_counts,
                ..
            } => {
                jenkins.apply(&mut config);
                if let Some(test_counts) = *test_counts {
                    config.exporter.test_counts = test_counts;
                }
            }
            Commands::InitConfig { .. } => {}
        }
        if let Some(level) = &self.log_level {
            config.exporter.log_level.clone_from(level);
        }

        config.validate()?;
        Ok(config)
    }

    async fn execute_serve(&self, config: &Config) -> Result<()> {
        let properties = Property::enabled(config.exporter.test_counts);
        let gauges = Arc::new(JobGauges::new(&config.exporter.namespace, &properties)?);
        let client = JenkinsClient::new(&config.jenkins)?;
        let addr = config.listen_addr()?;

        let poller = Poller::new(
            client,
            gauges.clone(),
            properties,
            Duration::from_secs(config.exporter.update_rate_secs),
        );

        // Whichever side fails first takes the process down.
        tokio::select! {
            result = poller.run() => result.context("Metrics update loop stopped")?,
            result = server::serve(addr, gauges) => result.context("Metrics server stopped")?,
        }

        Ok(())
    }

    async fn execute_snapshot(
        &self,
        config: &Config,
        format: OutputFormat,
        pretty: bool,
        output_path: Option<&Path>,
    ) -> Result<()> {
        let properties = Property::enabled(config.exporter.test_counts);
        let client = JenkinsClient::new(&config.jenkins)?;
        let server = client.api_url().origin().ascii_serialization();

        let progress = FetchProgress::start(&server);
        let jobs = match client.fetch_jobs().await {
            Ok(jobs) => {
                progress.finish(jobs.len());
                jobs
            }
            Err(e) => {
                progress.abandon();
                return Err(e).context("Failed to fetch jobs from Jenkins");
            }
        };

        let sets = jobs
            .iter()
            .map(|job| build_metric_set(job, &properties))
            .collect();
        let snapshot = Snapshot::new(server, sets);

        if format == OutputFormat::Summary {
            output::print_summary(&snapshot);
            return Ok(());
        }

        if let Some(path) = output_path {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            output::export_snapshot(&snapshot, format, pretty, &mut file)?;
            info!("Snapshot written to: {}", path.display());
        } else {
            output::export_snapshot(&snapshot, format, pretty, &mut std::io::stdout())?;
        }

        Ok(())
    }

    fn execute_init_config(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!(
                "{} already exists, pass --force to overwrite it",
                path.display()
            );
        }
        Config::default().save(path)?;
        info!("Default configuration written to: {}", path.display());
        Ok(())
    }

    pub async fn execute(&self, config: &Config) -> Result<()> {
        match &self.command {
            Commands::Serve { .. } => self.execute_serve(config).await,
            Commands::Snapshot {
                format,
                pretty,
                output,
                ..
            } => {
                self.execute_snapshot(config, *format, *pretty, output.as_deref())
                    .await
            }
            Commands::InitConfig { path, force } => Self::execute_init_config(path, *force),
        }
    }
}
