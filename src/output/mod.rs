mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::export_snapshot;
pub use progress::FetchProgress;
pub use styling::{dim, magenta_bold};
pub use summary::print_summary;

/// Output formats of the `snapshot` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Terminal tables
    #[default]
    Summary,
    Json,
    Csv,
}

/// Prints the exporter banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("📈 jenkins-exporter"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Jenkins build metrics for Prometheus")
    );
}
