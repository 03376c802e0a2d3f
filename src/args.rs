//! These structs provide the CLI interface for the txdash CLI.

use crate::filter::{FilterCriterion, FilterKind};
use crate::model::RecordId;
use crate::view::OutputFormat;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// txdash: A command-line dashboard for customers and their transactions.
///
/// The purpose of this program is to fetch customers and transactions from a remote service,
/// show the customers that match a name or amount filter, and chart the daily transaction totals
/// of one customer.
///
/// Run `txdash init` once to create the configuration. Set TXDASH_IN_TEST_MODE to any value to
/// use built-in sample data instead of the remote service.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// The configuration holds the address of the remote service that serves the `customers`
    /// and `transactions` collections, along with timeout and retry settings. By default the
    /// directory is $HOME/.txdash; pass --txdash-home to put it somewhere else.
    Init(InitArgs),
    /// Print the customers that pass the filter, each with their transactions.
    Customers(CustomersArgs),
    /// Print the daily transaction totals of one customer.
    Chart(ChartArgs),
    /// Print the filtered customers followed by the chart of the selected customer.
    Dashboard(DashboardArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the txdash configuration is held. Defaults to ~/.txdash
    #[arg(long, env = "TXDASH_HOME", default_value_t = default_txdash_home())]
    txdash_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, txdash_home: PathBuf) -> Self {
        Self {
            log_level,
            txdash_home: txdash_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn txdash_home(&self) -> &DisplayPath {
        &self.txdash_home
    }
}

/// (Not shown): Args for the `txdash init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The address of the remote service, e.g. http://localhost:1000
    #[arg(long)]
    base_url: Option<String>,
}

impl InitArgs {
    pub fn new(base_url: Option<String>) -> Self {
        Self { base_url }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}

/// (Not shown): Where to fetch from, shared by the data commands.
#[derive(Debug, Parser, Clone, Default)]
pub struct SourceArgs {
    /// Overrides the address of the remote service stored in config.json.
    #[arg(long)]
    base_url: Option<String>,
}

impl SourceArgs {
    pub fn new(base_url: Option<String>) -> Self {
        Self { base_url }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}

/// (Not shown): The active filter, shared by `customers` and `dashboard`.
#[derive(Debug, Parser, Clone, Default)]
pub struct FilterArgs {
    /// Match customers by a case-insensitive substring of their name, or by the exact amount of
    /// any of their transactions.
    #[arg(long, value_enum, default_value_t = FilterKind::Name)]
    filter_kind: FilterKind,

    /// The filter value. An empty value, or an amount that is not a number, shows everyone.
    #[arg(long, default_value = "")]
    value: String,
}

impl FilterArgs {
    pub fn new(filter_kind: FilterKind, value: impl Into<String>) -> Self {
        Self {
            filter_kind,
            value: value.into(),
        }
    }

    pub fn criterion(&self) -> FilterCriterion {
        FilterCriterion::new(self.filter_kind, self.value.clone())
    }
}

/// (Not shown): Args for the `txdash customers` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct CustomersArgs {
    #[clap(flatten)]
    source: SourceArgs,

    #[clap(flatten)]
    filter: FilterArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl CustomersArgs {
    pub fn new(source: SourceArgs, filter: FilterArgs, format: OutputFormat) -> Self {
        Self {
            source,
            filter,
            format,
        }
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }

    pub fn filter(&self) -> &FilterArgs {
        &self.filter
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// (Not shown): Args for the `txdash chart` command.
#[derive(Debug, Parser, Clone)]
pub struct ChartArgs {
    #[clap(flatten)]
    source: SourceArgs,

    /// The id of the customer to chart.
    #[arg(long)]
    customer: RecordId,

    /// Order the days chronologically instead of by first appearance.
    #[arg(long)]
    sorted: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ChartArgs {
    pub fn new(
        source: SourceArgs,
        customer: impl Into<RecordId>,
        sorted: bool,
        format: OutputFormat,
    ) -> Self {
        Self {
            source,
            customer: customer.into(),
            sorted,
            format,
        }
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }

    pub fn customer(&self) -> &RecordId {
        &self.customer
    }

    pub fn sorted(&self) -> bool {
        self.sorted
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// (Not shown): Args for the `txdash dashboard` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct DashboardArgs {
    #[clap(flatten)]
    source: SourceArgs,

    #[clap(flatten)]
    filter: FilterArgs,

    /// The id of the customer to chart. Without it only the customers are shown.
    #[arg(long)]
    customer: Option<RecordId>,

    /// Output format. CSV cannot be combined with --customer.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl DashboardArgs {
    pub fn new(
        source: SourceArgs,
        filter: FilterArgs,
        customer: Option<RecordId>,
        format: OutputFormat,
    ) -> Self {
        Self {
            source,
            filter,
            customer,
            format,
        }
    }

    pub fn source(&self) -> &SourceArgs {
        &self.source
    }

    pub fn filter(&self) -> &FilterArgs {
        &self.filter
    }

    pub fn customer(&self) -> Option<&RecordId> {
        self.customer.as_ref()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

fn default_txdash_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join(".txdash"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --txdash-home or TXDASH_HOME instead of relying on the default \
                txdash home directory.",
            );
            PathBuf::from(".txdash")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
