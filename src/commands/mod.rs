//! Command handlers for the txdash CLI.
//!
//! Every data command follows the same path: load the config, apply the `--base-url` override,
//! fetch through the `DataSource` into a ready `Session`, apply the user's filter and selection,
//! then render.

mod chart;
mod customers;
mod dashboard;
mod init;

use crate::api::{self, Mode};
use crate::args::SourceArgs;
use crate::error::{ErrorType, IntoResult};
use crate::session::Session;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::path::Path;
use tracing::{debug, info};

pub use chart::chart;
pub use customers::customers;
pub use dashboard::dashboard;
pub use init::init;

/// The output type for a command: a message for the log and, optionally, structured data that
/// is printed to stdout.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug + Display,
{
    /// Logs the message with `info!` and prints the structured data, if any, to stdout.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            println!("{structure}");
        }
    }
}

/// Loads `$TXDASH_HOME/config.json` and applies the `--base-url` override.
async fn load_config(home: &Path, source: &SourceArgs) -> Result<Config> {
    let config = Config::load(home).await.pub_result(ErrorType::Config)?;
    match source.base_url() {
        Some(base_url) => {
            debug!("Overriding the configured base url with {base_url}");
            config.with_base_url(base_url).pub_result(ErrorType::Config)
        }
        None => Ok(config),
    }
}

/// Fetches both collections and returns a `Ready` session, or the fetch error.
async fn ready_session(config: &Config, mode: Mode) -> Result<Session> {
    let data_source = api::data_source(config, mode).pub_result(ErrorType::Fetch)?;
    Session::load(&data_source).await.into_ready()
}
