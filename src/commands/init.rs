use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::view::Rows;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and an initial `config.json` using `base_url`, or the default
/// address `http://localhost:1000` when it is `None`. The written configuration is returned.
///
/// # Errors
/// - Returns an error if `base_url` is not an http(s) URL or if any file operation fails.
pub async fn init(txdash_home: &Path, base_url: Option<&str>) -> Result<Out<Rows>> {
    let config = Config::create(txdash_home, base_url)
        .await
        .context("Unable to create the data directory and config")
        .pub_result(ErrorType::Config)?;
    let json = config.to_json().pub_result(ErrorType::Output)?;
    Ok(Out::new(
        format!(
            "Successfully created the txdash config at {}",
            config.config_path().display()
        ),
        Rows::Json(json),
    ))
}
