use crate::api::Mode;
use crate::args::CustomersArgs;
use crate::commands::{load_config, ready_session, Out};
use crate::error::{ErrorType, IntoResult};
use crate::view::{self, Rows};
use crate::Result;
use std::path::Path;

/// Fetches the data and lists the customers that pass the filter, each with their transactions.
pub async fn customers(txdash_home: &Path, mode: Mode, args: CustomersArgs) -> Result<Out<Rows>> {
    let config = load_config(txdash_home, args.source()).await?;
    let mut session = ready_session(&config, mode).await?;
    session.set_criterion(args.filter().criterion());

    let rows = session.customer_rows();
    let rendered = view::render_customers(&rows, args.format()).pub_result(ErrorType::Output)?;
    Ok(Out::new(format!("Showing {} customers", rows.len()), rendered))
}
