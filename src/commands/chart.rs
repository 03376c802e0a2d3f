use crate::api::Mode;
use crate::args::ChartArgs;
use crate::commands::{load_config, ready_session, Out};
use crate::error::{ErrorType, IntoResult};
use crate::view::{self, ChartSeries, Rows};
use crate::Result;
use anyhow::anyhow;
use std::path::Path;

/// Fetches the data and renders the daily transaction totals of one customer. Days are listed in
/// the order they first appear unless `--sorted` is given.
///
/// # Errors
/// - `ErrorType::Request` if no customer has the requested id.
pub async fn chart(txdash_home: &Path, mode: Mode, args: ChartArgs) -> Result<Out<Rows>> {
    let config = load_config(txdash_home, args.source()).await?;
    let mut session = ready_session(&config, mode).await?;
    if !session.select_customer(args.customer()) {
        return Err(anyhow!("There is no customer with id '{}'", args.customer()))
            .pub_result(ErrorType::Request);
    }

    let mut series = session
        .chart()
        .ok_or_else(|| anyhow!("No customer is selected"))
        .pub_result(ErrorType::Request)?;
    if args.sorted() {
        let points = series.points().clone().sorted_by_date();
        series = ChartSeries::new(series.customer().clone(), points);
    }
    let rendered = view::render_chart(&series, args.format()).pub_result(ErrorType::Output)?;
    Ok(Out::new(
        format!(
            "Charting {} days of transactions for {}",
            series.points().len(),
            series.customer().name()
        ),
        rendered,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::SourceArgs;
    use crate::test_env::TestEnv;
    use crate::view::OutputFormat;

    #[tokio::test]
    async fn test_chart_csv() {
        let env = TestEnv::new().await;
        let args = ChartArgs::new(SourceArgs::default(), 1, false, OutputFormat::Csv);
        let out = chart(env.home(), Mode::Test, args).await.unwrap();
        assert_eq!(
            out.structure().unwrap().to_string(),
            "Date,Total\n2022-01-01,1000\n2022-01-02,2150\n"
        );
    }

    #[tokio::test]
    async fn test_chart_string_customer_id() {
        let env = TestEnv::new().await;
        let args = ChartArgs::new(SourceArgs::default(), "4", true, OutputFormat::Json);
        let out = chart(env.home(), Mode::Test, args).await.unwrap();
        let Some(Rows::Json(json)) = out.structure() else {
            panic!("expected JSON output")
        };
        assert_eq!(json["customer"]["name"], "Sarah Reda");
        assert_eq!(json["points"][1]["total"], -200);
    }

    #[tokio::test]
    async fn test_chart_unknown_customer() {
        let env = TestEnv::new().await;
        let args = ChartArgs::new(SourceArgs::default(), 9, false, OutputFormat::Table);
        let err = chart(env.home(), Mode::Test, args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
    }
}
