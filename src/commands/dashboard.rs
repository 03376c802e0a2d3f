use crate::api::Mode;
use crate::args::DashboardArgs;
use crate::commands::{load_config, ready_session, Out};
use crate::error::{ErrorType, IntoResult};
use crate::view::{self, OutputFormat, Rows};
use crate::Result;
use anyhow::anyhow;
use std::path::Path;

/// Fetches the data once and renders the filtered customers together with the chart of the
/// selected customer. The selection does not have to pass the filter.
///
/// # Errors
/// - `ErrorType::Request` for an unknown customer, or for CSV output together with a chart.
pub async fn dashboard(txdash_home: &Path, mode: Mode, args: DashboardArgs) -> Result<Out<Rows>> {
    if args.format() == OutputFormat::Csv && args.customer().is_some() {
        return Err(anyhow!(
            "CSV output cannot hold both the customers and the chart, use --format table or json, \
            or the customers and chart commands"
        ))
        .pub_result(ErrorType::Request);
    }
    let config = load_config(txdash_home, args.source()).await?;
    let mut session = ready_session(&config, mode).await?;
    session.set_criterion(args.filter().criterion());
    if let Some(id) = args.customer() {
        if !session.select_customer(id) {
            return Err(anyhow!("There is no customer with id '{id}'"))
                .pub_result(ErrorType::Request);
        }
    }

    let dashboard = session
        .dashboard()
        .ok_or_else(|| anyhow!("The data has not been loaded"))
        .pub_result(ErrorType::Fetch)?;
    let rendered =
        view::render_dashboard(&dashboard, args.format()).pub_result(ErrorType::Output)?;
    let message = match dashboard.chart() {
        Some(chart) => format!(
            "Showing {} customers and the chart for {}",
            dashboard.rows().len(),
            chart.customer().name()
        ),
        None => format!("Showing {} customers", dashboard.rows().len()),
    };
    Ok(Out::new(message, rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{FilterArgs, SourceArgs};
    use crate::filter::FilterKind;
    use crate::model::RecordId;
    use crate::test_env::{MockServer, TestEnv};

    #[tokio::test]
    async fn test_dashboard_selection_outside_filter() {
        let env = TestEnv::new().await;
        let args = DashboardArgs::new(
            SourceArgs::default(),
            FilterArgs::new(FilterKind::Name, "mina"),
            Some(RecordId::from(1)),
            OutputFormat::Json,
        );
        let out = dashboard(env.home(), Mode::Test, args).await.unwrap();
        assert_eq!(
            out.message(),
            "Showing 1 customers and the chart for Ahmed Ali"
        );
        let Some(Rows::Json(json)) = out.structure() else {
            panic!("expected JSON output")
        };
        assert_eq!(json["rows"][0]["customer"]["name"], "Mina Adel");
        assert_eq!(json["chart"]["points"][1]["total"], 2150);
    }

    #[tokio::test]
    async fn test_dashboard_unparsable_amount_shows_everyone() {
        let env = TestEnv::new().await;
        let args = DashboardArgs::new(
            SourceArgs::default(),
            FilterArgs::new(FilterKind::Amount, "abc"),
            None,
            OutputFormat::Table,
        );
        let out = dashboard(env.home(), Mode::Test, args).await.unwrap();
        assert_eq!(out.message(), "Showing 5 customers");
    }

    #[tokio::test]
    async fn test_dashboard_over_http() {
        let server = MockServer::new()
            .route(
                "/customers",
                200,
                r#"[{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}]"#,
            )
            .route(
                "/transactions",
                200,
                r#"[
                    {"id": 1, "customer_id": 1, "date": "2024-01-01T10:00", "amount": 50},
                    {"id": 2, "customer_id": 1, "date": "2024-01-01T15:00", "amount": 30},
                    {"id": 3, "customer_id": 1, "date": "2024-01-02T09:00", "amount": 20}
                ]"#,
            )
            .start()
            .await;
        let env = TestEnv::new().await;
        let args = DashboardArgs::new(
            SourceArgs::new(Some(server.base_url())),
            FilterArgs::new(FilterKind::Amount, "30"),
            Some(RecordId::from("1")),
            OutputFormat::Json,
        );
        let out = dashboard(env.home(), Mode::Http, args).await.unwrap();
        let Some(Rows::Json(json)) = out.structure() else {
            panic!("expected JSON output")
        };
        assert_eq!(json["rows"].as_array().unwrap().len(), 1);
        assert_eq!(json["rows"][0]["customer"]["name"], "Alice");
        assert_eq!(
            json["chart"]["points"],
            serde_json::json!([
                {"date": "2024-01-01", "total": 80},
                {"date": "2024-01-02", "total": 20}
            ])
        );
        assert_eq!(server.hits("/customers"), 1);
        assert_eq!(server.hits("/transactions"), 1);
    }

    #[tokio::test]
    async fn test_dashboard_csv_with_chart_is_rejected() {
        let env = TestEnv::new().await;
        let args = DashboardArgs::new(
            SourceArgs::default(),
            FilterArgs::default(),
            Some(RecordId::from(1)),
            OutputFormat::Csv,
        );
        let err = dashboard(env.home(), Mode::Test, args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);

        let args = DashboardArgs::new(
            SourceArgs::default(),
            FilterArgs::default(),
            None,
            OutputFormat::Csv,
        );
        let out = dashboard(env.home(), Mode::Test, args).await.unwrap();
        let text = out.structure().unwrap().to_string();
        assert!(text.starts_with("Customer ID,Customer Name"));
    }
}
