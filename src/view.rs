//! The presentation adapter: display-ready rows and chart series, and their rendering as a
//! table, CSV or JSON.

use crate::aggregate::{DailySeries, DailyTotal};
use crate::error::Res;
use crate::model::{Customer, RecordId, Transaction};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// A customer together with their transactions, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRow {
    customer: Customer,
    transactions: Vec<Transaction>,
}

impl CustomerRow {
    pub fn new(customer: Customer, transactions: Vec<Transaction>) -> Self {
        Self {
            customer,
            transactions,
        }
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

/// The daily totals of one customer, ready to be drawn as a line chart with `date` on the x axis
/// and `total` on the y axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    customer: Customer,
    points: DailySeries,
}

impl ChartSeries {
    pub fn new(customer: Customer, points: DailySeries) -> Self {
        Self { customer, points }
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn points(&self) -> &DailySeries {
        &self.points
    }

    /// Nothing to chart.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn title(&self) -> String {
        format!("Daily Transaction Totals for {}", self.customer.name())
    }
}

/// The whole view: the filtered customer rows and the chart of the selected customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    rows: Vec<CustomerRow>,
    chart: Option<ChartSeries>,
}

impl Dashboard {
    pub fn new(rows: Vec<CustomerRow>, chart: Option<ChartSeries>) -> Self {
        Self { rows, chart }
    }

    pub fn rows(&self) -> &[CustomerRow] {
        &self.rows
    }

    pub fn chart(&self) -> Option<&ChartSeries> {
        self.chart.as_ref()
    }
}

/// The transactions of one customer.
pub fn customer_transactions<'a>(
    transactions: &'a [Transaction],
    customer_id: &'a RecordId,
) -> impl Iterator<Item = &'a Transaction> + 'a {
    transactions
        .iter()
        .filter(move |t| t.customer_id() == customer_id)
}

/// Pairs every customer with their transactions. Transactions of unknown customers are dropped.
pub fn customer_rows(customers: &[Customer], transactions: &[Transaction]) -> Vec<CustomerRow> {
    customers
        .iter()
        .map(|customer| {
            CustomerRow::new(
                customer.clone(),
                customer_transactions(transactions, customer.id())
                    .cloned()
                    .collect(),
            )
        })
        .collect()
}

// =============================================================================
// Rendering
// =============================================================================

/// How command output is printed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A markdown table.
    #[default]
    Table,
    /// Comma separated values with a header row.
    Csv,
    /// Pretty printed JSON.
    Json,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// Rendered output in the requested format.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    /// JSON value, printed pretty.
    Json(serde_json::Value),
    /// Markdown table as a single formatted string.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => write!(f, "Rows::Json({v:?})"),
            Rows::Table(s) => write!(f, "Rows::Table({} lines)", s.lines().count()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} lines)", s.lines().count()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => match serde_json::to_string_pretty(v) {
                Ok(pretty) => f.write_str(&pretty),
                Err(_) => write!(f, "{v}"),
            },
            Rows::Table(s) | Rows::Csv(s) => f.write_str(s),
        }
    }
}

const CUSTOMER_HEADERS: [&str; 5] = [
    "Customer ID",
    "Customer Name",
    "Transaction ID",
    "Date",
    "Amount",
];
const CHART_HEADERS: [&str; 2] = ["Date", "Total"];

/// Renders customer rows, one line per transaction. A customer without transactions still gets a
/// line with the transaction columns left empty.
pub fn render_customers(rows: &[CustomerRow], format: OutputFormat) -> Res<Rows> {
    match format {
        OutputFormat::Json => json(rows),
        OutputFormat::Table => Ok(Rows::Table(table(
            &CUSTOMER_HEADERS,
            customer_cells(rows),
        ))),
        OutputFormat::Csv => Ok(Rows::Csv(csv(&CUSTOMER_HEADERS, customer_cells(rows))?)),
    }
}

/// Renders a chart series as a date/total listing. The table format gets the chart title on top.
pub fn render_chart(series: &ChartSeries, format: OutputFormat) -> Res<Rows> {
    match format {
        OutputFormat::Json => json(series),
        OutputFormat::Table => {
            let body = if series.is_empty() {
                String::from("No transactions to chart.\n")
            } else {
                table(&CHART_HEADERS, chart_cells(series.points(), true))
            };
            Ok(Rows::Table(format!("## {}\n\n{body}", series.title())))
        }
        OutputFormat::Csv => Ok(Rows::Csv(csv(
            &CHART_HEADERS,
            chart_cells(series.points(), false),
        )?)),
    }
}

/// Renders the customer rows followed by the chart, if one is selected.
///
/// CSV is only possible without a chart: the two tables have different columns and would not
/// form a single CSV document.
pub fn render_dashboard(dashboard: &Dashboard, format: OutputFormat) -> Res<Rows> {
    match format {
        OutputFormat::Json => return json(dashboard),
        OutputFormat::Csv if dashboard.chart().is_some() => {
            bail!("A dashboard with a chart cannot be rendered as CSV, use table or json")
        }
        _ => {}
    }
    let mut out = render_customers(dashboard.rows(), format)?.to_string();
    if let Some(chart) = dashboard.chart() {
        out.push('\n');
        out.push_str(&render_chart(chart, format)?.to_string());
    }
    Ok(match format {
        OutputFormat::Csv => Rows::Csv(out),
        _ => Rows::Table(out),
    })
}

fn json<T: Serialize + ?Sized>(value: &T) -> Res<Rows> {
    serde_json::to_value(value)
        .map(Rows::Json)
        .context("Unable to serialize output")
}

fn customer_cells(rows: &[CustomerRow]) -> Vec<Vec<String>> {
    let mut cells = Vec::new();
    for row in rows {
        let id = row.customer().id().to_string();
        let name = row.customer().name().to_string();
        if row.transactions().is_empty() {
            cells.push(vec![id, name, String::new(), String::new(), String::new()]);
            continue;
        }
        for tx in row.transactions() {
            cells.push(vec![
                id.clone(),
                name.clone(),
                tx.id().to_string(),
                tx.date().to_string(),
                tx.amount().to_string(),
            ]);
        }
    }
    cells
}

fn chart_cells(points: &DailySeries, grouped: bool) -> Vec<Vec<String>> {
    points
        .iter()
        .map(|p: &DailyTotal| {
            let total = if grouped {
                group_thousands(p.total())
            } else {
                p.total().to_string()
            };
            vec![p.date().format("%Y-%m-%d").to_string(), total]
        })
        .collect()
}

/// Largest magnitude an `f64` holds exactly.
const MAX_EXACT_F64: u64 = 1 << 53;

/// Formats an integer with thousands separators, e.g. `-12,500`.
fn group_thousands(n: i64) -> String {
    let sign = if n < 0 { "-" } else { "" };
    let magnitude = n.unsigned_abs();
    let digits = if magnitude <= MAX_EXACT_F64 {
        format_num::format_num!(",.0f", magnitude as f64)
    } else {
        group_digits(&magnitude.to_string())
    };
    format!("{sign}{digits}")
}

/// Inserts a comma every three digits from the right.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (ix, c) in digits.chars().enumerate() {
        if ix > 0 && (digits.len() - ix) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Builds a markdown table with columns padded to their widest cell.
fn table(headers: &[&str], cells: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (ix, cell) in row.iter().enumerate() {
            widths[ix] = widths[ix].max(cell.chars().count());
        }
    }
    let line = |values: Vec<&str>| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:<w$}"))
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };
    let mut out = line(headers.to_vec());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("| {} |\n", rule.join(" | ")));
    for row in &cells {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

fn csv(headers: &[&str], cells: Vec<Vec<String>>) -> Res<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(headers)
        .context("Unable to write CSV header")?;
    for row in cells {
        writer
            .write_record(&row)
            .context("Unable to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish CSV output: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}
