//! The session: load state plus the user's view context.
//!
//! A `Session` starts in `LoadState::Loading`, moves once to `Ready` or `Errored`, and from then
//! on only the `ViewContext` changes. Every change of the context recomputes the derived
//! collections from the pure `filter::apply` and `aggregate::daily_totals` functions.

use crate::aggregate::{self, DailySeries};
use crate::api::DataSource;
use crate::error::{Error, ErrorType, IntoResult};
use crate::filter::{self, FilterCriterion, FilterKind};
use crate::model::{Customer, Dataset, RecordId};
use crate::view::{self, ChartSeries, CustomerRow, Dashboard};
use crate::Result;
use tracing::{debug, error, warn};

/// Where the session is in its lifecycle.
#[derive(Debug, Default)]
pub enum LoadState {
    /// The fetch has not completed; no data is exposed.
    #[default]
    Loading,
    /// Both collections were fetched and validated.
    Ready(Dataset),
    /// The fetch failed. This state is terminal.
    Errored(Error),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            LoadState::Ready(dataset) => Some(dataset),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            LoadState::Errored(e) => Some(e),
            _ => None,
        }
    }
}

/// The user's current choices: the active filter and the selected customer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ViewContext {
    criterion: FilterCriterion,
    selected: Option<RecordId>,
}

impl ViewContext {
    pub fn criterion(&self) -> &FilterCriterion {
        &self.criterion
    }

    pub fn selected(&self) -> Option<&RecordId> {
        self.selected.as_ref()
    }
}

/// Holds the load state, the view context and the collections derived from them.
#[derive(Debug, Default)]
pub struct Session {
    state: LoadState,
    context: ViewContext,
    visible: Vec<Customer>,
    daily: DailySeries,
}

impl Session {
    /// A session in the `Loading` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session and completes it with the result of fetching from `data_source`.
    pub async fn load(data_source: &DataSource) -> Self {
        let mut session = Self::new();
        session.complete(data_source.fetch().await);
        session
    }

    /// Moves a `Loading` session to `Ready` or `Errored`. The error is logged. A session that has
    /// already completed ignores further results.
    pub fn complete(&mut self, result: Result<Dataset>) {
        if !self.state.is_loading() {
            warn!("Ignoring a fetch result for a session that has already completed");
            return;
        }
        match result {
            Ok(dataset) => {
                debug!("Session is ready");
                self.state = LoadState::Ready(dataset);
                self.refresh_filter();
                self.refresh_chart();
            }
            Err(e) => {
                error!("Error fetching data: {e}");
                self.state = LoadState::Errored(e);
            }
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn context(&self) -> &ViewContext {
        &self.context
    }

    /// Returns the session if it is `Ready`, the fetch error if it is `Errored`.
    pub fn into_ready(self) -> Result<Self> {
        if self.state.is_ready() {
            return Ok(self);
        }
        match self.state {
            LoadState::Errored(e) => Err(e),
            _ => Err(anyhow::anyhow!("The data has not been loaded yet"))
                .pub_result(ErrorType::Fetch),
        }
    }

    /// Switches the filter kind and keeps the typed value.
    pub fn set_filter_kind(&mut self, kind: FilterKind) {
        if self.context.criterion.kind() != kind {
            self.context.criterion.set_kind(kind);
            self.refresh_filter();
        }
    }

    pub fn set_filter_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        if self.context.criterion.value() != value {
            self.context.criterion.set_value(value);
            self.refresh_filter();
        }
    }

    pub fn set_criterion(&mut self, criterion: FilterCriterion) {
        if self.context.criterion != criterion {
            self.context.criterion = criterion;
            self.refresh_filter();
        }
    }

    /// Selects a customer for charting. Returns `false`, and clears the selection, when the
    /// session is not ready or no customer has this id.
    pub fn select_customer(&mut self, id: &RecordId) -> bool {
        let known = self
            .state
            .dataset()
            .and_then(|d| d.customer(id))
            .is_some();
        self.context.selected = known.then(|| id.clone());
        self.refresh_chart();
        known
    }

    pub fn clear_selection(&mut self) {
        self.context.selected = None;
        self.refresh_chart();
    }

    /// The customers passing the active filter. Empty unless the session is ready.
    pub fn visible_customers(&self) -> &[Customer] {
        &self.visible
    }

    /// The daily totals of the selected customer. Empty when nothing is selected.
    pub fn daily_totals(&self) -> &DailySeries {
        &self.daily
    }

    pub fn selected_customer(&self) -> Option<&Customer> {
        let id = self.context.selected.as_ref()?;
        self.state.dataset()?.customer(id)
    }

    /// The visible customers with their transactions.
    pub fn customer_rows(&self) -> Vec<CustomerRow> {
        match self.state.dataset() {
            Some(dataset) => view::customer_rows(&self.visible, dataset.transactions()),
            None => Vec::new(),
        }
    }

    /// The chart of the selected customer, if any.
    pub fn chart(&self) -> Option<ChartSeries> {
        self.selected_customer()
            .map(|customer| ChartSeries::new(customer.clone(), self.daily.clone()))
    }

    /// Everything the presentation layer needs. `None` unless the session is ready.
    pub fn dashboard(&self) -> Option<Dashboard> {
        self.state.dataset()?;
        Some(Dashboard::new(self.customer_rows(), self.chart()))
    }

    fn refresh_filter(&mut self) {
        self.visible = match self.state.dataset() {
            Some(dataset) => filter::apply(
                dataset.customers(),
                dataset.transactions(),
                &self.context.criterion,
            )
            .into_iter()
            .cloned()
            .collect(),
            None => Vec::new(),
        };
        debug!(
            "Filter {} '{}' shows {} customers",
            self.context.criterion.kind(),
            self.context.criterion.value(),
            self.visible.len()
        );
    }

    fn refresh_chart(&mut self) {
        self.daily = match (self.state.dataset(), self.context.selected.as_ref()) {
            (Some(dataset), Some(id)) => aggregate::daily_totals(dataset.transactions(), id),
            _ => DailySeries::default(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Collection, TestSource};
    use crate::model::Transaction;
    use serde_json::json;
    use std::collections::HashMap;

    fn dataset() -> Dataset {
        Dataset::new(
            vec![Customer::new(1, "Alice"), Customer::new(2, "Bob")],
            vec![
                Transaction::new(1, 1, "2024-01-01T10:00".parse().unwrap(), 50),
                Transaction::new(2, 1, "2024-01-01T15:00".parse().unwrap(), 30),
                Transaction::new(3, 1, "2024-01-02T09:00".parse().unwrap(), 20),
            ],
        )
    }

    fn ready() -> Session {
        let mut session = Session::new();
        session.complete(Ok(dataset()));
        session
    }

    fn names(session: &Session) -> Vec<&str> {
        session.visible_customers().iter().map(|c| c.name()).collect()
    }

    #[test]
    fn test_loading_exposes_nothing() {
        let mut session = Session::new();
        assert!(session.state().is_loading());
        session.set_filter_value("a");
        assert!(!session.select_customer(&RecordId::from(1)));
        assert!(session.visible_customers().is_empty());
        assert!(session.daily_totals().is_empty());
        assert!(session.dashboard().is_none());
        assert!(session.into_ready().is_err());
    }

    #[test]
    fn test_ready_shows_everyone() {
        let session = ready();
        assert!(session.state().is_ready());
        assert_eq!(names(&session), vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_errored_is_terminal() {
        let mut session = Session::new();
        session.complete(Err(Error::new(ErrorType::Fetch, anyhow::anyhow!("down"))));
        assert_eq!(
            session.state().error().unwrap().error_type(),
            ErrorType::Fetch
        );

        session.complete(Ok(dataset()));
        assert!(!session.state().is_ready());
        assert!(session.visible_customers().is_empty());

        let err = session.into_ready().unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Fetch);
    }

    #[test]
    fn test_filter_events() {
        let mut session = ready();

        session.set_filter_value("ali");
        assert_eq!(names(&session), vec!["Alice"]);

        // Switching kind keeps the value, which is not a number.
        session.set_filter_kind(FilterKind::Amount);
        assert_eq!(names(&session), vec!["Alice", "Bob"]);

        session.set_filter_value("30");
        assert_eq!(names(&session), vec!["Alice"]);

        session.set_filter_value("31");
        assert!(names(&session).is_empty());

        session.set_criterion(FilterCriterion::name(""));
        assert_eq!(names(&session), vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_filter_does_not_touch_selection_or_source() {
        let mut session = ready();
        assert!(session.select_customer(&RecordId::from(1)));
        session.set_filter_value("bob");
        assert_eq!(names(&session), vec!["Bob"]);
        assert_eq!(session.selected_customer().unwrap().name(), "Alice");
        assert_eq!(session.daily_totals().len(), 2);
        assert_eq!(session.state().dataset().unwrap(), &dataset());
    }

    #[test]
    fn test_select_customer() {
        let mut session = ready();
        assert!(session.select_customer(&RecordId::from("1")));
        let totals: Vec<i64> = session.daily_totals().iter().map(|p| p.total()).collect();
        assert_eq!(totals, vec![80, 20]);

        assert!(session.select_customer(&RecordId::from(2)));
        assert!(session.daily_totals().is_empty());
        let chart = session.chart().unwrap();
        assert!(chart.is_empty());

        assert!(!session.select_customer(&RecordId::from(999)));
        assert!(session.context().selected().is_none());
        assert!(session.chart().is_none());

        session.select_customer(&RecordId::from(1));
        session.clear_selection();
        assert!(session.daily_totals().is_empty());
    }

    #[test]
    fn test_dashboard() {
        let mut session = ready();
        session.set_criterion(FilterCriterion::amount("30"));
        session.select_customer(&RecordId::from(1));
        let dashboard = session.dashboard().unwrap();
        assert_eq!(dashboard.rows().len(), 1);
        assert_eq!(dashboard.rows()[0].transactions().len(), 3);
        assert_eq!(dashboard.chart().unwrap().points().len(), 2);
    }

    #[tokio::test]
    async fn test_load_ready() {
        let data_source = DataSource::new(Box::new(TestSource::default()));
        let session = Session::load(&data_source).await;
        assert!(session.state().is_ready());
        assert_eq!(session.visible_customers().len(), 5);
    }

    #[tokio::test]
    async fn test_load_errored() {
        let source = TestSource::new(HashMap::from([(Collection::Transactions, json!([]))]));
        let data_source = DataSource::new(Box::new(source));
        let session = Session::load(&data_source).await;
        assert!(!session.state().is_loading());
        assert!(session.state().error().is_some());
    }
}
