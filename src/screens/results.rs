//! Results screen: preliminary rent, full evaluation and the yield table.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use iced::widget::{button, column, container, keyed_column, row, scrollable, text, Space};
use iced::{Alignment, Color, Element, Length, Padding};
use tokio_util::sync::CancellationToken;

use super::Handoff;
use crate::backend::cancel::FetchSession;
use crate::backend::{user_message, EvaluationResponse, PropertyResult, SearchParams};
use crate::native::browser;
use crate::ui::format::{format_currency, format_number, format_yield};
use crate::ui::theme::{self, DarkTheme};

/// Order of the property table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// As returned by the service
    #[default]
    Server,
    YieldDesc,
    YieldAsc,
}

impl SortOrder {
    pub fn next(self) -> Self {
        match self {
            SortOrder::Server => SortOrder::YieldDesc,
            SortOrder::YieldDesc => SortOrder::YieldAsc,
            SortOrder::YieldAsc => SortOrder::Server,
        }
    }

    fn indicator(self) -> &'static str {
        match self {
            SortOrder::Server => "",
            SortOrder::YieldDesc => " ▼",
            SortOrder::YieldAsc => " ▲",
        }
    }
}

/// Non-finite yields sort below every real one
fn yield_rank(property: &PropertyResult) -> f64 {
    if property.gross_yield.is_finite() {
        property.gross_yield
    } else {
        f64::NEG_INFINITY
    }
}

fn by_yield_desc(a: &PropertyResult, b: &PropertyResult) -> Ordering {
    yield_rank(b).total_cmp(&yield_rank(a))
}

/// Stable: ties keep server order
pub fn sorted_indices(properties: &[PropertyResult], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..properties.len()).collect();
    match order {
        SortOrder::Server => {}
        SortOrder::YieldDesc => indices.sort_by(|&a, &b| by_yield_desc(&properties[a], &properties[b])),
        SortOrder::YieldAsc => indices.sort_by(|&a, &b| by_yield_desc(&properties[b], &properties[a])),
    }
    indices
}

pub fn sorted(properties: &[PropertyResult], order: SortOrder) -> Vec<&PropertyResult> {
    sorted_indices(properties, order)
        .into_iter()
        .map(|index| &properties[index])
        .collect()
}

/// Highest gross yield; the first one in server order wins a tie
pub fn top_yield_candidate(properties: &[PropertyResult]) -> Option<&PropertyResult> {
    sorted(properties, SortOrder::YieldDesc).into_iter().next()
}

/// `keyed_column` needs `Copy` keys, so ids are keyed by their hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKey {
    Id(u64),
    Index(usize),
}

fn id_hash(id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

/// `id` is only trusted when present and unique, otherwise the position is
/// used. Two unique ids that hash alike also fall back to their positions.
pub fn row_keys(properties: &[PropertyResult]) -> Vec<RowKey> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for property in properties {
        *counts.entry(property.id.as_str()).or_default() += 1;
    }

    let hashes: Vec<Option<u64>> = properties
        .iter()
        .map(|property| {
            let unique = !property.id.is_empty() && counts.get(property.id.as_str()) == Some(&1);
            unique.then(|| id_hash(&property.id))
        })
        .collect();

    let mut hash_counts: HashMap<u64, usize> = HashMap::new();
    for hash in hashes.iter().flatten() {
        *hash_counts.entry(*hash).or_default() += 1;
    }

    hashes
        .into_iter()
        .enumerate()
        .map(|(index, hash)| match hash {
            Some(hash) if hash_counts.get(&hash) == Some(&1) => RowKey::Id(hash),
            _ => RowKey::Index(index),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub enum Message {
    Evaluated {
        session: u64,
        outcome: Result<EvaluationResponse, String>,
    },
    CycleSort,
    OpenListing(String),
    NewSearch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    OpenListing(String),
    NewSearch,
}

/// Evaluation request issued when the screen mounts
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub session: u64,
    pub token: CancellationToken,
    pub params: SearchParams,
}

#[derive(Debug)]
struct Loaded {
    search_params: SearchParams,
    market_analysis: Option<String>,
    session: FetchSession,
    average_rent: Option<f64>,
    currency: String,
    properties: Vec<PropertyResult>,
    loading: bool,
    error: Option<String>,
    sort: SortOrder,
}

#[derive(Debug)]
pub struct ResultsView {
    /// `None` when the screen was reached without a search
    loaded: Option<Loaded>,
}

impl ResultsView {
    /// Without a handoff nothing is fetched and the recovery prompt is shown
    pub fn mount(handoff: Option<Handoff>) -> (Self, Option<EvaluationRequest>) {
        let Some(handoff) = handoff else {
            tracing::info!("results opened without a search, showing recovery prompt");
            return (Self { loaded: None }, None);
        };

        let session = FetchSession::new();
        let request = EvaluationRequest {
            session: session.id(),
            token: session.token(),
            params: handoff.search_params.clone(),
        };

        let loaded = Loaded {
            search_params: handoff.search_params,
            market_analysis: handoff.market_analysis,
            session,
            average_rent: handoff.initial_average_rent,
            currency: String::from("USD"),
            properties: Vec::new(),
            loading: true,
            error: None,
            sort: SortOrder::default(),
        };

        (
            Self {
                loaded: Some(loaded),
            },
            Some(request),
        )
    }

    /// Stops the in-flight evaluation; later results are dropped
    pub fn cancel(&self) {
        if let Some(loaded) = &self.loaded {
            loaded.session.cancel();
        }
    }

    pub fn update(&mut self, message: Message) -> Action {
        match message {
            Message::Evaluated { session, outcome } => {
                self.apply_evaluation(session, outcome);
                Action::None
            }
            Message::CycleSort => {
                if let Some(loaded) = &mut self.loaded {
                    loaded.sort = loaded.sort.next();
                }
                Action::None
            }
            Message::OpenListing(url) => {
                if browser::is_web_url(&url) {
                    Action::OpenListing(url)
                } else {
                    tracing::warn!(%url, "refusing to open non-web listing link");
                    Action::None
                }
            }
            Message::NewSearch => {
                self.cancel();
                Action::NewSearch
            }
        }
    }

    /// Results from a cancelled or replaced fetch are dropped
    fn apply_evaluation(&mut self, session: u64, outcome: Result<EvaluationResponse, String>) {
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };
        if !loaded.session.accepts(session) {
            tracing::debug!(session, "dropping stale evaluation result");
            return;
        }

        loaded.loading = false;
        match outcome {
            Ok(response) => {
                tracing::info!(
                    average_rent = response.average_rent,
                    properties = response.properties.len(),
                    "evaluation received"
                );
                loaded.average_rent = Some(response.average_rent);
                loaded.currency = response.currency;
                loaded.properties = response.properties;
                loaded.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "evaluation failed");
                loaded.error = Some(user_message(&err));
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        match &self.loaded {
            None => view_missing(),
            Some(loaded) => view_loaded(loaded),
        }
    }
}

#[cfg(test)]
impl ResultsView {
    /// Id of the fetch this screen will accept results from
    pub fn session(&self) -> Option<u64> {
        self.loaded
            .as_ref()
            .filter(|l| !l.session.token().is_cancelled())
            .map(|l| l.session.id())
    }

    pub fn has_search(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn average_rent(&self) -> Option<f64> {
        self.loaded.as_ref().and_then(|l| l.average_rent)
    }

    /// Rendered average rent, `None` while only the loading indicator can be shown
    pub fn average_rent_label(&self) -> Option<String> {
        self.average_rent().map(format_currency)
    }

    pub fn properties(&self) -> &[PropertyResult] {
        self.loaded
            .as_ref()
            .map(|l| l.properties.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_loading_properties(&self) -> bool {
        self.loaded.as_ref().is_some_and(|l| l.loading)
    }

    pub fn property_error(&self) -> Option<&str> {
        self.loaded.as_ref().and_then(|l| l.error.as_deref())
    }

    pub fn sort_order(&self) -> SortOrder {
        self.loaded.as_ref().map(|l| l.sort).unwrap_or_default()
    }

    pub fn top_yield(&self) -> Option<&PropertyResult> {
        top_yield_candidate(self.properties())
    }
}

impl Drop for ResultsView {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn view_missing<'a>() -> Element<'a, Message> {
    let card = container(
        column![
            text("No search to show").size(22).color(DarkTheme::TEXT),
            text("Results need a search. Start one from the form.")
                .size(14)
                .color(DarkTheme::TEXT_MUTED),
            button(text("Start a new search")).padding(12).on_press(Message::NewSearch),
        ]
        .spacing(16)
        .align_x(Alignment::Center),
    )
    .padding(32)
    .style(theme::card);

    container(card).center(Length::Fill).into()
}

/// One-line summary of the submitted criteria
pub fn criteria_line(params: &SearchParams) -> String {
    format!(
        "{} · {} bd · {} – {} · {} – {} sqft",
        params.area.trim(),
        params.bedrooms,
        format_currency(params.min_price),
        format_currency(params.max_price),
        format_number(params.min_sqft),
        format_number(params.max_sqft),
    )
}

fn view_loaded(loaded: &Loaded) -> Element<'_, Message> {
    let header = row![
        button(text("← New search").size(14))
            .style(button::text)
            .on_press(Message::NewSearch),
        Space::with_width(Length::Fill),
        text(criteria_line(&loaded.search_params))
            .size(13)
            .color(DarkTheme::TEXT_MUTED),
    ]
    .align_y(Alignment::Center);

    // The average stays visible while properties load or fail
    let average: Element<'_, Message> = match loaded.average_rent {
        Some(rent) => text(format!("{} / month", format_currency(rent)))
            .size(32)
            .color(DarkTheme::TEXT)
            .into(),
        None => text("Estimating average rent...")
            .size(18)
            .color(DarkTheme::TEXT_MUTED)
            .into(),
    };

    let mut summary = column![
        text(format!("Average rent ({})", loaded.currency))
            .size(13)
            .color(DarkTheme::TEXT_MUTED),
        average,
    ]
    .spacing(6);
    if let Some(analysis) = &loaded.market_analysis {
        summary = summary.push(text(analysis).size(14).color(DarkTheme::TEXT_MUTED));
    }

    let mut content = column![
        header,
        container(summary).padding(20).width(Length::Fill).style(theme::card),
    ]
    .spacing(16);

    if let Some(top) = top_yield_candidate(&loaded.properties) {
        content = content.push(
            container(
                column![
                    text("Top yield candidate").size(13).color(DarkTheme::POSITIVE),
                    text(&top.address).size(16).color(DarkTheme::TEXT),
                    text(format!(
                        "{} gross yield · {} · est. {} / month",
                        format_yield(top.gross_yield),
                        format_currency(top.price),
                        format_currency(top.estimated_rent),
                    ))
                    .size(14)
                    .color(DarkTheme::TEXT_MUTED),
                ]
                .spacing(4),
            )
            .padding(16)
            .width(Length::Fill)
            .style(theme::highlight),
        );
    }

    content = content.push(view_properties(loaded));

    container(scrollable(content.padding(Padding::from([0.0, 8.0]))))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn status_card(message: &str, color: Color) -> Element<'_, Message> {
    container(text(message).size(14).color(color))
        .padding(20)
        .width(Length::Fill)
        .style(theme::card)
        .into()
}

fn cell<'a>(value: String, portion: u16) -> Element<'a, Message> {
    container(text(value).size(14).color(DarkTheme::TEXT))
        .width(Length::FillPortion(portion))
        .into()
}

fn heading<'a>(value: &'a str, portion: u16) -> Element<'a, Message> {
    container(text(value).size(12).color(DarkTheme::TEXT_MUTED))
        .width(Length::FillPortion(portion))
        .into()
}

fn view_properties(loaded: &Loaded) -> Element<'_, Message> {
    if loaded.loading {
        return status_card("Fetching sample properties...", DarkTheme::TEXT_MUTED);
    }
    if let Some(error) = &loaded.error {
        return status_card(error, DarkTheme::ERROR);
    }
    if loaded.properties.is_empty() {
        return status_card(
            "No sample properties were returned for this search.",
            DarkTheme::TEXT_MUTED,
        );
    }

    let sort_button = button(text(format!("Yield{}", loaded.sort.indicator())).size(12))
        .style(button::text)
        .padding(0)
        .on_press(Message::CycleSort);

    let header = row![
        heading("Address", 4),
        heading("Price", 2),
        heading("Beds", 1),
        heading("Sqft", 1),
        heading("Est. rent", 2),
        container(sort_button).width(Length::FillPortion(1)),
        heading("", 2),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let keys = row_keys(&loaded.properties);
    let rows = sorted_indices(&loaded.properties, loaded.sort)
        .into_iter()
        .map(|index| (keys[index], view_row(&loaded.properties[index])));

    container(column![header, keyed_column(rows).spacing(2)].spacing(8))
        .padding(20)
        .width(Length::Fill)
        .style(theme::card)
        .into()
}

fn view_row(property: &PropertyResult) -> Element<'_, Message> {
    // Opened in the system browser, which sends no referrer
    let link: Element<'_, Message> = match property.listing_url() {
        Some(url) => button(text("View listing ↗").size(13))
            .style(button::text)
            .padding(0)
            .on_press(Message::OpenListing(url.to_string()))
            .into(),
        None => Space::with_width(0).into(),
    };

    let line = row![
        cell(property.address.clone(), 4),
        cell(format_currency(property.price), 2),
        cell(property.bedrooms.to_string(), 1),
        cell(format_number(property.sqft), 1),
        cell(format_currency(property.estimated_rent), 2),
        cell(format_yield(property.gross_yield), 1),
        container(link).width(Length::FillPortion(2)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    container(line).padding(Padding::from([8.0, 0.0])).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(id: &str, gross_yield: f64) -> PropertyResult {
        PropertyResult {
            id: id.to_string(),
            address: format!("{id} Main St"),
            price: 300_000.0,
            bedrooms: 2,
            sqft: 900.0,
            estimated_rent: 2_000.0,
            gross_yield,
            url: String::new(),
        }
    }

    fn handoff(initial: Option<f64>) -> Handoff {
        Handoff {
            search_params: SearchParams {
                area: "Columbus, OH".to_string(),
                ..SearchParams::default()
            },
            initial_average_rent: initial,
            market_analysis: None,
        }
    }

    fn evaluation(average_rent: f64, properties: Vec<PropertyResult>) -> EvaluationResponse {
        EvaluationResponse {
            average_rent,
            currency: "USD".to_string(),
            properties,
        }
    }

    #[test]
    fn test_top_yield_candidate() {
        let properties = vec![property("a", 0.05), property("b", 0.09)];
        assert_eq!(top_yield_candidate(&properties).unwrap().id, "b");
        assert!(top_yield_candidate(&[]).is_none());
    }

    #[test]
    fn test_top_yield_tie_keeps_first() {
        let properties = vec![property("a", 0.07), property("b", 0.09), property("c", 0.09)];
        assert_eq!(top_yield_candidate(&properties).unwrap().id, "b");
    }

    #[test]
    fn test_non_finite_yield_ranks_last() {
        let properties = vec![property("nan", f64::NAN), property("low", 0.01)];
        assert_eq!(top_yield_candidate(&properties).unwrap().id, "low");
    }

    #[test]
    fn test_sort_orders() {
        let properties = vec![property("a", 0.06), property("b", 0.09), property("c", 0.03)];
        let ids = |order| -> Vec<String> {
            sorted(&properties, order).iter().map(|p| p.id.clone()).collect()
        };
        assert_eq!(ids(SortOrder::Server), ["a", "b", "c"]);
        assert_eq!(ids(SortOrder::YieldDesc), ["b", "a", "c"]);
        assert_eq!(ids(SortOrder::YieldAsc), ["c", "a", "b"]);
        assert_eq!(properties[0].id, "a");
    }

    #[test]
    fn test_row_keys_fall_back_to_index() {
        let properties = vec![property("x", 0.1), property("x", 0.2), property("", 0.3), property("y", 0.4)];
        let keys = row_keys(&properties);
        assert_eq!(keys[0], RowKey::Index(0));
        assert_eq!(keys[1], RowKey::Index(1));
        assert_eq!(keys[2], RowKey::Index(2));
        assert!(matches!(keys[3], RowKey::Id(_)));
    }

    #[test]
    fn test_row_keys_are_distinct() {
        let properties: Vec<PropertyResult> = (0..200)
            .map(|n| property(&format!("listing-{n}"), 0.05))
            .chain([property("", 0.05), property("dup", 0.05), property("dup", 0.05)])
            .collect();
        let keys = row_keys(&properties);
        let distinct: std::collections::HashSet<RowKey> = keys.iter().copied().collect();
        assert_eq!(distinct.len(), keys.len());
        assert_eq!(keys[0], RowKey::Id(id_hash("listing-0")));
    }

    #[test]
    fn test_missing_handoff_shows_recovery() {
        let (mut view, request) = ResultsView::mount(None);
        assert!(request.is_none());
        assert!(!view.has_search());
        assert!(!view.is_loading_properties());
        assert_eq!(view.update(Message::NewSearch), Action::NewSearch);
    }

    #[test]
    fn test_preliminary_rent_shown_before_evaluation() {
        let (view, request) = ResultsView::mount(Some(handoff(Some(2500.0))));
        let request = request.unwrap();
        assert_eq!(request.params.area, "Columbus, OH");
        assert_eq!(view.average_rent_label().as_deref(), Some("$2,500"));
        assert!(view.is_loading_properties());
    }

    #[test]
    fn test_evaluation_replaces_preliminary() {
        let (mut view, request) = ResultsView::mount(Some(handoff(Some(2500.0))));
        let session = request.unwrap().session;

        view.update(Message::Evaluated {
            session,
            outcome: Ok(evaluation(2650.0, vec![property("a", 0.05), property("b", 0.09)])),
        });

        assert_eq!(view.average_rent_label().as_deref(), Some("$2,650"));
        assert!(!view.is_loading_properties());
        assert_eq!(view.properties().len(), 2);
        assert_eq!(view.top_yield().unwrap().id, "b");
    }

    #[test]
    fn test_evaluation_failure_keeps_average() {
        let (mut view, request) = ResultsView::mount(Some(handoff(Some(2500.0))));
        let session = request.unwrap().session;

        view.update(Message::Evaluated {
            session,
            outcome: Err("evaluate failed: 500 upstream search failed".to_string()),
        });

        assert_eq!(view.average_rent(), Some(2500.0));
        assert_eq!(view.property_error(), Some("evaluate failed: 500 upstream search failed"));
        assert!(!view.is_loading_properties());
        assert!(view.top_yield().is_none());
    }

    #[test]
    fn test_absent_preliminary_then_loaded() {
        let (mut view, request) = ResultsView::mount(Some(handoff(None)));
        assert_eq!(view.average_rent_label(), None);

        view.update(Message::Evaluated {
            session: request.unwrap().session,
            outcome: Ok(evaluation(1900.0, Vec::new())),
        });
        assert_eq!(view.average_rent(), Some(1900.0));
        assert!(view.properties().is_empty());
        assert!(view.top_yield().is_none());
    }

    #[test]
    fn test_cancelled_result_is_ignored() {
        let (mut view, request) = ResultsView::mount(Some(handoff(Some(2500.0))));
        let request = request.unwrap();

        view.update(Message::NewSearch);
        assert!(request.token.is_cancelled());

        view.update(Message::Evaluated {
            session: request.session,
            outcome: Ok(evaluation(9999.0, vec![property("a", 0.5)])),
        });
        assert_eq!(view.average_rent(), Some(2500.0));
        assert!(view.properties().is_empty());
    }

    #[test]
    fn test_stale_session_is_ignored() {
        let (mut view, _request) = ResultsView::mount(Some(handoff(Some(2500.0))));
        let (_other, other_request) = ResultsView::mount(Some(handoff(None)));

        view.update(Message::Evaluated {
            session: other_request.unwrap().session,
            outcome: Err("evaluate failed: 500".to_string()),
        });
        assert!(view.is_loading_properties());
        assert_eq!(view.property_error(), None);
    }

    #[test]
    fn test_drop_cancels_fetch() {
        let (view, request) = ResultsView::mount(Some(handoff(None)));
        let token = request.unwrap().token;
        drop(view);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_only_web_links_open() {
        let (mut view, _) = ResultsView::mount(Some(handoff(None)));
        assert_eq!(
            view.update(Message::OpenListing("https://example.com/1".to_string())),
            Action::OpenListing("https://example.com/1".to_string())
        );
        assert_eq!(view.update(Message::OpenListing("file:///etc/passwd".to_string())), Action::None);
    }

    #[test]
    fn test_cycle_sort() {
        let (mut view, _) = ResultsView::mount(Some(handoff(None)));
        assert_eq!(view.sort_order(), SortOrder::Server);
        view.update(Message::CycleSort);
        assert_eq!(view.sort_order(), SortOrder::YieldDesc);
        view.update(Message::CycleSort);
        view.update(Message::CycleSort);
        assert_eq!(view.sort_order(), SortOrder::Server);
    }
}
