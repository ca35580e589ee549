//! Search form: collects criteria, validates them and requests the quick
//! rent estimate.

use iced::widget::{button, column, container, row, text, text_input, Space};
use iced::{Alignment, Element, Length, Padding};
use thiserror::Error;

use super::Handoff;
use crate::backend::{user_message, RentOnlyResponse, SearchParams};
use crate::ui::field;
use crate::ui::theme::{self, DarkTheme};

pub const SUBMIT_LABEL: &str = "Estimate rent";
pub const SUBMIT_LOADING_LABEL: &str = "Contacting estimation service...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    MinPrice,
    MaxPrice,
    Area,
    Bedrooms,
    MinSqft,
    MaxSqft,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::MinPrice,
        Field::MaxPrice,
        Field::Area,
        Field::Bedrooms,
        Field::MinSqft,
        Field::MaxSqft,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            Field::MinPrice => "Min price ($)",
            Field::MaxPrice => "Max price ($)",
            Field::Area => "Area",
            Field::Bedrooms => "Bedrooms",
            Field::MinSqft => "Min sqft",
            Field::MaxSqft => "Max sqft",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            Field::Area => "City, neighborhood or ZIP",
            _ => "0",
        }
    }
}

/// Form rules, checked in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter an area.")]
    AreaMissing,
    #[error("Price values must be greater than 0.")]
    PriceNotPositive,
    #[error("Min price cannot be greater than max price.")]
    PriceRange,
    #[error("Square footage values must be greater than 0.")]
    SqftNotPositive,
    #[error("Min sqft cannot be greater than max sqft.")]
    SqftRange,
    #[error("Bedrooms must be at least 1.")]
    BedroomsTooFew,
    #[error("Bedrooms must be a whole number.")]
    BedroomsNotWhole,
}

/// First failing rule wins. NaN fails every comparison, so unparsable
/// numbers are rejected by the positivity rules.
pub fn validate(params: &SearchParams) -> Result<(), ValidationError> {
    if params.area.trim().is_empty() {
        return Err(ValidationError::AreaMissing);
    }
    if !(params.min_price > 0.0 && params.max_price > 0.0) {
        return Err(ValidationError::PriceNotPositive);
    }
    if params.min_price > params.max_price {
        return Err(ValidationError::PriceRange);
    }
    if !(params.min_sqft > 0.0 && params.max_sqft > 0.0) {
        return Err(ValidationError::SqftNotPositive);
    }
    if params.min_sqft > params.max_sqft {
        return Err(ValidationError::SqftRange);
    }
    if params.bedrooms < 1 {
        return Err(ValidationError::BedroomsTooFew);
    }
    Ok(())
}

/// Blank input counts as zero, anything unparsable as NaN
fn coerce_number(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        0.0
    } else {
        raw.parse().unwrap_or(f64::NAN)
    }
}

/// Bedrooms must be a whole, non-negative count; anything else becomes 0
/// and fails the bedrooms rule
fn coerce_count(raw: &str) -> u32 {
    let value = coerce_number(raw);
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        value as u32
    } else {
        0
    }
}

fn is_fractional(raw: &str) -> bool {
    let value = coerce_number(raw);
    value.is_finite() && value.fract() != 0.0
}

fn raw_value(params: &SearchParams, field: Field) -> String {
    match field {
        Field::MinPrice => params.min_price.to_string(),
        Field::MaxPrice => params.max_price.to_string(),
        Field::Area => params.area.clone(),
        Field::Bedrooms => params.bedrooms.to_string(),
        Field::MinSqft => params.min_sqft.to_string(),
        Field::MaxSqft => params.max_sqft.to_string(),
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    FieldChanged(Field, String),
    QueryChanged(String),
    Submit,
    FillFromQuery,
}

/// Work the app must start on the form's behalf
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    EstimateRent(SearchParams),
    ParseQuery(String),
}

#[derive(Debug, Clone)]
pub struct SearchForm {
    params: SearchParams,
    inputs: [String; 6],
    query: String,
    loading: bool,
    /// Criteria sent with the in-flight estimate
    submitted: Option<SearchParams>,
    error: Option<String>,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self::with_params(SearchParams::default())
    }
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: SearchParams) -> Self {
        let inputs = Field::ALL.map(|field| raw_value(&params, field));
        Self {
            params,
            inputs,
            query: String::new(),
            loading: false,
            submitted: None,
            error: None,
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            SUBMIT_LOADING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    pub fn update(&mut self, message: Message) -> Action {
        match message {
            Message::FieldChanged(field, raw) => {
                self.set_field(field, raw);
                Action::None
            }
            Message::QueryChanged(query) => {
                self.query = query;
                Action::None
            }
            Message::Submit => self.submit(),
            Message::FillFromQuery => self.fill_from_query(),
        }
    }

    /// Updates the raw text and exactly one property of the criteria.
    /// Criteria are frozen while a request is in flight.
    fn set_field(&mut self, field: Field, raw: String) {
        if self.loading {
            return;
        }
        match field {
            Field::MinPrice => self.params.min_price = coerce_number(&raw),
            Field::MaxPrice => self.params.max_price = coerce_number(&raw),
            Field::Area => self.params.area = raw.clone(),
            Field::Bedrooms => self.params.bedrooms = coerce_count(&raw),
            Field::MinSqft => self.params.min_sqft = coerce_number(&raw),
            Field::MaxSqft => self.params.max_sqft = coerce_number(&raw),
        }
        self.inputs[field.index()] = raw;
    }

    fn submit(&mut self) -> Action {
        if self.loading {
            return Action::None;
        }

        if let Err(err) = self.check() {
            tracing::debug!(rule = ?err, "search form rejected");
            self.error = Some(err.to_string());
            return Action::None;
        }

        self.error = None;
        self.loading = true;
        self.submitted = Some(self.params.clone());
        Action::EstimateRent(self.params.clone())
    }

    /// `validate`, naming fractional bedrooms instead of the zero they coerce to
    fn check(&self) -> Result<(), ValidationError> {
        validate(&self.params).map_err(|err| match err {
            ValidationError::BedroomsTooFew if is_fractional(&self.inputs[Field::Bedrooms.index()]) => {
                ValidationError::BedroomsNotWhole
            }
            other => other,
        })
    }

    fn fill_from_query(&mut self) -> Action {
        let query = self.query.trim();
        if self.loading || query.is_empty() {
            return Action::None;
        }

        self.error = None;
        self.loading = true;
        Action::ParseQuery(query.to_string())
    }

    /// Completes the rent-estimate call. A handoff means: go to results.
    /// The handoff carries the criteria as submitted.
    pub fn finish_estimate(&mut self, outcome: Result<RentOnlyResponse, String>) -> Option<Handoff> {
        self.loading = false;
        let submitted = self.submitted.take();
        match outcome {
            Ok(response) => Some(Handoff {
                search_params: submitted.unwrap_or_else(|| self.params.clone()),
                initial_average_rent: Some(response.average_rent),
                market_analysis: Some(response.analysis).filter(|a| !a.trim().is_empty()),
            }),
            Err(err) => {
                tracing::warn!(error = %err, "rent estimate failed");
                self.error = Some(user_message(&err));
                None
            }
        }
    }

    /// Completes the quick-fill call by replacing every field
    pub fn finish_parse(&mut self, outcome: Result<SearchParams, String>) {
        self.loading = false;
        match outcome {
            Ok(params) => {
                let query = std::mem::take(&mut self.query);
                *self = Self::with_params(params);
                tracing::debug!(%query, "form filled from description");
            }
            Err(err) => {
                tracing::warn!(error = %err, "query parsing failed");
                self.error = Some(user_message(&err));
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let editable = !self.loading;
        let input = |which: Field| {
            field::labeled(
                which.label(),
                which.placeholder(),
                &self.inputs[which.index()],
                editable.then_some(move |raw| Message::FieldChanged(which, raw)),
            )
        };

        let quick_fill = row![
            text_input("Describe it: \"2 bed in Miami under 400k\"", &self.query)
                .on_input_maybe(editable.then_some(Message::QueryChanged))
                .on_submit(Message::FillFromQuery)
                .padding(10)
                .size(15)
                .style(theme::input),
            button(text("Fill form").size(14))
                .padding(Padding::from([10.0, 14.0]))
                .on_press_maybe((!self.loading).then_some(Message::FillFromQuery)),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let fields = column![
            input(Field::Area),
            row![input(Field::MinPrice), input(Field::MaxPrice)].spacing(12),
            row![input(Field::MinSqft), input(Field::MaxSqft)].spacing(12),
            row![input(Field::Bedrooms), Space::with_width(Length::Fill)].spacing(12),
        ]
        .spacing(14);

        let error: Element<'_, Message> = match &self.error {
            Some(message) => text(message).size(14).color(DarkTheme::ERROR).into(),
            None => Space::with_height(0).into(),
        };

        let submit = button(
            container(text(self.submit_label()).size(16))
                .center_x(Length::Fill),
        )
        .padding(12)
        .width(Length::Fill)
        .on_press_maybe((!self.loading).then_some(Message::Submit));

        let form = container(
            column![
                text("Rent & yield estimator").size(24).color(DarkTheme::TEXT),
                text("Enter what you are looking for to get an average rent and sample listings.")
                    .size(14)
                    .color(DarkTheme::TEXT_MUTED),
                quick_fill,
                fields,
                error,
                submit,
            ]
            .spacing(16),
        )
        .padding(24)
        .max_width(640)
        .style(theme::card);

        container(form).center_x(Length::Fill).into()
    }
}

#[cfg(test)]
impl SearchForm {
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
