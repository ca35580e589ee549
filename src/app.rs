//! Core application state and Iced Application implementation
//!
//! Two screens share nothing but the handoff passed on navigation. Each screen
//! decides what to fetch; this module turns those decisions into tasks.

use iced::keyboard::{self, key::Named, Key};
use iced::widget::container;
use iced::{Element, Event, Length, Subscription, Task, Theme};

use crate::backend::cancel::until_cancelled;
use crate::backend::{BackendClient, RentOnlyResponse, SearchParams};
use crate::config::AppConfig;
use crate::native::browser;
use crate::routes::Route;
use crate::screens::results::{self, EvaluationRequest, ResultsView};
use crate::screens::search::{self, SearchForm};
use crate::screens::Handoff;
use crate::ui::theme;

enum Screen {
    Search(SearchForm),
    Results(ResultsView),
}

pub struct RentScope {
    backend: BackendClient,
    screen: Screen,
}

#[derive(Debug, Clone)]
pub enum Message {
    Search(search::Message),
    Results(results::Message),
    RentEstimated(Result<RentOnlyResponse, String>),
    QueryParsed(Result<SearchParams, String>),
    EvaluationCancelled(u64),
    IcedEvent(Event),
}

impl RentScope {
    pub fn new(config: &AppConfig, route: Route) -> (Self, Task<Message>) {
        let mut app = Self {
            backend: BackendClient::new(&config.api_base_url),
            screen: Screen::Search(SearchForm::new()),
        };
        tracing::info!(api = app.backend.base_url(), %route, "starting");
        let task = app.navigate(route, None);
        (app, task)
    }

    pub fn title(&self) -> String {
        match self.screen {
            Screen::Search(_) => String::from("RentScope"),
            Screen::Results(_) => String::from("RentScope · Results"),
        }
    }

    pub fn route(&self) -> Route {
        match self.screen {
            Screen::Search(_) => Route::Search,
            Screen::Results(_) => Route::Results,
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Search(message) => {
                let Screen::Search(form) = &mut self.screen else {
                    return Task::none();
                };
                match form.update(message) {
                    search::Action::None => Task::none(),
                    search::Action::EstimateRent(params) => {
                        let backend = self.backend.clone();
                        Task::perform(
                            async move { backend.estimate_rent(&params).await.map_err(|e| e.to_string()) },
                            Message::RentEstimated,
                        )
                    }
                    search::Action::ParseQuery(query) => {
                        let backend = self.backend.clone();
                        Task::perform(
                            async move { backend.parse_query(&query).await.map_err(|e| e.to_string()) },
                            Message::QueryParsed,
                        )
                    }
                }
            }

            Message::RentEstimated(outcome) => {
                let Screen::Search(form) = &mut self.screen else {
                    tracing::debug!("rent estimate arrived after leaving the form");
                    return Task::none();
                };
                match form.finish_estimate(outcome) {
                    Some(handoff) => self.navigate(Route::Results, Some(handoff)),
                    None => Task::none(),
                }
            }

            Message::QueryParsed(outcome) => {
                if let Screen::Search(form) = &mut self.screen {
                    form.finish_parse(outcome);
                }
                Task::none()
            }

            Message::Results(message) => {
                let Screen::Results(view) = &mut self.screen else {
                    return Task::none();
                };
                match view.update(message) {
                    results::Action::None => Task::none(),
                    results::Action::OpenListing(url) => {
                        if let Err(e) = browser::open_listing(&url) {
                            tracing::warn!("Could not open listing: {}", e);
                        }
                        Task::none()
                    }
                    results::Action::NewSearch => self.navigate(Route::Search, None),
                }
            }

            Message::EvaluationCancelled(session) => {
                tracing::debug!(session, "evaluation cancelled");
                Task::none()
            }

            Message::IcedEvent(event) => {
                if let Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) = event {
                    return self.on_key_press(key);
                }
                Task::none()
            }
        }
    }

    fn on_key_press(&mut self, key: Key) -> Task<Message> {
        let on_results = matches!(self.screen, Screen::Results(_));
        if on_results && key == Key::Named(Named::Escape) {
            return self.navigate(Route::Search, None);
        }
        Task::none()
    }

    /// Replacing the results screen drops it, which cancels its fetch
    fn navigate(&mut self, route: Route, handoff: Option<Handoff>) -> Task<Message> {
        tracing::debug!(%route, with_state = handoff.is_some(), "navigating");
        match route {
            Route::Search => {
                self.screen = Screen::Search(SearchForm::new());
                Task::none()
            }
            Route::Results => {
                let (view, request) = ResultsView::mount(handoff);
                self.screen = Screen::Results(view);
                match request {
                    Some(request) => self.evaluate(request),
                    None => Task::none(),
                }
            }
        }
    }

    fn evaluate(&self, request: EvaluationRequest) -> Task<Message> {
        let backend = self.backend.clone();
        let EvaluationRequest {
            session,
            token,
            params,
        } = request;

        let fetch = async move { backend.evaluate(&params).await.map_err(|e| e.to_string()) };
        Task::perform(until_cancelled(token, fetch), move |outcome| match outcome {
            Some(outcome) => Message::Results(results::Message::Evaluated { session, outcome }),
            None => Message::EvaluationCancelled(session),
        })
    }

    pub fn view(&self) -> Element<'_, Message> {
        let content = match &self.screen {
            Screen::Search(form) => form.view().map(Message::Search),
            Screen::Results(view) => view.view().map(Message::Results),
        };

        container(content)
            .padding(24)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(theme::window)
            .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        iced::event::listen().map(Message::IcedEvent)
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    #[cfg(test)]
    fn results(&self) -> Option<&ResultsView> {
        match &self.screen {
            Screen::Results(view) => Some(view),
            Screen::Search(_) => None,
        }
    }

    #[cfg(test)]
    fn form(&self) -> Option<&SearchForm> {
        match &self.screen {
            Screen::Search(form) => Some(form),
            Screen::Results(_) => None,
        }
    }
}
