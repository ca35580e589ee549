//! Labeled form input

use iced::widget::{column, text, text_input};
use iced::{Element, Length};

use super::theme::{self, DarkTheme};

/// Label above a single-line input; read-only when `on_input` is `None`
pub fn labeled<'a, Message: Clone + 'a>(
    label: &'a str,
    placeholder: &'a str,
    value: &str,
    on_input: Option<impl Fn(String) -> Message + 'a>,
) -> Element<'a, Message> {
    column![
        text(label).size(13).color(DarkTheme::TEXT_MUTED),
        text_input(placeholder, value)
            .on_input_maybe(on_input)
            .padding(10)
            .size(16)
            .style(theme::input)
    ]
    .spacing(6)
    .width(Length::Fill)
    .into()
}
