use iced::widget::{container, text};
use iced::{Color, Element};

use crate::api::dto::NotaStatus;
use crate::format::{status_display, UNKNOWN_STATUS_DISPLAY};

fn rgb(value: u32) -> Color {
    Color::from_rgb8((value >> 16) as u8, (value >> 8) as u8, value as u8)
}

/// Renders the coloured status chip for a nota row. A missing status falls
/// back to the neutral display.
pub fn status_badge<'a, Message>(status: Option<&NotaStatus>) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    let display = match status {
        Some(status) => status_display(status),
        None => UNKNOWN_STATUS_DISPLAY,
    };

    container(
        text(display.label)
            .size(13)
            .style(iced::theme::Text::Color(rgb(display.foreground))),
    )
    .style(iced::theme::Container::Box)
    .padding([2, 8])
    .into()
}
