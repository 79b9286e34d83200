use iced::widget::{button, column, container, row, text, text_input};
use iced::{Alignment, Command, Element, Length};

use crate::api::client::NotasApiClient;
use crate::api::dto::{NotaFiscal, ReprocessParams, ReprocessResponse};
use crate::format::{
    display_attempts, format_cnpj, format_currency, format_datetime, observation,
};
use crate::ui::commands::{self, CallError};
use crate::ui::components::status_badge::status_badge;
use crate::ui::error_map::describe_call_error;
use crate::ui::telemetry;

/// Reason pre-filled when the dialog opens.
pub const DEFAULT_REASON: &str = "Reprocessing requested by operator";

#[derive(Debug, Clone, PartialEq)]
struct ErrorBanner {
    summary: String,
    detail: Option<String>,
}

#[derive(Debug, Clone)]
struct Dialog {
    nota: NotaFiscal,
    reason_input: String,
    process_input: String,
    notes_input: String,
    error_banner: Option<ErrorBanner>,
}

/// Reprocess confirmation workflow. Owns the dialog state and the single
/// in-flight record identifier; the marker is set synchronously before the
/// request starts and cleared when it settles, so at most one reprocess
/// call per record can ever be outstanding.
#[derive(Debug, Default)]
pub struct State {
    dialog: Option<Dialog>,
    in_flight: Option<String>,
    last_params: Option<ReprocessParams>,
}

#[derive(Debug, Clone)]
pub enum Message {
    ReasonChanged(String),
    ProcessChanged(String),
    NotesChanged(String),
    Confirm,
    Cancel,
    Submitted(Result<ReprocessResponse, CallError>),
}

/// Signals bubbled up to the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The reprocess request was accepted; the list should refresh.
    Completed,
}

impl State {
    /// Opens the confirmation dialog for a record, pre-filling the default
    /// reason, the record's process reference and its observation (when set
    /// and not the `-` placeholder). Ignored while a submission for the
    /// same record is still in flight.
    pub fn open(&mut self, nota: NotaFiscal) {
        if self.in_flight.as_deref() == Some(nota.id.as_str()) {
            return;
        }
        let process_input = nota.info.clone().unwrap_or_default();
        let notes_input = observation(nota.obs.as_deref())
            .unwrap_or_default()
            .to_string();
        self.dialog = Some(Dialog {
            nota,
            reason_input: DEFAULT_REASON.to_string(),
            process_input,
            notes_input,
            error_banner: None,
        });
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_some()
    }

    /// Identifier of the record currently being reprocessed, if any.
    pub fn in_flight_id(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }

    pub fn update(
        &mut self,
        client: NotasApiClient,
        message: Message,
    ) -> (Command<Message>, Option<Event>) {
        match message {
            Message::ReasonChanged(value) => {
                if let Some(dialog) = &mut self.dialog {
                    dialog.reason_input = value;
                }
                (Command::none(), None)
            }
            Message::ProcessChanged(value) => {
                if let Some(dialog) = &mut self.dialog {
                    dialog.process_input = value;
                }
                (Command::none(), None)
            }
            Message::NotesChanged(value) => {
                if let Some(dialog) = &mut self.dialog {
                    dialog.notes_input = value;
                }
                (Command::none(), None)
            }
            Message::Confirm => (self.submit(client), None),
            Message::Cancel => {
                self.dialog = None;
                (Command::none(), None)
            }
            Message::Submitted(result) => {
                self.in_flight = None;
                match result {
                    Ok(response) if response.accepted => {
                        self.dialog = None;
                        telemetry::global().record_reprocess_outcome("success");
                        (Command::none(), Some(Event::Completed))
                    }
                    Ok(response) => {
                        self.set_error_banner(ErrorBanner {
                            summary: "The notas service declined the reprocess request."
                                .to_string(),
                            detail: response.message,
                        });
                        telemetry::global().record_reprocess_outcome("rejected");
                        (Command::none(), None)
                    }
                    Err(error) => {
                        let description = describe_call_error(&error);
                        self.set_error_banner(ErrorBanner {
                            summary: description.headline,
                            detail: description.technical,
                        });
                        telemetry::global().record_reprocess_outcome("error");
                        (Command::none(), None)
                    }
                }
            }
        }
    }

    fn submit(&mut self, client: NotasApiClient) -> Command<Message> {
        let Some(dialog) = &mut self.dialog else {
            return Command::none();
        };
        if self.in_flight.is_some() {
            return Command::none();
        }

        let reason = dialog.reason_input.trim().to_string();
        if reason.is_empty() {
            dialog.error_banner = Some(ErrorBanner {
                summary: "A reason is required to reprocess a nota.".to_string(),
                detail: None,
            });
            return Command::none();
        }

        let nota_id = dialog.nota.id.clone();
        let params = ReprocessParams {
            reason,
            process: non_empty(&dialog.process_input),
            notes: non_empty(&dialog.notes_input),
        };
        self.last_params = Some(params.clone());
        self.in_flight = Some(nota_id.clone());

        commands::api(
            "reprocess_nota",
            client,
            move |client| async move { client.reprocess_nota(&nota_id, &params).await },
            Message::Submitted,
        )
    }

    fn set_error_banner(&mut self, banner: ErrorBanner) {
        if let Some(dialog) = &mut self.dialog {
            dialog.error_banner = Some(banner);
        }
    }

    #[cfg(test)]
    fn last_submission(&self) -> Option<&ReprocessParams> {
        self.last_params.as_ref()
    }

    /// Renders the dialog contents when it is open.
    pub fn view(&self) -> Option<iced::widget::Column<'_, Message>> {
        let dialog = self.dialog.as_ref()?;
        let submitting = self.in_flight.as_deref() == Some(dialog.nota.id.as_str());

        let supplier = dialog
            .nota
            .counterparty_cnpj
            .as_deref()
            .map(format_cnpj)
            .unwrap_or_else(|| "—".to_string());

        let summary = column![
            summary_row("Number", dialog.nota.numero.to_string()),
            summary_row("Supplier", supplier),
            summary_row("Created", format_datetime(dialog.nota.created_at)),
            summary_row("Value", format_currency(dialog.nota.total_value)),
            summary_row(
                "Attempts",
                display_attempts(dialog.nota.attempts).to_string()
            ),
            row![
                container(text("Status").size(14)).width(Length::Fixed(120.0)),
                status_badge(dialog.nota.status.as_ref()),
            ]
            .spacing(12)
            .align_items(Alignment::Center),
        ]
        .spacing(8);

        let form = column![
            field_row(
                "Reason",
                text_input("Reason", &dialog.reason_input)
                    .on_input(Message::ReasonChanged)
                    .padding(8)
                    .size(14)
                    .into(),
            ),
            field_row(
                "Process",
                text_input("Process reference (optional)", &dialog.process_input)
                    .on_input(Message::ProcessChanged)
                    .padding(8)
                    .size(14)
                    .into(),
            ),
            field_row(
                "Notes",
                text_input("Notes (optional)", &dialog.notes_input)
                    .on_input(Message::NotesChanged)
                    .padding(8)
                    .size(14)
                    .into(),
            ),
        ]
        .spacing(8);

        let mut content = column![text("Reprocess nota fiscal").size(22), summary, form]
            .spacing(16)
            .align_items(Alignment::Start);

        if let Some(banner) = &dialog.error_banner {
            let mut error = column![text(&banner.summary).size(14)];
            if let Some(detail) = &banner.detail {
                error = error.push(text(detail).size(13));
            }
            content = content.push(
                container(error.spacing(4))
                    .style(iced::theme::Container::Box)
                    .padding(8)
                    .width(Length::Fill),
            );
        }

        if submitting {
            content = content.push(text("Submitting reprocess request...").size(14));
        }

        let mut confirm = button(text("Confirm reprocess"))
            .style(iced::theme::Button::Primary)
            .padding(10);
        if !submitting && !dialog.reason_input.trim().is_empty() {
            confirm = confirm.on_press(Message::Confirm);
        }

        let actions = row![
            confirm,
            button(text("Cancel")).on_press(Message::Cancel).padding(10),
        ]
        .spacing(12)
        .align_items(Alignment::Center);

        Some(content.push(actions))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn summary_row<'a>(label: &'a str, value: String) -> Element<'a, Message> {
    row![
        container(text(label).size(14)).width(Length::Fixed(120.0)),
        text(value).size(14),
    ]
    .spacing(12)
    .align_items(Alignment::Center)
    .into()
}

fn field_row<'a>(label: &'a str, field: Element<'a, Message>) -> Element<'a, Message> {
    row![
        container(text(label).size(14)).width(Length::Fixed(120.0)),
        field,
    ]
    .spacing(12)
    .align_items(Alignment::Center)
    .width(Length::Fill)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::NotaStatus;
    use std::time::Duration;

    fn dummy_client() -> NotasApiClient {
        NotasApiClient::from_endpoint("http://127.0.0.1:1", None, Duration::from_secs(1)).unwrap()
    }

    fn sample_nota(id: &str) -> NotaFiscal {
        NotaFiscal {
            id: id.to_string(),
            numero: 42,
            status: Some(NotaStatus::Error),
            info: Some("PROC-9".to_string()),
            obs: Some("late XML".to_string()),
            ..NotaFiscal::default()
        }
    }

    #[test]
    fn open_prefills_reason_process_and_notes() {
        let mut state = State::default();
        state.open(sample_nota("n-1"));

        let dialog = state.dialog.as_ref().expect("dialog open");
        assert_eq!(dialog.reason_input, DEFAULT_REASON);
        assert_eq!(dialog.process_input, "PROC-9");
        assert_eq!(dialog.notes_input, "late XML");
    }

    #[test]
    fn placeholder_observation_is_not_prefilled() {
        let mut state = State::default();
        let mut nota = sample_nota("n-1");
        nota.obs = Some("-".to_string());
        state.open(nota);

        let dialog = state.dialog.as_ref().expect("dialog open");
        assert!(dialog.notes_input.is_empty());
    }

    #[test]
    fn confirm_sets_the_in_flight_marker_synchronously() {
        let mut state = State::default();
        state.open(sample_nota("n-1"));

        let _ = state.update(dummy_client(), Message::Confirm);
        assert_eq!(state.in_flight_id(), Some("n-1"));
        let params = state.last_submission().expect("submission recorded");
        assert_eq!(params.reason, DEFAULT_REASON);
        assert_eq!(params.process.as_deref(), Some("PROC-9"));
    }

    #[test]
    fn second_confirm_is_a_noop_while_in_flight() {
        let mut state = State::default();
        state.open(sample_nota("n-1"));

        let _ = state.update(dummy_client(), Message::Confirm);
        let _ = state.update(
            dummy_client(),
            Message::ReasonChanged("edited reason".to_string()),
        );
        let _ = state.update(dummy_client(), Message::Confirm);

        // The second confirm never built a request with the edited reason.
        let params = state.last_submission().expect("submission recorded");
        assert_eq!(params.reason, DEFAULT_REASON);
        assert_eq!(state.in_flight_id(), Some("n-1"));
    }

    #[test]
    fn failure_clears_the_marker_and_keeps_the_dialog() {
        let mut state = State::default();
        state.open(sample_nota("n-1"));
        let _ = state.update(dummy_client(), Message::Confirm);

        let (_, event) = state.update(
            dummy_client(),
            Message::Submitted(Err(CallError::Timeout(Duration::from_secs(15)))),
        );

        assert!(event.is_none());
        assert!(state.in_flight_id().is_none());
        let dialog = state.dialog.as_ref().expect("dialog still open");
        assert!(dialog.error_banner.is_some());
    }

    #[test]
    fn success_closes_the_dialog_and_signals_a_refresh() {
        let mut state = State::default();
        state.open(sample_nota("n-1"));
        let _ = state.update(dummy_client(), Message::Confirm);

        let (_, event) = state.update(
            dummy_client(),
            Message::Submitted(Ok(ReprocessResponse {
                accepted: true,
                message: None,
            })),
        );

        assert_eq!(event, Some(Event::Completed));
        assert!(state.dialog.is_none());
        assert!(state.in_flight_id().is_none());
    }

    #[test]
    fn declined_response_keeps_the_dialog_with_an_error() {
        let mut state = State::default();
        state.open(sample_nota("n-1"));
        let _ = state.update(dummy_client(), Message::Confirm);

        let (_, event) = state.update(
            dummy_client(),
            Message::Submitted(Ok(ReprocessResponse {
                accepted: false,
                message: Some("attempt limit reached".to_string()),
            })),
        );

        assert!(event.is_none());
        let dialog = state.dialog.as_ref().expect("dialog still open");
        let banner = dialog.error_banner.as_ref().expect("banner set");
        assert_eq!(banner.detail.as_deref(), Some("attempt limit reached"));
    }

    #[test]
    fn reopening_for_the_in_flight_record_is_ignored() {
        let mut state = State::default();
        state.open(sample_nota("n-1"));
        let _ = state.update(dummy_client(), Message::Confirm);
        let _ = state.update(dummy_client(), Message::Cancel);
        assert!(!state.is_open());

        state.open(sample_nota("n-1"));
        assert!(!state.is_open());

        state.open(sample_nota("n-2"));
        assert!(state.is_open());
    }

    #[test]
    fn empty_reason_blocks_submission() {
        let mut state = State::default();
        state.open(sample_nota("n-1"));
        let _ = state.update(dummy_client(), Message::ReasonChanged("  ".to_string()));
        let _ = state.update(dummy_client(), Message::Confirm);

        assert!(state.in_flight_id().is_none());
        assert!(state.last_submission().is_none());
        let dialog = state.dialog.as_ref().expect("dialog open");
        assert!(dialog.error_banner.is_some());
    }
}
