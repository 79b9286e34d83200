use std::path::PathBuf;

use iced::widget::{column, container, text};
use iced::{Application, Command, Element, Length, Theme};
use tokio::task;

use crate::api::client::NotasApiClient;
use crate::config::{self, DashboardConfig, GuiTheme};

use super::commands::CallError;
use super::components::error_banner::{error_banner, ErrorBannerState};
use super::components::modal::modal;
use super::error_map::describe_call_error;
use super::tabs::{notas, reprocess};
use super::telemetry;
use super::DashboardFlags;

/// Top-level iced [`Application`] coordinating the dashboard state.
pub struct DashboardApp {
    model: Model,
}

/// Messages driving the dashboard state machine.
#[derive(Debug, Clone)]
pub enum Message {
    ConfigLoaded(Result<DashboardConfig, AppError>),
    Notas(notas::Message),
    Reprocess(reprocess::Message),
    DismissError,
}

impl Application for DashboardApp {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = DashboardFlags;

    fn new(flags: Self::Flags) -> (Self, Command<Self::Message>) {
        let model = Model::new(flags);
        let command = Command::perform(
            load_dashboard_config(model.config_path.clone()),
            Message::ConfigLoaded,
        );
        (Self { model }, command)
    }

    fn title(&self) -> String {
        "Nota Fiscal Dashboard".to_owned()
    }

    fn update(&mut self, message: Self::Message) -> Command<Self::Message> {
        let mut update = Update::new();

        match message {
            Message::ConfigLoaded(result) => {
                match result {
                    Ok(config) => self.model.apply_config(config),
                    Err(error) => {
                        // Fall back to defaults so the page still loads.
                        self.model.apply_config(DashboardConfig::default());
                        self.model.push_error(error);
                    }
                }
                let command = self
                    .model
                    .notas
                    .activate(self.model.client.clone())
                    .map(Message::Notas);
                update.push(command);
            }
            Message::Notas(message) => {
                let (command, event) = self
                    .model
                    .notas
                    .update(self.model.client.clone(), message);
                update.push(command.map(Message::Notas));
                if let Some(notas::Event::OpenReprocess(nota)) = event {
                    self.model.reprocess.open(*nota);
                }
            }
            Message::Reprocess(message) => {
                let (command, event) = self
                    .model
                    .reprocess
                    .update(self.model.client.clone(), message);
                update.push(command.map(Message::Reprocess));
                if let Some(reprocess::Event::Completed) = event {
                    // Re-fetch the current page so the updated status and
                    // attempt count become visible.
                    let (refresh, _) = self
                        .model
                        .notas
                        .update(self.model.client.clone(), notas::Message::Refresh);
                    update.push(refresh.map(Message::Notas));
                }
            }
            Message::DismissError => {
                self.model.global_error = None;
            }
        }

        update.into_command()
    }

    fn view(&self) -> Element<Self::Message> {
        if let Some(dialog) = self.model.reprocess.view() {
            return modal(dialog).map(Message::Reprocess);
        }

        let header = text("Notas fiscais").size(28);
        let mut layout = column![header].spacing(16).padding(20);

        if let Some(error) = &self.model.global_error {
            layout = layout.push(error_banner(error.banner_state(), Message::DismissError));
        }

        let content: Element<Message> = if self.model.booted {
            self.model
                .notas
                .view(self.model.reprocess.in_flight_id())
                .map(Message::Notas)
        } else {
            container(text("Loading dashboard...").size(18))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x()
                .center_y()
                .into()
        };
        layout = layout.push(content);

        container(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        match self.model.theme {
            GuiTheme::Light => Theme::Light,
            GuiTheme::Dark => Theme::Dark,
        }
    }
}

/// Collects commands produced during a UI update cycle.
#[derive(Default)]
struct Update {
    commands: Vec<Command<Message>>,
}

impl Update {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    fn push(&mut self, command: Command<Message>) {
        self.commands.push(command);
    }

    fn into_command(self) -> Command<Message> {
        Command::batch(self.commands)
    }
}

struct Model {
    client: NotasApiClient,
    config_path: Option<PathBuf>,
    theme: GuiTheme,
    booted: bool,
    global_error: Option<ErrorNotification>,
    notas: notas::State,
    reprocess: reprocess::State,
}

impl Model {
    fn new(flags: DashboardFlags) -> Self {
        Self {
            client: flags.client,
            config_path: flags.config_path,
            theme: GuiTheme::Dark,
            booted: false,
            global_error: None,
            notas: notas::State::default(),
            reprocess: reprocess::State::default(),
        }
    }

    fn apply_config(&mut self, config: DashboardConfig) {
        telemetry::global().set_opt_in(config.gui.telemetry_opt_in);
        self.notas.set_page_size(config.gui.page_size);
        self.theme = config.gui.theme;
        self.booted = true;
    }

    fn push_error(&mut self, error: AppError) {
        self.global_error = Some(ErrorNotification::from(error));
    }
}

#[derive(Debug, Clone)]
pub struct AppError {
    message: String,
    detail: Option<String>,
}

impl AppError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }
}

impl From<CallError> for AppError {
    fn from(value: CallError) -> Self {
        let description = describe_call_error(&value);
        Self {
            message: description.headline,
            detail: description.technical,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::new(value.to_string())
    }
}

impl From<task::JoinError> for AppError {
    fn from(value: task::JoinError) -> Self {
        AppError::new(value.to_string())
    }
}

#[derive(Debug, Clone)]
struct ErrorNotification {
    message: String,
    detail: Option<String>,
}

impl From<AppError> for ErrorNotification {
    fn from(value: AppError) -> Self {
        Self {
            message: value.message,
            detail: value.detail,
        }
    }
}

impl ErrorNotification {
    fn banner_state(&self) -> ErrorBannerState<'_> {
        ErrorBannerState {
            message: &self.message,
            detail: self.detail.as_deref(),
        }
    }
}

async fn load_dashboard_config(path: Option<PathBuf>) -> Result<DashboardConfig, AppError> {
    if let Some(path) = path {
        let config = task::spawn_blocking(move || config::load(&path))
            .await
            .map_err(AppError::from)??;
        Ok(config)
    } else {
        Ok(DashboardConfig::default())
    }
}
