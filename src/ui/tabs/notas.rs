use std::fmt;
use std::time::Duration;

use iced::widget::{button, column, container, pick_list, row, scrollable, text, text_input};
use iced::{Alignment, Command, Element, Length};
use tokio::time;

use crate::api::client::NotasApiClient;
use crate::api::dto::{
    DocumentLinkResponse, ListNotasParams, NotaCounters, NotaFiscal, NotaStatus,
    NotasPageResponse, SortConfig, SortDirection, SortField,
};
use crate::format::{
    display_attempts, format_cnpj, format_currency, format_date, is_empty_data, is_valid_nota,
    observation,
};
use crate::ui::commands::{self, CallError};
use crate::ui::components::error_banner::{error_banner, ErrorBannerState};
use crate::ui::components::progress_bar::{progress_bar, ProgressBarState};
use crate::ui::components::status_badge::status_badge;
use crate::ui::error_map::describe_call_error;

/// Quiet period applied to the supplier search input before a fetch fires.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Number of placeholder rows rendered for loading and empty states.
const FIXED_ROW_COUNT: usize = 7;

const DEFAULT_PAGE_SIZE: u32 = 7;

/// Active counter-card filter. Exactly one is active at a time; `All` maps
/// to the synthetic total bucket and sends no status parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Pending,
    Processing,
    Identified,
    Saved,
    Escriturada,
    Completed,
    Error,
}

impl StatusFilter {
    pub const OPTIONS: [StatusFilter; 8] = [
        StatusFilter::All,
        StatusFilter::Pending,
        StatusFilter::Processing,
        StatusFilter::Identified,
        StatusFilter::Saved,
        StatusFilter::Escriturada,
        StatusFilter::Completed,
        StatusFilter::Error,
    ];

    fn to_param(self) -> Option<NotaStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Pending => Some(NotaStatus::Pending),
            StatusFilter::Processing => Some(NotaStatus::Processing),
            StatusFilter::Identified => Some(NotaStatus::Identified),
            StatusFilter::Saved => Some(NotaStatus::Saved),
            StatusFilter::Escriturada => Some(NotaStatus::Escriturada),
            StatusFilter::Completed => Some(NotaStatus::Completed),
            StatusFilter::Error => Some(NotaStatus::Error),
        }
    }

    fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All notas",
            StatusFilter::Pending => "Pending",
            StatusFilter::Processing => "Processing",
            StatusFilter::Identified => "Identified",
            StatusFilter::Saved => "Saved",
            StatusFilter::Escriturada => "Bookkept",
            StatusFilter::Completed => "Completed",
            StatusFilter::Error => "With errors",
        }
    }

    fn count(self, counters: &NotaCounters) -> u64 {
        match self {
            StatusFilter::All => counters.total,
            StatusFilter::Pending => counters.pending,
            StatusFilter::Processing => counters.processing,
            StatusFilter::Identified => counters.identified,
            StatusFilter::Saved => counters.saved,
            StatusFilter::Escriturada => counters.escriturada,
            StatusFilter::Completed => counters.completed,
            StatusFilter::Error => counters.error,
        }
    }
}

/// Named sort options offered next to the search box, mirroring the column
/// headers. The wire keys go through [`sort_field_for_key`] so an unmapped
/// key is logged and ignored instead of producing a bogus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    DataDaNota,
    Fornecedor,
    NumeroDeNota,
    Valor,
    Status,
    MaisRecente,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::DataDaNota,
        SortKey::Fornecedor,
        SortKey::NumeroDeNota,
        SortKey::Valor,
        SortKey::Status,
        SortKey::MaisRecente,
    ];

    fn key(self) -> &'static str {
        match self {
            SortKey::DataDaNota => "data_da_nota",
            SortKey::Fornecedor => "fornecedor",
            SortKey::NumeroDeNota => "numero_de_nota",
            SortKey::Valor => "valor",
            SortKey::Status => "status",
            SortKey::MaisRecente => "mais_recente",
        }
    }

    fn label(self) -> &'static str {
        match self {
            SortKey::DataDaNota => "Nota date",
            SortKey::Fornecedor => "Supplier",
            SortKey::NumeroDeNota => "Nota number",
            SortKey::Valor => "Value",
            SortKey::Status => "Status",
            SortKey::MaisRecente => "Most recent",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Maps a named sort key onto the backend sort field. Returns `None` for
/// keys without a backend mapping.
pub fn sort_field_for_key(key: &str) -> Option<SortField> {
    match key {
        "data_da_nota" => Some(SortField::EmissionDate),
        "fornecedor" => Some(SortField::Supplier),
        "numero_de_nota" => Some(SortField::Numero),
        "valor" => Some(SortField::TotalValue),
        "status" => Some(SortField::Status),
        "mais_recente" => Some(SortField::CreatedAt),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ErrorBanner {
    summary: String,
    detail: Option<String>,
}

/// State of the notas list page: filter, sort, search, pagination and the
/// last successfully fetched page of records.
#[derive(Debug)]
pub struct State {
    page_size: u32,
    filter: StatusFilter,
    sort: SortConfig,
    sort_key: Option<SortKey>,
    search_input: String,
    committed_search: String,
    debounce_generation: u64,
    committed_generation: u64,
    request_seq: u64,
    loading: bool,
    loaded_once: bool,
    notas: Vec<NotaFiscal>,
    counters: NotaCounters,
    page: u32,
    total_pages: u32,
    error_banner: Option<ErrorBanner>,
    document_link: Option<String>,
    last_params: Option<ListNotasParams>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            filter: StatusFilter::All,
            sort: SortConfig::default(),
            sort_key: None,
            search_input: String::new(),
            committed_search: String::new(),
            debounce_generation: 0,
            committed_generation: 0,
            request_seq: 0,
            loading: false,
            loaded_once: false,
            notas: Vec::new(),
            counters: NotaCounters::default(),
            page: 1,
            total_pages: 1,
            error_banner: None,
            document_link: None,
            last_params: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Refresh,
    CounterClicked(StatusFilter),
    SearchInputChanged(String),
    SearchDebounceElapsed(u64),
    SortHeaderClicked(SortField),
    SortKeySelected(SortKey),
    PageRequested(u32),
    NotasLoaded {
        seq: u64,
        result: Result<NotasPageResponse, CallError>,
    },
    AccessDocument(String),
    DocumentLinkLoaded(Result<DocumentLinkResponse, CallError>),
    CopyDocumentLink,
    DismissDocumentLink,
    ReprocessRequested(String),
    DismissError,
}

/// Signals bubbled up to the application shell.
#[derive(Debug, Clone)]
pub enum Event {
    OpenReprocess(Box<NotaFiscal>),
}

impl State {
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
    }

    /// True while a committed search is pending its quiet period.
    pub fn is_searching(&self) -> bool {
        self.debounce_generation != self.committed_generation
    }

    /// Combined busy indicator: a fetch in flight or a pending search.
    pub fn is_busy(&self) -> bool {
        self.loading || self.is_searching()
    }

    /// Issues the initial fetch when the page becomes active.
    pub fn activate(&mut self, client: NotasApiClient) -> Command<Message> {
        if !self.loaded_once && !self.loading {
            self.load_page(client)
        } else {
            Command::none()
        }
    }

    pub fn update(
        &mut self,
        client: NotasApiClient,
        message: Message,
    ) -> (Command<Message>, Option<Event>) {
        match message {
            Message::Refresh => (self.load_page(client), None),
            Message::CounterClicked(filter) => {
                if self.filter != filter {
                    self.filter = filter;
                    self.page = 1;
                    return (self.load_page(client), None);
                }
                (Command::none(), None)
            }
            Message::SearchInputChanged(value) => {
                self.search_input = value;
                self.debounce_generation += 1;
                let generation = self.debounce_generation;
                (
                    Command::perform(time::sleep(SEARCH_DEBOUNCE), move |_| {
                        Message::SearchDebounceElapsed(generation)
                    }),
                    None,
                )
            }
            Message::SearchDebounceElapsed(generation) => {
                if generation != self.debounce_generation {
                    // A newer keystroke restarted the quiet period.
                    return (Command::none(), None);
                }
                self.committed_generation = generation;
                let term = self.search_input.trim().to_string();
                if term == self.committed_search {
                    return (Command::none(), None);
                }
                self.committed_search = term;
                self.page = 1;
                (self.load_page(client), None)
            }
            Message::SortHeaderClicked(field) => {
                self.sort.apply(field);
                self.sort_key = None;
                (self.load_page(client), None)
            }
            Message::SortKeySelected(key) => {
                self.sort_key = Some(key);
                match sort_field_for_key(key.key()) {
                    Some(field) => {
                        self.sort.apply(field);
                        (self.load_page(client), None)
                    }
                    None => {
                        tracing::warn!(key = key.key(), "no backend mapping for sort selection");
                        (Command::none(), None)
                    }
                }
            }
            Message::PageRequested(page) => {
                let bounded = page.clamp(1, self.total_pages.max(1));
                if bounded == self.page {
                    return (Command::none(), None);
                }
                self.page = bounded;
                (self.load_page(client), None)
            }
            Message::NotasLoaded { seq, result } => {
                if seq != self.request_seq {
                    tracing::debug!(seq, latest = self.request_seq, "discarding stale response");
                    return (Command::none(), None);
                }
                self.loading = false;
                match result {
                    Ok(page) => self.apply_page(page),
                    Err(error) => {
                        // Keep the last successfully fetched records visible.
                        let description = describe_call_error(&error);
                        self.error_banner = Some(ErrorBanner {
                            summary: description.headline,
                            detail: description.technical,
                        });
                    }
                }
                (Command::none(), None)
            }
            Message::AccessDocument(nota_id) => (
                commands::api(
                    "nota_document",
                    client,
                    move |client| async move { client.document_link(&nota_id).await },
                    Message::DocumentLinkLoaded,
                ),
                None,
            ),
            Message::DocumentLinkLoaded(result) => {
                match result {
                    Ok(link) => self.document_link = Some(link.url),
                    Err(error) => {
                        let description = describe_call_error(&error);
                        self.error_banner = Some(ErrorBanner {
                            summary: description.headline,
                            detail: description.technical,
                        });
                    }
                }
                (Command::none(), None)
            }
            Message::CopyDocumentLink => match &self.document_link {
                Some(url) => (iced::clipboard::write(url.clone()), None),
                None => (Command::none(), None),
            },
            Message::DismissDocumentLink => {
                self.document_link = None;
                (Command::none(), None)
            }
            Message::ReprocessRequested(nota_id) => {
                let eligible = self.notas.iter().find(|nota| {
                    nota.id == nota_id
                        && nota
                            .status
                            .as_ref()
                            .map_or(true, NotaStatus::reprocess_available)
                });
                match eligible {
                    Some(nota) => (
                        Command::none(),
                        Some(Event::OpenReprocess(Box::new(nota.clone()))),
                    ),
                    None => (Command::none(), None),
                }
            }
            Message::DismissError => {
                self.error_banner = None;
                (Command::none(), None)
            }
        }
    }

    fn apply_page(&mut self, page: NotasPageResponse) {
        self.loaded_once = true;
        self.total_pages = page.total_pages.max(1);
        self.page = page.page.clamp(1, self.total_pages);
        self.counters = page.counters.clone().unwrap_or_else(|| {
            NotaCounters::tally(page.data.iter().filter(|nota| is_valid_nota(nota)))
        });
        self.notas = page.data;
        self.error_banner = None;
    }

    fn load_page(&mut self, client: NotasApiClient) -> Command<Message> {
        let params = self.build_params();
        self.last_params = Some(params.clone());
        self.loading = true;
        self.request_seq += 1;
        let seq = self.request_seq;
        commands::api(
            "list_notas",
            client,
            move |client| async move { client.list_notas(&params).await },
            move |result| Message::NotasLoaded { seq, result },
        )
    }

    fn build_params(&self) -> ListNotasParams {
        ListNotasParams {
            page: self.page,
            limit: self.page_size,
            status: self.filter.to_param(),
            fornecedor: (!self.committed_search.is_empty())
                .then(|| self.committed_search.clone()),
            sort: self.sort.field,
            order: self.sort.direction,
        }
    }

    #[cfg(test)]
    fn last_request(&self) -> Option<&ListNotasParams> {
        self.last_params.as_ref()
    }

    pub fn view(&self, in_flight: Option<&str>) -> Element<Message> {
        let mut layout = column![].spacing(16).width(Length::Fill);

        if let Some(banner) = &self.error_banner {
            layout = layout.push(error_banner(
                ErrorBannerState {
                    message: &banner.summary,
                    detail: banner.detail.as_deref(),
                },
                Message::DismissError,
            ));
        }

        if let Some(url) = &self.document_link {
            layout = layout.push(self.document_link_view(url));
        }

        layout = layout
            .push(self.counters_view())
            .push(self.toolbar_view())
            .push(self.table_view(in_flight))
            .push(self.pagination_controls());

        container(layout).width(Length::Fill).into()
    }

    fn counters_view(&self) -> Element<Message> {
        let cards = StatusFilter::OPTIONS.iter().fold(
            row![].spacing(12),
            |row, option| {
                let count = option.count(&self.counters);
                if count == 0 && *option != StatusFilter::All {
                    return row;
                }
                let card = column![
                    text(count.to_string()).size(22),
                    text(option.label()).size(13),
                ]
                .spacing(4)
                .align_items(Alignment::Start);

                let mut card = button(card).padding(12);
                if self.filter != *option {
                    card = card.style(iced::theme::Button::Secondary);
                }
                row.push(card.on_press(Message::CounterClicked(*option)))
            },
        );

        container(scrollable(cards)).width(Length::Fill).into()
    }

    fn toolbar_view(&self) -> Element<Message> {
        let mut search_row = row![text_input("Search by supplier", &self.search_input)
            .on_input(Message::SearchInputChanged)
            .padding(10)
            .size(16)
            .width(Length::Fixed(280.0)),]
        .spacing(12)
        .align_items(Alignment::Center);

        if self.is_busy() {
            search_row = search_row.push(text("Searching...").size(14));
        }

        let sort_row = row![
            text("Order by:").size(14),
            pick_list(&SortKey::ALL[..], self.sort_key, Message::SortKeySelected)
                .placeholder("Select a field")
                .padding(8),
            button(text("Refresh").size(14))
                .on_press(Message::Refresh)
                .padding(8),
        ]
        .spacing(12)
        .align_items(Alignment::Center);

        row![
            search_row.width(Length::Fill),
            sort_row,
        ]
        .spacing(16)
        .align_items(Alignment::Center)
        .width(Length::Fill)
        .into()
    }

    fn table_view(&self, in_flight: Option<&str>) -> Element<Message> {
        let header = row![
            sort_header("Emission date", SortField::EmissionDate, &self.sort),
            sort_header("Supplier CNPJ", SortField::Supplier, &self.sort),
            container(text("Branch CNPJ").size(14)).width(Length::FillPortion(2)),
            sort_header("Number", SortField::Numero, &self.sort),
            sort_header("Value", SortField::TotalValue, &self.sort),
            sort_header("Status", SortField::Status, &self.sort),
            container(text("Details").size(14)).width(Length::FillPortion(2)),
            container(text("Attempts").size(14)).width(Length::FillPortion(1)),
            container(text("Actions").size(14)).width(Length::FillPortion(3)),
        ]
        .spacing(8)
        .align_items(Alignment::Center);

        let body: Element<Message> = if self.loading {
            loading_rows()
        } else if is_empty_data(&self.notas) {
            empty_rows()
        } else {
            let rows = self
                .notas
                .iter()
                .filter(|nota| is_valid_nota(nota))
                .fold(column![].spacing(4), |column, nota| {
                    column.push(nota_row(nota, in_flight))
                });
            scrollable(rows).height(Length::Fill).into()
        };

        container(column![header, body].spacing(8))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn document_link_view<'a>(&'a self, url: &'a str) -> Element<'a, Message> {
        let link = crate::ui::components::copyable_text::copyable_text(
            "Document",
            url,
            Message::CopyDocumentLink,
        );
        row![
            container(link).width(Length::Fill),
            button(text("Dismiss").size(14))
                .on_press(Message::DismissDocumentLink)
                .padding(8),
        ]
        .spacing(12)
        .align_items(Alignment::Center)
        .into()
    }

    fn pagination_controls(&self) -> Element<Message> {
        if self.loading || is_empty_data(&self.notas) || self.total_pages <= 1 {
            return row![].into();
        }

        let prev_button = if self.page > 1 {
            button(text("Previous"))
                .on_press(Message::PageRequested(self.page - 1))
                .padding(8)
        } else {
            button(text("Previous")).padding(8)
        };

        let next_button = if self.page < self.total_pages {
            button(text("Next"))
                .on_press(Message::PageRequested(self.page + 1))
                .padding(8)
        } else {
            button(text("Next")).padding(8)
        };

        row![
            prev_button,
            text(format!("Page {} of {}", self.page, self.total_pages)).size(14),
            next_button,
        ]
        .spacing(12)
        .align_items(Alignment::Center)
        .width(Length::Fill)
        .into()
    }
}

fn sort_header<'a>(
    label: &'a str,
    field: SortField,
    sort: &SortConfig,
) -> Element<'a, Message> {
    let caption = if sort.field == Some(field) {
        let arrow = match sort.direction {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        };
        format!("{label} {arrow}")
    } else {
        label.to_string()
    };

    container(
        button(text(caption).size(14))
            .style(iced::theme::Button::Text)
            .on_press(Message::SortHeaderClicked(field))
            .padding(0),
    )
    .width(Length::FillPortion(2))
    .into()
}

fn nota_row<'a>(nota: &'a NotaFiscal, in_flight: Option<&str>) -> Element<'a, Message> {
    let supplier = nota
        .counterparty_cnpj
        .as_deref()
        .map(format_cnpj)
        .unwrap_or_else(|| "—".to_string());
    let branch = nota
        .branch_cnpj
        .as_deref()
        .map(format_cnpj)
        .unwrap_or_else(|| "—".to_string());
    let details = observation(nota.obs.as_deref()).unwrap_or("—").to_string();

    let mut actions = row![].spacing(8);
    if nota
        .status
        .as_ref()
        .is_some_and(NotaStatus::document_available)
    {
        actions = actions.push(
            button(text("View PDF").size(13))
                .style(iced::theme::Button::Secondary)
                .on_press(Message::AccessDocument(nota.id.clone()))
                .padding(6),
        );
    }
    if nota
        .status
        .as_ref()
        .map_or(true, NotaStatus::reprocess_available)
    {
        let mut reprocess = button(text("Reprocess").size(13)).padding(6);
        if in_flight != Some(nota.id.as_str()) {
            reprocess = reprocess.on_press(Message::ReprocessRequested(nota.id.clone()));
        }
        actions = actions.push(reprocess);
    }

    let cells = row![
        container(text(format_date(nota.emission_date)).size(14)).width(Length::FillPortion(2)),
        container(text(supplier).size(14)).width(Length::FillPortion(2)),
        container(text(branch).size(14)).width(Length::FillPortion(2)),
        container(text(nota.numero.to_string()).size(14)).width(Length::FillPortion(2)),
        container(text(format_currency(nota.total_value)).size(14)).width(Length::FillPortion(2)),
        container(status_badge(nota.status.as_ref())).width(Length::FillPortion(2)),
        container(text(details).size(14)).width(Length::FillPortion(2)),
        container(text(display_attempts(nota.attempts).to_string()).size(14))
            .width(Length::FillPortion(1)),
        container(actions).width(Length::FillPortion(3)),
    ]
    .spacing(8)
    .align_items(Alignment::Center);

    container(cells).padding(8).width(Length::Fill).into()
}

fn loading_rows<'a>() -> Element<'a, Message> {
    let mut rows = column![progress_bar(ProgressBarState {
        progress: 0.2,
        label: Some("Loading notas..."),
    })]
    .spacing(12);
    for _ in 1..FIXED_ROW_COUNT {
        rows = rows.push(container(text(" ")).padding(8).width(Length::Fill));
    }
    rows.width(Length::Fill).into()
}

fn empty_rows<'a>() -> Element<'a, Message> {
    let mut rows = column![container(text("No notas fiscais found.").size(16))
        .padding(8)
        .width(Length::Fill)]
    .spacing(12);
    for _ in 1..FIXED_ROW_COUNT {
        rows = rows.push(container(text(" ")).padding(8).width(Length::Fill));
    }
    rows.width(Length::Fill).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn dummy_client() -> NotasApiClient {
        NotasApiClient::from_endpoint("http://127.0.0.1:1", None, Duration::from_secs(1)).unwrap()
    }

    fn sample_nota(id: &str, status: NotaStatus) -> NotaFiscal {
        NotaFiscal {
            id: id.to_string(),
            numero: 7,
            status: Some(status),
            ..NotaFiscal::default()
        }
    }

    fn page_with(notas: Vec<NotaFiscal>, total_pages: u32) -> NotasPageResponse {
        NotasPageResponse {
            total: notas.len() as u64,
            data: notas,
            page: 1,
            limit: 7,
            total_pages,
            counters: None,
        }
    }

    fn deliver_latest(state: &mut State, result: Result<NotasPageResponse, CallError>) {
        let seq = state.request_seq;
        let _ = state.update(dummy_client(), Message::NotasLoaded { seq, result });
    }

    #[test]
    fn filter_change_resets_page_and_refetches() {
        let mut state = State::default();
        state.page = 3;
        state.total_pages = 5;

        let _ = state.update(dummy_client(), Message::CounterClicked(StatusFilter::Error));

        let params = state.last_request().expect("request issued");
        assert_eq!(params.page, 1);
        assert_eq!(params.status, Some(NotaStatus::Error));
        assert!(state.loading);
    }

    #[test]
    fn clicking_the_active_filter_is_a_noop() {
        let mut state = State::default();
        let _ = state.update(dummy_client(), Message::CounterClicked(StatusFilter::All));
        assert!(state.last_request().is_none());
        assert!(!state.loading);
    }

    #[test]
    fn sort_header_toggles_direction_for_the_active_field() {
        let mut state = State::default();

        let _ = state.update(
            dummy_client(),
            Message::SortHeaderClicked(SortField::EmissionDate),
        );
        let params = state.last_request().expect("request issued").clone();
        assert_eq!(params.sort, Some(SortField::EmissionDate));
        assert_eq!(params.order, SortDirection::Ascending);

        let _ = state.update(
            dummy_client(),
            Message::SortHeaderClicked(SortField::EmissionDate),
        );
        let params = state.last_request().expect("request issued").clone();
        assert_eq!(params.order, SortDirection::Descending);

        let _ = state.update(
            dummy_client(),
            Message::SortHeaderClicked(SortField::Numero),
        );
        let params = state.last_request().expect("request issued").clone();
        assert_eq!(params.sort, Some(SortField::Numero));
        assert_eq!(params.order, SortDirection::Ascending);
    }

    #[test]
    fn named_sort_keys_map_to_backend_fields() {
        assert_eq!(
            sort_field_for_key("data_da_nota"),
            Some(SortField::EmissionDate)
        );
        assert_eq!(sort_field_for_key("mais_recente"), Some(SortField::CreatedAt));
        assert_eq!(sort_field_for_key("valor"), Some(SortField::TotalValue));
        assert!(sort_field_for_key("campo_inexistente").is_none());
    }

    #[test]
    fn debounce_commits_only_the_final_search_value() {
        let mut state = State::default();

        let _ = state.update(
            dummy_client(),
            Message::SearchInputChanged("1".to_string()),
        );
        let _ = state.update(
            dummy_client(),
            Message::SearchInputChanged("19".to_string()),
        );
        let _ = state.update(
            dummy_client(),
            Message::SearchInputChanged("191".to_string()),
        );
        assert!(state.is_searching());
        assert_eq!(state.search_input, "191");

        // Timers for superseded keystrokes fire without committing.
        let _ = state.update(dummy_client(), Message::SearchDebounceElapsed(1));
        let _ = state.update(dummy_client(), Message::SearchDebounceElapsed(2));
        assert!(state.last_request().is_none());
        assert!(state.is_searching());

        let _ = state.update(dummy_client(), Message::SearchDebounceElapsed(3));
        assert!(!state.is_searching());
        let params = state.last_request().expect("final value committed");
        assert_eq!(params.fornecedor.as_deref(), Some("191"));
        assert_eq!(params.page, 1);
    }

    #[test]
    fn out_of_range_page_requests_never_reach_the_wire() {
        let mut state = State::default();
        state.page = 3;
        state.total_pages = 3;

        let _ = state.update(dummy_client(), Message::PageRequested(99));
        assert!(state.last_request().is_none());
        assert_eq!(state.page, 3);

        state.page = 1;
        let _ = state.update(dummy_client(), Message::PageRequested(0));
        assert!(state.last_request().is_none());
        assert_eq!(state.page, 1);

        let _ = state.update(dummy_client(), Message::PageRequested(2));
        let params = state.last_request().expect("in-range request");
        assert_eq!(params.page, 2);
    }

    #[test]
    fn stale_responses_are_discarded_by_sequence() {
        let mut state = State::default();

        let _ = state.update(dummy_client(), Message::Refresh);
        let first_seq = state.request_seq;
        let _ = state.update(dummy_client(), Message::Refresh);

        let stale = page_with(vec![sample_nota("stale", NotaStatus::Pending)], 1);
        let _ = state.update(
            dummy_client(),
            Message::NotasLoaded {
                seq: first_seq,
                result: Ok(stale),
            },
        );
        assert!(state.notas.is_empty());
        assert!(state.loading);

        let fresh = page_with(vec![sample_nota("fresh", NotaStatus::Pending)], 1);
        deliver_latest(&mut state, Ok(fresh));
        assert_eq!(state.notas.len(), 1);
        assert_eq!(state.notas[0].id, "fresh");
        assert!(!state.loading);
    }

    #[test]
    fn fetch_failure_keeps_last_known_good_records() {
        let mut state = State::default();

        let _ = state.update(dummy_client(), Message::Refresh);
        deliver_latest(
            &mut state,
            Ok(page_with(vec![sample_nota("n-1", NotaStatus::Pending)], 2)),
        );
        assert_eq!(state.notas.len(), 1);
        let counters = state.counters.clone();

        let _ = state.update(dummy_client(), Message::Refresh);
        deliver_latest(
            &mut state,
            Err(CallError::Timeout(Duration::from_secs(15))),
        );

        assert!(!state.loading);
        assert_eq!(state.notas.len(), 1);
        assert_eq!(state.counters, counters);
        assert!(state.error_banner.is_some());
    }

    #[test]
    fn counters_are_tallied_when_the_envelope_omits_them() {
        let mut state = State::default();

        let _ = state.update(dummy_client(), Message::Refresh);
        deliver_latest(
            &mut state,
            Ok(page_with(
                vec![
                    sample_nota("n-1", NotaStatus::Pending),
                    sample_nota("n-2", NotaStatus::Completed),
                    sample_nota("n-3", NotaStatus::Error),
                ],
                1,
            )),
        );

        assert_eq!(state.counters.pending, 1);
        assert_eq!(state.counters.completed, 1);
        assert_eq!(state.counters.error, 1);
        assert_eq!(state.counters.total, 3);
    }

    #[test]
    fn error_filter_requests_only_error_records() {
        let mut state = State::default();

        let _ = state.update(dummy_client(), Message::CounterClicked(StatusFilter::Error));
        let params = state.last_request().expect("request issued");
        assert_eq!(params.status, Some(NotaStatus::Error));

        deliver_latest(
            &mut state,
            Ok(page_with(vec![sample_nota("n-3", NotaStatus::Error)], 1)),
        );
        assert_eq!(state.notas.len(), 1);
        assert_eq!(state.notas[0].status, Some(NotaStatus::Error));
    }

    #[test]
    fn reprocess_request_bubbles_only_for_eligible_records() {
        let mut state = State::default();
        state.notas = vec![
            sample_nota("n-1", NotaStatus::Completed),
            sample_nota("n-2", NotaStatus::Error),
        ];

        let (_, event) = state.update(
            dummy_client(),
            Message::ReprocessRequested("n-1".to_string()),
        );
        assert!(event.is_none());

        let (_, event) = state.update(
            dummy_client(),
            Message::ReprocessRequested("n-2".to_string()),
        );
        match event {
            Some(Event::OpenReprocess(nota)) => assert_eq!(nota.id, "n-2"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn document_link_is_surfaced_for_copying() {
        let mut state = State::default();
        let _ = state.update(
            dummy_client(),
            Message::DocumentLinkLoaded(Ok(DocumentLinkResponse {
                url: "https://docs.example/n-1.pdf".to_string(),
            })),
        );
        assert_eq!(
            state.document_link.as_deref(),
            Some("https://docs.example/n-1.pdf")
        );

        let _ = state.update(dummy_client(), Message::DismissDocumentLink);
        assert!(state.document_link.is_none());
    }
}
