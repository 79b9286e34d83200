//! Wire types exchanged with the notas processing API.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle state of a nota fiscal inside the processing pipeline.
///
/// The wire values are uppercase; `FINALIZADA` is accepted as a legacy
/// alias of `COMPLETED` and never serialized back. Values outside the
/// known set are preserved verbatim so a newer backend does not break
/// deserialization of a whole page.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NotaStatus {
    Pending,
    Processing,
    Identified,
    Saved,
    Escriturada,
    Completed,
    Error,
    Other(String),
}

impl NotaStatus {
    /// The closed set of recognised lifecycle states.
    pub const KNOWN: [NotaStatus; 7] = [
        NotaStatus::Pending,
        NotaStatus::Processing,
        NotaStatus::Identified,
        NotaStatus::Saved,
        NotaStatus::Escriturada,
        NotaStatus::Completed,
        NotaStatus::Error,
    ];

    pub fn as_str(&self) -> Cow<'_, str> {
        match self {
            NotaStatus::Pending => Cow::Borrowed("PENDING"),
            NotaStatus::Processing => Cow::Borrowed("PROCESSING"),
            NotaStatus::Identified => Cow::Borrowed("IDENTIFIED"),
            NotaStatus::Saved => Cow::Borrowed("SAVED"),
            NotaStatus::Escriturada => Cow::Borrowed("ESCRITURADA"),
            NotaStatus::Completed => Cow::Borrowed("COMPLETED"),
            NotaStatus::Error => Cow::Borrowed("ERROR"),
            NotaStatus::Other(other) => Cow::Borrowed(other.as_str()),
        }
    }

    /// Whether the reprocess action may be offered for a record in this state.
    pub fn reprocess_available(&self) -> bool {
        !matches!(self, NotaStatus::Completed)
    }

    /// Whether the record has been identified, which is when its source
    /// document becomes retrievable.
    pub fn document_available(&self) -> bool {
        matches!(
            self,
            NotaStatus::Identified
                | NotaStatus::Saved
                | NotaStatus::Escriturada
                | NotaStatus::Completed
        )
    }
}

impl Serialize for NotaStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de> Deserialize<'de> for NotaStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => NotaStatus::Pending,
            "PROCESSING" => NotaStatus::Processing,
            "IDENTIFIED" => NotaStatus::Identified,
            "SAVED" => NotaStatus::Saved,
            "ESCRITURADA" => NotaStatus::Escriturada,
            "COMPLETED" | "FINALIZADA" => NotaStatus::Completed,
            "ERROR" => NotaStatus::Error,
            _ => NotaStatus::Other(value),
        })
    }
}

/// One invoice record as returned by the list endpoint.
///
/// Every field is defaulted: the backend occasionally returns a single
/// empty object instead of an empty page, and such placeholder records
/// must deserialize cleanly so they can be filtered out of the render
/// list instead of failing the whole response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotaFiscal {
    #[serde(alias = "qive_id")]
    pub id: String,
    pub numero: u64,
    pub status: Option<NotaStatus>,
    pub created_at: Option<DateTime<Utc>>,
    pub emission_date: Option<NaiveDate>,
    pub processing_started_date: Option<DateTime<Utc>>,
    pub identified_date: Option<DateTime<Utc>>,
    pub saved_date: Option<DateTime<Utc>>,
    pub escriturada_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub error_date: Option<DateTime<Utc>>,
    pub counterparty_cnpj: Option<String>,
    #[serde(alias = "filCnpj")]
    pub branch_cnpj: Option<String>,
    pub total_value: Option<f64>,
    pub obs: Option<String>,
    pub attempts: Option<u32>,
    pub info: Option<String>,
}

/// Per-status record counts plus the synthetic total bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotaCounters {
    #[serde(alias = "PENDING")]
    pub pending: u64,
    #[serde(alias = "PROCESSING")]
    pub processing: u64,
    #[serde(alias = "IDENTIFIED")]
    pub identified: u64,
    #[serde(alias = "SAVED")]
    pub saved: u64,
    #[serde(alias = "ESCRITURADA")]
    pub escriturada: u64,
    #[serde(alias = "COMPLETED")]
    pub completed: u64,
    #[serde(alias = "ERROR")]
    pub error: u64,
    #[serde(alias = "TOTAL")]
    pub total: u64,
}

impl NotaCounters {
    /// Tallies counters from a set of records. Used as a fallback when the
    /// backend envelope omits the counter block; records carrying an
    /// unrecognised status only contribute to the total bucket.
    pub fn tally<'a, I>(notas: I) -> Self
    where
        I: IntoIterator<Item = &'a NotaFiscal>,
    {
        let mut counters = Self::default();
        for nota in notas {
            match &nota.status {
                Some(NotaStatus::Pending) => counters.pending += 1,
                Some(NotaStatus::Processing) => counters.processing += 1,
                Some(NotaStatus::Identified) => counters.identified += 1,
                Some(NotaStatus::Saved) => counters.saved += 1,
                Some(NotaStatus::Escriturada) => counters.escriturada += 1,
                Some(NotaStatus::Completed) => counters.completed += 1,
                Some(NotaStatus::Error) => counters.error += 1,
                Some(NotaStatus::Other(_)) | None => {}
            }
            counters.total += 1;
        }
        counters
    }
}

/// Record attribute the backend can order a page by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    EmissionDate,
    Supplier,
    Numero,
    TotalValue,
    Status,
    CreatedAt,
}

impl SortField {
    /// Backend column name transmitted in the `sort` query parameter.
    pub const fn api_field(self) -> &'static str {
        match self {
            SortField::EmissionDate => "emission_date",
            SortField::Supplier => "counterparty_cnpj",
            SortField::Numero => "numero",
            SortField::TotalValue => "total_value",
            SortField::Status => "status",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub const fn as_param(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Current sort selection. Lives for one page instance; never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortConfig {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortConfig {
    /// Applies a header click: toggles direction when the field is already
    /// active, otherwise selects the field with the default ascending
    /// direction.
    pub fn apply(&mut self, field: SortField) {
        if self.field == Some(field) {
            self.direction = self.direction.toggled();
        } else {
            self.field = Some(field);
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Query parameters for the list endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct ListNotasParams {
    pub page: u32,
    pub limit: u32,
    pub status: Option<NotaStatus>,
    pub fornecedor: Option<String>,
    pub sort: Option<SortField>,
    pub order: SortDirection,
}

impl ListNotasParams {
    /// Encodes the parameters as query pairs. The order pair is only sent
    /// alongside an explicit sort field.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(status) = &self.status {
            pairs.push(("status", status.as_str().into_owned()));
        }
        if let Some(term) = &self.fornecedor {
            if !term.is_empty() {
                pairs.push(("fornecedor", term.clone()));
            }
        }
        if let Some(field) = self.sort {
            pairs.push(("sort", field.api_field().to_string()));
            pairs.push(("order", self.order.as_param().to_string()));
        }
        pairs
    }
}

fn default_page() -> u32 {
    1
}

/// Paginated envelope returned by the list endpoint. The counter block is
/// optional; callers fall back to [`NotaCounters::tally`] when it is absent.
#[derive(Clone, Debug, Deserialize)]
pub struct NotasPageResponse {
    #[serde(default)]
    pub data: Vec<NotaFiscal>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default = "default_page", rename = "totalPages")]
    pub total_pages: u32,
    #[serde(default)]
    pub counters: Option<NotaCounters>,
}

/// Operator-supplied payload for the reprocess endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReprocessParams {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReprocessResponse {
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DocumentLinkResponse {
    pub url: String,
}
