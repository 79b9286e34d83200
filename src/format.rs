//! Pure display helpers for nota fiscal records.

use chrono::{DateTime, NaiveDate, Utc};

use crate::api::dto::{NotaFiscal, NotaStatus};

/// Display metadata for one lifecycle state: a label plus the badge colours
/// as `0xRRGGBB` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusDisplay {
    pub label: &'static str,
    pub background: u32,
    pub foreground: u32,
}

/// Neutral display used for missing or unrecognised status values.
pub const UNKNOWN_STATUS_DISPLAY: StatusDisplay = StatusDisplay {
    label: "Unknown",
    background: 0xE2E8F0,
    foreground: 0x475569,
};

/// Maps a lifecycle state to its display metadata. Unrecognised values fall
/// back to [`UNKNOWN_STATUS_DISPLAY`] instead of failing.
pub fn status_display(status: &NotaStatus) -> StatusDisplay {
    match status {
        NotaStatus::Pending => StatusDisplay {
            label: "Pending",
            background: 0xFEF3C7,
            foreground: 0x92400E,
        },
        NotaStatus::Processing => StatusDisplay {
            label: "Processing",
            background: 0xDBEAFE,
            foreground: 0x1E40AF,
        },
        NotaStatus::Identified => StatusDisplay {
            label: "Identified",
            background: 0xCFFAFE,
            foreground: 0x155E75,
        },
        NotaStatus::Saved => StatusDisplay {
            label: "Saved",
            background: 0xE0E7FF,
            foreground: 0x3730A3,
        },
        NotaStatus::Escriturada => StatusDisplay {
            label: "Bookkept",
            background: 0xEDE9FE,
            foreground: 0x5B21B6,
        },
        NotaStatus::Completed => StatusDisplay {
            label: "Completed",
            background: 0xD1FAE5,
            foreground: 0x065F46,
        },
        NotaStatus::Error => StatusDisplay {
            label: "Error",
            background: 0xFEE2E2,
            foreground: 0x991B1B,
        },
        NotaStatus::Other(_) => UNKNOWN_STATUS_DISPLAY,
    }
}

/// Formats a monetary amount as Brazilian real text. A missing or zero
/// amount renders as the zero-value currency string, never as blank.
pub fn format_currency(value: Option<f64>) -> String {
    let amount = value.unwrap_or(0.0);
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("R$ {sign}{grouped},{frac:02}")
}

/// Formats a CNPJ in the standard `00.000.000/0000-00` grouping when the
/// input is exactly fourteen digits; any other input is returned untouched.
pub fn format_cnpj(raw: &str) -> String {
    let digits_only = raw.len() == 14 && raw.bytes().all(|b| b.is_ascii_digit());
    if !digits_only {
        return raw.to_string();
    }
    format!(
        "{}.{}.{}/{}-{}",
        &raw[0..2],
        &raw[2..5],
        &raw[5..8],
        &raw[8..12],
        &raw[12..14]
    )
}

pub fn format_date(value: Option<NaiveDate>) -> String {
    match value {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => "—".to_string(),
    }
}

pub fn format_datetime(value: Option<DateTime<Utc>>) -> String {
    match value {
        Some(timestamp) => timestamp.format("%d/%m/%Y %H:%M").to_string(),
        None => "—".to_string(),
    }
}

/// A record is valid for display only when it carries an identifier and an
/// invoice number; anything else is skipped from rendering.
pub fn is_valid_nota(nota: &NotaFiscal) -> bool {
    !nota.id.trim().is_empty() && nota.numero != 0
}

fn is_blank(nota: &NotaFiscal) -> bool {
    nota.id.trim().is_empty() && nota.numero == 0
}

/// Treats both an empty page and the backend's single-placeholder-object
/// quirk as "no data".
pub fn is_empty_data(notas: &[NotaFiscal]) -> bool {
    notas.is_empty() || (notas.len() == 1 && is_blank(&notas[0]))
}

/// Returns the observation text when it is set and not the `-` placeholder.
pub fn observation(obs: Option<&str>) -> Option<&str> {
    obs.map(str::trim).filter(|text| !text.is_empty() && *text != "-")
}

/// Attempt count shown in the table; a missing or zero count displays as 1.
pub fn display_attempts(attempts: Option<u32>) -> u32 {
    attempts.filter(|count| *count > 0).unwrap_or(1)
}
