//! Query-input shapes and row mapping for the repositories.

use crate::error::CrmError;
use crate::model::{Business, FunnelStatus, OutreachEvent, Priority};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Composable list filters; all present filters AND together.
#[derive(Debug, Clone, Default)]
pub struct ListFilters {
    /// Exact status match.
    pub status: Option<FunnelStatus>,
    /// Case-insensitive substring match on category.
    pub category: Option<String>,
    /// Exact priority match.
    pub priority: Option<Priority>,
    /// Case-insensitive substring match on name OR notes.
    pub search: Option<String>,
}

fn decode_error(column: &str, value: &str) -> CrmError {
    CrmError::Db(sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unrecognized {column} value '{value}'").into(),
    })
}

pub(crate) fn business_from_row(row: &SqliteRow) -> Result<Business, CrmError> {
    let priority_raw: String = row.get("priority");
    let status_raw: String = row.get("status");
    Ok(Business {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        category: row.get("category"),
        demo_url: row.get("demo_url"),
        existing_website: row.get("existing_website"),
        website_quality: row.get("website_quality"),
        priority: Priority::parse(&priority_raw)
            .ok_or_else(|| decode_error("priority", &priority_raw))?,
        status: FunnelStatus::parse(&status_raw)
            .ok_or_else(|| decode_error("status", &status_raw))?,
        contact_name: row.get("contact_name"),
        contact_email: row.get("contact_email"),
        contact_phone: row.get("contact_phone"),
        contact_role: row.get("contact_role"),
        demo_value_prop: row.get("demo_value_prop"),
        notes: row.get("notes"),
        portfolio_card_id: row.get("portfolio_card_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

pub(crate) fn event_from_row(row: &SqliteRow) -> OutreachEvent {
    OutreachEvent {
        id: row.get("id"),
        business_id: row.get("business_id"),
        event_type: row.get("event_type"),
        details: row.get("details"),
        created_at: row.get("created_at"),
    }
}
