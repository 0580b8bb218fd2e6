use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outreach temperature assigned to a business.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Hot,
    Warm,
    Cold,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Hot, Priority::Warm, Priority::Cold];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Hot => "hot",
            Priority::Warm => "warm",
            Priority::Cold => "cold",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s {
            "hot" => Some(Priority::Hot),
            "warm" => Some(Priority::Warm),
            "cold" => Some(Priority::Cold),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Cold
    }
}

/// Funnel position of a business. Roughly ordered; `Closed` and `Lost`
/// are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FunnelStatus {
    Prospect,
    Contacted,
    Responded,
    Meeting,
    Closed,
    Lost,
}

impl FunnelStatus {
    pub const ALL: [FunnelStatus; 6] = [
        FunnelStatus::Prospect,
        FunnelStatus::Contacted,
        FunnelStatus::Responded,
        FunnelStatus::Meeting,
        FunnelStatus::Closed,
        FunnelStatus::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FunnelStatus::Prospect => "prospect",
            FunnelStatus::Contacted => "contacted",
            FunnelStatus::Responded => "responded",
            FunnelStatus::Meeting => "meeting",
            FunnelStatus::Closed => "closed",
            FunnelStatus::Lost => "lost",
        }
    }

    pub fn parse(s: &str) -> Option<FunnelStatus> {
        match s {
            "prospect" => Some(FunnelStatus::Prospect),
            "contacted" => Some(FunnelStatus::Contacted),
            "responded" => Some(FunnelStatus::Responded),
            "meeting" => Some(FunnelStatus::Meeting),
            "closed" => Some(FunnelStatus::Closed),
            "lost" => Some(FunnelStatus::Lost),
            _ => None,
        }
    }
}

impl Default for FunnelStatus {
    fn default() -> Self {
        FunnelStatus::Prospect
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub demo_url: String,
    pub existing_website: String,
    pub website_quality: i64,
    pub priority: Priority,
    pub status: FunnelStatus,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_role: String,
    pub demo_value_prop: String,
    pub notes: String,
    pub portfolio_card_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachEvent {
    pub id: i64,
    pub business_id: i64,
    pub event_type: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// A business plus its event log, newest event first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessDetail {
    #[serde(flatten)]
    pub business: Business,
    pub events: Vec<OutreachEvent>,
}

/// Input shape for creating a business. Absent fields take the documented
/// defaults; `slug` falls back to `slugify(name)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBusiness {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub demo_url: String,
    #[serde(default)]
    pub existing_website: String,
    #[serde(default)]
    pub website_quality: i64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: FunnelStatus,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_role: String,
    #[serde(default)]
    pub demo_value_prop: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub portfolio_card_id: String,
}

impl NewBusiness {
    pub fn named(name: &str) -> Self {
        NewBusiness {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// Sparse update: only `Some` fields are applied, so "omitted" and "set to
/// empty" stay distinguishable. The slug is immutable and not patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_quality: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FunnelStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_value_prop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_card_id: Option<String>,
}

impl BusinessPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.demo_url.is_none()
            && self.existing_website.is_none()
            && self.website_quality.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.contact_name.is_none()
            && self.contact_email.is_none()
            && self.contact_phone.is_none()
            && self.contact_role.is_none()
            && self.demo_value_prop.is_none()
            && self.notes.is_none()
            && self.portfolio_card_id.is_none()
    }
}

/// One record of a bulk sync payload, keyed by slug (explicit or derived
/// from the name). Fields left out of the payload stay `None` and never
/// touch an existing record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncItem {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub demo_url: Option<String>,
    #[serde(default)]
    pub existing_website: Option<String>,
    #[serde(default)]
    pub website_quality: Option<i64>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<FunnelStatus>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_role: Option<String>,
    #[serde(default)]
    pub demo_value_prop: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub portfolio_card_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncOutcome {
    pub created: u64,
    pub updated: u64,
    pub total: u64,
}
