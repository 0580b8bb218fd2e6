//! Bulk sync: idempotent upsert of externally-sourced records, keyed by slug.
//!
//! The whole batch runs inside one transaction, so the returned counts always
//! match what was persisted. Merges are non-destructive: only truthy incoming
//! values (non-empty strings, non-zero numbers) overwrite existing fields, so
//! a sparse sync payload never clears data that was enriched by hand.

use crate::db::{self, Pool};
use crate::error::Result;
use crate::model::{NewBusiness, SyncItem, SyncOutcome};
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use tracing::{info, instrument};

/// Upsert every item, keyed by slug (explicit or derived from the name).
/// Returns created/updated counts; applying the same batch twice creates
/// nothing the second time.
#[instrument(skip_all, fields(items = items.len()))]
pub async fn sync_businesses(pool: &Pool, items: &[SyncItem]) -> Result<SyncOutcome> {
    let mut created = 0u64;
    let mut updated = 0u64;
    let mut tx = pool.begin().await?;
    for item in items {
        let slug = db::resolve_slug(item.slug.as_deref(), &item.name);
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM businesses WHERE slug = ?")
            .bind(&slug)
            .fetch_optional(&mut *tx)
            .await?;
        let now = Utc::now();
        match existing {
            Some(id) => {
                merge_item_tx(&mut tx, id, item, now).await?;
                updated += 1;
            }
            None => {
                db::insert_business_tx(&mut tx, &slug, &item_to_new(item), now).await?;
                created += 1;
            }
        }
    }
    tx.commit().await?;
    info!(created, updated, "sync batch committed");
    Ok(SyncOutcome {
        created,
        updated,
        total: created + updated,
    })
}

/// Fill creation defaults for fields the item leaves out.
fn item_to_new(item: &SyncItem) -> NewBusiness {
    NewBusiness {
        name: item.name.clone(),
        slug: item.slug.clone(),
        category: item.category.clone().unwrap_or_default(),
        demo_url: item.demo_url.clone().unwrap_or_default(),
        existing_website: item.existing_website.clone().unwrap_or_default(),
        website_quality: item.website_quality.unwrap_or_default(),
        priority: item.priority.unwrap_or_default(),
        status: item.status.unwrap_or_default(),
        contact_name: item.contact_name.clone().unwrap_or_default(),
        contact_email: item.contact_email.clone().unwrap_or_default(),
        contact_phone: item.contact_phone.clone().unwrap_or_default(),
        contact_role: item.contact_role.clone().unwrap_or_default(),
        demo_value_prop: item.demo_value_prop.clone().unwrap_or_default(),
        notes: item.notes.clone().unwrap_or_default(),
        portfolio_card_id: item.portfolio_card_id.clone().unwrap_or_default(),
    }
}

/// Apply the non-destructive merge for one existing record: overwrite a
/// field only when the incoming value is present AND truthy. `updated_at`
/// is refreshed regardless.
async fn merge_item_tx(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
    item: &SyncItem,
    now: DateTime<Utc>,
) -> Result<()> {
    enum Bind<'a> {
        Text(&'a str),
        Int(i64),
    }
    let mut sets: Vec<&'static str> = Vec::new();
    let mut binds: Vec<Bind<'_>> = Vec::new();
    macro_rules! merge_text {
        ($field:ident) => {
            if let Some(v) = item.$field.as_deref() {
                if !v.is_empty() {
                    sets.push(concat!(stringify!($field), " = ?"));
                    binds.push(Bind::Text(v));
                }
            }
        };
    }
    if !item.name.is_empty() {
        sets.push("name = ?");
        binds.push(Bind::Text(&item.name));
    }
    merge_text!(category);
    merge_text!(demo_url);
    merge_text!(existing_website);
    if let Some(v) = item.website_quality {
        if v != 0 {
            sets.push("website_quality = ?");
            binds.push(Bind::Int(v));
        }
    }
    if let Some(v) = item.priority {
        sets.push("priority = ?");
        binds.push(Bind::Text(v.as_str()));
    }
    if let Some(v) = item.status {
        sets.push("status = ?");
        binds.push(Bind::Text(v.as_str()));
    }
    merge_text!(contact_name);
    merge_text!(contact_email);
    merge_text!(contact_phone);
    merge_text!(contact_role);
    merge_text!(demo_value_prop);
    merge_text!(notes);
    merge_text!(portfolio_card_id);

    sets.push("updated_at = ?");
    let sql = format!("UPDATE businesses SET {} WHERE id = ?", sets.join(", "));
    let mut query = sqlx::query(&sql);
    for bind in &binds {
        query = match bind {
            Bind::Text(v) => query.bind(*v),
            Bind::Int(v) => query.bind(*v),
        };
    }
    query.bind(now).bind(id).execute(&mut **tx).await?;
    Ok(())
}
