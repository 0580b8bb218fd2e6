use super::model::{business_from_row, event_from_row, ListFilters};
use crate::error::{CrmError, Result};
use crate::model::{
    Business, BusinessDetail, BusinessPatch, FunnelStatus, NewBusiness, OutreachEvent,
};
use crate::slug::slugify;
use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::instrument;

pub type Pool = SqlitePool;

const BUSINESS_COLS: &str = "id, name, slug, category, demo_url, existing_website, \
     website_quality, priority, status, contact_name, contact_email, contact_phone, \
     contact_role, demo_value_prop, notes, portfolio_card_id, created_at, updated_at";

pub async fn init_pool(database_url: &str) -> anyhow::Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized).await?;
    // Enable WAL and stricter durability.
    sqlx::query("PRAGMA journal_mode=WAL;").execute(&pool).await?;
    sqlx::query("PRAGMA synchronous=FULL;").execute(&pool).await?;
    Ok(pool)
}

/// For file-backed SQLite URLs, expand a leading `~/` and create the parent
/// directory. In-memory URLs and non-sqlite schemes pass through untouched.
fn prepare_sqlite_url(url: &str) -> String {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return url.to_string();
    };
    if rest.starts_with(":memory") {
        return url.to_string();
    }
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let (path, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path.is_empty() {
        return url.to_string();
    }
    let path = match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(tail), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), tail),
        _ => path.to_string(),
    };
    if let Some(parent) = std::path::Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
    match query {
        Some(q) => format!("sqlite://{path}?{q}"),
        None => format!("sqlite://{path}"),
    }
}

pub async fn run_migrations(pool: &Pool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Resolve the effective slug for an input: explicit slug if non-empty,
/// otherwise derived from the name.
pub fn resolve_slug(explicit: Option<&str>, name: &str) -> String {
    match explicit {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => slugify(name),
    }
}

fn map_insert_err(e: sqlx::Error, slug: &str) -> CrmError {
    if e.as_database_error()
        .map_or(false, |d| d.is_unique_violation())
    {
        CrmError::Conflict(format!("business with slug '{slug}' already exists"))
    } else {
        e.into()
    }
}

/// Create a business with default-filled workflow fields. Fails with
/// `Conflict` when the slug is already taken.
#[instrument(skip_all)]
pub async fn create_business(pool: &Pool, new: &NewBusiness) -> Result<Business> {
    let slug = resolve_slug(new.slug.as_deref(), &new.name);
    let mut tx = pool.begin().await?;
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM businesses WHERE slug = ?")
        .bind(&slug)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_some() {
        return Err(CrmError::Conflict(format!(
            "business with slug '{slug}' already exists"
        )));
    }
    let id = insert_business_tx(&mut tx, &slug, new, Utc::now()).await?;
    tx.commit().await?;
    fetch_business(pool, id).await
}

pub(crate) async fn insert_business_tx(
    tx: &mut Transaction<'_, Sqlite>,
    slug: &str,
    new: &NewBusiness,
    now: DateTime<Utc>,
) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO businesses (name, slug, category, demo_url, existing_website, \
         website_quality, priority, status, contact_name, contact_email, contact_phone, \
         contact_role, demo_value_prop, notes, portfolio_card_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&new.name)
    .bind(slug)
    .bind(&new.category)
    .bind(&new.demo_url)
    .bind(&new.existing_website)
    .bind(new.website_quality)
    .bind(new.priority.as_str())
    .bind(new.status.as_str())
    .bind(&new.contact_name)
    .bind(&new.contact_email)
    .bind(&new.contact_phone)
    .bind(&new.contact_role)
    .bind(&new.demo_value_prop)
    .bind(&new.notes)
    .bind(&new.portfolio_card_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_insert_err(e, slug))?;
    Ok(rec.get("id"))
}

#[instrument(skip_all)]
pub async fn fetch_business(pool: &Pool, id: i64) -> Result<Business> {
    let row = sqlx::query(&format!(
        "SELECT {BUSINESS_COLS} FROM businesses WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    match row {
        Some(row) => business_from_row(&row),
        None => Err(CrmError::NotFound(id)),
    }
}

#[instrument(skip_all)]
pub async fn find_business_by_slug(pool: &Pool, slug: &str) -> Result<Option<Business>> {
    let row = sqlx::query(&format!(
        "SELECT {BUSINESS_COLS} FROM businesses WHERE slug = ?"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    row.map(|r| business_from_row(&r)).transpose()
}

/// Business plus its events, newest event first.
#[instrument(skip_all)]
pub async fn get_business_detail(pool: &Pool, id: i64) -> Result<BusinessDetail> {
    let business = fetch_business(pool, id).await?;
    let rows = sqlx::query(
        "SELECT id, business_id, event_type, details, created_at FROM outreach_events \
         WHERE business_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    let events = rows.iter().map(event_from_row).collect();
    Ok(BusinessDetail { business, events })
}

/// Filtered listing ordered by `updated_at` descending. Substring filters
/// match case-insensitively (ASCII, like SQLite's `lower()`).
#[instrument(skip_all)]
pub async fn list_businesses(pool: &Pool, filters: &ListFilters) -> Result<Vec<Business>> {
    let mut clauses: Vec<&'static str> = Vec::new();
    let mut binds: Vec<String> = Vec::new();
    if let Some(status) = filters.status {
        clauses.push("status = ?");
        binds.push(status.as_str().to_string());
    }
    if let Some(category) = &filters.category {
        clauses.push("instr(lower(category), lower(?)) > 0");
        binds.push(category.clone());
    }
    if let Some(priority) = filters.priority {
        clauses.push("priority = ?");
        binds.push(priority.as_str().to_string());
    }
    if let Some(search) = &filters.search {
        clauses.push("(instr(lower(name), lower(?)) > 0 OR instr(lower(notes), lower(?)) > 0)");
        binds.push(search.clone());
        binds.push(search.clone());
    }

    let mut sql = format!("SELECT {BUSINESS_COLS} FROM businesses");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    // Timestamps are stored as uniform-offset UTC text, so the raw column
    // orders correctly at full sub-second precision.
    sql.push_str(" ORDER BY updated_at DESC, id DESC");

    let mut query = sqlx::query(&sql);
    for bind in &binds {
        query = query.bind(bind.as_str());
    }
    let rows = query.fetch_all(pool).await?;
    rows.iter().map(business_from_row).collect()
}

/// All businesses ordered by name ascending, for export.
#[instrument(skip_all)]
pub async fn list_businesses_by_name(pool: &Pool) -> Result<Vec<Business>> {
    let rows = sqlx::query(&format!(
        "SELECT {BUSINESS_COLS} FROM businesses ORDER BY name ASC, id ASC"
    ))
    .fetch_all(pool)
    .await?;
    rows.iter().map(business_from_row).collect()
}

enum Bind<'a> {
    Text(&'a str),
    Int(i64),
}

/// Sparse update: only fields present in the patch are applied; `updated_at`
/// is always refreshed.
#[instrument(skip_all)]
pub async fn update_business(pool: &Pool, id: i64, patch: &BusinessPatch) -> Result<Business> {
    let mut sets: Vec<&'static str> = Vec::new();
    let mut binds: Vec<Bind<'_>> = Vec::new();
    macro_rules! set_text {
        ($field:ident) => {
            if let Some(v) = &patch.$field {
                sets.push(concat!(stringify!($field), " = ?"));
                binds.push(Bind::Text(v));
            }
        };
    }
    set_text!(name);
    set_text!(category);
    set_text!(demo_url);
    set_text!(existing_website);
    if let Some(v) = patch.website_quality {
        sets.push("website_quality = ?");
        binds.push(Bind::Int(v));
    }
    if let Some(v) = patch.priority {
        sets.push("priority = ?");
        binds.push(Bind::Text(v.as_str()));
    }
    if let Some(v) = patch.status {
        sets.push("status = ?");
        binds.push(Bind::Text(v.as_str()));
    }
    set_text!(contact_name);
    set_text!(contact_email);
    set_text!(contact_phone);
    set_text!(contact_role);
    set_text!(demo_value_prop);
    set_text!(notes);
    set_text!(portfolio_card_id);

    sets.push("updated_at = ?");
    let sql = format!("UPDATE businesses SET {} WHERE id = ?", sets.join(", "));
    let mut query = sqlx::query(&sql);
    for bind in &binds {
        query = match bind {
            Bind::Text(v) => query.bind(*v),
            Bind::Int(v) => query.bind(*v),
        };
    }
    let result = query.bind(Utc::now()).bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(CrmError::NotFound(id));
    }
    fetch_business(pool, id).await
}

/// Delete a business and its events in one transaction. Returns the id.
#[instrument(skip_all)]
pub async fn delete_business(pool: &Pool, id: i64) -> Result<i64> {
    let mut tx = pool.begin().await?;
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM businesses WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_none() {
        return Err(CrmError::NotFound(id));
    }
    sqlx::query("DELETE FROM outreach_events WHERE business_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM businesses WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(id)
}

/// Append an event and touch the owning business's `updated_at`, atomically.
#[instrument(skip_all)]
pub async fn insert_event(
    pool: &Pool,
    business_id: i64,
    event_type: &str,
    details: &str,
) -> Result<OutreachEvent> {
    let mut tx = pool.begin().await?;
    let event = insert_event_tx(&mut tx, business_id, event_type, details, Utc::now()).await?;
    tx.commit().await?;
    Ok(event)
}

async fn insert_event_tx(
    tx: &mut Transaction<'_, Sqlite>,
    business_id: i64,
    event_type: &str,
    details: &str,
    now: DateTime<Utc>,
) -> Result<OutreachEvent> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM businesses WHERE id = ?")
        .bind(business_id)
        .fetch_optional(&mut **tx)
        .await?;
    if exists.is_none() {
        return Err(CrmError::NotFound(business_id));
    }
    let rec = sqlx::query(
        "INSERT INTO outreach_events (business_id, event_type, details, created_at) \
         VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(business_id)
    .bind(event_type)
    .bind(details)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;
    sqlx::query("UPDATE businesses SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(business_id)
        .execute(&mut **tx)
        .await?;
    Ok(OutreachEvent {
        id: rec.get("id"),
        business_id,
        event_type: event_type.to_string(),
        details: details.to_string(),
        created_at: now,
    })
}

/// Record a sent outreach email: append an `email_sent` event and advance
/// the funnel from prospect to contacted. A business anywhere past prospect
/// keeps its status. Returns the event and the status after the call.
#[instrument(skip_all)]
pub async fn record_email_sent(
    pool: &Pool,
    business_id: i64,
    details: &str,
) -> Result<(OutreachEvent, FunnelStatus)> {
    let mut tx = pool.begin().await?;
    let status: Option<String> =
        sqlx::query_scalar("SELECT status FROM businesses WHERE id = ?")
            .bind(business_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(status) = status else {
        return Err(CrmError::NotFound(business_id));
    };
    let event = insert_event_tx(&mut tx, business_id, "email_sent", details, Utc::now()).await?;
    let final_status = if status == FunnelStatus::Prospect.as_str() {
        sqlx::query("UPDATE businesses SET status = ? WHERE id = ?")
            .bind(FunnelStatus::Contacted.as_str())
            .bind(business_id)
            .execute(&mut *tx)
            .await?;
        FunnelStatus::Contacted
    } else {
        FunnelStatus::parse(&status).ok_or_else(|| {
            CrmError::Db(sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: format!("unrecognized status value '{status}'").into(),
            })
        })?
    };
    tx.commit().await?;
    Ok((event, final_status))
}

// --- Aggregation queries used by the metrics snapshot ---

#[instrument(skip_all)]
pub async fn count_businesses(pool: &Pool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM businesses")
        .fetch_one(pool)
        .await?)
}

#[instrument(skip_all)]
pub async fn count_events(pool: &Pool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM outreach_events")
        .fetch_one(pool)
        .await?)
}

#[instrument(skip_all)]
pub async fn status_counts(pool: &Pool) -> Result<Vec<(String, i64)>> {
    Ok(
        sqlx::query_as("SELECT status, COUNT(*) FROM businesses GROUP BY status")
            .fetch_all(pool)
            .await?,
    )
}

#[instrument(skip_all)]
pub async fn priority_counts(pool: &Pool) -> Result<Vec<(String, i64)>> {
    Ok(
        sqlx::query_as("SELECT priority, COUNT(*) FROM businesses GROUP BY priority")
            .fetch_all(pool)
            .await?,
    )
}

/// Category counts, grouped case-sensitively on the stored value.
#[instrument(skip_all)]
pub async fn category_counts(pool: &Pool) -> Result<Vec<(String, i64)>> {
    Ok(
        sqlx::query_as("SELECT category, COUNT(*) FROM businesses GROUP BY category")
            .fetch_all(pool)
            .await?,
    )
}

/// Creation times of events at or after `since`, for activity bucketing.
#[instrument(skip_all)]
pub async fn event_times_since(
    pool: &Pool,
    since: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>> {
    let rows: Vec<(DateTime<Utc>,)> = sqlx::query_as(
        "SELECT created_at FROM outreach_events WHERE created_at >= ?",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(t,)| t).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;

    async fn setup_pool() -> Pool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[test]
    fn sqlite_url_normalization() {
        assert_eq!(prepare_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            prepare_sqlite_url("postgres://host/db"),
            "postgres://host/db"
        );
        let dir = std::env::temp_dir().join("outreach-crm-url-test");
        let url = format!("sqlite://{}/crm.db?mode=rwc", dir.display());
        assert_eq!(prepare_sqlite_url(&url), url);
        assert!(dir.exists());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn slug_resolution_prefers_explicit() {
        assert_eq!(resolve_slug(Some("my-slug"), "Other Name"), "my-slug");
        assert_eq!(resolve_slug(Some(""), "Joe's Diner"), "joes-diner");
        assert_eq!(resolve_slug(None, "Joe's Diner"), "joes-diner");
    }

    #[tokio::test]
    async fn create_fetch_and_conflict() {
        let pool = setup_pool().await;
        let biz = create_business(&pool, &NewBusiness::named("Joe's Diner"))
            .await
            .unwrap();
        assert_eq!(biz.slug, "joes-diner");
        assert_eq!(biz.status, FunnelStatus::Prospect);
        assert_eq!(biz.priority, Priority::Cold);
        assert!(biz.updated_at >= biz.created_at);

        let err = create_business(&pool, &NewBusiness::named("Joe's Diner"))
            .await
            .unwrap_err();
        assert!(matches!(err, CrmError::Conflict(_)));

        let fetched = fetch_business(&pool, biz.id).await.unwrap();
        assert_eq!(fetched.name, "Joe's Diner");
        assert!(matches!(
            fetch_business(&pool, 9999).await.unwrap_err(),
            CrmError::NotFound(9999)
        ));
    }

    #[tokio::test]
    async fn partial_update_leaves_absent_fields() {
        let pool = setup_pool().await;
        let new = NewBusiness {
            category: "tech".into(),
            priority: Priority::Hot,
            notes: "Important notes".into(),
            ..NewBusiness::named("Acme")
        };
        let biz = create_business(&pool, &new).await.unwrap();

        let patch = BusinessPatch {
            status: Some(FunnelStatus::Contacted),
            ..Default::default()
        };
        let updated = update_business(&pool, biz.id, &patch).await.unwrap();
        assert_eq!(updated.status, FunnelStatus::Contacted);
        assert_eq!(updated.category, "tech");
        assert_eq!(updated.priority, Priority::Hot);
        assert_eq!(updated.notes, "Important notes");
        assert!(updated.updated_at > biz.updated_at);

        let err = update_business(&pool, 4242, &patch).await.unwrap_err();
        assert!(matches!(err, CrmError::NotFound(4242)));
    }

    #[tokio::test]
    async fn empty_patch_still_touches_updated_at() {
        let pool = setup_pool().await;
        let biz = create_business(&pool, &NewBusiness::named("Acme"))
            .await
            .unwrap();
        let updated = update_business(&pool, biz.id, &BusinessPatch::default())
            .await
            .unwrap();
        assert_eq!(updated.name, "Acme");
        assert!(updated.updated_at >= biz.updated_at);
    }

    #[tokio::test]
    async fn delete_cascades_to_events() {
        let pool = setup_pool().await;
        let biz = create_business(&pool, &NewBusiness::named("Acme"))
            .await
            .unwrap();
        insert_event(&pool, biz.id, "call", "left voicemail")
            .await
            .unwrap();

        let deleted = delete_business(&pool, biz.id).await.unwrap();
        assert_eq!(deleted, biz.id);
        assert!(matches!(
            fetch_business(&pool, biz.id).await.unwrap_err(),
            CrmError::NotFound(_)
        ));
        let orphans: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM outreach_events WHERE business_id = ?")
                .bind(biz.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(orphans, 0);

        assert!(matches!(
            delete_business(&pool, biz.id).await.unwrap_err(),
            CrmError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn events_are_returned_newest_first() {
        let pool = setup_pool().await;
        let biz = create_business(&pool, &NewBusiness::named("Acme"))
            .await
            .unwrap();
        insert_event(&pool, biz.id, "call", "first").await.unwrap();
        insert_event(&pool, biz.id, "email", "second").await.unwrap();
        insert_event(&pool, biz.id, "meeting", "third").await.unwrap();

        let detail = get_business_detail(&pool, biz.id).await.unwrap();
        assert_eq!(detail.events.len(), 3);
        assert_eq!(detail.events[0].details, "third");
        assert_eq!(detail.events[2].details, "first");
        // Child-event creation must advance the parent's updated_at.
        assert!(detail.business.updated_at > biz.updated_at);
    }

    #[tokio::test]
    async fn event_for_missing_business_is_not_found() {
        let pool = setup_pool().await;
        assert!(matches!(
            insert_event(&pool, 77, "call", "").await.unwrap_err(),
            CrmError::NotFound(77)
        ));
    }

    #[tokio::test]
    async fn list_filters_compose() {
        let pool = setup_pool().await;
        for (name, category, priority, notes) in [
            ("Alpha", "tech", Priority::Hot, "website redesign lead"),
            ("Beta", "Restaurant", Priority::Cold, ""),
            ("Gamma", "retail tech", Priority::Hot, "cold call only"),
        ] {
            let new = NewBusiness {
                category: category.into(),
                priority,
                notes: notes.into(),
                ..NewBusiness::named(name)
            };
            create_business(&pool, &new).await.unwrap();
        }

        let all = list_businesses(&pool, &ListFilters::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let hot = list_businesses(
            &pool,
            &ListFilters {
                priority: Some(Priority::Hot),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(hot.len(), 2);
        assert!(hot.iter().all(|b| b.priority == Priority::Hot));

        // Case-insensitive substring on category.
        let tech = list_businesses(
            &pool,
            &ListFilters {
                category: Some("TECH".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(tech.len(), 2);

        // Search hits name OR notes.
        let redesign = list_businesses(
            &pool,
            &ListFilters {
                search: Some("REDESIGN".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(redesign.len(), 1);
        assert_eq!(redesign[0].name, "Alpha");

        let gamma = list_businesses(
            &pool,
            &ListFilters {
                priority: Some(Priority::Hot),
                search: Some("gamma".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(gamma.len(), 1);
        assert_eq!(gamma[0].name, "Gamma");
    }

    #[tokio::test]
    async fn list_orders_by_updated_at_desc() {
        let pool = setup_pool().await;
        let first = create_business(&pool, &NewBusiness::named("First"))
            .await
            .unwrap();
        let _second = create_business(&pool, &NewBusiness::named("Second"))
            .await
            .unwrap();
        // Touching First moves it back to the front, even when both records
        // were written within the same wall-clock second.
        update_business(&pool, first.id, &BusinessPatch::default())
            .await
            .unwrap();
        let all = list_businesses(&pool, &ListFilters::default()).await.unwrap();
        assert_eq!(all[0].name, "First");
        assert_eq!(all[1].name, "Second");
        assert!(all[0].updated_at > all[1].updated_at);
    }

    #[tokio::test]
    async fn event_window_respects_sub_second_bounds() {
        let pool = setup_pool().await;
        let biz = create_business(&pool, &NewBusiness::named("Acme"))
            .await
            .unwrap();
        insert_event(&pool, biz.id, "call", "").await.unwrap();

        let within = event_times_since(&pool, Utc::now() - chrono::Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(within.len(), 1);

        let after = event_times_since(&pool, Utc::now()).await.unwrap();
        assert!(after.is_empty());
    }

    #[tokio::test]
    async fn record_email_sent_advances_only_from_prospect() {
        let pool = setup_pool().await;
        let biz = create_business(&pool, &NewBusiness::named("Acme"))
            .await
            .unwrap();
        let (event, status) = record_email_sent(&pool, biz.id, "sent to a@b.com")
            .await
            .unwrap();
        assert_eq!(event.event_type, "email_sent");
        assert_eq!(status, FunnelStatus::Contacted);

        let patch = BusinessPatch {
            status: Some(FunnelStatus::Responded),
            ..Default::default()
        };
        update_business(&pool, biz.id, &patch).await.unwrap();
        let (_, status) = record_email_sent(&pool, biz.id, "sent again")
            .await
            .unwrap();
        assert_eq!(status, FunnelStatus::Responded);

        assert!(matches!(
            record_email_sent(&pool, 500, "x").await.unwrap_err(),
            CrmError::NotFound(500)
        ));
    }
}
