//! CSV export of the business table.

use crate::db::{self, Pool};
use crate::error::Result;
use crate::model::Business;
use tracing::instrument;

const HEADER: [&str; 16] = [
    "Name",
    "Slug",
    "Category",
    "Demo URL",
    "Existing Website",
    "Website Quality",
    "Priority",
    "Status",
    "Contact Name",
    "Contact Email",
    "Contact Phone",
    "Contact Role",
    "Demo Value Prop",
    "Notes",
    "Created",
    "Updated",
];

/// Render every business as CSV, ordered by name ascending. The first row
/// is always the header, so an empty store exports exactly one row.
#[instrument(skip_all)]
pub async fn export_csv(pool: &Pool) -> Result<String> {
    let businesses = db::list_businesses_by_name(pool).await?;
    let mut out = String::new();
    write_row(&mut out, HEADER.iter().copied());
    for biz in &businesses {
        write_row(&mut out, business_fields(biz).iter().map(String::as_str));
    }
    Ok(out)
}

fn business_fields(biz: &Business) -> [String; 16] {
    [
        biz.name.clone(),
        biz.slug.clone(),
        biz.category.clone(),
        biz.demo_url.clone(),
        biz.existing_website.clone(),
        biz.website_quality.to_string(),
        biz.priority.as_str().to_string(),
        biz.status.as_str().to_string(),
        biz.contact_name.clone(),
        biz.contact_email.clone(),
        biz.contact_phone.clone(),
        biz.contact_role.clone(),
        biz.demo_value_prop.clone(),
        biz.notes.clone(),
        biz.created_at.to_rfc3339(),
        biz.updated_at.to_rfc3339(),
    ]
}

fn write_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&escape_field(field));
    }
    out.push_str("\r\n");
}

/// Standard minimal CSV quoting: quote a field containing a comma, quote,
/// CR or LF; double any embedded quotes.
fn escape_field(field: &str) -> String {
    if field.contains(&['"', ',', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(escape_field("Acme"), "Acme");
        assert_eq!(escape_field(""), "");
    }

    #[test]
    fn special_fields_are_quoted() {
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn rows_are_crlf_terminated() {
        let mut out = String::new();
        write_row(&mut out, ["a", "b,c", "d"].into_iter());
        assert_eq!(out, "a,\"b,c\",d\r\n");
    }
}
