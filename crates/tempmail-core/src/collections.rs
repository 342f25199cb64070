/// Statement pairs for each browsable collection
///
/// Each function picks the precomposed variant that matches the filters
/// present. Empty strings count as absent.
use crate::list_query::{ListQuery, like_pattern};

const ADDRESS_PROJECTION: &str = "SELECT a.*, \
     (SELECT COUNT(*) FROM raw_mails WHERE address = a.name) AS mail_count, \
     (SELECT COUNT(*) FROM sendbox WHERE address = a.name) AS send_count \
     FROM address a";

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Addresses with their mail and send counts, optionally filtered by a name substring
pub fn addresses(query: Option<&str>) -> ListQuery {
    match present(query) {
        Some(query) => ListQuery::new(
            format!("{} where name like ?", ADDRESS_PROJECTION),
            "SELECT count(*) as count FROM address where name like ?",
        )
        .bind(like_pattern(query)),
        None => ListQuery::new(ADDRESS_PROJECTION, "SELECT count(*) as count FROM address"),
    }
}

/// Inbound mail, optionally filtered by address and/or a substring of the raw content
pub fn mails(address: Option<&str>, keyword: Option<&str>) -> ListQuery {
    match (present(address), present(keyword)) {
        (Some(address), Some(keyword)) => ListQuery::new(
            "SELECT * FROM raw_mails where address = ? and raw like ? ",
            "SELECT count(*) as count FROM raw_mails where address = ? and raw like ? ",
        )
        .bind(address)
        .bind(like_pattern(keyword)),
        (None, Some(keyword)) => ListQuery::new(
            "SELECT * FROM raw_mails where raw like ? ",
            "SELECT count(*) as count FROM raw_mails where raw like ? ",
        )
        .bind(like_pattern(keyword)),
        (Some(address), None) => ListQuery::new(
            "SELECT * FROM raw_mails where address = ? ",
            "SELECT count(*) as count FROM raw_mails where address = ? ",
        )
        .bind(address),
        (None, None) => ListQuery::new(
            "SELECT * FROM raw_mails ",
            "SELECT count(*) as count FROM raw_mails ",
        ),
    }
}

/// Mail whose address has no matching address row
pub fn unknown_mails() -> ListQuery {
    ListQuery::new(
        "SELECT * FROM raw_mails where address NOT IN (select name from address) ",
        "SELECT count(*) as count FROM raw_mails where address NOT IN (select name from address) ",
    )
}

pub fn address_senders(address: Option<&str>) -> ListQuery {
    match present(address) {
        Some(address) => ListQuery::new(
            "SELECT * FROM address_sender where address = ? ",
            "SELECT count(*) as count FROM address_sender where address = ? ",
        )
        .bind(address),
        None => ListQuery::new(
            "SELECT * FROM address_sender ",
            "SELECT count(*) as count FROM address_sender ",
        ),
    }
}

pub fn sendbox(address: Option<&str>) -> ListQuery {
    match present(address) {
        Some(address) => ListQuery::new(
            "SELECT * FROM sendbox where address = ? ",
            "SELECT count(*) as count FROM sendbox where address = ? ",
        )
        .bind(address),
        None => ListQuery::new(
            "SELECT * FROM sendbox ",
            "SELECT count(*) as count FROM sendbox ",
        ),
    }
}
