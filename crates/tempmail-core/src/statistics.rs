/// Aggregate counts over the record collections
///
/// The four counts are independent reads issued concurrently. A failed read
/// leaves its field empty and names it in `errors`; the others still report.
use serde::Serialize;
use tracing::warn;

use crate::constants::ACTIVE_USER_WINDOW_DAYS;
use crate::error::Result;
use crate::store::{self, Database, Statement};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub mail_count: Option<i64>,
    pub user_count: Option<i64>,
    #[serde(rename = "activeUserCount7days")]
    pub active_user_count_7days: Option<i64>,
    pub send_mail_count: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

fn settle(field: &str, result: Result<i64>, errors: &mut Vec<String>) -> Option<i64> {
    match result {
        Ok(count) => Some(count),
        Err(e) => {
            warn!(field, error = %e, "Statistics query failed");
            errors.push(field.to_string());
            None
        }
    }
}

pub async fn collect(db: &dyn Database) -> Statistics {
    let mails = Statement::new("SELECT count(*) as count FROM raw_mails");
    let addresses = Statement::new("SELECT count(*) as count FROM address");
    let active = Statement::new(
        "SELECT count(*) as count FROM address where updated_at > datetime('now', ?)",
    )
    .bind(format!("-{} day", ACTIVE_USER_WINDOW_DAYS));
    let sent = Statement::new("SELECT count(*) as count FROM sendbox");

    let (mail_count, user_count, active_count, send_count) = futures::join!(
        store::count(db, &mails),
        store::count(db, &addresses),
        store::count(db, &active),
        store::count(db, &sent),
    );

    let mut errors = Vec::new();
    Statistics {
        mail_count: settle("mailCount", mail_count, &mut errors),
        user_count: settle("userCount", user_count, &mut errors),
        active_user_count_7days: settle("activeUserCount7days", active_count, &mut errors),
        send_mail_count: settle("sendMailCount", send_count, &mut errors),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdminError;
    use crate::store::{MockDatabase, SqliteDatabase};
    use serde_json::json;

    #[tokio::test]
    async fn test_counts_each_collection() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        for sql in [
            "INSERT INTO address (name) VALUES ('a@example.com')",
            "INSERT INTO address (name, updated_at) VALUES ('old@example.com', datetime('now', '-30 day'))",
            "INSERT INTO raw_mails (address, raw) VALUES ('a@example.com', 'x')",
            "INSERT INTO sendbox (address, raw) VALUES ('a@example.com', 'y')",
        ] {
            db.run(&Statement::new(sql)).await.unwrap();
        }

        let stats = collect(&db).await;
        assert_eq!(
            stats,
            Statistics {
                mail_count: Some(1),
                user_count: Some(2),
                active_user_count_7days: Some(1),
                send_mail_count: Some(1),
                errors: vec![],
            }
        );
    }

    #[tokio::test]
    async fn test_partial_failure_reports_other_fields() {
        let mut db = MockDatabase::new();
        db.expect_first().returning(|stmt| {
            if stmt.sql.contains("sendbox") {
                Err(AdminError::Storage("no such table: sendbox".to_string()))
            } else {
                Ok(json!({"count": 5}).as_object().cloned())
            }
        });

        let stats = collect(&db).await;
        assert_eq!(stats.mail_count, Some(5));
        assert_eq!(stats.user_count, Some(5));
        assert_eq!(stats.send_mail_count, None);
        assert_eq!(stats.errors, vec!["sendMailCount".to_string()]);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(Statistics {
            mail_count: Some(1),
            user_count: Some(2),
            active_user_count_7days: Some(3),
            send_mail_count: None,
            errors: vec![],
        })
        .unwrap();

        assert_eq!(
            value,
            json!({
                "mailCount": 1,
                "userCount": 2,
                "activeUserCount7days": 3,
                "sendMailCount": null
            })
        );
    }
}
