//! Email delivery log repository.

use domain::models::EmailLog;
use shared::pagination::{Page, PageRequest};
use sqlx::PgPool;

use crate::entities::EmailLogEntity;
use crate::metrics::QueryTimer;
use crate::query::{list_page, Column, ColumnType, EntityDescriptor, FilterDecl, FilterValues};

pub static EMAIL_LOG_DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    table: "email_logs",
    id_column: "id",
    columns: &[
        Column::new("id", ColumnType::BigInt),
        Column::new("user_id", ColumnType::BigInt),
        Column::new("tpl_id", ColumnType::BigInt),
        Column::text("from_email"),
        Column::text("to_email"),
        Column::text("subject"),
        Column::new("status", ColumnType::SmallInt),
        Column::text("logs"),
        Column::new("created_at", ColumnType::Timestamp),
    ],
};

pub const EMAIL_LOG_FILTERS: &[FilterDecl] = &[
    FilterDecl::exact("user_id", "user_id"),
    FilterDecl::exact("tpl_id", "tpl_id"),
    FilterDecl::exact("to", "to_email"),
    FilterDecl::contains("subject", "subject"),
    FilterDecl::exact("status", "status"),
    FilterDecl::range("created_at", "created_at"),
];

/// One delivery attempt to record.
#[derive(Debug, Clone)]
pub struct NewEmailLog {
    pub user_id: i64,
    pub tpl_id: i64,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub contents: String,
    pub status: i16,
    pub logs: String,
}

#[derive(Clone)]
pub struct EmailLogRepository {
    pool: PgPool,
}

impl EmailLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists delivery attempts, newest first.
    pub async fn list(
        &self,
        filters: &FilterValues,
        request: PageRequest,
    ) -> Result<Page<EmailLog>, sqlx::Error> {
        let page = list_page::<EmailLogEntity, _>(
            &self.pool,
            &EMAIL_LOG_DESCRIPTOR,
            EMAIL_LOG_FILTERS,
            filters,
            request,
        )
        .await?;
        Ok(page.map(entity_to_domain))
    }

    /// Rendered body of one attempt.
    pub async fn find_contents(&self, id: i64) -> Result<Option<String>, sqlx::Error> {
        let timer = QueryTimer::new("email_logs.find_contents");
        let result = sqlx::query_scalar::<_, String>("SELECT contents FROM email_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn insert(&self, log: &NewEmailLog) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("email_logs.insert");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO email_logs (
                user_id, tpl_id, from_email, to_email, subject, contents, status, logs
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(log.user_id)
        .bind(log.tpl_id)
        .bind(&log.from)
        .bind(&log.to)
        .bind(&log.subject)
        .bind(&log.contents)
        .bind(log.status)
        .bind(&log.logs)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

fn entity_to_domain(entity: EmailLogEntity) -> EmailLog {
    EmailLog {
        id: entity.id,
        user_id: entity.user_id,
        tpl_id: entity.tpl_id,
        from: entity.from_email,
        to: entity.to_email,
        subject: entity.subject,
        status: entity.status,
        logs: entity.logs,
        created_at: entity.created_at,
    }
}
