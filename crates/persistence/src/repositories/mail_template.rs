//! Mail template repository.

use domain::models::MailTemplate;
use sqlx::PgPool;

use crate::entities::MailTemplateEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct MailTemplateRepository {
    pool: PgPool,
}

impl MailTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<MailTemplate>, sqlx::Error> {
        let timer = QueryTimer::new("mail_templates.find_by_id");
        let result = sqlx::query_as::<_, MailTemplateEntity>(
            "SELECT id, name, subject, contents FROM mail_templates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.map(|entity| MailTemplate {
            id: entity.id,
            name: entity.name,
            subject: entity.subject,
            contents: entity.contents,
        }))
    }
}
