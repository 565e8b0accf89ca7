//! Connection audit and file transfer listings.

use domain::models::{ConnectionAudit, FileTransfer};
use shared::pagination::{Page, PageRequest};
use sqlx::PgPool;

use crate::entities::{AuditEntity, FileTransferEntity};
use crate::query::{list_page, Column, ColumnType, EntityDescriptor, FilterDecl, FilterValues};

pub static AUDIT_DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    table: "audits",
    id_column: "id",
    columns: &[
        Column::new("id", ColumnType::BigInt),
        Column::new("conn_id", ColumnType::BigInt),
        Column::text("rustdesk_id"),
        Column::text("ip"),
        Column::text("session_id"),
        Column::text("uuid"),
        Column::new("type", ColumnType::Integer),
        Column::new("created_at", ColumnType::Timestamp),
        Column::new("closed_at", ColumnType::Timestamp),
    ],
};

pub const AUDIT_FILTERS: &[FilterDecl] = &[
    FilterDecl::exact("conn_id", "conn_id"),
    FilterDecl::exact("type", "type"),
    FilterDecl::exact("rustdesk_id", "rustdesk_id"),
    FilterDecl::exact("ip", "ip"),
    FilterDecl::exact("session_id", "session_id"),
    FilterDecl::exact("uuid", "uuid"),
    FilterDecl::range("created_at", "created_at"),
    FilterDecl::range("closed_at", "closed_at"),
];

pub static FILE_TRANSFER_DESCRIPTOR: EntityDescriptor = EntityDescriptor {
    table: "file_transfers",
    id_column: "id",
    columns: &[
        Column::new("id", ColumnType::BigInt),
        Column::text("rustdesk_id"),
        Column::text("peer_id"),
        Column::text("path"),
        Column::text("uuid"),
        Column::new("type", ColumnType::Integer),
        Column::new("created_at", ColumnType::Timestamp),
    ],
};

pub const FILE_TRANSFER_FILTERS: &[FilterDecl] = &[
    FilterDecl::exact("type", "type"),
    FilterDecl::exact("rustdesk_id", "rustdesk_id"),
    FilterDecl::exact("peer_id", "peer_id"),
    FilterDecl::exact("uuid", "uuid"),
    FilterDecl::range("created_at", "created_at"),
];

/// Repository for relay audit records.
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists connection audits, newest first.
    pub async fn list(
        &self,
        filters: &FilterValues,
        request: PageRequest,
    ) -> Result<Page<ConnectionAudit>, sqlx::Error> {
        let page = list_page::<AuditEntity, _>(
            &self.pool,
            &AUDIT_DESCRIPTOR,
            AUDIT_FILTERS,
            filters,
            request,
        )
        .await?;
        Ok(page.map(audit_to_domain))
    }

    /// Lists file transfers, newest first.
    pub async fn list_file_transfers(
        &self,
        filters: &FilterValues,
        request: PageRequest,
    ) -> Result<Page<FileTransfer>, sqlx::Error> {
        let page = list_page::<FileTransferEntity, _>(
            &self.pool,
            &FILE_TRANSFER_DESCRIPTOR,
            FILE_TRANSFER_FILTERS,
            filters,
            request,
        )
        .await?;
        Ok(page.map(file_transfer_to_domain))
    }
}

fn audit_to_domain(entity: AuditEntity) -> ConnectionAudit {
    ConnectionAudit {
        id: entity.id,
        conn_id: entity.conn_id,
        rustdesk_id: entity.rustdesk_id,
        ip: entity.ip,
        session_id: entity.session_id,
        uuid: entity.uuid,
        audit_type: entity.audit_type,
        created_at: entity.created_at,
    }
}

fn file_transfer_to_domain(entity: FileTransferEntity) -> FileTransfer {
    FileTransfer {
        id: entity.id,
        rustdesk_id: entity.rustdesk_id,
        peer_id: entity.peer_id,
        path: entity.path,
        uuid: entity.uuid,
        transfer_type: entity.transfer_type,
        created_at: entity.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::build_predicates;
    use chrono::Utc;

    #[test]
    fn test_every_filter_resolves_to_a_column() {
        for (descriptor, decls) in [
            (&AUDIT_DESCRIPTOR, AUDIT_FILTERS),
            (&FILE_TRANSFER_DESCRIPTOR, FILE_TRANSFER_FILTERS),
        ] {
            for decl in decls {
                assert!(
                    descriptor.column(decl.column).is_some(),
                    "{}.{} missing",
                    descriptor.table,
                    decl.column
                );
            }
        }
    }

    #[test]
    fn test_file_transfer_uuid_filter_is_unqualified() {
        let values: FilterValues = [
            ("uuid", "abc"),
            ("created_at[0]", "2024-01-01 00:00:00"),
            ("created_at[1]", "2024-01-02 00:00:00"),
        ]
        .into_iter()
        .collect();
        let predicates = build_predicates(&FILE_TRANSFER_DESCRIPTOR, FILE_TRANSFER_FILTERS, &values);
        let columns: Vec<_> = predicates.iter().map(|p| p.column().name).collect();
        assert_eq!(columns, vec!["uuid", "created_at"]);
    }

    #[test]
    fn test_closed_at_range() {
        let values: FilterValues = [
            ("closed_at[0]", "2024-01-01 00:00:00"),
            ("closed_at[1]", "2024-01-02 00:00:00"),
        ]
        .into_iter()
        .collect();
        let predicates = build_predicates(&AUDIT_DESCRIPTOR, AUDIT_FILTERS, &values);
        assert_eq!(predicates.len(), 1);
        assert_eq!(predicates[0].column().name, "closed_at");
    }

    #[test]
    fn test_audit_projection_drops_closed_at() {
        let entity = AuditEntity {
            id: 3,
            conn_id: 77,
            rustdesk_id: "123456789".into(),
            ip: "192.0.2.1".into(),
            session_id: "s".into(),
            uuid: "u".into(),
            audit_type: 0,
            created_at: Utc::now(),
            closed_at: Some(Utc::now()),
        };
        let audit = audit_to_domain(entity);
        assert_eq!(audit.conn_id, 77);
        assert_eq!(audit.rustdesk_id, "123456789");
    }
}
