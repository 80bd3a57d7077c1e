//! The closed set of storage backends behind one type

use crate::{
    AuditEvent, AuditLog, BackendKind, EpochSecs, FileAuditLog, Result, SqliteAuditLog,
    StoreConfig, TenantId,
};

/// An opened audit store of either backend
pub enum AuditStore {
    File(FileAuditLog),
    Sqlite(SqliteAuditLog),
}

impl AuditStore {
    /// Open the backend described by `config`
    pub fn open(config: StoreConfig) -> Result<Self> {
        match config {
            StoreConfig::File(cfg) => Ok(AuditStore::File(FileAuditLog::open(cfg)?)),
            StoreConfig::Relational(cfg) => Ok(AuditStore::Sqlite(SqliteAuditLog::open(cfg)?)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            AuditStore::File(_) => BackendKind::File,
            AuditStore::Sqlite(_) => BackendKind::Relational,
        }
    }

    /// Flush (file) or release the connection (relational)
    pub fn close(&self) -> Result<()> {
        match self {
            AuditStore::File(log) => log.sync(),
            AuditStore::Sqlite(log) => log.close(),
        }
    }

    fn backend(&self) -> &dyn AuditLog {
        match self {
            AuditStore::File(log) => log,
            AuditStore::Sqlite(log) => log,
        }
    }
}

impl AuditLog for AuditStore {
    fn backend_name(&self) -> &'static str {
        self.backend().backend_name()
    }

    fn append(&self, event: &AuditEvent) -> Result<()> {
        self.backend().append(event)
    }

    fn query(&self, tenant_id: TenantId, start: EpochSecs, end: EpochSecs) -> Result<Vec<AuditEvent>> {
        self.backend().query(tenant_id, start, end)
    }
}
