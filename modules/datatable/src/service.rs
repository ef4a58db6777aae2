use serde_json::Value;
use tablekit_db::{DbHandle, SqlQueryAssembler};
use tracing::{debug, instrument};

use crate::config::DataTableConfig;
use crate::error::{ConfigError, ServiceError};
use crate::protocol::ProtocolKind;
use crate::registry::{TableEntry, TableRegistry};
use crate::request::Params;
use crate::translator::ResultTranslator;

/// Serves requests for the registered tables against one database.
#[derive(Clone, Debug)]
pub struct DataTableService {
    registry: TableRegistry,
    db: DbHandle,
    legacy_sort_field: String,
}

impl DataTableService {
    pub fn new(registry: TableRegistry, db: DbHandle, config: &DataTableConfig) -> Self {
        Self {
            registry,
            db,
            legacy_sort_field: config.legacy_sort_field.clone(),
        }
    }

    pub fn from_config(config: &DataTableConfig, db: DbHandle) -> Result<Self, ConfigError> {
        let registry = TableRegistry::from_config(config)?;
        Ok(Self::new(registry, db, config))
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    fn entry(&self, id: &str) -> Result<&TableEntry, ServiceError> {
        self.registry
            .get(id)
            .ok_or_else(|| ServiceError::unknown_table(id))
    }

    /// Answer one request with the envelope of `protocol`.
    #[instrument(
        name = "datatable.service.query",
        skip(self, params),
        fields(params = params.len())
    )]
    pub async fn query(
        &self,
        table_id: &str,
        protocol: ProtocolKind,
        params: &Params,
    ) -> Result<Value, ServiceError> {
        let entry = self.entry(table_id)?;
        let adapter = protocol.adapter(&self.legacy_sort_field);

        let mut assembler = SqlQueryAssembler::new(self.db.sea(), entry.source.to_select());
        let envelope = ResultTranslator::new(&entry.table, adapter.as_ref())
            .process(params, &mut assembler)
            .await?;

        debug!("request served");
        Ok(envelope)
    }

    /// Grid settings for the client.
    pub fn client_config(&self, table_id: &str) -> Result<Value, ServiceError> {
        Ok(self.entry(table_id)?.table.to_client_json())
    }

    /// Column header export in the vocabulary of `protocol`.
    pub fn column_metadata(
        &self,
        table_id: &str,
        protocol: ProtocolKind,
    ) -> Result<Value, ServiceError> {
        let entry = self.entry(table_id)?;
        let adapter = protocol.adapter(&self.legacy_sort_field);
        Ok(adapter.column_metadata(entry.table.get_columns()))
    }
}
