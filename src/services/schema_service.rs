use crate::repositories::{RepositoryError, SchemaRepository};
use crate::schema::{self, PolicyDef, SchemaStatement, POLICIES, TABLES};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum SchemaServiceError {
    #[error("Statement '{name}' failed after {applied} statement(s) succeeded: {source}")]
    StatementFailed {
        name: String,
        applied: usize,
        #[source]
        source: RepositoryError,
    },
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

/// What the bootstrap objects look like in the store right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaStatus {
    pub tables: Vec<String>,
    pub rls_enabled: Vec<String>,
    pub policies: Vec<(String, String)>,
    pub trigger_count: i64,
}

impl SchemaStatus {
    pub fn missing_tables(&self) -> Vec<&'static str> {
        TABLES
            .iter()
            .copied()
            .filter(|table| !self.tables.iter().any(|t| t == table))
            .collect()
    }

    pub fn tables_without_rls(&self) -> Vec<&'static str> {
        TABLES
            .iter()
            .copied()
            .filter(|table| !self.rls_enabled.iter().any(|t| t == table))
            .collect()
    }

    pub fn missing_policies(&self) -> Vec<&'static PolicyDef> {
        POLICIES
            .iter()
            .filter(|policy| {
                !self
                    .policies
                    .iter()
                    .any(|(table, name)| table == policy.table && name == policy.name)
            })
            .collect()
    }

    /// True when every table, RLS switch and policy exists and exactly one
    /// profile trigger is registered.
    pub fn is_complete(&self) -> bool {
        self.missing_tables().is_empty()
            && self.tables_without_rls().is_empty()
            && self.missing_policies().is_empty()
            && self.trigger_count == 1
    }
}

pub struct SchemaService {
    repository: Arc<dyn SchemaRepository>,
}

impl SchemaService {
    pub fn new(repository: Arc<dyn SchemaRepository>) -> Self {
        Self { repository }
    }

    /// Executes `statements` in order and stops at the first failure.
    /// Returns the number of statements applied.
    pub async fn apply(&self, statements: &[SchemaStatement]) -> Result<usize, SchemaServiceError> {
        for (applied, statement) in statements.iter().enumerate() {
            if let Err(source) = self.repository.execute(statement).await {
                error!("Schema statement '{}' failed: {}", statement.name, source);
                return Err(SchemaServiceError::StatementFailed {
                    name: statement.name.clone(),
                    applied,
                    source,
                });
            }
            info!("Applied: {}", statement.name);
        }

        Ok(statements.len())
    }

    pub async fn apply_bootstrap(&self) -> Result<usize, SchemaServiceError> {
        self.apply(&schema::bootstrap_statements()).await
    }

    pub async fn apply_auth_shim(&self) -> Result<usize, SchemaServiceError> {
        self.apply(&schema::auth_shim_statements()).await
    }

    pub async fn status(&self) -> Result<SchemaStatus, SchemaServiceError> {
        Ok(SchemaStatus {
            tables: self.repository.existing_tables().await?,
            rls_enabled: self.repository.rls_enabled_tables().await?,
            policies: self.repository.existing_policies().await?,
            trigger_count: self.repository.trigger_count().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::schema_repository::MockSchemaRepository;
    use mockall::Sequence;

    fn statements(names: &[&str]) -> Vec<SchemaStatement> {
        names
            .iter()
            .map(|name| SchemaStatement {
                name: name.to_string(),
                sql: format!("SELECT '{}'", name),
            })
            .collect()
    }

    #[tokio::test]
    async fn applies_statements_in_order() {
        let mut repo = MockSchemaRepository::new();
        let mut seq = Sequence::new();
        for name in ["first", "second", "third"] {
            repo.expect_execute()
                .withf(move |s| s.name == name)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }

        let service = SchemaService::new(Arc::new(repo));
        let applied = service
            .apply(&statements(&["first", "second", "third"]))
            .await
            .unwrap();
        assert_eq!(applied, 3);
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let mut repo = MockSchemaRepository::new();
        repo.expect_execute()
            .withf(|s| s.name == "first")
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_execute()
            .withf(|s| s.name == "second")
            .times(1)
            .returning(|_| Err(RepositoryError::ConstraintViolation("boom".into())));
        repo.expect_execute().withf(|s| s.name == "third").never();

        let service = SchemaService::new(Arc::new(repo));
        let err = service
            .apply(&statements(&["first", "second", "third"]))
            .await
            .unwrap_err();

        match err {
            SchemaServiceError::StatementFailed { name, applied, .. } => {
                assert_eq!(name, "second");
                assert_eq!(applied, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bootstrap_runs_every_embedded_statement() {
        let expected = schema::bootstrap_statements().len();
        let mut repo = MockSchemaRepository::new();
        repo.expect_execute().times(expected).returning(|_| Ok(()));

        let service = SchemaService::new(Arc::new(repo));
        assert_eq!(service.apply_bootstrap().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn status_reports_missing_pieces() {
        let mut repo = MockSchemaRepository::new();
        repo.expect_existing_tables()
            .returning(|| Ok(vec!["items".to_string(), "profiles".to_string()]));
        repo.expect_rls_enabled_tables()
            .returning(|| Ok(vec!["items".to_string()]));
        repo.expect_existing_policies().returning(|| {
            Ok(vec![(
                "items".to_string(),
                "Items are viewable by everyone".to_string(),
            )])
        });
        repo.expect_trigger_count().returning(|| Ok(0));

        let service = SchemaService::new(Arc::new(repo));
        let status = service.status().await.unwrap();

        assert_eq!(status.missing_tables(), vec!["pawn_requests"]);
        assert_eq!(status.tables_without_rls(), vec!["profiles", "pawn_requests"]);
        assert_eq!(status.missing_policies().len(), POLICIES.len() - 1);
        assert!(!status.is_complete());
    }

    #[test]
    fn complete_status_needs_exactly_one_trigger() {
        let mut status = SchemaStatus {
            tables: TABLES.iter().map(|t| t.to_string()).collect(),
            rls_enabled: TABLES.iter().map(|t| t.to_string()).collect(),
            policies: POLICIES
                .iter()
                .map(|p| (p.table.to_string(), p.name.to_string()))
                .collect(),
            trigger_count: 1,
        };
        assert!(status.is_complete());

        status.trigger_count = 2;
        assert!(!status.is_complete());
    }
}
