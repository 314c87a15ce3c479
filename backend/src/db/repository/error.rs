//! Error types for repository operations.
//!
//! Every error carries an [`ErrorContext`] naming the operation and entity
//! involved, which is what ends up in logs and API error details.

use std::fmt;

use crate::models::ShiftValidationError;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Structured context for repository errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "store_shift", "join_shift")
    pub operation: Option<String>,
    /// The entity type involved (e.g., "shift", "shift_helper", "task")
    pub entity: Option<String>,
    /// The entity ID if applicable
    pub entity_id: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
    /// Whether this error is retryable
    pub retryable: bool,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Mark this error as retryable.
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref id) = self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Connection pool or database connection errors.
    /// These are typically transient and may be retried.
    #[error("Connection error: {message} {context}")]
    ConnectionError {
        message: String,
        context: ErrorContext,
    },

    /// SQL query execution errors.
    #[error("Query error: {message} {context}")]
    QueryError {
        message: String,
        context: ErrorContext,
    },

    /// Requested entity, or an entity it references, was not found.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// A uniqueness constraint rejected the write, e.g. a volunteer joining
    /// the same shift twice.
    #[error("Unique violation: {message} {context}")]
    UniqueViolation {
        message: String,
        context: ErrorContext,
    },

    /// Record fields violate a model invariant.
    #[error("Data validation error: {message} {context}")]
    ValidationError {
        message: String,
        context: ErrorContext,
    },

    /// Configuration or initialization error.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// Internal/unexpected errors.
    #[error("Internal error: {message} {context}")]
    InternalError {
        message: String,
        context: ErrorContext,
    },

    /// Transaction error (commit/rollback failed).
    #[error("Transaction error: {message} {context}")]
    TransactionError {
        message: String,
        context: ErrorContext,
    },
}

impl RepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    pub fn connection_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: context.retryable(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn query_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::QueryError {
            message: message.into(),
            context,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    /// Shorthand for a missing `entity` with the given id.
    pub fn missing(operation: &str, entity: &str, id: impl ToString) -> Self {
        let id = id.to_string();
        Self::not_found_with_context(
            format!("{} {} not found", entity, id),
            ErrorContext::new(operation)
                .with_entity(entity)
                .with_entity_id(id),
        )
    }

    pub fn unique_violation(message: impl Into<String>) -> Self {
        Self::UniqueViolation {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn unique_violation_with_context(
        message: impl Into<String>,
        context: ErrorContext,
    ) -> Self {
        Self::UniqueViolation {
            message: message.into(),
            context,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn validation_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ValidationError {
            message: message.into(),
            context,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::InternalError {
            message: message.into(),
            context,
        }
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        Self::TransactionError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::TransactionError { context, .. } => context.retryable,
            _ => false,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::NotFound { context, .. }
            | Self::UniqueViolation { context, .. }
            | Self::ValidationError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. }
            | Self::TransactionError { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::NotFound { context, .. }
            | Self::UniqueViolation { context, .. }
            | Self::ValidationError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. }
            | Self::TransactionError { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add or update the entity in the error context.
    pub fn with_entity(mut self, entity: impl Into<String>, id: impl ToString) -> Self {
        let context = self.context_mut();
        context.entity = Some(entity.into());
        context.entity_id = Some(id.to_string());
        self
    }
}

impl From<ShiftValidationError> for RepositoryError {
    fn from(err: ShiftValidationError) -> Self {
        RepositoryError::validation_with_context(err.to_string(), ErrorContext::default().with_entity("shift"))
    }
}

#[cfg(feature = "postgres-repo")]
fn database_error_details(kind: &impl fmt::Debug, constraint: Option<&str>) -> String {
    match constraint {
        Some(constraint) => format!("db_error_kind={:?}, constraint={}", kind, constraint),
        None => format!("db_error_kind={:?}", kind),
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::DatabaseErrorKind;

        match err {
            diesel::result::Error::NotFound => RepositoryError::not_found("Record not found"),
            diesel::result::Error::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                let mut context = ErrorContext::default()
                    .with_details(database_error_details(&kind, info.constraint_name()));
                if let Some(table) = info.table_name() {
                    context = context.with_entity(table);
                }

                match kind {
                    DatabaseErrorKind::UniqueViolation => {
                        RepositoryError::UniqueViolation { message, context }
                    }
                    DatabaseErrorKind::ForeignKeyViolation => {
                        RepositoryError::NotFound { message, context }
                    }
                    DatabaseErrorKind::CheckViolation | DatabaseErrorKind::NotNullViolation => {
                        RepositoryError::ValidationError { message, context }
                    }
                    DatabaseErrorKind::SerializationFailure => RepositoryError::QueryError {
                        message,
                        context: context.retryable(),
                    },
                    DatabaseErrorKind::ClosedConnection => RepositoryError::ConnectionError {
                        message,
                        context: context.retryable(),
                    },
                    _ => RepositoryError::QueryError { message, context },
                }
            }
            diesel::result::Error::QueryBuilderError(e) => {
                RepositoryError::query(format!("Query builder error: {}", e))
            }
            diesel::result::Error::DeserializationError(e) => {
                RepositoryError::internal(format!("Deserialization error: {}", e))
            }
            diesel::result::Error::SerializationError(e) => {
                RepositoryError::internal(format!("Serialization error: {}", e))
            }
            diesel::result::Error::RollbackTransaction => {
                RepositoryError::transaction("Transaction rolled back")
            }
            other => RepositoryError::query(other.to_string()),
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        RepositoryError::connection_with_context(
            err.to_string(),
            ErrorContext::default().with_details("pool_error"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_context_display() {
        let context = ErrorContext::new("join_shift")
            .with_entity("shift_helper")
            .with_entity_id(12)
            .with_details("duplicate");
        assert_eq!(
            context.to_string(),
            "[operation=join_shift, entity=shift_helper, id=12, details=duplicate]"
        );
    }

    #[test]
    fn test_retryable_only_for_transient_errors() {
        assert!(RepositoryError::connection("pool exhausted").is_retryable());
        assert!(!RepositoryError::unique_violation("dup").is_retryable());
        assert!(!RepositoryError::not_found("gone").is_retryable());
        assert!(!RepositoryError::query("bad sql").is_retryable());
    }

    #[test]
    fn test_missing_sets_context() {
        let err = RepositoryError::missing("get_shift", "shift", 3);
        assert!(err.is_not_found());
        assert_eq!(err.context().entity.as_deref(), Some("shift"));
        assert_eq!(err.context().entity_id.as_deref(), Some("3"));
        assert!(err.to_string().contains("shift 3 not found"));
    }

    #[test]
    fn test_with_operation_and_entity() {
        let err = RepositoryError::unique_violation("already joined")
            .with_operation("join_shift")
            .with_entity("shift", 5);
        assert!(err.is_unique_violation());
        assert_eq!(err.context().operation.as_deref(), Some("join_shift"));
        assert_eq!(err.context().entity_id.as_deref(), Some("5"));
    }

    #[test]
    fn test_from_shift_validation_error() {
        let t = NaiveDate::from_ymd_opt(2023, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let err: RepositoryError = ShiftValidationError::EndsBeforeStart {
            starting: t,
            ending: t,
        }
        .into();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }

    #[cfg(feature = "postgres-repo")]
    #[test]
    fn test_database_error_details_keep_kind_and_constraint() {
        use diesel::result::DatabaseErrorKind;

        assert_eq!(
            database_error_details(
                &DatabaseErrorKind::UniqueViolation,
                Some("shift_helpers_user_account_id_shift_id_key")
            ),
            "db_error_kind=UniqueViolation, constraint=shift_helpers_user_account_id_shift_id_key"
        );
        assert_eq!(
            database_error_details(&DatabaseErrorKind::CheckViolation, None),
            "db_error_kind=CheckViolation"
        );
    }
}
