use crate::validation::ValidationFailures;
use evently_domain::error::DomainError;
use uuid::Uuid;

/// 应用层统一错误
///
/// 事件管线上的每一段失败都有独立变体，调用方可以据此区分：
/// 业务规则违反（`Domain`）、提交失败（`Commit`）、本地分发失败（`Dispatch`）、
/// 转换失败（`Translation`）以及跨模块消费失败（`Consumer`）。
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("validation: {0}")]
    Validation(ValidationFailures),

    #[error("commit failed: {reason}")]
    Commit {
        reason: String,
        #[source]
        source: Option<Box<AppError>>,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("dispatch failed: handler={handler}, event_type={event_type}, event_id={event_id}: {source}")]
    Dispatch {
        handler: &'static str,
        event_type: &'static str,
        event_id: Uuid,
        #[source]
        source: Box<AppError>,
    },

    #[error("translation failed: translator={translator}: {source}")]
    Translation {
        translator: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("consumer failed: consumer={consumer}: {source}")]
    Consumer {
        consumer: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("broker: {0}")]
    Broker(String),

    #[error("decode failed: event_type={event_type}: {reason}")]
    Decode {
        event_type: String,
        reason: String,
    },

    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("handler not found: {0}")]
    HandlerNotFound(&'static str),

    #[error("handler already registered: command={command}")]
    AlreadyRegisteredCommand { command: &'static str },

    #[error("handler already registered: query={query}")]
    AlreadyRegisteredQuery { query: &'static str },

    #[error("consumer already registered: event_type={event_type}, consumer={consumer}")]
    AlreadyRegisteredConsumer {
        event_type: &'static str,
        consumer: &'static str,
    },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl AppError {
    /// 不带底层原因的提交失败
    pub fn commit(reason: impl Into<String>) -> Self {
        Self::Commit {
            reason: reason.into(),
            source: None,
        }
    }

    /// 剥离提交/分发/转换/消费包装，返回最内层的错误
    pub fn root_cause(&self) -> &AppError {
        match self {
            Self::Dispatch { source, .. }
            | Self::Translation { source, .. }
            | Self::Consumer { source, .. } => source.root_cause(),
            Self::Commit {
                source: Some(source),
                ..
            } => source.root_cause(),
            other => other,
        }
    }

    /// 若根因为领域错误则返回之
    pub fn domain_error(&self) -> Option<&DomainError> {
        match self.root_cause() {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_nested_pipeline_errors() {
        let inner = AppError::from(DomainError::not_found("Users.NotFound", "missing"));
        let err = AppError::Dispatch {
            handler: "h",
            event_type: "e",
            event_id: Uuid::nil(),
            source: Box::new(AppError::Translation {
                translator: "t",
                source: Box::new(inner),
            }),
        };

        assert_eq!(err.domain_error().map(|e| e.code()), Some("Users.NotFound"));
        assert!(matches!(err.root_cause(), AppError::Domain(_)));
        assert!(err.to_string().contains("handler=h"));
    }

    #[test]
    fn commit_keeps_the_store_error_as_source() {
        use std::error::Error;

        let err = AppError::Commit {
            reason: "config: bad dsn".into(),
            source: Some(Box::new(AppError::Config("bad dsn".into()))),
        };

        assert!(matches!(err.root_cause(), AppError::Config(_)));
        assert!(err.source().is_some());
        assert!(AppError::commit("timeout").source().is_none());
    }
}
