//! 领域层统一错误定义
//!
//! 聚合方法在产生任何事件之前以 `DomainError` 报告业务规则违反，
//! 应用层据此向调用方返回结构化失败（not found / problem / conflict / validation）。
//!
use thiserror::Error;

/// 错误分类，便于上层映射为不同的对外表现
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Problem,
    Conflict,
    Validation,
}

/// 统一错误类型：`code` 为稳定的机器可读编码（如 `TicketTypes.SamePrice`）
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("not found: {code}: {reason}")]
    NotFound { code: &'static str, reason: String },
    #[error("problem: {code}: {reason}")]
    Problem { code: &'static str, reason: String },
    #[error("conflict: {code}: {reason}")]
    Conflict { code: &'static str, reason: String },
    #[error("validation: {code}: {reason}")]
    Validation { code: &'static str, reason: String },
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn not_found(code: &'static str, reason: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            reason: reason.into(),
        }
    }

    pub fn problem(code: &'static str, reason: impl Into<String>) -> Self {
        Self::Problem {
            code,
            reason: reason.into(),
        }
    }

    pub fn conflict(code: &'static str, reason: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            reason: reason.into(),
        }
    }

    pub fn validation(code: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            code,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { code, .. }
            | Self::Problem { code, .. }
            | Self::Conflict { code, .. }
            | Self::Validation { code, .. } => code,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Problem { .. } => ErrorKind::Problem,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Validation { .. } => ErrorKind::Validation,
        }
    }
}
