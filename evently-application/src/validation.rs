//! 请求校验
//!
//! 命令在进入处理器之前先经过 `Command::validate`，所有字段问题被一次性收集，
//! 以 `AppError::Validation` 返回给调用方。
//!
use crate::error::AppError;
use std::fmt;

/// 单个字段的校验失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub message: String,
}

/// 一次校验收集到的全部失败
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailures(Vec<ValidationFailure>);

impl ValidationFailures {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|f| f.field == field)
    }
}

impl fmt::Display for ValidationFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for failure in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", failure.field, failure.message)?;
        }
        Ok(())
    }
}

/// 链式校验器
///
/// ```rust
/// use evently_application::validation::Validator;
///
/// let result = Validator::new()
///     .not_empty("first_name", "")
///     .email("email", "not-an-email")
///     .finish();
/// assert!(result.is_err());
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    failures: Vec<ValidationFailure>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(mut self, field: &'static str, ok: bool, message: impl Into<String>) -> Self {
        if !ok {
            self.failures.push(ValidationFailure {
                field,
                message: message.into(),
            });
        }
        self
    }

    pub fn not_empty(self, field: &'static str, value: &str) -> Self {
        self.check(field, !value.trim().is_empty(), "must not be empty")
    }

    /// 空值只报告一次（由 `not_empty` 负责），这里只检查格式
    pub fn email(self, field: &'static str, value: &str) -> Self {
        let value = value.trim();
        self.check(
            field,
            value.is_empty() || is_well_formed_email(value),
            "is not a valid email address",
        )
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(ValidationFailures(self.failures)))
        }
    }
}

fn is_well_formed_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_failure() {
        let err = Validator::new()
            .not_empty("email", " ")
            .email("email", " ")
            .not_empty("first_name", "")
            .not_empty("last_name", "Doe")
            .finish()
            .unwrap_err();

        match err {
            AppError::Validation(failures) => {
                assert_eq!(failures.len(), 2);
                assert!(failures.has_field("email"));
                assert!(failures.has_field("first_name"));
                assert!(!failures.has_field("last_name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn email_format() {
        assert!(is_well_formed_email("ada@example.com"));
        assert!(is_well_formed_email("a.b+c@mail.example.org"));
        assert!(!is_well_formed_email("ada.example.com"));
        assert!(!is_well_formed_email("@example.com"));
        assert!(!is_well_formed_email("ada@example"));
        assert!(!is_well_formed_email("ada@@example.com"));
        assert!(!is_well_formed_email("ada@example..com"));
        assert!(!is_well_formed_email("ada lovelace@example.com"));
    }
}
