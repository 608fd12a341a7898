//! Custom field validators and flattening of `validator` reports.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use hub_core::domain::{Category, SkillLevel};

use crate::response::FieldError;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid username regex"));
static GITHUB_REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com/[A-Za-z0-9_-]+/[A-Za-z0-9_-]+$").expect("valid github regex")
});

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn username_chars(value: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(value) {
        Ok(())
    } else {
        Err(invalid(
            "username",
            "Username can only contain letters, numbers, and underscores",
        ))
    }
}

pub fn github_repo(value: &str) -> Result<(), ValidationError> {
    if GITHUB_REPO_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(invalid(
            "github_repo",
            "Please provide a valid GitHub repository URL",
        ))
    }
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(invalid("required", "This field is required"))
    } else {
        Ok(())
    }
}

pub fn category(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Category>()
        .map(|_| ())
        .map_err(|_| invalid("category", "Invalid category"))
}

pub fn skill_level(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<SkillLevel>()
        .map(|_| ())
        .map_err(|_| invalid("skill_level", "Must be Beginner, Intermediate or Advanced"))
}

/// `github_repo` -> `githubRepo`, matching the JSON field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn collect(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            camel_case(field)
        } else {
            format!("{prefix}.{}", camel_case(field))
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|e| FieldError {
                    field: path.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", e.code)),
                }));
            }
            ValidationErrorsKind::Struct(nested) => collect(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}

/// Flatten a (possibly nested) validation report into `{field, message}` pairs,
/// sorted by field name.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect("", errors, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_repo_pattern() {
        assert!(github_repo("https://github.com/alice/hello").is_ok());
        assert!(github_repo("https://github.com/alice-b/hello_world").is_ok());
        assert!(github_repo("http://github.com/alice/hello").is_err());
        assert!(github_repo("https://github.com/alice").is_err());
        assert!(github_repo("https://github.com/alice/hello/tree/main").is_err());
        assert!(github_repo("https://github.com/ålice/repo").is_err());
        assert!(github_repo("https://github.com/alice/répo").is_err());
    }

    #[test]
    fn test_username_chars() {
        assert!(username_chars("alice_01").is_ok());
        assert!(username_chars("alice-01").is_err());
        assert!(username_chars("al ice").is_err());
    }

    #[test]
    fn test_enum_validators() {
        assert!(category("CLI Tool").is_ok());
        assert!(category("cli tool").is_err());
        assert!(skill_level("Advanced").is_ok());
        assert!(skill_level("Expert").is_err());
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("github_repo"), "githubRepo");
        assert_eq!(camel_case("title"), "title");
        assert_eq!(camel_case("new_password"), "newPassword");
    }
}
