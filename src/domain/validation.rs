//! Field-level checks shared by the write paths

use super::DomainError;

pub const NAME_MAX_LEN: usize = 50;
pub const PHONE_MAX_LEN: usize = 15;
pub const ITEM_NAME_MAX_LEN: usize = 100;

/// Pick the submitted value, or fall back to the stored one for partial
/// updates. A blank string counts as missing.
pub fn required_text(
    field: &'static str,
    submitted: Option<String>,
    fallback: Option<&str>,
    max_len: Option<usize>,
) -> Result<String, DomainError> {
    let value = match submitted {
        Some(v) => v.trim().to_string(),
        None => match fallback {
            Some(v) => return Ok(v.to_string()),
            None => return Err(DomainError::validation(format!("{} is required", field))),
        },
    };

    if value.is_empty() {
        return Err(DomainError::validation(format!("{} may not be blank", field)));
    }
    check_len(field, &value, max_len)?;
    Ok(value)
}

/// Like [`required_text`] but for nullable columns. `None` keeps the stored
/// value, `Some(None)` or a blank string clears it.
pub fn optional_text(
    field: &'static str,
    submitted: Option<Option<String>>,
    fallback: Option<&str>,
    max_len: Option<usize>,
) -> Result<Option<String>, DomainError> {
    match submitted {
        None => Ok(fallback.map(str::to_string)),
        Some(None) => Ok(None),
        Some(Some(v)) => {
            let v = v.trim();
            if v.is_empty() {
                return Ok(None);
            }
            check_len(field, v, max_len)?;
            Ok(Some(v.to_string()))
        }
    }
}

fn check_len(field: &'static str, value: &str, max_len: Option<usize>) -> Result<(), DomainError> {
    match max_len {
        Some(max) if value.chars().count() > max => Err(DomainError::validation(format!(
            "{} must be at most {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

/// Structural email check: one `@`, a non-empty local part and a dotted
/// domain without empty labels.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::validation(format!("'{}' is not a valid email address", email));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}

/// Split a search query into terms the way the list endpoints expect:
/// whitespace and commas separate terms, empty terms are dropped.
pub fn search_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
