//! Query string access with repeated keys and comma lists.
//!
//! The front end sends `event_ids` both as repeated keys
//! (`?event_ids=a&event_ids=b`) and as one comma-separated value, so the
//! standard `Query<T>` extractor is not enough.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Every value of every query key, in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    values: HashMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            values
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self { values }
    }

    /// First non-blank value of `key`, trimmed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)?
            .iter()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    pub fn required(&self, key: &str) -> Result<&str, AppError> {
        self.get(key)
            .ok_or_else(|| AppError::Validation(format!("missing query parameter '{}'", key)))
    }

    /// All values of `key`, comma lists split out; `None` when there are
    /// none.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        let items: Vec<String> = self
            .values
            .get(key)?
            .iter()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        (!items.is_empty()).then_some(items)
    }

    pub fn number<T: FromStr>(&self, key: &str) -> Result<Option<T>, AppError> {
        self.get(key)
            .map(|raw| {
                raw.parse().map_err(|_| {
                    AppError::Validation(format!("'{}' is not a valid value for {}", raw, key))
                })
            })
            .transpose()
    }

    /// `true`/`false` (also `1`/`0`, `yes`/`no`), case-insensitive.
    pub fn flag(&self, key: &str) -> Result<Option<bool>, AppError> {
        self.get(key)
            .map(|raw| match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(AppError::Validation(format!(
                    "'{}' is not a valid boolean for {}",
                    raw, key
                ))),
            })
            .transpose()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::parse(parts.uri.query().unwrap_or("")))
    }
}
