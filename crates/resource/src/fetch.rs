//! Typed accessors on top of [`ResourceStore::resolve`].
//!
//! Only scalar values convert. Absent values, lists and strings that do not
//! parse all fall back to the caller's default; malformed keys still fail.

use std::str::FromStr;

use crate::error::Result;
use crate::search::ResourceStore;
use crate::types::ResourceValue;

impl ResourceStore {
    pub fn fetch_int(&self, key: &str, default: i64) -> Result<i64> {
        self.fetch_parsed(key, default)
    }

    pub fn fetch_float(&self, key: &str, default: f64) -> Result<f64> {
        self.fetch_parsed(key, default)
    }

    /// `true` (any case) is true, every other scalar is false.
    pub fn fetch_bool(&self, key: &str, default: bool) -> Result<bool> {
        let value = self.resolve(key)?;
        Ok(match value.as_ref().and_then(ResourceValue::as_single) {
            Some(value) => value.trim().eq_ignore_ascii_case("true"),
            None => default,
        })
    }

    fn fetch_parsed<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        let resolved = self.resolve(key)?;
        let Some(value) = resolved.as_ref().and_then(ResourceValue::as_single) else {
            return Ok(default);
        };
        match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(_) => {
                log::debug!("resource {key} = {value:?} does not convert, using default");
                Ok(default)
            }
        }
    }
}
