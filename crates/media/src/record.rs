use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// A generic, ordered map of named fields.
///
/// This is the shape every entity takes at rest. Accessors are strict: asking
/// for a field that is absent, or present with the wrong type, is an error.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn require(&self, field: &'static str) -> Result<&Value> {
        Ok(self.0.get(field).ok_or_raise(|| ErrorKind::MissingField(field))?)
    }

    pub fn str(&self, field: &'static str) -> Result<&str> {
        Ok(self.require(field)?.as_str().ok_or_raise(|| ErrorKind::InvalidField(field))?)
    }

    pub fn u64(&self, field: &'static str) -> Result<u64> {
        Ok(self.require(field)?.as_u64().ok_or_raise(|| ErrorKind::InvalidField(field))?)
    }

    pub fn i64(&self, field: &'static str) -> Result<i64> {
        Ok(self.require(field)?.as_i64().ok_or_raise(|| ErrorKind::InvalidField(field))?)
    }

    pub fn u32(&self, field: &'static str) -> Result<u32> {
        u32::try_from(self.u64(field)?).or_raise(|| ErrorKind::InvalidField(field))
    }

    pub fn path(&self, field: &'static str) -> Result<PathBuf> {
        self.str(field).map(PathBuf::from)
    }

    pub fn time(&self, field: &'static str) -> Result<OffsetDateTime> {
        OffsetDateTime::parse(self.str(field)?, &Rfc3339).or_raise(|| ErrorKind::InvalidField(field))
    }

    /// A field that must be present, but may be `null`.
    pub fn optional_str(&self, field: &'static str) -> Result<Option<&str>> {
        match self.require(field)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            _ => exn::bail!(ErrorKind::InvalidField(field)),
        }
    }

    pub fn optional_path(&self, field: &'static str) -> Result<Option<PathBuf>> {
        Ok(self.optional_str(field)?.map(PathBuf::from))
    }

    pub fn optional_time(&self, field: &'static str) -> Result<Option<OffsetDateTime>> {
        self.optional_str(field)?
            .map(|s| OffsetDateTime::parse(s, &Rfc3339).or_raise(|| ErrorKind::InvalidField(field)))
            .transpose()
    }

    pub fn paths(&self, field: &'static str) -> Result<Vec<PathBuf>> {
        let values = self.require(field)?.as_array().ok_or_raise(|| ErrorKind::InvalidField(field))?;
        values
            .iter()
            .map(|v| v.as_str().map(PathBuf::from).ok_or_raise(|| ErrorKind::InvalidField(field)))
            .collect()
    }

    /// Serialize to the JSON text stored by an index.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.0).or_raise(|| ErrorKind::InvalidField("*"))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).or_raise(|| ErrorKind::InvalidField("*"))
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Format a timestamp the way records store it (RFC 3339, UTC).
pub(crate) fn format_time(field: &'static str, time: OffsetDateTime) -> Result<String> {
    time.to_offset(time::UtcOffset::UTC).format(&Rfc3339).or_raise(|| ErrorKind::InvalidField(field))
}

pub(crate) fn path_value(field: &'static str, path: &std::path::Path) -> Result<Value> {
    Ok(Value::String(path.to_str().ok_or_raise(|| ErrorKind::InvalidField(field))?.to_string()))
}
