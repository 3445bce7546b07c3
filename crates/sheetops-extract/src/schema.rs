use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a field name or kind does not fit the record's schema.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SchemaMismatch {
    #[error("field `{0}` is not part of the record schema")]
    UnknownField(String),
    #[error("field `{name}` is declared as {declared}, not {requested}")]
    KindMismatch {
        name: String,
        declared: FieldKind,
        requested: FieldKind,
    },
    #[error("unknown field kind `{0}` (expected `scalar-string` or `string-list`)")]
    UnknownKind(String),
    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),
    #[error("record schema declares no fields")]
    Empty,
    #[error("first field `{0}` must be a scalar-string")]
    FirstFieldNotScalar(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    ScalarString,
    StringList,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::ScalarString => "scalar-string",
            FieldKind::StringList => "string-list",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = SchemaMismatch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scalar-string" => Ok(FieldKind::ScalarString),
            "string-list" => Ok(FieldKind::StringList),
            other => Err(SchemaMismatch::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::ScalarString)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::StringList)
    }
}

/// Ordered `(name, kind)` declarations; order is binding order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordSchema {
    fields: Vec<FieldSpec>,
}

impl RecordSchema {
    /// Validate and wrap a field list.
    ///
    /// The first field is bound from the cell under the anchor and must be a
    /// scalar; names must be unique.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaMismatch> {
        let first = fields.first().ok_or(SchemaMismatch::Empty)?;
        if first.kind != FieldKind::ScalarString {
            return Err(SchemaMismatch::FirstFieldNotScalar(first.name.clone()));
        }
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaMismatch::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    /// For field lists known to satisfy [`RecordSchema::new`]'s checks.
    pub(crate) fn from_validated(fields: Vec<FieldSpec>) -> Self {
        debug_assert!(Self::new(fields.clone()).is_ok());
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl<'de> Deserialize<'de> for RecordSchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let fields = Vec::<FieldSpec>::deserialize(deserializer)?;
        RecordSchema::new(fields).map_err(serde::de::Error::custom)
    }
}

impl Serialize for RecordSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    fn zero(kind: FieldKind) -> Self {
        match kind {
            FieldKind::ScalarString => FieldValue::Scalar(String::new()),
            FieldKind::StringList => FieldValue::List(Vec::new()),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Scalar(_) => FieldKind::ScalarString,
            FieldValue::List(_) => FieldKind::StringList,
        }
    }

    /// True for an empty scalar or an empty list.
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Scalar(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }
}

/// A record laid out by a [`RecordSchema`]; every field starts zero-valued.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtractionRecord {
    schema: RecordSchema,
    values: Vec<FieldValue>,
}

impl ExtractionRecord {
    pub fn empty(schema: RecordSchema) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|f| FieldValue::zero(f.kind))
            .collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    fn slot(&mut self, name: &str) -> Result<&mut FieldValue, SchemaMismatch> {
        let idx = self
            .schema
            .position(name)
            .ok_or_else(|| SchemaMismatch::UnknownField(name.to_string()))?;
        Ok(&mut self.values[idx])
    }

    fn mismatch(&self, name: &str, requested: FieldKind) -> SchemaMismatch {
        match self.schema.field(name) {
            Some(spec) => SchemaMismatch::KindMismatch {
                name: name.to_string(),
                declared: spec.kind,
                requested,
            },
            None => SchemaMismatch::UnknownField(name.to_string()),
        }
    }

    pub fn set_scalar(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), SchemaMismatch> {
        if let FieldValue::Scalar(slot) = self.slot(name)? {
            *slot = value.into();
            return Ok(());
        }
        Err(self.mismatch(name, FieldKind::ScalarString))
    }

    pub fn push_item(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), SchemaMismatch> {
        if let FieldValue::List(items) = self.slot(name)? {
            items.push(value.into());
            return Ok(());
        }
        Err(self.mismatch(name, FieldKind::StringList))
    }

    /// Kind-directed setter: scalars are overwritten, lists are appended to.
    pub fn assign(&mut self, name: &str, value: impl Into<String>) -> Result<(), SchemaMismatch> {
        match self.slot(name)? {
            FieldValue::Scalar(slot) => *slot = value.into(),
            FieldValue::List(items) => items.push(value.into()),
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema.position(name).map(|idx| &self.values[idx])
    }

    pub fn scalar(&self, name: &str) -> Result<&str, SchemaMismatch> {
        match self.get(name) {
            Some(FieldValue::Scalar(s)) => Ok(s),
            _ => Err(self.mismatch(name, FieldKind::ScalarString)),
        }
    }

    pub fn list(&self, name: &str) -> Result<&[String], SchemaMismatch> {
        match self.get(name) {
            Some(FieldValue::List(items)) => Ok(items),
            _ => Err(self.mismatch(name, FieldKind::StringList)),
        }
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldSpec, &FieldValue)> {
        self.schema.fields().iter().zip(self.values.iter())
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(FieldValue::is_zero)
    }
}

impl Serialize for ExtractionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (spec, value) in self.iter() {
            map.serialize_entry(&spec.name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> RecordSchema {
        RecordSchema::new(vec![
            FieldSpec::scalar("address"),
            FieldSpec::list("logins"),
        ])
        .unwrap()
    }

    #[test]
    fn schema_validation() {
        assert_eq!(RecordSchema::new(vec![]), Err(SchemaMismatch::Empty));
        assert_eq!(
            RecordSchema::new(vec![FieldSpec::list("logins")]),
            Err(SchemaMismatch::FirstFieldNotScalar("logins".into()))
        );
        assert_eq!(
            RecordSchema::new(vec![FieldSpec::scalar("a"), FieldSpec::list("a")]),
            Err(SchemaMismatch::DuplicateField("a".into()))
        );
    }

    #[test]
    fn kind_tags_parse() {
        assert_eq!("scalar-string".parse::<FieldKind>(), Ok(FieldKind::ScalarString));
        assert_eq!("string-list".parse::<FieldKind>(), Ok(FieldKind::StringList));
        assert_eq!(
            "int".parse::<FieldKind>(),
            Err(SchemaMismatch::UnknownKind("int".into()))
        );
    }

    #[test]
    fn record_starts_zero_valued() {
        let record = ExtractionRecord::empty(schema());
        assert!(record.is_zero());
        assert_eq!(record.scalar("address"), Ok(""));
        assert_eq!(record.list("logins"), Ok(&[][..]));
    }

    #[test]
    fn typed_setters_respect_kinds() {
        let mut record = ExtractionRecord::empty(schema());
        record.set_scalar("address", "10.0.0.1").unwrap();
        record.push_item("logins", "root").unwrap();
        record.assign("logins", "admin").unwrap();
        assert_eq!(
            record.push_item("address", "x"),
            Err(SchemaMismatch::KindMismatch {
                name: "address".into(),
                declared: FieldKind::ScalarString,
                requested: FieldKind::StringList,
            })
        );
        assert_eq!(
            record.set_scalar("missing", "x"),
            Err(SchemaMismatch::UnknownField("missing".into()))
        );
        // Failed binds leave earlier values untouched.
        assert_eq!(record.scalar("address"), Ok("10.0.0.1"));
        assert_eq!(
            record.list("logins").unwrap(),
            &["root".to_string(), "admin".to_string()]
        );
    }

    #[test]
    fn schema_from_yaml_is_validated() {
        let yaml = "- { name: address, kind: scalar-string }\n- { name: logins, kind: string-list }\n";
        let parsed: RecordSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed, schema());

        let bad = "- { name: logins, kind: string-list }\n";
        let err = serde_yaml::from_str::<RecordSchema>(bad).unwrap_err();
        assert!(err.to_string().contains("must be a scalar-string"));

        let typo = "- { name: address, kind: scalar-string, optional: true }\n";
        assert!(serde_yaml::from_str::<RecordSchema>(typo).is_err());
    }
}
