//! Relation module.
//!
//! Declared types and destination table metadata resolved by the
//! external analyzer.

use std::fmt::{self, Formatter};

use ahash::AHashMap;
use serde::de::{Error, MapAccess, Visitor};
use serde::ser::{Serialize as SerSerialize, SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use smol_str::{format_smolstr, SmolStr};

use crate::errors::{Action, AlignError, Entity};

/// Fundamental kind of a resolved expression type.
///
/// This is the granularity at which the coercion inserter compares the
/// plan's column types against the destination's declared types.
#[derive(Serialize, Deserialize, PartialEq, Debug, Eq, Clone)]
pub enum Type {
    Array,
    Boolean,
    Datetime,
    Decimal,
    Double,
    Integer,
    Map,
    String,
    Unsigned,
}

impl Type {
    /// Compound types are never coerced through catalog functions.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Type::Array | Type::Map)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let p = match self {
            Type::Array => "array",
            Type::Boolean => "boolean",
            Type::Datetime => "datetime",
            Type::Decimal => "decimal",
            Type::Double => "double",
            Type::Integer => "integer",
            Type::Map => "map",
            Type::String => "string",
            Type::Unsigned => "unsigned",
        };
        write!(f, "{p}")
    }
}

/// Authoritative column type declared on the destination table.
///
/// Unlike [`Type`], a declared type may carry parameters (precision and
/// scale for decimals, length for varchars). Inserted data must conform
/// to the declared type, so casts synthesized by the rewriter target
/// these rather than plain kinds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    Array,
    Boolean,
    Datetime,
    Decimal(Option<(u32, u32)>),
    Double,
    Integer,
    Map,
    String,
    Unsigned,
    Varchar(usize),
}

impl DeclaredType {
    /// Parses a declared type from its SQL-ish string form, e.g.
    /// `"integer"`, `"decimal(10,2)"` or `"varchar(20)"`.
    ///
    /// # Errors
    /// - Unknown base name or malformed parameter list.
    pub fn new(s: &str) -> Result<Self, AlignError> {
        let lowered = s.to_lowercase();
        let trimmed = lowered.trim();
        let (base, params) = match trimmed.find('(') {
            Some(pos) => {
                let args = trimmed[pos..]
                    .strip_prefix('(')
                    .and_then(|rest| rest.strip_suffix(')'))
                    .ok_or_else(|| {
                        AlignError::Invalid(Entity::Type, Some(format_smolstr!("{trimmed}")))
                    })?;
                (&trimmed[..pos], Some(args))
            }
            None => (trimmed, None),
        };
        let parse_args = |args: &str| -> Result<Vec<u32>, AlignError> {
            args.split(',')
                .map(|a| {
                    a.trim().parse::<u32>().map_err(|_| {
                        AlignError::Invalid(Entity::Type, Some(format_smolstr!("{trimmed}")))
                    })
                })
                .collect()
        };
        match (base, params) {
            ("array", None) => Ok(DeclaredType::Array),
            ("boolean", None) => Ok(DeclaredType::Boolean),
            ("datetime", None) => Ok(DeclaredType::Datetime),
            ("decimal", None) => Ok(DeclaredType::Decimal(None)),
            ("decimal", Some(args)) => match parse_args(args)?.as_slice() {
                [precision, scale] => Ok(DeclaredType::Decimal(Some((*precision, *scale)))),
                _ => Err(AlignError::Invalid(
                    Entity::Type,
                    Some(format_smolstr!("{trimmed}")),
                )),
            },
            ("double", None) => Ok(DeclaredType::Double),
            ("integer", None) => Ok(DeclaredType::Integer),
            ("map", None) => Ok(DeclaredType::Map),
            ("string", None) => Ok(DeclaredType::String),
            ("unsigned", None) => Ok(DeclaredType::Unsigned),
            ("varchar", Some(args)) => match parse_args(args)?.as_slice() {
                [length] => Ok(DeclaredType::Varchar(*length as usize)),
                _ => Err(AlignError::Invalid(
                    Entity::Type,
                    Some(format_smolstr!("{trimmed}")),
                )),
            },
            _ => Err(AlignError::NotFound(
                Entity::Type,
                format_smolstr!("{trimmed}"),
            )),
        }
    }

    /// Fundamental kind of the declared type.
    #[must_use]
    pub fn kind(&self) -> Type {
        match self {
            DeclaredType::Array => Type::Array,
            DeclaredType::Boolean => Type::Boolean,
            DeclaredType::Datetime => Type::Datetime,
            DeclaredType::Decimal(_) => Type::Decimal,
            DeclaredType::Double => Type::Double,
            DeclaredType::Integer => Type::Integer,
            DeclaredType::Map => Type::Map,
            DeclaredType::String => Type::String,
            DeclaredType::Unsigned => Type::Unsigned,
            DeclaredType::Varchar(_) => Type::String,
        }
    }

    /// Parameter-free name used as the conversion function lookup key.
    #[must_use]
    pub fn base_name(&self) -> &'static str {
        match self {
            DeclaredType::Array => "array",
            DeclaredType::Boolean => "boolean",
            DeclaredType::Datetime => "datetime",
            DeclaredType::Decimal(_) => "decimal",
            DeclaredType::Double => "double",
            DeclaredType::Integer => "integer",
            DeclaredType::Map => "map",
            DeclaredType::String => "string",
            DeclaredType::Unsigned => "unsigned",
            DeclaredType::Varchar(_) => "varchar",
        }
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.kind().is_primitive()
    }
}

impl From<&DeclaredType> for String {
    fn from(t: &DeclaredType) -> Self {
        match t {
            DeclaredType::Decimal(Some((precision, scale))) => {
                format!("decimal({precision},{scale})")
            }
            DeclaredType::Varchar(length) => format!("varchar({length})"),
            other => other.base_name().to_string(),
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from(self))
    }
}

/// Destination table column.
#[derive(PartialEq, Debug, Eq, Clone)]
pub struct Column {
    /// Column name.
    pub name: SmolStr,
    /// Declared column type.
    pub ty: DeclaredType,
}

impl Column {
    /// Column constructor.
    #[must_use]
    pub fn new(name: &str, ty: DeclaredType) -> Self {
        Column {
            name: name.into(),
            ty,
        }
    }
}

/// Serializer keeping the `type` field in its SQL-ish string form.
impl SerSerialize for Column {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("name", self.name.as_str())?;
        map.serialize_entry("type", &String::from(&self.ty))?;
        map.end()
    }
}

struct ColumnVisitor;

impl<'de> Visitor<'de> for ColumnVisitor {
    type Value = Column;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("column parsing failed")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut column_name = String::new();
        let mut column_type = String::new();
        while let Some((key, value)) = map.next_entry::<String, String>()? {
            match key.as_str() {
                "name" => column_name.push_str(&value),
                "type" => column_type.push_str(&value),
                _ => return Err(Error::custom(format!("invalid column param: {key}"))),
            }
        }
        let ty = DeclaredType::new(&column_type)
            .map_err(|e| Error::custom(format!("unsupported column type: {e}")))?;
        Ok(Column::new(&column_name, ty))
    }
}

impl<'de> Deserialize<'de> for Column {
    fn deserialize<D>(deserializer: D) -> Result<Column, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ColumnVisitor)
    }
}

/// Destination table of an INSERT statement.
///
/// Non-partition columns precede partition columns in the append order,
/// so the final projection must produce `columns` first and then one
/// expression per partition column.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct DestinationTable {
    /// Declared non-partition columns.
    pub columns: Vec<Column>,
    /// Declared partition columns.
    #[serde(default)]
    pub partition_columns: Vec<Column>,
    /// Unique table name.
    name: SmolStr,
}

impl DestinationTable {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Destination table constructor.
    ///
    /// # Errors
    /// - Duplicated column name across the combined column list.
    pub fn new(
        name: &str,
        columns: Vec<Column>,
        partition_columns: Vec<Column>,
    ) -> Result<Self, AlignError> {
        let table = DestinationTable {
            columns,
            partition_columns,
            name: name.into(),
        };
        table.check_duplicates()?;
        Ok(table)
    }

    /// Destination table from YAML.
    ///
    /// # Errors
    /// Returns `AlignError` when the YAML-serialized table is invalid.
    pub fn from_yaml(s: &str) -> Result<Self, AlignError> {
        let table: DestinationTable = match serde_yaml::from_str(s) {
            Ok(t) => t,
            Err(e) => {
                return Err(AlignError::FailedTo(
                    Action::Deserialize,
                    Some(Entity::Table),
                    format_smolstr!("{e:?}"),
                ))
            }
        };
        table.check_duplicates()?;
        Ok(table)
    }

    fn check_duplicates(&self) -> Result<(), AlignError> {
        let mut pos_map: AHashMap<&str, usize> = AHashMap::new();
        for (pos, col) in self.all_columns().enumerate() {
            if let Some(prev) = pos_map.insert(col.name.as_str(), pos) {
                return Err(AlignError::DuplicatedValue(format_smolstr!(
                    r#"table "{}" has a duplicating column "{}" at positions {prev} and {pos}"#,
                    self.name,
                    col.name,
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_partitioned(&self) -> bool {
        !self.partition_columns.is_empty()
    }

    /// Non-partition columns followed by partition columns, in the
    /// append order of the destination.
    pub fn all_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().chain(self.partition_columns.iter())
    }

    /// Declared types of the full append row.
    #[must_use]
    pub fn declared_types(&self) -> Vec<DeclaredType> {
        self.all_columns().map(|col| col.ty.clone()).collect()
    }

    /// Number of columns the final projection must produce.
    #[must_use]
    pub fn output_arity(&self) -> usize {
        self.columns.len() + self.partition_columns.len()
    }
}

/// Partition columns whose values are fixed by the statement text.
///
/// Entries keep their insertion order. Only a prefix of the declared
/// partition columns may be static; the remaining (dynamic) partitions
/// are computed by the query and occupy the trailing projection slots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPartitionSpec {
    entries: Vec<(SmolStr, SmolStr)>,
}

impl StaticPartitionSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.entries.push((name.into(), value.into()));
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that the spec names exactly the leading declared partition
    /// columns of the table.
    ///
    /// # Errors
    /// - A spec entry names a column that is not a declared partition
    ///   column, or a non-leading partition column is static while an
    ///   earlier one is dynamic.
    pub fn validate_against(&self, table: &DestinationTable) -> Result<(), AlignError> {
        if self.len() > table.partition_columns.len() {
            return Err(AlignError::Invalid(
                Entity::PartitionSpec,
                Some(format_smolstr!(
                    "{} static values given for {} declared partition columns",
                    self.len(),
                    table.partition_columns.len(),
                )),
            ));
        }
        let mut seen: AHashMap<&str, ()> = AHashMap::new();
        for (name, _) in &self.entries {
            if seen.insert(name.as_str(), ()).is_some() {
                return Err(AlignError::DuplicatedValue(format_smolstr!(
                    "static partition value for column {name}"
                )));
            }
        }
        let static_prefix = &table.partition_columns[..self.len()];
        for col in static_prefix {
            if self.get(&col.name).is_none() {
                return Err(AlignError::Invalid(
                    Entity::PartitionSpec,
                    Some(format_smolstr!(
                        "partition column {} of table {} must be static because a later partition column is",
                        col.name,
                        table.name,
                    )),
                ));
            }
        }
        Ok(())
    }
}
