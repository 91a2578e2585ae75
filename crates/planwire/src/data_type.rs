//! Structural descriptions of relational data types.
//!
//! Data types live in the environment's type factory, which interns and
//! canonicalizes them. The engine never serializes a data type object
//! directly; it writes a [`TypeDescription`] and asks the factory of the
//! decoding environment to rebuild the type from it.

use std::fmt;

use crate::{Identifiable, Payload};

/// The kind of a relational data type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Identifiable,
    Payload,
)]
#[allow(missing_docs)]
pub enum TypeKind {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Decimal,
    Char,
    VarChar,
    Binary,
    VarBinary,
    Date,
    Time,
    Timestamp,
    IntervalDayTime,
    IntervalYearMonth,
    Array,
    Map,
    Struct,
    Any,
    Null,
}

impl TypeKind {
    /// Returns `true` for kinds that carry a precision.
    #[must_use]
    pub const fn has_precision(self) -> bool {
        matches!(
            self,
            Self::Decimal
                | Self::Char
                | Self::VarChar
                | Self::Binary
                | Self::VarBinary
                | Self::Time
                | Self::Timestamp
        )
    }

    /// Returns `true` for kinds that carry a scale.
    #[must_use]
    pub const fn has_scale(self) -> bool { matches!(self, Self::Decimal) }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "BOOLEAN",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::VarChar => "VARCHAR",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::IntervalDayTime => "INTERVAL DAY TO SECOND",
            Self::IntervalYearMonth => "INTERVAL YEAR TO MONTH",
            Self::Array => "ARRAY",
            Self::Map => "MAP",
            Self::Struct => "STRUCT",
            Self::Any => "ANY",
            Self::Null => "NULL",
        };
        f.write_str(name)
    }
}

/// Everything a type factory needs to rebuild a data type.
///
/// Collection kinds describe their element types in `components`: one entry
/// for arrays, key then value for maps. Struct kinds describe their members
/// in `fields`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Identifiable, Payload)]
pub struct TypeDescription {
    /// The kind of the type.
    pub kind: TypeKind,

    /// Whether the type admits `NULL`.
    pub nullable: bool,

    /// Precision, for kinds that carry one.
    pub precision: Option<u32>,

    /// Scale, for kinds that carry one.
    pub scale: Option<u32>,

    /// Element types of collection kinds.
    pub components: Vec<TypeDescription>,

    /// Named members of struct kinds.
    pub fields: Vec<(String, TypeDescription)>,
}

impl TypeDescription {
    /// Describes a nullable scalar type of the given kind.
    #[must_use]
    pub const fn scalar(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: true,
            precision: None,
            scale: None,
            components: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Describes a nullable `DECIMAL(precision, scale)`.
    #[must_use]
    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self {
            precision: Some(precision),
            scale: Some(scale),
            ..Self::scalar(TypeKind::Decimal)
        }
    }

    /// Describes a nullable array of `element`.
    #[must_use]
    pub fn array(element: Self) -> Self {
        Self { components: vec![element], ..Self::scalar(TypeKind::Array) }
    }

    /// Describes a nullable struct with the given members.
    #[must_use]
    pub fn structure(
        fields: impl IntoIterator<Item = (String, Self)>,
    ) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            ..Self::scalar(TypeKind::Struct)
        }
    }

    /// Returns the same description with the given nullability.
    #[must_use]
    pub fn with_nullable(self, nullable: bool) -> Self {
        Self { nullable, ..self }
    }
}

impl fmt::Display for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        match (self.precision, self.scale) {
            (Some(p), Some(s)) => write!(f, "({p}, {s})")?,
            (Some(p), None) => write!(f, "({p})")?,
            _ => {}
        }

        if !self.components.is_empty() {
            f.write_str("<")?;
            for (i, component) in self.components.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{component}")?;
            }
            f.write_str(">")?;
        }

        if !self.fields.is_empty() {
            f.write_str("(")?;
            for (i, (name, field)) in self.fields.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{name} {field}")?;
            }
            f.write_str(")")?;
        }

        if !self.nullable {
            f.write_str(" NOT NULL")?;
        }

        Ok(())
    }
}
