//! Physical traits the planner attaches to plan nodes.
//!
//! Trait definitions are process-wide singletons in a planner, so they are
//! written as a single byte naming the definition rather than by structure.

use std::fmt;

use crate::{
    Identifiable, Payload, Result, error::Error, input::Input,
    output::Output,
};

/// The definition a [`PlanTrait`] belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Identifiable,
)]
pub enum TraitDef {
    /// The calling convention, e.g. logical or physical.
    Convention,

    /// The sort order of the rows.
    Collation,

    /// How the rows are spread across the executors.
    Distribution,
}

impl TraitDef {
    const fn tag(self) -> u8 {
        match self {
            Self::Convention => 0,
            Self::Collation => 1,
            Self::Distribution => 2,
        }
    }
}

impl fmt::Display for TraitDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Convention => "convention",
            Self::Collation => "collation",
            Self::Distribution => "distribution",
        })
    }
}

impl Payload for TraitDef {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        Ok(output.encoder().emit_u8(self.tag())?)
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        match input.decoder().read_u8()? {
            0 => Ok(Self::Convention),
            1 => Ok(Self::Collation),
            2 => Ok(Self::Distribution),
            tag => Err(Error::UnknownTag { what: "trait definition", tag }),
        }
    }
}

/// Sort direction of one field of a collation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Identifiable, Payload,
)]
#[allow(missing_docs)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// Where `NULL` values sort.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Identifiable, Payload,
)]
#[allow(missing_docs)]
pub enum NullOrdering {
    First,
    #[default]
    Last,
}

/// One field of a collation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Identifiable, Payload)]
pub struct FieldCollation {
    /// The ordinal of the sorted field.
    pub field: u32,

    /// The sort direction.
    pub direction: Direction,

    /// The position of `NULL` values.
    pub nulls: NullOrdering,
}

impl FieldCollation {
    /// Sorts `field` ascending with nulls last.
    #[must_use]
    pub const fn ascending(field: u32) -> Self {
        Self {
            field,
            direction: Direction::Ascending,
            nulls: NullOrdering::Last,
        }
    }
}

/// How rows are distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Identifiable, Payload)]
#[allow(missing_docs)]
pub enum DistributionKind {
    Singleton,
    HashPartitioned,
    RangePartitioned,
    RoundRobin,
    Broadcast,
    Any,
}

/// A trait instance attached to a plan node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Identifiable, Payload)]
pub enum PlanTrait {
    /// The node's calling convention, by name.
    Convention(String),

    /// The node's output ordering.
    Collation(Vec<FieldCollation>),

    /// The node's output distribution.
    Distribution {
        /// The distribution kind.
        kind: DistributionKind,
        /// The fields the distribution is keyed on.
        keys: Vec<u32>,
    },
}

impl PlanTrait {
    /// Returns the definition this trait instance belongs to.
    #[must_use]
    pub const fn definition(&self) -> TraitDef {
        match self {
            Self::Convention(_) => TraitDef::Convention,
            Self::Collation(_) => TraitDef::Collation,
            Self::Distribution { .. } => TraitDef::Distribution,
        }
    }
}
