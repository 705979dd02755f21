//! Taxonomic rank schema and lineage values.
//!
//! This module provides the fixed rank ordering shared by all classifier
//! outputs and the typed value model used in place of repeated
//! string-sentinel comparisons.

pub mod consensus;
pub mod normalize;

pub use consensus::merge_lineages;
pub use normalize::{LineageSource, SourceStyle, SOURCES};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Taxonomic ranks covered by the consensus schema, shallow to deep.
///
/// The order is fixed and significant: consensus merging walks this
/// sequence, and serialized lineages list the six values in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl Rank {
    /// All ranks in hierarchical order.
    pub const ALL: [Rank; 6] = [
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];

    /// Returns a string representation of the rank.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Phylum => "phylum",
            Rank::Class => "class",
            Rank::Order => "order",
            Rank::Family => "family",
            Rank::Genus => "genus",
            Rank::Species => "species",
        }
    }

    /// Position of this rank in the hierarchy (0 = phylum).
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// A single rank assignment from one classifier.
///
/// The upstream tools mark absent assignments with a small set of string
/// sentinels; parsing them into a typed value keeps that sentinel set in
/// one place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankValue {
    /// No assignment at this rank.
    #[default]
    Missing,
    /// The classifier reached the rank but declined to call it.
    NoSupport,
    /// A concrete taxon name.
    Value(String),
}

impl RankValue {
    /// Classifies one cleaned lineage field.
    ///
    /// Empty strings, `"nan"`, and `"None"` map to `Missing`;
    /// `"no support"` maps to `NoSupport`; anything else is a taxon name.
    pub fn parse(field: &str) -> Self {
        match field {
            "" | "nan" | "None" => RankValue::Missing,
            "no support" => RankValue::NoSupport,
            value => RankValue::Value(value.to_string()),
        }
    }

    /// True iff this is a concrete taxon name.
    pub fn is_valid(&self) -> bool {
        matches!(self, RankValue::Value(_))
    }

    /// The taxon name, or the empty string for non-assignments.
    pub fn as_str(&self) -> &str {
        match self {
            RankValue::Value(name) => name,
            RankValue::Missing | RankValue::NoSupport => "",
        }
    }
}

/// An ordered assignment of rank values from phylum to species.
///
/// All six slots are always present; a rank without a concrete taxon name
/// holds `Missing` or `NoSupport` and renders as an empty field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    values: [RankValue; 6],
}

impl Lineage {
    /// Creates a fully empty lineage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value at `rank`.
    pub fn get(&self, rank: Rank) -> &RankValue {
        &self.values[rank.index()]
    }

    /// Sets the value at `rank`.
    pub fn set(&mut self, rank: Rank, value: RankValue) {
        self.values[rank.index()] = value;
    }

    /// The deepest rank holding a concrete taxon name, scanning species up
    /// to phylum. `None` means the lineage is fully empty.
    pub fn deepest_valid(&self) -> Option<Rank> {
        Rank::ALL
            .iter()
            .rev()
            .find(|rank| self.get(**rank).is_valid())
            .copied()
    }

    /// True iff no rank holds a concrete taxon name.
    pub fn is_empty(&self) -> bool {
        self.deepest_valid().is_none()
    }
}

impl fmt::Display for Lineage {
    /// Serializes the six rank values joined by `;`, non-assignments empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = Rank::ALL.iter().map(|rank| self.get(*rank).as_str()).collect();
        write!(f, "{}", parts.join(";"))
    }
}
