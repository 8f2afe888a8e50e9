//! Dump scope masks
//!
//! A `DumpMask` selects which SQL sections are emitted for one table;
//! `TableMasks` maps table names to masks with a mandatory `*` default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use super::{DumpError, DumpResult};

/// Key of the default entry in a `TableMasks` map
pub const WILDCARD: &str = "*";

/// Bitmask of SQL sections to emit for a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DumpMask(u8);

impl DumpMask {
    /// Emit nothing
    pub const NONE: DumpMask = DumpMask(0);
    /// `DROP {TABLE|VIEW} IF EXISTS`
    pub const DROP: DumpMask = DumpMask(1);
    /// The engine's own `CREATE` statement
    pub const CREATE: DumpMask = DumpMask(2);
    /// Row data as batched `INSERT` statements
    pub const DATA: DumpMask = DumpMask(4);
    /// Triggers (reserved, nothing is emitted yet)
    pub const TRIGGER: DumpMask = DumpMask(8);
    /// Every section
    pub const ALL: DumpMask = DumpMask(15);

    /// Build a mask from raw bits, discarding unknown ones
    pub fn from_bits(bits: u8) -> Self {
        DumpMask(bits & Self::ALL.0)
    }

    /// Raw bits
    pub fn bits(self) -> u8 {
        self.0
    }

    /// True when every bit of `other` is set in `self`
    pub fn contains(self, other: DumpMask) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// True for `NONE`
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for DumpMask {
    fn default() -> Self {
        DumpMask::ALL
    }
}

impl BitOr for DumpMask {
    type Output = DumpMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        DumpMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for DumpMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for DumpMask {
    type Output = DumpMask;

    fn bitand(self, rhs: Self) -> Self::Output {
        DumpMask(self.0 & rhs.0)
    }
}

impl std::str::FromStr for DumpMask {
    type Err = String;

    /// Parse `all`, `none`, a section name, a `|`/`,`/`+` separated
    /// combination of section names, or a decimal bit value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(bits) = s.parse::<u8>() {
            if bits > Self::ALL.0 {
                return Err(format!("Mask value out of range: {}", bits));
            }
            return Ok(DumpMask(bits));
        }

        let mut mask = DumpMask::NONE;
        for part in s.split(['|', ',', '+']) {
            mask |= match part.trim().to_lowercase().as_str() {
                "none" => DumpMask::NONE,
                "drop" => DumpMask::DROP,
                "create" => DumpMask::CREATE,
                "data" => DumpMask::DATA,
                "trigger" => DumpMask::TRIGGER,
                "all" => DumpMask::ALL,
                other => return Err(format!("Unknown dump section: {}", other)),
            };
        }
        Ok(mask)
    }
}

impl fmt::Display for DumpMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DumpMask::NONE => return write!(f, "none"),
            DumpMask::ALL => return write!(f, "all"),
            _ => {}
        }
        let names: Vec<&str> = [
            (DumpMask::DROP, "drop"),
            (DumpMask::CREATE, "create"),
            (DumpMask::DATA, "data"),
            (DumpMask::TRIGGER, "trigger"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        write!(f, "{}", names.join("|"))
    }
}

/// Parse a mask, reporting failures as `DumpError::InvalidMask`
pub fn parse_mask(s: &str) -> DumpResult<DumpMask> {
    s.parse().map_err(DumpError::InvalidMask)
}

/// Per-table dump masks with a guaranteed `*` default entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMasks {
    masks: BTreeMap<String, DumpMask>,
}

impl TableMasks {
    /// Every table dumped with `ALL`
    pub fn new() -> Self {
        Self::from_map(BTreeMap::new())
    }

    /// Build from an explicit map, adding `* = ALL` if the map lacks it
    pub fn from_map(mut masks: BTreeMap<String, DumpMask>) -> Self {
        masks.entry(WILDCARD.to_string()).or_insert(DumpMask::ALL);
        Self { masks }
    }

    /// Set the mask of one table (or of `*`)
    pub fn set(&mut self, table: impl Into<String>, mask: DumpMask) {
        self.masks.insert(table.into(), mask);
    }

    /// Mask applied to `table`: its own entry, else the wildcard
    pub fn mask_for(&self, table: &str) -> DumpMask {
        self.masks
            .get(table)
            .or_else(|| self.masks.get(WILDCARD))
            .copied()
            .unwrap_or(DumpMask::ALL)
    }

    /// The wildcard mask
    pub fn default_mask(&self) -> DumpMask {
        self.mask_for(WILDCARD)
    }

    /// Iterate over all entries, wildcard included
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DumpMask)> {
        self.masks.iter()
    }

    /// Number of entries, wildcard included
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// Always false: the wildcard entry is always present
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

impl Default for TableMasks {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>> FromIterator<(K, DumpMask)> for TableMasks {
    fn from_iter<I: IntoIterator<Item = (K, DumpMask)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
