//! Static data tables (§6 "External Interfaces").
//!
//! Row-oriented reference tables keyed by an integer id: personas, animals,
//! plants, lodes, items, celestial phenomena, sects, names, and regions, plus
//! the two grids (`tile_map`, `region_map`). These are authored externally
//! (CSV loading is out of scope, per §1); the core only needs to list a
//! table's rows and fetch one by id.

use std::collections::BTreeMap;

/// One row of a static data table: an opaque id plus a free-form label.
/// Concrete content (stat blocks, icon paths, etc.) is out of scope; the
/// core only ever needs the id to resolve references from region definitions
/// and action parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRow {
    /// Row id, unique within its table.
    pub id: u32,
    /// Display label.
    pub name: String,
}

/// A single named table of [`StaticRow`]s.
#[derive(Debug, Clone, Default)]
pub struct StaticTable {
    rows: BTreeMap<u32, StaticRow>,
}

impl StaticTable {
    /// Build a table from an iterator of rows. Later rows with a duplicate id
    /// overwrite earlier ones.
    pub fn from_rows(rows: impl IntoIterator<Item = StaticRow>) -> Self {
        let mut table = Self::default();
        for row in rows {
            table.rows.insert(row.id, row);
        }
        table
    }

    /// List every row, in ascending id order.
    pub fn list(&self) -> impl Iterator<Item = &StaticRow> {
        self.rows.values()
    }

    /// Fetch a row by id.
    pub fn get(&self, id: u32) -> Option<&StaticRow> {
        self.rows.get(&id)
    }
}

/// The full set of static reference tables the core may consult.
#[derive(Debug, Clone, Default)]
pub struct StaticDataTables {
    /// Persona archetype table, informing personality generation.
    pub personas: StaticTable,
    /// Huntable animal species table.
    pub animals: StaticTable,
    /// Harvestable plant table.
    pub plants: StaticTable,
    /// Mineable lode table.
    pub lodes: StaticTable,
    /// Tradeable item table.
    pub items: StaticTable,
    /// Celestial phenomena table.
    pub phenomena: StaticTable,
    /// Sect archetype table.
    pub sects: StaticTable,
    /// Given-name pool, used by agent creation.
    pub names: StaticTable,
    /// Region archetype table.
    pub regions: StaticTable,
    /// Per-cell tile-kind grid, row-major.
    pub tile_map: Vec<Vec<i32>>,
    /// Per-cell region-id grid (`-1` for unassigned), row-major.
    pub region_map: Vec<Vec<i32>>,
}
