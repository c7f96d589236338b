//! Model configuration protocol
//!
//! The engine builds a network by querying a [`Recipe`] about each cell.

use crate::{cell::CellDescription, schedule::Schedule, Time};
use data::Precision;
use std::collections::BTreeMap;

/// Global identifier of a cell within a recipe
pub type CellGid = u32;

/// Kinds of cells that the engine can simulate
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum CellKind {
    /// Multicompartment cell with a morphology
    Cable,
}

/// How a connection picks among several items sharing a label
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum SelectionPolicy {
    /// The label must designate exactly one item
    #[default]
    Univalent,
}

/// Incoming connection to a cell
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    /// Presynaptic cell and the label of its spike source
    pub source: (CellGid, String),

    /// Label of the postsynaptic target on the receiving cell
    pub target: String,

    /// How the target label is resolved
    pub policy: SelectionPolicy,

    pub weight: Precision,

    /// Spike propagation delay (ms)
    pub delay: Time,
}

/// Stream of events delivered to a target of a cell
#[derive(Clone, Debug, PartialEq)]
pub struct EventGenerator {
    /// Label of the targeted synapse
    pub target: String,

    pub weight: Precision,

    /// When events are delivered
    pub schedule: Schedule,
}

/// Quantity that a probe measures
#[derive(Clone, Debug, PartialEq)]
pub enum ProbeKind {
    /// Membrane voltage at a locset
    MembraneVoltage {
        /// Locset expression
        locset: String,
    },

    /// State variable of a point mechanism
    PointState {
        /// Index of the targeted synapse
        target: usize,

        /// Mechanism name
        mechanism: String,

        /// State variable name
        state: String,
    },

    /// Diffusive concentration of an ion in every control volume of the cell
    IonDiffConcentrationCell {
        /// Ion species
        ion: String,
    },
}

/// Probe attached to a cell, addressed through its tag
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeSpec {
    pub kind: ProbeKind,
    pub tag: String,
}

/// Physical properties of an ion species
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IonProperties {
    pub valence: i32,

    /// Internal concentration (mM)
    pub internal_concentration: Precision,

    /// External concentration (mM)
    pub external_concentration: Precision,

    /// Reversal potential (mV)
    pub reversal_potential: Precision,
}

/// Properties shared by all cells of a given kind
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalProperties {
    /// Mechanism catalogue to be used
    pub catalogue: String,

    /// Ion species, by name
    pub ions: BTreeMap<String, IonProperties>,
}
//
impl GlobalProperties {
    /// Properties using the engine's default mechanism catalogue
    pub fn with_default_catalogue() -> Self {
        Self {
            catalogue: "default".into(),
            ions: BTreeMap::new(),
        }
    }

    /// Declare or redefine an ion species
    pub fn set_ion(&mut self, name: impl Into<String>, properties: IonProperties) -> &mut Self {
        self.ions.insert(name.into(), properties);
        self
    }
}

/// Description of a model, queried cell by cell
///
/// All queries take the gid of a cell in `0..cell_count()`. Implementations
/// may assume that out-of-range gids are never passed in.
pub trait Recipe {
    /// Number of cells in the model
    fn cell_count(&self) -> CellGid;

    /// Kind of cell `gid`
    fn cell_kind(&self, gid: CellGid) -> CellKind;

    /// Full description of cell `gid`
    fn describe_cell(&self, gid: CellGid) -> CellDescription;

    /// Connections incoming to cell `gid`
    fn connections_for(&self, _gid: CellGid) -> Vec<Connection> {
        Vec::new()
    }

    /// Probes attached to cell `gid`
    fn probes_for(&self, _gid: CellGid) -> Vec<ProbeSpec> {
        Vec::new()
    }

    /// External event streams delivered to cell `gid`
    fn generators_for(&self, _gid: CellGid) -> Vec<EventGenerator> {
        Vec::new()
    }

    /// Properties shared by all cells of kind `kind`
    fn global_properties(&self, kind: CellKind) -> GlobalProperties;

    /// Number of spike sources on cell `gid`
    fn source_count(&self, _gid: CellGid) -> usize {
        0
    }

    /// Number of event targets on cell `gid`
    fn target_count(&self, _gid: CellGid) -> usize {
        0
    }
}
