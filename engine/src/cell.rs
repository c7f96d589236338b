//! Cable cell descriptions: mechanisms, decorations and discretization

use crate::morphology::Morphology;
use data::Precision;
use std::collections::BTreeMap;

/// Named mechanism from the engine's catalogue, with parameter overrides
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mechanism {
    /// Catalogue name, possibly with an ion renaming suffix
    pub name: String,

    /// Parameter overrides, by parameter name
    pub parameters: BTreeMap<String, Precision>,
}
//
impl Mechanism {
    /// Mechanism with default parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Override one parameter
    pub fn with_parameter(mut self, name: impl Into<String>, value: Precision) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Bind the mechanism's generic ion `x` to a concrete ion species
    pub fn with_ion_renaming(mut self, ion: &str) -> Self {
        self.name = format!("{}/x={ion}", self.name);
        self
    }

    /// Catalogue name without any ion renaming suffix
    pub fn base_name(&self) -> &str {
        self.name.split('/').next().unwrap_or(&self.name)
    }

    /// Value of a parameter override, if any
    pub fn parameter(&self, name: &str) -> Option<Precision> {
        self.parameters.get(name).copied()
    }
}

/// Per-cell ion settings
#[derive(Clone, Debug, PartialEq)]
pub struct IonSettings {
    /// Ion species name
    pub ion: String,

    /// Initial internal concentration (mM)
    pub internal_concentration: Precision,

    /// Diffusivity (m²/s), if the ion diffuses along the cable
    pub diffusivity: Option<Precision>,
}

/// Things that can be placed at a point of a cell
#[derive(Clone, Debug, PartialEq)]
pub enum Placeable {
    /// Point mechanism that receives events
    Synapse(Mechanism),

    /// Spike source triggering when the membrane voltage crosses a threshold (mV)
    ThresholdDetector(Precision),
}

/// Placement of a [`Placeable`] on a locset
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    /// Locset expression
    pub locset: String,

    /// What gets placed
    pub item: Placeable,

    /// Label through which the placed item can be targeted
    pub label: String,
}

/// Density mechanism painted over a region
#[derive(Clone, Debug, PartialEq)]
pub struct Painting {
    /// Region expression
    pub region: String,

    /// Density mechanism
    pub mechanism: Mechanism,
}

/// Everything that is added on top of a cell's morphology
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decor {
    ions: Vec<IonSettings>,
    placements: Vec<Placement>,
    paintings: Vec<Painting>,
}
//
impl Decor {
    /// Set up an empty decor
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the settings of an ion species, replacing earlier settings
    pub fn set_ion(&mut self, settings: IonSettings) -> &mut Self {
        self.ions.retain(|ion| ion.ion != settings.ion);
        self.ions.push(settings);
        self
    }

    /// Place an item on a locset under a label
    pub fn place(
        &mut self,
        locset: impl Into<String>,
        item: Placeable,
        label: impl Into<String>,
    ) -> &mut Self {
        self.placements.push(Placement {
            locset: locset.into(),
            item,
            label: label.into(),
        });
        self
    }

    /// Paint a density mechanism over a region
    pub fn paint(&mut self, region: impl Into<String>, mechanism: Mechanism) -> &mut Self {
        self.paintings.push(Painting {
            region: region.into(),
            mechanism,
        });
        self
    }

    /// Ion settings overrides
    pub fn ions(&self) -> &[IonSettings] {
        &self.ions
    }

    /// Settings of one ion species, if overridden
    pub fn ion(&self, name: &str) -> Option<&IonSettings> {
        self.ions.iter().find(|ion| ion.ion == name)
    }

    /// Placed items, in placement order
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Painted mechanisms, in painting order
    pub fn paintings(&self) -> &[Painting] {
        &self.paintings
    }
}

/// Named region and locset expressions
pub type LabelDict = BTreeMap<String, String>;

/// How a cell is cut into control volumes
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CvPolicy {
    /// Control volumes no longer than this (µm)
    MaxExtent(Precision),

    /// Fixed number of control volumes per branch
    FixedPerBranch(usize),
}

/// Full description of a cable cell
#[derive(Clone, Debug, PartialEq)]
pub struct CellDescription {
    pub morphology: Morphology,
    pub decor: Decor,
    pub labels: LabelDict,
    pub discretization: Option<CvPolicy>,
}
