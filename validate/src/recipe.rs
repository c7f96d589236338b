//! Models that are handed to the engine under test

use data::{
    parameters::{ConfigError, Parameters, Quantity},
    Precision,
};
use engine::{
    cell::{CellDescription, CvPolicy, Decor, IonSettings, LabelDict, Mechanism, Placeable},
    morphology::{Morphology, MorphologyError, Parent, Point, SegmentTree},
    recipe::{
        CellGid, CellKind, Connection, EventGenerator, GlobalProperties, IonProperties, ProbeKind,
        ProbeSpec, Recipe, SelectionPolicy,
    },
    schedule::Schedule,
    Time,
};
use std::ops::Range;
use thiserror::Error;

/// Point mechanism injecting particles into the diffusing ion
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum InjectionMechanism {
    /// Injects `alpha` particles per event
    NormAmount,

    /// Injects `alpha` particles per event, normalized by the volume of the
    /// control volume it sits in
    NormConcentration,
}
//
impl InjectionMechanism {
    /// Mechanism matching the quantity which the reference solver tracks
    pub fn for_quantity(quantity: Quantity) -> Self {
        match quantity {
            Quantity::Amount => Self::NormAmount,
            Quantity::Concentration => Self::NormConcentration,
        }
    }

    /// Catalogue name
    pub fn name(self) -> &'static str {
        match self {
            Self::NormAmount => "inject_norm_amount",
            Self::NormConcentration => "inject_norm_concentration",
        }
    }

    /// Inverse of [`name()`](Self::name)
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::NormAmount, Self::NormConcentration]
            .into_iter()
            .find(|mechanism| mechanism.name() == name)
    }
}

/// Label of the injection synapse of segment `idx`
pub fn synapse_label(idx: usize) -> String {
    format!("syn_{idx}")
}

/// Single straight cable where particles of one ion are injected at t = 0
/// into a range of segments, then left to diffuse
///
/// Each grid cell of the reference solver maps to one cylindrical segment
/// tagged with its index, and the discretization policy makes every segment
/// one control volume.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffusionRecipe {
    cell: CellDescription,
    probe: ProbeSpec,
    stimulus: Range<usize>,
    properties: GlobalProperties,
}
//
impl DiffusionRecipe {
    /// Describe the same experiment as a reference solver run with `params`
    pub fn new(params: &Parameters, ion: &str) -> Result<Self, RecipeError> {
        params.validate()?;
        let dx = params.cell_width();

        // One segment per grid cell, laid along the x axis and centered on 0
        let mut tree = SegmentTree::new();
        let mut labels = LabelDict::new();
        let mut parent = Parent::Root;
        let start = -params.length / 2.0;
        for idx in 0..params.num_cells {
            let tag = i32::try_from(idx).map_err(|_| RecipeError::TooManySegments(idx))?;
            let proximal = Point::on_x_axis(start + idx as Precision * dx, params.radius);
            let distal = Point::on_x_axis(start + (idx + 1) as Precision * dx, params.radius);
            parent = Parent::Segment(tree.append(parent, proximal, distal, tag)?);
            labels.insert(format!("dendrite_{idx}"), format!("(tag {idx})"));
        }
        let morphology = Morphology::new(tree)?;

        // Diffusive ion with an injection synapse on each stimulated segment
        let mut decor = Decor::new();
        decor.set_ion(IonSettings {
            ion: ion.to_owned(),
            internal_concentration: 0.0,
            diffusivity: Some(params.diffusion_constant),
        });
        let injection = InjectionMechanism::for_quantity(params.quantity);
        for idx in params.stimulus.clone() {
            let mechanism = Mechanism::new(injection.name())
                .with_parameter("alpha", params.inject_amount)
                .with_ion_renaming(ion);
            decor.place(
                format!("(on-components 0.5 (region \"dendrite_{idx}\"))"),
                Placeable::Synapse(mechanism),
                synapse_label(idx),
            );
        }

        let mut properties = GlobalProperties::with_default_catalogue();
        properties.set_ion(
            ion,
            IonProperties {
                valence: 1,
                internal_concentration: 0.0,
                external_concentration: 0.0,
                reversal_potential: 0.0,
            },
        );

        log::debug!(
            "Described a {}-segment diffusion cable with {} injection sites",
            params.num_cells,
            params.stimulus.len()
        );
        Ok(Self {
            cell: CellDescription {
                morphology,
                decor,
                labels,
                discretization: Some(CvPolicy::MaxExtent(dx)),
            },
            probe: ProbeSpec {
                kind: ProbeKind::IonDiffConcentrationCell {
                    ion: ion.to_owned(),
                },
                tag: format!("tag_{ion}"),
            },
            stimulus: params.stimulus.clone(),
            properties,
        })
    }

    /// Tag of the probe measuring the diffusive ion along the whole cell
    pub fn probe_tag(&self) -> &str {
        &self.probe.tag
    }

    /// Segments which receive an injection
    pub fn stimulus(&self) -> Range<usize> {
        self.stimulus.clone()
    }
}
//
impl Recipe for DiffusionRecipe {
    fn cell_count(&self) -> CellGid {
        1
    }

    fn cell_kind(&self, _gid: CellGid) -> CellKind {
        CellKind::Cable
    }

    fn describe_cell(&self, _gid: CellGid) -> CellDescription {
        self.cell.clone()
    }

    fn probes_for(&self, _gid: CellGid) -> Vec<ProbeSpec> {
        vec![self.probe.clone()]
    }

    fn generators_for(&self, _gid: CellGid) -> Vec<EventGenerator> {
        self.stimulus
            .clone()
            .map(|idx| EventGenerator {
                target: synapse_label(idx),
                weight: 1.0,
                schedule: Schedule::once(0.0),
            })
            .collect()
    }

    fn global_properties(&self, _kind: CellKind) -> GlobalProperties {
        self.properties.clone()
    }

    fn target_count(&self, _gid: CellGid) -> usize {
        self.stimulus.len()
    }
}

/// Two Hodgkin-Huxley somata, the first one driving a plastic synapse on the
/// second through a connection of configurable delay
///
/// Zero-delay connections used to go wrong in the engine, so this model is
/// kept around to exercise them.
#[derive(Clone, Debug, PartialEq)]
pub struct SpikeRelayRecipe {
    delay: Time,
    cells: [CellDescription; 2],
    properties: GlobalProperties,
}
//
impl SpikeRelayRecipe {
    /// Label of the spike detector present on both cells
    pub const DETECTOR: &'static str = "spike_detector";

    /// Label of the plastic synapse on the postsynaptic cell
    pub const SYNAPSE: &'static str = "expsyn_stdp_post";

    /// Set up the model, rejecting negative or non-finite delays
    pub fn new(delay: Time) -> Result<Self, RecipeError> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(RecipeError::InvalidDelay(delay));
        }
        Ok(Self {
            delay,
            cells: [Self::soma(false)?, Self::soma(true)?],
            properties: GlobalProperties::with_default_catalogue(),
        })
    }

    /// Delay of the connection between the two cells (ms)
    pub fn delay(&self) -> Time {
        self.delay
    }

    /// Spherical-ish soma with a spike detector, plus the plastic synapse on
    /// the postsynaptic side
    fn soma(postsynaptic: bool) -> Result<CellDescription, RecipeError> {
        let radius = 1.0;
        let mut tree = SegmentTree::new();
        tree.append(
            Parent::Root,
            Point::on_x_axis(-radius, radius),
            Point::on_x_axis(radius, radius),
            1,
        )?;

        let mut decor = Decor::new();
        if postsynaptic {
            decor.place(
                "\"center\"",
                Placeable::Synapse(Mechanism::new("expsyn_stdp")),
                Self::SYNAPSE,
            );
        }
        decor
            .place("\"center\"", Placeable::ThresholdDetector(1.0), Self::DETECTOR)
            .paint("(all)", Mechanism::new("hh"));

        Ok(CellDescription {
            morphology: Morphology::new(tree)?,
            decor,
            labels: LabelDict::from([("center".to_owned(), "(location 0 0.5)".to_owned())]),
            discretization: None,
        })
    }
}
//
impl Recipe for SpikeRelayRecipe {
    fn cell_count(&self) -> CellGid {
        2
    }

    fn cell_kind(&self, _gid: CellGid) -> CellKind {
        CellKind::Cable
    }

    fn describe_cell(&self, gid: CellGid) -> CellDescription {
        self.cells[usize::from(gid == 1)].clone()
    }

    fn connections_for(&self, gid: CellGid) -> Vec<Connection> {
        if gid == 1 {
            vec![Connection {
                source: (0, Self::DETECTOR.to_owned()),
                target: Self::SYNAPSE.to_owned(),
                policy: SelectionPolicy::Univalent,
                weight: 0.0,
                delay: self.delay,
            }]
        } else {
            Vec::new()
        }
    }

    fn probes_for(&self, gid: CellGid) -> Vec<ProbeSpec> {
        let mut probes = vec![ProbeSpec {
            kind: ProbeKind::MembraneVoltage {
                locset: "\"center\"".to_owned(),
            },
            tag: "voltage".to_owned(),
        }];
        if gid == 1 {
            probes.push(ProbeSpec {
                kind: ProbeKind::PointState {
                    target: 0,
                    mechanism: "expsyn_stdp".to_owned(),
                    state: "weight_plastic".to_owned(),
                },
                tag: "weight_plastic".to_owned(),
            });
        }
        probes
    }

    fn generators_for(&self, gid: CellGid) -> Vec<EventGenerator> {
        if gid == 1 {
            vec![EventGenerator {
                target: Self::SYNAPSE.to_owned(),
                weight: 0.0,
                schedule: Schedule::Explicit((1..=6).map(Time::from).collect()),
            }]
        } else {
            Vec::new()
        }
    }

    fn global_properties(&self, _kind: CellKind) -> GlobalProperties {
        self.properties.clone()
    }

    // Both cells carry a detector, and cell 0's feeds the connection
    fn source_count(&self, _gid: CellGid) -> usize {
        1
    }

    fn target_count(&self, gid: CellGid) -> usize {
        usize::from(gid == 1)
    }
}

/// Reasons why a model cannot be described
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RecipeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Morphology(#[from] MorphologyError),

    #[error("segment {0} cannot be given an integer tag")]
    TooManySegments(usize),

    #[error("connection delay must be a nonnegative duration, got {0} ms")]
    InvalidDelay(Time),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diffusion_cable() {
        let params = Parameters::default();
        let recipe = DiffusionRecipe::new(&params, "my_ion").unwrap();
        assert_eq!(recipe.cell_count(), 1);
        assert_eq!(recipe.probe_tag(), "tag_my_ion");
        assert_eq!(recipe.target_count(0), 20);

        let cell = recipe.describe_cell(0);
        let segments = cell.morphology.segments();
        assert_eq!(segments.len(), 100);
        assert_eq!(segments[0].parent, Parent::Root);
        assert!((segments[0].proximal.x + 5.0).abs() < 1e-12);
        assert!((segments[99].distal.x - 5.0).abs() < 1e-12);
        assert!((cell.morphology.total_length() - params.length).abs() < 1e-9);
        assert_eq!(cell.labels["dendrite_42"], "(tag 42)");
        assert_eq!(cell.discretization, Some(CvPolicy::MaxExtent(params.cell_width())));
        assert_eq!(cell.decor.ion("my_ion").unwrap().diffusivity, Some(1e-9));

        let placements = cell.decor.placements();
        assert_eq!(placements.len(), 20);
        assert_eq!(placements[0].label, "syn_40");
        assert_eq!(
            placements[0].locset,
            "(on-components 0.5 (region \"dendrite_40\"))"
        );
        let Placeable::Synapse(mechanism) = &placements[0].item else {
            panic!("expected an injection synapse");
        };
        assert_eq!(mechanism.name, "inject_norm_amount/x=my_ion");
        assert_eq!(mechanism.parameter("alpha"), Some(1.0));

        let generators = recipe.generators_for(0);
        assert_eq!(generators.len(), 20);
        assert_eq!(generators[19].target, "syn_59");
        assert_eq!(generators[19].schedule.times_until(1.0), vec![0.0]);

        let properties = recipe.global_properties(CellKind::Cable);
        assert_eq!(properties.ions["my_ion"].valence, 1);
    }

    #[test]
    fn concentration_uses_normalizing_mechanism() {
        let params = Parameters {
            quantity: Quantity::Concentration,
            ..Parameters::default()
        };
        let recipe = DiffusionRecipe::new(&params, "x").unwrap();
        let cell = recipe.describe_cell(0);
        let Placeable::Synapse(mechanism) = &cell.decor.placements()[0].item else {
            panic!("expected an injection synapse");
        };
        assert_eq!(
            InjectionMechanism::from_name(mechanism.base_name()),
            Some(InjectionMechanism::NormConcentration)
        );
    }

    #[test]
    fn invalid_parameters() {
        let params = Parameters {
            stimulus: 50..120,
            ..Parameters::default()
        };
        assert!(matches!(
            DiffusionRecipe::new(&params, "x"),
            Err(RecipeError::Config(ConfigError::StimulusOutOfRange { .. }))
        ));
    }

    #[test]
    fn spike_relay() {
        assert_eq!(
            SpikeRelayRecipe::new(-0.1),
            Err(RecipeError::InvalidDelay(-0.1))
        );

        let recipe = SpikeRelayRecipe::new(0.0).unwrap();
        assert_eq!(recipe.cell_count(), 2);
        assert!(recipe.connections_for(0).is_empty());
        let connections = recipe.connections_for(1);
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].delay, 0.0);
        assert_eq!(connections[0].source, (0, SpikeRelayRecipe::DETECTOR.to_owned()));

        assert_eq!(recipe.probes_for(0).len(), 1);
        assert_eq!(recipe.probes_for(1).len(), 2);
        assert_eq!(recipe.target_count(0), 0);
        assert_eq!(recipe.target_count(1), 1);
        for gid in 0..recipe.cell_count() {
            let detectors = recipe
                .describe_cell(gid)
                .decor
                .placements()
                .iter()
                .filter(|placement| matches!(placement.item, Placeable::ThresholdDetector(_)))
                .count();
            assert_eq!(recipe.source_count(gid), detectors, "cell {gid}");
        }

        let presynaptic = recipe.describe_cell(0);
        assert_eq!(presynaptic.decor.placements().len(), 1);
        assert_eq!(presynaptic.decor.paintings()[0].mechanism.name, "hh");
        let postsynaptic = recipe.describe_cell(1);
        assert_eq!(postsynaptic.decor.placements().len(), 2);

        let generators = recipe.generators_for(1);
        assert_eq!(
            generators[0].schedule.times_until(10.0),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }
}
