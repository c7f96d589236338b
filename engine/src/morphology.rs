//! Cell geometry, as a tree of cylindrical segments

use data::Precision;
use thiserror::Error;

/// Point in space with an associated cable radius (all in µm)
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: Precision,
    pub y: Precision,
    pub z: Precision,
    pub radius: Precision,
}
//
impl Point {
    /// Point on the x axis
    pub fn on_x_axis(x: Precision, radius: Precision) -> Self {
        Self {
            x,
            y: 0.0,
            z: 0.0,
            radius,
        }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Self) -> Precision {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }
}

/// Index of a segment within its [`SegmentTree`]
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SegmentId(pub usize);

/// Attachment point of a new segment
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Parent {
    /// Start a new root
    Root,

    /// Attach to the distal end of an existing segment
    Segment(SegmentId),
}

/// Truncated cone between two points
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub parent: Parent,
    pub proximal: Point,
    pub distal: Point,

    /// User-defined identifier, used by `(tag N)` region expressions
    pub tag: i32,
}
//
impl Segment {
    /// Axial length of the segment
    pub fn length(&self) -> Precision {
        self.proximal.distance(&self.distal)
    }
}

/// Segments of a cell, in insertion order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentTree {
    segments: Vec<Segment>,
}
//
impl SegmentTree {
    /// Set up an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a segment and return its identifier
    ///
    /// Parents must already be part of the tree, which guarantees that the
    /// segments form a tree.
    pub fn append(
        &mut self,
        parent: Parent,
        proximal: Point,
        distal: Point,
        tag: i32,
    ) -> Result<SegmentId, MorphologyError> {
        if let Parent::Segment(SegmentId(idx)) = parent {
            if idx >= self.segments.len() {
                return Err(MorphologyError::UnknownParent(idx));
            }
        }
        self.segments.push(Segment {
            parent,
            proximal,
            distal,
            tag,
        });
        Ok(SegmentId(self.segments.len() - 1))
    }

    /// Segments in insertion order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the tree has no segment
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Finalized cell geometry
#[derive(Clone, Debug, PartialEq)]
pub struct Morphology(SegmentTree);
//
impl Morphology {
    /// Finalize a segment tree, which must not be empty
    pub fn new(tree: SegmentTree) -> Result<Self, MorphologyError> {
        if tree.is_empty() {
            return Err(MorphologyError::Empty);
        }
        Ok(Self(tree))
    }

    /// Segments in insertion order
    pub fn segments(&self) -> &[Segment] {
        self.0.segments()
    }

    /// Segments carrying a given tag
    pub fn tagged(&self, tag: i32) -> impl Iterator<Item = &Segment> + '_ {
        self.segments().iter().filter(move |segment| segment.tag == tag)
    }

    /// Summed length of all segments
    pub fn total_length(&self) -> Precision {
        self.segments().iter().map(Segment::length).sum()
    }
}

/// Geometry construction errors
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MorphologyError {
    #[error("parent segment {0} does not exist")]
    UnknownParent(usize),

    #[error("a morphology needs at least one segment")]
    Empty,
}
