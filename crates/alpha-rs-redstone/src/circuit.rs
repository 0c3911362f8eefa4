//! Circuit variants: the four gate kinds and their connectivity rules.
//!
//! A circuit is one gate at one coordinate. Edges between circuits are stored
//! as coordinates, never references; every dereference goes through the
//! [`crate::asic::Asic`] map, which is the sole owner of all circuits.

use std::collections::BTreeSet;

use alpha_rs_blocks::face::Face;

use crate::codec::{self, RedstoneSlots};

/// Voxel coordinate.
pub type Coords = (i32, i32, i32);

/// Horizontal neighbor offsets (4-directional).
pub const H_NEIGHBORS: [(i32, i32, i32); 4] = [(-1, 0, 0), (1, 0, 0), (0, 0, -1), (0, 0, 1)];

/// The four primitive gate kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// The ubiquitous conductor of current. Propagates the boolean sum of its
    /// drivers; its real operator is "am I driven by anything?".
    Wire,
    /// Any solid block without redstone in it. Energised by levers and wires,
    /// read by the torches mounted on it.
    Plain,
    /// Inverts the block it is mounted on.
    Torch,
    /// A settable latch. Output only, to its mounting block.
    Lever,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Wire => "wire",
            Kind::Plain => "plain",
            Kind::Torch => "torch",
            Kind::Lever => "lever",
        }
    }

    /// The static traceability matrix: may `self` drive signal into
    /// `downstream` across a block boundary?
    ///
    /// A lever energises its mounting block; an energised block drives the
    /// wire beside it; wire weakly energises plain blocks (so mounted torches
    /// see them); a plain block feeds the torch mounted on it; a torch drives
    /// the wires beside it.
    pub fn drives(self, downstream: Kind) -> bool {
        matches!(
            (self, downstream),
            (Kind::Wire, Kind::Plain)
                | (Kind::Plain, Kind::Wire)
                | (Kind::Plain, Kind::Torch)
                | (Kind::Torch, Kind::Wire)
                | (Kind::Lever, Kind::Plain)
        )
    }
}

/// A materialised gate at one coordinate.
///
/// `inputs` and `outputs` hold the coordinates of upstream and downstream
/// circuits; `BTreeSet` fixes the lexicographic iteration order the
/// propagator's determinism contract relies on. The stored `(block,
/// metadata)` pair is the gate's current world representation, updated as its
/// status changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    pub coords: Coords,
    pub kind: Kind,
    /// Mounting face, fixed at construction. `Some` for Torch and Lever.
    pub orientation: Option<Face>,
    pub(crate) status: bool,
    pub(crate) block: u8,
    pub(crate) metadata: u8,
    pub(crate) inputs: BTreeSet<Coords>,
    pub(crate) outputs: BTreeSet<Coords>,
}

impl Circuit {
    fn new(
        coords: Coords,
        kind: Kind,
        orientation: Option<Face>,
        block: u8,
        metadata: u8,
        status: bool,
    ) -> Self {
        Self {
            coords,
            kind,
            orientation,
            status,
            block,
            metadata,
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
        }
    }

    /// A wire circuit; status reads from the signal nibble.
    pub fn wire(slots: &RedstoneSlots, coords: Coords, metadata: u8) -> Self {
        let status = codec::bbool(slots, slots.wire, metadata);
        Self::new(coords, Kind::Wire, None, slots.wire, metadata, status)
    }

    /// A plain conducting block. Starts unenergised.
    pub fn plain(coords: Coords, block: u8) -> Self {
        Self::new(coords, Kind::Plain, None, block, 0, false)
    }

    /// A torch mounted against `orientation`; `lit` picks the block slot.
    pub fn torch(
        slots: &RedstoneSlots,
        coords: Coords,
        metadata: u8,
        orientation: Face,
        lit: bool,
    ) -> Self {
        let block = if lit { slots.torch } else { slots.torch_off };
        Self::new(coords, Kind::Torch, Some(orientation), block, metadata, lit)
    }

    /// A lever mounted against `orientation`; status reads from the latch bit.
    pub fn lever(slots: &RedstoneSlots, coords: Coords, metadata: u8, orientation: Face) -> Self {
        let status = codec::bbool(slots, slots.lever, metadata);
        Self::new(
            coords,
            Kind::Lever,
            Some(orientation),
            slots.lever,
            metadata,
            status,
        )
    }

    pub fn status(&self) -> bool {
        self.status
    }

    /// Current world representation of this gate.
    pub fn block(&self) -> (u8, u8) {
        (self.block, self.metadata)
    }

    /// Coordinates of upstream circuits.
    pub fn inputs(&self) -> &BTreeSet<Coords> {
        &self.inputs
    }

    /// Coordinates of downstream circuits.
    pub fn outputs(&self) -> &BTreeSet<Coords> {
        &self.outputs
    }

    /// The block an oriented gate is mounted on: one step against the
    /// orientation. `None` for unoriented kinds.
    pub fn anchor(&self) -> Option<Coords> {
        let (dx, dy, dz) = self.orientation?.delta();
        let (x, y, z) = self.coords;
        Some((x - dx, y - dy, z - dz))
    }

    /// Coordinates that could hold a driver of this gate.
    ///
    /// Plain blocks also look up: a lever or torch mounted on top of them
    /// lives above, outside the horizontal ring. Admission is filtered
    /// separately by [`may_drive`].
    pub fn input_candidates(&self) -> Vec<Coords> {
        let (x, y, z) = self.coords;
        match self.kind {
            Kind::Wire => horizontal_ring(x, y, z),
            Kind::Plain => {
                let mut candidates = horizontal_ring(x, y, z);
                candidates.push((x, y + 1, z));
                candidates
            }
            Kind::Torch => self.anchor().into_iter().collect(),
            Kind::Lever => Vec::new(),
        }
    }

    /// Coordinates that could hold a gate driven by this one.
    ///
    /// A torch drives every horizontal neighbor that is not its mounting
    /// block; a lever drives only its mounting block.
    pub fn output_candidates(&self) -> Vec<Coords> {
        let (x, y, z) = self.coords;
        match self.kind {
            Kind::Wire => horizontal_ring(x, y, z),
            Kind::Plain => {
                let mut candidates = horizontal_ring(x, y, z);
                candidates.push((x, y + 1, z));
                candidates
            }
            Kind::Torch => {
                let anchor = self.anchor();
                horizontal_ring(x, y, z)
                    .into_iter()
                    .filter(|&c| Some(c) != anchor)
                    .collect()
            }
            Kind::Lever => self.anchor().into_iter().collect(),
        }
    }

    /// Same gate in the occupancy sense: kind, coordinate, and mounting.
    pub(crate) fn is_same_gate(&self, other: &Circuit) -> bool {
        self.coords == other.coords
            && self.kind == other.kind
            && self.orientation == other.orientation
    }
}

/// Edge admission: may `from` drive signal into `to` across their actual
/// geometry? Combines the kind matrix with the placement rules: oriented
/// gates connect only through their mounting face, unoriented pairs across
/// horizontal adjacency.
pub fn may_drive(from: &Circuit, to: &Circuit) -> bool {
    if !from.kind.drives(to.kind) {
        return false;
    }
    match (from.kind, to.kind) {
        (Kind::Lever, _) => from.anchor() == Some(to.coords),
        (Kind::Torch, _) => from.output_candidates().contains(&to.coords),
        (_, Kind::Torch) => to.anchor() == Some(from.coords),
        _ => is_horizontal_neighbor(from.coords, to.coords),
    }
}

fn horizontal_ring(x: i32, y: i32, z: i32) -> Vec<Coords> {
    H_NEIGHBORS
        .iter()
        .map(|&(dx, dy, dz)| (x + dx, y + dy, z + dz))
        .collect()
}

fn is_horizontal_neighbor(a: Coords, b: Coords) -> bool {
    let (dx, dy, dz) = (a.0 - b.0, a.1 - b.1, a.2 - b.2);
    dy == 0 && dx.abs() + dz.abs() == 1
}
