//! The circuit graph: coordinate-keyed owner of every live circuit.
//!
//! The name comes from the acronym "ASIC": the whole wiring of one world is
//! treated as one application-specific integrated circuit. Edges are kept
//! symmetric at every operation boundary; a failed mutation leaves the map
//! untouched.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use alpha_rs_blocks::catalog::BlockCatalog;
use tracing::debug;

use crate::circuit::{may_drive, Circuit, Coords, Kind};
use crate::codec::{self, RedstoneSlots};
use crate::error::RedstoneError;

/// Outcome of one gate evaluation inside a propagation pass.
#[derive(Debug)]
pub(crate) struct StepResult {
    pub changed: bool,
    /// Snapshot of the gate's outputs in coordinate order.
    pub outputs: Vec<Coords>,
}

/// The circuit graph for one world.
pub struct Asic<C: BlockCatalog> {
    catalog: C,
    slots: RedstoneSlots,
    circuits: BTreeMap<Coords, Circuit>,
}

impl<C: BlockCatalog> Asic<C> {
    /// Build an empty graph over `catalog`, resolving the four redstone
    /// slots up front.
    pub fn new(catalog: C) -> Result<Self, RedstoneError> {
        let slots = RedstoneSlots::resolve(&catalog)?;
        Ok(Self {
            catalog,
            slots,
            circuits: BTreeMap::new(),
        })
    }

    pub fn slots(&self) -> &RedstoneSlots {
        &self.slots
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn get(&self, coords: Coords) -> Option<&Circuit> {
        self.circuits.get(&coords)
    }

    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    /// Enumerate all attached circuits in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = &Circuit> {
        self.circuits.values()
    }

    /// Materialise a circuit for a redstone block, or `None` for anything
    /// the engine does not track by itself. Oriented blocks surface
    /// `BadOrientation` when their metadata does not decode to a face.
    pub fn circuit_from_block(
        &self,
        coords: Coords,
        block: u8,
        metadata: u8,
    ) -> Result<Option<Circuit>, RedstoneError> {
        let slots = &self.slots;
        if block == slots.wire {
            Ok(Some(Circuit::wire(slots, coords, metadata)))
        } else if block == slots.torch || block == slots.torch_off {
            let orientation = self
                .catalog
                .face(block, metadata)
                .ok_or(RedstoneError::BadOrientation { block, metadata })?;
            Ok(Some(Circuit::torch(
                slots,
                coords,
                metadata,
                orientation,
                block == slots.torch,
            )))
        } else if block == slots.lever {
            let orientation = self
                .catalog
                .face(block, metadata)
                .ok_or(RedstoneError::BadOrientation { block, metadata })?;
            Ok(Some(Circuit::lever(slots, coords, metadata, orientation)))
        } else {
            Ok(None)
        }
    }

    /// Materialise a plain conducting block, or `None` when the block cannot
    /// carry current. Which solid blocks join the graph is the world layer's
    /// call; the engine only refuses the ones that make no sense.
    pub fn plain_circuit(&self, coords: Coords, block: u8) -> Option<Circuit> {
        let slots = &self.slots;
        if block == slots.wire
            || block == slots.torch
            || block == slots.torch_off
            || block == slots.lever
        {
            return None;
        }
        if !self.catalog.is_solid(block) {
            return None;
        }
        Some(Circuit::plain(coords, block))
    }

    /// Insert `circuit` into the graph and wire it to its neighbors.
    ///
    /// Fails with `Occupied` if the slot already holds a different gate;
    /// re-attaching an identical gate re-runs the scans idempotently. An edge
    /// is admitted only when [`may_drive`] allows it, and is always inserted
    /// symmetrically.
    pub fn attach(&mut self, mut circuit: Circuit) -> Result<(), RedstoneError> {
        let coords = circuit.coords;
        if let Some(existing) = self.circuits.get(&coords) {
            if !existing.is_same_gate(&circuit) {
                return Err(RedstoneError::Occupied { coords });
            }
        }
        debug!(?coords, kind = circuit.kind.name(), "attach circuit");

        circuit.inputs.clear();
        circuit.outputs.clear();
        for candidate in circuit.input_candidates() {
            if let Some(target) = self.circuits.get(&candidate) {
                if may_drive(target, &circuit) {
                    circuit.inputs.insert(candidate);
                }
            }
        }
        for candidate in circuit.output_candidates() {
            if let Some(target) = self.circuits.get(&candidate) {
                if may_drive(&circuit, target) {
                    circuit.outputs.insert(candidate);
                }
            }
        }

        // Mirror the edges on the neighbors once the circuit is in the map.
        let inputs: Vec<Coords> = circuit.inputs.iter().copied().collect();
        let outputs: Vec<Coords> = circuit.outputs.iter().copied().collect();
        self.circuits.insert(coords, circuit);
        for input in inputs {
            if let Some(neighbor) = self.circuits.get_mut(&input) {
                neighbor.outputs.insert(coords);
            }
        }
        for output in outputs {
            if let Some(neighbor) = self.circuits.get_mut(&output) {
                neighbor.inputs.insert(coords);
            }
        }
        Ok(())
    }

    /// Remove `circuit` from the graph, scrubbing every edge that references
    /// it. Fails with `NotAttached` if the coordinate is empty, `Mismatch` if
    /// it holds a different gate. Returns the released circuit with cleared
    /// edge sets.
    pub fn detach(&mut self, circuit: &Circuit) -> Result<Circuit, RedstoneError> {
        let coords = circuit.coords;
        let existing = self
            .circuits
            .get(&coords)
            .ok_or(RedstoneError::NotAttached { coords })?;
        if !existing.is_same_gate(circuit) {
            return Err(RedstoneError::Mismatch { coords });
        }
        self.release(coords)
            .ok_or(RedstoneError::NotAttached { coords })
    }

    /// Apply one world edit to the graph: materialise, update, or release
    /// the circuit at `coords`. The caller seeds the next propagation pass
    /// with the same coordinate.
    ///
    /// An edit that keeps the same gate in place (a lever toggle, a wire
    /// strength rewrite) updates its state without touching the edges; a
    /// different gate replaces the old one; a non-circuit block releases
    /// whatever was there. Plain blocks are not materialised on this path —
    /// the world layer attaches those explicitly where it wants conduction.
    pub fn apply_edit(
        &mut self,
        coords: Coords,
        block: u8,
        metadata: u8,
    ) -> Result<(), RedstoneError> {
        let incoming = self.circuit_from_block(coords, block, metadata)?;

        let same_gate = match (&incoming, self.circuits.get(&coords)) {
            (Some(incoming), Some(existing)) => existing.is_same_gate(incoming),
            _ => false,
        };
        if same_gate {
            let slots = self.slots;
            if let Some(circuit) = self.circuits.get_mut(&coords) {
                debug!(?coords, block, metadata, "update circuit in place");
                circuit.block = block;
                circuit.metadata = metadata;
                circuit.status = codec::bbool(&slots, block, metadata);
            }
            return Ok(());
        }

        if self.circuits.contains_key(&coords) {
            self.release(coords);
        }
        match incoming {
            Some(circuit) => self.attach(circuit),
            None => Ok(()),
        }
    }

    /// Flip a lever and fold the new state into its stored block identity,
    /// so the toggle itself is not re-emitted by the next pass.
    pub fn set_lever(&mut self, coords: Coords, on: bool) -> Result<(), RedstoneError> {
        let slots = self.slots;
        let circuit = self
            .circuits
            .get_mut(&coords)
            .ok_or(RedstoneError::NotAttached { coords })?;
        if circuit.kind != Kind::Lever {
            return Err(RedstoneError::InvariantViolated(format!(
                "{} at {coords:?} is not a lever",
                circuit.kind.name()
            )));
        }
        circuit.status = on;
        let (block, metadata) = codec::truthify(&slots, on, circuit.block, circuit.metadata);
        circuit.block = block;
        circuit.metadata = metadata;
        Ok(())
    }

    /// Collate the group of wires connected to `coords` through horizontal
    /// wire-wire adjacency, breadth-first. Empty if the coordinate is absent
    /// or not a wire.
    pub fn find_wire_group(&self, coords: Coords) -> BTreeSet<Coords> {
        let mut wires = BTreeSet::new();
        match self.circuits.get(&coords) {
            Some(circuit) if circuit.kind == Kind::Wire => {}
            _ => return wires,
        }

        let mut queue = VecDeque::from([coords]);
        wires.insert(coords);
        while let Some(at) = queue.pop_front() {
            let Some(circuit) = self.circuits.get(&at) else {
                continue;
            };
            for candidate in circuit
                .input_candidates()
                .into_iter()
                .chain(circuit.output_candidates())
            {
                if let Some(neighbor) = self.circuits.get(&candidate) {
                    if neighbor.kind == Kind::Wire && wires.insert(candidate) {
                        queue.push_back(candidate);
                    }
                }
            }
        }
        wires
    }

    /// Compute the would-be status of the gate at `coords` from its inputs,
    /// without mutating anything. `None` when the gate has no inputs: wires
    /// with no driver are stable and a lever keeps its latched state.
    pub(crate) fn peek_gate(&self, coords: Coords) -> Result<Option<bool>, RedstoneError> {
        let circuit = self
            .circuits
            .get(&coords)
            .ok_or(RedstoneError::NotAttached { coords })?;
        if circuit.inputs.is_empty() {
            return Ok(None);
        }
        match circuit.kind {
            Kind::Wire | Kind::Plain => {
                let mut driven = false;
                for input in &circuit.inputs {
                    driven = driven || self.input_status(*input, coords)?;
                }
                Ok(Some(driven))
            }
            Kind::Torch => {
                let mut inputs = circuit.inputs.iter();
                match (inputs.next(), inputs.next()) {
                    (Some(&input), None) => Ok(Some(!self.input_status(input, coords)?)),
                    _ => Err(RedstoneError::InvariantViolated(format!(
                        "torch at {coords:?} has {} inputs",
                        circuit.inputs.len()
                    ))),
                }
            }
            Kind::Lever => Err(RedstoneError::InvariantViolated(format!(
                "lever at {coords:?} has inputs"
            ))),
        }
    }

    fn input_status(&self, input: Coords, of: Coords) -> Result<bool, RedstoneError> {
        self.circuits
            .get(&input)
            .map(|circuit| circuit.status)
            .ok_or_else(|| {
                RedstoneError::InvariantViolated(format!("dangling edge {input:?} -> {of:?}"))
            })
    }

    /// One gate evaluation: read the inputs, write the status on change,
    /// snapshot the outputs for the propagator's queue.
    pub(crate) fn step_gate(&mut self, coords: Coords) -> Result<StepResult, RedstoneError> {
        let new = self.peek_gate(coords)?;
        let circuit = self
            .circuits
            .get_mut(&coords)
            .ok_or(RedstoneError::NotAttached { coords })?;
        let outputs: Vec<Coords> = circuit.outputs.iter().copied().collect();
        let changed = match new {
            Some(status) if status != circuit.status => {
                circuit.status = status;
                true
            }
            _ => false,
        };
        Ok(StepResult { changed, outputs })
    }

    /// Fold the gate's status into its stored block identity. Returns the
    /// new pair when the world representation actually changed.
    pub(crate) fn refresh_block(&mut self, coords: Coords) -> Option<(u8, u8)> {
        let slots = self.slots;
        let circuit = self.circuits.get_mut(&coords)?;
        let (block, metadata) =
            codec::truthify(&slots, circuit.status, circuit.block, circuit.metadata);
        if (block, metadata) == (circuit.block, circuit.metadata) {
            return None;
        }
        circuit.block = block;
        circuit.metadata = metadata;
        Some((block, metadata))
    }

    /// Remove the circuit at `coords` and scrub every edge referencing it.
    fn release(&mut self, coords: Coords) -> Option<Circuit> {
        let mut circuit = self.circuits.remove(&coords)?;
        debug!(?coords, kind = circuit.kind.name(), "detach circuit");
        for edge in circuit.inputs.iter().chain(circuit.outputs.iter()) {
            if let Some(neighbor) = self.circuits.get_mut(edge) {
                neighbor.inputs.remove(&coords);
                neighbor.outputs.remove(&coords);
            }
        }
        circuit.inputs.clear();
        circuit.outputs.clear();
        Some(circuit)
    }
}
