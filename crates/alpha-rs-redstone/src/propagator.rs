//! The update protocol: bounded, deterministic propagation of status changes.
//!
//! One pass walks the change front breadth-first from the seeded circuits,
//! evaluates each gate through the [`Asic`] map, and collects the block
//! writes the world must apply. Each gate is evaluated at most twice per
//! pass, so feedback loops settle into a fixed point or get frozen instead
//! of hanging the engine.

use std::collections::{HashMap, HashSet, VecDeque};

use alpha_rs_blocks::catalog::BlockCatalog;
use tracing::warn;

use crate::asic::Asic;
use crate::circuit::Coords;
use crate::error::RedstoneError;

/// Maximum evaluations of a single gate in one pass.
const MAX_EVALS_PER_PASS: u8 = 2;

/// One block the world must rewrite after a propagation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockWrite {
    pub coords: Coords,
    pub block: u8,
    pub metadata: u8,
}

/// Drive the update protocol from `seeds`: the circuits whose status may
/// have changed exogenously (a fresh placement, a lever toggle, a new edge).
///
/// Seeds are sorted and deduplicated; absent seeds are skipped silently. The
/// returned write list is finite and a pure function of the graph shape and
/// the initial statuses: edge sets iterate in coordinate order, so two
/// identically built engines emit identical sequences.
pub fn propagate<C: BlockCatalog>(
    asic: &mut Asic<C>,
    seeds: &[Coords],
) -> Result<Vec<BlockWrite>, RedstoneError> {
    let mut seed_list = seeds.to_vec();
    seed_list.sort_unstable();
    seed_list.dedup();

    let mut queue: VecDeque<Coords> = VecDeque::new();
    let mut seed_set: HashSet<Coords> = HashSet::new();
    for &coords in &seed_list {
        if asic.get(coords).is_some() {
            queue.push_back(coords);
            seed_set.insert(coords);
        }
    }

    let mut visited: HashSet<Coords> = HashSet::new();
    let mut evals: HashMap<Coords, u8> = HashMap::new();
    let mut writes: Vec<BlockWrite> = Vec::new();
    let mut reported_stall = false;

    while let Some(coords) = queue.pop_front() {
        let count = evals.entry(coords).or_insert(0);
        if *count >= MAX_EVALS_PER_PASS {
            continue;
        }
        *count += 1;
        let first_visit = visited.insert(coords);

        let step = asic.step_gate(coords)?;
        if step.changed {
            if let Some((block, metadata)) = asic.refresh_block(coords) {
                writes.push(BlockWrite {
                    coords,
                    block,
                    metadata,
                });
            }
        }

        // A seed fans out once even when evaluation saw no change: its
        // status may have been set before the pass, which evaluation cannot
        // observe (a lever's own inputs are always empty).
        if !step.changed && !(first_visit && seed_set.contains(&coords)) {
            continue;
        }
        for output in step.outputs {
            if visited.contains(&output) {
                // Re-entry is capped. If the frozen gate is now stale we
                // have a non-converging loop: report the first one and
                // leave it frozen for this pass.
                if !reported_stall && is_stale(asic, output)? {
                    warn!(
                        coords = ?output,
                        "redstone loop failed to converge; freezing for this pass"
                    );
                    reported_stall = true;
                }
            } else {
                queue.push_back(output);
            }
        }
    }

    Ok(writes)
}

/// Whether the gate's status disagrees with its current inputs.
fn is_stale<C: BlockCatalog>(asic: &Asic<C>, coords: Coords) -> Result<bool, RedstoneError> {
    match (asic.peek_gate(coords)?, asic.get(coords)) {
        (Some(next), Some(circuit)) => Ok(next != circuit.status()),
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Circuit, Coords};
    use alpha_rs_blocks::catalog::AlphaCatalog;

    const STONE: u8 = 1;

    fn rig() -> Asic<AlphaCatalog> {
        Asic::new(AlphaCatalog::new()).unwrap()
    }

    fn wire(asic: &mut Asic<AlphaCatalog>, coords: Coords, metadata: u8) {
        let circuit = Circuit::wire(asic.slots(), coords, metadata);
        asic.attach(circuit).unwrap();
    }

    fn plain(asic: &mut Asic<AlphaCatalog>, coords: Coords) {
        let circuit = asic.plain_circuit(coords, STONE).unwrap();
        asic.attach(circuit).unwrap();
    }

    fn torch(asic: &mut Asic<AlphaCatalog>, coords: Coords, metadata: u8, lit: bool) {
        let slots = *asic.slots();
        let block = if lit { slots.torch } else { slots.torch_off };
        let circuit = asic
            .circuit_from_block(coords, block, metadata)
            .unwrap()
            .unwrap();
        asic.attach(circuit).unwrap();
    }

    fn lever(asic: &mut Asic<AlphaCatalog>, coords: Coords, metadata: u8) {
        let slots = *asic.slots();
        let circuit = asic
            .circuit_from_block(coords, slots.lever, metadata)
            .unwrap()
            .unwrap();
        asic.attach(circuit).unwrap();
    }

    #[test]
    fn lone_wire_emits_nothing() {
        let mut asic = rig();
        wire(&mut asic, (0, 0, 0), 0);
        let writes = propagate(&mut asic, &[(0, 0, 0)]).unwrap();
        assert!(writes.is_empty());
        assert!(!asic.get((0, 0, 0)).unwrap().status());
    }

    #[test]
    fn absent_seeds_are_skipped_silently() {
        let mut asic = rig();
        let writes = propagate(&mut asic, &[(4, 4, 4), (5, 5, 5)]).unwrap();
        assert!(writes.is_empty());
    }

    #[test]
    fn lever_drives_wire_through_plain() {
        // Lever on top of a stone block, wire beside the block. Flipping the
        // lever must light the wire at full strength — and emit only that.
        let mut asic = rig();
        let slots = *asic.slots();
        lever(&mut asic, (0, 0, 0), 5);
        plain(&mut asic, (0, -1, 0));
        wire(&mut asic, (1, -1, 0), 0);

        asic.set_lever((0, 0, 0), true).unwrap();
        let writes = propagate(&mut asic, &[(0, 0, 0)]).unwrap();
        assert_eq!(
            writes,
            vec![BlockWrite {
                coords: (1, -1, 0),
                block: slots.wire,
                metadata: 0xF,
            }]
        );
        assert!(asic.get((0, -1, 0)).unwrap().status());
        assert!(asic.get((1, -1, 0)).unwrap().status());
    }

    #[test]
    fn lever_release_relights_the_torch() {
        // Lever on top of a block, torch on its side. Energising the block
        // darkens the torch; releasing the lever brings it back.
        let mut asic = rig();
        let slots = *asic.slots();
        lever(&mut asic, (0, 1, 0), 5);
        plain(&mut asic, (0, 0, 0));
        torch(&mut asic, (1, 0, 0), 1, true);

        asic.set_lever((0, 1, 0), true).unwrap();
        let writes = propagate(&mut asic, &[(0, 1, 0)]).unwrap();
        assert_eq!(
            writes,
            vec![BlockWrite {
                coords: (1, 0, 0),
                block: slots.torch_off,
                metadata: 1,
            }]
        );

        asic.set_lever((0, 1, 0), false).unwrap();
        let writes = propagate(&mut asic, &[(0, 1, 0)]).unwrap();
        assert_eq!(
            writes,
            vec![BlockWrite {
                coords: (1, 0, 0),
                block: slots.torch,
                metadata: 1,
            }]
        );
        assert!(asic.get((1, 0, 0)).unwrap().status());
    }

    #[test]
    fn adjacent_wire_and_plain_latch_each_other() {
        // Incremental OR propagation is monotone inside a pass: once a wire
        // and its neighboring block energise each other, releasing the lever
        // does not darken them. Recomputing a dead group from its sources is
        // the world layer's job, via find_wire_group.
        let mut asic = rig();
        lever(&mut asic, (0, 0, 0), 5);
        plain(&mut asic, (0, -1, 0));
        wire(&mut asic, (1, -1, 0), 0);

        asic.set_lever((0, 0, 0), true).unwrap();
        propagate(&mut asic, &[(0, 0, 0)]).unwrap();
        asic.set_lever((0, 0, 0), false).unwrap();
        let writes = propagate(&mut asic, &[(0, 0, 0)]).unwrap();
        assert!(writes.is_empty());
        assert!(asic.get((1, -1, 0)).unwrap().status(), "wire stays latched");
    }

    #[test]
    fn torch_on_unpowered_block_lights_up() {
        // A dark torch standing on an unenergised block inverts it and comes
        // on. Its outputs are the horizontals — nothing is there, so the
        // pass ends after one write.
        let mut asic = rig();
        let slots = *asic.slots();
        plain(&mut asic, (0, 0, 0));
        torch(&mut asic, (0, 1, 0), 5, false);

        let writes = propagate(&mut asic, &[(0, 1, 0)]).unwrap();
        assert_eq!(
            writes,
            vec![BlockWrite {
                coords: (0, 1, 0),
                block: slots.torch,
                metadata: 5,
            }]
        );
        assert!(asic.get((0, 1, 0)).unwrap().status());
    }

    #[test]
    fn not_chain_settles() {
        // T1 on P1, wire from T1 to P2, T2 on P2. Starting all false,
        // seeding T1 settles to T1 on, wire full, P2 energised, T2 dark.
        let mut asic = rig();
        let slots = *asic.slots();
        plain(&mut asic, (0, 0, 0));
        torch(&mut asic, (0, 1, 0), 5, false); // T1
        wire(&mut asic, (1, 1, 0), 0); // W
        plain(&mut asic, (2, 1, 0)); // P2
        torch(&mut asic, (2, 2, 0), 5, false); // T2

        let writes = propagate(&mut asic, &[(0, 1, 0)]).unwrap();
        assert_eq!(
            writes,
            vec![
                BlockWrite {
                    coords: (0, 1, 0),
                    block: slots.torch,
                    metadata: 5,
                },
                BlockWrite {
                    coords: (1, 1, 0),
                    block: slots.wire,
                    metadata: 0xF,
                },
            ]
        );
        assert!(asic.get((0, 1, 0)).unwrap().status(), "T1 lit");
        assert!(asic.get((1, 1, 0)).unwrap().status(), "wire carrying");
        assert!(asic.get((2, 1, 0)).unwrap().status(), "P2 energised");
        assert!(!asic.get((2, 2, 0)).unwrap().status(), "T2 dark");

        // Re-seeding an already settled front is a no-op.
        let again = propagate(&mut asic, &[(0, 1, 0)]).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn propagation_is_deterministic() {
        // Two identically built engines emit identical write sequences.
        let build = || {
            let mut asic = rig();
            lever(&mut asic, (0, 1, 0), 5);
            plain(&mut asic, (0, 0, 0));
            wire(&mut asic, (1, 0, 0), 0);
            wire(&mut asic, (0, 0, 1), 0);
            plain(&mut asic, (2, 0, 0));
            torch(&mut asic, (2, 1, 0), 5, false);
            asic.set_lever((0, 1, 0), true).unwrap();
            asic
        };
        let mut a = build();
        let mut b = build();
        let writes_a = propagate(&mut a, &[(0, 1, 0)]).unwrap();
        let writes_b = propagate(&mut b, &[(0, 1, 0)]).unwrap();
        assert_eq!(writes_a, writes_b);
        assert!(!writes_a.is_empty());
    }

    #[test]
    fn feedback_ring_terminates() {
        // A two-torch ring around the block grid. Even with every circuit
        // seeded at once the pass is bounded by the per-gate evaluation cap.
        let mut asic = rig();
        plain(&mut asic, (0, 0, 0)); // P1
        torch(&mut asic, (1, 0, 0), 1, false); // T1 mounted on P1
        wire(&mut asic, (2, 0, 0), 0); // W1
        plain(&mut asic, (2, 0, 1)); // P2
        torch(&mut asic, (2, 0, 2), 3, false); // T2 mounted on P2
        wire(&mut asic, (1, 0, 2), 0); // W2
        plain(&mut asic, (1, 0, 1)); // P3
        wire(&mut asic, (0, 0, 1), 0); // W3, closes the ring into P1

        let all: Vec<Coords> = asic.iter().map(|c| c.coords).collect();
        let writes = propagate(&mut asic, &all).unwrap();
        // The ring settles: T1 comes on, W1 lights, P2 energises, T2 stays
        // dark, the return path stays dead.
        assert!(asic.get((1, 0, 0)).unwrap().status());
        assert!(asic.get((2, 0, 0)).unwrap().status());
        assert!(asic.get((2, 0, 1)).unwrap().status());
        assert!(!asic.get((2, 0, 2)).unwrap().status());
        assert!(!asic.get((0, 0, 1)).unwrap().status());
        assert!(!writes.is_empty());

        // And a second pass over the settled ring changes nothing.
        let again = propagate(&mut asic, &all).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn freshly_placed_wire_picks_up_existing_power() {
        // Power first, wiring later: attaching a wire next to an energised
        // block and seeding the new wire lights it.
        let mut asic = rig();
        let slots = *asic.slots();
        lever(&mut asic, (0, 1, 0), 5);
        plain(&mut asic, (0, 0, 0));
        asic.set_lever((0, 1, 0), true).unwrap();
        propagate(&mut asic, &[(0, 1, 0)]).unwrap();

        wire(&mut asic, (1, 0, 0), 0);
        let writes = propagate(&mut asic, &[(1, 0, 0)]).unwrap();
        assert_eq!(
            writes,
            vec![BlockWrite {
                coords: (1, 0, 0),
                block: slots.wire,
                metadata: 0xF,
            }]
        );
    }

    #[test]
    fn edit_toggle_propagates_like_set_lever() {
        // The apply_edit path for a lever toggle seeds the same pass.
        let mut asic = rig();
        let slots = *asic.slots();
        lever(&mut asic, (0, 0, 0), 5);
        plain(&mut asic, (0, -1, 0));
        wire(&mut asic, (1, -1, 0), 0);

        asic.apply_edit((0, 0, 0), slots.lever, 5 | 0x8).unwrap();
        let writes = propagate(&mut asic, &[(0, 0, 0)]).unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].coords, (1, -1, 0));
        assert_eq!(writes[0].metadata, 0xF);
    }

    #[test]
    fn wire_keeps_nonzero_strength_when_redriven() {
        // A wire already carrying a graded signal keeps its nibble when its
        // driver stays on; only the dead-to-live transition jumps to full.
        let mut asic = rig();
        lever(&mut asic, (0, 1, 0), 5);
        plain(&mut asic, (0, 0, 0));
        wire(&mut asic, (1, 0, 0), 7);

        asic.set_lever((0, 1, 0), true).unwrap();
        let writes = propagate(&mut asic, &[(0, 1, 0)]).unwrap();
        // wire was already true (metadata 7): no status change, no write
        assert!(writes.is_empty());
        assert_eq!(asic.get((1, 0, 0)).unwrap().block().1, 7);
    }
}
