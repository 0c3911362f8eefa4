//! Block ↔ circuit codec: boolean readings of redstone block states.
//!
//! Two pure functions over `(block, metadata)` pairs. Neither can fail; blocks
//! the codec does not know about read as `false` and pass through unaltered.

use alpha_rs_blocks::catalog::BlockCatalog;

use crate::error::RedstoneError;

/// The four block slots the engine compares against, resolved once from the
/// catalog so the hot paths never do string lookups.
#[derive(Debug, Clone, Copy)]
pub struct RedstoneSlots {
    pub lever: u8,
    pub wire: u8,
    pub torch: u8,
    pub torch_off: u8,
}

impl RedstoneSlots {
    /// Resolve the four slots by canonical name.
    pub fn resolve(catalog: &impl BlockCatalog) -> Result<Self, RedstoneError> {
        Ok(Self {
            lever: catalog
                .slot("lever")
                .ok_or(RedstoneError::UnknownBlock("lever"))?,
            wire: catalog
                .slot("redstone-wire")
                .ok_or(RedstoneError::UnknownBlock("redstone-wire"))?,
            torch: catalog
                .slot("redstone-torch")
                .ok_or(RedstoneError::UnknownBlock("redstone-torch"))?,
            torch_off: catalog
                .slot("redstone-torch-off")
                .ok_or(RedstoneError::UnknownBlock("redstone-torch-off"))?,
        })
    }
}

/// Boolean reading of a block state.
///
/// Wire carries a 0-15 signal in its low nibble; any nonzero strength is on.
/// The lever latch is bit `0x8`.
pub fn bbool(slots: &RedstoneSlots, block: u8, metadata: u8) -> bool {
    if block == slots.torch {
        true
    } else if block == slots.torch_off {
        false
    } else if block == slots.wire {
        metadata != 0
    } else if block == slots.lever {
        metadata & 0x8 != 0
    } else {
        false
    }
}

/// Fold a boolean back into a block state, preserving what it can.
///
/// Torches swap between their on/off slots and keep their orientation byte.
/// An energised wire keeps its current strength unless it had none, in which
/// case it jumps to full; a dead wire drops to zero. Levers set or clear the
/// latch bit. Anything else passes through unchanged.
pub fn truthify(slots: &RedstoneSlots, truth: bool, block: u8, metadata: u8) -> (u8, u8) {
    if block == slots.torch || block == slots.torch_off {
        let slot = if truth { slots.torch } else { slots.torch_off };
        (slot, metadata)
    } else if block == slots.wire {
        if truth {
            (block, if metadata != 0 { metadata } else { 0xF })
        } else {
            (block, 0x0)
        }
    } else if block == slots.lever {
        if truth {
            (block, metadata | 0x8)
        } else {
            (block, metadata & !0x8)
        }
    } else {
        (block, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alpha_rs_blocks::catalog::AlphaCatalog;

    fn slots() -> RedstoneSlots {
        RedstoneSlots::resolve(&AlphaCatalog::new()).unwrap()
    }

    #[test]
    fn bbool_readings() {
        let s = slots();
        assert!(bbool(&s, s.torch, 5));
        assert!(!bbool(&s, s.torch_off, 5));
        assert!(!bbool(&s, s.wire, 0));
        assert!(bbool(&s, s.wire, 1));
        assert!(bbool(&s, s.wire, 0xF));
        assert!(!bbool(&s, s.lever, 5));
        assert!(bbool(&s, s.lever, 5 | 0x8));
        // anything else reads false
        assert!(!bbool(&s, 1, 0xF));
    }

    #[test]
    fn truthify_torches_swap_slots() {
        let s = slots();
        assert_eq!(truthify(&s, true, s.torch_off, 3), (s.torch, 3));
        assert_eq!(truthify(&s, false, s.torch, 3), (s.torch_off, 3));
        // already in the right slot: unchanged
        assert_eq!(truthify(&s, true, s.torch, 5), (s.torch, 5));
    }

    #[test]
    fn truthify_wire_strength() {
        let s = slots();
        // dead wire turning on jumps to full strength
        assert_eq!(truthify(&s, true, s.wire, 0), (s.wire, 0xF));
        // live wire keeps its strength
        assert_eq!(truthify(&s, true, s.wire, 7), (s.wire, 7));
        // turning off zeroes it
        assert_eq!(truthify(&s, false, s.wire, 7), (s.wire, 0));
    }

    #[test]
    fn truthify_lever_latch_bit() {
        let s = slots();
        assert_eq!(truthify(&s, true, s.lever, 5), (s.lever, 0xD));
        assert_eq!(truthify(&s, false, s.lever, 0xD), (s.lever, 5));
    }

    #[test]
    fn truthify_passes_unknown_blocks_through() {
        let s = slots();
        assert_eq!(truthify(&s, true, 1, 3), (1, 3));
        assert_eq!(truthify(&s, false, 1, 3), (1, 3));
    }

    #[test]
    fn natural_truth_round_trips() {
        let s = slots();
        // For every handled pair, folding its own reading back in is identity.
        let mut cases: Vec<(u8, u8)> = vec![(s.torch, 5), (s.torch_off, 5)];
        for metadata in 0..=0xF {
            cases.push((s.wire, metadata));
            cases.push((s.lever, metadata));
        }
        for (block, metadata) in cases {
            let truth = bbool(&s, block, metadata);
            assert_eq!(
                truthify(&s, truth, block, metadata),
                (block, metadata),
                "block {block} metadata {metadata}"
            );
        }
    }

    #[test]
    fn complementary_truth_flips_representation() {
        let s = slots();
        // Torches change slot, wires zero or fill their nibble.
        assert_eq!(truthify(&s, false, s.torch, 4), (s.torch_off, 4));
        assert_eq!(truthify(&s, true, s.wire, 0), (s.wire, 0xF));
        assert_eq!(truthify(&s, false, s.wire, 9), (s.wire, 0));
    }
}
