//! Block catalog mapping canonical names to alpha-format slots.
//!
//! Provides the slot, solidity, and orientation data the redstone engine
//! queries. Slots are the 8-bit block ids of the alpha chunk format; unknown
//! slots default to solid.

use std::collections::HashMap;

use crate::face::Face;

/// Block metadata the redstone engine needs from the wider server.
pub trait BlockCatalog {
    /// Stable numeric slot for a canonical block name.
    fn slot(&self, name: &str) -> Option<u8>;

    /// Decode an orientation byte to the mounting face.
    ///
    /// Only meaningful for oriented blocks; levers mask their latch bit
    /// before decoding. Returns `None` for invalid combinations.
    fn face(&self, block: u8, metadata: u8) -> Option<Face>;

    /// Whether the block is a solid conductor. Defaults to `true` for
    /// unknown slots.
    fn is_solid(&self, block: u8) -> bool;
}

/// Properties for a single block type.
#[derive(Debug, Clone)]
pub struct BlockInfo {
    /// Canonical block name, e.g. `"redstone-wire"`.
    pub name: &'static str,
    /// 8-bit slot in the alpha chunk format.
    pub slot: u8,
    /// Whether entities collide with this block (and it can carry current).
    pub is_solid: bool,
}

// Helper macro to reduce boilerplate in the data array.
macro_rules! block {
    ($name:expr, $slot:expr, solid) => {
        BlockInfo {
            name: $name,
            slot: $slot,
            is_solid: true,
        }
    };
    ($name:expr, $slot:expr, non_solid) => {
        BlockInfo {
            name: $name,
            slot: $slot,
            is_solid: false,
        }
    };
}

/// The alpha-era block table. Slots match the on-disk chunk format.
static BLOCK_DATA: &[BlockInfo] = &[
    block!("air", 0, non_solid),
    block!("stone", 1, solid),
    block!("grass", 2, solid),
    block!("dirt", 3, solid),
    block!("cobblestone", 4, solid),
    block!("wood", 5, solid),
    block!("sapling", 6, non_solid),
    block!("bedrock", 7, solid),
    block!("water", 8, non_solid),
    block!("spring", 9, non_solid),
    block!("lava", 10, non_solid),
    block!("lava-spring", 11, non_solid),
    block!("sand", 12, solid),
    block!("gravel", 13, solid),
    block!("gold-ore", 14, solid),
    block!("iron-ore", 15, solid),
    block!("coal-ore", 16, solid),
    block!("log", 17, solid),
    block!("leaves", 18, non_solid),
    block!("sponge", 19, solid),
    block!("glass", 20, non_solid),
    block!("wool", 35, solid),
    block!("gold", 41, solid),
    block!("iron", 42, solid),
    block!("double-stone-slab", 43, solid),
    block!("stone-slab", 44, non_solid),
    block!("brick", 45, solid),
    block!("mossy-cobblestone", 48, solid),
    block!("obsidian", 49, solid),
    block!("torch", 50, non_solid),
    block!("fire", 51, non_solid),
    block!("mob-spawner", 52, solid),
    block!("wooden-stairs", 53, non_solid),
    block!("chest", 54, solid),
    block!("redstone-wire", 55, non_solid),
    block!("diamond-ore", 56, solid),
    block!("diamond-block", 57, solid),
    block!("workbench", 58, solid),
    block!("crops", 59, non_solid),
    block!("farmland", 60, solid),
    block!("furnace", 61, solid),
    block!("burning-furnace", 62, solid),
    block!("wooden-door", 64, non_solid),
    block!("ladder", 65, non_solid),
    block!("tracks", 66, non_solid),
    block!("stone-stairs", 67, non_solid),
    block!("lever", 69, non_solid),
    block!("stone-plate", 70, non_solid),
    block!("iron-door", 71, non_solid),
    block!("wooden-plate", 72, non_solid),
    block!("redstone-ore", 73, solid),
    block!("glowing-redstone-ore", 74, solid),
    block!("redstone-torch-off", 75, non_solid),
    block!("redstone-torch", 76, non_solid),
    block!("stone-button", 77, non_solid),
    block!("snow", 78, non_solid),
    block!("ice", 79, non_solid),
    block!("snow-block", 80, solid),
    block!("cactus", 81, non_solid),
    block!("clay", 82, solid),
    block!("pumpkin", 86, solid),
    block!("netherrack", 87, solid),
    block!("soul-sand", 88, solid),
    block!("lightstone", 89, solid),
    block!("jack-o-lantern", 91, solid),
];

/// Catalog over the static alpha block table.
pub struct AlphaCatalog {
    by_name: HashMap<&'static str, &'static BlockInfo>,
    by_slot: HashMap<u8, &'static BlockInfo>,
}

impl Default for AlphaCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl AlphaCatalog {
    /// Build the catalog by indexing the static table both ways.
    pub fn new() -> Self {
        let mut by_name = HashMap::with_capacity(BLOCK_DATA.len());
        let mut by_slot = HashMap::with_capacity(BLOCK_DATA.len());
        for info in BLOCK_DATA {
            by_name.insert(info.name, info);
            by_slot.insert(info.slot, info);
        }
        Self { by_name, by_slot }
    }

    /// Look up full block info by slot.
    pub fn get(&self, slot: u8) -> Option<&'static BlockInfo> {
        self.by_slot.get(&slot).copied()
    }
}

impl BlockCatalog for AlphaCatalog {
    fn slot(&self, name: &str) -> Option<u8> {
        self.by_name.get(name).map(|info| info.slot)
    }

    fn face(&self, block: u8, metadata: u8) -> Option<Face> {
        match self.by_slot.get(&block).map(|info| info.name) {
            Some("redstone-torch") | Some("redstone-torch-off") | Some("torch") => {
                torch_face(metadata)
            }
            Some("lever") => lever_face(metadata & 0x7),
            _ => None,
        }
    }

    fn is_solid(&self, block: u8) -> bool {
        self.by_slot
            .get(&block)
            .map(|info| info.is_solid)
            .unwrap_or(true)
    }
}

/// Torch orientation: 1-4 are wall mounts, 5 stands on the floor.
fn torch_face(metadata: u8) -> Option<Face> {
    match metadata {
        1 => Some(Face::PosX),
        2 => Some(Face::NegX),
        3 => Some(Face::PosZ),
        4 => Some(Face::NegZ),
        5 => Some(Face::PosY),
        _ => None,
    }
}

/// Lever orientation: 1-4 are wall mounts, 5 and 6 are the two floor poses.
fn lever_face(metadata: u8) -> Option<Face> {
    match metadata {
        1 => Some(Face::PosX),
        2 => Some(Face::NegX),
        3 => Some(Face::PosZ),
        4 => Some(Face::NegZ),
        5 | 6 => Some(Face::PosY),
        _ => None,
    }
}
