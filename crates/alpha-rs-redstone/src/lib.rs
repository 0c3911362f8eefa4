//! Redstone circuit simulation: a discrete event engine over a voxel world.
//!
//! World edits arrive at the [`asic::Asic`] as `(coord, block, metadata)`
//! triples; it materialises or releases circuits and keeps the wiring graph
//! consistent. [`propagator::propagate`] then walks the induced change front
//! and yields the block writes the world must apply. The engine owns no
//! globals: block identities come from an injected
//! [`alpha_rs_blocks::catalog::BlockCatalog`].

pub mod asic;
pub mod circuit;
pub mod codec;
pub mod error;
pub mod propagator;
