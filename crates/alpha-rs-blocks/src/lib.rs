//! Alpha-era block metadata: stable slots, solidity, and mounting faces.

pub mod catalog;
pub mod face;
