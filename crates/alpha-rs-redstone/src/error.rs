//! Circuit graph errors.

use thiserror::Error;

use crate::circuit::Coords;

#[derive(Debug, Error)]
pub enum RedstoneError {
    #[error("circuit trace at {coords:?} already occupied")]
    Occupied { coords: Coords },

    #[error("no circuit attached at {coords:?}")]
    NotAttached { coords: Coords },

    #[error("circuit at {coords:?} does not match the one presented")]
    Mismatch { coords: Coords },

    #[error("bad orientation metadata {metadata} for block {block}")]
    BadOrientation { block: u8, metadata: u8 },

    #[error("circuit invariant violated: {0}")]
    InvariantViolated(String),

    #[error("block {0:?} not present in catalog")]
    UnknownBlock(&'static str),
}
