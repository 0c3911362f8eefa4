//! Mounting faces for oriented blocks (torches, levers).

/// The side of a block an oriented component is mounted against, named by the
/// axis the component points along. There is no `-y`: nothing in the alpha
/// block set hangs from a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    PosX,
    NegX,
    PosZ,
    NegZ,
    PosY,
}

impl Face {
    /// All five faces, in a fixed order.
    pub const ALL: [Face; 5] = [Face::PosX, Face::NegX, Face::PosZ, Face::NegZ, Face::PosY];

    /// Unit offset pointing away from the mounting block.
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
            Face::PosY => (0, 1, 0),
        }
    }
}
