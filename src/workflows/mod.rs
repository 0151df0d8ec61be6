pub mod adoption;
pub mod roster;
