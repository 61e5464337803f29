//! Serializable views of the engine's results, as printed by the binary.

pub mod dto;
