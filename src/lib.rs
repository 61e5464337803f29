pub mod api;
pub mod domain;
pub mod engine;
pub mod infra;
mod run;
#[cfg(test)]
mod tests;
pub mod util;

pub use self::{engine::Engine, run::start};
