//! Core cellular surface growth library.
//!
//! A closed triangle mesh becomes a graph of cells that relax toward
//! smooth local geometry, push away from nearby strangers, collect food
//! and divide once they have enough.
//!
//! Main components:
//! - [`spatial_index`] — bucket grid answering radius queries over cell positions.
//! - [`mesh`] — cell arrays, symmetric links and ring-based normals.
//! - [`forces`] — the per-cell spring / planar / bulge / repulsion rule.
//! - [`divider`] — splitting one cell into two.
//! - [`phases`] — force, commit and feed phases of a step.
//! - [`simulation`] — the driver owning mesh, index and configuration.
//! - [`executor`] — fork-join executors for the parallel force phase.
//! - [`export`] — triangles and vertex records for renderers.
//! - [`config`] — simulation parameters.
//! - [`sampler`] — uniform random sources.
//! - [`error`] — error type shared by all of the above.
//! - [`types`] — cell ids, input triangles and seed shapes.

pub mod config;
pub mod divider;
pub mod error;
pub mod executor;
pub mod export;
pub mod forces;
pub mod mesh;
pub mod phases;
pub mod sampler;
pub mod simulation;
pub mod spatial_index;
pub mod types;

pub use config::GrowthConfig;
pub use error::{GrowthError, Result};
pub use executor::{Executor, RayonExecutor, SequentialExecutor};
pub use sampler::{FixedSampler, RngSampler, UniformSampler};
pub use simulation::{Simulation, StepReport};
pub use types::{CellId, Triangle};
