//! Genetic-algorithm engine for evolving articulated walkers.
//!
//! A [`Population`](engines::generation::Population) of chromosomes, each a
//! `limbs x ticks` table of discrete torque instructions, is decoded one column
//! per tick by a [`GenerationDriver`](engines::generation::GenerationDriver).
//! Physics and fitness are supplied by the host through the traits in
//! [`engines::evaluation`].

pub mod config;
pub mod engines;
pub mod error;
pub mod types;

pub use error::{Result, StridegenError};
