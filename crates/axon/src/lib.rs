//! A Rust library for NeuroEvolution of Augmenting Topologies (NEAT).
//!
//! Populations of genomes, each a graph of attribute-bearing node and
//! connection genes, are partitioned into species by compatibility distance
//! and evolved against a user-supplied fitness function through crossover,
//! structural mutation, fitness sharing, and stagnation-driven extinction.

pub use axon_core::*;
pub use axon_engines::{
    Population, PopulationConfig, ReproductionConfig, Species, SpeciesSet, SpeciesSetConfig,
    StagnationConfig, init_logging,
};
pub use axon_error::{axon_bail, axon_err, ensure};
