mod attribute;
mod config;
mod gene;
#[allow(clippy::module_inception)]
mod genome;

pub use attribute::{Attribute, BoolAttribute, FloatAttribute, IntAttribute, StringAttribute};
pub use config::{FloatParams, GenomeConfig};
pub use gene::{ConnectionGene, NodeGene};
pub use genome::Genome;
