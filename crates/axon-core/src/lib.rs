pub mod activations;
pub mod aggregations;
pub mod config;
pub mod genome;
pub mod random_provider;

pub use activations::{activate_value, is_valid_activation};
pub use aggregations::{aggregate_vector, is_valid_aggregation};
pub use config::{ConfigParser, Section};
pub use genome::{
    Attribute, BoolAttribute, ConnectionGene, FloatAttribute, FloatParams, Genome, GenomeConfig,
    IntAttribute, NodeGene, StringAttribute,
};

pub use axon_error::{AxonError, AxonResult, ErrorCode};

pub mod prelude {
    pub use super::activations::activate_value;
    pub use super::aggregations::aggregate_vector;
    pub use super::config::{ConfigParser, Section};
    pub use super::genome::{
        Attribute, BoolAttribute, ConnectionGene, FloatAttribute, Genome, GenomeConfig,
        IntAttribute, NodeGene, StringAttribute,
    };
    pub use super::random_provider;
    pub use axon_error::{AxonError, AxonResult, ErrorCode};
}
