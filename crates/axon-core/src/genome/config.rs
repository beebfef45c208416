use crate::config::{ConfigParser, Section};
use axon_error::AxonResult;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Initialization, bound, and mutation parameters for one float attribute
/// family (`bias`, `response`, or `weight`), read from the `DefaultGenome`
/// section as `<prefix>_init_mean`, `<prefix>_init_stdev`, and so on.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FloatParams {
    pub init_mean: f32,
    pub init_stdev: f32,
    pub init_type: String,
    pub max_value: f32,
    pub min_value: f32,
    pub mutate_power: f32,
    pub mutate_rate: f32,
    pub replace_rate: f32,
}

impl FloatParams {
    fn from_section(section: &Section, prefix: &str) -> AxonResult<Self> {
        Ok(FloatParams {
            init_mean: section.get_f32(&format!("{prefix}_init_mean"))?,
            init_stdev: section.get_f32(&format!("{prefix}_init_stdev"))?,
            init_type: section.get_str(&format!("{prefix}_init_type"))?.to_string(),
            max_value: section.get_f32(&format!("{prefix}_max_value"))?,
            min_value: section.get_f32(&format!("{prefix}_min_value"))?,
            mutate_power: section.get_f32(&format!("{prefix}_mutate_power"))?,
            mutate_rate: section.get_f32(&format!("{prefix}_mutate_rate"))?,
            replace_rate: section.get_f32(&format!("{prefix}_replace_rate"))?,
        })
    }
}

/// The typed view of the `DefaultGenome` config section, shared by every
/// genome in a population through an `Arc` so mutation and distance code can
/// reach its rates and coefficients without each genome carrying a copy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenomeConfig {
    pub compatibility_disjoint_coefficient: f32,
    pub compatibility_weight_coefficient: f32,

    pub conn_add_prob: f32,
    pub conn_delete_prob: f32,
    pub node_add_prob: f32,
    pub node_delete_prob: f32,

    pub num_inputs: i32,
    pub num_outputs: i32,
    pub num_hidden: i32,
    pub initial_connection: String,

    pub bias: FloatParams,
    pub response: FloatParams,
    pub weight: FloatParams,

    pub activation_default: String,
    pub activation_mutate_rate: f32,
    pub activation_options: Vec<String>,

    pub aggregation_default: String,
    pub aggregation_mutate_rate: f32,
    pub aggregation_options: Vec<String>,

    pub enabled_default: bool,
    pub enabled_mutate_rate: f32,
    pub enabled_rate_to_true_add: f32,
    pub enabled_rate_to_false_add: f32,
}

impl GenomeConfig {
    pub fn new(parser: &ConfigParser) -> AxonResult<Self> {
        let section = parser.section("DefaultGenome")?;

        Ok(GenomeConfig {
            compatibility_disjoint_coefficient: section
                .get_f32("compatibility_disjoint_coefficient")?,
            compatibility_weight_coefficient: section
                .get_f32("compatibility_weight_coefficient")?,

            conn_add_prob: section.get_f32("conn_add_prob")?,
            conn_delete_prob: section.get_f32("conn_delete_prob")?,
            node_add_prob: section.get_f32("node_add_prob")?,
            node_delete_prob: section.get_f32("node_delete_prob")?,

            num_inputs: section.get_i32("num_inputs")?,
            num_outputs: section.get_i32("num_outputs")?,
            num_hidden: section.get_i32("num_hidden")?,
            initial_connection: section.get_str("initial_connection")?.to_string(),

            bias: FloatParams::from_section(section, "bias")?,
            response: FloatParams::from_section(section, "response")?,
            weight: FloatParams::from_section(section, "weight")?,

            activation_default: section.get_str("activation_default")?.to_string(),
            activation_mutate_rate: section.get_f32("activation_mutate_rate")?,
            activation_options: section.get_str_list("activation_options")?,

            aggregation_default: section.get_str("aggregation_default")?.to_string(),
            aggregation_mutate_rate: section.get_f32("aggregation_mutate_rate")?,
            aggregation_options: section.get_str_list("aggregation_options")?,

            enabled_default: section.get_bool("enabled_default")?,
            enabled_mutate_rate: section.get_f32("enabled_mutate_rate")?,
            enabled_rate_to_true_add: section.get_f32("enabled_rate_to_true_add")?,
            enabled_rate_to_false_add: section.get_f32("enabled_rate_to_false_add")?,
        })
    }
}
