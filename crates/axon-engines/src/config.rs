use axon_core::ConfigParser;
use axon_error::AxonResult;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Typed view of the `NEAT` config section: the loop-level parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PopulationConfig {
    pub fitness_criterion: String,
    pub fitness_threshold: f32,
    pub pop_size: i32,
    pub reset_on_extinction: bool,
    pub no_fitness_termination: bool,
}

impl PopulationConfig {
    pub fn new(parser: &ConfigParser) -> AxonResult<Self> {
        let section = parser.section("NEAT")?;

        Ok(PopulationConfig {
            fitness_criterion: section.get_str("fitness_criterion")?.to_string(),
            fitness_threshold: section.get_f32("fitness_threshold")?,
            pop_size: section.get_i32("pop_size")?,
            reset_on_extinction: section.get_bool("reset_on_extinction")?,
            no_fitness_termination: section.get_bool("no_fitness_termination")?,
        })
    }
}

/// Typed view of the `DefaultStagnation` config section.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StagnationConfig {
    pub species_fitness_func: String,
    pub max_stagnation: i32,
    pub species_elitism: i32,
}

impl StagnationConfig {
    pub fn new(parser: &ConfigParser) -> AxonResult<Self> {
        let section = parser.section("DefaultStagnation")?;

        Ok(StagnationConfig {
            species_fitness_func: section.get_str("species_fitness_func")?.to_string(),
            max_stagnation: section.get_i32("max_stagnation")?,
            species_elitism: section.get_i32("species_elitism")?,
        })
    }
}

/// Typed view of the `DefaultReproduction` config section.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReproductionConfig {
    pub elitism: i32,
    pub survival_threshold: f32,
    pub min_species_size: i32,
}

impl ReproductionConfig {
    pub fn new(parser: &ConfigParser) -> AxonResult<Self> {
        let section = parser.section("DefaultReproduction")?;

        Ok(ReproductionConfig {
            elitism: section.get_i32("elitism")?,
            survival_threshold: section.get_f32("survival_threshold")?,
            min_species_size: section.get_i32("min_species_size")?,
        })
    }
}

/// Typed view of the `DefaultSpeciesSet` config section.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpeciesSetConfig {
    pub compatibility_threshold: f32,
}

impl SpeciesSetConfig {
    pub fn new(parser: &ConfigParser) -> AxonResult<Self> {
        let section = parser.section("DefaultSpeciesSet")?;

        Ok(SpeciesSetConfig {
            compatibility_threshold: section.get_f32("compatibility_threshold")?,
        })
    }
}
