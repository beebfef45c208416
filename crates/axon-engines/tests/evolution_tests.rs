mod common;

use axon_engines::{AxonResult, Genome, Population, random_provider};
use common::test_config;

const XOR_INPUTS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
const XOR_OUTPUTS: [f32; 4] = [0.0, 1.0, 1.0, 0.0];

fn eval_xor(genome: &Genome) -> AxonResult<f32> {
    let mut fitness = 4.0;
    for (input, expected) in XOR_INPUTS.iter().zip(XOR_OUTPUTS) {
        let output = genome.forward(input)?;
        fitness -= (output[0] - expected).powi(2);
    }
    Ok(fitness)
}

#[test]
fn xor_run_returns_a_best_genome() {
    random_provider::set_seed(42);

    let parser = test_config(50, 15, 2, 3.0, false);
    let mut population = Population::new(&parser).unwrap();

    let best = population.run(eval_xor, 5).unwrap();

    // XOR fitness is bounded above by 4.
    assert!(best.fitness() <= 4.0);
    assert_eq!(best.num_inputs(), 2);
    assert_eq!(best.num_outputs(), 1);

    // The surviving species partition the final population.
    for species in population.species_set().species().values() {
        for gid in species.members() {
            assert!(population.genomes().contains_key(gid));
        }
    }
}

#[test]
fn runs_are_reproducible_under_a_fixed_seed() {
    let run = || {
        random_provider::set_seed(1234);
        let parser = test_config(30, 15, 2, 3.0, false);
        let mut population = Population::new(&parser).unwrap();
        let best = population.run(eval_xor, 4).unwrap();
        (best.key(), best.fitness())
    };

    assert_eq!(run(), run());
}

#[test]
fn fitness_threshold_terminates_the_run() {
    random_provider::set_seed(5);

    let parser = test_config(20, 15, 2, 3.0, false);
    let mut population = Population::new(&parser).unwrap();

    // Every genome scores far above the configured threshold, so the run
    // stops on generation 0 without reproducing.
    let best = population.run(|_| Ok(2_000_000.0), 50).unwrap();

    assert_eq!(best.fitness(), 2_000_000.0);
    assert_eq!(population.genomes().len(), 20);
}

#[test]
fn total_extinction_ends_the_run_with_the_best_so_far() {
    random_provider::set_seed(6);

    // Zero stagnation tolerance and zero species elitism drive every species
    // extinct on the first reproduction.
    let parser = test_config(20, 0, 0, 3.0, false);
    let mut population = Population::new(&parser).unwrap();

    let best = population.run(eval_xor, 10).unwrap();

    assert!(best.fitness() <= 4.0);
    assert!(population.species_set().is_empty());
    assert!(population.genomes().is_empty());
}

#[test]
fn extinction_reset_spawns_a_fresh_population() {
    random_provider::set_seed(8);

    let parser = test_config(20, 0, 0, 3.0, true);
    let mut population = Population::new(&parser).unwrap();

    let _ = population.run(eval_xor, 3).unwrap();

    // The reset respawned pop_size genomes instead of ending the run.
    assert_eq!(population.genomes().len(), 20);
    assert!(!population.species_set().is_empty());
}

#[test]
fn fitness_errors_propagate() {
    random_provider::set_seed(9);

    let parser = test_config(10, 15, 2, 3.0, false);
    let mut population = Population::new(&parser).unwrap();

    let result = population.run(
        |genome| {
            // Wrong arity: the forward precondition surfaces as the run error.
            genome.forward(&[0.0]).map(|outputs| outputs[0])
        },
        3,
    );

    assert_eq!(
        result.unwrap_err().code(),
        axon_engines::ErrorCode::ArityMismatch
    );
}
