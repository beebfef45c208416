mod common;

use axon_engines::{Population, Species};
use common::test_config;
use std::collections::BTreeSet;

/// Rebuilds the population's species set as two single-member species so the
/// stagnation rules can be driven one generation at a time.
fn two_species_population(max_stagnation: i32, species_elitism: i32) -> Population {
    let parser = test_config(2, max_stagnation, species_elitism, 100.0, false);
    let mut population = Population::new(&parser).unwrap();

    let genome_one = population.genomes()[&1].clone();
    let genome_two = population.genomes()[&2].clone();

    population.species_set_mut().species_mut().clear();

    let mut species_one = Species::new(1, 0, genome_one.clone());
    species_one.update(genome_one, BTreeSet::from([1]));
    population.species_set_mut().insert(species_one);

    let mut species_two = Species::new(2, 0, genome_two.clone());
    species_two.update(genome_two, BTreeSet::from([2]));
    population.species_set_mut().insert(species_two);

    population
}

#[test]
fn frozen_species_goes_stagnant_at_the_limit() {
    let mut population = two_species_population(15, 1);

    for generation in 0..16 {
        // Species 1 never improves; species 2 improves every generation.
        population.genomes_mut().get_mut(&1).unwrap().set_fitness(1.0);
        population
            .genomes_mut()
            .get_mut(&2)
            .unwrap()
            .set_fitness(generation as f32);

        let stagnant = population.get_stagnant_species(generation).unwrap();
        if generation < 15 {
            assert_eq!(stagnant, Vec::<i32>::new(), "generation {generation}");
        } else {
            assert_eq!(stagnant, vec![1]);
        }
    }
}

#[test]
fn species_elitism_spares_everything_when_it_covers_the_set() {
    let mut population = two_species_population(5, 5);

    for generation in 0..40 {
        population.genomes_mut().get_mut(&1).unwrap().set_fitness(1.0);
        population.genomes_mut().get_mut(&2).unwrap().set_fitness(2.0);

        let stagnant = population.get_stagnant_species(generation).unwrap();
        assert!(stagnant.is_empty(), "generation {generation}");
    }
}

#[test]
fn elitism_spares_the_best_species_even_when_stagnant() {
    // Both species frozen from generation 0; elitism of one must keep the
    // fitter species (species 2) alive while species 1 is marked.
    let mut population = two_species_population(10, 1);

    for generation in 0..=10 {
        population.genomes_mut().get_mut(&1).unwrap().set_fitness(1.0);
        population.genomes_mut().get_mut(&2).unwrap().set_fitness(2.0);

        let stagnant = population.get_stagnant_species(generation).unwrap();
        if generation < 10 {
            assert!(stagnant.is_empty());
        } else {
            assert_eq!(stagnant, vec![1]);
        }
    }
}

#[test]
fn stagnation_ties_break_by_species_id() {
    // Identical fitnesses: the ascending (fitness, id) order puts species 2
    // last, so species_elitism = 1 spares it and marks species 1.
    let mut population = two_species_population(3, 1);

    for generation in 0..=3 {
        population.genomes_mut().get_mut(&1).unwrap().set_fitness(1.0);
        population.genomes_mut().get_mut(&2).unwrap().set_fitness(1.0);

        let stagnant = population.get_stagnant_species(generation).unwrap();
        if generation < 3 {
            assert!(stagnant.is_empty());
        } else {
            assert_eq!(stagnant, vec![1]);
        }
    }
}
