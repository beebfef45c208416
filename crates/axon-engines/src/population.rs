use crate::config::{PopulationConfig, ReproductionConfig, StagnationConfig};
use crate::species::SpeciesSet;
use axon_core::aggregations::aggregate_vector;
use axon_core::{ConfigParser, Genome, GenomeConfig, random_provider};
use axon_error::{AxonResult, axon_err};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// The top-level object of a NEAT run: owns the current generation's genomes
/// and the species set, and drives the evaluate → stagnate → reproduce →
/// speciate cycle.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Population {
    config: PopulationConfig,
    stagnation: StagnationConfig,
    reproduction: ReproductionConfig,
    genome_config: Arc<GenomeConfig>,
    genomes: BTreeMap<u64, Genome>,
    species_set: SpeciesSet,
    next_genome_id: u64,
}

impl Population {
    /// Builds the initial population from a parsed config and speciates it at
    /// generation 0.
    pub fn new(parser: &ConfigParser) -> AxonResult<Self> {
        let mut population = Population {
            config: PopulationConfig::new(parser)?,
            stagnation: StagnationConfig::new(parser)?,
            reproduction: ReproductionConfig::new(parser)?,
            genome_config: Arc::new(GenomeConfig::new(parser)?),
            genomes: BTreeMap::new(),
            species_set: SpeciesSet::new(parser)?,
            next_genome_id: 1,
        };

        population.genomes = population.new_population(population.config.pop_size)?;
        population.species_set.speciate(&population.genomes, 0);

        Ok(population)
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    pub fn genomes(&self) -> &BTreeMap<u64, Genome> {
        &self.genomes
    }

    pub fn genomes_mut(&mut self) -> &mut BTreeMap<u64, Genome> {
        &mut self.genomes
    }

    pub fn species_set(&self) -> &SpeciesSet {
        &self.species_set
    }

    pub fn species_set_mut(&mut self) -> &mut SpeciesSet {
        &mut self.species_set
    }

    fn new_population(&mut self, count: i32) -> AxonResult<BTreeMap<u64, Genome>> {
        let mut population = BTreeMap::new();
        for _ in 0..count {
            let gid = self.next_genome_id;
            self.next_genome_id += 1;
            let genome = Genome::from_config(gid, Arc::clone(&self.genome_config))?;
            population.insert(gid, genome);
        }
        Ok(population)
    }

    /// Refreshes every species' aggregate fitness and returns the ids of the
    /// species to drive extinct this generation.
    ///
    /// A species is stagnant when its aggregate fitness has not strictly
    /// improved for `max_stagnation` generations, the number of still-active
    /// species exceeds `species_elitism`, and it is not among the
    /// `species_elitism` best species (ordered ascending by fitness, ties by
    /// id), which are always spared.
    pub fn get_stagnant_species(&mut self, generation: i32) -> AxonResult<Vec<i32>> {
        let mut species_data = Vec::with_capacity(self.species_set.len());

        for (sid, species) in self.species_set.species_mut() {
            let member_fitnesses = species.member_fitnesses(&self.genomes);
            let fitness =
                aggregate_vector(&member_fitnesses, &self.stagnation.species_fitness_func)?;
            species.record_fitness(fitness, generation);
            species_data.push((*sid, fitness, species.generation_last_improved()));
        }

        species_data.sort_by(|one, two| {
            one.1
                .partial_cmp(&two.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(one.0.cmp(&two.0))
        });

        let mut num_active = species_data.len() as i32;
        let mut stagnant = Vec::new();

        for (index, (sid, _, last_improved)) in species_data.iter().enumerate() {
            let stagnant_time = generation - last_improved;
            let mut is_stagnant =
                num_active > self.stagnation.species_elitism && stagnant_time >= self.stagnation.max_stagnation;

            // The top species_elitism species survive regardless of age.
            if (species_data.len() - index) as i32 <= self.stagnation.species_elitism {
                is_stagnant = false;
            }

            if is_stagnant {
                num_active -= 1;
                stagnant.push(*sid);
            }
        }

        Ok(stagnant)
    }

    /// Blends each species' previous size toward its fitness-proportional
    /// target, then renormalizes so the proposals sum to `pop_size`, clamping
    /// every species to at least `min_species_size`.
    pub fn calc_spawns(
        &self,
        adj_fitnesses: &BTreeMap<i32, f32>,
        prev_sizes: &BTreeMap<i32, i32>,
    ) -> BTreeMap<i32, i32> {
        let af_sum = adj_fitnesses.values().sum::<f32>();
        let min_size = self.reproduction.min_species_size;
        let pop_size = self.config.pop_size;

        let mut total_spawns = 0.0_f32;
        let mut raw_spawns = BTreeMap::new();

        for (sid, adj) in adj_fitnesses {
            let prev = prev_sizes.get(sid).copied().unwrap_or(0);

            let desired = if af_sum > 0.0 {
                (min_size as f32).max(adj / af_sum * pop_size as f32) as i32
            } else {
                min_size
            };

            // Move half the distance toward the target, always at least one
            // step when the rounded delta vanishes.
            let delta = (desired - prev) as f32 * 0.5;
            let step = delta.round();
            let mut spawn = prev as f32;
            if step.abs() > 0.0 {
                spawn += step;
            } else if delta > 0.0 {
                spawn += 1.0;
            } else if delta < 0.0 {
                spawn -= 1.0;
            }

            total_spawns += spawn;
            raw_spawns.insert(*sid, spawn);
        }

        let norm = pop_size as f32 / total_spawns;
        raw_spawns
            .iter()
            .map(|(sid, spawn)| (*sid, min_size.max((spawn * norm).round() as i32)))
            .collect()
    }

    /// Produces the next generation: prunes stagnant species, apportions
    /// offspring by adjusted fitness, carries elites over unchanged, and
    /// fills the rest with mutated crossover children of parents drawn from
    /// the fittest survivors.
    pub fn reproduce(&mut self, generation: i32) -> AxonResult<BTreeMap<u64, Genome>> {
        let stagnant_species = self.get_stagnant_species(generation)?;
        for sid in stagnant_species {
            debug!("species {} went stagnant on generation {}", sid, generation);
            self.species_set.remove(sid);
        }

        let mut fitnesses = Vec::new();
        for species in self.species_set.species().values() {
            fitnesses.extend(species.member_fitnesses(&self.genomes));
        }

        // Every species stagnant at once: total extinction, handled by run.
        if fitnesses.is_empty() {
            return Ok(BTreeMap::new());
        }

        let min_fitness = fitnesses.iter().copied().fold(f32::MAX, f32::min);
        let max_fitness = fitnesses.iter().copied().fold(f32::MIN, f32::max);
        let fitness_range = (max_fitness - min_fitness).max(1.0);

        let mut adj_fitnesses = BTreeMap::new();
        let mut prev_sizes = BTreeMap::new();
        for (sid, species) in self.species_set.species() {
            let member_fitnesses = species.member_fitnesses(&self.genomes);
            let mean_fitness = member_fitnesses.iter().sum::<f32>() / member_fitnesses.len() as f32;
            adj_fitnesses.insert(*sid, (mean_fitness - min_fitness) / fitness_range);
            prev_sizes.insert(*sid, species.len() as i32);
        }

        let new_sizes = self.calc_spawns(&adj_fitnesses, &prev_sizes);

        let mut new_population = BTreeMap::new();
        for (sid, target_size) in new_sizes {
            let Some(species) = self.species_set.species().get(&sid) else {
                continue;
            };

            let mut old_members = species
                .members()
                .iter()
                .filter_map(|gid| self.genomes.get(gid).cloned())
                .collect::<Vec<_>>();
            if old_members.is_empty() {
                continue;
            }

            old_members.sort_by(|one, two| {
                two.fitness()
                    .partial_cmp(&one.fitness())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let elite_count = (self.reproduction.elitism as usize).min(old_members.len());
            for elite in &old_members[..elite_count] {
                new_population.insert(elite.key(), elite.clone());
            }

            let repro_cutoff = ((self.reproduction.survival_threshold * old_members.len() as f32)
                .ceil() as usize)
                .max(2)
                .min(old_members.len());

            let num_to_spawn = target_size - elite_count as i32;
            for _ in 0..num_to_spawn.max(0) {
                let (parent_one, parent_two) = if old_members.len() > 1 {
                    (
                        &old_members[random_provider::range(0..repro_cutoff)],
                        &old_members[random_provider::range(0..repro_cutoff)],
                    )
                } else {
                    (&old_members[0], &old_members[0])
                };

                let gid = self.next_genome_id;
                self.next_genome_id += 1;

                let mut child = Genome::from_crossover(gid, parent_one, parent_two)?;
                child.mutate()?;
                new_population.insert(gid, child);
            }
        }

        Ok(new_population)
    }

    /// Runs the evolutionary loop against `fitness_function` for `n`
    /// generations (negative `n` runs unbounded) and returns the best genome
    /// seen. Terminates early when the aggregated population fitness reaches
    /// `fitness_threshold` (unless `no_fitness_termination` is set) or when
    /// every species has gone extinct and `reset_on_extinction` is off.
    pub fn run<F>(&mut self, mut fitness_function: F, n: i32) -> AxonResult<Genome>
    where
        F: FnMut(&Genome) -> AxonResult<f32>,
    {
        let mut best: Option<Genome> = None;

        let mut generation = 0;
        while generation != n {
            eprintln!("LOOP gen={}", generation);
            let mut fitnesses = Vec::with_capacity(self.genomes.len());
            let mut gen_best: Option<u64> = None;
            let mut gen_best_fitness = f32::MIN;

            for genome in self.genomes.values_mut() {
                genome.activate();
                let fitness = fitness_function(genome)?;
                genome.set_fitness(fitness);
                fitnesses.push(fitness);

                if fitness > gen_best_fitness {
                    gen_best_fitness = fitness;
                    gen_best = Some(genome.key());
                }
            }

            if best
                .as_ref()
                .is_none_or(|genome| gen_best_fitness > genome.fitness())
            {
                best = gen_best.and_then(|gid| self.genomes.get(&gid).cloned());
            }

            info!(
                "Generation {:<4} | Population: {:>4} | Species: {:>3} | Best: {:>8.4}",
                generation,
                self.genomes.len(),
                self.species_set.len(),
                gen_best_fitness
            );

            if !self.config.no_fitness_termination {
                let criterion = aggregate_vector(&fitnesses, &self.config.fitness_criterion)?;
                if criterion >= self.config.fitness_threshold {
                    info!("fitness criterion reached on generation {}", generation);
                    break;
                }
            }

            eprintln!("before reproduce");
            self.genomes = self.reproduce(generation)?;
            eprintln!("after reproduce, genomes={}", self.genomes.len());

            if self.species_set.is_empty() && generation > 0 {
                if self.config.reset_on_extinction {
                    info!("complete extinction on generation {}, spawning a fresh population", generation);
                    self.genomes = self.new_population(self.config.pop_size)?;
                } else {
                    info!("complete extinction on generation {}, ending", generation);
                    break;
                }
            }

            eprintln!("before speciate");
            self.species_set.speciate(&self.genomes, generation);
            eprintln!("after speciate");

            for (sid, species) in self.species_set.species() {
                debug!(
                    "  species {:<3} | age: {:>3} | size: {:>4} | fitness: {:>8.4} | stagnation: {:>3}",
                    sid,
                    generation - species.generation_created(),
                    species.len(),
                    species.fitness(),
                    generation - species.generation_last_improved()
                );
            }

            generation += 1;
        }

        best.ok_or_else(|| axon_err!(InvalidConfig: "run finished without evaluating any genome"))
    }
}
