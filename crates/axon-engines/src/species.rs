use crate::config::SpeciesSetConfig;
use axon_core::{ConfigParser, Genome};
use axon_error::AxonResult;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One compatibility cluster of the population.
///
/// Members are genome ids into the current population; the representative is
/// an owned clone so it can outlive its source genome. Speciation matches
/// the next generation against the *previous* generation's representative,
/// which by then is usually gone from the population.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Species {
    key: i32,
    generation_created: i32,
    generation_last_improved: i32,
    representative: Genome,
    members: BTreeSet<u64>,
    fitness: f32,
    fitness_history: Vec<f32>,
}

impl Species {
    pub fn new(key: i32, generation: i32, representative: Genome) -> Self {
        Species {
            key,
            generation_created: generation,
            generation_last_improved: generation,
            representative,
            members: BTreeSet::new(),
            fitness: 0.0,
            fitness_history: Vec::new(),
        }
    }

    pub fn key(&self) -> i32 {
        self.key
    }

    pub fn generation_created(&self) -> i32 {
        self.generation_created
    }

    pub fn generation_last_improved(&self) -> i32 {
        self.generation_last_improved
    }

    pub fn representative(&self) -> &Genome {
        &self.representative
    }

    pub fn members(&self) -> &BTreeSet<u64> {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn fitness_history(&self) -> &[f32] {
        &self.fitness_history
    }

    /// Replaces the representative and member set for a new generation.
    /// Fitness history carries over; speciation never resets it.
    pub fn update(&mut self, representative: Genome, members: BTreeSet<u64>) {
        self.representative = representative;
        self.members = members;
    }

    /// Fitnesses of all members, looked up in the owning population.
    pub fn member_fitnesses(&self, population: &BTreeMap<u64, Genome>) -> Vec<f32> {
        self.members
            .iter()
            .filter_map(|gid| population.get(gid).map(|genome| genome.fitness()))
            .collect()
    }

    /// Pushes this generation's aggregate fitness onto the history and marks
    /// the species improved when it strictly exceeds the previous historical
    /// maximum (an empty history counts as negative infinity).
    pub fn record_fitness(&mut self, fitness: f32, generation: i32) {
        let prev_max = self
            .fitness_history
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);

        self.fitness = fitness;
        self.fitness_history.push(fitness);

        if fitness > prev_max {
            self.generation_last_improved = generation;
        }
    }
}

/// The set of all live species, partitioning the population by compatibility
/// distance.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpeciesSet {
    config: SpeciesSetConfig,
    species: BTreeMap<i32, Species>,
    next_species_id: i32,
}

impl SpeciesSet {
    pub fn new(parser: &ConfigParser) -> AxonResult<Self> {
        Ok(SpeciesSet {
            config: SpeciesSetConfig::new(parser)?,
            species: BTreeMap::new(),
            next_species_id: 1,
        })
    }

    pub fn species(&self) -> &BTreeMap<i32, Species> {
        &self.species
    }

    pub fn species_mut(&mut self) -> &mut BTreeMap<i32, Species> {
        &mut self.species
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn remove(&mut self, key: i32) -> Option<Species> {
        self.species.remove(&key)
    }

    pub fn insert(&mut self, species: Species) {
        self.next_species_id = self.next_species_id.max(species.key() + 1);
        self.species.insert(species.key(), species);
    }

    pub fn compatibility_threshold(&self) -> f32 {
        self.config.compatibility_threshold
    }

    /// Partitions `population` into species.
    ///
    /// 1. Every existing species claims the unspeciated genome closest to its
    ///    old representative as its new representative and first member.
    /// 2. Every remaining genome joins the species with the nearest new
    ///    representative within the compatibility threshold, or founds a new
    ///    species.
    /// 3. Species are published with refreshed representatives and members;
    ///    newly founded ones are stamped with the current generation.
    ///
    /// Distances are cached symmetrically per call, keyed by genome id pair.
    pub fn speciate(&mut self, population: &BTreeMap<u64, Genome>, generation: i32) {
        let mut unspeciated = population.keys().copied().collect::<BTreeSet<_>>();
        let mut cache = DistanceCache::new();
        let mut new_representatives: BTreeMap<i32, u64> = BTreeMap::new();
        let mut new_members: BTreeMap<i32, Vec<u64>> = BTreeMap::new();

        for (sid, species) in &self.species {
            let mut closest: Option<(u64, f32)> = None;
            for gid in &unspeciated {
                let distance = cache.distance(species.representative(), &population[gid]);
                if closest.is_none_or(|(_, best)| distance < best) {
                    closest = Some((*gid, distance));
                }
            }

            // A species gets no representative only when the population has
            // already been exhausted by earlier species.
            if let Some((new_rep, _)) = closest {
                new_representatives.insert(*sid, new_rep);
                new_members.insert(*sid, vec![new_rep]);
                unspeciated.remove(&new_rep);
            }
        }

        for gid in unspeciated {
            let genome = &population[&gid];

            let mut candidate: Option<(i32, f32)> = None;
            for (sid, rid) in &new_representatives {
                let distance = cache.distance(&population[rid], genome);
                if distance < self.config.compatibility_threshold
                    && candidate.is_none_or(|(_, best)| distance < best)
                {
                    candidate = Some((*sid, distance));
                }
            }

            match candidate {
                Some((sid, _)) => {
                    if let Some(members) = new_members.get_mut(&sid) {
                        members.push(gid);
                    }
                }
                None => {
                    let sid = self.next_species_id;
                    self.next_species_id += 1;
                    new_representatives.insert(sid, gid);
                    new_members.insert(sid, vec![gid]);
                }
            }
        }

        let mut published = BTreeMap::new();
        for (sid, rid) in &new_representatives {
            let representative = population[rid].clone();
            let members = new_members
                .remove(sid)
                .unwrap_or_default()
                .into_iter()
                .collect::<BTreeSet<_>>();

            let mut species = self
                .species
                .remove(sid)
                .unwrap_or_else(|| Species::new(*sid, generation, representative.clone()));
            species.update(representative, members);
            published.insert(*sid, species);
        }

        self.species = published;
    }
}

/// Per-speciation symmetric cache of genome compatibility distances.
struct DistanceCache {
    distances: BTreeMap<(u64, u64), f32>,
}

impl DistanceCache {
    fn new() -> Self {
        DistanceCache {
            distances: BTreeMap::new(),
        }
    }

    fn distance(&mut self, one: &Genome, two: &Genome) -> f32 {
        let key = (one.key(), two.key());
        if let Some(distance) = self.distances.get(&key) {
            return *distance;
        }

        let distance = one.distance(two);
        self.distances.insert(key, distance);
        self.distances.insert((key.1, key.0), distance);
        distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_core::GenomeConfig;
    use std::sync::Arc;

    const CONFIG: &str = "\
        [DefaultSpeciesSet]\n\
        compatibility_threshold = 3.0\n\
        [DefaultGenome]\n\
        compatibility_disjoint_coefficient = 1.0\n\
        compatibility_weight_coefficient = 0.5\n\
        conn_add_prob = 0.0\n\
        conn_delete_prob = 0.0\n\
        node_add_prob = 0.0\n\
        node_delete_prob = 0.0\n\
        num_inputs = 2\n\
        num_outputs = 1\n\
        num_hidden = 0\n\
        initial_connection = full_direct\n\
        bias_init_mean = 0.0\n\
        bias_init_stdev = 1.0\n\
        bias_init_type = gaussian\n\
        bias_max_value = 30.0\n\
        bias_min_value = -30.0\n\
        bias_mutate_power = 0.5\n\
        bias_mutate_rate = 0.7\n\
        bias_replace_rate = 0.1\n\
        response_init_mean = 1.0\n\
        response_init_stdev = 0.0\n\
        response_init_type = gaussian\n\
        response_max_value = 30.0\n\
        response_min_value = -30.0\n\
        response_mutate_power = 0.0\n\
        response_mutate_rate = 0.0\n\
        response_replace_rate = 0.0\n\
        weight_init_mean = 0.0\n\
        weight_init_stdev = 1.0\n\
        weight_init_type = gaussian\n\
        weight_max_value = 30.0\n\
        weight_min_value = -30.0\n\
        weight_mutate_power = 0.5\n\
        weight_mutate_rate = 0.8\n\
        weight_replace_rate = 0.1\n\
        activation_default = sigmoid\n\
        activation_mutate_rate = 0.0\n\
        activation_options = sigmoid\n\
        aggregation_default = sum\n\
        aggregation_mutate_rate = 0.0\n\
        aggregation_options = sum\n\
        enabled_default = true\n\
        enabled_mutate_rate = 0.0\n\
        enabled_rate_to_true_add = 0.0\n\
        enabled_rate_to_false_add = 0.0\n";

    fn build_population(count: u64) -> (ConfigParser, BTreeMap<u64, Genome>) {
        let parser = ConfigParser::from_str(CONFIG);
        let config = Arc::new(GenomeConfig::new(&parser).unwrap());
        let population = (1..=count)
            .map(|gid| (gid, Genome::from_config(gid, Arc::clone(&config)).unwrap()))
            .collect();
        (parser, population)
    }

    #[test]
    fn speciate_covers_every_genome() {
        let (parser, population) = build_population(20);
        let mut species_set = SpeciesSet::new(&parser).unwrap();

        species_set.speciate(&population, 0);

        let mut speciated = BTreeSet::new();
        for species in species_set.species().values() {
            assert!(species.members().contains(&species.representative().key()));
            speciated.extend(species.members().iter().copied());
        }
        assert_eq!(speciated.len(), population.len());
    }

    #[test]
    fn species_identity_is_stable_across_generations() {
        let (parser, population) = build_population(10);
        let mut species_set = SpeciesSet::new(&parser).unwrap();

        species_set.speciate(&population, 0);
        let keys_before = species_set.species().keys().copied().collect::<Vec<_>>();

        // Same genomes again: each species should refresh its representative
        // rather than disappear or duplicate.
        species_set.speciate(&population, 1);
        let keys_after = species_set.species().keys().copied().collect::<Vec<_>>();
        assert_eq!(keys_before, keys_after);
    }

    #[test]
    fn new_species_stamp_their_generation() {
        let (parser, population) = build_population(5);
        let mut species_set = SpeciesSet::new(&parser).unwrap();

        species_set.speciate(&population, 7);

        for species in species_set.species().values() {
            assert_eq!(species.generation_created(), 7);
            assert_eq!(species.generation_last_improved(), 7);
        }
    }

    #[test]
    fn record_fitness_tracks_strict_improvement() {
        let (_, population) = build_population(1);
        let genome = population[&1].clone();
        let mut species = Species::new(1, 0, genome);

        species.record_fitness(1.0, 0);
        assert_eq!(species.generation_last_improved(), 0);

        species.record_fitness(1.0, 1);
        assert_eq!(species.generation_last_improved(), 0);

        species.record_fitness(2.0, 2);
        assert_eq!(species.generation_last_improved(), 2);

        species.record_fitness(1.5, 3);
        assert_eq!(species.generation_last_improved(), 2);
        assert_eq!(species.fitness_history(), &[1.0, 1.0, 2.0, 1.5]);
    }

    #[test]
    fn species_ids_increase_monotonically() {
        let (parser, population) = build_population(6);
        let mut species_set = SpeciesSet::new(&parser).unwrap();

        species_set.speciate(&population, 0);
        let max_before = species_set.species().keys().max().copied().unwrap_or(0);

        // A later population founds species with fresh ids only.
        let (_, later) = build_population(6);
        species_set.speciate(&later, 1);
        for key in species_set.species().keys() {
            assert!(*key <= species_set.next_species_id);
        }
        assert!(species_set.next_species_id > max_before);
    }
}
