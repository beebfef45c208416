use super::{Attribute, BoolAttribute, ConnectionGene, FloatAttribute, GenomeConfig, NodeGene, StringAttribute};
use crate::activations::activate_value;
use crate::aggregations::aggregate_vector;
use crate::random_provider;
use axon_error::{AxonResult, axon_bail, ensure};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

/// A feed-forward network described as a graph of node genes and weighted
/// connection genes, plus the cached linearization that makes repeated
/// evaluation cheap.
///
/// Node ids follow a fixed convention: inputs are negative (`-1, -2, …`),
/// outputs occupy `[0, num_outputs)`, and hidden nodes are `>= num_outputs`.
/// The id alone identifies a node's role.
///
/// The enabled subgraph is always acyclic; cycles may only ever exist among
/// disabled connections. `activate()` computes a topological order over the
/// enabled subgraph (inputs first, outputs last) and caches it until the next
/// mutation invalidates it.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Genome {
    key: u64,
    fitness: f32,
    nodes: BTreeMap<i32, NodeGene>,
    connections: BTreeMap<(i32, i32), ConnectionGene>,
    input_keys: Vec<i32>,
    output_keys: Vec<i32>,
    hidden_keys: BTreeSet<i32>,
    forward_order: Vec<i32>,
    node_inputs_map: BTreeMap<i32, BTreeSet<i32>>,
    activated: bool,
    config: Arc<GenomeConfig>,
}

impl Genome {
    /// Builds a genome with the configured initial topology:
    /// `num_inputs` input nodes (`-1, -2, …`), `num_outputs` output nodes
    /// (`0, 1, …`), `num_hidden` hidden nodes (`num_outputs, …`), wired
    /// according to `initial_connection`.
    pub fn from_config(key: u64, config: Arc<GenomeConfig>) -> AxonResult<Self> {
        let mut genome = Genome {
            key,
            fitness: 0.0,
            nodes: BTreeMap::new(),
            connections: BTreeMap::new(),
            input_keys: Vec::new(),
            output_keys: Vec::new(),
            hidden_keys: BTreeSet::new(),
            forward_order: Vec::new(),
            node_inputs_map: BTreeMap::new(),
            activated: false,
            config,
        };

        for in_node in 1..=genome.config.num_inputs {
            let node_key = -in_node;
            let node = genome.new_node(node_key)?;
            genome.nodes.insert(node_key, node);
            genome.input_keys.push(node_key);
        }

        for out_node in 0..genome.config.num_outputs {
            let node = genome.new_node(out_node)?;
            genome.nodes.insert(out_node, node);
            genome.output_keys.push(out_node);
        }

        for hid_node in 0..genome.config.num_hidden {
            let node_key = hid_node + genome.config.num_outputs;
            let node = genome.new_node(node_key)?;
            genome.nodes.insert(node_key, node);
            genome.hidden_keys.insert(node_key);
        }

        let connection_list = match genome.config.initial_connection.as_str() {
            "full_direct" => genome.full_connections(true),
            "full_indirect" => genome.full_connections(false),
            other => {
                axon_bail!(InvalidConfig: "invalid initial_connection '{}' provided", other)
            }
        };

        for conn_key in connection_list {
            let conn = genome.new_connection(conn_key)?;
            genome.connections.insert(conn_key, conn);
        }

        Ok(genome)
    }

    /// Builds a child genome from two parents. The fitter parent leads: every
    /// gene it carries is inherited, through per-attribute crossover when the
    /// other parent shares the gene and as a plain copy otherwise. Genes
    /// present only in the less fit parent are not inherited.
    pub fn from_crossover(key: u64, one: &Genome, two: &Genome) -> AxonResult<Self> {
        let (primary, secondary) = if two.fitness > one.fitness {
            (two, one)
        } else {
            (one, two)
        };

        let mut nodes = BTreeMap::new();
        for (node_key, node) in &primary.nodes {
            let child_node = match secondary.nodes.get(node_key) {
                Some(other) => node.crossover(other)?,
                None => node.clone(),
            };
            nodes.insert(*node_key, child_node);
        }

        let mut connections = BTreeMap::new();
        for (conn_key, conn) in &primary.connections {
            let child_conn = match secondary.connections.get(conn_key) {
                Some(other) => conn.crossover(other)?,
                None => conn.clone(),
            };
            connections.insert(*conn_key, child_conn);
        }

        let num_outputs = primary.output_keys.len() as i32;
        let hidden_keys = nodes
            .keys()
            .copied()
            .filter(|node_key| *node_key >= num_outputs)
            .collect();

        Ok(Genome {
            key,
            fitness: 0.0,
            nodes,
            connections,
            input_keys: primary.input_keys.clone(),
            output_keys: primary.output_keys.clone(),
            hidden_keys,
            forward_order: Vec::new(),
            node_inputs_map: BTreeMap::new(),
            activated: false,
            config: Arc::clone(&primary.config),
        })
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    pub fn config(&self) -> &Arc<GenomeConfig> {
        &self.config
    }

    pub fn nodes(&self) -> &BTreeMap<i32, NodeGene> {
        &self.nodes
    }

    pub fn connections(&self) -> &BTreeMap<(i32, i32), ConnectionGene> {
        &self.connections
    }

    // Sizes come from the key collections rather than the config; structural
    // mutation changes them after construction.
    pub fn num_inputs(&self) -> usize {
        self.input_keys.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.output_keys.len()
    }

    pub fn num_hidden(&self) -> usize {
        self.hidden_keys.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    fn new_node(&self, node_key: i32) -> AxonResult<NodeGene> {
        let config = &self.config;

        let bias = FloatAttribute::new(
            "bias",
            config.bias.init_mean,
            config.bias.init_stdev,
            config.bias.init_type.as_str(),
            config.bias.mutate_rate,
            config.bias.mutate_power,
            config.bias.min_value,
            config.bias.max_value,
        )?;
        let response = FloatAttribute::new(
            "response",
            config.response.init_mean,
            config.response.init_stdev,
            config.response.init_type.as_str(),
            config.response.mutate_rate,
            config.response.mutate_power,
            config.response.min_value,
            config.response.max_value,
        )?;
        let activation = StringAttribute::new(
            "activation",
            config.activation_mutate_rate,
            config.activation_options.clone(),
        )?;
        let aggregation = StringAttribute::new(
            "aggregation",
            config.aggregation_mutate_rate,
            config.aggregation_options.clone(),
        )?;

        NodeGene::new(
            node_key,
            vec![
                Attribute::Float(bias),
                Attribute::Float(response),
                Attribute::Str(activation),
                Attribute::Str(aggregation),
            ],
        )
    }

    fn new_connection(&self, conn_key: (i32, i32)) -> AxonResult<ConnectionGene> {
        let config = &self.config;

        let weight = FloatAttribute::new(
            "weight",
            config.weight.init_mean,
            config.weight.init_stdev,
            config.weight.init_type.as_str(),
            config.weight.mutate_rate,
            config.weight.mutate_power,
            config.weight.min_value,
            config.weight.max_value,
        )?;
        let enable = BoolAttribute::new("enable", config.enabled_default, config.enabled_mutate_rate)?;

        ConnectionGene::new(conn_key, vec![Attribute::Float(weight), Attribute::Bool(enable)])
    }

    /// Initial wiring. Direct: inputs→hidden (when hidden exist),
    /// inputs→outputs, hidden→outputs. Indirect: inputs→hidden and
    /// hidden→outputs only; with no hidden nodes it degenerates to direct.
    fn full_connections(&self, direct: bool) -> Vec<(i32, i32)> {
        let mut connections = Vec::new();

        if direct || self.hidden_keys.is_empty() {
            for in_key in &self.input_keys {
                for hid_key in &self.hidden_keys {
                    connections.push((*in_key, *hid_key));
                }
                for out_key in &self.output_keys {
                    connections.push((*in_key, *out_key));
                }
            }
            for hid_key in &self.hidden_keys {
                for out_key in &self.output_keys {
                    connections.push((*hid_key, *out_key));
                }
            }
        } else {
            for in_key in &self.input_keys {
                for hid_key in &self.hidden_keys {
                    connections.push((*in_key, *hid_key));
                }
            }
            for hid_key in &self.hidden_keys {
                for out_key in &self.output_keys {
                    connections.push((*hid_key, *out_key));
                }
            }
        }

        connections
    }

    /// Rebuilds the enabled in-neighbor sets from the connection map.
    /// Runs in O(nodes + connections).
    fn generate_node_inputs(&mut self) {
        self.node_inputs_map.clear();

        for node_key in self.nodes.keys() {
            self.node_inputs_map.insert(*node_key, BTreeSet::new());
        }

        for (conn_key, conn) in &self.connections {
            if conn.is_enabled() {
                let (in_key, out_key) = *conn_key;
                if let Some(inputs) = self.node_inputs_map.get_mut(&out_key) {
                    inputs.insert(in_key);
                }
            }
        }
    }

    /// Mutates the genome: four independent structural trials driven by the
    /// configured probabilities, then an attribute mutation sweep over every
    /// gene. Any cached activation is invalidated.
    pub fn mutate(&mut self) -> AxonResult<()> {
        self.activated = false;
        self.forward_order.clear();

        if random_provider::bool(self.config.node_add_prob) {
            self.mutate_add_node()?;
        }
        if random_provider::bool(self.config.node_delete_prob) {
            self.mutate_delete_node();
        }
        if random_provider::bool(self.config.conn_add_prob) {
            self.mutate_add_conn()?;
        }
        if random_provider::bool(self.config.conn_delete_prob) {
            self.mutate_delete_conn();
        }

        for node in self.nodes.values_mut() {
            node.mutate();
        }
        for conn in self.connections.values_mut() {
            conn.mutate();
        }

        Ok(())
    }

    /// Splits a uniformly chosen connection: the connection is disabled, a
    /// fresh hidden node is inserted, and two freshly initialized connections
    /// route around it. No-op when the genome has no connections.
    pub(crate) fn mutate_add_node(&mut self) -> AxonResult<()> {
        if self.connections.is_empty() {
            return Ok(());
        }

        let index = random_provider::range(0..self.connections.len());
        let Some(conn_key) = self.connections.keys().nth(index).copied() else {
            return Ok(());
        };
        let (in_key, out_key) = conn_key;

        // Hidden ids start at num_outputs; skip past ids still occupied after
        // earlier deletes so the insert never replaces an existing node.
        let mut node_key = self.output_keys.len() as i32 + self.hidden_keys.len() as i32;
        while self.nodes.contains_key(&node_key) {
            node_key += 1;
        }

        let node = self.new_node(node_key)?;
        self.nodes.insert(node_key, node);
        self.hidden_keys.insert(node_key);

        if let Some(conn) = self.connections.get_mut(&conn_key) {
            conn.disable();
        }

        let in_conn = self.new_connection((in_key, node_key))?;
        self.connections.insert((in_key, node_key), in_conn);
        let out_conn = self.new_connection((node_key, out_key))?;
        self.connections.insert((node_key, out_key), out_conn);

        Ok(())
    }

    /// Removes a uniformly chosen hidden node and every connection incident
    /// to it. No-op when the genome has no hidden nodes.
    pub(crate) fn mutate_delete_node(&mut self) {
        if self.hidden_keys.is_empty() {
            return;
        }

        let index = random_provider::range(0..self.hidden_keys.len());
        let Some(node_key) = self.hidden_keys.iter().nth(index).copied() else {
            return;
        };

        self.nodes.remove(&node_key);
        self.hidden_keys.remove(&node_key);

        let incident = self
            .connections
            .keys()
            .copied()
            .filter(|(in_key, out_key)| *in_key == node_key || *out_key == node_key)
            .collect::<Vec<_>>();
        for conn_key in incident {
            self.connections.remove(&conn_key);
        }
    }

    /// Adds a uniformly chosen admissible connection: source in
    /// inputs ∪ hidden, sink in hidden ∪ outputs, no self-loop, not already
    /// present, and not closing a cycle. No-op when no pair is admissible.
    pub(crate) fn mutate_add_conn(&mut self) -> AxonResult<()> {
        let possible_inputs = self
            .input_keys
            .iter()
            .chain(self.hidden_keys.iter())
            .copied()
            .collect::<BTreeSet<_>>();
        let possible_outputs = self
            .hidden_keys
            .iter()
            .chain(self.output_keys.iter())
            .copied()
            .collect::<BTreeSet<_>>();

        let mut candidates = Vec::new();
        for in_key in &possible_inputs {
            for out_key in &possible_outputs {
                let conn_key = (*in_key, *out_key);
                if in_key == out_key {
                    continue;
                }
                if self.connections.contains_key(&conn_key) {
                    continue;
                }
                if self.creates_cycle(conn_key) {
                    continue;
                }
                candidates.push(conn_key);
            }
        }

        if candidates.is_empty() {
            return Ok(());
        }

        let conn_key = *random_provider::choose(&candidates);
        let conn = self.new_connection(conn_key)?;
        self.connections.insert(conn_key, conn);

        Ok(())
    }

    /// Removes a uniformly chosen connection. No-op when none exist.
    pub(crate) fn mutate_delete_conn(&mut self) {
        if self.connections.is_empty() {
            return;
        }

        let index = random_provider::range(0..self.connections.len());
        if let Some(conn_key) = self.connections.keys().nth(index).copied() {
            self.connections.remove(&conn_key);
        }
    }

    /// Whether inserting `conn` would close a directed cycle: BFS from the
    /// prospective sink across the connection graph, reporting true when the
    /// prospective source is reachable.
    pub(crate) fn creates_cycle(&self, conn: (i32, i32)) -> bool {
        let mut adjacency: BTreeMap<i32, Vec<i32>> = BTreeMap::new();
        for (in_key, out_key) in self.connections.keys() {
            adjacency.entry(*in_key).or_default().push(*out_key);
        }

        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([conn.1]);

        while let Some(current) = queue.pop_front() {
            visited.insert(current);
            for out_key in adjacency.get(&current).into_iter().flatten() {
                if *out_key == conn.0 {
                    return true;
                }
                if !visited.contains(out_key) {
                    queue.push_back(*out_key);
                }
            }
        }

        false
    }

    /// Computes and caches the evaluation order: inputs first in insertion
    /// order, then hidden nodes as their enabled inputs become available,
    /// then outputs. Hidden nodes whose inputs can never be satisfied are
    /// dropped from the order and ignored by `forward`.
    pub fn activate(&mut self) {
        self.forward_order.clear();
        self.generate_node_inputs();

        let mut added = BTreeSet::new();
        for in_key in &self.input_keys {
            self.forward_order.push(*in_key);
            added.insert(*in_key);
        }

        let mut remaining = self.hidden_keys.clone();
        loop {
            let ready = remaining
                .iter()
                .copied()
                .filter(|node_key| {
                    self.node_inputs_map
                        .get(node_key)
                        .is_some_and(|inputs| inputs.iter().all(|input| added.contains(input)))
                })
                .collect::<Vec<_>>();

            if ready.is_empty() {
                break;
            }

            for node_key in ready {
                self.forward_order.push(node_key);
                added.insert(node_key);
                remaining.remove(&node_key);
            }
        }

        for out_key in &self.output_keys {
            self.forward_order.push(*out_key);
        }

        self.activated = true;
    }

    /// Evaluates the network against the cached order. Input nodes take their
    /// value straight from `inputs`; every other node aggregates its enabled
    /// in-neighbors' weighted values and applies
    /// `activation(bias + response * aggregate)`. Returns the output node
    /// values in output-key order.
    pub fn forward(&self, inputs: &[f32]) -> AxonResult<Vec<f32>> {
        ensure!(self.activated, NotActivated: "genome {} must be activated before forward", self.key);
        ensure!(
            inputs.len() == self.input_keys.len(),
            ArityMismatch: "incorrect number of inputs provided, given: {}, need: {}",
            inputs.len(),
            self.input_keys.len()
        );

        let mut values: BTreeMap<i32, f32> = BTreeMap::new();

        for node_key in &self.forward_order {
            let value = match self.input_keys.iter().position(|in_key| in_key == node_key) {
                Some(index) => inputs[index],
                None => {
                    let node = &self.nodes[node_key];

                    // In-neighbors dropped from the order have no computed
                    // value and contribute nothing.
                    let weighted = self.node_inputs_map[node_key]
                        .iter()
                        .filter_map(|in_key| {
                            values
                                .get(in_key)
                                .map(|value| value * self.connections[&(*in_key, *node_key)].weight())
                        })
                        .collect::<Vec<_>>();

                    let aggregated = aggregate_vector(&weighted, &node.aggregation())?;
                    activate_value(node.bias() + node.response() * aggregated, &node.activation())?
                }
            };

            values.insert(*node_key, value);
        }

        Ok(self
            .output_keys
            .iter()
            .map(|out_key| values.get(out_key).copied().unwrap_or(0.0))
            .collect())
    }

    /// Compatibility distance: for nodes and connections separately, the
    /// weighted disjoint-gene count plus the summed homologous gene
    /// distances, normalized by the larger genome's gene count; the two
    /// parts are then summed.
    pub fn distance(&self, other: &Genome) -> f32 {
        let disjoint_coef = self.config.compatibility_disjoint_coefficient;
        let weight_coef = self.config.compatibility_weight_coefficient;

        let mut node_dist = 0.0;
        let mut shared_nodes = 0usize;
        for (node_key, node) in &self.nodes {
            if let Some(other_node) = other.nodes.get(node_key) {
                node_dist += node.distance(other_node, weight_coef);
                shared_nodes += 1;
            }
        }
        let disjoint_nodes = (self.nodes.len() - shared_nodes) + (other.nodes.len() - shared_nodes);
        let node_norm = self.nodes.len().max(other.nodes.len()).max(1) as f32;
        let node_part = (disjoint_coef * disjoint_nodes as f32 + node_dist) / node_norm;

        let mut conn_dist = 0.0;
        let mut shared_conns = 0usize;
        for (conn_key, conn) in &self.connections {
            if let Some(other_conn) = other.connections.get(conn_key) {
                conn_dist += conn.distance(other_conn, weight_coef);
                shared_conns += 1;
            }
        }
        let disjoint_conns =
            (self.connections.len() - shared_conns) + (other.connections.len() - shared_conns);
        let conn_norm = self.connections.len().max(other.connections.len()).max(1) as f32;
        let conn_part = (disjoint_coef * disjoint_conns as f32 + conn_dist) / conn_norm;

        (node_part + conn_part).abs()
    }
}
