use super::Attribute;
use crate::random_provider;
use axon_error::{AxonResult, axon_bail, axon_err, ensure};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

fn attribute_map(attributes: Vec<Attribute>) -> BTreeMap<String, Attribute> {
    attributes
        .into_iter()
        .map(|attr| (attr.name().to_string(), attr))
        .collect()
}

/// Per-attribute crossover shared by both gene kinds: every attribute present
/// in both parents is inherited from one of them, chosen uniformly at random.
/// Attributes present in only one parent are not carried over.
fn crossover_attributes(
    one: &BTreeMap<String, Attribute>,
    two: &BTreeMap<String, Attribute>,
) -> Vec<Attribute> {
    one.iter()
        .filter_map(|(name, attr)| {
            two.get(name).map(|other| {
                if random_provider::bool(0.5) {
                    other.clone()
                } else {
                    attr.clone()
                }
            })
        })
        .collect()
}

/// One node of the network graph: a structural key plus the attribute bag
/// driving its evaluation. Required attributes: `bias` (float/int),
/// `response` (float/int), `activation` (string), `aggregation` (string).
/// Extra named attributes are allowed and participate in mutation, copy,
/// and crossover.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeGene {
    key: i32,
    attributes: BTreeMap<String, Attribute>,
}

impl NodeGene {
    pub fn new(key: i32, attributes: Vec<Attribute>) -> AxonResult<Self> {
        let gene = NodeGene {
            key,
            attributes: attribute_map(attributes),
        };

        gene.verify_attributes()?;
        Ok(gene)
    }

    pub fn key(&self) -> i32 {
        self.key
    }

    pub fn attribute(&self, name: &str) -> AxonResult<&Attribute> {
        self.attributes
            .get(name)
            .ok_or_else(|| axon_err!(InvalidGene: "could not find attribute '{}' in node gene {}", name, self.key))
    }

    pub fn bias(&self) -> f32 {
        self.attributes["bias"].float_value()
    }

    pub fn response(&self) -> f32 {
        self.attributes["response"].float_value()
    }

    pub fn activation(&self) -> String {
        self.attributes["activation"].string_value()
    }

    pub fn aggregation(&self) -> String {
        self.attributes["aggregation"].string_value()
    }

    /// Mutates every attribute of this gene.
    pub fn mutate(&mut self) {
        for attr in self.attributes.values_mut() {
            attr.mutate_value();
        }
    }

    /// Distance to a node gene with the same key:
    /// `|Δbias| + |Δresponse| + [activation differs] + [aggregation differs]`,
    /// scaled by `weight_coef`.
    pub fn distance(&self, other: &NodeGene, weight_coef: f32) -> f32 {
        let mut dist = (self.bias() - other.bias()).abs()
            + (self.response() - other.response()).abs();
        if self.activation() != other.activation() {
            dist += 1.0;
        }
        if self.aggregation() != other.aggregation() {
            dist += 1.0;
        }
        dist * weight_coef
    }

    pub fn crossover(&self, other: &NodeGene) -> AxonResult<NodeGene> {
        ensure!(
            self.key == other.key,
            InvalidCrossover: "invalid crossover between node genes {} and {}", self.key, other.key
        );

        NodeGene::new(self.key, crossover_attributes(&self.attributes, &other.attributes))
    }

    fn verify_attributes(&self) -> AxonResult<()> {
        for name in ["bias", "response"] {
            match self.attributes.get(name) {
                Some(Attribute::Float(_)) | Some(Attribute::Int(_)) => {}
                Some(_) => {
                    axon_bail!(InvalidGene: "attribute '{}' must be a float or int attribute", name)
                }
                None => axon_bail!(InvalidGene: "node gene must contain a '{}' attribute", name),
            }
        }

        for name in ["activation", "aggregation"] {
            match self.attributes.get(name) {
                Some(Attribute::Str(_)) => {}
                Some(_) => {
                    axon_bail!(InvalidGene: "attribute '{}' must be a string attribute", name)
                }
                None => axon_bail!(InvalidGene: "node gene must contain a '{}' attribute", name),
            }
        }

        Ok(())
    }
}

impl Display for NodeGene {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NodeGene(key={}, bias={}, response={}, activation={}, aggregation={})",
            self.key,
            self.bias(),
            self.response(),
            self.activation(),
            self.aggregation()
        )
    }
}

/// One directed edge of the network graph, keyed by the ordered
/// `(in_node, out_node)` pair. Required attributes: `weight` (float/int) and
/// `enable` (bool).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConnectionGene {
    key: (i32, i32),
    attributes: BTreeMap<String, Attribute>,
}

impl ConnectionGene {
    pub fn new(key: (i32, i32), attributes: Vec<Attribute>) -> AxonResult<Self> {
        let gene = ConnectionGene {
            key,
            attributes: attribute_map(attributes),
        };

        gene.verify_attributes()?;
        Ok(gene)
    }

    pub fn key(&self) -> (i32, i32) {
        self.key
    }

    pub fn attribute(&self, name: &str) -> AxonResult<&Attribute> {
        self.attributes.get(name).ok_or_else(
            || axon_err!(InvalidGene: "could not find attribute '{}' in connection gene {:?}", name, self.key),
        )
    }

    pub fn weight(&self) -> f32 {
        self.attributes["weight"].float_value()
    }

    pub fn is_enabled(&self) -> bool {
        self.attributes["enable"].bool_value()
    }

    /// Mutates every attribute of this gene.
    pub fn mutate(&mut self) {
        for attr in self.attributes.values_mut() {
            attr.mutate_value();
        }
    }

    /// Distance to a connection gene with the same key:
    /// `|Δweight| + [enable differs]`, scaled by `weight_coef`.
    pub fn distance(&self, other: &ConnectionGene, weight_coef: f32) -> f32 {
        let mut dist = (self.weight() - other.weight()).abs();
        if self.is_enabled() != other.is_enabled() {
            dist += 1.0;
        }
        dist * weight_coef
    }

    pub fn crossover(&self, other: &ConnectionGene) -> AxonResult<ConnectionGene> {
        ensure!(
            self.key == other.key,
            InvalidCrossover: "invalid crossover between connection genes {:?} and {:?}", self.key, other.key
        );

        ConnectionGene::new(self.key, crossover_attributes(&self.attributes, &other.attributes))
    }

    pub fn enable(&mut self) {
        self.set_enabled(true);
    }

    pub fn disable(&mut self) {
        self.set_enabled(false);
    }

    // In-place assignment keeps the attribute's mutate rate intact.
    fn set_enabled(&mut self, enabled: bool) {
        if let Some(Attribute::Bool(attr)) = self.attributes.get_mut("enable") {
            attr.set_value(enabled);
        }
    }

    fn verify_attributes(&self) -> AxonResult<()> {
        match self.attributes.get("weight") {
            Some(Attribute::Float(_)) | Some(Attribute::Int(_)) => {}
            Some(_) => axon_bail!(InvalidGene: "attribute 'weight' must be a float or int attribute"),
            None => axon_bail!(InvalidGene: "connection gene must contain a 'weight' attribute"),
        }

        match self.attributes.get("enable") {
            Some(Attribute::Bool(_)) => {}
            Some(_) => axon_bail!(InvalidGene: "attribute 'enable' must be a bool attribute"),
            None => axon_bail!(InvalidGene: "connection gene must contain an 'enable' attribute"),
        }

        Ok(())
    }
}

impl Display for ConnectionGene {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConnectionGene(key=({}, {}), weight={}, enable={})",
            self.key.0,
            self.key.1,
            self.weight(),
            self.is_enabled()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{BoolAttribute, FloatAttribute, StringAttribute};
    use axon_error::ErrorCode;

    fn node_attributes(bias_mean: f32) -> Vec<Attribute> {
        vec![
            Attribute::Float(
                FloatAttribute::new("bias", bias_mean, 0.0, "gaussian", 0.5, 0.5, -30.0, 30.0)
                    .unwrap(),
            ),
            Attribute::Float(
                FloatAttribute::new("response", 1.0, 0.0, "gaussian", 0.5, 0.5, -30.0, 30.0)
                    .unwrap(),
            ),
            Attribute::Str(
                StringAttribute::new("activation", 0.0, vec!["sigmoid".to_string()]).unwrap(),
            ),
            Attribute::Str(
                StringAttribute::new("aggregation", 0.0, vec!["sum".to_string()]).unwrap(),
            ),
        ]
    }

    fn conn_attributes(weight_mean: f32, enabled: bool) -> Vec<Attribute> {
        vec![
            Attribute::Float(
                FloatAttribute::new("weight", weight_mean, 0.0, "gaussian", 0.5, 0.5, -30.0, 30.0)
                    .unwrap(),
            ),
            Attribute::Bool(BoolAttribute::new("enable", enabled, 0.25).unwrap()),
        ]
    }

    #[test]
    fn node_gene_requires_all_attributes() {
        let mut attrs = node_attributes(0.0);
        attrs.remove(0);
        let err = NodeGene::new(1, attrs).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidGene);
    }

    #[test]
    fn node_gene_requires_correct_types() {
        let mut attrs = node_attributes(0.0);
        attrs[2] = Attribute::Bool(BoolAttribute::new("activation", true, 0.0).unwrap());
        let err = NodeGene::new(1, attrs).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidGene);
    }

    #[test]
    fn node_distance_counts_mismatches() {
        let one = NodeGene::new(1, node_attributes(1.0)).unwrap();
        let two = NodeGene::new(1, node_attributes(3.0)).unwrap();

        // |1 - 3| = 2 for bias, everything else equal, coef 0.5
        assert_eq!(one.distance(&two, 0.5), 1.0);
        assert_eq!(one.distance(&one, 0.5), 0.0);
        assert_eq!(one.distance(&two, 0.5), two.distance(&one, 0.5));
    }

    #[test]
    fn conn_distance_counts_enable_flip() {
        let one = ConnectionGene::new((1, 2), conn_attributes(1.0, true)).unwrap();
        let two = ConnectionGene::new((1, 2), conn_attributes(1.0, false)).unwrap();

        assert_eq!(one.distance(&two, 1.0), 1.0);
        assert_eq!(one.distance(&one, 1.0), 0.0);
    }

    #[test]
    fn crossover_requires_matching_keys() {
        let one = NodeGene::new(1, node_attributes(0.0)).unwrap();
        let two = NodeGene::new(2, node_attributes(0.0)).unwrap();
        assert_eq!(one.crossover(&two).unwrap_err().code(), ErrorCode::InvalidCrossover);

        let one = ConnectionGene::new((1, 2), conn_attributes(1.0, true)).unwrap();
        let two = ConnectionGene::new((1, 3), conn_attributes(1.0, true)).unwrap();
        assert_eq!(one.crossover(&two).unwrap_err().code(), ErrorCode::InvalidCrossover);
    }

    #[test]
    fn crossover_picks_parent_values() {
        let one = NodeGene::new(1, node_attributes(1.0)).unwrap();
        let two = NodeGene::new(1, node_attributes(3.0)).unwrap();

        for _ in 0..20 {
            let child = one.crossover(&two).unwrap();
            assert!(child.bias() == one.bias() || child.bias() == two.bias());
            assert_eq!(child.key(), 1);
        }
    }

    #[test]
    fn enable_and_disable_flip_in_place() {
        let mut conn = ConnectionGene::new((1, 2), conn_attributes(1.0, true)).unwrap();
        let rate = conn.attribute("enable").unwrap().mutate_rate();

        conn.disable();
        assert!(!conn.is_enabled());
        conn.enable();
        assert!(conn.is_enabled());
        assert_eq!(conn.attribute("enable").unwrap().mutate_rate(), rate);
    }
}
