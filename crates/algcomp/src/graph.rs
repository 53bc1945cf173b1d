//! Mixed graphs and the comparison-graph derivations.
//!
//! A [`Graph`] is a set of named nodes and at most one edge per node pair.
//! Each edge carries an [`Endpoint`] mark at both ends, which is enough to
//! express DAGs, CPDAGs (directed and undirected edges) and PAGs (circle
//! and bidirected edges).

use crate::data::DataSet;
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// Whether a node is observed in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Measured,
    Latent,
}

/// Mark at one end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Tail,
    Arrow,
    Circle,
}

/// An edge in name form, oriented from `node1` to `node2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub node1: String,
    pub node2: String,
    /// Mark at `node1`.
    pub endpoint1: Endpoint,
    /// Mark at `node2`.
    pub endpoint2: Endpoint,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let left = match self.endpoint1 {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '<',
            Endpoint::Circle => 'o',
        };
        let right = match self.endpoint2 {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '>',
            Endpoint::Circle => 'o',
        };
        write!(f, "{} {}-{} {}", self.node1, left, right, self.node2)
    }
}

/// Graph over named nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: IndexMap<String, NodeType>,
    // Keyed by (i, j) with i < j; value is (mark at i, mark at j).
    edges: IndexMap<(usize, usize), (Endpoint, Endpoint)>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph with the given measured nodes and no edges.
    pub fn with_nodes<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut g = Self::new();
        for name in names {
            g.add_node(&name.into());
        }
        g
    }

    /// Add a measured node; returns its index. Existing names are reused.
    pub fn add_node(&mut self, name: &str) -> usize {
        self.insert_node(name, NodeType::Measured)
    }

    /// Add a latent node; returns its index.
    pub fn add_latent(&mut self, name: &str) -> usize {
        self.insert_node(name, NodeType::Latent)
    }

    fn insert_node(&mut self, name: &str, node_type: NodeType) -> usize {
        match self.nodes.get_index_of(name) {
            Some(i) => i,
            None => {
                self.nodes.insert(name.to_string(), node_type);
                self.nodes.len() - 1
            }
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Node names in insertion order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Names of measured nodes, in insertion order.
    pub fn measured_names(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|(_, t)| **t == NodeType::Measured)
            .map(|(n, _)| n.as_str())
    }

    pub fn node_type(&self, name: &str) -> Option<NodeType> {
        self.nodes.get(name).copied()
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.nodes.get_index_of(name)
    }

    fn name(&self, i: usize) -> &str {
        self.nodes.get_index(i).map_or("", |(n, _)| n.as_str())
    }

    /// Add or replace the edge between `a` and `b`, creating missing nodes
    /// as measured. Self-loops are ignored.
    pub fn add_edge(&mut self, a: &str, b: &str, at_a: Endpoint, at_b: Endpoint) {
        let i = self.add_node(a);
        let j = self.add_node(b);
        self.set_edge(i, j, at_a, at_b);
    }

    /// Add `a --> b`.
    pub fn add_directed(&mut self, a: &str, b: &str) {
        self.add_edge(a, b, Endpoint::Tail, Endpoint::Arrow);
    }

    /// Add `a --- b`.
    pub fn add_undirected(&mut self, a: &str, b: &str) {
        self.add_edge(a, b, Endpoint::Tail, Endpoint::Tail);
    }

    /// Add `a <-> b`.
    pub fn add_bidirected(&mut self, a: &str, b: &str) {
        self.add_edge(a, b, Endpoint::Arrow, Endpoint::Arrow);
    }

    /// Remove the edge between `a` and `b`, if any.
    pub fn remove_edge(&mut self, a: &str, b: &str) -> bool {
        match (self.index(a), self.index(b)) {
            (Some(i), Some(j)) if i != j => self.edges.shift_remove(&(i.min(j), i.max(j))).is_some(),
            _ => false,
        }
    }

    /// Marks of the edge between `a` and `b`, as (mark at a, mark at b).
    pub fn endpoints(&self, a: &str, b: &str) -> Option<(Endpoint, Endpoint)> {
        self.ends(self.index(a)?, self.index(b)?)
    }

    pub fn is_adjacent(&self, a: &str, b: &str) -> bool {
        self.endpoints(a, b).is_some()
    }

    /// Whether the graph contains `a --> b`.
    pub fn is_directed(&self, a: &str, b: &str) -> bool {
        self.endpoints(a, b) == Some((Endpoint::Tail, Endpoint::Arrow))
    }

    /// Every edge, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().map(|(&(i, j), &(ei, ej))| Edge {
            node1: self.name(i).to_string(),
            node2: self.name(j).to_string(),
            endpoint1: ei,
            endpoint2: ej,
        })
    }

    /// Edges rendered as `a --> b`, separated by `;`.
    pub fn edge_list(&self) -> String {
        self.edges()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }

    // Index-level helpers used by the derivations below.

    fn set_edge(&mut self, i: usize, j: usize, at_i: Endpoint, at_j: Endpoint) {
        if i == j {
            return;
        }
        if i < j {
            self.edges.insert((i, j), (at_i, at_j));
        } else {
            self.edges.insert((j, i), (at_j, at_i));
        }
    }

    fn ends(&self, i: usize, j: usize) -> Option<(Endpoint, Endpoint)> {
        if i == j {
            return None;
        }
        if i < j {
            self.edges.get(&(i, j)).copied()
        } else {
            self.edges.get(&(j, i)).map(|&(a, b)| (b, a))
        }
    }

    /// Mark at `j` on edge `i - j`.
    fn mark_at(&self, i: usize, j: usize) -> Option<Endpoint> {
        self.ends(i, j).map(|(_, at_j)| at_j)
    }

    fn set_mark_at(&mut self, i: usize, j: usize, mark: Endpoint) {
        if let Some((at_i, _)) = self.ends(i, j) {
            self.set_edge(i, j, at_i, mark);
        }
    }

    fn adjacent(&self, i: usize, j: usize) -> bool {
        self.ends(i, j).is_some()
    }

    fn neighbors(&self, i: usize) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&j| self.adjacent(i, j))
            .collect()
    }

    fn directed(&self, i: usize, j: usize) -> bool {
        self.ends(i, j) == Some((Endpoint::Tail, Endpoint::Arrow))
    }

    fn undirected(&self, i: usize, j: usize) -> bool {
        self.ends(i, j) == Some((Endpoint::Tail, Endpoint::Tail))
    }

    /// Same nodes, every adjacency marked `at_both` on both ends.
    fn skeleton(&self, at_both: Endpoint) -> Graph {
        let mut g = Graph {
            nodes: self.nodes.clone(),
            edges: IndexMap::new(),
        };
        for &(i, j) in self.edges.keys() {
            g.set_edge(i, j, at_both, at_both);
        }
        g
    }

    /// Markov equivalence class of this DAG, as a CPDAG.
    ///
    /// Keeps the orientation of unshielded colliders and of every edge that
    /// Meek's rules R1 to R3 force from them; all other adjacencies become
    /// undirected.
    pub fn cpdag(&self) -> Graph {
        let mut g = self.skeleton(Endpoint::Tail);
        let n = self.nodes.len();

        for c in 0..n {
            let parents: Vec<usize> = (0..n).filter(|&p| self.directed(p, c)).collect();
            for (k, &a) in parents.iter().enumerate() {
                for &b in &parents[k + 1..] {
                    if !self.adjacent(a, b) {
                        g.set_edge(a, c, Endpoint::Tail, Endpoint::Arrow);
                        g.set_edge(b, c, Endpoint::Tail, Endpoint::Arrow);
                    }
                }
            }
        }

        g.apply_meek_rules();
        g
    }

    fn apply_meek_rules(&mut self) {
        let n = self.nodes.len();
        let mut changed = true;
        while changed {
            changed = false;
            for b in 0..n {
                for c in self.neighbors(b) {
                    if !self.undirected(b, c) {
                        continue;
                    }
                    let nb = self.neighbors(b);

                    // R1: a --> b --- c, a and c non-adjacent.
                    let r1 = nb
                        .iter()
                        .any(|&a| a != c && self.directed(a, b) && !self.adjacent(a, c));

                    // R2: b --> a --> c with b --- c.
                    let r2 = nb
                        .iter()
                        .any(|&a| self.directed(b, a) && self.directed(a, c));

                    // R3: b --- a1 --> c, b --- a2 --> c, a1 and a2 non-adjacent.
                    let spouses: Vec<usize> = nb
                        .iter()
                        .copied()
                        .filter(|&a| a != c && self.undirected(b, a) && self.directed(a, c))
                        .collect();
                    let r3 = spouses.iter().enumerate().any(|(k, &a1)| {
                        spouses[k + 1..].iter().any(|&a2| !self.adjacent(a1, a2))
                    });

                    if r1 || r2 || r3 {
                        self.set_edge(b, c, Endpoint::Tail, Endpoint::Arrow);
                        changed = true;
                    }
                }
            }
        }
    }

    /// Graph over the measured nodes with latents marginalized out.
    ///
    /// Measured pairs sharing a latent parent become bidirected unless they
    /// are already adjacent.
    fn latent_projection(&self) -> Graph {
        let measured: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| self.nodes.get_index(i).map(|(_, t)| *t) == Some(NodeType::Measured))
            .collect();

        let mut g = Graph::with_nodes(measured.iter().map(|&i| self.name(i).to_string()));
        for e in self.edges() {
            if g.contains_node(&e.node1) && g.contains_node(&e.node2) {
                g.add_edge(&e.node1, &e.node2, e.endpoint1, e.endpoint2);
            }
        }

        for l in 0..self.nodes.len() {
            if measured.contains(&l) {
                continue;
            }
            let children: Vec<&str> = measured
                .iter()
                .filter(|&&c| self.directed(l, c))
                .map(|&c| self.name(c))
                .collect();
            for (k, a) in children.iter().enumerate() {
                for b in &children[k + 1..] {
                    if !g.is_adjacent(a, b) {
                        g.add_bidirected(a, b);
                    }
                }
            }
        }
        g
    }

    /// Partial ancestral graph of this DAG over its measured nodes.
    ///
    /// Latents are projected out one level (measured children of a common
    /// latent become bidirected). Every adjacency of the projection starts
    /// as `o-o`; unshielded colliders get arrowheads, then FCI rules R1 to R3
    /// propagate orientations.
    pub fn pag(&self) -> Graph {
        let proj = self.latent_projection();
        let mut g = proj.skeleton(Endpoint::Circle);
        let n = proj.nodes.len();

        for c in 0..n {
            let nb = proj.neighbors(c);
            for (k, &a) in nb.iter().enumerate() {
                for &b in &nb[k + 1..] {
                    if proj.adjacent(a, b) {
                        continue;
                    }
                    if proj.mark_at(a, c) == Some(Endpoint::Arrow)
                        && proj.mark_at(b, c) == Some(Endpoint::Arrow)
                    {
                        g.set_mark_at(a, c, Endpoint::Arrow);
                        g.set_mark_at(b, c, Endpoint::Arrow);
                    }
                }
            }
        }

        g.apply_fci_rules();
        g
    }

    fn apply_fci_rules(&mut self) {
        let n = self.nodes.len();
        let mut changed = true;
        while changed {
            changed = false;
            for b in 0..n {
                let nb = self.neighbors(b);
                for &c in &nb {
                    // R1: a *-> b o-* c, a and c non-adjacent => b --> c.
                    if self.mark_at(c, b) == Some(Endpoint::Circle)
                        && nb.iter().any(|&a| {
                            a != c && self.mark_at(a, b) == Some(Endpoint::Arrow) && !self.adjacent(a, c)
                        })
                    {
                        self.set_edge(b, c, Endpoint::Tail, Endpoint::Arrow);
                        changed = true;
                    }
                }
            }

            for a in 0..n {
                for c in self.neighbors(a) {
                    // R2: a --> b *-> c or a *-> b --> c, with a *-o c => a *-> c.
                    if self.mark_at(a, c) != Some(Endpoint::Circle) {
                        continue;
                    }
                    let forced = self.neighbors(a).into_iter().any(|b| {
                        b != c
                            && self.adjacent(b, c)
                            && ((self.directed(a, b) && self.mark_at(b, c) == Some(Endpoint::Arrow))
                                || (self.mark_at(a, b) == Some(Endpoint::Arrow) && self.directed(b, c)))
                    });
                    if forced {
                        self.set_mark_at(a, c, Endpoint::Arrow);
                        changed = true;
                    }
                }
            }

            for b in 0..n {
                let nb = self.neighbors(b);
                for &d in &nb {
                    // R3: a *-> b <-* c, a *-o d o-* c, a and c non-adjacent,
                    // d *-o b => d *-> b.
                    if self.mark_at(d, b) != Some(Endpoint::Circle) {
                        continue;
                    }
                    let colliders: Vec<usize> = nb
                        .iter()
                        .copied()
                        .filter(|&x| {
                            x != d
                                && self.mark_at(x, b) == Some(Endpoint::Arrow)
                                && self.mark_at(x, d) == Some(Endpoint::Circle)
                        })
                        .collect();
                    let forced = colliders.iter().enumerate().any(|(k, &a)| {
                        colliders[k + 1..].iter().any(|&c| !self.adjacent(a, c))
                    });
                    if forced {
                        self.set_mark_at(d, b, Endpoint::Arrow);
                        changed = true;
                    }
                }
            }
        }
    }

    /// Same nodes, keeping only edges for which `keep(node1, node2)` holds.
    pub fn filter_edges<F>(&self, keep: F) -> Graph
    where
        F: Fn(&str, &str) -> bool,
    {
        let mut g = Graph {
            nodes: self.nodes.clone(),
            edges: IndexMap::new(),
        };
        for (&(i, j), &ends) in &self.edges {
            if keep(self.name(i), self.name(j)) {
                g.edges.insert((i, j), ends);
            }
        }
        g
    }

    /// Edges whose endpoint variables have the types `graph_type` selects.
    ///
    /// A node absent from `data` (a latent, say) counts as continuous.
    pub fn edge_type_subgraph(&self, data: &DataSet, graph_type: GraphType) -> Graph {
        if graph_type == GraphType::AllEdges {
            return self.clone();
        }
        self.filter_edges(|a, b| {
            let da = data.is_discrete(a);
            let db = data.is_discrete(b);
            match graph_type {
                GraphType::AllEdges => true,
                GraphType::DiscreteDiscrete => da && db,
                GraphType::DiscreteContinuous => da != db,
                GraphType::ContinuousContinuous => !da && !db,
            }
        })
    }

    /// This graph re-keyed onto `reference`'s node set.
    ///
    /// The result lists `reference`'s nodes first, in its order, followed by
    /// any extra nodes of `self`; nodes `self` lacks appear isolated.
    pub fn aligned_to(&self, reference: &Graph) -> Graph {
        let mut g = Graph::new();
        for (name, t) in &reference.nodes {
            g.insert_node(name, *t);
        }
        for (name, t) in &self.nodes {
            g.insert_node(name, *t);
        }
        for e in self.edges() {
            g.add_edge(&e.node1, &e.node2, e.endpoint1, e.endpoint2);
        }
        g
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Graph Nodes:")?;
        writeln!(f, "{}", self.node_names().collect::<Vec<_>>().join(";"))?;
        writeln!(f)?;
        writeln!(f, "Graph Edges:")?;
        for (k, e) in self.edges().enumerate() {
            writeln!(f, "{}. {}", k + 1, e)?;
        }
        Ok(())
    }
}

/// Which edges of a graph a table covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphType {
    AllEdges,
    DiscreteDiscrete,
    DiscreteContinuous,
    ContinuousContinuous,
}

impl GraphType {
    /// Every graph type, in tensor order.
    pub const ALL: [GraphType; 4] = [
        GraphType::AllEdges,
        GraphType::DiscreteDiscrete,
        GraphType::DiscreteContinuous,
        GraphType::ContinuousContinuous,
    ];

    /// Number of graph types (first tensor dimension).
    pub const COUNT: usize = 4;

    pub fn index(&self) -> usize {
        match self {
            GraphType::AllEdges => 0,
            GraphType::DiscreteDiscrete => 1,
            GraphType::DiscreteContinuous => 2,
            GraphType::ContinuousContinuous => 3,
        }
    }

    /// Table heading.
    pub fn header(&self) -> &'static str {
        match self {
            GraphType::AllEdges => "All edges",
            GraphType::DiscreteDiscrete => "Discrete-discrete",
            GraphType::DiscreteContinuous => "Discrete-continuous",
            GraphType::ContinuousContinuous => "Continuous-continuous",
        }
    }
}

/// Reference structure estimated graphs are scored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonGraph {
    /// The generating DAG itself.
    #[default]
    TrueDag,
    /// The CPDAG of the generating DAG.
    Cpdag,
    /// The PAG of the generating DAG.
    Pag,
}

impl ComparisonGraph {
    pub fn name(&self) -> &'static str {
        match self {
            ComparisonGraph::TrueDag => "true-dag",
            ComparisonGraph::Cpdag => "cpdag",
            ComparisonGraph::Pag => "pag",
        }
    }

    /// Derive the comparison graph from a generating DAG.
    pub fn derive(&self, true_graph: &Graph) -> Graph {
        match self {
            ComparisonGraph::TrueDag => true_graph.clone(),
            ComparisonGraph::Cpdag => true_graph.cpdag(),
            ComparisonGraph::Pag => true_graph.pag(),
        }
    }
}

impl FromStr for ComparisonGraph {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "true-dag" | "dag" => Ok(ComparisonGraph::TrueDag),
            "cpdag" | "pattern" => Ok(ComparisonGraph::Cpdag),
            "pag" => Ok(ComparisonGraph::Pag),
            other => Err(format!("unknown comparison graph '{}'", other)),
        }
    }
}

impl fmt::Display for ComparisonGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
