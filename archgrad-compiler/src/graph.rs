//! The executable layer graph produced by the compiler.

use archgrad_core::nn::{Layer, LayerKind, Parameter};
use archgrad_core::{ArchGradError, Session, Tensor};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::{EdgeRef, Topo};
use petgraph::Direction;
use std::collections::HashMap;
use std::fmt;

/// One instantiated layer and the key it was compiled under.
#[derive(Debug)]
pub struct LayerNode {
    pub key: String,
    pub layer: Box<dyn Layer>,
}

/// A DAG of instantiated layers with a single root.
///
/// Edges carry no data: a node receives one tensor per incoming edge, ordered
/// by the creation order of its predecessors, and hands out one tensor per
/// outgoing edge in the creation order of its successors.
#[derive(Debug)]
pub struct LayerGraph {
    pub(crate) graph: DiGraph<LayerNode, ()>,
    pub(crate) input_shape: Vec<usize>,
}

/// The part of a rendered path up to where it joins a concat.
struct Rendered {
    tokens: Vec<String>,
    /// The concat the path ran into, and through how many edges.
    merge: Option<(NodeIndex, usize)>,
}

impl LayerGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Per-sample shape the root expects; batches add a leading axis.
    pub fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    /// The layer compiled under `key`.
    pub fn layer(&self, key: &str) -> Option<&dyn Layer> {
        self.graph
            .node_indices()
            .map(|n| &self.graph[n])
            .find(|node| node.key == key)
            .map(|node| node.layer.as_ref())
    }

    /// Layer kinds in execution order.
    pub fn kinds(&self) -> Vec<LayerKind> {
        self.execution_order()
            .into_iter()
            .map(|n| self.graph[n].layer.kind())
            .collect()
    }

    /// Every learnable parameter, layer by layer in execution order.
    pub fn parameters(&self) -> Vec<&Parameter> {
        self.execution_order()
            .into_iter()
            .flat_map(|n| self.graph[n].layer.parameters())
            .collect()
    }

    /// Runs the graph on `input` (`[batch, input_shape...]`) and returns the
    /// output of the first sink.
    pub fn forward(&self, session: &mut Session, input: &Tensor) -> Result<Tensor, ArchGradError> {
        self.forward_all(session, input)?
            .into_iter()
            .next()
            .ok_or_else(|| ArchGradError::InternalError("layer graph has no sink".to_string()))
    }

    /// Runs the graph and returns the output of every sink, in creation order.
    ///
    /// Nodes execute in topological order, so every node runs after all of its
    /// predecessors. All operations register with `session`.
    ///
    /// # Errors
    /// Any operation error, or `InternalError` when a node produces a number
    /// of tensors other than its out-degree (exactly one for a sink).
    pub fn forward_all(&self, session: &mut Session, input: &Tensor) -> Result<Vec<Tensor>, ArchGradError> {
        let mut in_flight: HashMap<EdgeIndex, Tensor> = HashMap::new();
        let mut outputs: Vec<(NodeIndex, Tensor)> = Vec::new();
        for node in self.execution_order() {
            let entry = &self.graph[node];
            let incoming = self.sorted_edges(node, Direction::Incoming);
            let inputs: Vec<Tensor> = if incoming.is_empty() {
                vec![input.clone()]
            } else {
                incoming
                    .iter()
                    .map(|edge| {
                        in_flight.remove(edge).ok_or_else(|| {
                            ArchGradError::InternalError(format!("no tensor on an edge into {}", entry.key))
                        })
                    })
                    .collect::<Result<_, _>>()?
            };

            let produced = entry.layer.forward(session, &inputs)?;
            let outgoing = self.sorted_edges(node, Direction::Outgoing);
            if produced.len() != outgoing.len().max(1) {
                return Err(ArchGradError::InternalError(format!(
                    "{} produced {} tensors for {} outgoing edges",
                    entry.key,
                    produced.len(),
                    outgoing.len()
                )));
            }
            log::trace!("forward: {} -> {:?}", entry.key, produced[0].shape());
            if outgoing.is_empty() {
                outputs.extend(produced.into_iter().map(|t| (node, t)));
            } else {
                in_flight.extend(outgoing.into_iter().zip(produced));
            }
        }
        outputs.sort_by_key(|(node, _)| *node);
        Ok(outputs.into_iter().map(|(_, t)| t).collect())
    }

    /// Seeds the loss gradient of every sink from `targets` (one per sink, in
    /// the order `forward_all` returns them) and returns the summed loss.
    ///
    /// # Errors
    /// `UnsupportedOperation` when a sink is not a loss node or the counts
    /// differ, `ShapeMismatch` from the loss itself.
    pub fn seed_loss(&self, outputs: &[Tensor], targets: &[Tensor]) -> Result<f32, ArchGradError> {
        let sinks = self.sinks();
        if outputs.len() != sinks.len() || targets.len() != sinks.len() {
            return Err(ArchGradError::UnsupportedOperation(format!(
                "graph has {} sinks but got {} outputs and {} targets",
                sinks.len(),
                outputs.len(),
                targets.len()
            )));
        }
        let mut total = 0.0;
        for ((sink, output), target) in sinks.into_iter().zip(outputs).zip(targets) {
            let node = &self.graph[sink];
            let loss = node.layer.as_loss().ok_or_else(|| {
                ArchGradError::UnsupportedOperation(format!("sink {} is not a loss node", node.key))
            })?;
            total += loss.seed_gradient(output, target)?;
        }
        Ok(total)
    }

    /// The grammar string of the compiled graph. Synthetic splits and the
    /// concats that close a module are implied by the module braces.
    pub fn architecture(&self) -> String {
        match self.roots().first() {
            Some(&root) => self.render_path(root).tokens.join(","),
            None => String::new(),
        }
    }

    pub(crate) fn execution_order(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.graph.node_count());
        let mut topo = Topo::new(&self.graph);
        while let Some(node) = topo.next(&self.graph) {
            order.push(node);
        }
        order
    }

    pub(crate) fn roots(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&n| self.degree(n, Direction::Incoming) == 0)
            .collect()
    }

    pub(crate) fn sinks(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&n| self.degree(n, Direction::Outgoing) == 0)
            .collect()
    }

    pub(crate) fn degree(&self, node: NodeIndex, direction: Direction) -> usize {
        self.graph.neighbors_directed(node, direction).count()
    }

    /// Neighbours in creation order.
    pub(crate) fn neighbors(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(node, direction).collect();
        neighbors.sort();
        neighbors
    }

    /// Edges of `node` sorted by the creation order of the node at their other end.
    fn sorted_edges(&self, node: NodeIndex, direction: Direction) -> Vec<EdgeIndex> {
        let mut edges: Vec<(NodeIndex, EdgeIndex)> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| match direction {
                Direction::Incoming => (edge.source(), edge.id()),
                Direction::Outgoing => (edge.target(), edge.id()),
            })
            .collect();
        edges.sort();
        edges.into_iter().map(|(_, edge)| edge).collect()
    }

    fn render_path(&self, start: NodeIndex) -> Rendered {
        let mut tokens = Vec::new();
        let mut node = start;
        loop {
            let layer = &self.graph[node].layer;
            if layer.kind() == LayerKind::Concat && self.degree(node, Direction::Incoming) > 1 {
                return Rendered {
                    tokens,
                    merge: Some((node, 1)),
                };
            }
            let successors = self.neighbors(node, Direction::Outgoing);
            if layer.kind() != LayerKind::Split {
                tokens.push(layer.architecture());
            }
            if successors.len() <= 1 {
                match successors.first() {
                    Some(&next) => node = next,
                    None => return Rendered { tokens, merge: None },
                }
                continue;
            }

            let branches: Vec<Rendered> = successors.iter().map(|&s| self.render_path(s)).collect();
            let body: Vec<String> = branches.iter().map(|b| b.tokens.join("~")).collect();
            tokens.push(format!("{{{}}}", body.join(",")));
            let merge = common_merge(&branches);
            match merge {
                Some((concat, arrivals)) if arrivals == self.degree(concat, Direction::Incoming) => {
                    // A concat closing the graph is implied by the braces.
                    match self.neighbors(concat, Direction::Outgoing).first() {
                        Some(&next) => node = next,
                        None => return Rendered { tokens, merge: None },
                    }
                }
                _ => return Rendered { tokens, merge },
            }
        }
    }
}

/// The concat every branch ran into, with the total number of edges that
/// reached it, or `None` if the branches do not meet.
fn common_merge(branches: &[Rendered]) -> Option<(NodeIndex, usize)> {
    let (first, _) = branches.first()?.merge?;
    let mut arrivals = 0;
    for branch in branches {
        match branch.merge {
            Some((concat, count)) if concat == first => arrivals += count,
            _ => return None,
        }
    }
    Some((first, arrivals))
}

impl fmt::Display for LayerGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.architecture())
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
