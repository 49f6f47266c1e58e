//! Turns a normalized component graph into a [`LayerGraph`].
//!
//! Layers are built in topological order because a layer's constructor needs
//! the output shapes of its predecessors. The post-processing passes then add
//! the default loss and activation nodes and bias rectifier inputs.

use crate::component::ComponentGraph;
use crate::error::CompileError;
use crate::graph::{LayerGraph, LayerNode};
use crate::options::CompileOptions;
use crate::patterns::{LayerSpec, Placement};
use archgrad_core::nn::layers::{Activation, Loss};
use archgrad_core::nn::{ActivationKind, Layer, LayerKind};
use archgrad_core::ArchGradError;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{EdgeRef, Topo};
use petgraph::Direction;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub(crate) fn build(components: &ComponentGraph, options: &CompileOptions) -> Result<LayerGraph, CompileError> {
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let source = components.graph();

    let mut layers: Vec<Option<Box<dyn Layer>>> = (0..source.node_count()).map(|_| None).collect();
    let mut input_shape = options.input_shape.clone();
    let mut topo = Topo::new(source);
    while let Some(node) = topo.next(source) {
        let component = &source[node];
        let mut predecessors: Vec<NodeIndex> = source.neighbors_directed(node, Direction::Incoming).collect();
        predecessors.sort();
        let input_shapes = if predecessors.is_empty() {
            vec![options.input_shape.clone()]
        } else {
            predecessors
                .iter()
                .map(|p| {
                    layers[p.index()]
                        .as_ref()
                        .map(|layer| layer.output_shape().to_vec())
                        .ok_or_else(|| {
                            ArchGradError::InternalError(format!("{} built before its inputs", component.key))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?
        };
        let placement = Placement {
            input_shapes: &input_shapes,
            out_degree: source.neighbors_directed(node, Direction::Outgoing).count(),
            is_source: predecessors.is_empty(),
        };
        let layer = component
            .spec
            .instantiate(&placement, &mut rng)
            .map_err(|error| CompileError::Layer {
                key: component.key.clone(),
                source: error,
            })?;
        if placement.is_source && matches!(component.spec, LayerSpec::Input { .. }) {
            input_shape = layer.output_shape().to_vec();
        }
        log::trace!("built {} with output {:?}", component.key, layer.output_shape());
        layers[node.index()] = Some(layer);
    }

    let mut graph = DiGraph::with_capacity(source.node_count(), source.edge_count());
    for (index, layer) in layers.into_iter().enumerate() {
        let key = source[NodeIndex::new(index)].key.clone();
        let layer = layer.ok_or_else(|| ArchGradError::InternalError(format!("{} was never built", key)))?;
        graph.add_node(LayerNode { key, layer });
    }
    for edge in source.edge_references() {
        graph.add_edge(edge.source(), edge.target(), ());
    }

    let mut layer_graph = LayerGraph { graph, input_shape };
    if options.add_loss_layer {
        add_loss_layers(&mut layer_graph, options);
    }
    if options.add_activation_layers {
        add_activation_layers(&mut layer_graph, options);
    }
    bias_rectifier_inputs(&layer_graph, options.relu_bias);
    log::debug!(
        "compiled {} layers and {} edges: {}",
        layer_graph.node_count(),
        layer_graph.edge_count(),
        layer_graph
    );
    Ok(layer_graph)
}

/// Terminates every sink that is not already a loss with the default loss.
fn add_loss_layers(layers: &mut LayerGraph, options: &CompileOptions) {
    for sink in layers.sinks() {
        let node = &layers.graph[sink];
        if node.layer.kind() == LayerKind::Loss {
            continue;
        }
        let loss = Loss::new(options.default_loss, node.layer.output_shape());
        let key = format!("{}#{}", options.default_loss, layers.graph.node_count());
        log::debug!("adding {} after sink {}", key, node.key);
        let added = layers.graph.add_node(LayerNode {
            key,
            layer: Box::new(loss),
        });
        layers.graph.add_edge(sink, added, ());
    }
}

/// Places the default activation after every node that asks for one, past a
/// single following max-pool, unless an activation or loss already follows.
fn add_activation_layers(layers: &mut LayerGraph, options: &CompileOptions) {
    let candidates: Vec<NodeIndex> = layers
        .graph
        .node_indices()
        .filter(|&n| layers.graph[n].layer.needs_activation())
        .collect();
    for node in candidates {
        let mut target = node;
        if let [next] = layers.neighbors(node, Direction::Outgoing).as_slice() {
            if layers.graph[*next].layer.kind() == LayerKind::MaxPool {
                target = *next;
            }
        }
        let followed = layers.neighbors(target, Direction::Outgoing).into_iter().any(|n| {
            matches!(
                layers.graph[n].layer.kind(),
                LayerKind::Activation | LayerKind::Loss
            )
        });
        if followed {
            continue;
        }
        insert_activation(layers, target, options.default_activation);
    }
}

/// Moves the outgoing edges of `node` onto a new activation fed by `node`.
fn insert_activation(layers: &mut LayerGraph, node: NodeIndex, kind: ActivationKind) {
    let activation = Activation::new(kind, layers.graph[node].layer.output_shape());
    let key = format!("{}#{}", kind, layers.graph.node_count());
    log::debug!("adding {} after {}", key, layers.graph[node].key);
    let targets = layers.neighbors(node, Direction::Outgoing);
    let added = layers.graph.add_node(LayerNode {
        key,
        layer: Box::new(activation),
    });
    for target in targets {
        if let Some(edge) = layers.graph.find_edge(node, target) {
            layers.graph.remove_edge(edge);
        }
        layers.graph.add_edge(added, target, ());
    }
    layers.graph.add_edge(node, added, ());
}

/// Gives every trainable node feeding a rectifier directly a positive bias,
/// so units start out active.
fn bias_rectifier_inputs(layers: &LayerGraph, bias: f32) {
    for node in layers.graph.node_indices() {
        let entry = &layers.graph[node];
        if !entry.layer.is_trainable() {
            continue;
        }
        let feeds_relu = layers
            .neighbors(node, Direction::Outgoing)
            .into_iter()
            .any(|n| layers.graph[n].layer.activation_kind() == Some(ActivationKind::Relu));
        if feeds_relu {
            log::trace!("bias {} of {}", bias, entry.key);
            entry.layer.init_bias(bias);
        }
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
