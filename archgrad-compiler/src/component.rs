//! Assembly of parsed statements into the intermediate component graph.
//!
//! Named definitions are resolved lexically and instantiated once, on first
//! reference, so every later reference reuses the same vertices. Modules
//! splice in as their source and sink sets. [`ComponentGraph::normalize`] then
//! closes modules left open at the end of the graph, makes fan-out and fan-in
//! explicit with split and concat vertices and leaves a single root.

use crate::error::CompileError;
use crate::parser::{Segment, Statement};
use crate::patterns::LayerSpec;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};

/// A vertex of the component graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Unique key: the definition name, or the token plus a counter.
    pub key: String,
    pub spec: LayerSpec,
}

#[derive(Debug, Default)]
pub struct ComponentGraph {
    graph: DiGraph<Component, ()>,
    /// Sink sets of multi-exit modules, innermost first.
    module_exits: Vec<Vec<NodeIndex>>,
}

/// The vertices a chain segment exposes to its neighbours.
#[derive(Debug, Clone, Default)]
struct Endpoint {
    sources: Vec<NodeIndex>,
    sinks: Vec<NodeIndex>,
}

/// Definitions visible at one nesting level.
struct Scope<'s> {
    parent: Option<&'s Scope<'s>>,
    definitions: HashMap<&'s str, &'s [Segment]>,
    resolved: RefCell<HashMap<String, Endpoint>>,
    pending: RefCell<HashSet<String>>,
}

impl<'s> Scope<'s> {
    fn new(statements: &'s [Statement], parent: Option<&'s Scope<'s>>) -> Result<Self, CompileError> {
        let mut definitions = HashMap::new();
        for statement in statements {
            if let Statement::Define { name, value } = statement {
                if definitions.insert(name.as_str(), value.as_slice()).is_some() {
                    return Err(CompileError::DuplicateVertex { name: name.clone() });
                }
            }
        }
        Ok(Scope {
            parent,
            definitions,
            resolved: RefCell::new(HashMap::new()),
            pending: RefCell::new(HashSet::new()),
        })
    }

    /// The innermost scope defining `name`, with the definition's value.
    fn lookup(&self, name: &str) -> Option<(&Scope<'s>, &'s [Segment])> {
        match self.definitions.get(name) {
            Some(&value) => Some((self, value)),
            None => self.parent.and_then(|parent| parent.lookup(name)),
        }
    }

    fn warn_unused(&self) {
        let resolved = self.resolved.borrow();
        for name in self.definitions.keys() {
            if !resolved.contains_key(*name) {
                log::warn!("definition {} is never referenced", name);
            }
        }
    }
}

impl ComponentGraph {
    /// Builds the graph described by the top-level `statements`.
    ///
    /// At this level a chain opening with an anonymous segment continues from
    /// the tail of the previous chain; one opening with a named vertex starts
    /// there.
    ///
    /// # Errors
    /// `DuplicateVertex`, `DuplicateEdge`, `UnrecognizedArchitecture`,
    /// `CyclicArchitecture` for self-referencing definitions, and
    /// `InvalidArchitecture` if no layer is declared.
    pub fn assemble(statements: &[Statement]) -> Result<Self, CompileError> {
        let mut assembler = ComponentGraph::default();
        let scope = Scope::new(statements, None)?;
        let mut tail: Option<Endpoint> = None;
        for segments in chains(statements) {
            let starts_named = matches!(
                segments.first(),
                Some(Segment::Token(token)) if scope.lookup(token).is_some()
            );
            let previous = if starts_named { None } else { tail.as_ref() };
            let endpoint = assembler.chain(segments, &scope, previous)?;
            tail = Some(endpoint);
        }
        scope.warn_unused();
        if assembler.graph.node_count() == 0 {
            return Err(CompileError::InvalidArchitecture(
                "architecture declares no layers".to_string(),
            ));
        }
        Ok(assembler)
    }

    pub fn graph(&self) -> &DiGraph<Component, ()> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Rejects cycles, closes every module whose branches still end the graph
    /// with a concat, joins multiple roots under a split, then gives every
    /// fan-out a split and every fan-in a concat.
    pub fn normalize(&mut self) -> Result<(), CompileError> {
        petgraph::algo::toposort(&self.graph, None).map_err(|cycle| CompileError::CyclicArchitecture {
            key: self.graph[cycle.node_id()].key.clone(),
        })?;
        self.close_open_modules();

        let roots: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&n| self.degree(n, Direction::Incoming) == 0)
            .collect();
        if roots.len() > 1 {
            let split = self.add_component(None, LayerSpec::Split);
            log::debug!("joining {} roots under {}", roots.len(), self.graph[split].key);
            for root in roots {
                self.graph.add_edge(split, root, ());
            }
        }

        let nodes: Vec<NodeIndex> = self.graph.node_indices().collect();
        for &node in &nodes {
            if self.graph[node].spec != LayerSpec::Split && self.degree(node, Direction::Outgoing) > 1 {
                self.insert_after(node, LayerSpec::Split);
            }
        }
        for &node in &nodes {
            if self.graph[node].spec != LayerSpec::Concat && self.degree(node, Direction::Incoming) > 1 {
                self.insert_before(node, LayerSpec::Concat);
            }
        }
        Ok(())
    }

    /// Gives every module with more than one branch still ending the graph a
    /// single exit. Outer modules go first, so nested open modules share it.
    fn close_open_modules(&mut self) {
        for exits in std::mem::take(&mut self.module_exits).into_iter().rev() {
            let open: Vec<NodeIndex> = exits
                .into_iter()
                .filter(|&n| self.degree(n, Direction::Outgoing) == 0)
                .collect();
            if open.len() < 2 {
                continue;
            }
            let concat = self.add_component(None, LayerSpec::Concat);
            log::debug!("closing {} open branches with {}", open.len(), self.graph[concat].key);
            for node in open {
                self.graph.add_edge(node, concat, ());
            }
        }
    }

    fn degree(&self, node: NodeIndex, direction: Direction) -> usize {
        self.graph.neighbors_directed(node, direction).count()
    }

    /// Neighbours in creation order.
    fn sorted_neighbors(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(node, direction).collect();
        neighbors.sort();
        neighbors
    }

    /// Moves every outgoing edge of `node` onto a new vertex fed by `node`.
    fn insert_after(&mut self, node: NodeIndex, spec: LayerSpec) -> NodeIndex {
        let targets = self.sorted_neighbors(node, Direction::Outgoing);
        let inserted = self.add_component(None, spec);
        log::debug!("inserted {} after {}", self.graph[inserted].key, self.graph[node].key);
        for target in targets {
            if let Some(edge) = self.graph.find_edge(node, target) {
                self.graph.remove_edge(edge);
            }
            self.graph.add_edge(inserted, target, ());
        }
        self.graph.add_edge(node, inserted, ());
        inserted
    }

    /// Moves every incoming edge of `node` onto a new vertex feeding `node`.
    fn insert_before(&mut self, node: NodeIndex, spec: LayerSpec) -> NodeIndex {
        let sources = self.sorted_neighbors(node, Direction::Incoming);
        let inserted = self.add_component(None, spec);
        log::debug!("inserted {} before {}", self.graph[inserted].key, self.graph[node].key);
        for source in sources {
            if let Some(edge) = self.graph.find_edge(source, node) {
                self.graph.remove_edge(edge);
            }
            self.graph.add_edge(source, inserted, ());
        }
        self.graph.add_edge(inserted, node, ());
        inserted
    }

    fn add_component(&mut self, name: Option<&str>, spec: LayerSpec) -> NodeIndex {
        let index = self.graph.node_count();
        let key = match name {
            Some(name) if !self.graph.node_indices().any(|n| self.graph[n].key == name) => name.to_string(),
            Some(name) => format!("{}#{}", name, index),
            None => format!("{}#{}", spec, index),
        };
        self.graph.add_node(Component { key, spec })
    }

    fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) -> Result<(), CompileError> {
        if from == to || self.graph.find_edge(from, to).is_some() {
            return Err(CompileError::DuplicateEdge {
                from: self.graph[from].key.clone(),
                to: self.graph[to].key.clone(),
            });
        }
        self.graph.add_edge(from, to, ());
        Ok(())
    }

    /// Zips equally sized multi-vertex ends, otherwise links every sink of
    /// `from` to every source of `to`.
    fn connect(&mut self, from: &Endpoint, to: &Endpoint) -> Result<(), CompileError> {
        if from.sinks.len() > 1 && from.sinks.len() == to.sources.len() {
            for (&a, &b) in from.sinks.iter().zip(&to.sources) {
                self.add_edge(a, b)?;
            }
            return Ok(());
        }
        for &a in &from.sinks {
            for &b in &to.sources {
                self.add_edge(a, b)?;
            }
        }
        Ok(())
    }

    fn chain(
        &mut self,
        segments: &[Segment],
        scope: &Scope<'_>,
        previous: Option<&Endpoint>,
    ) -> Result<Endpoint, CompileError> {
        let mut head: Option<Endpoint> = None;
        let mut last: Option<Endpoint> = previous.cloned();
        for segment in segments {
            let endpoint = self.resolve(segment, scope)?;
            if let Some(last) = &last {
                self.connect(last, &endpoint)?;
            }
            if head.is_none() {
                head = Some(endpoint.clone());
            }
            last = Some(endpoint);
        }
        match (head, last) {
            (Some(head), Some(last)) => Ok(Endpoint {
                sources: head.sources,
                sinks: last.sinks,
            }),
            _ => Err(CompileError::InvalidArchitecture("empty chain".to_string())),
        }
    }

    fn resolve(&mut self, segment: &Segment, scope: &Scope<'_>) -> Result<Endpoint, CompileError> {
        match segment {
            Segment::Module(statements) => self.module(statements, scope),
            Segment::Token(token) => match scope.lookup(token) {
                Some((owner, value)) => self.reference(token, value, owner),
                None => self.leaf(token, None),
            },
        }
    }

    fn leaf(&mut self, token: &str, name: Option<&str>) -> Result<Endpoint, CompileError> {
        let spec =
            LayerSpec::parse(token).ok_or_else(|| CompileError::UnrecognizedArchitecture(token.to_string()))?;
        let node = self.add_component(name, spec);
        Ok(Endpoint {
            sources: vec![node],
            sinks: vec![node],
        })
    }

    /// Instantiates the definition `name` on first use and replays the cached
    /// endpoint afterwards.
    fn reference(&mut self, name: &str, value: &[Segment], owner: &Scope<'_>) -> Result<Endpoint, CompileError> {
        if let Some(endpoint) = owner.resolved.borrow().get(name) {
            return Ok(endpoint.clone());
        }
        if !owner.pending.borrow_mut().insert(name.to_string()) {
            return Err(CompileError::CyclicArchitecture { key: name.to_string() });
        }
        let endpoint = match value {
            [Segment::Token(token)] if owner.lookup(token).is_none() => self.leaf(token, Some(name))?,
            _ => self.chain(value, owner, None)?,
        };
        owner.pending.borrow_mut().remove(name);
        owner
            .resolved
            .borrow_mut()
            .insert(name.to_string(), endpoint.clone());
        Ok(endpoint)
    }

    /// Builds a braced module. Its chains are parallel branches; its sources
    /// and sinks are the member vertices without a predecessor, respectively a
    /// successor, among the members.
    fn module(&mut self, statements: &[Statement], parent: &Scope<'_>) -> Result<Endpoint, CompileError> {
        let scope = Scope::new(statements, Some(parent))?;
        let first_new = self.graph.node_count();
        let mut members: BTreeSet<NodeIndex> = BTreeSet::new();
        let mut has_chain = false;
        for segments in chains(statements) {
            has_chain = true;
            let endpoint = self.chain(segments, &scope, None)?;
            members.extend(endpoint.sources);
            members.extend(endpoint.sinks);
        }
        if !has_chain {
            return Err(CompileError::MalformedArchitecture {
                architecture: format!("{:?}", statements),
                reason: "module declares no chains".to_string(),
            });
        }
        scope.warn_unused();
        members.extend((first_new..self.graph.node_count()).map(NodeIndex::new));

        let sources = self.boundary(&members, Direction::Incoming);
        let sinks = self.boundary(&members, Direction::Outgoing);
        if sinks.len() > 1 {
            self.module_exits.push(sinks.clone());
        }
        Ok(Endpoint { sources, sinks })
    }

    /// Members with no neighbour among `members` in `direction`.
    fn boundary(&self, members: &BTreeSet<NodeIndex>, direction: Direction) -> Vec<NodeIndex> {
        members
            .iter()
            .copied()
            .filter(|&n| {
                !self
                    .graph
                    .neighbors_directed(n, direction)
                    .any(|neighbor| members.contains(&neighbor))
            })
            .collect()
    }
}

fn chains(statements: &[Statement]) -> impl Iterator<Item = &[Segment]> {
    statements.iter().filter_map(|statement| match statement {
        Statement::Chain(segments) => Some(segments.as_slice()),
        Statement::Define { .. } => None,
    })
}

#[cfg(test)]
#[path = "component_test.rs"]
mod tests;
