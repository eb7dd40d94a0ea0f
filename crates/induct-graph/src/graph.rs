//! Proof graph
//!
//! Nodes are symbolic states, edges are oracle steps. Every node carries an
//! explicit [`NodeStatus`] that is updated at the single point where the
//! oracle answers for that node, so the verdict is a pure read of the graph.
//!
//! Node ids are dense and assigned in insertion order: `#0` is always the
//! initial node and `#1` the target (goal) node.

use crate::error::{GraphError, GraphResult};
use induct_oracle::{StepLabel, Successor};
use induct_term::{Claim, SymbolicState};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Progress of one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// The start node, not yet expanded
    Init,
    /// Created, not yet expanded
    Pending,
    /// Expanded interior node. It keeps this status after its successors
    /// close; whether work remains is read from the leaves.
    Frontier,
    /// The oracle can take no step and the goal does not subsume the state
    Stuck,
    /// Subsumed by the goal, vacuous, or the goal itself
    Target,
}

impl NodeStatus {
    /// Still waiting for the oracle
    pub fn is_open(self) -> bool {
        matches!(self, NodeStatus::Init | NodeStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub state: SymbolicState,
    pub status: NodeStatus,
    /// Rewrite steps from the initial node
    pub depth: u32,
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub label: StepLabel,
    /// Rewrite steps the oracle took along this edge
    pub depth: u32,
}

/// `from` is subsumed by the target node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cover {
    pub from: NodeId,
    pub to: NodeId,
}

/// Result of reading node states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SearchOutcome {
    /// Every branch reached the goal
    Proved,
    /// Some branch got stuck short of the goal
    Disproved { stuck: Vec<NodeId> },
    /// Open nodes remain (the iteration bound was hit)
    Incomplete { remaining: Vec<NodeId> },
}

/// Node counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub covers: usize,
    pub init: usize,
    pub pending: usize,
    pub frontier: usize,
    pub stuck: usize,
    pub target: usize,
    pub vacuous: usize,
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes ({} pending, {} frontier, {} stuck, {} target, {} vacuous), {} edges, {} covers",
            self.nodes,
            self.init + self.pending,
            self.frontier,
            self.stuck,
            self.target,
            self.vacuous,
            self.edges,
            self.covers
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    covers: Vec<Cover>,
    vacuous: Vec<NodeId>,
    init: NodeId,
    target: NodeId,
}

impl ProofGraph {
    /// Split the claim body at its rewrites: init is the left-hand side under
    /// `requires`, target the right-hand side under `ensures`.
    pub fn from_claim(claim: &Claim) -> GraphResult<Self> {
        if !claim.body.contains_rewrite() {
            return Err(GraphError::NoRewrite(claim.body.to_string()));
        }
        let init_state =
            SymbolicState::new(claim.body.extract_lhs()).with_constraint(claim.requires.clone());
        let target_state =
            SymbolicState::new(claim.body.extract_rhs()).with_constraint(claim.ensures.clone());
        Ok(Self::new(init_state, target_state))
    }

    pub fn new(init: SymbolicState, target: SymbolicState) -> Self {
        let init_id = NodeId(0);
        let target_id = NodeId(1);
        Self {
            nodes: vec![
                Node {
                    id: init_id,
                    state: init,
                    status: NodeStatus::Init,
                    depth: 0,
                    parent: None,
                },
                Node {
                    id: target_id,
                    state: target,
                    status: NodeStatus::Target,
                    depth: 0,
                    parent: None,
                },
            ],
            edges: Vec::new(),
            covers: Vec::new(),
            vacuous: Vec::new(),
            init: init_id,
            target: target_id,
        }
    }

    pub fn init(&self) -> NodeId {
        self.init
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn node(&self, id: NodeId) -> GraphResult<&Node> {
        self.nodes.get(id.0).ok_or(GraphError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> GraphResult<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(GraphError::UnknownNode(id))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn covers(&self) -> &[Cover] {
        &self.covers
    }

    /// Replace a node's state, e.g. with its definedness-strengthened form
    pub fn replace_state(&mut self, id: NodeId, state: SymbolicState) -> GraphResult<()> {
        self.node_mut(id)?.state = state;
        Ok(())
    }

    pub fn set_status(&mut self, id: NodeId, status: NodeStatus) -> GraphResult<()> {
        self.node_mut(id)?.status = status;
        Ok(())
    }

    /// Add a pending child of `from` reached by `successor`
    pub fn add_successor(&mut self, from: NodeId, successor: Successor) -> GraphResult<NodeId> {
        let parent_depth = self.node(from)?.depth;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            state: successor.state,
            status: NodeStatus::Pending,
            depth: parent_depth + successor.depth,
            parent: Some(from),
        });
        self.edges.push(Edge {
            from,
            to: id,
            label: successor.label,
            depth: successor.depth,
        });
        Ok(id)
    }

    /// Mark `id` as subsumed by the target
    pub fn cover(&mut self, id: NodeId) -> GraphResult<()> {
        self.set_status(id, NodeStatus::Target)?;
        self.covers.push(Cover {
            from: id,
            to: self.target,
        });
        Ok(())
    }

    /// Close a branch whose path condition is unsatisfiable
    pub fn mark_vacuous(&mut self, id: NodeId) -> GraphResult<()> {
        self.set_status(id, NodeStatus::Target)?;
        self.vacuous.push(id);
        Ok(())
    }

    pub fn is_vacuous(&self, id: NodeId) -> bool {
        self.vacuous.contains(&id)
    }

    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.iter().filter(move |e| e.from == id).map(|e| e.to)
    }

    /// Nodes without outgoing edges, the goal node excluded
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .map(|n| n.id)
            .filter(|&id| id != self.target && self.successors(id).next().is_none())
            .collect()
    }

    pub fn with_status(&self, status: NodeStatus) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.status == status)
            .map(|n| n.id)
            .collect()
    }

    /// Open nodes in insertion order
    pub fn open_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.status.is_open())
            .map(|n| n.id)
            .collect()
    }

    /// Node ids from the initial node to `id`
    pub fn path_to(&self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        let mut path = vec![id];
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            path.push(parent);
            current = self.node(parent)?;
        }
        path.reverse();
        Ok(path)
    }

    pub fn summary(&self) -> GraphSummary {
        let mut summary = GraphSummary {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            covers: self.covers.len(),
            vacuous: self.vacuous.len(),
            ..GraphSummary::default()
        };
        for node in &self.nodes {
            match node.status {
                NodeStatus::Init => summary.init += 1,
                NodeStatus::Pending => summary.pending += 1,
                NodeStatus::Frontier => summary.frontier += 1,
                NodeStatus::Stuck => summary.stuck += 1,
                NodeStatus::Target => summary.target += 1,
            }
        }
        summary
    }

    /// Verdict from the current node states.
    ///
    /// Any stuck node disproves the claim. Otherwise any open node leaves it
    /// undecided. Otherwise every leaf is a target and the claim is proved.
    pub fn outcome(&self) -> SearchOutcome {
        let stuck = self.with_status(NodeStatus::Stuck);
        if !stuck.is_empty() {
            return SearchOutcome::Disproved { stuck };
        }
        let remaining = self.open_nodes();
        if !remaining.is_empty() {
            return SearchOutcome::Incomplete { remaining };
        }
        SearchOutcome::Proved
    }
}
