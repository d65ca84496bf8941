//! Scene-node descriptors
//!
//! Every hoverable node in the stomach scene is registered here with a
//! typed kind; hover text and "is this fluid" queries go through the
//! table instead of per-node metadata.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Kinds of scene node the player can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    StomachWall,
    StomachLining,
    Rugae,
    GastricFluid,
    FluidSurface,
    FluidVolume,
    GasBubble,
    FoodParticle,
    Enzyme,
}

/// Hover text for a node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    pub name: &'static str,
    pub description: &'static str,
}

const GASTRIC_FLUID: &str =
    "A mixture of hydrochloric acid, enzymes, and mucus that breaks down food and kills bacteria.";

impl NodeKind {
    pub const ALL: [NodeKind; 9] = [
        NodeKind::StomachWall,
        NodeKind::StomachLining,
        NodeKind::Rugae,
        NodeKind::GastricFluid,
        NodeKind::FluidSurface,
        NodeKind::FluidVolume,
        NodeKind::GasBubble,
        NodeKind::FoodParticle,
        NodeKind::Enzyme,
    ];

    pub fn descriptor(&self) -> Descriptor {
        let (name, description) = match self {
            NodeKind::StomachWall => (
                "Stomach Wall",
                "The outer muscular wall of the stomach that contracts to mix and churn food.",
            ),
            NodeKind::StomachLining => (
                "Stomach Lining",
                "The inner mucosal lining that protects the stomach wall from acid and produces digestive enzymes.",
            ),
            NodeKind::Rugae => (
                "Rugae",
                "Folds in the stomach lining that expand to accommodate food and increase surface area for digestion.",
            ),
            NodeKind::GastricFluid => ("Gastric Fluid", GASTRIC_FLUID),
            NodeKind::FluidSurface => (
                "Gastric Fluid Surface",
                "The surface of the gastric fluid, which contains digestive enzymes and acid that break down food.",
            ),
            NodeKind::FluidVolume => ("Gastric Fluid Volume", GASTRIC_FLUID),
            NodeKind::GasBubble => (
                "Gas Bubble",
                "Gas bubbles formed during digestion, containing carbon dioxide and other gases produced by chemical reactions.",
            ),
            NodeKind::FoodParticle => (
                "Food Particles",
                "Partially digested food particles being broken down by gastric acid and enzymes.",
            ),
            NodeKind::Enzyme => (
                "Digestive Enzyme",
                "A protein that speeds up the breakdown of food into nutrients the body can absorb.",
            ),
        };
        Descriptor { name, description }
    }

    pub fn is_fluid(&self) -> bool {
        matches!(
            self,
            NodeKind::GastricFluid | NodeKind::FluidSurface | NodeKind::FluidVolume
        )
    }
}

/// Opaque scene-node handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Id-allocating table of scene nodes
#[derive(Debug, Clone, Default)]
pub struct SceneCatalog {
    next_id: u32,
    nodes: HashMap<NodeId, NodeKind>,
}

impl SceneCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, kind);
        id
    }

    /// Forget a node; unknown ids are ignored
    pub fn remove(&mut self, id: NodeId) -> Option<NodeKind> {
        self.nodes.remove(&id)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(&id).copied()
    }

    /// Hover text, if the node is registered
    pub fn describe(&self, id: NodeId) -> Option<Descriptor> {
        self.kind(id).map(|kind| kind.descriptor())
    }

    pub fn is_fluid(&self, id: NodeId) -> bool {
        self.kind(id).is_some_and(|kind| kind.is_fluid())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every registered node, in registration order
    pub fn entries(&self) -> Vec<(NodeId, NodeKind)> {
        let mut entries: Vec<_> = self.nodes.iter().map(|(id, kind)| (*id, *kind)).collect();
        entries.sort_unstable_by_key(|(id, _)| *id);
        entries
    }
}
