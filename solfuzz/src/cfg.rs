//! Control-flow graph of a deployed contract, as produced by the decompiler.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A basic block, keyed in the graph by its entry program counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBlock {
    /// Entry PCs of the blocks control can flow to.
    #[serde(default)]
    pub successors: Vec<String>,
    /// PCs of every instruction in the block, entry included.
    #[serde(default)]
    pub instructions: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlFlowGraph {
    nodes: BTreeMap<String, BasicBlock>,
}

impl ControlFlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the block entered at `pc`.
    pub fn with_block<S, I, J>(mut self, pc: S, successors: I, instructions: J) -> Self
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
    {
        let pc = pc.into();
        let mut block = BasicBlock {
            successors: successors.into_iter().map(Into::into).collect(),
            instructions: instructions.into_iter().map(Into::into).collect(),
        };
        block.instructions.insert(pc.clone());
        self.nodes.insert(pc, block);
        self
    }

    pub fn nodes(&self) -> &BTreeMap<String, BasicBlock> {
        &self.nodes
    }

    pub fn block(&self, pc: &str) -> Option<&BasicBlock> {
        self.nodes.get(pc)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Predecessor lists: every edge `u -> v` becomes `v -> u`. Edges to PCs
    /// that are not blocks of this graph are dropped.
    pub fn reversed(&self) -> HashMap<&str, Vec<&str>> {
        let mut reversed: HashMap<&str, Vec<&str>> = HashMap::with_capacity(self.nodes.len());
        for (pc, block) in &self.nodes {
            for succ in &block.successors {
                if let Some((succ, _)) = self.nodes.get_key_value(succ) {
                    reversed.entry(succ.as_str()).or_default().push(pc.as_str());
                }
            }
        }
        reversed
    }
}
