//! MCTS tree structure with arena allocation.
//!
//! The tree uses arena allocation for node storage. Nodes are stored in a
//! contiguous Vec and referenced by NodeId indices; parents are referenced
//! by index only, so the arena is the sole owner of every node and dropping
//! the tree releases the whole search at once.

use std::fmt::{self, Display, Write};

use crate::node::{MctsNode, NodeId};

/// Visit statistics for one child edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildStats<A> {
    pub action: A,
    pub visits: u32,
    pub mean: f32,
}

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree<A> {
    /// Arena storing all nodes
    nodes: Vec<MctsNode<A>>,

    /// Root node index (always 0 after initialization)
    root: NodeId,
}

impl<A: Clone + PartialEq> MctsTree<A> {
    /// Create a new tree holding only a root node.
    pub fn new(exploration: f32) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(exploration)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode<A> {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode<A> {
        &mut self.nodes[id.0 as usize]
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[MctsNode<A>] {
        &self.nodes
    }

    /// Add a child to a parent node through `action`.
    /// Returns the new child's NodeId.
    pub fn add_child(&mut self, parent_id: NodeId, action: A) -> NodeId {
        debug_assert!(
            !self.get(parent_id).has_child(&action),
            "duplicate edge under node {}",
            parent_id.0
        );

        let exploration = self.get(parent_id).exploration;
        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(MctsNode::new_child(parent_id, exploration));
        self.get_mut(parent_id).children.push((action, child_id));

        child_id
    }

    /// Backpropagate a value from a node to the root.
    /// Every ancestor receives the same, undiscounted value.
    pub fn backpropagate(&mut self, leaf_id: NodeId, value: f32) {
        let mut current_id = leaf_id;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.record(value);
            current_id = node.parent;
        }
    }

    /// Select the child of `node_id` with the highest UCB1 score.
    ///
    /// Ties go to the child expanded first. Returns `None` if the node has no
    /// children.
    pub fn select_child(&self, node_id: NodeId) -> Option<(A, NodeId)> {
        let node = self.get(node_id);
        let sibling_visits: u32 = node
            .children
            .iter()
            .map(|(_, id)| self.get(*id).visit_count)
            .sum();

        let mut best: Option<(&A, NodeId, f32)> = None;
        for (action, id) in &node.children {
            let score = self.get(*id).ucb_score(sibling_visits);
            match best {
                Some((_, _, best_score)) if score <= best_score => {}
                _ => best = Some((action, *id, score)),
            }
        }

        best.map(|(action, id, _)| (action.clone(), id))
    }

    /// Get the recommended action from the root: the visited child with the
    /// highest mean outcome (first expanded wins ties).
    /// Returns (action, mean) or None if no root child has been visited.
    pub fn best_action(&self) -> Option<(A, f32)> {
        let root = self.get(self.root);
        let mut best: Option<(&A, f32)> = None;

        for (action, id) in &root.children {
            let child = self.get(*id);
            if child.visit_count == 0 {
                continue;
            }
            let mean = child.mean_value();
            match best {
                Some((_, best_mean)) if mean <= best_mean => {}
                _ => best = Some((action, mean)),
            }
        }

        best.map(|(action, mean)| (action.clone(), mean))
    }

    /// Per-child visit statistics for a node, in expansion order.
    pub fn child_stats(&self, node_id: NodeId) -> Vec<ChildStats<A>> {
        self.get(node_id)
            .children
            .iter()
            .map(|(action, id)| {
                let child = self.get(*id);
                ChildStats {
                    action: action.clone(),
                    visits: child.visit_count,
                    mean: child.mean_value(),
                }
            })
            .collect()
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_value: root.mean_value(),
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        self.get(node_id)
            .children
            .iter()
            .map(|(_, id)| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

impl<A: Clone + PartialEq + Display> MctsTree<A> {
    /// Render the tree as indented `action: visits=N, avg=X.XXX` lines,
    /// two spaces of indentation per level below the root.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_subtree(&mut out, self.root, 0);
        out
    }

    fn write_subtree(&self, out: &mut String, node_id: NodeId, indent: usize) -> fmt::Result {
        for (action, id) in &self.get(node_id).children {
            let child = self.get(*id);
            writeln!(
                out,
                "{:indent$}{}: visits={}, avg={:.3}",
                "",
                action,
                child.visit_count,
                child.mean_value(),
                indent = indent
            )?;
            self.write_subtree(out, *id, indent + 2)?;
        }
        Ok(())
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f32,
    pub max_depth: u32,
}
