//! MCTS tree node representation.
//!
//! Each node stands for the decision point reached by following its edge
//! labels from the root. Because every iteration works on a freshly sampled
//! state, a node aggregates outcomes over many concrete states rather than
//! holding one. Nodes store only what selection needs: child edges, visit
//! statistics and the UCB1 constant.

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode<A> {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Children: Vec of (action, NodeId) pairs in expansion order.
    /// An action appears at most once.
    pub children: Vec<(A, NodeId)>,

    /// Number of completed simulations that passed through this node
    pub visit_count: u32,

    /// Sum of outcomes backpropagated through this node.
    /// mean = value_sum / visit_count
    pub value_sum: f32,

    /// UCB1 exploration constant, shared by every node of one search
    pub exploration: f32,
}

impl<A: PartialEq> MctsNode<A> {
    /// Create a new root node.
    pub fn new_root(exploration: f32) -> Self {
        Self::new_child(NodeId::NONE, exploration)
    }

    /// Create a new child node with no statistics.
    pub fn new_child(parent: NodeId, exploration: f32) -> Self {
        Self {
            parent,
            children: Vec::new(),
            visit_count: 0,
            value_sum: 0.0,
            exploration,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Mean outcome. Returns 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }

    /// Record one simulation outcome.
    #[inline]
    pub fn record(&mut self, value: f32) {
        self.visit_count += 1;
        self.value_sum += value;
    }

    /// UCB1 score of this node as a child:
    /// `mean + C * sqrt(2 * ln(sibling_visits) / visits)`.
    ///
    /// `sibling_visits` is the total visit count over all children of the
    /// parent (this node included).
    ///
    /// # Panics
    ///
    /// Panics if this node has never been visited. Selection only scores
    /// children after every one of them has received a rollout, so a zero
    /// visit count means the tree and the sampled state disagree.
    #[inline]
    pub fn ucb_score(&self, sibling_visits: u32) -> f32 {
        assert!(
            self.visit_count > 0,
            "UCB1 evaluated on an unvisited child (sibling_visits={})",
            sibling_visits
        );
        let visits = self.visit_count as f32;
        let bonus = (2.0 * (sibling_visits as f32).ln() / visits).sqrt();
        self.mean_value() + self.exploration * bonus
    }

    /// Look up the child reached through `action`.
    pub fn child(&self, action: &A) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(a, _)| a == action)
            .map(|(_, id)| *id)
    }

    #[inline]
    pub fn has_child(&self, action: &A) -> bool {
        self.child(action).is_some()
    }

    /// Check if this is a leaf node (no children yet).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(!NodeId(0).is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_new_root() {
        let node: MctsNode<u8> = MctsNode::new_root(1.5);

        assert!(node.is_root());
        assert!(node.is_leaf());
        assert_eq!(node.visit_count, 0);
        assert!((node.exploration - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_mean_value() {
        let mut node: MctsNode<u8> = MctsNode::new_root(1.0);

        // Unvisited
        assert!((node.mean_value()).abs() < 1e-6);

        node.record(1.0);
        node.record(0.0);
        node.record(0.5);
        node.record(0.5);
        assert_eq!(node.visit_count, 4);
        assert!((node.mean_value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ucb_score() {
        let mut node: MctsNode<u8> = MctsNode::new_child(NodeId(0), 1.0);
        node.visit_count = 10;
        node.value_sum = 5.0;

        // UCB = 0.5 + 1.0 * sqrt(2 * ln(100) / 10) = 0.5 + 0.9597...
        let ucb = node.ucb_score(100);
        let expected = 0.5 + (2.0 * 100f32.ln() / 10.0).sqrt();
        assert!((ucb - expected).abs() < 1e-5);
    }

    #[test]
    fn test_ucb_zero_exploration_is_mean() {
        let mut node: MctsNode<u8> = MctsNode::new_child(NodeId(0), 0.0);
        node.visit_count = 3;
        node.value_sum = 2.1;
        assert!((node.ucb_score(50) - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_ucb_prefers_fewer_visits_at_equal_mean() {
        let mut rare: MctsNode<u8> = MctsNode::new_child(NodeId(0), 0.3);
        rare.visit_count = 2;
        rare.value_sum = 1.0;

        let mut common: MctsNode<u8> = MctsNode::new_child(NodeId(0), 0.3);
        common.visit_count = 8;
        common.value_sum = 4.0;

        let total = rare.visit_count + common.visit_count;
        assert!(rare.ucb_score(total) > common.ucb_score(total));
    }

    #[test]
    #[should_panic(expected = "unvisited child")]
    fn test_ucb_unvisited_panics() {
        let node: MctsNode<u8> = MctsNode::new_child(NodeId(0), 1.0);
        node.ucb_score(10);
    }

    #[test]
    fn test_child_lookup() {
        let mut node: MctsNode<char> = MctsNode::new_root(1.0);
        node.children.push(('a', NodeId(1)));
        node.children.push(('b', NodeId(2)));

        assert!(!node.is_leaf());
        assert_eq!(node.child(&'b'), Some(NodeId(2)));
        assert!(node.has_child(&'a'));
        assert!(!node.has_child(&'c'));
    }
}
