//! # Node Mappers
//!
//! A mapper takes ownership of one node and hands back the node to install
//! in its place: the same node, a modified one, or a different subtree of
//! the same slot category. `IrNode::apply` feeds every owned child through a
//! mapper; recursion into the subtree is the mapper's own business:
//!
//! ```text
//! post-order:  node.apply(self); transform(node)
//! pre-order:   let node = transform(node); node.apply(self)
//! ```
//!
//! [`post_order`] and [`pre_order`] build those recursive mappers from a
//! plain per-node function. A bare closure is also a mapper and only sees
//! the direct children it is applied to.

use super::node::{IrNode, Node};

/// Transformer from one owned node to its replacement
pub trait NodeMapper {
    fn map(&mut self, node: Node) -> Node;
}

impl<F> NodeMapper for F
where
    F: FnMut(Node) -> Node,
{
    fn map(&mut self, node: Node) -> Node {
        self(node)
    }
}

/// Mapper rewriting the whole subtree bottom-up
pub struct PostOrder<F> {
    transform: F,
}

impl<F> NodeMapper for PostOrder<F>
where
    F: FnMut(Node) -> Node,
{
    fn map(&mut self, mut node: Node) -> Node {
        node.apply(self);
        (self.transform)(node)
    }
}

/// Mapper rewriting the whole subtree top-down.
///
/// The children visited are those of the node `transform` returned.
pub struct PreOrder<F> {
    transform: F,
}

impl<F> NodeMapper for PreOrder<F>
where
    F: FnMut(Node) -> Node,
{
    fn map(&mut self, node: Node) -> Node {
        let mut node = (self.transform)(node);
        node.apply(self);
        node
    }
}

/// Apply `transform` to every node of the subtree, children first
pub fn post_order<F>(transform: F) -> PostOrder<F>
where
    F: FnMut(Node) -> Node,
{
    PostOrder { transform }
}

/// Apply `transform` to every node of the subtree, parents first
pub fn pre_order<F>(transform: F) -> PreOrder<F>
where
    F: FnMut(Node) -> Node,
{
    PreOrder { transform }
}
