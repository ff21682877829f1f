//! Generic read-only traversal over `children()`

use super::node::NodeRef;
use super::relation::RelationRef;
use std::fmt;

/// One step from a node to one of its children
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// The program's main statement
    Main,
    /// A declared relation of the program
    Relation(String),
    /// A subroutine body of the program
    Subroutine(String),
    /// The n-th child of any other node
    Child(usize),
}

/// Location of a node below the root a walk started from
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    #[must_use]
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        NodePath(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|segment| match segment {
                PathSegment::Main => "main".to_string(),
                PathSegment::Relation(name) => format!("relation[{name}]"),
                PathSegment::Subroutine(name) => format!("subroutine[{name}]"),
                PathSegment::Child(index) => index.to_string(),
            })
            .collect();
        f.write_str(&parts.join("/"))
    }
}

/// Children paired with the path segment that leads to them
fn labelled_children(node: NodeRef<'_>) -> Vec<(PathSegment, NodeRef<'_>)> {
    match node {
        NodeRef::Program(program) => {
            let mut children: Vec<(PathSegment, NodeRef<'_>)> = program
                .relations()
                .map(|r| (PathSegment::Relation(r.name().to_string()), NodeRef::Relation(r)))
                .collect();
            if let Some(main) = program.try_main() {
                children.push((PathSegment::Main, NodeRef::Statement(main)));
            }
            children.extend(program.subroutines().map(|(name, body)| {
                (PathSegment::Subroutine(name.to_string()), NodeRef::Statement(body))
            }));
            children
        }
        other => other
            .children()
            .into_iter()
            .enumerate()
            .map(|(i, child)| (PathSegment::Child(i), child))
            .collect(),
    }
}

/// Visit `root` and every node below it in pre-order
pub fn walk<'a, F>(root: NodeRef<'a>, visit: &mut F)
where
    F: FnMut(&NodePath, NodeRef<'a>),
{
    walk_from(&NodePath::root(), root, visit);
}

fn walk_from<'a, F>(path: &NodePath, node: NodeRef<'a>, visit: &mut F)
where
    F: FnMut(&NodePath, NodeRef<'a>),
{
    visit(path, node);
    for (segment, child) in labelled_children(node) {
        walk_from(&path.child(segment), child, visit);
    }
}

/// Number of nodes in the tree rooted at `root`, root included
pub fn count_nodes(root: NodeRef<'_>) -> usize {
    let mut count = 0;
    walk(root, &mut |_: &NodePath, _| count += 1);
    count
}

/// Every relation reference below `root`, with its location
pub fn collect_references(root: NodeRef<'_>) -> Vec<(NodePath, &RelationRef)> {
    let mut found = Vec::new();
    walk(root, &mut |path: &NodePath, node| {
        if let Some(reference) = node.as_relation_ref() {
            found.push((path.clone(), reference));
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Condition, Expression, Operation, Statement};

    #[test]
    fn test_paths_below_statement() {
        let stmt = Statement::sequence([
            Statement::clear("A"),
            Statement::Query(Operation::scan(
                "B",
                0,
                Operation::project("C", vec![Expression::tuple(0, 0)]),
            )),
        ]);
        let refs = collect_references(NodeRef::Statement(&stmt));
        let rendered: Vec<(String, String)> = refs
            .iter()
            .map(|(path, r)| (path.to_string(), r.name().to_string()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("0/0".to_string(), "A".to_string()),
                ("1/0/0".to_string(), "B".to_string()),
                ("1/0/1/0".to_string(), "C".to_string()),
            ]
        );
    }

    #[test]
    fn test_count_nodes() {
        let stmt = Statement::Exit(Condition::not(Condition::True));
        assert_eq!(count_nodes(NodeRef::Statement(&stmt)), 3);
    }

    #[test]
    fn test_root_path_display() {
        assert_eq!(NodePath::root().to_string(), "<root>");
        let path = NodePath::root()
            .child(PathSegment::Subroutine("sub0".into()))
            .child(PathSegment::Child(2));
        assert_eq!(path.to_string(), "subroutine[sub0]/2");
    }
}
