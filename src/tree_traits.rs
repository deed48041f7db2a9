use termtree::Tree;
use tracing::instrument;

use crate::domain::{NodeId, TopologyArena};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for TopologyArena {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn node_line(arena: &TopologyArena, id: NodeId) -> String {
            match arena.get(id) {
                Some(node) if node.label.is_empty() => format!("{} {}", node.kind, node.id),
                Some(node) => format!("{} {}: {}", node.kind, node.id, node.label),
                None => format!("? {id}"),
            }
        }

        fn build_tree(arena: &TopologyArena, id: NodeId, parent_tree: &mut Tree<String>) {
            let mut tree = Tree::new(node_line(arena, id));
            if let Some(node) = arena.get(id) {
                for &child in &node.children {
                    build_tree(arena, child, &mut tree);
                }
            }
            parent_tree.push(tree);
        }

        if self.is_empty() {
            return Tree::new("Empty topology".to_string());
        }
        let mut root = Tree::new("topology".to_string());
        for &id in self.top_level() {
            build_tree(self, id, &mut root);
        }
        root
    }
}
