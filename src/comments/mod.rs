//! Lazily-materialized comment tree.
//!
//! Each mounted node owns an independent fetch for its own item; children
//! are mounted only once their parent is rendered and expanded, so a
//! collapsed subtree never fires network requests. Node states live in an
//! arena keyed by item id, with parent→child edges as plain id lists.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::app::Result;
use crate::client::ItemFetcher;
use crate::domain::Item;

/// Nodes deeper than this start out collapsed.
pub const MAX_AUTO_EXPAND: usize = 2;

#[derive(Debug)]
pub enum NodeState {
    /// Fetch in flight.
    Loading,
    /// Absent, deleted, or dead. Terminal: renders nothing, children are
    /// never fetched.
    Empty,
    /// Fetch failed. Terminal until an explicit [`CommentTree::retry`].
    Failed,
    /// Loaded. `collapsed` is local UI state; the item is retained for
    /// the node's lifetime, so expanding again never refetches this node.
    Rendered { item: Item, collapsed: bool },
}

struct Node {
    state: NodeState,
    depth: usize,
    generation: u64,
}

/// Result of one node fetch, tagged so late arrivals for nodes that have
/// been unmounted (or remounted) in the meantime are discarded.
pub struct FetchOutcome {
    id: i64,
    generation: u64,
    result: Result<Option<Item>>,
}

pub struct CommentTree {
    fetcher: Arc<dyn ItemFetcher>,
    nodes: HashMap<i64, Node>,
    roots: Vec<i64>,
    tx: mpsc::UnboundedSender<FetchOutcome>,
    rx: mpsc::UnboundedReceiver<FetchOutcome>,
    next_generation: u64,
}

/// One row of the rendered tree, in depth-first order.
pub struct VisibleNode<'a> {
    pub id: i64,
    pub depth: usize,
    pub state: &'a NodeState,
}

impl CommentTree {
    /// Mount the top-level comment ids of a story. Fetches start
    /// immediately, independently per node.
    pub fn new(fetcher: Arc<dyn ItemFetcher>, root_ids: &[i64]) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut tree = Self {
            fetcher,
            nodes: HashMap::new(),
            roots: root_ids.to_vec(),
            tx,
            rx,
            next_generation: 0,
        };
        for &id in root_ids {
            tree.mount(id, 0);
        }
        tree
    }

    fn mount(&mut self, id: i64, depth: usize) {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.nodes.insert(
            id,
            Node {
                state: NodeState::Loading,
                depth,
                generation,
            },
        );

        let fetcher = self.fetcher.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch_item(id).await;
            // Receiver dropped means the whole tree is gone.
            let _ = tx.send(FetchOutcome {
                id,
                generation,
                result,
            });
        });
    }

    /// Apply all settled fetches without blocking. Returns how many
    /// outcomes were applied; call from the render loop.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.rx.try_recv() {
            if self.apply(outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for one fetch to settle and apply it. Returns whether the
    /// outcome was applied or discarded as stale.
    pub async fn settle_one(&mut self) -> bool {
        match self.rx.recv().await {
            Some(outcome) => self.apply(outcome),
            None => false,
        }
    }

    /// True while any mounted node is still loading.
    pub fn has_pending(&self) -> bool {
        self.nodes
            .values()
            .any(|n| matches!(n.state, NodeState::Loading))
    }

    fn apply(&mut self, outcome: FetchOutcome) -> bool {
        let (depth, kids) = {
            let node = match self.nodes.get_mut(&outcome.id) {
                Some(node) => node,
                // Unmounted while the fetch was in flight.
                None => return false,
            };
            if node.generation != outcome.generation {
                return false;
            }

            match outcome.result {
                Err(e) => {
                    tracing::warn!(id = outcome.id, error = %e, "comment fetch failed");
                    node.state = NodeState::Failed;
                    return true;
                }
                Ok(None) => {
                    node.state = NodeState::Empty;
                    return true;
                }
                Ok(Some(item)) if item.is_removed() => {
                    node.state = NodeState::Empty;
                    return true;
                }
                Ok(Some(item)) => {
                    let collapsed = node.depth > MAX_AUTO_EXPAND;
                    let kids = if collapsed { Vec::new() } else { item.kids.clone() };
                    let depth = node.depth;
                    node.state = NodeState::Rendered { item, collapsed };
                    (depth, kids)
                }
            }
        };

        for kid in kids {
            if !self.nodes.contains_key(&kid) {
                self.mount(kid, depth + 1);
            }
        }
        true
    }

    /// Flip a rendered node between expanded and collapsed. Expanding
    /// mounts its children; collapsing unmounts the whole child subtree,
    /// so descendant fetches that later arrive are discarded.
    pub fn toggle(&mut self, id: i64) {
        let (now_collapsed, depth, kids) = match self.nodes.get_mut(&id) {
            Some(Node {
                state: NodeState::Rendered { item, collapsed },
                depth,
                ..
            }) => {
                *collapsed = !*collapsed;
                (*collapsed, *depth, item.kids.clone())
            }
            _ => return,
        };

        if now_collapsed {
            for kid in kids {
                self.unmount(kid);
            }
        } else {
            for kid in kids {
                if !self.nodes.contains_key(&kid) {
                    self.mount(kid, depth + 1);
                }
            }
        }
    }

    fn unmount(&mut self, id: i64) {
        if let Some(node) = self.nodes.remove(&id) {
            if let NodeState::Rendered { item, .. } = node.state {
                for kid in item.kids {
                    self.unmount(kid);
                }
            }
        }
    }

    /// Refetch a failed node in place.
    pub fn retry(&mut self, id: i64) {
        let depth = match self.nodes.get(&id) {
            Some(Node {
                state: NodeState::Failed,
                depth,
                ..
            }) => *depth,
            _ => return,
        };
        self.mount(id, depth);
    }

    /// Depth-first walk of the mounted tree: empty nodes are skipped
    /// entirely, collapsed subtrees contribute only their own row.
    pub fn visible(&self) -> Vec<VisibleNode<'_>> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.walk(root, &mut out);
        }
        out
    }

    fn walk<'a>(&'a self, id: i64, out: &mut Vec<VisibleNode<'a>>) {
        let node = match self.nodes.get(&id) {
            Some(node) => node,
            None => return,
        };
        match &node.state {
            NodeState::Empty => {}
            NodeState::Loading | NodeState::Failed => {
                out.push(VisibleNode {
                    id,
                    depth: node.depth,
                    state: &node.state,
                });
            }
            NodeState::Rendered { item, collapsed } => {
                out.push(VisibleNode {
                    id,
                    depth: node.depth,
                    state: &node.state,
                });
                if !collapsed {
                    for &kid in &item.kids {
                        self.walk(kid, out);
                    }
                }
            }
        }
    }

    #[cfg(test)]
    fn state(&self, id: i64) -> Option<&NodeState> {
        self.nodes.get(&id).map(|n| &n.state)
    }

    #[cfg(test)]
    fn is_mounted(&self, id: i64) -> bool {
        self.nodes.contains_key(&id)
    }
}
