//! Net alias closures for one graph.
//!
//! Every net name seen by a graph is a node in a disjoint-set forest. Alias
//! declarations union nodes; a net's identity is the root of its set. Each
//! root may carry the declared primary name of its closure, and two closures
//! with different declared primaries are never merged.

use std::collections::HashMap;

use indexmap::IndexMap;
use netcmp_common::{CompareError, GraphIndex};

/// Index of a net name in a [`NetAliases`] forest.
pub type NetNode = usize;

#[derive(Clone, Debug, Default)]
pub struct NetAliases {
    /// Lookup key to node
    index: IndexMap<String, NetNode>,
    /// Display name of each node
    names: Vec<String>,
    parent: Vec<NetNode>,
    rank: Vec<u8>,
    /// Declared primary of each closure, stored at the root
    primary: Vec<Option<NetNode>>,
}

impl NetAliases {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn lookup(&self, key: &str) -> Option<NetNode> {
        self.index.get(key).copied()
    }

    /// Returns the node for `key`, creating a singleton closure on first use.
    #[contracts::debug_ensures(self.parent.len() == self.names.len())]
    pub fn node(&mut self, key: &str, display: &str) -> NetNode {
        if let Some(node) = self.lookup(key) {
            return node;
        }
        let node = self.names.len();
        self.index.insert(key.to_string(), node);
        self.names.push(display.to_string());
        self.parent.push(node);
        self.rank.push(0);
        self.primary.push(None);
        node
    }

    pub fn find(&self, mut node: NetNode) -> NetNode {
        while self.parent[node] != node {
            node = self.parent[node];
        }
        node
    }

    /// Declares `primary` as the primary name of a closure that also holds
    /// every name in `aliases`. `primary` and `aliases` are `(key, display)`
    /// pairs.
    ///
    /// Fails without touching the forest if the merge would join two
    /// closures whose declared primaries differ.
    pub fn define_alias(
        &mut self,
        graph: GraphIndex,
        primary: (&str, &str),
        aliases: &[(String, String)],
    ) -> Result<(), CompareError> {
        let names = aliases.iter().map(|(k, d)| (k.as_str(), d.as_str()));
        let mut declared: Option<NetNode> = None;
        for (key, display) in std::iter::once(primary).chain(names) {
            let Some(node) = self.lookup(key) else {
                continue;
            };
            let Some(existing) = self.primary[self.find(node)] else {
                continue;
            };
            match declared {
                None => declared = Some(existing),
                Some(first) if first == existing => {}
                Some(first) => {
                    return Err(CompareError::ConflictingAlias {
                        graph,
                        net: display.to_string(),
                        first: self.names[first].clone(),
                        second: self.names[existing].clone(),
                    });
                }
            }
        }

        let primary_node = self.node(primary.0, primary.1);
        let alias_nodes: Vec<NetNode> = aliases
            .iter()
            .map(|(key, display)| self.node(key, display))
            .collect();
        for node in alias_nodes {
            self.union(primary_node, node);
        }

        let root = self.find(primary_node);
        self.primary[root] = Some(declared.unwrap_or(primary_node));
        Ok(())
    }

    fn union(&mut self, a: NetNode, b: NetNode) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        let (root, child) = if self.rank[ra] >= self.rank[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        if self.rank[root] == self.rank[child] {
            self.rank[root] += 1;
        }
        self.parent[child] = root;
        if self.primary[root].is_none() {
            self.primary[root] = self.primary[child];
        }
        self.primary[child] = None;
    }

    /// Display name of every closure, keyed by root: the declared primary
    /// if there is one, otherwise the smallest member name.
    pub fn closure_names(&self) -> HashMap<NetNode, &str> {
        let mut out: HashMap<NetNode, &str> = HashMap::new();
        for node in 0..self.names.len() {
            let root = self.find(node);
            let name = self.names[node].as_str();
            out.entry(root)
                .and_modify(|current| {
                    if name < *current {
                        *current = name;
                    }
                })
                .or_insert(name);
        }
        for (root, name) in &mut out {
            if let Some(primary) = self.primary[*root] {
                *name = self.names[primary].as_str();
            }
        }
        out
    }
}
