//! Recipe graph module.
//!
//! Provides `RecipeGraph`, a directed view of the catalog where an edge
//! `ingredient → output` means the output is craftable from the ingredient.
//! Resolution never needs the graph (the walker handles loops on its own);
//! it exists so reports and logs can say which recipe loops a catalog has.

use crate::catalog::CatalogSource;
use crate::error::Result;
use crate::item_id::ItemId;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Directed graph of recipe dependencies.
///
/// # Examples
///
/// ```rust
/// use rarecraft::graph::RecipeGraph;
/// use rarecraft::ItemId;
///
/// let mut graph = RecipeGraph::new();
/// let ingot = ItemId::from_str("ingot");
/// let block = ItemId::from_str("block");
///
/// // block from ingots, ingots from block
/// graph.add_edge(block.clone(), ingot.clone());
/// graph.add_edge(ingot.clone(), block.clone());
///
/// let cycles = graph.cycles();
/// assert_eq!(cycles, vec![vec![block, ingot]]);
/// ```
pub struct RecipeGraph {
    graph: DiGraph<ItemId, ()>,
    node_map: HashMap<ItemId, NodeIndex>,
}

impl RecipeGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Build the graph for every item and recipe in `catalog`.
    ///
    /// Fails only if the catalog cannot be enumerated; items whose recipes
    /// cannot be read contribute no edges.
    pub fn from_catalog<C: CatalogSource + ?Sized>(catalog: &C) -> Result<Self> {
        let mut graph = Self::new();
        for item in catalog.list_items()? {
            graph.add_node(item.clone());
            let recipes = catalog.recipes_for(&item).unwrap_or_default();
            for recipe in recipes {
                for ingredient in recipe.ingredients {
                    graph.add_edge(item.clone(), ingredient.item);
                }
            }
        }
        Ok(graph)
    }

    /// Add a node if it doesn't exist and return its index.
    pub fn add_node(&mut self, item: ItemId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&item) {
            idx
        } else {
            let idx = self.graph.add_node(item.clone());
            self.node_map.insert(item, idx);
            idx
        }
    }

    /// Record that `output` is craftable from `ingredient`.
    ///
    /// Repeated pairs add a single edge.
    pub fn add_edge(&mut self, output: ItemId, ingredient: ItemId) {
        let out_idx = self.add_node(output);
        let in_idx = self.add_node(ingredient);
        self.graph.update_edge(in_idx, out_idx, ());
    }

    /// Whether `item` is in the graph.
    pub fn contains_node(&self, item: &ItemId) -> bool {
        self.node_map.contains_key(item)
    }

    /// Number of items.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct ingredient → output edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Direct ingredients of `item`, sorted.
    pub fn ingredients_of(&self, item: &ItemId) -> Vec<ItemId> {
        let Some(&idx) = self.node_map.get(item) else {
            return Vec::new();
        };
        let mut deps: Vec<ItemId> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect();
        deps.sort();
        deps
    }

    /// Every recipe loop: strongly connected components with more than one
    /// item, plus items craftable directly from themselves.
    ///
    /// Each loop is sorted and the list is sorted, so the result does not
    /// depend on insertion order.
    pub fn cycles(&self) -> Vec<Vec<ItemId>> {
        let mut cycles: Vec<Vec<ItemId>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&n| self.graph.contains_edge(n, n))
            })
            .map(|component| {
                let mut items: Vec<ItemId> =
                    component.into_iter().map(|n| self.graph[n].clone()).collect();
                items.sort();
                items
            })
            .collect();
        cycles.sort();
        cycles
    }
}

impl Default for RecipeGraph {
    fn default() -> Self {
        Self::new()
    }
}
