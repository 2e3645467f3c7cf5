use rarecraft::adjust::{AdjustmentPipeline, FlatFactor};
use rarecraft::catalog::{InMemoryCatalog, Ingredient, Recipe};
use rarecraft::merge::MinMerge;
use rarecraft::sink::{JsonSink, MemorySink};
use rarecraft::*;

fn id(s: &str) -> ItemId {
    ItemId::from_str(s)
}

fn single(ingredient: &str, quantity: u32, output: u32) -> Recipe {
    Recipe::new(vec![Ingredient::new(ingredient, quantity)], output)
}

fn value(map: &RarityMap, item: &str) -> Option<f64> {
    map.get(&id(item)).and_then(|s| s.get())
}

fn min_resolver() -> RarityResolver<MinMerge> {
    RarityResolver::new(AdjustmentPipeline::new(), MinMerge::default())
}

/// Catalog wrapper that injects lookup failures.
struct FlakyCatalog {
    inner: InMemoryCatalog,
    list_error: Option<RarityError>,
    broken_recipes: Vec<ItemId>,
    extra_listing: Vec<ItemId>,
}

impl FlakyCatalog {
    fn new(inner: InMemoryCatalog) -> Self {
        Self {
            inner,
            list_error: None,
            broken_recipes: Vec::new(),
            extra_listing: Vec::new(),
        }
    }
}

impl CatalogSource for FlakyCatalog {
    fn list_items(&self) -> Result<Vec<ItemId>> {
        if let Some(err) = &self.list_error {
            return Err(err.clone());
        }
        let mut items = self.inner.list_items()?;
        items.extend(self.extra_listing.iter().cloned());
        Ok(items)
    }

    fn recipes_for(&self, item: &ItemId) -> Result<Vec<Recipe>> {
        if self.broken_recipes.contains(item) {
            return Err(RarityError::CatalogUnavailable(format!(
                "recipe table for {item} is corrupt"
            )));
        }
        self.inner.recipes_for(item)
    }

    fn natural_rarity_of(&self, item: &ItemId) -> Result<RarityScore> {
        self.inner.natural_rarity_of(item)
    }
}

/// A chain A -> B -> C where only A is naturally available.
#[test]
fn test_simple_chain() {
    let mut catalog = InMemoryCatalog::new();
    catalog.item("A").natural(1.0);
    catalog.item("B").recipe(single("A", 2, 1));
    catalog.item("C").recipe(single("B", 2, 1));

    let scores = min_resolver().resolve_all(&catalog).unwrap();
    assert_eq!(value(&scores, "A"), Some(1.0));
    assert_eq!(value(&scores, "B"), Some(1.0));
    assert_eq!(value(&scores, "C"), Some(1.0));

    // The adjustment compounds once per level.
    let doubled = RarityResolver::new(
        AdjustmentPipeline::new().with_factor(Box::new(FlatFactor::new(2.0))),
        MinMerge::default(),
    );
    let scores = doubled.resolve_all(&catalog).unwrap();
    assert_eq!(value(&scores, "B"), Some(2.0));
    assert_eq!(value(&scores, "C"), Some(4.0));
}

#[test]
fn test_no_recipe_item_keeps_natural() {
    let mut catalog = InMemoryCatalog::new();
    catalog.item("X").natural(0.2);

    let scores = min_resolver().resolve_all(&catalog).unwrap();
    assert_eq!(value(&scores, "X"), Some(0.2));
}

#[test]
fn test_two_cycle_resolves_to_unknown_default() {
    let mut catalog = InMemoryCatalog::new();
    catalog.item("A").recipe(single("B", 1, 1));
    catalog.item("B").recipe(single("A", 1, 1));

    let report = min_resolver().resolve_report(&catalog).unwrap();
    assert_eq!(value(&report.scores, "A"), Some(2.0));
    assert_eq!(value(&report.scores, "B"), Some(2.0));
    assert_eq!(report.cycles, vec![vec![id("A"), id("B")]]);

    let config = ResolverConfig {
        unknown_default: 5.0,
        factors: Vec::new(),
        ..ResolverConfig::default()
    };
    let scores = RarityResolver::from_config(&config)
        .unwrap()
        .resolve_all(&catalog)
        .unwrap();
    assert_eq!(value(&scores, "A"), Some(5.0));
    assert_eq!(value(&scores, "B"), Some(5.0));
}

/// `ring0 -> ring1 -> ... -> ring{n-1} -> ring0`, listed in either direction.
fn ring(n: usize, reversed: bool) -> InMemoryCatalog {
    let mut catalog = InMemoryCatalog::new();
    let mut indices: Vec<usize> = (0..n).collect();
    if reversed {
        indices.reverse();
    }
    for i in indices {
        let next = format!("ring{}", (i + 1) % n);
        catalog.item(format!("ring{i}")).recipe(single(&next, 1, 1));
    }
    catalog.item("ring7").natural(1.0);
    catalog
}

/// `link0` is natural; every `link{i}` is crafted from `link{i-1}`.
fn chain(n: usize, top_down: bool) -> InMemoryCatalog {
    let mut catalog = InMemoryCatalog::new();
    let mut indices: Vec<usize> = (0..n).collect();
    if top_down {
        indices.reverse();
    }
    for i in indices {
        let entry = catalog.item(format!("link{i}"));
        if i == 0 {
            entry.natural(1.0);
        } else {
            entry.recipe(single(&format!("link{}", i - 1), 1, 1));
        }
    }
    catalog
}

#[test]
fn test_long_cycle_terminates() {
    let n = 400;
    for reversed in [false, true] {
        let report = min_resolver().resolve_report(&ring(n, reversed)).unwrap();
        assert_eq!(report.scores.len(), n);
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].len(), n);
        // Every item can reach the one natural source.
        assert!(report.scores.iter().all(|(_, s)| s.get() == Some(1.0)));
    }
}

#[test]
fn test_long_ring_same_in_both_listing_orders() {
    let forward = min_resolver().resolve_all(&ring(300, false)).unwrap();
    let backward = min_resolver().resolve_all(&ring(300, true)).unwrap();
    assert_eq!(forward, backward);
}

#[test]
fn test_long_chain_same_in_both_listing_orders() {
    let n = 300;
    let bottom_up = min_resolver().resolve_report(&chain(n, false)).unwrap();
    let top_down = min_resolver().resolve_report(&chain(n, true)).unwrap();

    assert_eq!(bottom_up.scores, top_down.scores);
    assert_eq!(top_down.scores.len(), n);
    assert!(top_down.scores.iter().all(|(_, s)| s.get() == Some(1.0)));
    // Bottom-up, every link finds its ingredient memoized. Top-down, the
    // first walk settles the whole chain and later items are cache reads.
    assert_eq!(bottom_up.stats.memo_hits, n - 1);
    assert_eq!(top_down.stats.memo_hits, 0);
}

#[test]
fn test_very_deep_chain_listed_top_down() {
    let n = 50_000;
    let scores = min_resolver().resolve_all(&chain(n, true)).unwrap();
    assert_eq!(scores.len(), n);
    assert_eq!(value(&scores, &format!("link{}", n - 1)), Some(1.0));
    assert!(scores.iter().all(|(_, s)| s.is_resolved()));
}

#[test]
fn test_self_recipe_does_not_recurse_forever() {
    let mut catalog = InMemoryCatalog::new();
    catalog.item("slime").natural(6.0).recipe(single("slime", 1, 4));

    let report = min_resolver().resolve_report(&catalog).unwrap();
    assert_eq!(value(&report.scores, "slime"), Some(6.0));
    assert_eq!(report.cycles, vec![vec![id("slime")]]);
    assert_eq!(report.stats.cycle_cuts, 1);
}

#[test]
fn test_deterministic_runs() {
    let mut catalog = InMemoryCatalog::new();
    catalog.item("log").natural(1.0);
    catalog.item("planks").recipe(single("log", 1, 4));
    catalog.item("stick").recipe(single("planks", 2, 4));
    catalog.item("coal").spawn_probability(0.1).recipe(single("log", 1, 1));
    catalog.item("torch").recipe(Recipe::new(
        vec![Ingredient::new("coal", 1), Ingredient::new("stick", 1)],
        4,
    ));
    catalog.item("block").recipe(single("ingot", 9, 1));
    catalog.item("ingot").recipe(single("block", 1, 9));

    let resolver = RarityResolver::from_config(&ResolverConfig::default()).unwrap();
    let first = resolver.resolve_report(&catalog).unwrap();
    let second = resolver.resolve_report(&catalog).unwrap();
    assert_eq!(first, second);

    let render = |map: &RarityMap| {
        let mut sink = JsonSink::new(Vec::new());
        sink.write(map).unwrap();
        sink.into_inner()
    };
    assert_eq!(render(&first.scores), render(&second.scores));
}

/// Acyclic diamond: the contribution an ingredient makes to its parent is
/// the same value it is finally scored with, whatever the listing order.
#[test]
fn test_memoized_contribution_matches_final_score() {
    let orders: [&[&str]; 3] = [
        &["ore", "ingot", "nugget", "plate", "gear"],
        &["gear", "plate", "nugget", "ingot", "ore"],
        &["nugget", "gear", "ore", "plate", "ingot"],
    ];

    for order in orders {
        let mut catalog = InMemoryCatalog::new();
        for name in order {
            catalog.item(*name);
        }
        catalog.item("ore").natural(3.0);
        catalog.item("ingot").natural(50.0).recipe(single("ore", 1, 2));
        catalog.item("nugget").recipe(single("ingot", 1, 9));
        catalog.item("plate").recipe(single("ingot", 3, 1));
        catalog.item("gear").recipe(Recipe::new(
            vec![Ingredient::new("plate", 1), Ingredient::new("nugget", 1)],
            1,
        ));

        let report = min_resolver().resolve_report(&catalog).unwrap();
        let final_of = |item: &str| report.scores.get(&id(item)).unwrap();

        assert_eq!(
            report.breakdowns[&id("nugget")].crafted.get(),
            final_of("ingot").get().map(|v| v / 9.0)
        );
        assert_eq!(report.breakdowns[&id("plate")].crafted, final_of("ingot"));
        assert_eq!(value(&report.scores, "ingot"), Some(1.5));
        assert_eq!(report.stats.cycle_cuts, 0);
    }
}

/// A cycle-broken value computed under one chain is not reused when the
/// same item is later resolved at the top level.
#[test]
fn test_cycle_broken_value_not_cached() {
    let mut catalog = InMemoryCatalog::new();
    catalog.item("B").natural(1.0).recipe(single("A", 1, 1));
    catalog.item("A").natural(4.0).recipe(single("B", 1, 1));

    let report = min_resolver().resolve_report(&catalog).unwrap();

    // While resolving B, A could only see its own natural 4.0.
    assert_eq!(report.breakdowns[&id("B")].crafted.get(), Some(4.0));
    assert_eq!(value(&report.scores, "B"), Some(1.0));
    // Resolved on its own, A sees B's final 1.0.
    assert_eq!(report.breakdowns[&id("A")].crafted.get(), Some(1.0));
    assert_eq!(value(&report.scores, "A"), Some(1.0));
}

#[test]
fn test_cheapest_recipe_is_recorded() {
    let mut catalog = InMemoryCatalog::new();
    catalog.item("diamond").natural(800.0);
    catalog.item("cobble").natural(1.0);
    catalog
        .item("pickaxe")
        .recipe(single("diamond", 3, 1))
        .recipe(single("cobble", 3, 1));

    let report = min_resolver().resolve_report(&catalog).unwrap();
    let pickaxe = &report.breakdowns[&id("pickaxe")];
    assert_eq!(pickaxe.recipe, Some(1));
    assert_eq!(pickaxe.score.get(), Some(1.0));
}

#[test]
fn test_cut_edge_blocks_recipe() {
    let mut catalog = InMemoryCatalog::new();
    catalog.item("A").natural(1.0);
    // C needs itself as well as A, so the recipe can never complete.
    catalog.item("C").natural(9.0).recipe(Recipe::new(
        vec![Ingredient::new("A", 1), Ingredient::new("C", 1)],
        1,
    ));
    catalog.item("D").natural(9.0).recipe(Recipe::new(Vec::new(), 1));

    let scores = min_resolver().resolve_all(&catalog).unwrap();
    assert_eq!(value(&scores, "C"), Some(9.0));
    // An empty recipe contributes nothing, so D keeps its natural odds.
    assert_eq!(value(&scores, "D"), Some(9.0));
}

#[test]
fn test_listing_failure_aborts_run() {
    let mut flaky = FlakyCatalog::new(InMemoryCatalog::new());
    flaky.list_error = Some(RarityError::Io("registry offline".to_string()));

    match min_resolver().resolve_all(&flaky) {
        Err(RarityError::CatalogUnavailable(msg)) => assert!(msg.contains("registry offline")),
        other => panic!("Expected CatalogUnavailable, got {other:?}"),
    }
}

#[test]
fn test_recipe_failure_treated_as_uncraftable() {
    let mut inner = InMemoryCatalog::new();
    inner.item("A").natural(1.0);
    inner.item("B").natural(6.0).recipe(single("A", 1, 1));
    let mut flaky = FlakyCatalog::new(inner);
    flaky.broken_recipes.push(id("B"));

    let scores = min_resolver().resolve_all(&flaky).unwrap();
    assert_eq!(value(&scores, "B"), Some(6.0));
}

#[test]
fn test_duplicate_listing_scored_once() {
    let mut inner = InMemoryCatalog::new();
    inner.item("A").natural(1.0);
    inner.item("B").recipe(single("A", 1, 1));
    let mut flaky = FlakyCatalog::new(inner);
    flaky.extra_listing = vec![id("A"), id("B")];

    let report = min_resolver().resolve_report(&flaky).unwrap();
    assert_eq!(report.scores.len(), 2);
    assert_eq!(report.stats.items, 2);
}

#[test]
fn test_unlisted_ingredient_still_resolves() {
    let mut catalog = InMemoryCatalog::new();
    catalog.item("bread").recipe(single("wheat", 3, 1));

    let scores = min_resolver().resolve_all(&catalog).unwrap();
    // wheat has no signal at all, so it counts as the unknown default.
    assert_eq!(value(&scores, "bread"), Some(2.0));
    assert!(!scores.contains(&id("wheat")));
}

#[test]
fn test_dyn_catalog() {
    let mut catalog = InMemoryCatalog::new();
    catalog.item("A").natural(3.0);
    let source: &dyn CatalogSource = &catalog;

    let scores = min_resolver().resolve_all(&source).unwrap();
    assert_eq!(value(&scores, "A"), Some(3.0));
}

#[test]
fn test_json_catalog_to_json_sink() {
    let catalog = InMemoryCatalog::from_json_str(
        r#"{
            "items": [
                { "id": "sand", "spawn_probability": 0.5 },
                { "id": "glass", "recipes": [
                    { "ingredients": [{ "item": "sand", "quantity": 1 }] }
                ] },
                { "id": "pane", "recipes": [
                    { "ingredients": [{ "item": "glass", "quantity": 6 }], "output_count": 16 }
                ] }
            ]
        }"#,
    )
    .unwrap();

    let resolver = min_resolver();
    let mut memory = MemorySink::new();
    let scores = resolver.resolve_into(&catalog, &mut memory).unwrap();
    assert_eq!(memory.last(), Some(&scores));
    assert_eq!(value(&scores, "glass"), Some(2.0));
    assert_eq!(value(&scores, "pane"), Some(0.125));

    let path = std::env::temp_dir().join(format!("rarecraft-{}.json", std::process::id()));
    {
        let mut sink = JsonSink::create(&path).unwrap();
        resolver.resolve_into(&catalog, &mut sink).unwrap();
    }
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    let back: RarityMap = serde_json::from_str(&text).unwrap();
    assert_eq!(back, scores);
}
