//! Category forest construction.
//!
//! Categories arrive as a flat list linked through `parentCategory`. The
//! builder turns that list into a forest where every node also carries the
//! products of its whole subtree, deduplicated by product id.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use taiyuan_core::{Category, CategoryId, ProductId, ProductRef};

/// A category with its resolved children and aggregated products.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
    /// Own products followed by every descendant's, first occurrence kept.
    /// Entries stay in the shape the API sent them (document or bare id).
    pub all_products: Vec<ProductRef>,
}

impl CategoryNode {
    /// Node with no children, aggregating only its own products.
    #[must_use]
    pub fn leaf(category: Category) -> Self {
        let mut all_products = ProductSet::default();
        all_products.extend(&category.products);
        Self {
            category,
            children: Vec::new(),
            all_products: all_products.into_vec(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &CategoryId {
        &self.category.id
    }

    /// This node or the first descendant (depth-first) with `id`.
    #[must_use]
    pub fn find(&self, id: &CategoryId) -> Option<&Self> {
        if self.id() == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Ids of every strict descendant, depth-first.
    #[must_use]
    pub fn descendant_ids(&self) -> Vec<CategoryId> {
        let mut ids = Vec::new();
        for child in &self.children {
            ids.push(child.id().clone());
            ids.extend(child.descendant_ids());
        }
        ids
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

/// Locate `id` anywhere in a forest.
#[must_use]
pub fn find_in_forest<'a>(forest: &'a [CategoryNode], id: &CategoryId) -> Option<&'a CategoryNode> {
    forest.iter().find_map(|root| root.find(id))
}

/// Build the category forest from flat records.
///
/// Roots are records without a parent or whose parent is not in the list,
/// in input order. Records that only hang off a parent cycle are promoted to
/// roots after that, so every distinct record appears exactly once.
#[must_use]
pub fn build_category_tree(categories: &[Category]) -> Vec<CategoryNode> {
    let index = TreeIndex::new(categories);
    let mut builder = Builder::new(&index);

    let mut forest: Vec<CategoryNode> = index
        .roots()
        .map(|category| builder.build(category))
        .collect();

    for &category in &index.records {
        if !builder.placed.contains(&category.id) {
            tracing::warn!(
                category_id = %category.id,
                "Category sits on a parent cycle, promoting to root"
            );
            forest.push(builder.build(category));
        }
    }

    forest
}

/// Flat records without a parent reference.
///
/// Orphans pointing at a missing parent are not included here even though
/// [`build_category_tree`] promotes them to roots.
#[must_use]
pub fn root_categories(categories: &[Category]) -> Vec<Category> {
    categories
        .iter()
        .filter(|category| category.is_root())
        .cloned()
        .collect()
}

/// Resolve one category and its descendants from the flat list.
///
/// Returns `None` when `id` is not in `categories`.
#[must_use]
pub fn find_node_with_subtree(categories: &[Category], id: &CategoryId) -> Option<CategoryNode> {
    let index = TreeIndex::new(categories);
    let target = *index.by_id.get(id)?;
    Some(Builder::new(&index).build(target))
}

// =============================================================================
// Internals
// =============================================================================

/// Distinct records plus parent/child links between them.
struct TreeIndex<'a> {
    /// First record for each id, in input order.
    records: Vec<&'a Category>,
    by_id: HashMap<&'a CategoryId, &'a Category>,
    children: HashMap<&'a CategoryId, Vec<&'a Category>>,
}

impl<'a> TreeIndex<'a> {
    fn new(categories: &'a [Category]) -> Self {
        let mut records = Vec::with_capacity(categories.len());
        let mut by_id = HashMap::with_capacity(categories.len());

        for category in categories {
            if by_id.contains_key(&category.id) {
                tracing::warn!(category_id = %category.id, "Duplicate category id, keeping first");
                continue;
            }
            by_id.insert(&category.id, category);
            records.push(category);
        }

        let mut children: HashMap<&CategoryId, Vec<&Category>> = HashMap::new();
        for &category in &records {
            if let Some(parent) = category
                .parent_category
                .as_ref()
                .filter(|parent| by_id.contains_key(parent))
            {
                children.entry(parent).or_default().push(category);
            }
        }

        Self {
            records,
            by_id,
            children,
        }
    }

    /// Records with no parent or a parent missing from the list.
    fn roots(&self) -> impl Iterator<Item = &'a Category> + '_ {
        self.records.iter().copied().filter(|category| {
            category
                .parent_category
                .as_ref()
                .is_none_or(|parent| !self.by_id.contains_key(parent))
        })
    }

    fn children_of(&self, id: &CategoryId) -> &[&'a Category] {
        self.children.get(id).map(Vec::as_slice).unwrap_or_default()
    }
}

struct Builder<'i, 'a> {
    index: &'i TreeIndex<'a>,
    on_path: HashSet<&'a CategoryId>,
    placed: HashSet<&'a CategoryId>,
}

impl<'i, 'a> Builder<'i, 'a> {
    fn new(index: &'i TreeIndex<'a>) -> Self {
        Self {
            index,
            on_path: HashSet::new(),
            placed: HashSet::new(),
        }
    }

    fn build(&mut self, category: &'a Category) -> CategoryNode {
        let index = self.index;
        self.on_path.insert(&category.id);
        self.placed.insert(&category.id);

        let mut children = Vec::new();
        for &child in index.children_of(&category.id) {
            if self.on_path.contains(&child.id) {
                tracing::warn!(
                    category_id = %category.id,
                    child_id = %child.id,
                    "Dropping parent cycle edge"
                );
                continue;
            }
            // Only hit when a promoted cycle member reaches an already built node
            if self.placed.contains(&child.id) {
                continue;
            }
            children.push(self.build(child));
        }

        let mut all_products = ProductSet::default();
        all_products.extend(&category.products);
        for child in &children {
            all_products.extend(&child.category.products);
        }
        for child in &children {
            all_products.extend(&child.all_products);
        }

        self.on_path.remove(&category.id);

        CategoryNode {
            category: category.clone(),
            children,
            all_products: all_products.into_vec(),
        }
    }
}

/// Insertion-ordered product list, unique by id.
#[derive(Default)]
struct ProductSet {
    seen: HashSet<ProductId>,
    products: Vec<ProductRef>,
}

impl ProductSet {
    fn extend<'p>(&mut self, products: impl IntoIterator<Item = &'p ProductRef>) {
        for product in products {
            if self.seen.insert(product.id().clone()) {
                self.products.push(product.clone());
            }
        }
    }

    fn into_vec(self) -> Vec<ProductRef> {
        self.products
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use taiyuan_core::{Price, Product};

    use super::*;

    fn product(id: &str) -> Product {
        Product::new(id, id.to_uppercase(), Price::from_units(100))
    }

    fn ids(products: &[ProductRef]) -> Vec<&str> {
        products.iter().map(|p| p.id().as_str()).collect()
    }

    fn chain() -> Vec<Category> {
        vec![
            Category::new("1", "Tea").with_products(vec![product("a")]),
            Category::new("2", "Oolong")
                .with_parent("1")
                .with_products(vec![product("b")]),
            Category::new("3", "Roasted")
                .with_parent("2")
                .with_products(vec![product("c")]),
        ]
    }

    #[test]
    fn test_three_level_chain_aggregates_products() {
        let forest = build_category_tree(&chain());

        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.id().as_str(), "1");
        assert_eq!(ids(&root.all_products), ["a", "b", "c"]);

        let middle = &root.children[0];
        assert_eq!(ids(&middle.all_products), ["b", "c"]);

        let leaf = &middle.children[0];
        assert_eq!(ids(&leaf.all_products), ["c"]);
        assert!(leaf.children.is_empty());
    }

    #[test]
    fn test_empty_input_is_empty_forest() {
        assert!(build_category_tree(&[]).is_empty());
    }

    #[test]
    fn test_orphan_becomes_root() {
        let categories = vec![
            Category::new("1", "Tea"),
            Category::new("9", "Lost").with_parent("missing"),
        ];
        let forest = build_category_tree(&categories);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[1].id().as_str(), "9");

        // The flat root list only keeps records with no parent at all
        let roots = root_categories(&categories);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id.as_str(), "1");
    }

    #[test]
    fn test_node_count_matches_input() {
        let categories = vec![
            Category::new("1", "Tea"),
            Category::new("2", "Green").with_parent("1"),
            Category::new("3", "Black").with_parent("1"),
            Category::new("4", "Assam").with_parent("3"),
            Category::new("5", "Ware"),
            Category::new("6", "Cups").with_parent("5"),
        ];
        let forest = build_category_tree(&categories);
        let total: usize = forest.iter().map(CategoryNode::node_count).sum();
        assert_eq!(forest.len(), 2);
        assert_eq!(total, categories.len());
    }

    #[test]
    fn test_shared_product_counted_once() {
        let shared = product("s");
        let categories = vec![
            Category::new("1", "Tea").with_products(vec![shared.clone()]),
            Category::new("2", "Green")
                .with_parent("1")
                .with_products(vec![shared.clone(), product("g")]),
            Category::new("3", "Black")
                .with_parent("1")
                .with_products(vec![product("k"), shared]),
        ];
        let forest = build_category_tree(&categories);
        assert_eq!(ids(&forest[0].all_products), ["s", "g", "k"]);
    }

    #[test]
    fn test_direct_children_products_precede_grandchildren() {
        let categories = vec![
            Category::new("1", "Tea"),
            Category::new("2", "Oolong")
                .with_parent("1")
                .with_products(vec![product("b")]),
            Category::new("3", "Roasted")
                .with_parent("2")
                .with_products(vec![product("c")]),
            Category::new("4", "Green")
                .with_parent("1")
                .with_products(vec![product("d")]),
        ];
        let forest = build_category_tree(&categories);
        assert_eq!(ids(&forest[0].all_products), ["b", "d", "c"]);
    }

    #[test]
    fn test_duplicate_ids_keep_first_record() {
        let categories = vec![
            Category::new("1", "Tea"),
            Category::new("1", "Impostor").with_products(vec![product("x")]),
        ];
        let forest = build_category_tree(&categories);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category.name, "Tea");
        assert!(forest[0].all_products.is_empty());
    }

    #[test]
    fn test_parent_cycle_is_broken() {
        let categories = vec![
            Category::new("root", "Tea"),
            Category::new("x", "X")
                .with_parent("y")
                .with_products(vec![product("px")]),
            Category::new("y", "Y")
                .with_parent("x")
                .with_products(vec![product("py")]),
            Category::new("z", "Z")
                .with_parent("y")
                .with_products(vec![product("pz")]),
        ];
        let forest = build_category_tree(&categories);

        let total: usize = forest.iter().map(CategoryNode::node_count).sum();
        assert_eq!(total, 4);
        assert_eq!(forest.len(), 2);

        let promoted = &forest[1];
        assert_eq!(promoted.id().as_str(), "x");
        assert_eq!(ids(&promoted.all_products), ["px", "py", "pz"]);
    }

    #[test]
    fn test_self_parent_is_promoted() {
        let categories = vec![Category::new("1", "Loop").with_parent("1")];
        let forest = build_category_tree(&categories);
        assert_eq!(forest.len(), 1);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_find_node_with_subtree() {
        let node = find_node_with_subtree(&chain(), &CategoryId::new("2")).unwrap();
        assert_eq!(node.id().as_str(), "2");
        assert_eq!(node.children.len(), 1);
        assert_eq!(ids(&node.all_products), ["b", "c"]);

        assert!(find_node_with_subtree(&chain(), &CategoryId::new("nope")).is_none());
    }

    #[test]
    fn test_find_and_descendants() {
        let forest = build_category_tree(&chain());
        let found = find_in_forest(&forest, &CategoryId::new("3")).unwrap();
        assert_eq!(found.category.name, "Roasted");

        let descendants: Vec<String> = forest[0]
            .descendant_ids()
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(descendants, ["2", "3"]);
    }

    #[test]
    fn test_leaf_node() {
        let node = CategoryNode::leaf(
            Category::new("1", "Tea").with_products(vec![product("a"), product("a")]),
        );
        assert_eq!(node.node_count(), 1);
        assert_eq!(ids(&node.all_products), ["a"]);
    }

    #[test]
    fn test_bare_product_ids_aggregate_with_documents() {
        let categories = vec![
            Category::new("1", "Tea").with_products(vec![
                ProductRef::from(ProductId::new("a")),
                ProductRef::from(product("b")),
            ]),
            Category::new("2", "Oolong").with_parent("1").with_products(vec![
                ProductRef::from(product("a")),
                ProductRef::from(ProductId::new("c")),
            ]),
        ];
        let forest = build_category_tree(&categories);

        let root = &forest[0];
        assert_eq!(ids(&root.all_products), ["a", "b", "c"]);
        // First occurrence wins, so "a" stays a bare reference
        assert!(root.all_products[0].product().is_none());
        assert_eq!(root.all_products[1].product().unwrap().name, "B");
        assert_eq!(ids(&root.children[0].all_products), ["a", "c"]);
    }
}
