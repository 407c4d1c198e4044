//! Catalog views derived from fetched records.
//!
//! - [`tree`] builds the category forest and resolves single subtrees
//! - [`filter`] narrows and orders product lists for listing pages

pub mod filter;
pub mod tree;

pub use filter::{ProductQuery, SortOrder};
pub use tree::{
    CategoryNode, build_category_tree, find_in_forest, find_node_with_subtree, root_categories,
};
