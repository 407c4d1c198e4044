//! Terminal rendering for catalog records.

#![allow(clippy::print_stdout)]

use serde::Serialize;
use taiyuan_core::{CarouselItem, Category, Product, StoreSettings, Transport};
use taiyuan_storefront::catalog::CategoryNode;
use taiyuan_storefront::StorefrontError;

/// Print any record as pretty JSON.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<(), StorefrontError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn blank_line() {
    println!();
}

pub fn categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories.");
        return;
    }
    for category in categories {
        println!("{:<26} {}", category.id.as_str(), category.name);
    }
}

pub fn forest(nodes: &[CategoryNode]) {
    if nodes.is_empty() {
        println!("No categories.");
        return;
    }
    for node in nodes {
        tree_node(node, 0);
    }
}

fn tree_node(node: &CategoryNode, depth: usize) {
    println!(
        "{:indent$}{} ({}) - {} products",
        "",
        node.category.name,
        node.category.id,
        node.all_products.len(),
        indent = depth * 2
    );
    for child in &node.children {
        tree_node(child, depth + 1);
    }
}

pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("No products.");
        return;
    }
    for product in products {
        let stock = if product.stock == 0 {
            "sold out".to_string()
        } else {
            format!("{} in stock", product.stock)
        };
        println!(
            "{:<26} {:<32} {:>10}  {}",
            product.id.as_str(),
            product.name,
            product.price.to_string(),
            stock
        );
    }
}

pub fn product(product: &Product) {
    println!("{} ({})", product.name, product.id);
    match product.original_price {
        Some(original) if original > product.price => {
            println!("  Price:     {} (was {original})", product.price);
        }
        _ => println!("  Price:     {}", product.price),
    }
    println!("  Stock:     {}", product.stock);
    if !product.is_active {
        println!("  Inactive");
    }
    if product.is_customizable {
        println!("  Accepts a customization note");
    }
    if !product.transport.is_empty() {
        let transports: Vec<&str> = product.transport.iter().map(|t| t.as_str()).collect();
        println!("  Shipping:  {}", transports.join(", "));
    }
    if let Some(description) = &product.description {
        println!();
        println!("{description}");
    }
}

pub fn transports(transports: &[Transport]) {
    if transports.is_empty() {
        println!("No transport methods.");
        return;
    }
    for transport in transports {
        println!(
            "{:<26} {:<24} {:>10}",
            transport.id.as_str(),
            transport.name,
            transport.fee.to_string()
        );
    }
}

pub fn carousels(items: &[CarouselItem]) {
    if items.is_empty() {
        println!("No carousel slides.");
        return;
    }
    for item in items {
        println!(
            "{:<26} {:<24} {}",
            item.id.as_str(),
            item.title.as_deref().unwrap_or("(untitled)"),
            item.image_url
        );
    }
}

pub fn settings(settings: &StoreSettings) {
    println!("{}", settings.store_name.as_deref().unwrap_or("(unnamed store)"));
    if let Some(description) = &settings.store_description {
        println!("  {description}");
    }
    if let Some(phone) = &settings.contact.phone {
        println!("  Phone:   {phone}");
    }
    if let Some(email) = &settings.contact.email {
        println!("  Email:   {email}");
    }
    if let Some(address) = settings.address.display_line() {
        println!("  Address: {address}");
    }
    if settings.social_links.any() {
        println!("  Social links configured");
    }
}
