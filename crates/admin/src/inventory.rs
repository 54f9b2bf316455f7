//! Stock figures for the admin dashboard.

use rust_decimal::Decimal;

use jhytermax_storefront::api::{Category, Product};

/// Products at or below this quantity count as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Headline catalog numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventorySummary {
    pub product_count: usize,
    pub category_count: usize,
    pub low_stock_count: usize,
    /// Σ price × quantity over the catalog.
    pub inventory_value: Decimal,
}

impl InventorySummary {
    #[must_use]
    pub fn from_catalog(products: &[Product], categories: &[Category]) -> Self {
        Self {
            product_count: products.len(),
            category_count: categories.len(),
            low_stock_count: low_stock(products).count(),
            inventory_value: products
                .iter()
                .map(|p| p.price * Decimal::from(p.quantity))
                .sum(),
        }
    }
}

/// Products that need restocking.
pub fn low_stock(products: &[Product]) -> impl Iterator<Item = &Product> {
    products
        .iter()
        .filter(|p| p.quantity <= LOW_STOCK_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use jhytermax_core::{CategoryId, ProductId};

    use super::*;

    fn product(id: i64, price: i64, quantity: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Decimal::from(price),
            quantity,
            image: None,
            category: None,
        }
    }

    #[test]
    fn test_summary() {
        let products = [product(1, 9200, 40), product(2, 1500, 5), product(3, 800, 0)];
        let categories = [Category {
            id: CategoryId::new(1),
            name: "Leafy greens".into(),
            slug: "leafy-greens".into(),
        }];
        let summary = InventorySummary::from_catalog(&products, &categories);
        assert_eq!(summary.product_count, 3);
        assert_eq!(summary.category_count, 1);
        assert_eq!(summary.low_stock_count, 2);
        assert_eq!(summary.inventory_value, Decimal::from(375_500));
    }

    #[test]
    fn test_empty_catalog() {
        assert_eq!(
            InventorySummary::from_catalog(&[], &[]),
            InventorySummary::default()
        );
    }
}
