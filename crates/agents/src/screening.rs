//! Catalog screening: products that draw traffic but don't convert.

use pilot_core::types::Product;

/// Products whose page views are above the catalog mean while sales are below it.
/// Both comparisons are strict.
pub fn underperformers(products: &[Product]) -> Vec<Product> {
    if products.is_empty() {
        return Vec::new();
    }
    let n = products.len() as f64;
    let mean_views = products.iter().map(|p| p.page_views as f64).sum::<f64>() / n;
    let mean_sales = products.iter().map(|p| p.sales as f64).sum::<f64>() / n;

    products
        .iter()
        .filter(|p| p.page_views as f64 > mean_views && (p.sales as f64) < mean_sales)
        .cloned()
        .collect()
}
