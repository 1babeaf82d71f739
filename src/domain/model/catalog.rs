use super::CatalogModel;

/// The products collection, keyed by `ProductID`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductModel;

impl CatalogModel for ProductModel {
    fn table_name(&self) -> &str {
        "products"
    }

    fn id_field(&self) -> &str {
        "ProductID"
    }

    fn id_prefix(&self) -> &str {
        "prod_"
    }

    fn display_name(&self) -> &str {
        "Product"
    }
}

/// The categories collection, keyed by `CategoryID`.
///
/// Categories are not linked to products; no referential integrity is
/// enforced between the two collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryModel;

impl CatalogModel for CategoryModel {
    fn table_name(&self) -> &str {
        "categories"
    }

    fn id_field(&self) -> &str {
        "CategoryID"
    }

    fn id_prefix(&self) -> &str {
        "cat_"
    }

    fn display_name(&self) -> &str {
        "Category"
    }
}
