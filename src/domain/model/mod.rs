//! Domain model definitions for the catalog collections.

pub mod catalog;

pub use catalog::{CategoryModel, ProductModel};

/// Trait that defines the contract for any catalog collection.
///
/// Records themselves are schemaless JSON objects; a model only describes
/// where a collection lives and how its records are identified:
/// - Table name (also the collection key in the flat-file store)
/// - Identifier field and the prefix used when generating identifiers
/// - SQL schema definition for the relational store
pub trait CatalogModel: Send + Sync {
    /// Returns the name of the database table (or file collection) for this model.
    fn table_name(&self) -> &str;

    /// Returns the name of the identifier field carried by every record.
    fn id_field(&self) -> &str;

    /// Prefix prepended to generated identifiers.
    fn id_prefix(&self) -> &str;

    /// Human readable singular name, used in client-facing messages.
    fn display_name(&self) -> &str;

    /// Returns the SQL statements that create the backing table and its
    /// identifier index. Executed when the relational store starts up.
    fn get_create_table_sql(&self) -> Vec<String> {
        let table = self.table_name();
        vec![
            format!("CREATE TABLE IF NOT EXISTS {table} (data JSONB NOT NULL)"),
            format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {table}_{id}_idx ON {table} ((data->>'{id}'))",
                id = self.id_field()
            ),
        ]
    }

    /// Message returned with a 404 when an identifier has no matching record.
    fn not_found_message(&self) -> String {
        format!("{} not found", self.display_name())
    }
}
