//! SQL text for each workflow step
//!
//! Identifiers are always quoted through the validated name types; key
//! values are always bound as a `text[]` parameter and compared against
//! `pk::text`, so any scalar key type matches without a cast table.

use lossdrill_core::identifiers::{ColumnName, TableName, quote_ident};

/// All key values of `table`, rendered as text.
pub fn select_keys(table: &TableName, primary_key: &ColumnName) -> String {
    format!(
        "SELECT {pk}::text FROM {table}",
        pk = primary_key.quoted(),
        table = table.quoted()
    )
}

/// Every relation name in the schema new tables are created in. Views,
/// materialized views, sequences, indexes and composite types share the
/// namespace with tables, and `pg_class` lists them regardless of privileges.
pub const LIST_RELATIONS: &str = "SELECT c.relname::text \
     FROM pg_catalog.pg_class c \
     JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
     WHERE n.nspname = current_schema()";

/// Columns of a table that accept explicit values, in attribute order.
/// Bound parameter: the quoted table name, resolved through `regclass`.
pub const INSERTABLE_COLUMNS: &str = "SELECT attname::text \
     FROM pg_catalog.pg_attribute \
     WHERE attrelid = $1::text::regclass \
       AND attnum > 0 \
       AND NOT attisdropped \
       AND attgenerated = '' \
     ORDER BY attnum";

/// Empty copy of `target` with every column, check constraint, index and
/// generated column definition.
pub fn create_backup_table(backup: &TableName, target: &TableName) -> String {
    format!(
        "CREATE TABLE {backup} (LIKE {target} \
         INCLUDING CONSTRAINTS INCLUDING INDEXES INCLUDING GENERATED)",
        backup = backup.quoted(),
        target = target.quoted()
    )
}

/// Copy rows with sampled keys from `source` into `destination`.
///
/// `OVERRIDING SYSTEM VALUE` lets identity key columns keep their values.
pub fn copy_rows(
    destination: &TableName,
    source: &TableName,
    primary_key: &ColumnName,
    columns: &[String],
) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {dest} ({cols}) OVERRIDING SYSTEM VALUE \
         SELECT {cols} FROM {src} WHERE {pk}::text = ANY($1)",
        dest = destination.quoted(),
        src = source.quoted(),
        cols = column_list,
        pk = primary_key.quoted()
    )
}

/// Sampled keys already present in `table`.
pub fn present_keys(table: &TableName, primary_key: &ColumnName) -> String {
    format!(
        "SELECT {pk}::text FROM {table} WHERE {pk}::text = ANY($1)",
        pk = primary_key.quoted(),
        table = table.quoted()
    )
}

/// Remove rows with sampled keys.
pub fn delete_rows(table: &TableName, primary_key: &ColumnName) -> String {
    format!(
        "DELETE FROM {table} WHERE {pk}::text = ANY($1)",
        table = table.quoted(),
        pk = primary_key.quoted()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customers() -> (TableName, ColumnName) {
        (
            TableName::new("customers").unwrap(),
            ColumnName::new("customer_id").unwrap(),
        )
    }

    #[test]
    fn test_select_keys() {
        let (table, pk) = customers();
        assert_eq!(
            select_keys(&table, &pk),
            r#"SELECT "customer_id"::text FROM "customers""#
        );
    }

    #[test]
    fn test_create_backup_mirrors_full_schema() {
        let (table, _) = customers();
        let backup = TableName::new("customers_backup_v1").unwrap();
        let sql = create_backup_table(&backup, &table);
        assert!(sql.starts_with(r#"CREATE TABLE "customers_backup_v1" (LIKE "customers""#));
        assert!(sql.contains("INCLUDING CONSTRAINTS"));
        assert!(sql.contains("INCLUDING INDEXES"));
    }

    #[test]
    fn test_copy_rows_lists_columns_on_both_sides() {
        let (table, pk) = customers();
        let backup = TableName::new("customers_backup").unwrap();
        let columns = vec!["customer_id".to_string(), "Full Name".to_string()];
        assert_eq!(
            copy_rows(&backup, &table, &pk, &columns),
            r#"INSERT INTO "customers_backup" ("customer_id", "Full Name") OVERRIDING SYSTEM VALUE SELECT "customer_id", "Full Name" FROM "customers" WHERE "customer_id"::text = ANY($1)"#
        );
    }

    #[test]
    fn test_hostile_names_stay_quoted() {
        let table = TableName::new(r#"x"; DROP TABLE customers; --"#).unwrap();
        let pk = ColumnName::new("id").unwrap();
        assert_eq!(
            delete_rows(&table, &pk),
            r#"DELETE FROM "x""; DROP TABLE customers; --" WHERE "id"::text = ANY($1)"#
        );
    }

    #[test]
    fn test_relation_listing_covers_whole_namespace() {
        assert!(LIST_RELATIONS.contains("pg_catalog.pg_class"));
        assert!(LIST_RELATIONS.contains("current_schema()"));
        assert!(!LIST_RELATIONS.contains("information_schema"));
    }

    #[test]
    fn test_present_keys() {
        let (table, pk) = customers();
        assert_eq!(
            present_keys(&table, &pk),
            r#"SELECT "customer_id"::text FROM "customers" WHERE "customer_id"::text = ANY($1)"#
        );
    }
}
