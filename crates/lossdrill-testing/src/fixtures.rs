//! Ready-made tables for workflow tests

use lossdrill_core::plan::SimulationPlan;

use crate::in_memory::{InMemoryTableStore, MemTable};

/// Columns of the customers fixture, key first
pub const CUSTOMER_COLUMNS: [&str; 4] = ["customer_id", "name", "email", "balance"];

/// A `customers` table with ids `1..=rows`.
pub fn customers_table(rows: u32) -> MemTable {
    (1..=rows).fold(MemTable::new(&CUSTOMER_COLUMNS, Some("customer_id")), |table, id| {
        let id_text = id.to_string();
        let name = format!("Customer {id}");
        let email = format!("customer{id}@example.com");
        let balance = format!("{}.{:02}", id * 3, id % 100);
        table.with_row(&[&id_text, &name, &email, &balance])
    })
}

/// A store holding only the customers table.
pub fn customers_store(rows: u32) -> InMemoryTableStore {
    InMemoryTableStore::new().with_table("customers", customers_table(rows))
}

/// The default drill plan: customers, customers_backup, customer_id, 10.
pub fn customers_plan() -> SimulationPlan {
    SimulationPlan::default()
}

/// Same as [`customers_plan`] with a different sample size.
pub fn customers_plan_with_size(sample_size: usize) -> SimulationPlan {
    SimulationPlan {
        sample_size,
        ..SimulationPlan::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customers_table_shape() {
        let table = customers_table(3);
        assert_eq!(table.columns(), CUSTOMER_COLUMNS);
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.rows()[2],
            vec![
                Some("3".to_string()),
                Some("Customer 3".to_string()),
                Some("customer3@example.com".to_string()),
                Some("9.03".to_string()),
            ]
        );
    }

    #[test]
    fn test_customers_plan_defaults() {
        let plan = customers_plan_with_size(4);
        assert_eq!(plan.table.as_str(), "customers");
        assert_eq!(plan.backup_table.as_str(), "customers_backup");
        assert_eq!(plan.sample_size, 4);
    }
}
