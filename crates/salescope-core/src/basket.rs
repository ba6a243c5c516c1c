//! Market basket mining: product pairs bought together
//!
//! Orders are turned into an order x product incidence table, every pair of
//! products present in the same order is counted once per order, and pairs
//! seen in at least `min_support` orders are reported, most frequent first.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::config::BasketConfig;
use crate::models::{BasketRule, Key, ProductPair};
use crate::schema::SalesSchema;
use crate::table::Table;

/// Boolean order x product matrix
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidenceTable {
    orders: Vec<Key>,
    products: Vec<Key>,
    cells: Vec<Vec<bool>>,
}

impl IncidenceTable {
    /// Build from order, product and amount columns
    ///
    /// A product is present in an order when at least one of its rows for
    /// that order has a non-empty amount. Rows with an empty order or
    /// product are ignored. Orders and products are kept in key order.
    pub fn from_table(table: &Table, order_idx: usize, product_idx: usize, amount_idx: usize) -> Self {
        let mut counts: BTreeMap<Key, BTreeMap<Key, usize>> = BTreeMap::new();
        let mut products: BTreeSet<Key> = BTreeSet::new();

        for row in table.rows() {
            let (Some(order), Some(product)) = (row[order_idx].key(), row[product_idx].key())
            else {
                continue;
            };
            let present = usize::from(!row[amount_idx].is_empty());
            *counts
                .entry(order)
                .or_default()
                .entry(product.clone())
                .or_insert(0) += present;
            products.insert(product);
        }

        let products: Vec<Key> = products.into_iter().collect();
        let mut orders = Vec::with_capacity(counts.len());
        let mut cells = Vec::with_capacity(counts.len());

        for (order, per_product) in counts {
            cells.push(
                products
                    .iter()
                    .map(|p| per_product.get(p).is_some_and(|&n| n > 0))
                    .collect(),
            );
            orders.push(order);
        }

        Self {
            orders,
            products,
            cells,
        }
    }

    pub fn orders(&self) -> &[Key] {
        &self.orders
    }

    pub fn products(&self) -> &[Key] {
        &self.products
    }

    /// Whether `product` appears in `order`
    pub fn contains(&self, order: &Key, product: &Key) -> bool {
        let (Ok(o), Ok(p)) = (
            self.orders.binary_search(order),
            self.products.binary_search(product),
        ) else {
            return false;
        };
        self.cells[o][p]
    }

    /// Products present in the order at row `order_pos`, in column order
    fn present(&self, order_pos: usize) -> impl Iterator<Item = &Key> + '_ {
        self.products
            .iter()
            .zip(&self.cells[order_pos])
            .filter_map(|(product, &present)| present.then_some(product))
    }
}

/// Count co-occurring product pairs and keep those in at least
/// `min_support` orders
///
/// Sorted by descending count; equal counts keep the order in which the
/// pair was first seen (orders ascending, then products ascending).
pub fn frequent_pairs(incidence: &IncidenceTable, min_support: usize) -> Vec<BasketRule> {
    let mut counts: HashMap<ProductPair, usize> = HashMap::new();
    let mut first_seen: Vec<ProductPair> = Vec::new();

    for order_pos in 0..incidence.orders.len() {
        let present: Vec<&Key> = incidence.present(order_pos).collect();
        for (i, a) in present.iter().enumerate() {
            for b in &present[i + 1..] {
                let pair = ProductPair::new(a.to_string(), b.to_string());
                let count = counts.entry(pair.clone()).or_insert(0);
                if *count == 0 {
                    first_seen.push(pair);
                }
                *count += 1;
            }
        }
    }

    let mut rules: Vec<BasketRule> = first_seen
        .into_iter()
        .filter_map(|pair| {
            let count = counts[&pair];
            (count >= min_support).then_some(BasketRule { pair, count })
        })
        .collect();
    // Stable: ties stay in first-seen order
    rules.sort_by(|a, b| b.count.cmp(&a.count));
    rules
}

/// Mine a sales table; `None` when it lacks order or product columns
pub fn mine(table: &Table, schema: &SalesSchema, config: &BasketConfig) -> Option<Vec<BasketRule>> {
    let (order_idx, product_idx) = schema.basket_columns()?;

    let incidence = IncidenceTable::from_table(table, order_idx, product_idx, schema.total);
    let rules = frequent_pairs(&incidence, config.min_support);

    debug!(
        "Basket: {} orders x {} products, {} frequent pairs",
        incidence.orders().len(),
        incidence.products().len(),
        rules.len()
    );
    Some(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_delimited;
    use crate::schema::{classify, Schema};

    fn sales(csv: &str) -> (Table, SalesSchema) {
        let table = parse_delimited(csv, b',').unwrap();
        match classify(&table).unwrap() {
            Schema::Sales(schema) => (table, schema),
            other => panic!("expected sales schema, got {other:?}"),
        }
    }

    fn rule(a: &str, b: &str, count: usize) -> BasketRule {
        BasketRule {
            pair: ProductPair::new(a, b),
            count,
        }
    }

    #[test]
    fn test_scenario_pair_in_two_orders() {
        let (table, schema) = sales(
            "Date,OrderID,Product,Total
2024-01-05,1,A,10
2024-01-05,1,B,20
2024-02-10,2,A,15
2024-02-10,2,B,25",
        );
        let rules = mine(&table, &schema, &BasketConfig::default()).unwrap();
        assert_eq!(rules, vec![rule("A", "B", 2)]);
    }

    #[test]
    fn test_pair_in_one_order_is_dropped() {
        let (table, schema) = sales(
            "Date,OrderID,Product,Total
2024-01-05,1,A,10
2024-01-05,1,B,20
2024-02-10,2,A,15
2024-02-10,2,C,25",
        );
        let rules = mine(&table, &schema, &BasketConfig::default()).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_pair_order_in_rows_does_not_matter() {
        // B before A in the second order still counts toward {A, B}
        let (table, schema) = sales(
            "Date,OrderID,Product,Total
2024-01-05,1,A,10
2024-01-05,1,B,20
2024-02-10,2,B,25
2024-02-10,2,A,15",
        );
        let rules = mine(&table, &schema, &BasketConfig::default()).unwrap();
        assert_eq!(rules, vec![rule("A", "B", 2)]);
    }

    #[test]
    fn test_repeated_product_counts_once_per_order() {
        let (table, schema) = sales(
            "Date,OrderID,Product,Total
2024-01-05,1,A,10
2024-01-05,1,A,10
2024-01-05,1,A,10
2024-01-05,1,B,20",
        );
        let rules = mine(&table, &schema, &BasketConfig { min_support: 1 }).unwrap();
        assert_eq!(rules, vec![rule("A", "B", 1)]);
    }

    #[test]
    fn test_sorted_by_count_then_first_seen() {
        let (table, schema) = sales(
            "Date,OrderID,Product,Total
2024-01-01,1,Milk,1
2024-01-01,1,Bread,1
2024-01-01,1,Eggs,1
2024-01-02,2,Milk,1
2024-01-02,2,Bread,1
2024-01-03,3,Milk,1
2024-01-03,3,Eggs,1
2024-01-04,4,Milk,1
2024-01-04,4,Bread,1",
        );
        let rules = mine(&table, &schema, &BasketConfig::default()).unwrap();
        assert_eq!(
            rules,
            vec![rule("Bread", "Milk", 3), rule("Eggs", "Milk", 2)]
        );

        // With support 1, Bread+Eggs (count 1, seen in order 1) trails
        let rules = mine(&table, &schema, &BasketConfig { min_support: 1 }).unwrap();
        assert_eq!(
            rules,
            vec![
                rule("Bread", "Milk", 3),
                rule("Eggs", "Milk", 2),
                rule("Bread", "Eggs", 1),
            ]
        );
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let (table, schema) = sales(
            "Date,OrderID,Product,Total
2024-01-01,2,X,1
2024-01-01,2,Y,1
2024-01-01,1,C,1
2024-01-01,1,D,1
2024-01-02,3,X,1
2024-01-02,3,Y,1
2024-01-02,4,C,1
2024-01-02,4,D,1",
        );
        // Order 1 (C, D) is visited before order 2 (X, Y)
        let rules = mine(&table, &schema, &BasketConfig::default()).unwrap();
        assert_eq!(rules, vec![rule("C", "D", 2), rule("X", "Y", 2)]);
    }

    #[test]
    fn test_empty_amount_means_absent() {
        let (table, schema) = sales(
            "Date,OrderID,Product,Total
2024-01-01,1,A,1
2024-01-01,1,B,
2024-01-02,2,A,1
2024-01-02,2,B,",
        );
        let incidence = IncidenceTable::from_table(&table, 1, 2, schema.total);
        assert_eq!(incidence.products().len(), 2);
        assert!(incidence.contains(&Key::Number(1.0), &Key::Text("A".into())));
        assert!(!incidence.contains(&Key::Number(1.0), &Key::Text("B".into())));
        assert!(frequent_pairs(&incidence, 1).is_empty());
    }

    #[test]
    fn test_numeric_order_ids_sort_numerically() {
        let (table, _) = sales(
            "Date,OrderID,Product,Total
2024-01-01,10,A,1
2024-01-01,9,B,1
2024-01-01,,C,1",
        );
        let incidence = IncidenceTable::from_table(&table, 1, 2, 3);
        assert_eq!(
            incidence.orders(),
            &[Key::Number(9.0), Key::Number(10.0)]
        );
        // Row with no order id is ignored
        assert_eq!(incidence.products().len(), 2);
    }

    #[test]
    fn test_no_basket_columns() {
        let (table, schema) = sales("Date,Total\n2024-01-01,1\n");
        assert_eq!(mine(&table, &schema, &BasketConfig::default()), None);
    }
}
