//! Derived, read-only views over the entity store.
//!
//! Everything here is pull-based: callers ask for a view and it is computed from
//! the current collections on the spot. Nothing is cached and nothing mutates.

use crate::{
    core::store::EntityStore,
    models::{
        Record, SalaryRecord, SiteDocument, SiteEmployee, SiteMaterial, SiteTask, TaskStatus,
        Transaction,
    },
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Usage of one material across all transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsage {
    /// Material name, exactly as entered
    pub material_name: String,
    /// Sum of quantities
    pub total_quantity: f64,
    /// Sum of amounts
    pub total_cost: f64,
    /// `total_cost / total_quantity`, or 0 when the quantity is 0
    pub average_cost: f64,
}

/// Sum of every transaction amount. Empty store → 0.
#[must_use]
pub fn total_cost(store: &EntityStore) -> f64 {
    store.transactions.iter().map(|t| t.amount).sum()
}

/// Cost per unit, guarded against a zero quantity.
#[must_use]
pub fn average_cost(total_cost: f64, total_quantity: f64) -> f64 {
    if total_quantity == 0.0 {
        return 0.0;
    }

    total_cost / total_quantity
}

/// Groups transactions by exact (case-sensitive) material name.
///
/// Entries appear in the order each name first occurs.
#[must_use]
pub fn material_usage(store: &EntityStore) -> Vec<MaterialUsage> {
    let mut usage: Vec<MaterialUsage> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for transaction in &store.transactions {
        let slot = *index
            .entry(transaction.material_name.as_str())
            .or_insert_with(|| {
                usage.push(MaterialUsage {
                    material_name: transaction.material_name.clone(),
                    total_quantity: 0.0,
                    total_cost: 0.0,
                    average_cost: 0.0,
                });
                usage.len() - 1
            });

        let entry = &mut usage[slot];
        entry.total_quantity += transaction.quantity;
        entry.total_cost += transaction.amount;
    }

    for entry in &mut usage {
        entry.average_cost = average_cost(entry.total_cost, entry.total_quantity);
    }
    usage
}

/// Spend on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    /// Transaction date
    pub date: NaiveDate,
    /// Sum of amounts on that date
    pub total_cost: f64,
    /// Number of transactions on that date
    pub transactions: usize,
}

/// Transactions grouped by date, oldest first.
#[must_use]
pub fn daily_totals(store: &EntityStore) -> Vec<DailyTotal> {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for transaction in &store.transactions {
        let day = by_date.entry(transaction.date).or_insert((0.0, 0));
        day.0 += transaction.amount;
        day.1 += 1;
    }

    by_date
        .into_iter()
        .map(|(date, (total_cost, transactions))| DailyTotal {
            date,
            total_cost,
            transactions,
        })
        .collect()
}

/// Deliveries logged for one site.
#[must_use]
pub fn site_materials<'a>(store: &'a EntityStore, site_id: &str) -> Vec<&'a Record<SiteMaterial>> {
    store
        .site_materials
        .iter()
        .filter(|r| r.site_id == site_id)
        .collect()
}

/// Employees assigned to one site.
#[must_use]
pub fn site_employees<'a>(store: &'a EntityStore, site_id: &str) -> Vec<&'a Record<SiteEmployee>> {
    store
        .site_employees
        .iter()
        .filter(|r| r.site_id == site_id)
        .collect()
}

/// Tasks belonging to one site.
#[must_use]
pub fn site_tasks<'a>(store: &'a EntityStore, site_id: &str) -> Vec<&'a Record<SiteTask>> {
    store
        .site_tasks
        .iter()
        .filter(|r| r.site_id == site_id)
        .collect()
}

/// Documents linked to one site.
#[must_use]
pub fn site_documents<'a>(store: &'a EntityStore, site_id: &str) -> Vec<&'a Record<SiteDocument>> {
    store
        .site_documents
        .iter()
        .filter(|r| r.site_id == site_id)
        .collect()
}

/// Counts of everything attached to one site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteOverview {
    /// Site id the counts refer to
    pub site_id: String,
    /// Assigned employees
    pub employees: usize,
    /// Logged deliveries
    pub deliveries: usize,
    /// Sum of delivered quantities
    pub delivered_quantity: f64,
    /// Linked documents
    pub documents: usize,
    /// Task count per status; every status is present, possibly with 0
    pub tasks_by_status: BTreeMap<TaskStatus, usize>,
}

impl SiteOverview {
    /// Tasks of any status.
    #[must_use]
    pub fn total_tasks(&self) -> usize {
        self.tasks_by_status.values().sum()
    }
}

/// Builds the [`SiteOverview`] for `site_id`. Unknown ids give all-zero counts.
#[must_use]
pub fn site_overview(store: &EntityStore, site_id: &str) -> SiteOverview {
    let deliveries = site_materials(store, site_id);
    let mut tasks_by_status: BTreeMap<TaskStatus, usize> = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ]
    .into_iter()
    .map(|status| (status, 0))
    .collect();
    for task in site_tasks(store, site_id) {
        *tasks_by_status.entry(task.status).or_insert(0) += 1;
    }

    SiteOverview {
        site_id: site_id.to_string(),
        employees: site_employees(store, site_id).len(),
        deliveries: deliveries.len(),
        delivered_quantity: deliveries.iter().map(|d| d.quantity).sum(),
        documents: site_documents(store, site_id).len(),
        tasks_by_status,
    }
}

/// Criteria for [`filter_transactions`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Case-insensitive substring of the material name
    pub material: Option<String>,
    /// Earliest date, inclusive
    pub from: Option<NaiveDate>,
    /// Latest date, inclusive
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    /// True when `transaction` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(needle) = &self.material
            && !transaction
                .material_name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        {
            return false;
        }
        if self.from.is_some_and(|from| transaction.date < from) {
            return false;
        }
        !self.to.is_some_and(|to| transaction.date > to)
    }
}

/// Transactions matching `filter`, in insertion order.
#[must_use]
pub fn filter_transactions<'a>(
    store: &'a EntityStore,
    filter: &TransactionFilter,
) -> Vec<&'a Record<Transaction>> {
    store
        .transactions
        .iter()
        .filter(|r| filter.matches(&r.data))
        .collect()
}

/// Field to sort transactions by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Purchase date
    Date,
    /// Amount paid
    Amount,
    /// Quantity bought
    Quantity,
    /// Material name, case-insensitive
    MaterialName,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// Stable sort; ties keep their current relative order.
pub fn sort_transactions(records: &mut [&Record<Transaction>], key: SortKey, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Amount => a.amount.total_cmp(&b.amount),
            SortKey::Quantity => a.quantity.total_cmp(&b.quantity),
            SortKey::MaterialName => a
                .material_name
                .to_lowercase()
                .cmp(&b.material_name.to_lowercase()),
        };
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

fn same_name(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

/// Salary records whose `employeeName` equals `name`, ignoring case.
///
/// Matching is by name only: records made before an employee was renamed are
/// not found under the new name.
#[must_use]
pub fn salary_records_for<'a>(store: &'a EntityStore, name: &str) -> Vec<&'a Record<SalaryRecord>> {
    store
        .salary_records
        .iter()
        .filter(|r| same_name(&r.employee_name, name))
        .collect()
}

/// Total paid to `name`, matched like [`salary_records_for`].
#[must_use]
pub fn total_salary_paid(store: &EntityStore, name: &str) -> f64 {
    salary_records_for(store, name)
        .iter()
        .map(|r| r.salary_paid)
        .sum()
}

/// Salary records of the employee with `employee_id`.
///
/// Returns `None` when the id does not resolve. Names must match exactly
/// (after trimming), so a record typed with different casing is not attributed.
#[cfg(feature = "strict-salary-links")]
#[must_use]
pub fn salary_records_for_employee<'a>(
    store: &'a EntityStore,
    employee_id: &str,
) -> Option<Vec<&'a Record<SalaryRecord>>> {
    let employee = store.employees.iter().find(|e| e.id == employee_id)?;
    let name = employee.name.trim();
    Some(
        store
            .salary_records
            .iter()
            .filter(|r| r.employee_name.trim() == name)
            .collect(),
    )
}

/// Orders material usage by total cost, highest first.
pub fn sort_usage_by_cost(usage: &mut [MaterialUsage]) {
    usage.sort_by(|a, b| b.total_cost.total_cmp(&a.total_cost));
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{date, salary_record, site, site_material, site_task, transaction};
    use proptest::prelude::*;

    fn transaction_on(name: &str, amount: f64, quantity: f64, day: u32) -> Transaction {
        let mut t = transaction(name, amount, quantity);
        t.date = date(2024, 3, day);
        t
    }

    #[test]
    fn test_empty_store_views() {
        let store = EntityStore::new();
        assert_eq!(total_cost(&store), 0.0);
        assert!(material_usage(&store).is_empty());
        assert!(daily_totals(&store).is_empty());
    }

    #[test]
    fn test_copper_wire_usage() {
        let mut store = EntityStore::new();
        store.add(transaction("Copper Wire", 500.0, 10.0)).unwrap();
        store.add(transaction("Copper Wire", 300.0, 5.0)).unwrap();

        let usage = material_usage(&store);

        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].material_name, "Copper Wire");
        assert_eq!(usage[0].total_quantity, 15.0);
        assert_eq!(usage[0].total_cost, 800.0);
        assert!((usage[0].average_cost - 53.333_333).abs() < 1e-5);
        assert_eq!(total_cost(&store), 800.0);
    }

    #[test]
    fn test_usage_is_case_sensitive_and_keeps_first_occurrence_order() {
        let mut store = EntityStore::new();
        store.add(transaction("Switch", 15.0, 3.0)).unwrap();
        store.add(transaction("Breaker", 900.0, 9.0)).unwrap();
        store.add(transaction("switch", 5.0, 1.0)).unwrap();
        store.add(transaction("Switch", 10.0, 2.0)).unwrap();

        let usage = material_usage(&store);
        let names: Vec<&str> = usage.iter().map(|u| u.material_name.as_str()).collect();

        assert_eq!(names, vec!["Switch", "Breaker", "switch"]);
        assert_eq!(usage[0].total_cost, 25.0);
        assert_eq!(usage[0].total_quantity, 5.0);
    }

    #[test]
    fn test_average_cost_zero_quantity_guard() {
        assert_eq!(average_cost(100.0, 0.0), 0.0);
        assert_eq!(average_cost(100.0, 4.0), 25.0);
    }

    #[test]
    fn test_sort_usage_by_cost() {
        let mut store = EntityStore::new();
        store.add(transaction("Switch", 15.0, 3.0)).unwrap();
        store.add(transaction("Breaker", 900.0, 9.0)).unwrap();
        let mut usage = material_usage(&store);

        sort_usage_by_cost(&mut usage);
        assert_eq!(usage[0].material_name, "Breaker");
    }

    #[test]
    fn test_daily_totals_grouped_and_sorted() {
        let mut store = EntityStore::new();
        store.add(transaction_on("Switch", 15.0, 3.0, 9)).unwrap();
        store.add(transaction_on("Breaker", 40.0, 1.0, 2)).unwrap();
        store.add(transaction_on("Conduit", 25.0, 5.0, 9)).unwrap();

        let days = daily_totals(&store);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date(2024, 3, 2));
        assert_eq!(days[0].total_cost, 40.0);
        assert_eq!(days[1].date, date(2024, 3, 9));
        assert_eq!(days[1].total_cost, 40.0);
        assert_eq!(days[1].transactions, 2);
    }

    #[test]
    fn test_site_scoped_views_filter_by_site_id() {
        let mut store = EntityStore::new();
        let north = store.add(site("North")).unwrap();
        let south = store.add(site("South")).unwrap();
        store.add(site_material(&north.id, "Conduit", 20.0)).unwrap();
        store.add(site_material(&north.id, "Cable", 5.0)).unwrap();
        store.add(site_material(&south.id, "Conduit", 7.0)).unwrap();
        let mut task = site_task(&north.id, "Pull cable");
        task.status = TaskStatus::InProgress;
        store.add(task).unwrap();
        store.add(site_task(&north.id, "Mount panel")).unwrap();

        assert_eq!(site_materials(&store, &north.id).len(), 2);
        assert_eq!(site_materials(&store, &south.id).len(), 1);
        assert_eq!(site_tasks(&store, &south.id).len(), 0);

        let overview = site_overview(&store, &north.id);
        assert_eq!(overview.deliveries, 2);
        assert_eq!(overview.delivered_quantity, 25.0);
        assert_eq!(overview.total_tasks(), 2);
        assert_eq!(overview.tasks_by_status[&TaskStatus::InProgress], 1);
        assert_eq!(overview.tasks_by_status[&TaskStatus::Pending], 1);
        assert_eq!(overview.tasks_by_status[&TaskStatus::Completed], 0);
    }

    #[test]
    fn test_filter_and_sort_transactions() {
        let mut store = EntityStore::new();
        store.add(transaction_on("Copper Wire", 500.0, 10.0, 1)).unwrap();
        store.add(transaction_on("Breaker", 40.0, 1.0, 5)).unwrap();
        store.add(transaction_on("copper lugs", 12.0, 4.0, 20)).unwrap();

        let copper = TransactionFilter {
            material: Some("COPPER".to_string()),
            ..TransactionFilter::default()
        };
        assert_eq!(filter_transactions(&store, &copper).len(), 2);

        let early_march = TransactionFilter {
            from: Some(date(2024, 3, 1)),
            to: Some(date(2024, 3, 5)),
            ..TransactionFilter::default()
        };
        let mut matched = filter_transactions(&store, &early_march);
        assert_eq!(matched.len(), 2);

        sort_transactions(&mut matched, SortKey::Amount, SortOrder::Ascending);
        assert_eq!(matched[0].material_name, "Breaker");

        let mut all = filter_transactions(&store, &TransactionFilter::default());
        sort_transactions(&mut all, SortKey::Date, SortOrder::Descending);
        assert_eq!(all[0].material_name, "copper lugs");
        sort_transactions(&mut all, SortKey::MaterialName, SortOrder::Ascending);
        assert_eq!(all[0].material_name, "Breaker");
        assert_eq!(all[1].material_name, "copper lugs");
        assert_eq!(all[2].material_name, "Copper Wire");
    }

    #[test]
    fn test_salary_lookup_ignores_case() {
        let mut store = EntityStore::new();
        store.add(salary_record("Ana Lima", 1200.0)).unwrap();
        store.add(salary_record("ANA LIMA", 300.0)).unwrap();
        store.add(salary_record("Bo", 800.0)).unwrap();

        assert_eq!(salary_records_for(&store, "ana lima").len(), 2);
        assert_eq!(total_salary_paid(&store, "Ana Lima"), 1500.0);
        assert_eq!(total_salary_paid(&store, "Nobody"), 0.0);
    }

    #[test]
    fn test_renamed_employee_loses_salary_history() {
        let mut store = EntityStore::new();
        let mut worker = store.add(crate::test_utils::employee("Ana Lima")).unwrap();
        store.add(salary_record("Ana Lima", 1200.0)).unwrap();

        worker.data.name = "Ana Souza".to_string();
        store.update(worker.clone()).unwrap();

        assert!(salary_records_for(&store, &worker.name).is_empty());
    }

    #[cfg(feature = "strict-salary-links")]
    #[test]
    fn test_strict_salary_lookup_resolves_by_id() {
        let mut store = EntityStore::new();
        let worker = store.add(crate::test_utils::employee("Ana Lima")).unwrap();
        store.add(salary_record("Ana Lima", 1200.0)).unwrap();
        store.add(salary_record("ana lima", 300.0)).unwrap();

        assert_eq!(salary_records_for_employee(&store, &worker.id).unwrap().len(), 1);
        assert!(salary_records_for_employee(&store, "unknown").is_none());
    }

    fn whole_number_transactions() -> impl Strategy<Value = Vec<(usize, u32, u32)>> {
        prop::collection::vec((0usize..4, 1u32..10_000, 1u32..500), 0..40)
    }

    const NAMES: [&str; 4] = ["Copper Wire", "Conduit", "Breaker", "Switch"];

    proptest! {
        #[test]
        fn prop_total_cost_is_order_independent(rows in whole_number_transactions()) {
            let mut forward = EntityStore::new();
            let mut backward = EntityStore::new();
            for &(name, amount, quantity) in &rows {
                forward.add(transaction(NAMES[name], f64::from(amount), f64::from(quantity))).unwrap();
            }
            for &(name, amount, quantity) in rows.iter().rev() {
                backward.add(transaction(NAMES[name], f64::from(amount), f64::from(quantity))).unwrap();
            }

            let expected: f64 = rows.iter().map(|&(_, amount, _)| f64::from(amount)).sum();
            prop_assert_eq!(total_cost(&forward), expected);
            prop_assert_eq!(total_cost(&backward), expected);
        }

        #[test]
        fn prop_usage_sums_per_material(rows in whole_number_transactions()) {
            let mut store = EntityStore::new();
            for &(name, amount, quantity) in &rows {
                store.add(transaction(NAMES[name], f64::from(amount), f64::from(quantity))).unwrap();
            }

            let usage = material_usage(&store);
            for entry in &usage {
                let group: Vec<_> = rows
                    .iter()
                    .filter(|&&(name, _, _)| NAMES[name] == entry.material_name)
                    .collect();
                let quantity: f64 = group.iter().map(|&&(_, _, q)| f64::from(q)).sum();
                let cost: f64 = group.iter().map(|&&(_, a, _)| f64::from(a)).sum();

                prop_assert_eq!(entry.total_quantity, quantity);
                prop_assert_eq!(entry.total_cost, cost);
                prop_assert_eq!(entry.average_cost, cost / quantity);
            }
            let distinct: std::collections::HashSet<usize> = rows.iter().map(|r| r.0).collect();
            prop_assert_eq!(usage.len(), distinct.len());
        }
    }
}
