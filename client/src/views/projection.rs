//! Filter/sort projection of the bill list
//!
//! Pure functions; the raw list is never modified.

use crate::api::{Bill, SortField};

/// Whether `bill` matches an already lower-cased search term
pub fn matches_search(bill: &Bill, needle: &str) -> bool {
    needle.is_empty()
        || bill.name.to_lowercase().contains(needle)
        || bill.category.label().to_lowercase().contains(needle)
}

/// Sort by `sort` (stable) and keep bills whose name or category contains
/// `search`, ignoring case.
pub fn project(bills: &[Bill], search: &str, sort: SortField) -> Vec<Bill> {
    let mut ordered: Vec<&Bill> = bills.iter().collect();

    match sort {
        SortField::Amount => ordered.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
        SortField::DueDate => ordered.sort_by_key(|bill| bill.due_date),
    }

    let needle = search.to_lowercase();
    ordered
        .into_iter()
        .filter(|bill| matches_search(bill, &needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Category;
    use chrono::NaiveDate;

    fn bill(id: &str, name: &str, amount: f64, due: &str, category: Category) -> Bill {
        Bill {
            id: id.to_string(),
            name: name.to_string(),
            amount,
            due_date: NaiveDate::parse_from_str(due, "%Y-%m-%d").unwrap(),
            category,
            notes: None,
            is_recurring: false,
            paid: false,
        }
    }

    fn sample() -> Vec<Bill> {
        vec![
            bill("1", "Electric", 90.0, "2024-03-10", Category::Utilities),
            bill("2", "Rent", 1200.0, "2024-03-01", Category::RentMortgage),
            bill("3", "Water", 40.0, "2024-03-10", Category::Utilities),
            bill("4", "Netflix", 15.5, "2024-03-05", Category::Subscription),
            bill("5", "Car loan", 90.0, "2024-02-28", Category::Loan),
            bill("6", "Dentist", 40.0, "2024-03-01", Category::Medical),
        ]
    }

    fn ids(bills: &[Bill]) -> Vec<&str> {
        bills.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_sort_by_amount_is_stable() {
        let projected = project(&sample(), "", SortField::Amount);
        assert!(projected.windows(2).all(|w| w[0].amount <= w[1].amount));
        // equal amounts keep input order
        assert_eq!(ids(&projected), vec!["4", "3", "6", "1", "5", "2"]);
    }

    #[test]
    fn test_sort_by_due_date_is_stable() {
        let projected = project(&sample(), "", SortField::DueDate);
        assert!(projected.windows(2).all(|w| w[0].due_date <= w[1].due_date));
        assert_eq!(ids(&projected), vec!["5", "2", "6", "4", "1", "3"]);
    }

    #[test]
    fn test_filter_is_sound_and_complete() {
        let bills = sample();
        for term in ["", "e", "UTIL", "loan", "rent/", "zzz", "ri"] {
            let projected = project(&bills, term, SortField::DueDate);
            let needle = term.to_lowercase();
            for b in &bills {
                let expected = b.name.to_lowercase().contains(&needle)
                    || b.category.label().to_lowercase().contains(&needle);
                let present = projected.iter().filter(|p| p.id == b.id).count();
                assert_eq!(present, usize::from(expected), "term {:?}, bill {}", term, b.name);
            }
        }
    }

    #[test]
    fn test_util_matches_electric_and_water_for_any_sort() {
        for sort in [SortField::Amount, SortField::DueDate] {
            let projected = project(&sample(), "util", sort);
            let names: Vec<&str> = projected.iter().map(|b| b.name.as_str()).collect();
            assert_eq!(projected.len(), 2);
            assert!(names.contains(&"Electric"));
            assert!(names.contains(&"Water"));
        }
    }

    #[test]
    fn test_projection_is_deterministic_and_pure() {
        let bills = sample();
        let before = bills.clone();
        let first = project(&bills, "e", SortField::Amount);
        let second = project(&bills, "e", SortField::Amount);
        assert_eq!(first, second);
        assert_eq!(bills, before);
    }
}
