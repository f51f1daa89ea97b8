//! Property-based tests for filter composition and page navigation

use proptest::prelude::*;
use sales_console::domain::resource::{FilterField, Resource};
use sales_console::domain::types::{PageNumber, PageSize};
use sales_console::pipeline::{FilterSet, Page};

pub mod generators {
    use super::*;
    use proptest::collection::vec;
    use proptest::sample::select;
    use proptest::string::string_regex;

    pub fn field() -> impl Strategy<Value = FilterField> {
        select(FilterField::ALL.to_vec())
    }

    /// Raw input: blank, whitespace-only, or text padded with whitespace
    pub fn raw_value() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            string_regex("[ \t\n]{1,6}").unwrap(),
            string_regex("[ ]{0,3}[a-zA-Z0-9áéíóúñ@.,&=+ -]{1,30}[ ]{0,3}").unwrap(),
        ]
    }

    pub fn entries() -> impl Strategy<Value = Vec<(FilterField, String)>> {
        vec((field(), raw_value()), 0..12)
    }

    /// Long pasted input, well past any form field width
    pub fn long_value() -> impl Strategy<Value = String> {
        string_regex("[ ]{0,3}[a-zA-Z0-9ñ]{400,2000}[ ]{0,3}").unwrap()
    }
}

proptest! {
    #[test]
    fn prop_composed_set_has_no_blank_values(entries in generators::entries()) {
        let set = FilterSet::compose(entries.clone());
        for (field, value) in set.iter() {
            prop_assert!(!value.as_ref().trim().is_empty());
            prop_assert_eq!(value.as_ref(), value.as_ref().trim());
            prop_assert!(entries.iter().any(|(f, raw)| *f == field && raw.trim() == value.as_ref()));
        }
    }

    #[test]
    fn prop_long_values_survive_composition(field in generators::field(), raw in generators::long_value()) {
        let set = FilterSet::compose([(field, raw.as_str())]);
        prop_assert_eq!(set.len(), 1);
        prop_assert_eq!(set.get(field).unwrap().as_ref(), raw.trim());

        let query = set.to_query(Resource::Sales, None).unwrap();
        let expected = format!("{}={}", field.param(), urlencoding::encode(raw.trim()));
        prop_assert_eq!(query, expected);
    }

    #[test]
    fn prop_blank_inputs_never_survive(fields in proptest::collection::vec(generators::field(), 0..8)) {
        let set = FilterSet::compose(fields.into_iter().map(|f| (f, "   ")));
        prop_assert!(set.is_empty());
        prop_assert_eq!(set, FilterSet::empty());
    }

    #[test]
    fn prop_query_has_one_pair_per_accepted_field(entries in generators::entries(), page in 1u32..500) {
        let set = FilterSet::compose(entries);
        let page = PageNumber::try_new(page).unwrap();
        let query = set.to_query(Resource::Sales, Some(page)).unwrap();

        let pairs: Vec<&str> = query.split('&').collect();
        prop_assert_eq!(pairs.len(), set.len() + 1);
        let expected_page = format!("page={page}");
        prop_assert_eq!(pairs[0], expected_page.as_str());
    }

    #[test]
    fn prop_customers_query_only_carries_client_search(entries in generators::entries()) {
        let set = FilterSet::compose(entries);
        let query = set.to_query(Resource::Customers, None).unwrap_or_default();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            prop_assert!(pair.starts_with("client_search="));
        }
    }

    #[test]
    fn prop_navigation_flags_match_page_bounds(
        total in 0u64..10_000,
        size in 1u32..100,
        current in 1u32..200,
    ) {
        let page: Page<()> = Page::new(
            Vec::new(),
            total,
            PageNumber::try_new(current).unwrap(),
            PageSize::try_new(size).unwrap(),
        );
        let total_pages = page.total_pages();

        prop_assert_eq!(u64::from(total_pages), total.div_ceil(u64::from(size)));
        prop_assert_eq!(page.has_next(), current < total_pages);
        prop_assert_eq!(page.has_previous(), current > 1);
        prop_assert!(page.display_total_pages() >= 1);
        if total == 0 {
            prop_assert!(!page.has_next());
        }
    }
}
