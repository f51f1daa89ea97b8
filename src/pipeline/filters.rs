//! Filter composition
//!
//! Users type into a fixed set of filter inputs, most of which stay blank.
//! [`FilterSet`] is the canonical form handed to the fetcher and the export
//! dispatcher: it only ever holds fields with a non-blank value.

pub use crate::domain::resource::FilterField;
use crate::domain::resource::{Resource, PAGE_PARAM};
use crate::domain::types::{FilterValue, PageNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw filter inputs exactly as the user typed them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDraft {
    pub client_search: String,
    pub product_search: String,
    #[serde(rename = "fecha_inicio")]
    pub date_from: String,
    #[serde(rename = "fecha_fin")]
    pub date_to: String,
    #[serde(rename = "monto_min")]
    pub amount_min: String,
    #[serde(rename = "monto_max")]
    pub amount_max: String,
}

impl FilterDraft {
    fn entries(&self) -> [(FilterField, &str); 6] {
        [
            (FilterField::ClientSearch, self.client_search.as_str()),
            (FilterField::ProductSearch, self.product_search.as_str()),
            (FilterField::DateFrom, self.date_from.as_str()),
            (FilterField::DateTo, self.date_to.as_str()),
            (FilterField::AmountMin, self.amount_min.as_str()),
            (FilterField::AmountMax, self.amount_max.as_str()),
        ]
    }

    /// Set one input by field
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let slot = match field {
            FilterField::ClientSearch => &mut self.client_search,
            FilterField::ProductSearch => &mut self.product_search,
            FilterField::DateFrom => &mut self.date_from,
            FilterField::DateTo => &mut self.date_to,
            FilterField::AmountMin => &mut self.amount_min,
            FilterField::AmountMax => &mut self.amount_max,
        };
        *slot = value.into();
    }

    /// Blank every input
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn compose(&self) -> FilterSet {
        FilterSet::compose(self.entries())
    }
}

/// Canonical, blank-stripped filter criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet(BTreeMap<FilterField, FilterValue>);

impl FilterSet {
    /// The empty set: no constraint
    pub fn empty() -> Self {
        Self::default()
    }

    /// Keep only the fields whose value is non-blank after trimming
    ///
    /// When a field appears more than once, its last non-blank value wins.
    pub fn compose<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (FilterField, S)>,
        S: AsRef<str>,
    {
        Self(
            fields
                .into_iter()
                .filter_map(|(field, raw)| {
                    FilterValue::try_new(raw.as_ref().to_string())
                        .ok()
                        .map(|value| (field, value))
                })
                .collect(),
        )
    }

    pub fn get(&self, field: FilterField) -> Option<&FilterValue> {
        self.0.get(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &FilterValue)> {
        self.0.iter().map(|(field, value)| (*field, value))
    }

    /// Query parameters for a call against `resource`
    ///
    /// The page parameter, when given, comes first; filter parameters follow
    /// in field order. Fields the resource does not accept are left out.
    pub fn query_pairs(
        &self,
        resource: Resource,
        page: Option<PageNumber>,
    ) -> Vec<(&'static str, String)> {
        page.map(|p| (PAGE_PARAM, p.to_string()))
            .into_iter()
            .chain(
                self.iter()
                    .filter(|(field, _)| resource.accepts(*field))
                    .map(|(field, value)| (field.param(), value.to_string())),
            )
            .collect()
    }

    /// URL-encoded query string, or `None` when there is nothing to send
    pub fn to_query(&self, resource: Resource, page: Option<PageNumber>) -> Option<String> {
        let pairs = self.query_pairs(resource, page);
        if pairs.is_empty() {
            return None;
        }
        Some(
            pairs
                .iter()
                .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
                .collect::<Vec<_>>()
                .join("&"),
        )
    }
}

impl<S: AsRef<str>> FromIterator<(FilterField, S)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (FilterField, S)>>(iter: I) -> Self {
        Self::compose(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_drops_blank_values() {
        let set = FilterSet::compose([
            (FilterField::ClientSearch, "  ana "),
            (FilterField::ProductSearch, ""),
            (FilterField::DateFrom, "   "),
            (FilterField::AmountMin, "100"),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(FilterField::ClientSearch).unwrap().as_ref(), "ana");
        assert!(set.get(FilterField::ProductSearch).is_none());
        assert!(set.get(FilterField::DateFrom).is_none());
    }

    #[test]
    fn test_compose_of_nothing_is_empty() {
        let set = FilterSet::compose(Vec::<(FilterField, String)>::new());
        assert_eq!(set, FilterSet::empty());
        assert!(FilterDraft::default().compose().is_empty());
    }

    #[test]
    fn test_draft_compose_and_clear() {
        let mut draft = FilterDraft::default();
        draft.set(FilterField::DateFrom, "2024-01-01");
        draft.set(FilterField::AmountMax, " ");
        let set = draft.compose();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(FilterField::DateFrom).unwrap().as_ref(), "2024-01-01");

        draft.clear();
        assert_eq!(draft, FilterDraft::default());
    }

    #[test]
    fn test_draft_deserializes_backend_names() {
        let draft: FilterDraft =
            serde_json::from_str(r#"{"fecha_inicio": "2024-01-01", "monto_min": "5"}"#).unwrap();
        assert_eq!(draft.date_from, "2024-01-01");
        assert_eq!(draft.amount_min, "5");
        assert!(draft.client_search.is_empty());
    }

    #[test]
    fn test_query_includes_page_and_encodes_values() {
        let set = FilterSet::compose([(FilterField::ClientSearch, "ana maría")]);
        let query = set
            .to_query(Resource::Sales, Some(PageNumber::try_new(2).unwrap()))
            .unwrap();
        assert_eq!(query, "page=2&client_search=ana%20mar%C3%ADa");
    }

    #[test]
    fn test_query_skips_fields_resource_does_not_accept() {
        let set = FilterSet::compose([
            (FilterField::ClientSearch, "ana"),
            (FilterField::AmountMin, "10"),
        ]);
        assert_eq!(
            set.to_query(Resource::Customers, Some(PageNumber::first())),
            Some("page=1&client_search=ana".to_string())
        );
    }

    #[test]
    fn test_long_values_are_kept_whole() {
        let long = "a".repeat(501);
        let huge = format!("  {}  ", "ñ".repeat(5_000));
        let set = FilterSet::compose([
            (FilterField::ClientSearch, long.as_str()),
            (FilterField::ProductSearch, huge.as_str()),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(FilterField::ClientSearch).unwrap().as_ref(), long);
        assert_eq!(
            set.get(FilterField::ProductSearch).unwrap().as_ref().chars().count(),
            5_000
        );

        let query = set.to_query(Resource::Sales, None).unwrap();
        assert!(query.starts_with(&format!("client_search={long}&product_search=")));
    }

    #[test]
    fn test_empty_set_without_page_has_no_query() {
        assert_eq!(FilterSet::empty().to_query(Resource::ReportExport, None), None);
    }

    #[test]
    fn test_last_non_blank_value_wins() {
        let set: FilterSet = [
            (FilterField::ClientSearch, "ana"),
            (FilterField::ClientSearch, ""),
            (FilterField::ClientSearch, "bea"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.get(FilterField::ClientSearch).unwrap().as_ref(), "bea");
    }
}
