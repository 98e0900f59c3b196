//! Search and filter evaluation over a loaded contact collection.
//!
//! Filtering is a pure function of the collection and a [`FilterState`]:
//! the free-text query is OR-combined across the searchable fields and
//! AND-combined with every categorical and tri-state filter that is set.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::contact::{split_districts, Contact};

/// Current search and filter selection. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub list_name: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub house_district: Option<String>,
    pub senate_district: Option<String>,
    pub has_linkedin: Option<bool>,
    pub has_website: Option<bool>,
    pub has_twitter: Option<bool>,
}

impl FilterState {
    /// True when nothing besides (possibly) the search query is set.
    pub fn has_no_filters(&self) -> bool {
        self.list_name.is_none()
            && self.state.is_none()
            && self.city.is_none()
            && self.house_district.is_none()
            && self.senate_district.is_none()
            && self.has_linkedin.is_none()
            && self.has_website.is_none()
            && self.has_twitter.is_none()
    }

    /// Filters that are set, as `(label, value)` pairs for display.
    pub fn active(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        let categorical = [
            ("List", &self.list_name),
            ("State", &self.state),
            ("City", &self.city),
            ("House", &self.house_district),
            ("Senate", &self.senate_district),
        ];
        for (label, value) in categorical {
            if let Some(value) = value {
                out.push((label, value.clone()));
            }
        }
        let toggles = [
            ("LinkedIn", self.has_linkedin),
            ("Website", self.has_website),
            ("Twitter", self.has_twitter),
        ];
        for (label, value) in toggles {
            if let Some(value) = value {
                out.push((label, if value { "yes" } else { "no" }.to_string()));
            }
        }
        out
    }
}

/// Contact fields the free-text query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    CompanyName,
    Description,
    Labels,
    Members,
    ListName,
    City,
    State,
    Notes,
    HouseRepName,
    SenateRepName,
    HouseDistrict,
    SenateDistrict,
    Email,
    Website,
}

impl SearchField {
    pub const ALL: [SearchField; 14] = [
        SearchField::CompanyName,
        SearchField::Description,
        SearchField::Labels,
        SearchField::Members,
        SearchField::ListName,
        SearchField::City,
        SearchField::State,
        SearchField::Notes,
        SearchField::HouseRepName,
        SearchField::SenateRepName,
        SearchField::HouseDistrict,
        SearchField::SenateDistrict,
        SearchField::Email,
        SearchField::Website,
    ];

    pub const DEFAULT: [SearchField; 9] = [
        SearchField::CompanyName,
        SearchField::Description,
        SearchField::Labels,
        SearchField::City,
        SearchField::Notes,
        SearchField::HouseRepName,
        SearchField::SenateRepName,
        SearchField::HouseDistrict,
        SearchField::SenateDistrict,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SearchField::CompanyName => "company_name",
            SearchField::Description => "description",
            SearchField::Labels => "labels",
            SearchField::Members => "members",
            SearchField::ListName => "list_name",
            SearchField::City => "city",
            SearchField::State => "state",
            SearchField::Notes => "notes",
            SearchField::HouseRepName => "house_rep_name",
            SearchField::SenateRepName => "senate_rep_name",
            SearchField::HouseDistrict => "house_district",
            SearchField::SenateDistrict => "senate_district",
            SearchField::Email => "email",
            SearchField::Website => "website",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        SearchField::ALL
            .iter()
            .copied()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }

    fn matches(self, contact: &Contact, needle: &str) -> bool {
        let contains = |value: &str| value.to_lowercase().contains(needle);
        match self {
            SearchField::CompanyName => contains(&contact.company_name),
            SearchField::Description => contains(&contact.description),
            SearchField::Labels => contact.labels.iter().any(|l| contains(l)),
            SearchField::Members => contact.members.iter().any(|m| contains(m)),
            SearchField::ListName => contains(&contact.list_name),
            SearchField::City => contains(&contact.city),
            SearchField::State => contains(&contact.state),
            SearchField::Notes => contains(&contact.notes),
            SearchField::HouseRepName => contains(&contact.house_rep_name),
            SearchField::SenateRepName => contains(&contact.senate_rep_name),
            SearchField::HouseDistrict => contains(&contact.tx_house_district),
            SearchField::SenateDistrict => contains(&contact.tx_senate_district),
            SearchField::Email => contains(&contact.email),
            SearchField::Website => contains(&contact.website),
        }
    }
}

/// Filter evaluator with a configurable set of searchable fields.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    fields: Vec<SearchField>,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(SearchField::DEFAULT.to_vec())
    }
}

impl FilterEngine {
    pub fn new(fields: Vec<SearchField>) -> Self {
        Self { fields }
    }

    /// Contacts passing every active predicate, in input order.
    pub fn apply(&self, contacts: &[Contact], filter: &FilterState) -> Vec<Contact> {
        let needle = normalize_query(&filter.search);
        contacts
            .iter()
            .filter(|contact| self.matches(contact, filter, needle.as_deref()))
            .cloned()
            .collect()
    }

    /// Indices of matching contacts, for callers that keep the collection.
    pub fn matching_indices(&self, contacts: &[Contact], filter: &FilterState) -> Vec<usize> {
        let needle = normalize_query(&filter.search);
        contacts
            .iter()
            .enumerate()
            .filter(|(_, contact)| self.matches(contact, filter, needle.as_deref()))
            .map(|(idx, _)| idx)
            .collect()
    }

    fn matches(&self, contact: &Contact, filter: &FilterState, needle: Option<&str>) -> bool {
        if let Some(needle) = needle {
            if !self.fields.iter().any(|field| field.matches(contact, needle)) {
                return false;
            }
        }

        if !equals(&filter.list_name, &contact.list_name)
            || !equals(&filter.state, &contact.state)
            || !equals(&filter.city, &contact.city)
        {
            return false;
        }

        if !in_districts(&filter.house_district, &contact.tx_house_district)
            || !in_districts(&filter.senate_district, &contact.tx_senate_district)
        {
            return false;
        }

        tri_state(filter.has_linkedin, contact.has_linkedin())
            && tri_state(filter.has_website, contact.has_website())
            && tri_state(filter.has_twitter, contact.has_twitter())
    }
}

/// Lowercased query, or `None` when it is empty. Whitespace is kept.
pub fn normalize_query(query: &str) -> Option<String> {
    if query.is_empty() {
        None
    } else {
        Some(query.to_lowercase())
    }
}

fn equals(wanted: &Option<String>, actual: &str) -> bool {
    wanted.as_deref().map_or(true, |wanted| wanted == actual)
}

fn in_districts(wanted: &Option<String>, districts: &str) -> bool {
    match wanted.as_deref() {
        None => true,
        Some(wanted) => {
            let wanted = wanted.trim();
            split_districts(districts).any(|d| d == wanted)
        }
    }
}

fn tri_state(wanted: Option<bool>, actual: bool) -> bool {
    wanted.map_or(true, |wanted| wanted == actual)
}

/// Distinct values available for each categorical filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub house_districts: Vec<String>,
    pub senate_districts: Vec<String>,
    pub cities: Vec<String>,
    pub states: Vec<String>,
    pub list_names: Vec<String>,
}

impl FilterOptions {
    pub fn from_contacts(contacts: &[Contact]) -> Self {
        let mut house = BTreeSet::new();
        let mut senate = BTreeSet::new();
        let mut cities = BTreeSet::new();
        let mut states = BTreeSet::new();
        let mut lists = BTreeSet::new();

        for contact in contacts {
            house.extend(contact.house_districts().map(str::to_string));
            senate.extend(contact.senate_districts().map(str::to_string));
            insert_non_empty(&mut cities, &contact.city);
            insert_non_empty(&mut states, &contact.state);
            insert_non_empty(&mut lists, &contact.list_name);
        }

        Self {
            house_districts: sorted_districts(house),
            senate_districts: sorted_districts(senate),
            cities: cities.into_iter().collect(),
            states: states.into_iter().collect(),
            list_names: lists.into_iter().collect(),
        }
    }
}

fn insert_non_empty(set: &mut BTreeSet<String>, value: &str) {
    if !value.is_empty() {
        set.insert(value.to_string());
    }
}

/// Numeric districts ascending, then anything non-numeric alphabetically.
fn sorted_districts(values: BTreeSet<String>) -> Vec<String> {
    let mut values: Vec<String> = values.into_iter().collect();
    values.sort_by(|a, b| match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    values
}

/// Advance a categorical selection: unset, each option in order, unset again.
pub fn cycle_option(current: Option<&str>, options: &[String], forward: bool) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let position = current.and_then(|value| options.iter().position(|o| o == value));
    let next = match (position, forward) {
        (None, true) => Some(0),
        (None, false) => Some(options.len() - 1),
        (Some(idx), true) if idx + 1 < options.len() => Some(idx + 1),
        (Some(idx), false) if idx > 0 => Some(idx - 1),
        _ => None,
    };
    next.map(|idx| options[idx].clone())
}

/// Unset, required, excluded, unset again.
pub fn cycle_tri_state(current: Option<bool>) -> Option<bool> {
    match current {
        None => Some(true),
        Some(true) => Some(false),
        Some(false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{self, MapOptions};

    fn contact(name: &str) -> Contact {
        Contact {
            id: name.to_lowercase(),
            company_name: name.to_string(),
            list_name: "Contacts".to_string(),
            ..Contact::default()
        }
    }

    fn sample() -> Vec<Contact> {
        vec![
            Contact {
                city: "Austin".to_string(),
                state: "TX".to_string(),
                tx_house_district: "45, 47".to_string(),
                tx_senate_district: "14".to_string(),
                linkedin: "https://linkedin.com/company/acme".to_string(),
                website: "acme.example".to_string(),
                house_rep_name: "Erin Zwiener".to_string(),
                ..contact("Acme Corp")
            },
            Contact {
                city: "Dallas".to_string(),
                state: "TX".to_string(),
                tx_house_district: "112".to_string(),
                tx_senate_district: "16".to_string(),
                linkedin: "no".to_string(),
                twitter: "@globex".to_string(),
                labels: vec!["Energy".to_string(), "Solar".to_string()],
                ..contact("Globex")
            },
            Contact {
                city: "Austin".to_string(),
                state: "TX".to_string(),
                tx_house_district: "4".to_string(),
                notes: "Prefers email; met at AUSTIN expo".to_string(),
                list_name: "Leads".to_string(),
                ..contact("Initech")
            },
            Contact {
                city: "Tulsa".to_string(),
                state: "OK".to_string(),
                description: "Regional distributor".to_string(),
                ..contact("Hooli")
            },
        ]
    }

    fn apply(contacts: &[Contact], filter: &FilterState) -> Vec<Contact> {
        FilterEngine::default().apply(contacts, filter)
    }

    fn names(contacts: &[Contact]) -> Vec<&str> {
        contacts.iter().map(|c| c.company_name.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        let contacts = sample();
        let result = apply(&contacts, &FilterState::default());
        assert_eq!(result, contacts);
    }

    #[test]
    fn search_is_case_insensitive_and_or_combined() {
        let contacts = sample();
        let filter = FilterState {
            search: "austin".to_string(),
            ..FilterState::default()
        };
        // city for Acme/Initech, notes mention it too
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Acme Corp", "Initech"]);

        let filter = FilterState {
            search: "SOLAR".to_string(),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Globex"]);

        let filter = FilterState {
            search: "zwiener".to_string(),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Acme Corp"]);

        let filter = FilterState {
            search: "distributor".to_string(),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Hooli"]);
    }

    #[test]
    fn search_matches_district_numbers() {
        let contacts = sample();
        let filter = FilterState {
            search: "11".to_string(),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Globex"]);
    }

    #[test]
    fn whitespace_in_query_is_significant() {
        let contacts = vec![contact("Acmecorp")];

        let padded = FilterState {
            search: " corp".to_string(),
            ..FilterState::default()
        };
        assert!(apply(&contacts, &padded).is_empty());

        let blank = FilterState {
            search: "   ".to_string(),
            ..FilterState::default()
        };
        assert!(apply(&contacts, &blank).is_empty());

        assert_eq!(apply(&contacts, &FilterState::default()).len(), 1);
    }

    #[test]
    fn normalize_query_only_skips_empty() {
        assert_eq!(normalize_query(""), None);
        assert_eq!(normalize_query("  "), Some("  ".to_string()));
        assert_eq!(normalize_query(" ACME"), Some(" acme".to_string()));
    }

    #[test]
    fn search_respects_configured_fields() {
        let contacts = sample();
        let engine = FilterEngine::new(vec![SearchField::CompanyName]);
        let filter = FilterState {
            search: "austin".to_string(),
            ..FilterState::default()
        };
        assert!(engine.apply(&contacts, &filter).is_empty());
    }

    #[test]
    fn district_filter_uses_membership() {
        let contacts = sample();
        let filter = FilterState {
            house_district: Some("47".to_string()),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Acme Corp"]);

        // "4" must not match "45" or "47"
        let filter = FilterState {
            house_district: Some("4".to_string()),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Initech"]);

        let filter = FilterState {
            senate_district: Some(" 16 ".to_string()),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Globex"]);
    }

    #[test]
    fn acme_scenario_from_sheet() {
        let csv = "Card Name,City,State,TX House District\nAcme Corp,Austin,TX,\"45, 47\"\n";
        let contacts = sheet::parse_contacts(csv, &MapOptions::default());

        let include = FilterState {
            house_district: Some("47".to_string()),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &include)), vec!["Acme Corp"]);

        let exclude = FilterState {
            house_district: Some("12".to_string()),
            ..FilterState::default()
        };
        assert!(apply(&contacts, &exclude).is_empty());
    }

    #[test]
    fn categorical_filters_are_exact_and_combined() {
        let contacts = sample();
        let filter = FilterState {
            city: Some("Austin".to_string()),
            list_name: Some("Leads".to_string()),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Initech"]);

        let filter = FilterState {
            city: Some("austin".to_string()),
            ..FilterState::default()
        };
        assert!(apply(&contacts, &filter).is_empty());

        let filter = FilterState {
            state: Some("OK".to_string()),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Hooli"]);
    }

    #[test]
    fn a_contact_literally_named_all_is_not_special() {
        let contacts = vec![Contact {
            city: "All".to_string(),
            ..contact("Allied")
        }];
        let filter = FilterState {
            city: Some("All".to_string()),
            ..FilterState::default()
        };
        assert_eq!(apply(&contacts, &filter).len(), 1);
    }

    #[test]
    fn tri_state_platform_filters() {
        let contacts = sample();
        let filter = FilterState {
            has_linkedin: Some(true),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Acme Corp"]);

        let filter = FilterState {
            has_linkedin: Some(false),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Globex", "Initech", "Hooli"]);

        let filter = FilterState {
            has_twitter: Some(true),
            has_website: Some(false),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&contacts, &filter)), vec!["Globex"]);
    }

    #[test]
    fn applying_twice_changes_nothing() {
        let contacts = sample();
        let filters = [
            FilterState::default(),
            FilterState {
                search: "a".to_string(),
                state: Some("TX".to_string()),
                ..FilterState::default()
            },
            FilterState {
                has_linkedin: Some(false),
                house_district: Some("4".to_string()),
                ..FilterState::default()
            },
        ];
        for filter in &filters {
            let once = apply(&contacts, filter);
            assert_eq!(apply(&once, filter), once);
            assert_eq!(apply(&contacts, filter), once);
        }
    }

    #[test]
    fn adding_a_query_never_grows_the_result() {
        let contacts = sample();
        let bases = [
            FilterState::default(),
            FilterState {
                state: Some("TX".to_string()),
                ..FilterState::default()
            },
        ];
        for base in &bases {
            let without = apply(&contacts, base).len();
            for query in ["a", "austin", "1", "zzz", "Corp"] {
                let with = FilterState {
                    search: query.to_string(),
                    ..base.clone()
                };
                assert!(apply(&contacts, &with).len() <= without, "query {query:?}");
            }
        }
    }

    #[test]
    fn matching_indices_line_up_with_apply() {
        let contacts = sample();
        let filter = FilterState {
            city: Some("Austin".to_string()),
            ..FilterState::default()
        };
        let engine = FilterEngine::default();
        let indices = engine.matching_indices(&contacts, &filter);
        assert_eq!(indices, vec![0, 2]);
        let picked: Vec<Contact> = indices.iter().map(|&i| contacts[i].clone()).collect();
        assert_eq!(picked, engine.apply(&contacts, &filter));
    }

    #[test]
    fn options_are_distinct_and_sorted() {
        let mut contacts = sample();
        contacts.push(Contact {
            tx_house_district: "47, 9, at-large".to_string(),
            city: "Austin".to_string(),
            ..contact("Umbrella")
        });
        let options = FilterOptions::from_contacts(&contacts);
        assert_eq!(options.house_districts, vec!["4", "9", "45", "47", "112", "at-large"]);
        assert_eq!(options.senate_districts, vec!["14", "16"]);
        assert_eq!(options.cities, vec!["Austin", "Dallas", "Tulsa"]);
        assert_eq!(options.states, vec!["OK", "TX"]);
        assert_eq!(options.list_names, vec!["Contacts", "Leads"]);
    }

    #[test]
    fn cycle_option_wraps_through_unset() {
        let options = vec!["a".to_string(), "b".to_string()];
        assert_eq!(cycle_option(None, &options, true), Some("a".to_string()));
        assert_eq!(cycle_option(Some("a"), &options, true), Some("b".to_string()));
        assert_eq!(cycle_option(Some("b"), &options, true), None);
        assert_eq!(cycle_option(None, &options, false), Some("b".to_string()));
        assert_eq!(cycle_option(Some("a"), &options, false), None);
        // stale selection restarts the cycle
        assert_eq!(cycle_option(Some("gone"), &options, true), Some("a".to_string()));
        assert_eq!(cycle_option(Some("a"), &[], true), None);
    }

    #[test]
    fn cycle_tri_state_order() {
        assert_eq!(cycle_tri_state(None), Some(true));
        assert_eq!(cycle_tri_state(Some(true)), Some(false));
        assert_eq!(cycle_tri_state(Some(false)), None);
    }

    #[test]
    fn active_filters_describe_selection() {
        let filter = FilterState {
            city: Some("Austin".to_string()),
            has_website: Some(false),
            ..FilterState::default()
        };
        assert_eq!(
            filter.active(),
            vec![("City", "Austin".to_string()), ("Website", "no".to_string())]
        );
        assert!(!filter.has_no_filters());
        assert!(FilterState::default().has_no_filters());
    }
}
