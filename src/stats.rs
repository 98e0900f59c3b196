use std::collections::HashSet;

use serde::Serialize;

use crate::contact::Contact;

/// Summary counters shown above the directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub companies: usize,
    pub house_districts: usize,
    pub senate_districts: usize,
    pub cities: usize,
    pub tarsec_list: usize,
}

impl Stats {
    pub fn from_contacts(contacts: &[Contact]) -> Self {
        let house: HashSet<&str> = contacts.iter().flat_map(|c| c.house_districts()).collect();
        let senate: HashSet<&str> = contacts.iter().flat_map(|c| c.senate_districts()).collect();
        let cities: HashSet<&str> = contacts
            .iter()
            .map(|c| c.city.as_str())
            .filter(|city| !city.is_empty())
            .collect();

        Self {
            companies: contacts.len(),
            house_districts: house.len(),
            senate_districts: senate.len(),
            cities: cities.len(),
            tarsec_list: contacts.iter().filter(|c| c.tarsec_list).count(),
        }
    }

    pub fn entries(&self) -> [(&'static str, usize); 5] {
        [
            ("Companies", self.companies),
            ("House Districts", self.house_districts),
            ("Senate Districts", self.senate_districts),
            ("Cities", self.cities),
            ("TARSEC List", self.tarsec_list),
        ]
    }
}
