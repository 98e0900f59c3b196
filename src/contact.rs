use serde::Serialize;

/// One company/person mapped from a spreadsheet row.
///
/// Built once per load by the row mapper and never mutated afterwards.
/// `company_name` is always non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: String,
    pub company_name: String,
    pub card_url: String,
    pub description: String,
    pub labels: Vec<String>,
    pub members: Vec<String>,

    pub list_id: String,
    pub list_name: String,
    pub board_id: String,
    pub board_name: String,
    pub archived: bool,

    pub linkedin: String,
    pub twitter: String,
    pub website: String,

    pub following_linkedin_page: bool,
    pub connected_with_kip: bool,
    pub connected_with_gertie: bool,
    pub follows_page: bool,

    pub email: String,
    pub phone: String,

    pub full_address: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,

    pub tx_house_district: String,
    pub house_rep_name: String,
    pub tx_senate_district: String,
    pub senate_rep_name: String,
    pub who_represents_me_link: String,

    pub tarsec_list: bool,
    pub is_company: bool,
    pub notes: String,

    pub due_date: String,
    pub start_date: String,
    pub last_activity_date: String,

    pub attachment_count: u32,
    pub attachment_links: String,
    pub checklist_total: u32,
    pub checklist_completed: u32,
    pub vote_count: u32,
    pub comment_count: u32,
}

impl Contact {
    /// LinkedIn cells often hold a literal "no" instead of being left blank.
    pub fn has_linkedin(&self) -> bool {
        self.linkedin_url().is_some()
    }

    pub fn linkedin_url(&self) -> Option<&str> {
        let value = self.linkedin.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("no") {
            None
        } else {
            Some(value)
        }
    }

    pub fn has_website(&self) -> bool {
        !self.website.trim().is_empty()
    }

    pub fn has_twitter(&self) -> bool {
        !self.twitter.trim().is_empty()
    }

    pub fn house_districts(&self) -> impl Iterator<Item = &str> {
        split_districts(&self.tx_house_district)
    }

    pub fn senate_districts(&self) -> impl Iterator<Item = &str> {
        split_districts(&self.tx_senate_district)
    }

    /// City and state joined for one-line display, skipping empty parts.
    pub fn locality(&self) -> String {
        match (self.city.is_empty(), self.state.is_empty()) {
            (false, false) => format!("{}, {}", self.city, self.state),
            (false, true) => self.city.clone(),
            (true, false) => self.state.clone(),
            (true, true) => String::new(),
        }
    }
}

/// District cells may list several districts, e.g. "45, 47".
pub fn split_districts(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linkedin_no_counts_as_absent() {
        let mut contact = Contact::default();
        assert!(!contact.has_linkedin());

        contact.linkedin = "No".to_string();
        assert!(!contact.has_linkedin());

        contact.linkedin = "https://linkedin.com/company/acme".to_string();
        assert!(contact.has_linkedin());
        assert_eq!(contact.linkedin_url(), Some("https://linkedin.com/company/acme"));
    }

    #[test]
    fn website_and_twitter_are_presence_checks() {
        let mut contact = Contact {
            twitter: "no".to_string(),
            ..Contact::default()
        };
        assert!(contact.has_twitter());
        assert!(!contact.has_website());

        contact.website = "acme.example".to_string();
        assert!(contact.has_website());
    }

    #[test]
    fn districts_split_on_commas() {
        let contact = Contact {
            tx_house_district: " 45, 47 ,,".to_string(),
            ..Contact::default()
        };
        let districts: Vec<&str> = contact.house_districts().collect();
        assert_eq!(districts, vec!["45", "47"]);
        assert_eq!(contact.senate_districts().count(), 0);
    }

    #[test]
    fn locality_joins_present_parts() {
        let mut contact = Contact {
            city: "Austin".to_string(),
            state: "TX".to_string(),
            ..Contact::default()
        };
        assert_eq!(contact.locality(), "Austin, TX");
        contact.city.clear();
        assert_eq!(contact.locality(), "TX");
    }
}
