use std::collections::HashSet;

use tracing::debug;

use super::columns::{ColumnMap, ColumnNames, Field};
use crate::contact::Contact;

pub const DEFAULT_LIST_NAME: &str = "Contacts";

/// Knobs for turning sheet rows into contacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapOptions {
    pub columns: ColumnNames,
    /// Used when a row has no list name.
    pub default_list_name: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            default_list_name: DEFAULT_LIST_NAME.to_string(),
        }
    }
}

/// "yes", "true" and "1" (any case) are true; everything else is false.
pub fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "yes" || lower == "true" || lower == "1"
}

/// Base-10 count; anything unparseable is 0.
pub fn parse_count(value: &str) -> u32 {
    value.trim().parse::<u32>().unwrap_or(0)
}

/// Comma-separated cell into trimmed, non-empty pieces in order.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Map one data row. Returns `None` when the company name is blank.
///
/// `position` is the row's index among kept rows and seeds the surrogate id
/// for rows without a Card ID.
pub fn map_row(
    columns: &ColumnMap,
    row: &[String],
    position: usize,
    options: &MapOptions,
) -> Option<Contact> {
    let text = |field: Field| columns.get(row, field).to_string();
    let flag = |field: Field| parse_bool(columns.get(row, field));
    let count = |field: Field| parse_count(columns.get(row, field));

    let company_name = text(Field::CompanyName);
    if company_name.is_empty() {
        return None;
    }

    let id = match columns.get(row, Field::CardId) {
        "" => format!("contact-{position}"),
        explicit => explicit.to_string(),
    };

    let list_name = match columns.get(row, Field::ListName) {
        "" => options.default_list_name.clone(),
        name => name.to_string(),
    };

    Some(Contact {
        id,
        company_name,
        card_url: text(Field::CardUrl),
        description: text(Field::Description),
        labels: parse_list(columns.get(row, Field::Labels)),
        members: parse_list(columns.get(row, Field::Members)),

        list_id: text(Field::ListId),
        list_name,
        board_id: text(Field::BoardId),
        board_name: text(Field::BoardName),
        archived: flag(Field::Archived),

        linkedin: text(Field::LinkedIn),
        twitter: text(Field::Twitter),
        website: text(Field::Website),

        following_linkedin_page: flag(Field::FollowingLinkedInPage),
        connected_with_kip: flag(Field::ConnectedWithKip),
        connected_with_gertie: flag(Field::ConnectedWithGertie),
        follows_page: flag(Field::FollowsPage),

        email: text(Field::Email),
        phone: text(Field::Phone),

        full_address: text(Field::FullAddress),
        street_address: text(Field::StreetAddress),
        city: text(Field::City),
        state: text(Field::State),
        zipcode: text(Field::Zipcode),

        tx_house_district: text(Field::TxHouseDistrict),
        house_rep_name: text(Field::HouseRepName),
        tx_senate_district: text(Field::TxSenateDistrict),
        senate_rep_name: text(Field::SenateRepName),
        who_represents_me_link: text(Field::WhoRepresentsMeLink),

        tarsec_list: flag(Field::TarsecList),
        is_company: flag(Field::IsCompany),
        notes: text(Field::Notes),

        due_date: text(Field::DueDate),
        start_date: text(Field::StartDate),
        last_activity_date: text(Field::LastActivityDate),

        attachment_count: count(Field::AttachmentCount),
        attachment_links: text(Field::AttachmentLinks),
        checklist_total: count(Field::ChecklistTotal),
        checklist_completed: count(Field::ChecklistCompleted),
        vote_count: count(Field::VoteCount),
        comment_count: count(Field::CommentCount),
    })
}

/// Map every data row, dropping rows without a company name.
///
/// Ids are unique within the returned batch.
pub fn map_all(header: &[String], rows: &[Vec<String>], options: &MapOptions) -> Vec<Contact> {
    let columns = ColumnMap::resolve(header, &options.columns);
    if !columns.contains(Field::CompanyName) {
        debug!(
            header = options.columns.header(Field::CompanyName),
            "company name column not found; every row will be dropped"
        );
    }

    let mut contacts: Vec<Contact> = Vec::with_capacity(rows.len());
    let mut seen_ids: HashSet<String> = HashSet::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        let Some(mut contact) = map_row(&columns, row, contacts.len(), options) else {
            dropped += 1;
            continue;
        };
        contact.id = unique_id(contact.id, &mut seen_ids);
        contacts.push(contact);
    }

    if dropped > 0 {
        debug!(dropped, kept = contacts.len(), "skipped rows without a company name");
    }

    contacts
}

fn unique_id(candidate: String, seen: &mut HashSet<String>) -> String {
    if seen.insert(candidate.clone()) {
        return candidate;
    }
    let mut suffix = 2usize;
    loop {
        let next = format!("{candidate}-{suffix}");
        if seen.insert(next.clone()) {
            return next;
        }
        suffix += 1;
    }
}
