use crate::contact::Contact;

/// A labelled value in the detail modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub title: &'static str,
    pub fields: Vec<DetailField>,
}

fn push(fields: &mut Vec<DetailField>, label: &'static str, value: impl Into<String>) {
    let value = value.into();
    if !value.trim().is_empty() {
        fields.push(DetailField { label, value });
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Sections shown for one contact. Empty values are left out, and so are
/// sections with nothing in them.
pub fn sections(contact: &Contact) -> Vec<DetailSection> {
    let mut overview = Vec::new();
    push(&mut overview, "List", contact.list_name.as_str());
    push(&mut overview, "Board", contact.board_name.as_str());
    push(&mut overview, "Description", contact.description.as_str());
    push(&mut overview, "Labels", contact.labels.join(", "));
    push(&mut overview, "Members", contact.members.join(", "));
    push(&mut overview, "Notes", contact.notes.as_str());
    push(&mut overview, "Card", contact.card_url.as_str());
    if contact.archived {
        push(&mut overview, "Archived", "yes");
    }

    let mut reach = Vec::new();
    push(&mut reach, "Email", contact.email.as_str());
    push(&mut reach, "Phone", contact.phone.as_str());
    push(&mut reach, "Website", contact.website.as_str());
    push(&mut reach, "LinkedIn", contact.linkedin_url().unwrap_or(""));
    push(&mut reach, "Twitter", contact.twitter.as_str());

    let mut location = Vec::new();
    let address = if contact.full_address.is_empty() {
        contact.street_address.as_str()
    } else {
        contact.full_address.as_str()
    };
    push(&mut location, "Address", address);
    push(&mut location, "City", contact.city.as_str());
    push(&mut location, "State", contact.state.as_str());
    push(&mut location, "Zipcode", contact.zipcode.as_str());

    let mut legislative = Vec::new();
    push(&mut legislative, "House District", contact.tx_house_district.as_str());
    push(&mut legislative, "House Rep", contact.house_rep_name.as_str());
    push(&mut legislative, "Senate District", contact.tx_senate_district.as_str());
    push(&mut legislative, "Senate Rep", contact.senate_rep_name.as_str());
    push(&mut legislative, "Who Represents Me", contact.who_represents_me_link.as_str());

    let mut relationship = vec![
        DetailField {
            label: "TARSEC List",
            value: yes_no(contact.tarsec_list).to_string(),
        },
        DetailField {
            label: "Company",
            value: yes_no(contact.is_company).to_string(),
        },
    ];
    let flags = [
        ("Follows LinkedIn", contact.following_linkedin_page),
        ("Kip Connected", contact.connected_with_kip),
        ("Gertie Connected", contact.connected_with_gertie),
        ("Follows Page", contact.follows_page),
    ];
    for (label, set) in flags {
        if set {
            push(&mut relationship, label, "yes");
        }
    }

    let mut activity = Vec::new();
    push(&mut activity, "Start", contact.start_date.as_str());
    push(&mut activity, "Due", contact.due_date.as_str());
    push(&mut activity, "Last Activity", contact.last_activity_date.as_str());
    if contact.checklist_total > 0 {
        push(
            &mut activity,
            "Checklist",
            format!("{}/{}", contact.checklist_completed, contact.checklist_total),
        );
    }
    let counters = [
        ("Attachments", contact.attachment_count),
        ("Votes", contact.vote_count),
        ("Comments", contact.comment_count),
    ];
    for (label, count) in counters {
        if count > 0 {
            push(&mut activity, label, count.to_string());
        }
    }
    push(&mut activity, "Attachment Links", contact.attachment_links.as_str());

    [
        ("OVERVIEW", overview),
        ("REACH", reach),
        ("LOCATION", location),
        ("LEGISLATIVE", legislative),
        ("RELATIONSHIP", relationship),
        ("ACTIVITY", activity),
    ]
    .into_iter()
    .filter(|(_, fields)| !fields.is_empty())
    .map(|(title, fields)| DetailSection { title, fields })
    .collect()
}

/// All fields across sections, in display order.
pub fn flatten(sections: &[DetailSection]) -> Vec<&DetailField> {
    sections.iter().flat_map(|s| s.fields.iter()).collect()
}
