use std::collections::HashMap;

/// Logical contact fields that can be sourced from a sheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CardId,
    CompanyName,
    CardUrl,
    Description,
    Labels,
    Members,
    ListId,
    ListName,
    BoardId,
    BoardName,
    Archived,
    LinkedIn,
    Twitter,
    Website,
    FollowingLinkedInPage,
    ConnectedWithKip,
    ConnectedWithGertie,
    FollowsPage,
    Email,
    Phone,
    FullAddress,
    StreetAddress,
    City,
    State,
    Zipcode,
    TxHouseDistrict,
    HouseRepName,
    TxSenateDistrict,
    SenateRepName,
    WhoRepresentsMeLink,
    TarsecList,
    IsCompany,
    Notes,
    DueDate,
    StartDate,
    LastActivityDate,
    AttachmentCount,
    AttachmentLinks,
    ChecklistTotal,
    ChecklistCompleted,
    VoteCount,
    CommentCount,
}

impl Field {
    pub const ALL: [Field; 42] = [
        Field::CardId,
        Field::CompanyName,
        Field::CardUrl,
        Field::Description,
        Field::Labels,
        Field::Members,
        Field::ListId,
        Field::ListName,
        Field::BoardId,
        Field::BoardName,
        Field::Archived,
        Field::LinkedIn,
        Field::Twitter,
        Field::Website,
        Field::FollowingLinkedInPage,
        Field::ConnectedWithKip,
        Field::ConnectedWithGertie,
        Field::FollowsPage,
        Field::Email,
        Field::Phone,
        Field::FullAddress,
        Field::StreetAddress,
        Field::City,
        Field::State,
        Field::Zipcode,
        Field::TxHouseDistrict,
        Field::HouseRepName,
        Field::TxSenateDistrict,
        Field::SenateRepName,
        Field::WhoRepresentsMeLink,
        Field::TarsecList,
        Field::IsCompany,
        Field::Notes,
        Field::DueDate,
        Field::StartDate,
        Field::LastActivityDate,
        Field::AttachmentCount,
        Field::AttachmentLinks,
        Field::ChecklistTotal,
        Field::ChecklistCompleted,
        Field::VoteCount,
        Field::CommentCount,
    ];

    /// Header text used by the sheet export (matched case-insensitively).
    pub fn default_header(self) -> &'static str {
        match self {
            Field::CardId => "Card ID",
            Field::CompanyName => "Card Name",
            Field::CardUrl => "Card URL",
            Field::Description => "Card Description",
            Field::Labels => "Labels",
            Field::Members => "Members",
            Field::ListId => "List ID",
            Field::ListName => "List Name",
            Field::BoardId => "Board ID",
            Field::BoardName => "Board Name",
            Field::Archived => "Archived",
            Field::LinkedIn => "LinkedIn",
            Field::Twitter => "Twitter",
            Field::Website => "Website",
            Field::FollowingLinkedInPage => "Following TAP LinkedIn?",
            Field::ConnectedWithKip => "Connected with Kip?",
            Field::ConnectedWithGertie => "Connected with Gertie?",
            Field::FollowsPage => "Follows TAP Page?",
            Field::Email => "Email Address",
            Field::Phone => "Phone #",
            Field::FullAddress => "Full Add",
            Field::StreetAddress => "Street Address",
            Field::City => "City",
            Field::State => "State",
            Field::Zipcode => "Zipcode",
            Field::TxHouseDistrict => "TX House District",
            Field::HouseRepName => "House Representative Name",
            Field::TxSenateDistrict => "TX Senate District",
            Field::SenateRepName => "Senate Representative Name",
            Field::WhoRepresentsMeLink => "Who Represents Me? Link",
            Field::TarsecList => "TARSEC List?",
            Field::IsCompany => "Company?",
            Field::Notes => "NOTES",
            Field::DueDate => "Due Date",
            Field::StartDate => "Start Date",
            Field::LastActivityDate => "Last Activity Date",
            Field::AttachmentCount => "Attachment Count",
            Field::AttachmentLinks => "Attachment Links",
            Field::ChecklistTotal => "Checklist Item Total Count",
            Field::ChecklistCompleted => "Checklist Item Completed Count",
            Field::VoteCount => "Vote Count",
            Field::CommentCount => "Comment Count",
        }
    }

    /// Snake-case key used in the `[columns]` config table.
    pub fn key(self) -> &'static str {
        match self {
            Field::CardId => "card_id",
            Field::CompanyName => "company_name",
            Field::CardUrl => "card_url",
            Field::Description => "description",
            Field::Labels => "labels",
            Field::Members => "members",
            Field::ListId => "list_id",
            Field::ListName => "list_name",
            Field::BoardId => "board_id",
            Field::BoardName => "board_name",
            Field::Archived => "archived",
            Field::LinkedIn => "linkedin",
            Field::Twitter => "twitter",
            Field::Website => "website",
            Field::FollowingLinkedInPage => "following_linkedin_page",
            Field::ConnectedWithKip => "connected_with_kip",
            Field::ConnectedWithGertie => "connected_with_gertie",
            Field::FollowsPage => "follows_page",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::FullAddress => "full_address",
            Field::StreetAddress => "street_address",
            Field::City => "city",
            Field::State => "state",
            Field::Zipcode => "zipcode",
            Field::TxHouseDistrict => "tx_house_district",
            Field::HouseRepName => "house_rep_name",
            Field::TxSenateDistrict => "tx_senate_district",
            Field::SenateRepName => "senate_rep_name",
            Field::WhoRepresentsMeLink => "who_represents_me_link",
            Field::TarsecList => "tarsec_list",
            Field::IsCompany => "is_company",
            Field::Notes => "notes",
            Field::DueDate => "due_date",
            Field::StartDate => "start_date",
            Field::LastActivityDate => "last_activity_date",
            Field::AttachmentCount => "attachment_count",
            Field::AttachmentLinks => "attachment_links",
            Field::ChecklistTotal => "checklist_total",
            Field::ChecklistCompleted => "checklist_completed",
            Field::VoteCount => "vote_count",
            Field::CommentCount => "comment_count",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }
}

/// Header strings to look up per logical field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnNames {
    overrides: HashMap<Field, String>,
}

impl ColumnNames {
    pub fn with_override(mut self, field: Field, header: impl Into<String>) -> Self {
        self.overrides.insert(field, header.into());
        self
    }

    pub fn header(&self, field: Field) -> &str {
        self.overrides
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| field.default_header())
    }
}

/// Field-to-column-index table for one header row.
///
/// Resolved once per load so each data row is a direct index lookup.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    indices: HashMap<Field, usize>,
}

impl ColumnMap {
    pub fn resolve(header_row: &[String], names: &ColumnNames) -> Self {
        let normalized: Vec<String> = header_row
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut indices = HashMap::new();
        for field in Field::ALL {
            let wanted = names.header(field).trim().to_lowercase();
            if let Some(idx) = normalized.iter().position(|h| *h == wanted) {
                indices.insert(field, idx);
            }
        }

        Self { indices }
    }

    pub fn contains(&self, field: Field) -> bool {
        self.indices.contains_key(&field)
    }

    /// Trimmed cell for `field`, or "" when the column or cell is missing.
    pub fn get<'r>(&self, row: &'r [String], field: Field) -> &'r str {
        self.indices
            .get(&field)
            .and_then(|&idx| row.get(idx))
            .map(|cell| cell.trim())
            .unwrap_or("")
    }
}
