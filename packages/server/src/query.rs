use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};

use crate::entity::document;
use crate::models::shared::Category;

/// Sentinel member value meaning "no member filter".
pub const ALL_DOCUMENTS: &str = "All Documents";

/// Normalized filter for browsing the catalog.
#[derive(Debug, Default)]
pub struct DocumentFilter {
    pub member_name: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl DocumentFilter {
    /// Builds a filter from raw query parameters.
    ///
    /// Blank values and the `All Documents` sentinel are dropped, so they
    /// behave the same as omitting the parameter.
    pub fn from_params(
        member_name: Option<String>,
        category: Option<String>,
        search: Option<String>,
    ) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            member_name: clean(member_name).filter(|m| m != ALL_DOCUMENTS),
            category: clean(category),
            search: clean(search),
        }
    }
}

/// Condition selecting the documents visible when browsing a single member:
/// documents filed under that member, plus every document in a shared
/// household category regardless of who it is filed under.
pub fn visibility_condition(member_name: &str) -> Condition {
    let shared: Vec<&str> = Category::SHARED.iter().map(|c| c.as_str()).collect();
    Condition::any()
        .add(document::Column::MemberName.eq(member_name))
        .add(document::Column::Category.is_in(shared))
}

/// Case-insensitive token search over a document's descriptive fields.
///
/// The search string is split on whitespace; every token must appear as a
/// substring of the title, category or member name for the document to match.
pub fn matches_search(doc: &document::Model, search: &str) -> bool {
    let haystack = format!("{} {} {}", doc.title, doc.category, doc.member_name).to_lowercase();
    search
        .split_whitespace()
        .all(|token| haystack.contains(&token.to_lowercase()))
}

/// Lists catalog entries matching the filter, newest first.
///
/// Member and category constraints are pushed into the SQL query; free-text
/// search runs over the fetched rows. An unknown category simply matches
/// nothing rather than erroring.
pub async fn list_documents(
    db: &DatabaseConnection,
    filter: &DocumentFilter,
) -> Result<Vec<document::Model>, DbErr> {
    let mut select = document::Entity::find();

    if let Some(ref member) = filter.member_name {
        select = select.filter(visibility_condition(member));
    }

    if let Some(ref category) = filter.category {
        select = select.filter(document::Column::Category.eq(category.as_str()));
    }

    let mut rows = select
        .order_by_desc(document::Column::CreatedAt)
        .order_by_desc(document::Column::Id)
        .all(db)
        .await?;

    if let Some(ref search) = filter.search {
        rows.retain(|doc| matches_search(doc, search));
    }

    Ok(rows)
}
