use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Category a document is filed under.
///
/// Categories are a fixed vocabulary: two of them are personal (visible only
/// when browsing the owning member) and two are shared household categories
/// that every member's view includes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Category {
    /// IDs, passports, licences and similar per-person paperwork.
    #[serde(rename = "Personal Documents")]
    PersonalDocuments,
    /// Degrees, transcripts, course certificates.
    #[serde(rename = "Academic Certificates")]
    AcademicCertificates,
    /// Records that belong to the household as a whole.
    #[serde(rename = "Family Records")]
    FamilyRecords,
    /// Utility bills, receipts, everything else.
    #[serde(rename = "Bills and Other")]
    BillsAndOther,
}

impl Category {
    /// All recognised category values.
    pub const ALL: &'static [Category] = &[
        Self::PersonalDocuments,
        Self::AcademicCertificates,
        Self::FamilyRecords,
        Self::BillsAndOther,
    ];

    /// Categories visible to every member regardless of who the document
    /// is filed under.
    pub const SHARED: &'static [Category] = &[Self::FamilyRecords, Self::BillsAndOther];

    /// Returns true if this category is visible to all members.
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::FamilyRecords | Self::BillsAndOther)
    }

    /// Returns the display string stored in the catalog.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonalDocuments => "Personal Documents",
            Self::AcademicCertificates => "Academic Certificates",
            Self::FamilyRecords => "Family Records",
            Self::BillsAndOther => "Bills and Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid category string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError {
    invalid: String,
}

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid category '{}'. Valid values: {}",
            self.invalid,
            Category::ALL
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Personal Documents" => Ok(Self::PersonalDocuments),
            "Academic Certificates" => Ok(Self::AcademicCertificates),
            "Family Records" => Ok(Self::FamilyRecords),
            "Bills and Other" => Ok(Self::BillsAndOther),
            _ => Err(ParseCategoryError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Parse a category field from a request, mapping failure to a validation error.
pub fn parse_category(s: &str) -> Result<Category, AppError> {
    s.trim()
        .parse::<Category>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

/// Validate a trimmed title (1-256 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title must be 1-256 characters".into(),
        ));
    }
    Ok(())
}

/// Validate a trimmed member name (1-64 Unicode characters).
pub fn validate_member_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 64 {
        return Err(AppError::Validation(
            "Member name must be 1-64 characters".into(),
        ));
    }
    Ok(())
}
