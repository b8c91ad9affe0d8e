//! Column-name driven values backed by `fake`.

use chrono::NaiveDate;
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, CountryName, StreetName, ZipCode};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{DomainSuffix, SafeEmail, Username};
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use rand::Rng;
use relseed_core::Column;

use crate::generators::primitives::{temporal_value, truncate};
use crate::value::SeedValue;

/// Recognized column-name patterns, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePattern {
    Email,
    Phone,
    FirstName,
    LastName,
    Username,
    Company,
    City,
    Country,
    Address,
    PostalCode,
    Url,
    Title,
    Description,
    FullName,
    RecentMoment,
}

impl NamePattern {
    pub fn detect(column: &Column) -> Option<Self> {
        let name = column.name.to_ascii_lowercase();

        if column.column_type.temporal_kind().is_some() {
            let recent = name.ends_with("_at")
                || name.ends_with("_on")
                || name.ends_with("_date")
                || name.starts_with("created")
                || name.starts_with("updated");
            return recent.then_some(Self::RecentMoment);
        }
        if !is_textual(column) {
            return None;
        }

        let pattern = if name.contains("email") {
            Self::Email
        } else if name.contains("phone") || name.contains("mobile") {
            Self::Phone
        } else if matches!(name.as_str(), "first_name" | "firstname" | "given_name") {
            Self::FirstName
        } else if matches!(
            name.as_str(),
            "last_name" | "lastname" | "surname" | "family_name"
        ) {
            Self::LastName
        } else if matches!(name.as_str(), "username" | "user_name" | "login") {
            Self::Username
        } else if name.contains("company") || name.contains("organization") {
            Self::Company
        } else if name == "city" || name.ends_with("_city") {
            Self::City
        } else if name == "country" || name.ends_with("_country") {
            Self::Country
        } else if name.contains("address") || name.contains("street") {
            Self::Address
        } else if name.contains("zip") || name.contains("postal") {
            Self::PostalCode
        } else if name.contains("url") || name.contains("website") {
            Self::Url
        } else if name == "title" || name.ends_with("_title") {
            Self::Title
        } else if matches!(
            name.as_str(),
            "description" | "bio" | "notes" | "comment" | "summary"
        ) {
            Self::Description
        } else if name == "name" || name.ends_with("_name") {
            Self::FullName
        } else {
            return None;
        };
        Some(pattern)
    }

    pub fn generate<R: Rng>(self, column: &Column, base_date: NaiveDate, rng: &mut R) -> SeedValue {
        let text: String = match self {
            Self::RecentMoment => {
                let Some(kind) = column.column_type.temporal_kind() else {
                    return SeedValue::Null;
                };
                // Two years leading up to the base date.
                let start = base_date - chrono::Duration::days(730);
                return temporal_value(kind, start, 730, rng);
            }
            Self::Email => SafeEmail().fake_with_rng(rng),
            Self::Phone => PhoneNumber().fake_with_rng(rng),
            Self::FirstName => FirstName().fake_with_rng(rng),
            Self::LastName => LastName().fake_with_rng(rng),
            Self::Username => Username().fake_with_rng(rng),
            Self::Company => CompanyName().fake_with_rng(rng),
            Self::City => CityName().fake_with_rng(rng),
            Self::Country => CountryName().fake_with_rng(rng),
            Self::Address => {
                let number: String = BuildingNumber().fake_with_rng(rng);
                let street: String = StreetName().fake_with_rng(rng);
                format!("{number} {street}")
            }
            Self::PostalCode => ZipCode().fake_with_rng(rng),
            Self::Url => {
                let word: String = Word().fake_with_rng(rng);
                let suffix: String = DomainSuffix().fake_with_rng(rng);
                format!("https://{word}.{suffix}")
            }
            Self::Title => {
                let sentence: String = Sentence(2..5).fake_with_rng(rng);
                sentence.trim_end_matches('.').to_string()
            }
            Self::Description => Paragraph(1..3).fake_with_rng(rng),
            Self::FullName => Name().fake_with_rng(rng),
        };
        SeedValue::Text(truncate(text, column.max_length))
    }
}

fn is_textual(column: &Column) -> bool {
    matches!(
        column.column_type.native_type.as_str(),
        "text"
            | "character varying"
            | "varchar"
            | "character"
            | "char"
            | "citext"
            | "tinytext"
            | "mediumtext"
            | "longtext"
    )
}
