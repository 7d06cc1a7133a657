//! Positional heuristics for Turkish driver licenses.
//!
//! The OCR engine returns the card as plain text, one printed row per line.
//! On the front the holder rows start at line 2:
//!
//! ```text
//! 1. YILMAZ
//! 2. ADA
//! 3. 01.02.1990 ISTANBUL
//! 4a.05.06.2015
//! 4b.05.06.2025 4c. 12345678901
//! ```
//!
//! The back carries the blood group as the second word of its first line.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LicenseParseError {
    #[error("could not read the {0} from the driver license image")]
    MissingField(&'static str),
    #[error("could not read a valid {0} from the driver license image")]
    BadDate(&'static str),
    #[error("unrecognised blood group {0:?}")]
    BadBloodGroup(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontSide {
    pub first_name: String,
    pub last_name: String,
    pub born_date: NaiveDate,
    pub born_place: String,
    pub drivers_license_date: NaiveDate,
    pub licence_validity_period: NaiveDate,
    pub identity_number: String,
}

const FRONT_FIRST_LINE: usize = 2;
const FRONT_LINES: usize = 5;

pub fn parse_front(text: &str) -> Result<FrontSide, LicenseParseError> {
    let rows: Vec<Vec<&str>> = text
        .lines()
        .skip(FRONT_FIRST_LINE)
        .take(FRONT_LINES)
        .map(|l| l.split_whitespace().collect())
        .collect();

    let word = |row: usize, col: usize, name: &'static str| {
        rows.get(row)
            .and_then(|r| r.get(col))
            .copied()
            .ok_or(LicenseParseError::MissingField(name))
    };
    // Rows 4a/4b glue the item number to the date ("4a.05.06.2015").
    let tagged = |row: usize, name: &'static str| {
        word(row, 0, name).and_then(|w| w.get(3..).ok_or(LicenseParseError::MissingField(name)))
    };

    Ok(FrontSide {
        last_name: word(0, 1, "last name")?.to_lowercase(),
        first_name: word(1, 1, "first name")?.to_lowercase(),
        born_date: parse_date(word(2, 1, "born date")?, "born date")?,
        born_place: word(2, 2, "born place")?.to_lowercase(),
        drivers_license_date: parse_date(tagged(3, "license date")?, "license date")?,
        licence_validity_period: parse_date(tagged(4, "validity date")?, "validity date")?,
        identity_number: word(4, 2, "identity number")?.to_string(),
    })
}

pub fn parse_back(text: &str) -> Result<String, LicenseParseError> {
    let token = text
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .ok_or(LicenseParseError::MissingField("blood group"))?;
    normalize_blood_group(token)
}

/// Turns OCR tokens such as `0Rh+`, `ORh-` or `ABRH+` into `0 rh+`, `ab rh-`.
pub fn normalize_blood_group(raw: &str) -> Result<String, LicenseParseError> {
    let upper = raw.trim().to_uppercase();
    let bad = || LicenseParseError::BadBloodGroup(raw.to_string());

    let rh_at = upper.find("RH").ok_or_else(bad)?;
    let group = match upper[..rh_at].trim() {
        "0" | "O" => "0",
        "A" => "a",
        "B" => "b",
        "AB" => "ab",
        _ => return Err(bad()),
    };
    let sign = match upper[rh_at + 2..].trim() {
        "+" => '+',
        "-" => '-',
        _ => return Err(bad()),
    };
    Ok(format!("{group} rh{sign}"))
}

fn parse_date(raw: &str, name: &'static str) -> Result<NaiveDate, LicenseParseError> {
    let cleaned = raw.trim_matches(|c: char| !c.is_ascii_digit());
    ["%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
        .ok_or(LicenseParseError::BadDate(name))
}
