//! Field validation for student records.
//!
//! Each field has its own validator. Validators are independent of one
//! another; [`validate_record`] runs all four and collects every failure
//! rather than stopping at the first.

use std::{fmt, sync::LazyLock};

use nonempty::NonEmpty;
use regex::Regex;

use crate::domain::{RecordId, StudentDraft, StudentRecord};

const MIN_NAME_LEN: usize = 2;
const MIN_STUDENT_ID_LEN: usize = 3;
const MIN_CONTACT_LEN: usize = 10;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// A user-editable field of a student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// The student's name.
    Name,
    /// The student number.
    StudentId,
    /// The email address.
    Email,
    /// The contact number.
    Contact,
}

impl Field {
    /// All fields, in form order.
    pub const ALL: [Self; 4] = [Self::Name, Self::StudentId, Self::Email, Self::Contact];

    /// The label shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::StudentId => "Student ID",
            Self::Email => "Email",
            Self::Contact => "Contact number",
        }
    }

    const fn length_unit(self) -> &'static str {
        match self {
            Self::Name | Self::Email => "characters",
            Self::StudentId | Self::Contact => "digits",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a single field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// The field was left empty.
    #[error("{0} is required")]
    Required(Field),

    /// The field is shorter than its minimum length.
    #[error("{field} must be at least {min} {unit} long", unit = .field.length_unit())]
    TooShort {
        /// The offending field.
        field: Field,
        /// The minimum accepted length.
        min: usize,
    },

    /// The name contains something other than letters and spaces.
    #[error("Name can only contain letters and spaces")]
    LettersAndSpacesOnly,

    /// A numeric field contains a non-digit character.
    #[error("{0} can only contain numbers")]
    DigitsOnly(Field),

    /// The email address does not look like `local@domain.tld`.
    #[error("Please enter a valid email address")]
    InvalidEmail,

    /// Another record already uses this student ID.
    #[error("Student ID already exists")]
    DuplicateStudentId,
}

impl FieldError {
    /// The field this error belongs to.
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::Required(field) | Self::DigitsOnly(field) | Self::TooShort { field, .. } => {
                *field
            }
            Self::LettersAndSpacesOnly => Field::Name,
            Self::InvalidEmail => Field::Email,
            Self::DuplicateStudentId => Field::StudentId,
        }
    }
}

/// Which uniqueness contract a student ID is checked under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueCheck {
    /// The ID is for a new record, so it must not match any existing record.
    New,
    /// The ID belongs to the record at this position, which is excluded from
    /// the comparison so a record never conflicts with itself.
    Edit(usize),
}

impl UniqueCheck {
    const fn excludes(self, index: usize) -> bool {
        match self {
            Self::New => false,
            Self::Edit(excluded) => excluded == index,
        }
    }
}

/// Validates a student's name.
///
/// # Errors
///
/// Fails if the name is empty, shorter than two characters, or contains
/// anything other than letters and spaces.
pub fn validate_name(name: &str) -> Result<(), FieldError> {
    if name.is_empty() {
        return Err(FieldError::Required(Field::Name));
    }
    // Length is counted in UTF-16 code units.
    if name.encode_utf16().count() < MIN_NAME_LEN {
        return Err(FieldError::TooShort {
            field: Field::Name,
            min: MIN_NAME_LEN,
        });
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        return Err(FieldError::LettersAndSpacesOnly);
    }
    Ok(())
}

/// Validates a student ID against the format rules and the existing records.
///
/// # Errors
///
/// Fails if the ID is empty, contains a non-digit, is shorter than three
/// digits, or is already used by a record that `check` does not exclude.
pub fn validate_student_id(
    student_id: &str,
    records: &[StudentRecord],
    check: UniqueCheck,
) -> Result<(), FieldError> {
    validate_digits(Field::StudentId, student_id, MIN_STUDENT_ID_LEN)?;

    let taken = records
        .iter()
        .enumerate()
        .any(|(index, record)| !check.excludes(index) && record.student_id == student_id);
    if taken {
        return Err(FieldError::DuplicateStudentId);
    }
    Ok(())
}

/// Validates an email address.
///
/// # Errors
///
/// Fails if the address is empty or is not shaped like `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.is_empty() {
        return Err(FieldError::Required(Field::Email));
    }
    if !EMAIL.is_match(email) {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

/// Validates a contact number.
///
/// # Errors
///
/// Fails if the number is empty, contains a non-digit, or is shorter than ten
/// digits.
pub fn validate_contact(contact: &str) -> Result<(), FieldError> {
    validate_digits(Field::Contact, contact, MIN_CONTACT_LEN)
}

fn validate_digits(field: Field, value: &str, min: usize) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::Required(field));
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::DigitsOnly(field));
    }
    if value.len() < min {
        return Err(FieldError::TooShort { field, min });
    }
    Ok(())
}

/// Every field failure for a single draft, in form order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct ValidationErrors(NonEmpty<FieldError>);

impl ValidationErrors {
    /// Iterates over the failures.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// The failure for the given field, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.iter().find(|error| error.field() == field)
    }

    /// The number of fields that failed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; there is at least one failure.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(NonEmpty::new(error))
    }
}

/// Runs all four validators against a draft.
///
/// # Errors
///
/// Returns every failing field, not just the first.
pub fn validate_record(
    draft: &StudentDraft,
    records: &[StudentRecord],
    check: UniqueCheck,
) -> Result<(), ValidationErrors> {
    let failures: Vec<FieldError> = [
        validate_name(&draft.name),
        validate_student_id(&draft.student_id, records, check),
        validate_email(&draft.email),
        validate_contact(&draft.contact),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect();

    NonEmpty::from_vec(failures).map_or(Ok(()), |failures| Err(ValidationErrors(failures)))
}

/// A stored record that no longer passes validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRecord {
    /// Position of the record in the list.
    pub index: usize,
    /// Synthetic id of the record.
    pub id: RecordId,
    /// What is wrong with it.
    pub errors: ValidationErrors,
}

/// Re-validates every stored record, each against all the others.
///
/// Records normally pass validation on the way in, so this only finds
/// problems in data that was modified outside the registry.
#[must_use]
pub fn audit(records: &[StudentRecord]) -> Vec<InvalidRecord> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            validate_record(&StudentDraft::from(record), records, UniqueCheck::Edit(index))
                .err()
                .map(|errors| InvalidRecord {
                    index,
                    id: record.id(),
                    errors,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn record(id: u64, student_id: &str) -> StudentRecord {
        StudentRecord::new(
            RecordId::new(id),
            StudentDraft::new("Ada Lovelace", student_id, "ada@example.com", "0123456789"),
        )
    }

    #[test_case("Jo"; "minimum length")]
    #[test_case("John Smith"; "with space")]
    #[test_case("Mary Ann Evans"; "several words")]
    fn valid_names(name: &str) {
        assert_eq!(validate_name(name), Ok(()));
    }

    #[test_case("", FieldError::Required(Field::Name); "empty")]
    #[test_case("J", FieldError::TooShort { field: Field::Name, min: 2 }; "single letter")]
    #[test_case("R2D2", FieldError::LettersAndSpacesOnly; "digits")]
    #[test_case("O'Brien", FieldError::LettersAndSpacesOnly; "apostrophe")]
    #[test_case("Anne-Marie", FieldError::LettersAndSpacesOnly; "hyphen")]
    #[test_case("𝐀", FieldError::LettersAndSpacesOnly; "astral letter")]
    #[test_case("é", FieldError::TooShort { field: Field::Name, min: 2 }; "accented letter")]
    fn invalid_names(name: &str, expected: FieldError) {
        assert_eq!(validate_name(name), Err(expected));
    }

    #[test_case("a@b.co"; "short")]
    #[test_case("first.last@mail.example.org"; "subdomains")]
    fn valid_emails(email: &str) {
        assert_eq!(validate_email(email), Ok(()));
    }

    #[test_case("", FieldError::Required(Field::Email); "empty")]
    #[test_case("a@b", FieldError::InvalidEmail; "no tld")]
    #[test_case("ab.co", FieldError::InvalidEmail; "no at")]
    #[test_case("a b@c.de", FieldError::InvalidEmail; "whitespace")]
    #[test_case("a@@b.co", FieldError::InvalidEmail; "double at")]
    fn invalid_emails(email: &str, expected: FieldError) {
        assert_eq!(validate_email(email), Err(expected));
    }

    #[test_case("0123456789"; "exactly ten")]
    #[test_case("441234567890"; "longer")]
    fn valid_contacts(contact: &str) {
        assert_eq!(validate_contact(contact), Ok(()));
    }

    #[test_case("", FieldError::Required(Field::Contact); "empty")]
    #[test_case("012345678", FieldError::TooShort { field: Field::Contact, min: 10 }; "nine digits")]
    #[test_case("+441234567890", FieldError::DigitsOnly(Field::Contact); "plus sign")]
    #[test_case("0123 456 789", FieldError::DigitsOnly(Field::Contact); "spaces")]
    fn invalid_contacts(contact: &str, expected: FieldError) {
        assert_eq!(validate_contact(contact), Err(expected));
    }

    #[test_case("", FieldError::Required(Field::StudentId); "empty")]
    #[test_case("12", FieldError::TooShort { field: Field::StudentId, min: 3 }; "two digits")]
    #[test_case("12a", FieldError::DigitsOnly(Field::StudentId); "letter")]
    fn invalid_student_id_format(student_id: &str, expected: FieldError) {
        assert_eq!(
            validate_student_id(student_id, &[], UniqueCheck::New),
            Err(expected)
        );
    }

    #[test]
    fn new_student_id_must_be_unique() {
        let records = [record(1, "1001"), record(2, "1002")];

        assert_eq!(
            validate_student_id("1001", &records, UniqueCheck::New),
            Err(FieldError::DuplicateStudentId)
        );
        assert_eq!(validate_student_id("1003", &records, UniqueCheck::New), Ok(()));
    }

    #[test]
    fn edited_record_does_not_conflict_with_itself() {
        let records = [record(1, "1001"), record(2, "1002")];

        assert_eq!(
            validate_student_id("1001", &records, UniqueCheck::Edit(0)),
            Ok(())
        );
        assert_eq!(
            validate_student_id("1002", &records, UniqueCheck::Edit(0)),
            Err(FieldError::DuplicateStudentId)
        );
    }

    #[test]
    fn messages_match_form_wording() {
        assert_eq!(
            FieldError::TooShort {
                field: Field::StudentId,
                min: 3
            }
            .to_string(),
            "Student ID must be at least 3 digits long"
        );
        assert_eq!(
            FieldError::TooShort {
                field: Field::Name,
                min: 2
            }
            .to_string(),
            "Name must be at least 2 characters long"
        );
        assert_eq!(
            FieldError::DigitsOnly(Field::Contact).to_string(),
            "Contact number can only contain numbers"
        );
        assert_eq!(
            FieldError::Required(Field::Email).to_string(),
            "Email is required"
        );
    }

    #[test]
    fn validate_record_reports_every_failing_field() {
        let records = [record(1, "1001")];
        let draft = StudentDraft::new("X", "1001", "ada@example.com", "123");

        let errors = validate_record(&draft, &records, UniqueCheck::New).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.iter().map(FieldError::field).collect::<Vec<_>>(),
            vec![Field::Name, Field::StudentId, Field::Contact]
        );
        assert_eq!(
            errors.get(Field::StudentId),
            Some(&FieldError::DuplicateStudentId)
        );
        assert_eq!(errors.get(Field::Email), None);
    }

    #[test]
    fn validate_record_accepts_valid_draft() {
        let draft = StudentDraft::new("Ada Lovelace", "1001", "ada@example.com", "0123456789");
        assert_eq!(validate_record(&draft, &[], UniqueCheck::New), Ok(()));
    }

    #[test]
    fn audit_flags_duplicates_on_both_records() {
        let records = [record(1, "1001"), record(2, "1002"), record(3, "1001")];

        let problems = audit(&records);

        let indices: Vec<_> = problems.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(problems[1].id, RecordId::new(3));
    }

    #[test]
    fn audit_of_valid_records_is_empty() {
        let records = [record(1, "1001"), record(2, "1002")];
        assert!(audit(&records).is_empty());
    }
}
