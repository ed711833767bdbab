//! Field validation applied before any save reaches the network.
//!
//! Rules mirror the dashboard's form: letters-only names, Gmail-only email,
//! registry-checked country code, 6-15 digit phone, and a mandatory
//! identity-document image (existing on record, or newly selected and at
//! most 2 MiB of JPEG).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::countries;
use crate::models::{ImageUpload, PatientForm};

/// Maximum accepted size for a newly selected image.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Accepted MIME types for a newly selected image.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg"];

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@gmail\.com$").unwrap());
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{6,15}$").unwrap());

/// One field-keyed validation message. Field names are in the client shape
/// (`firstName`, ...) so the rendering layer can key inputs directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// All failures from one save attempt, in form-field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Message for one field, if it failed.
    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.message)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Validate a form ahead of create/update.
///
/// `new_image` is the freshly selected file, if any. The image requirement
/// is satisfied by either a new file or an existing `document_image_path`
/// on the form — so an update without re-uploading is legal, a first create
/// without a file is not.
pub fn validate_form(
    form: &PatientForm,
    new_image: Option<&ImageUpload>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if !NAME_RE.is_match(&form.first_name) {
        errors.push("firstName", "Only letters allowed");
    }
    if !NAME_RE.is_match(&form.last_name) {
        errors.push("lastName", "Only letters allowed");
    }
    if !EMAIL_RE.is_match(&form.email) {
        errors.push("email", "Must be a Gmail address");
    }
    if !countries::is_valid(&form.country_iso) {
        errors.push("countryIso", "Invalid country");
    }
    if !PHONE_RE.is_match(&form.phone_number) {
        errors.push("phoneNumber", "6-15 digits required");
    }

    match new_image {
        Some(image) => {
            if let Some(message) = check_image(image) {
                errors.push("documentImagePath", message);
            }
        }
        None if form.document_image_path.is_empty() => {
            errors.push("documentImagePath", "Image is required");
        }
        None => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Size/type constraints on a newly selected image. `None` means accepted.
pub fn check_image(image: &ImageUpload) -> Option<&'static str> {
    if image.size() > MAX_IMAGE_BYTES {
        return Some("Max size 2MB");
    }
    if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
        return Some("Only JPG images allowed");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> PatientForm {
        PatientForm {
            first_name: "Alice".into(),
            last_name: "Smith".into(),
            email: "alice@gmail.com".into(),
            phone_number: "5551234567".into(),
            country_iso: "US".into(),
            document_image_path: String::new(),
        }
    }

    fn jpeg(size: usize) -> ImageUpload {
        ImageUpload {
            file_name: "scan.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn valid_form_with_new_image_passes() {
        assert!(validate_form(&valid_form(), Some(&jpeg(1024))).is_ok());
    }

    #[test]
    fn digits_in_name_rejected() {
        let mut form = valid_form();
        form.first_name = "Alice1".into();
        let errors = validate_form(&form, Some(&jpeg(1024))).unwrap_err();
        assert_eq!(errors.message_for("firstName"), Some("Only letters allowed"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn non_gmail_address_rejected() {
        let mut form = valid_form();
        form.email = "alice@example.com".into();
        let errors = validate_form(&form, Some(&jpeg(1024))).unwrap_err();
        assert_eq!(errors.message_for("email"), Some("Must be a Gmail address"));
    }

    #[test]
    fn unknown_country_rejected() {
        let mut form = valid_form();
        form.country_iso = "XX".into();
        let errors = validate_form(&form, Some(&jpeg(1024))).unwrap_err();
        assert_eq!(errors.message_for("countryIso"), Some("Invalid country"));
    }

    #[test]
    fn phone_length_bounds() {
        let mut form = valid_form();
        form.phone_number = "12345".into(); // 5 digits
        assert!(validate_form(&form, Some(&jpeg(1))).is_err());
        form.phone_number = "123456".into();
        assert!(validate_form(&form, Some(&jpeg(1))).is_ok());
        form.phone_number = "1234567890123456".into(); // 16 digits
        assert!(validate_form(&form, Some(&jpeg(1))).is_err());
    }

    #[test]
    fn image_required_when_no_existing_path() {
        let errors = validate_form(&valid_form(), None).unwrap_err();
        assert_eq!(errors.message_for("documentImagePath"), Some("Image is required"));
    }

    #[test]
    fn existing_path_satisfies_image_requirement() {
        let mut form = valid_form();
        form.document_image_path = "documents/a.jpg".into();
        assert!(validate_form(&form, None).is_ok());
    }

    #[test]
    fn oversized_image_rejected() {
        let errors = validate_form(&valid_form(), Some(&jpeg(MAX_IMAGE_BYTES + 1))).unwrap_err();
        assert_eq!(errors.message_for("documentImagePath"), Some("Max size 2MB"));
    }

    #[test]
    fn image_at_limit_accepted() {
        assert!(validate_form(&valid_form(), Some(&jpeg(MAX_IMAGE_BYTES))).is_ok());
    }

    #[test]
    fn png_rejected() {
        let image = ImageUpload {
            file_name: "scan.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0; 10],
        };
        let errors = validate_form(&valid_form(), Some(&image)).unwrap_err();
        assert_eq!(errors.message_for("documentImagePath"), Some("Only JPG images allowed"));
    }

    #[test]
    fn errors_keep_form_field_order() {
        let form = PatientForm::default();
        let errors = validate_form(&form, None).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["firstName", "lastName", "email", "countryIso", "phoneNumber", "documentImagePath"]
        );
    }

    #[test]
    fn display_joins_field_messages() {
        let mut form = valid_form();
        form.first_name = "Alice1".into();
        let errors = validate_form(&form, Some(&jpeg(1))).unwrap_err();
        assert_eq!(errors.to_string(), "firstName: Only letters allowed");
    }
}
