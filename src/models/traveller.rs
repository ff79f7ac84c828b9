//! Saved traveller records.

use serde::{Deserialize, Serialize};

/// A frequent traveller saved on the profile page.
///
/// Optional fields are stored as empty strings when blank, matching what the
/// traveller form submits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Traveller {
    pub id: String,
    pub title: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub country_code: String,
    pub dob: String,
    pub gender: String,
    pub passport_country: String,
    pub passport_number: String,
    pub passport_issue: String,
    pub passport_expiry: String,
    pub nationality: String,
}

impl Traveller {
    /// "Title First Last" as shown in the traveller list.
    pub fn full_name(&self) -> String {
        let mut name = String::new();
        if !self.title.is_empty() {
            name.push_str(&self.title);
            name.push(' ');
        }
        name.push_str(&self.first_name);
        name.push(' ');
        name.push_str(&self.last_name);
        name.trim().to_string()
    }

    /// Nationality column, falling back to the passport country.
    pub fn nationality_label(&self) -> String {
        if self.nationality.is_empty() {
            self.passport_country.to_uppercase()
        } else {
            self.nationality.to_uppercase()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_includes_title_when_present() {
        let mut t = Traveller {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            ..Default::default()
        };
        assert_eq!(t.full_name(), "Grace Hopper");
        t.title = "Dr".into();
        assert_eq!(t.full_name(), "Dr Grace Hopper");
    }

    #[test]
    fn nationality_falls_back_to_passport_country() {
        let t = Traveller {
            passport_country: "ng".into(),
            ..Default::default()
        };
        assert_eq!(t.nationality_label(), "NG");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let t: Traveller =
            serde_json::from_str(r#"{"id":"1","firstName":"A","lastName":"B"}"#).unwrap();
        assert_eq!(t.dob, "");
        assert_eq!(t.first_name, "A");
    }
}
