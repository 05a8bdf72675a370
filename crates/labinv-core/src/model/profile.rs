// ── User profiles ──
//
// One document per account at `users/{uid}`, created at sign-up with just
// uid/email/createdAt and filled in later from the settings form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};

use super::item::insert_opt;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Salutation {
    Mr,
    Ms,
    Mrs,
    Dr,
    Prof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salutation: Option<Salutation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Profile {
    /// Name to show for this user, falling back to email, then uid.
    pub fn display(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_owned();
        }
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(f), Some(l)) => format!("{f} {l}"),
            (Some(f), None) => f.to_owned(),
            (None, Some(l)) => l.to_owned(),
            (None, None) => self.email.clone().unwrap_or_else(|| self.uid.clone()),
        }
    }
}

/// Initial document written at sign-up.
pub(crate) fn signup_fields(uid: &str, email: Option<&str>, now: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("uid".into(), uid.into());
    map.insert(
        "email".into(),
        email.map_or(Value::Null, |e| Value::String(e.to_owned())),
    );
    map.insert("createdAt".into(), now.into());
    map
}

/// Settings-form fields. Email is never updated through this path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub post: Option<String>,
    pub salutation: Salutation,
    pub gender: Gender,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.first_name.trim().is_empty() {
            return Err(CoreError::validation("First name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(CoreError::validation("Last name is required"));
        }
        if self.phone.trim().is_empty() {
            return Err(CoreError::validation("Phone number is required"));
        }
        Ok(())
    }

    pub(crate) fn into_fields(self, now: String) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            "displayName".into(),
            format!("{} {}", self.first_name.trim(), self.last_name.trim()).into(),
        );
        map.insert("firstName".into(), self.first_name.trim().into());
        map.insert("lastName".into(), self.last_name.trim().into());
        map.insert("phone".into(), self.phone.trim().into());
        insert_opt(&mut map, "post", self.post);
        map.insert("salutation".into(), self.salutation.to_string().into());
        map.insert("gender".into(), self.gender.to_string().into());
        map.insert("updatedAt".into(), now.into());
        map
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn display_prefers_display_name_then_names_then_email() {
        let mut p = Profile {
            uid: "u1".into(),
            email: Some("ada@lab.test".into()),
            ..Profile::default()
        };
        assert_eq!(p.display(), "ada@lab.test");

        p.first_name = Some("Ada".into());
        p.last_name = Some("Lovelace".into());
        assert_eq!(p.display(), "Ada Lovelace");

        p.display_name = Some("Countess".into());
        assert_eq!(p.display(), "Countess");
    }

    #[test]
    fn update_writes_display_name_but_not_email() {
        let update = ProfileUpdate {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone: "555-0100".into(),
            post: Some("Lab Manager".into()),
            salutation: Salutation::Dr,
            gender: Gender::Female,
        };
        assert!(update.validate().is_ok());
        let fields = update.into_fields("t".into());
        assert_eq!(fields["displayName"], json!("Ada Lovelace"));
        assert_eq!(fields["salutation"], json!("Dr"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn signup_document_shape() {
        let fields = signup_fields("u1", Some("ada@lab.test"), "2024-05-01T10:00:00Z");
        assert_eq!(
            Value::Object(fields),
            json!({ "uid": "u1", "email": "ada@lab.test", "createdAt": "2024-05-01T10:00:00Z" })
        );
    }

    #[test]
    fn decodes_partial_profile() {
        let p: Profile = serde_json::from_value(json!({ "uid": "u1", "gender": "Other" })).unwrap();
        assert_eq!(p.gender, Some(Gender::Other));
        assert!(p.salutation.is_none());
    }
}
