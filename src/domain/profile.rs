// Personal details a user keeps on their account
use serde::{Deserialize, Serialize};

use super::household::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub city: String,
}

/// Profile edit. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl UserProfile {
    pub fn blank(user: &User) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
            full_name: String::new(),
            phone: String::new(),
            country: String::new(),
            city: String::new(),
        }
    }

    /// Merge an edit into the stored profile. The email always follows the
    /// signed-in account.
    pub fn merge(&mut self, user: &User, update: ProfileUpdate) {
        let fields = [
            (&mut self.full_name, update.full_name),
            (&mut self.phone, update.phone),
            (&mut self.country, update.country),
            (&mut self.city, update.city),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value.trim().to_string();
            }
        }
        self.email = user.email.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_absent_fields() {
        let user = User::new("u1", "me@home.io");
        let mut profile = UserProfile::blank(&user);
        profile.city = "Amman".to_string();
        profile.phone = "0790000000".to_string();

        profile.merge(
            &User::new("u1", "new@home.io"),
            ProfileUpdate {
                full_name: Some("  Sara Haddad ".to_string()),
                phone: Some(String::new()),
                ..ProfileUpdate::default()
            },
        );

        assert_eq!(profile.full_name, "Sara Haddad");
        assert_eq!(profile.phone, "");
        assert_eq!(profile.city, "Amman");
        assert_eq!(profile.country, "");
        assert_eq!(profile.email, "new@home.io");
    }
}
