use serde::{Deserialize, Serialize};

/// The `user` object of the payload. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAppUser {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl WebAppUser {
    /// `first last`, else the username, else the numeric id.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        match self.username.as_deref().map(str::trim) {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => self.id.to_string(),
        }
    }
}

/// Identity asserted by a verified payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    pub user_id: String,
    pub display_name: String,
    /// The `user` field exactly as signed.
    #[serde(skip)]
    pub raw_user_json: String,
    pub auth_date: i64,
    pub user: WebAppUser,
}

impl Claims {
    pub(crate) fn from_user_json(raw_user_json: &str, auth_date: i64) -> serde_json::Result<Self> {
        let user: WebAppUser = serde_json::from_str(raw_user_json)?;
        Ok(Self {
            user_id: user.id.to_string(),
            display_name: user.display_name(),
            raw_user_json: raw_user_json.to_string(),
            auth_date,
            user,
        })
    }
}
