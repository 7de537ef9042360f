//! Wire types for the hosted backend services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use townboard_core::{ApplicationId, BusinessId, Email, UserId};

/// OAuth provider supported by the hosted auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    /// Provider name as the auth service expects it in the authorize URL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in identity carried inside a [`Session`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    /// Identity issued by the auth service.
    pub id: UserId,
    /// Email the identity signed up with.
    pub email: Email,
}

/// Token bundle issued by the hosted auth service.
///
/// Owned exclusively by the session store for the process lifetime;
/// consumers get clones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Bearer token for authenticated service calls.
    pub access_token: String,
    /// Token used to mint a fresh session on restart.
    pub refresh_token: String,
    /// Seconds until the access token expires.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// The signed-in user.
    pub user: AuthUser,
}

/// A business listing row as returned by the data service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRow {
    /// Server-assigned row id.
    #[serde(default)]
    pub id: Option<BusinessId>,
    /// Owning identity; the nil uuid marks an anonymous submission.
    pub owner_id: Option<UserId>,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub working_hours: Option<String>,
    #[serde(default)]
    pub supports_home_delivery: Option<bool>,
}

/// Named-parameter bag for the listing insert RPC.
///
/// Field names map to the procedure's `p_*` parameters; the server assigns
/// the row id and creation timestamp.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListingInsert {
    #[serde(rename = "p_owner_id")]
    pub owner_id: UserId,
    #[serde(rename = "p_name")]
    pub name: String,
    #[serde(rename = "p_category")]
    pub category: String,
    #[serde(rename = "p_owner_name")]
    pub owner_name: String,
    #[serde(rename = "p_phone")]
    pub phone: String,
    #[serde(rename = "p_description")]
    pub description: String,
    #[serde(rename = "p_reference_id")]
    pub reference_id: String,
    #[serde(rename = "p_address")]
    pub address: String,
    #[serde(rename = "p_latitude")]
    pub latitude: Option<f64>,
    #[serde(rename = "p_longitude")]
    pub longitude: Option<f64>,
    #[serde(rename = "p_working_hours")]
    pub working_hours: String,
    #[serde(rename = "p_supports_home_delivery")]
    pub supports_home_delivery: bool,
    #[serde(rename = "p_image_urls")]
    pub image_urls: Vec<String>,
    #[serde(rename = "p_video_url")]
    pub video_url: Option<String>,
}

/// A job-application row for the data service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationRecord {
    #[serde(rename = "se_id")]
    pub id: ApplicationId,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub date_of_birth: String,
    pub national_id: String,
    pub tax_id: String,
    pub bank_details: String,
    pub passport_photo_url: String,
    pub national_id_doc_url: String,
    pub tax_id_doc_url: String,
    pub bank_doc_url: String,
    pub signature_url: String,
    pub terms_accepted: bool,
    pub created_at: DateTime<Utc>,
}

/// The single column read off a profile row.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProfileRow {
    #[serde(default)]
    pub is_premium: Option<bool>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_session_deserializes_token_grant_response() {
        let json = r#"{
            "access_token": "at-123",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt-456",
            "user": { "id": "11111111-2222-3333-4444-555555555555", "email": "o@example.com" }
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token, "at-123");
        assert_eq!(session.refresh_token, "rt-456");
        assert_eq!(session.expires_in, Some(3600));
        assert_eq!(session.user.email.as_str(), "o@example.com");
    }

    #[test]
    fn test_listing_insert_uses_rpc_parameter_names() {
        let insert = ListingInsert {
            owner_id: UserId::anonymous(),
            name: "Corner Bakery".to_string(),
            category: "Restaurants & Cafes".to_string(),
            owner_name: String::new(),
            phone: String::new(),
            description: String::new(),
            reference_id: String::new(),
            address: String::new(),
            latitude: None,
            longitude: None,
            working_hours: String::new(),
            supports_home_delivery: false,
            image_urls: vec!["https://cdn.test/1.jpg".to_string()],
            video_url: None,
        };
        let value = serde_json::to_value(&insert).unwrap();
        assert_eq!(value["p_name"], "Corner Bakery");
        assert_eq!(value["p_video_url"], serde_json::Value::Null);
        assert_eq!(
            value["p_owner_id"],
            "00000000-0000-0000-0000-000000000000"
        );
        assert!(value.get("name").is_none());
    }

    #[test]
    fn test_listing_row_tolerates_missing_optional_columns() {
        let json = r#"{"owner_id": null, "name": "Shop", "category": "Other"}"#;
        let row: ListingRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.name, "Shop");
        assert!(row.image_urls.is_none());
    }

    #[test]
    fn test_application_record_round_trip() {
        let record = ApplicationRecord {
            id: ApplicationId::from_number(1700),
            full_name: "A Person".to_string(),
            phone: "5550100".to_string(),
            email: "a@example.com".to_string(),
            date_of_birth: "01/02/1990".to_string(),
            national_id: "1234".to_string(),
            tax_id: "5678".to_string(),
            bank_details: "branch".to_string(),
            passport_photo_url: "u1".to_string(),
            national_id_doc_url: "u2".to_string(),
            tax_id_doc_url: "u3".to_string(),
            bank_doc_url: "u4".to_string(),
            signature_url: "u5".to_string(),
            terms_accepted: true,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["se_id"], "SE1700");
        assert_eq!(value["terms_accepted"], true);
    }

    #[test]
    fn test_auth_user_id_is_uuid() {
        let raw = Uuid::new_v4();
        let user = AuthUser {
            id: UserId::new(raw),
            email: Email::parse("o@example.com").unwrap(),
        };
        assert_eq!(serde_json::to_value(&user).unwrap()["id"], raw.to_string());
    }
}
