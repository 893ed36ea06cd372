use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryProgress {
    #[serde(default)]
    pub iso3: String,
    #[serde(default)]
    pub progress: i32,
}

/// Payload of `GET /stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub countries: Vec<CountryProgress>,
    #[serde(default)]
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLocation {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub iso3: String,
    #[serde(default, rename = "avatarURL", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, rename = "livro", skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(default, rename = "pais", skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(default)]
    pub timestamp: String,
}

impl UserLocation {
    /// Avatar URL, treating the backend's empty string as absent.
    pub fn avatar(&self) -> Option<&str> {
        non_empty(self.avatar_url.as_deref())
    }

    pub fn book_title(&self) -> Option<&str> {
        non_empty(self.book.as_deref())
    }

    pub fn seen_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.timestamp.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Name of the raster sprite holding this user's avatar.
    pub fn sprite_name(&self) -> String {
        format!("avatar-{}", self.user)
    }
}

/// Payload of `GET /users/locations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsersResponse {
    #[serde(default, deserialize_with = "named_users")]
    pub users: Vec<UserLocation>,
    #[serde(default)]
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryReading {
    #[serde(default)]
    pub user: String,
    #[serde(default, rename = "avatarURL", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, rename = "capaURL", skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, rename = "livro")]
    pub book: String,
    #[serde(default, rename = "progresso")]
    pub progress: i32,
}

impl CountryReading {
    pub fn avatar(&self) -> Option<&str> {
        non_empty(self.avatar_url.as_deref())
    }

    pub fn cover(&self) -> Option<&str> {
        non_empty(self.cover_url.as_deref())
    }
}

/// Payload of `GET /readings/{iso3}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingsResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub readings: Vec<CountryReading>,
}

/// Accept `null` wherever a list is expected.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Users without a name cannot carry a sprite or a marker.
fn named_users<'de, D>(deserializer: D) -> Result<Vec<UserLocation>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut users: Vec<UserLocation> = null_as_empty(deserializer)?;
    let before = users.len();
    users.retain(|user| !user.user.trim().is_empty());
    if users.len() < before {
        debug!(dropped = before - users.len(), "skipping users without a name");
    }
    Ok(users)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_collections_decode_as_empty() {
        let stats: StatsResponse = serde_json::from_str("{}").expect("stats should parse");
        assert!(stats.countries.is_empty());
        assert_eq!(stats.total, 0);

        let users: UsersResponse =
            serde_json::from_str(r#"{"total": 3}"#).expect("users should parse");
        assert!(users.users.is_empty());
        assert_eq!(users.total, 3);

        let readings: ReadingsResponse =
            serde_json::from_str(r#"{"other": true}"#).expect("readings should parse");
        assert!(readings.readings.is_empty());
    }

    #[test]
    fn null_collections_decode_as_empty() {
        let stats: StatsResponse = serde_json::from_str(r#"{"countries": null, "total": 0}"#)
            .expect("stats should parse");
        assert!(stats.countries.is_empty());

        let users: UsersResponse =
            serde_json::from_str(r#"{"users": null}"#).expect("users should parse");
        assert!(users.users.is_empty());

        let readings: ReadingsResponse =
            serde_json::from_str(r#"{"readings": null}"#).expect("readings should parse");
        assert!(readings.readings.is_empty());
    }

    #[test]
    fn nameless_user_does_not_reject_the_list() {
        let users: UsersResponse = serde_json::from_str(
            r#"{
                "users": [
                    {"user": "ana", "iso3": "BRA"},
                    {"iso3": "PRT", "avatarURL": "https://img.example/x.png"},
                    {"user": "  ", "iso3": "ARG"},
                    {"user": "rui", "iso3": "PRT"}
                ],
                "total": 4
            }"#,
        )
        .expect("users should parse");

        let names: Vec<&str> = users.users.iter().map(|u| u.user.as_str()).collect();
        assert_eq!(names, ["ana", "rui"]);
        assert_eq!(users.total, 4);
    }

    #[test]
    fn user_location_uses_backend_field_names() {
        let user: UserLocation = serde_json::from_str(
            r#"{
                "user": "ana",
                "iso3": "BRA",
                "avatarURL": "https://img.example/ana.png",
                "pais": "Brasil",
                "livro": "Grande Sertão: Veredas",
                "timestamp": "2026-01-12T10:00:00Z"
            }"#,
        )
        .expect("user should parse");

        assert_eq!(user.avatar(), Some("https://img.example/ana.png"));
        assert_eq!(user.book_title(), Some("Grande Sertão: Veredas"));
        assert_eq!(user.country_name.as_deref(), Some("Brasil"));
        assert_eq!(user.sprite_name(), "avatar-ana");
        assert!(user.seen_at().is_some());
    }

    #[test]
    fn empty_strings_are_treated_as_absent() {
        let user: UserLocation = serde_json::from_str(
            r#"{"user": "bo", "iso3": "PRT", "avatarURL": "", "livro": "  ",
                "timestamp": "not a date"}"#,
        )
        .expect("user should parse");

        assert_eq!(user.avatar(), None);
        assert_eq!(user.book_title(), None);
        assert_eq!(user.seen_at(), None);
    }

    #[test]
    fn reading_decodes_portuguese_fields() {
        let reading: CountryReading = serde_json::from_str(
            r#"{"user": "ana", "capaURL": "https://img.example/c.jpg",
                "livro": "Dom Casmurro", "progresso": 42}"#,
        )
        .expect("reading should parse");

        assert_eq!(reading.book, "Dom Casmurro");
        assert_eq!(reading.progress, 42);
        assert_eq!(reading.cover(), Some("https://img.example/c.jpg"));
        assert_eq!(reading.avatar(), None);
    }
}
