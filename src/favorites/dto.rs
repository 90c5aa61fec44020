use serde::{Deserialize, Serialize};

use crate::favorites::repo::Favorite;

/// Album payload from the frontend. Required fields stay `Option` here so
/// a missing one answers with the API's own validation message instead of a
/// body-rejection.
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    #[serde(default)]
    pub album_id: Option<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub spotify_url: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub total_tracks: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct FavoritesListResponse {
    pub success: bool,
    pub count: usize,
    pub favorites: Vec<Favorite>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub success: bool,
    pub message: String,
    pub favorite: Favorite,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckFavoriteResponse {
    pub success: bool,
    pub is_favorite: bool,
    pub favorite: Option<Favorite>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn add_request_tolerates_missing_fields() {
        let parsed: AddFavoriteRequest =
            serde_json::from_str(r#"{"album_id":"A1"}"#).expect("deserialize");
        assert_eq!(parsed.album_id.as_deref(), Some("A1"));
        assert!(parsed.album_name.is_none());
        assert!(parsed.total_tracks.is_none());
    }

    #[test]
    fn check_response_uses_camel_case_on_the_wire() {
        let response = CheckFavoriteResponse {
            success: true,
            is_favorite: false,
            favorite: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["isFavorite"], serde_json::json!(false));
        assert!(json["favorite"].is_null());
    }

    #[test]
    fn list_response_counts_its_rows() {
        let favorite = Favorite {
            id: 1,
            user_id: 7,
            album_id: "A1".into(),
            album_name: "X".into(),
            artist_name: "Y".into(),
            artist_id: None,
            image_url: None,
            spotify_url: None,
            release_date: Some("2020-01-01".into()),
            total_tracks: Some(12),
            created_at: OffsetDateTime::now_utc(),
        };
        let response = FavoritesListResponse {
            success: true,
            count: 1,
            favorites: vec![favorite],
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["count"], serde_json::json!(1));
        assert_eq!(json["favorites"][0]["album_id"], serde_json::json!("A1"));
    }
}
