use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// A user's saved album. Album metadata is denormalized from the Spotify
/// catalog at the time the favorite is added.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub album_id: String,
    pub album_name: String,
    pub artist_name: String,
    pub artist_id: Option<String>,
    pub image_url: Option<String>,
    pub spotify_url: Option<String>,
    pub release_date: Option<String>,
    pub total_tracks: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub struct NewFavorite<'a> {
    pub album_id: &'a str,
    pub album_name: &'a str,
    pub artist_name: &'a str,
    pub artist_id: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub spotify_url: Option<&'a str>,
    pub release_date: Option<&'a str>,
    pub total_tracks: Option<i32>,
}

impl Favorite {
    pub async fn list_by_user(db: &PgPool, user_id: i64) -> Result<Vec<Favorite>, sqlx::Error> {
        sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, user_id, album_id, album_name, artist_name, artist_id,
                   image_url, spotify_url, release_date, total_tracks, created_at
            FROM favorites
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn find(
        db: &PgPool,
        user_id: i64,
        album_id: &str,
    ) -> Result<Option<Favorite>, sqlx::Error> {
        sqlx::query_as::<_, Favorite>(
            r#"
            SELECT id, user_id, album_id, album_name, artist_name, artist_id,
                   image_url, spotify_url, release_date, total_tracks, created_at
            FROM favorites
            WHERE user_id = $1 AND album_id = $2
            "#,
        )
        .bind(user_id)
        .bind(album_id)
        .fetch_optional(db)
        .await
    }

    /// Insert a favorite. A duplicate `(user_id, album_id)` pair surfaces as
    /// the store's unique-constraint rejection.
    pub async fn insert(
        db: &PgPool,
        user_id: i64,
        new: NewFavorite<'_>,
    ) -> Result<Favorite, sqlx::Error> {
        sqlx::query_as::<_, Favorite>(
            r#"
            INSERT INTO favorites
                (user_id, album_id, album_name, artist_name, artist_id,
                 image_url, spotify_url, release_date, total_tracks)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, album_id, album_name, artist_name, artist_id,
                      image_url, spotify_url, release_date, total_tracks, created_at
            "#,
        )
        .bind(user_id)
        .bind(new.album_id)
        .bind(new.album_name)
        .bind(new.artist_name)
        .bind(new.artist_id)
        .bind(new.image_url)
        .bind(new.spotify_url)
        .bind(new.release_date)
        .bind(new.total_tracks)
        .fetch_one(db)
        .await
    }

    /// Delete and return the row; `None` means there was nothing to remove.
    pub async fn delete(
        db: &PgPool,
        user_id: i64,
        album_id: &str,
    ) -> Result<Option<Favorite>, sqlx::Error> {
        sqlx::query_as::<_, Favorite>(
            r#"
            DELETE FROM favorites
            WHERE user_id = $1 AND album_id = $2
            RETURNING id, user_id, album_id, album_name, artist_name, artist_id,
                      image_url, spotify_url, release_date, total_tracks, created_at
            "#,
        )
        .bind(user_id)
        .bind(album_id)
        .fetch_optional(db)
        .await
    }
}
