use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::extractors::AuthUser;
use crate::error::{is_unique_violation, ApiError};
use crate::favorites::{
    dto::{AddFavoriteRequest, CheckFavoriteResponse, FavoriteResponse, FavoritesListResponse},
    repo::{Favorite, NewFavorite},
};
use crate::state::AppState;

pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/:album_id", delete(remove_favorite))
        .route("/favorites/check/:album_id", get(check_favorite))
}

#[instrument(skip(state, auth))]
pub async fn list_favorites(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<FavoritesListResponse>, ApiError> {
    let favorites = Favorite::list_by_user(&state.db, auth.id)
        .await
        .map_err(|e| ApiError::internal("Error fetching favorites", e))?;

    Ok(Json(FavoritesListResponse {
        success: true,
        count: favorites.len(),
        favorites,
    }))
}

#[instrument(skip(state, auth, payload))]
pub async fn add_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<FavoriteResponse>), ApiError> {
    let (album_id, album_name, artist_name) = match (
        payload.album_id.as_deref().filter(|s| !s.is_empty()),
        payload.album_name.as_deref().filter(|s| !s.is_empty()),
        payload.artist_name.as_deref().filter(|s| !s.is_empty()),
    ) {
        (Some(album_id), Some(album_name), Some(artist_name)) => {
            (album_id, album_name, artist_name)
        }
        _ => {
            return Err(ApiError::validation(
                "Album ID, name, and artist name are required",
            ))
        }
    };

    let new = NewFavorite {
        album_id,
        album_name,
        artist_name,
        artist_id: payload.artist_id.as_deref(),
        image_url: payload.image_url.as_deref(),
        spotify_url: payload.spotify_url.as_deref(),
        release_date: payload.release_date.as_deref(),
        total_tracks: payload.total_tracks,
    };

    // The (user_id, album_id) unique constraint is the duplicate gate
    let favorite = match Favorite::insert(&state.db, auth.id, new).await {
        Ok(favorite) => favorite,
        Err(e) if is_unique_violation(&e) => {
            warn!(user_id = auth.id, album_id, "album already favorited");
            return Err(ApiError::conflict("Album already in favorites"));
        }
        Err(e) => return Err(ApiError::internal("Error adding favorite", e)),
    };

    info!(user_id = auth.id, album_id, "favorite added");
    Ok((
        StatusCode::CREATED,
        Json(FavoriteResponse {
            success: true,
            message: "Favorite added successfully".into(),
            favorite,
        }),
    ))
}

#[instrument(skip(state, auth))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(album_id): Path<String>,
) -> Result<Json<FavoriteResponse>, ApiError> {
    let favorite = Favorite::delete(&state.db, auth.id, &album_id)
        .await
        .map_err(|e| ApiError::internal("Error removing favorite", e))?
        .ok_or_else(|| ApiError::not_found("Favorite not found"))?;

    info!(user_id = auth.id, album_id, "favorite removed");
    Ok(Json(FavoriteResponse {
        success: true,
        message: "Favorite removed successfully".into(),
        favorite,
    }))
}

/// Absence is a negative answer here, not an error.
#[instrument(skip(state, auth))]
pub async fn check_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(album_id): Path<String>,
) -> Result<Json<CheckFavoriteResponse>, ApiError> {
    let favorite = Favorite::find(&state.db, auth.id, &album_id)
        .await
        .map_err(|e| ApiError::internal("Error checking favorite", e))?;

    Ok(Json(CheckFavoriteResponse {
        success: true,
        is_favorite: favorite.is_some(),
        favorite,
    }))
}
