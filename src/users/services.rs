use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::StorageClient;
use crate::store::{Store, StoreError};
use crate::users::dto::{UserActivityOut, UserProfileOut};
use crate::users::repo_types::ProfileChanges;

/// Presigned photo links stay valid for half an hour.
const PHOTO_URL_TTL_SECS: u64 = 30 * 60;
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

pub async fn show_profile(
    store: &dyn Store,
    storage: &dyn StorageClient,
    user_id: i64,
) -> Result<UserProfileOut, ApiError> {
    let user = store
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let profile = store.get_profile(user_id).await?;

    let (handphone, deskripsi, photo_key) = match profile {
        Some(p) => (p.handphone, p.deskripsi, p.foto_profil),
        None => (None, None, None),
    };
    let foto_profil = match photo_key {
        Some(key) => Some(storage.presign_get(&key, PHOTO_URL_TTL_SECS).await?),
        None => None,
    };

    Ok(UserProfileOut {
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        handphone,
        deskripsi,
        foto_profil,
        courses_joined: store.courses_joined(user_id).await?,
        courses_created: store.courses_created(user_id).await?,
    })
}

pub async fn edit_profile(
    store: &dyn Store,
    user_id: i64,
    changes: ProfileChanges,
) -> Result<(), ApiError> {
    if store.get_user(user_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    match store.update_profile(user_id, &changes).await {
        Ok(()) => {
            info!(user_id, "profile updated");
            Ok(())
        }
        Err(StoreError::Conflict(_)) => {
            warn!(user_id, "profile email already in use");
            Err(ApiError::conflict("Email already exists."))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn activity(store: &dyn Store, user_id: i64) -> Result<UserActivityOut, ApiError> {
    Ok(store.user_activity(user_id).await?.into())
}

/// Uploads a new profile photo and drops the one it replaces. Returns a
/// presigned URL for the new photo.
pub async fn replace_photo(
    store: &dyn Store,
    storage: &dyn StorageClient,
    user_id: i64,
    body: Bytes,
    content_type: &str,
) -> Result<String, ApiError> {
    let ext = ext_from_mime(content_type)
        .ok_or_else(|| ApiError::validation("file must be a jpeg, png or webp image"))?;
    if body.is_empty() {
        return Err(ApiError::validation("file is empty"));
    }
    if body.len() > MAX_PHOTO_BYTES {
        return Err(ApiError::validation("file is larger than 5 MB"));
    }
    if store.get_user(user_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let key = format!("profiles/{}/{}.{}", user_id, Uuid::new_v4(), ext);
    storage.put_object(&key, body, content_type).await?;
    let previous = match store.set_profile_photo(user_id, &key).await {
        Ok(previous) => previous,
        Err(e) => {
            if let Err(cleanup) = storage.delete_object(&key).await {
                warn!(error = %cleanup, %key, "failed to delete unrecorded photo");
            }
            return Err(e.into());
        }
    };

    if let Some(old) = previous.filter(|old| old != &key) {
        if let Err(e) = storage.delete_object(&old).await {
            warn!(error = %e, key = %old, "failed to delete replaced photo");
        }
    }

    info!(user_id, %key, "profile photo replaced");
    Ok(storage.presign_get(&key, PHOTO_URL_TTL_SECS).await?)
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
