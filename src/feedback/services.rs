use tracing::{info, warn};

use crate::courses::services::find_course;
use crate::error::ApiError;
use crate::feedback::repo_types::Feedback;
use crate::store::Store;

pub async fn create(
    store: &dyn Store,
    caller_id: i64,
    course_id: i64,
    message: &str,
) -> Result<Feedback, ApiError> {
    let course = find_course(store, course_id).await?;
    let row = store.create_feedback(course.id, caller_id, message).await?;
    info!(course_id, feedback_id = row.id, user_id = caller_id, "feedback added");
    Ok(row)
}

pub async fn list(store: &dyn Store, course_id: i64) -> Result<Vec<Feedback>, ApiError> {
    Ok(store.list_feedback(course_id).await?)
}

/// Loads a feedback entry, requiring the caller to be its author.
pub async fn authored_feedback(
    store: &dyn Store,
    caller_id: i64,
    feedback_id: i64,
    denied: &str,
) -> Result<Feedback, ApiError> {
    let feedback = store
        .get_feedback(feedback_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Feedback not found"))?;
    if feedback.user_id != caller_id {
        warn!(feedback_id, user_id = caller_id, "feedback change by non-author");
        return Err(ApiError::forbidden(denied));
    }
    Ok(feedback)
}

pub async fn update(
    store: &dyn Store,
    feedback: &Feedback,
    message: &str,
) -> Result<Feedback, ApiError> {
    let row = store
        .update_feedback(feedback.id, message)
        .await?
        .ok_or_else(|| ApiError::not_found("Feedback not found"))?;
    info!(feedback_id = row.id, "feedback updated");
    Ok(row)
}

pub async fn delete(store: &dyn Store, feedback: &Feedback) -> Result<(), ApiError> {
    if !store.delete_feedback(feedback.id).await? {
        return Err(ApiError::not_found("Feedback not found"));
    }
    info!(feedback_id = feedback.id, "feedback deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn author_edits_and_deletes_feedback() {
        let store = MemoryStore::default();
        let teacher = store.seed_user("teacher").await;
        let student = store.seed_user("student").await;
        let course = store.seed_course(teacher.id, "Rust 101").await;

        let row = create(&store, student.id, course.id, "Loved it").await.unwrap();
        let owned = authored_feedback(&store, student.id, row.id, "denied").await.unwrap();
        let updated = update(&store, &owned, "Loved it a lot").await.unwrap();
        assert_eq!(updated.message, "Loved it a lot");
        assert_eq!(updated.user_id, student.id);

        delete(&store, &owned).await.unwrap();
        assert!(list(&store, course.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_author_cannot_delete() {
        let store = MemoryStore::default();
        let teacher = store.seed_user("teacher").await;
        let student = store.seed_user("student").await;
        let course = store.seed_course(teacher.id, "Rust 101").await;
        let row = create(&store, student.id, course.id, "ok").await.unwrap();

        let err = authored_feedback(&store, teacher.id, row.id, "Unauthorized to delete feedback")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(list(&store, course.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn feedback_needs_an_existing_course() {
        let store = MemoryStore::default();
        let student = store.seed_user("student").await;
        let err = create(&store, student.id, 5_555, "hello").await.unwrap_err();
        assert_eq!(err.to_string(), "Course not found");
    }
}
