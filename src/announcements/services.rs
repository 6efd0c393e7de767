use tracing::{info, warn};

use crate::announcements::dto::{AnnouncementIn, AnnouncementOut};
use crate::announcements::repo_types::Announcement;
use crate::courses::repo_types::Course;
use crate::courses::services::find_course;
use crate::error::ApiError;
use crate::store::Store;

fn render(a: Announcement) -> Result<AnnouncementOut, ApiError> {
    AnnouncementOut::try_from(a).map_err(|e| ApiError::Internal(e.into()))
}

pub async fn create(
    store: &dyn Store,
    course: &Course,
    input: AnnouncementIn,
) -> Result<AnnouncementOut, ApiError> {
    let row = store
        .create_announcement(course.id, input.title.trim(), &input.message, input.show_at)
        .await?;
    info!(course_id = course.id, announcement_id = row.id, "announcement created");
    render(row)
}

/// Any course's announcements; an unknown course simply has none.
pub async fn list(store: &dyn Store, course_id: i64) -> Result<Vec<AnnouncementOut>, ApiError> {
    store
        .list_announcements(course_id)
        .await?
        .into_iter()
        .map(render)
        .collect()
}

/// Loads an announcement, requiring the caller to teach its course.
pub async fn owned_announcement(
    store: &dyn Store,
    caller_id: i64,
    announcement_id: i64,
    denied: &str,
) -> Result<Announcement, ApiError> {
    let announcement = store
        .get_announcement(announcement_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Announcement not found"))?;
    let course = find_course(store, announcement.course_id).await?;
    if course.teacher_id != caller_id {
        warn!(announcement_id, user_id = caller_id, "announcement change by non-teacher");
        return Err(ApiError::forbidden(denied));
    }
    Ok(announcement)
}

pub async fn update(
    store: &dyn Store,
    announcement: &Announcement,
    input: AnnouncementIn,
) -> Result<AnnouncementOut, ApiError> {
    let row = store
        .update_announcement(
            announcement.id,
            input.title.trim(),
            &input.message,
            input.show_at,
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Announcement not found"))?;
    info!(announcement_id = row.id, "announcement updated");
    render(row)
}

pub async fn delete(store: &dyn Store, announcement: &Announcement) -> Result<(), ApiError> {
    if !store.delete_announcement(announcement.id).await? {
        return Err(ApiError::not_found("Announcement not found"));
    }
    info!(announcement_id = announcement.id, "announcement deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use time::macros::date;

    fn input(title: &str) -> AnnouncementIn {
        AnnouncementIn {
            title: title.into(),
            message: "Midterm moved".into(),
            show_at: date!(2025 - 03 - 01),
        }
    }

    #[tokio::test]
    async fn teacher_manages_announcements() {
        let store = MemoryStore::default();
        let teacher = store.seed_user("teacher").await;
        let course = store.seed_course(teacher.id, "Rust 101").await;

        let created = create(&store, &course, input(" Exam ")).await.unwrap();
        assert_eq!(created.title, "Exam");
        assert_eq!(created.show_at, date!(2025 - 03 - 01));

        let owned = owned_announcement(&store, teacher.id, created.id, "denied")
            .await
            .unwrap();
        let updated = update(&store, &owned, input("Final")).await.unwrap();
        assert_eq!(updated.title, "Final");
        assert_eq!(list(&store, course.id).await.unwrap().len(), 1);

        delete(&store, &owned).await.unwrap();
        assert!(list(&store, course.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_users_are_denied() {
        let store = MemoryStore::default();
        let teacher = store.seed_user("teacher").await;
        let student = store.seed_user("student").await;
        let course = store.seed_course(teacher.id, "Rust 101").await;
        let created = create(&store, &course, input("Exam")).await.unwrap();

        let err = owned_announcement(
            &store,
            student.id,
            created.id,
            "Unauthorized to edit announcement",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(err.to_string(), "Unauthorized to edit announcement");

        let err = owned_announcement(&store, teacher.id, 9_999, "denied")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Announcement not found");
    }

    #[tokio::test]
    async fn unknown_course_has_no_announcements() {
        let store = MemoryStore::default();
        assert!(list(&store, 31_337).await.unwrap().is_empty());
    }
}
