use std::collections::HashMap;

use anyhow::anyhow;
use tracing::{info, warn};

use crate::auth::dto::UserOut;
use crate::courses::dto::{
    BatchEnrollResponse, ContentFull, ContentIn, ContentMini, CourseIn, CourseOut, MemberOut,
};
use crate::courses::repo_types::{
    Course, CourseAnalytics, CourseContent, CourseMember, STUDENT_ROLE,
};
use crate::error::ApiError;
use crate::store::Store;

/// Builds nested output shapes, loading each user, course, content and
/// membership at most once.
pub struct CourseViews<'a> {
    store: &'a dyn Store,
    users: HashMap<i64, UserOut>,
    courses: HashMap<i64, CourseOut>,
    contents: HashMap<i64, ContentMini>,
    members: HashMap<i64, MemberOut>,
}

impl<'a> CourseViews<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            users: HashMap::new(),
            courses: HashMap::new(),
            contents: HashMap::new(),
            members: HashMap::new(),
        }
    }

    pub async fn user(&mut self, id: i64) -> Result<UserOut, ApiError> {
        if let Some(user) = self.users.get(&id) {
            return Ok(user.clone());
        }
        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or_else(|| anyhow!("user {id} referenced but missing"))?;
        let out = UserOut::from(&user);
        self.users.insert(id, out.clone());
        Ok(out)
    }

    pub async fn course(&mut self, course: &Course) -> Result<CourseOut, ApiError> {
        if let Some(out) = self.courses.get(&course.id) {
            return Ok(out.clone());
        }
        let teacher = self.user(course.teacher_id).await?;
        let out = CourseOut::new(course, teacher);
        self.courses.insert(course.id, out.clone());
        Ok(out)
    }

    pub async fn course_by_id(&mut self, id: i64) -> Result<CourseOut, ApiError> {
        if let Some(out) = self.courses.get(&id) {
            return Ok(out.clone());
        }
        let course = self
            .store
            .get_course(id)
            .await?
            .ok_or_else(|| anyhow!("course {id} referenced but missing"))?;
        self.course(&course).await
    }

    pub async fn content_mini(&mut self, content: &CourseContent) -> Result<ContentMini, ApiError> {
        let course = self.course_by_id(content.course_id).await?;
        Ok(ContentMini::new(content, course))
    }

    pub async fn content_by_id(&mut self, id: i64) -> Result<ContentMini, ApiError> {
        if let Some(out) = self.contents.get(&id) {
            return Ok(out.clone());
        }
        let content = self
            .store
            .get_content(id)
            .await?
            .ok_or_else(|| anyhow!("content {id} referenced but missing"))?;
        let out = self.content_mini(&content).await?;
        self.contents.insert(id, out.clone());
        Ok(out)
    }

    pub async fn member(&mut self, member: &CourseMember) -> Result<MemberOut, ApiError> {
        if let Some(out) = self.members.get(&member.id) {
            return Ok(out.clone());
        }
        let out = MemberOut {
            id: member.id,
            course: self.course_by_id(member.course_id).await?,
            user: self.user(member.user_id).await?,
            roles: member.roles.clone(),
        };
        self.members.insert(member.id, out.clone());
        Ok(out)
    }

    pub async fn member_by_id(&mut self, id: i64) -> Result<MemberOut, ApiError> {
        if let Some(out) = self.members.get(&id) {
            return Ok(out.clone());
        }
        let member = self
            .store
            .get_member(id)
            .await?
            .ok_or_else(|| anyhow!("member {id} referenced but missing"))?;
        self.member(&member).await
    }
}

pub async fn find_course(store: &dyn Store, course_id: i64) -> Result<Course, ApiError> {
    store
        .get_course(course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))
}

/// Loads the course and checks that `user_id` teaches it.
pub async fn course_taught_by(
    store: &dyn Store,
    course_id: i64,
    user_id: i64,
    denied: &str,
) -> Result<Course, ApiError> {
    let course = find_course(store, course_id).await?;
    if course.teacher_id != user_id {
        warn!(course_id, user_id, teacher_id = course.teacher_id, "not the course teacher");
        return Err(ApiError::forbidden(denied));
    }
    Ok(course)
}

pub async fn create_course(
    store: &dyn Store,
    teacher_id: i64,
    input: CourseIn,
) -> Result<CourseOut, ApiError> {
    let course = store
        .create_course(teacher_id, input.name.trim(), &input.description, input.price)
        .await?;
    info!(course_id = course.id, teacher_id, "course created");
    CourseViews::new(store).course(&course).await
}

pub async fn list_courses(
    store: &dyn Store,
    limit: i64,
    offset: i64,
) -> Result<Vec<CourseOut>, ApiError> {
    let courses = store.list_courses(limit, offset).await?;
    let mut views = CourseViews::new(store);
    let mut out = Vec::with_capacity(courses.len());
    for course in &courses {
        out.push(views.course(course).await?);
    }
    Ok(out)
}

pub async fn get_course(store: &dyn Store, course_id: i64) -> Result<CourseOut, ApiError> {
    let course = find_course(store, course_id).await?;
    CourseViews::new(store).course(&course).await
}

/// Enrolls each existing user id as a student of an already-authorized course.
/// Unknown ids are skipped and ids that already have a membership are not
/// reported again.
pub async fn batch_enroll(
    store: &dyn Store,
    course: &Course,
    student_ids: &[i64],
) -> Result<BatchEnrollResponse, ApiError> {
    let mut enrolled = Vec::new();
    for &student_id in student_ids {
        if store.get_user(student_id).await?.is_none() {
            continue;
        }
        if store.enroll(course.id, student_id, STUDENT_ROLE).await? {
            enrolled.push(student_id);
        }
    }

    info!(course_id = course.id, count = enrolled.len(), "batch enrollment");
    Ok(BatchEnrollResponse::new(enrolled))
}

/// Enrolls the caller as a student. Returns whether a new membership was made.
pub async fn self_enroll(
    store: &dyn Store,
    caller_id: i64,
    course_id: i64,
) -> Result<(bool, MemberOut), ApiError> {
    let course = find_course(store, course_id).await?;
    let created = store.enroll(course.id, caller_id, STUDENT_ROLE).await?;
    let member = store
        .find_member(course.id, caller_id)
        .await?
        .ok_or_else(|| anyhow!("membership for user {caller_id} vanished after enroll"))?;
    if created {
        info!(course_id, user_id = caller_id, "student enrolled");
    }
    let out = CourseViews::new(store).member(&member).await?;
    Ok((created, out))
}

pub async fn create_content(
    store: &dyn Store,
    course: &Course,
    input: ContentIn,
) -> Result<ContentFull, ApiError> {
    let content = store
        .create_content(
            course.id,
            input.name.trim(),
            &input.description,
            input.video_url.as_deref(),
        )
        .await?;
    info!(course_id = course.id, content_id = content.id, "content created");
    let course_out = CourseViews::new(store).course(course).await?;
    Ok(ContentFull::new(content, course_out))
}

pub async fn list_contents(
    store: &dyn Store,
    course_id: i64,
) -> Result<Vec<ContentMini>, ApiError> {
    let course = find_course(store, course_id).await?;
    let mut views = CourseViews::new(store);
    let course_out = views.course(&course).await?;
    let contents = store.list_contents(course.id).await?;
    Ok(contents
        .iter()
        .map(|c| ContentMini::new(c, course_out.clone()))
        .collect())
}

pub async fn get_content(store: &dyn Store, content_id: i64) -> Result<ContentFull, ApiError> {
    let content = store
        .get_content(content_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Content not found"))?;
    let course = CourseViews::new(store).course_by_id(content.course_id).await?;
    Ok(ContentFull::new(content, course))
}

pub async fn course_analytics(
    store: &dyn Store,
    caller_id: i64,
    course_id: i64,
) -> Result<CourseAnalytics, ApiError> {
    let course = course_taught_by(
        store,
        course_id,
        caller_id,
        "You are not authorized to view this course analytics",
    )
    .await?;
    Ok(store.course_analytics(course.id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::repo::CommentRepo;
    use crate::courses::repo::CourseRepo;
    use crate::feedback::repo::FeedbackRepo;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn batch_enroll_skips_existing_and_duplicate_ids() {
        let store = MemoryStore::default();
        let teacher = store.seed_user("teacher").await;
        let a = store.seed_user("alice").await;
        let b = store.seed_user("bob").await;
        let course = store.seed_course(teacher.id, "Rust 101").await;
        store.enroll(course.id, b.id, STUDENT_ROLE).await.unwrap();

        let res = batch_enroll(&store, &course, &[a.id, b.id, a.id]).await.unwrap();
        assert_eq!(res.enrolled_student_ids, vec![a.id]);
        assert_eq!(res.message, "1 students enrolled.");

        let again = batch_enroll(&store, &course, &[a.id, b.id]).await.unwrap();
        assert!(again.enrolled_student_ids.is_empty());
        assert_eq!(again.message, "0 students enrolled.");
    }

    #[tokio::test]
    async fn batch_enroll_ignores_unknown_users() {
        let store = MemoryStore::default();
        let teacher = store.seed_user("teacher").await;
        let course = store.seed_course(teacher.id, "Rust 101").await;

        let res = batch_enroll(&store, &course, &[9_999]).await.unwrap();
        assert!(res.enrolled_student_ids.is_empty());
        assert!(store.find_member(course.id, 9_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn course_taught_by_rejects_other_users() {
        let store = MemoryStore::default();
        let teacher = store.seed_user("teacher").await;
        let other = store.seed_user("other").await;
        let course = store.seed_course(teacher.id, "Rust 101").await;

        let err = course_taught_by(&store, course.id, other.id, "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(ref m) if m == "nope"));

        let err = course_taught_by(&store, 12_345, teacher.id, "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn self_enroll_is_get_or_create() {
        let store = MemoryStore::default();
        let teacher = store.seed_user("teacher").await;
        let student = store.seed_user("student").await;
        let course = store.seed_course(teacher.id, "Rust 101").await;

        let (created, first) = self_enroll(&store, student.id, course.id).await.unwrap();
        assert!(created);
        assert_eq!(first.roles, STUDENT_ROLE);
        assert_eq!(first.course.teacher.id, teacher.id);

        let (created, second) = self_enroll(&store, student.id, course.id).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn analytics_counts_course_rows() {
        let store = MemoryStore::default();
        let teacher = store.seed_user("teacher").await;
        let student = store.seed_user("student").await;
        let course = store.seed_course(teacher.id, "Rust 101").await;
        let other_course = store.seed_course(teacher.id, "Go 101").await;

        store.enroll(course.id, student.id, STUDENT_ROLE).await.unwrap();
        let member = store.find_member(course.id, student.id).await.unwrap().unwrap();
        let content = store
            .create_content(course.id, "Intro", "hello", None)
            .await
            .unwrap();
        store.create_content(other_course.id, "Other", "x", None).await.unwrap();
        store.create_comment(content.id, member.id, "hi").await.unwrap();
        store.create_feedback(course.id, student.id, "great").await.unwrap();

        let stats = course_analytics(&store, teacher.id, course.id).await.unwrap();
        assert_eq!(
            stats,
            CourseAnalytics {
                members: 1,
                contents: 1,
                comments: 1,
                feedbacks: 1,
            }
        );

        let err = course_analytics(&store, student.id, course.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "You are not authorized to view this course analytics"
        );
    }

    #[tokio::test]
    async fn contents_render_with_their_course() {
        let store = MemoryStore::default();
        let teacher = store.seed_user("teacher").await;
        let course = store.seed_course(teacher.id, "Rust 101").await;

        let full = create_content(
            &store,
            &course,
            ContentIn {
                name: "  Ownership ".into(),
                description: "borrowing".into(),
                video_url: Some("https://video.example/1".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(full.name, "Ownership");
        assert_eq!(full.course.id, course.id);

        let listed = list_contents(&store, course.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, full.id);

        let err = get_content(&store, 777).await.unwrap_err();
        assert_eq!(err.to_string(), "Content not found");
    }
}
