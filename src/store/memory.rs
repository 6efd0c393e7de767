//! In-memory `Store` and `StorageClient` used by the test suite. Mirrors the
//! constraints the SQL schema enforces (unique username/email, one membership
//! per course and user).

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use time::{Date, OffsetDateTime};

use crate::announcements::{repo::AnnouncementRepo, repo_types::Announcement};
use crate::auth::{
    repo::UserRepo,
    repo_types::{NewUser, User},
};
use crate::comments::{repo::CommentRepo, repo_types::Comment};
use crate::courses::{
    repo::CourseRepo,
    repo_types::{Course, CourseAnalytics, CourseContent, CourseMember, CourseSummary, STUDENT_ROLE},
};
use crate::feedback::{repo::FeedbackRepo, repo_types::Feedback};
use crate::storage::StorageClient;
use crate::store::{StoreError, StoreResult};
use crate::users::{
    repo::ProfileRepo,
    repo_types::{ProfileChanges, UserActivity, UserProfile},
};

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<i64, User>,
    profiles: BTreeMap<i64, UserProfile>, // keyed by user id
    courses: BTreeMap<i64, Course>,
    members: BTreeMap<i64, CourseMember>,
    contents: BTreeMap<i64, CourseContent>,
    comments: BTreeMap<i64, Comment>,
    announcements: BTreeMap<i64, Announcement>,
    feedback: BTreeMap<i64, Feedback>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn content_course(&self, content_id: i64) -> Option<i64> {
        self.contents.get(&content_id).map(|c| c.course_id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    photo_writes_fail: AtomicBool,
    row_lookups: AtomicUsize, // get_content + get_member calls
}

impl MemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store lock poisoned")
    }

    /// Makes every later `set_profile_photo` fail like a lost connection.
    pub fn fail_photo_writes(&self) {
        self.photo_writes_fail.store(true, Ordering::SeqCst);
    }

    pub fn row_lookups(&self) -> usize {
        self.row_lookups.load(Ordering::SeqCst)
    }

    /// Inserts a user with a throwaway password hash.
    pub async fn seed_user(&self, username: &str) -> User {
        self.create_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: username.to_string(),
            last_name: "Test".to_string(),
            password_hash: "unused".to_string(),
        })
        .await
        .expect("seed user")
    }

    pub async fn seed_course(&self, teacher_id: i64, name: &str) -> Course {
        self.create_course(teacher_id, name, "seeded", 0)
            .await
            .expect("seed course")
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.tables();
        if t
            .users
            .values()
            .any(|u| u.username == new.username || u.email == new.email)
        {
            return Err(StoreError::Conflict("Username or email"));
        }
        let id = t.next_id();
        let user = User {
            id,
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables().users.get(&id).cloned())
    }
}

#[async_trait]
impl ProfileRepo for MemoryStore {
    async fn get_profile(&self, user_id: i64) -> StoreResult<Option<UserProfile>> {
        Ok(self.tables().profiles.get(&user_id).cloned())
    }

    async fn update_profile(&self, user_id: i64, changes: &ProfileChanges) -> StoreResult<()> {
        let mut t = self.tables();
        if let Some(email) = &changes.email {
            if t.users.values().any(|u| u.id != user_id && &u.email == email) {
                return Err(StoreError::Conflict("Email"));
            }
        }
        if let Some(user) = t.users.get_mut(&user_id) {
            if let Some(v) = &changes.first_name {
                user.first_name = v.clone();
            }
            if let Some(v) = &changes.last_name {
                user.last_name = v.clone();
            }
            if let Some(v) = &changes.email {
                user.email = v.clone();
            }
        }
        let id = t.next_id();
        let profile = t.profiles.entry(user_id).or_insert(UserProfile {
            id,
            user_id,
            handphone: None,
            deskripsi: None,
            foto_profil: None,
        });
        if let Some(v) = &changes.handphone {
            profile.handphone = Some(v.clone());
        }
        if let Some(v) = &changes.deskripsi {
            profile.deskripsi = Some(v.clone());
        }
        Ok(())
    }

    async fn set_profile_photo(&self, user_id: i64, key: &str) -> StoreResult<Option<String>> {
        if self.photo_writes_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut t = self.tables();
        let id = t.next_id();
        let profile = t.profiles.entry(user_id).or_insert(UserProfile {
            id,
            user_id,
            handphone: None,
            deskripsi: None,
            foto_profil: None,
        });
        Ok(profile.foto_profil.replace(key.to_string()))
    }

    async fn courses_joined(&self, user_id: i64) -> StoreResult<Vec<CourseSummary>> {
        let t = self.tables();
        let mut out: Vec<CourseSummary> = t
            .members
            .values()
            .filter(|m| m.user_id == user_id && m.roles == STUDENT_ROLE)
            .filter_map(|m| t.courses.get(&m.course_id))
            .map(|c| CourseSummary {
                id: c.id,
                name: c.name.clone(),
            })
            .collect();
        out.sort_by_key(|c| c.id);
        Ok(out)
    }

    async fn courses_created(&self, user_id: i64) -> StoreResult<Vec<CourseSummary>> {
        Ok(self
            .tables()
            .courses
            .values()
            .filter(|c| c.teacher_id == user_id)
            .map(|c| CourseSummary {
                id: c.id,
                name: c.name.clone(),
            })
            .collect())
    }

    async fn user_activity(&self, user_id: i64) -> StoreResult<UserActivity> {
        let t = self.tables();
        let member_ids: Vec<i64> = t
            .members
            .values()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.id)
            .collect();
        Ok(UserActivity {
            courses_joined: t
                .members
                .values()
                .filter(|m| m.user_id == user_id && m.roles == STUDENT_ROLE)
                .count() as i64,
            courses_created: t.courses.values().filter(|c| c.teacher_id == user_id).count()
                as i64,
            comments_written: t
                .comments
                .values()
                .filter(|c| member_ids.contains(&c.member_id))
                .count() as i64,
        })
    }
}

#[async_trait]
impl CourseRepo for MemoryStore {
    async fn create_course(
        &self,
        teacher_id: i64,
        name: &str,
        description: &str,
        price: i64,
    ) -> StoreResult<Course> {
        let mut t = self.tables();
        let id = t.next_id();
        let now = OffsetDateTime::now_utc();
        let course = Course {
            id,
            name: name.to_string(),
            description: description.to_string(),
            price,
            image: None,
            teacher_id,
            created_at: now,
            updated_at: now,
        };
        t.courses.insert(id, course.clone());
        Ok(course)
    }

    async fn get_course(&self, id: i64) -> StoreResult<Option<Course>> {
        Ok(self.tables().courses.get(&id).cloned())
    }

    async fn list_courses(&self, limit: i64, offset: i64) -> StoreResult<Vec<Course>> {
        Ok(self
            .tables()
            .courses
            .values()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn enroll(&self, course_id: i64, user_id: i64, role: &str) -> StoreResult<bool> {
        let mut t = self.tables();
        if t
            .members
            .values()
            .any(|m| m.course_id == course_id && m.user_id == user_id)
        {
            return Ok(false);
        }
        let id = t.next_id();
        t.members.insert(
            id,
            CourseMember {
                id,
                course_id,
                user_id,
                roles: role.to_string(),
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(true)
    }

    async fn get_member(&self, id: i64) -> StoreResult<Option<CourseMember>> {
        self.row_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables().members.get(&id).cloned())
    }

    async fn find_member(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> StoreResult<Option<CourseMember>> {
        Ok(self
            .tables()
            .members
            .values()
            .find(|m| m.course_id == course_id && m.user_id == user_id)
            .cloned())
    }

    async fn create_content(
        &self,
        course_id: i64,
        name: &str,
        description: &str,
        video_url: Option<&str>,
    ) -> StoreResult<CourseContent> {
        let mut t = self.tables();
        let id = t.next_id();
        let now = OffsetDateTime::now_utc();
        let content = CourseContent {
            id,
            course_id,
            name: name.to_string(),
            description: description.to_string(),
            video_url: video_url.map(str::to_string),
            file_attachment: None,
            created_at: now,
            updated_at: now,
        };
        t.contents.insert(id, content.clone());
        Ok(content)
    }

    async fn get_content(&self, id: i64) -> StoreResult<Option<CourseContent>> {
        self.row_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables().contents.get(&id).cloned())
    }

    async fn list_contents(&self, course_id: i64) -> StoreResult<Vec<CourseContent>> {
        Ok(self
            .tables()
            .contents
            .values()
            .filter(|c| c.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn course_analytics(&self, course_id: i64) -> StoreResult<CourseAnalytics> {
        let t = self.tables();
        Ok(CourseAnalytics {
            members: t.members.values().filter(|m| m.course_id == course_id).count() as i64,
            contents: t.contents.values().filter(|c| c.course_id == course_id).count() as i64,
            comments: t
                .comments
                .values()
                .filter(|c| t.content_course(c.content_id) == Some(course_id))
                .count() as i64,
            feedbacks: t.feedback.values().filter(|f| f.course_id == course_id).count() as i64,
        })
    }
}

#[async_trait]
impl CommentRepo for MemoryStore {
    async fn create_comment(
        &self,
        content_id: i64,
        member_id: i64,
        text: &str,
    ) -> StoreResult<Comment> {
        let mut t = self.tables();
        let id = t.next_id();
        let now = OffsetDateTime::now_utc();
        let comment = Comment {
            id,
            content_id,
            member_id,
            comment: text.to_string(),
            is_approved: false,
            created_at: now,
            updated_at: now,
        };
        t.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        Ok(self.tables().comments.get(&id).cloned())
    }

    async fn approved_comments(&self, content_id: i64) -> StoreResult<Vec<Comment>> {
        Ok(self
            .tables()
            .comments
            .values()
            .filter(|c| c.content_id == content_id && c.is_approved)
            .cloned()
            .collect())
    }

    async fn comments_for_teacher(&self, teacher_id: i64) -> StoreResult<Vec<Comment>> {
        let t = self.tables();
        Ok(t.comments
            .values()
            .filter(|c| {
                t.content_course(c.content_id)
                    .and_then(|course_id| t.courses.get(&course_id))
                    .is_some_and(|course| course.teacher_id == teacher_id)
            })
            .cloned()
            .collect())
    }

    async fn set_comment_approval(
        &self,
        id: i64,
        approved: bool,
    ) -> StoreResult<Option<Comment>> {
        let mut t = self.tables();
        Ok(t.comments.get_mut(&id).map(|c| {
            c.is_approved = approved;
            c.updated_at = OffsetDateTime::now_utc();
            c.clone()
        }))
    }
}

#[async_trait]
impl AnnouncementRepo for MemoryStore {
    async fn create_announcement(
        &self,
        course_id: i64,
        title: &str,
        message: &str,
        show_at: Date,
    ) -> StoreResult<Announcement> {
        let mut t = self.tables();
        let id = t.next_id();
        let row = Announcement {
            id,
            course_id,
            title: title.to_string(),
            message: message.to_string(),
            show_at,
            created_at: OffsetDateTime::now_utc(),
        };
        t.announcements.insert(id, row.clone());
        Ok(row)
    }

    async fn get_announcement(&self, id: i64) -> StoreResult<Option<Announcement>> {
        Ok(self.tables().announcements.get(&id).cloned())
    }

    async fn list_announcements(&self, course_id: i64) -> StoreResult<Vec<Announcement>> {
        Ok(self
            .tables()
            .announcements
            .values()
            .filter(|a| a.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn update_announcement(
        &self,
        id: i64,
        title: &str,
        message: &str,
        show_at: Date,
    ) -> StoreResult<Option<Announcement>> {
        let mut t = self.tables();
        Ok(t.announcements.get_mut(&id).map(|a| {
            a.title = title.to_string();
            a.message = message.to_string();
            a.show_at = show_at;
            a.clone()
        }))
    }

    async fn delete_announcement(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables().announcements.remove(&id).is_some())
    }
}

#[async_trait]
impl FeedbackRepo for MemoryStore {
    async fn create_feedback(
        &self,
        course_id: i64,
        user_id: i64,
        message: &str,
    ) -> StoreResult<Feedback> {
        let mut t = self.tables();
        let id = t.next_id();
        let now = OffsetDateTime::now_utc();
        let row = Feedback {
            id,
            course_id,
            user_id,
            message: message.to_string(),
            created_at: now,
            updated_at: now,
        };
        t.feedback.insert(id, row.clone());
        Ok(row)
    }

    async fn get_feedback(&self, id: i64) -> StoreResult<Option<Feedback>> {
        Ok(self.tables().feedback.get(&id).cloned())
    }

    async fn list_feedback(&self, course_id: i64) -> StoreResult<Vec<Feedback>> {
        Ok(self
            .tables()
            .feedback
            .values()
            .filter(|f| f.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn update_feedback(&self, id: i64, message: &str) -> StoreResult<Option<Feedback>> {
        let mut t = self.tables();
        Ok(t.feedback.get_mut(&id).map(|f| {
            f.message = message.to_string();
            f.updated_at = OffsetDateTime::now_utc();
            f.clone()
        }))
    }

    async fn delete_feedback(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables().feedback.remove(&id).is_some())
    }
}

/// Keeps uploaded objects in a map; presigned URLs point at a fake host.
#[derive(Default)]
pub struct FakeStorage {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl FakeStorage {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .expect("fake storage lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl StorageClient for FakeStorage {
    async fn put_object(&self, key: &str, body: Bytes, _content_type: &str) -> anyhow::Result<()> {
        self.objects
            .lock()
            .expect("fake storage lock poisoned")
            .insert(key.to_string(), body);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.objects
            .lock()
            .expect("fake storage lock poisoned")
            .remove(key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, _seconds: u64) -> anyhow::Result<String> {
        Ok(format!("https://fake.local/{}", key))
    }
}
