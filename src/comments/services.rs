use anyhow::anyhow;
use tracing::{info, warn};

use crate::comments::dto::{CommentOut, ModerationResponse};
use crate::comments::repo_types::Comment;
use crate::courses::repo_types::Course;
use crate::courses::services::CourseViews;
use crate::error::ApiError;
use crate::store::Store;

async fn render(store: &dyn Store, comments: Vec<Comment>) -> Result<Vec<CommentOut>, ApiError> {
    let mut views = CourseViews::new(store);
    let mut out = Vec::with_capacity(comments.len());
    for c in comments {
        out.push(CommentOut {
            id: c.id,
            content: views.content_by_id(c.content_id).await?,
            member: views.member_by_id(c.member_id).await?,
            comment: c.comment,
            is_approved: c.is_approved,
            created_at: c.created_at,
            updated_at: c.updated_at,
        });
    }
    Ok(out)
}

pub async fn approved_comments(
    store: &dyn Store,
    content_id: i64,
) -> Result<Vec<CommentOut>, ApiError> {
    let comments = store.approved_comments(content_id).await?;
    render(store, comments).await
}

pub async fn moderation_list(
    store: &dyn Store,
    teacher_id: i64,
) -> Result<Vec<CommentOut>, ApiError> {
    let comments = store.comments_for_teacher(teacher_id).await?;
    render(store, comments).await
}

/// Posts a comment as the caller's membership in the content's course.
pub async fn post_comment(
    store: &dyn Store,
    caller_id: i64,
    content_id: i64,
    text: &str,
) -> Result<CommentOut, ApiError> {
    let content = store
        .get_content(content_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Content not found"))?;
    let Some(member) = store.find_member(content.course_id, caller_id).await? else {
        warn!(content_id, user_id = caller_id, "comment by non-member");
        return Err(ApiError::forbidden("You are not a member of this course"));
    };
    let comment = store.create_comment(content.id, member.id, text.trim()).await?;
    info!(comment_id = comment.id, content_id, "comment posted");
    render(store, vec![comment])
        .await?
        .pop()
        .ok_or_else(|| anyhow!("rendered comment list was empty").into())
}

/// Loads a comment together with its course, requiring the caller to teach it.
pub async fn moderated_comment(
    store: &dyn Store,
    caller_id: i64,
    comment_id: i64,
) -> Result<(Comment, Course), ApiError> {
    let comment = store
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    let content = store
        .get_content(comment.content_id)
        .await?
        .ok_or_else(|| anyhow!("content {} referenced but missing", comment.content_id))?;
    let course = store
        .get_course(content.course_id)
        .await?
        .ok_or_else(|| anyhow!("course {} referenced but missing", content.course_id))?;
    if course.teacher_id != caller_id {
        warn!(comment_id, user_id = caller_id, "moderation by non-teacher");
        return Err(ApiError::forbidden(
            "You are not authorized to moderate this comment",
        ));
    }
    Ok((comment, course))
}

pub async fn apply_moderation(
    store: &dyn Store,
    comment: &Comment,
    course: &Course,
    approved: bool,
) -> Result<ModerationResponse, ApiError> {
    let updated = store
        .set_comment_approval(comment.id, approved)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    info!(comment_id = updated.id, approved, "comment moderated");
    Ok(ModerationResponse {
        message: "Comment moderation updated.".into(),
        comment_id: updated.id,
        course_id: course.id,
        is_approved: updated.is_approved,
    })
}
