use serde::{Deserialize, Serialize};

use crate::forms::FieldError;
use crate::models::story_comment::StoryComment;

#[derive(Deserialize)]
pub struct ListCommentsRequest {
    pub story_id: i32,
}

#[derive(Deserialize)]
pub struct AddCommentRequest {
    pub story_id: i32,
    pub title: String,
    pub comment: String,
}

#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub comment_id: i32,
    pub title: String,
    pub comment: String,
}

#[derive(Deserialize)]
pub struct DeleteCommentRequest {
    pub comment_id: i32,
}

// Every comment operation answers with the story's refreshed comment list
#[derive(Serialize)]
pub struct CommentListResponse {
    pub success: bool,
    pub message: String,
    pub field_errors: Vec<FieldError>,
    pub comments: Vec<StoryComment>,
}
