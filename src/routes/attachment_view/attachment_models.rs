use serde::{Deserialize, Serialize};

use crate::models::story_attachment::StoryAttachment;

// The upload body is the raw file content; the name rides in the query string
#[derive(Deserialize)]
pub struct UploadQuery {
    pub name: String,
}

#[derive(Serialize)]
pub struct UploadAttachmentResponse {
    pub success: bool,
    pub message: String,
    pub uuid: Option<String>,
}

#[derive(Deserialize)]
pub struct ListAttachmentsRequest {
    pub story_id: i32,
}

#[derive(Serialize)]
pub struct AttachmentListResponse {
    pub success: bool,
    pub message: String,
    pub attachments: Vec<StoryAttachment>,
}

#[derive(Deserialize)]
pub struct DeleteAttachmentRequest {
    pub story_id: i32,
    pub uuid: String,
}

#[derive(Serialize)]
pub struct DeleteAttachmentResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct DownloadQuery {
    pub file: String,
}
