use super::Endpoint;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFolderContents {
    project_id: String,
    folder_id: String,
}

impl ListFolderContents {
    pub fn new(project_id: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            folder_id: folder_id.into(),
        }
    }
}

impl Endpoint for ListFolderContents {
    fn endpoint(&self) -> Cow<'_, str> {
        format!(
            "/data/v1/projects/{}/folders/{}/contents",
            self.project_id, self.folder_id
        )
        .into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFolderPermissions {
    project_id: String,
    folder_id: String,
}

impl ListFolderPermissions {
    pub fn new(project_id: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            folder_id: folder_id.into(),
        }
    }
}

impl Endpoint for ListFolderPermissions {
    fn endpoint(&self) -> Cow<'_, str> {
        format!(
            "/construction/admin/v1/projects/{}/folders/{}/permissions",
            self.project_id, self.folder_id
        )
        .into()
    }
}
