use crate::endpoints::{
    folders::{ListFolderContents, ListFolderPermissions},
    hubs::{ListHubs, ListProjects},
    projects::ListTopFolders,
};

#[derive(Default)]
pub struct HubRepository;

impl HubRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn list(&self) -> ListHubs {
        ListHubs::new()
    }

    pub fn projects(&self, hub_id: impl Into<String>) -> ListProjects {
        ListProjects::new(hub_id)
    }
}

pub struct ProjectRepository {
    project_id: String,
}

impl ProjectRepository {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }

    pub fn top_folders(&self) -> ListTopFolders {
        ListTopFolders::new(self.project_id.clone())
    }

    pub fn folder(&self, folder_id: impl Into<String>) -> FolderRepository {
        FolderRepository {
            project_id: self.project_id.clone(),
            folder_id: folder_id.into(),
        }
    }
}

pub struct FolderRepository {
    project_id: String,
    folder_id: String,
}

impl FolderRepository {
    pub fn contents(&self) -> ListFolderContents {
        ListFolderContents::new(self.project_id.clone(), self.folder_id.clone())
    }

    pub fn permissions(&self) -> ListFolderPermissions {
        ListFolderPermissions::new(self.project_id.clone(), self.folder_id.clone())
    }
}
