use super::Endpoint;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTopFolders {
    project_id: String,
}

impl ListTopFolders {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }
}

impl Endpoint for ListTopFolders {
    fn endpoint(&self) -> Cow<'_, str> {
        format!("/data/v1/projects/{}/topFolders", self.project_id).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_folders_endpoint() {
        assert_eq!(
            ListTopFolders::new("b.proj").endpoint(),
            "/data/v1/projects/b.proj/topFolders"
        );
    }
}
