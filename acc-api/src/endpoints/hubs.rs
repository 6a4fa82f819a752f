use super::Endpoint;
use std::borrow::Cow;

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ListHubs;

impl ListHubs {
    pub fn new() -> Self {
        Self
    }
}

impl Endpoint for ListHubs {
    fn endpoint(&self) -> Cow<'_, str> {
        "/project/v2/hubs".into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListProjects {
    hub_id: String,
}

impl ListProjects {
    pub fn new(hub_id: impl Into<String>) -> Self {
        Self {
            hub_id: hub_id.into(),
        }
    }
}

impl Endpoint for ListProjects {
    fn endpoint(&self) -> Cow<'_, str> {
        format!("/project/v2/hubs/{}/projects", self.hub_id).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_endpoints() {
        assert_eq!(ListHubs::new().endpoint(), "/project/v2/hubs");
        assert_eq!(
            ListProjects::new("b.123").endpoint(),
            "/project/v2/hubs/b.123/projects"
        );
    }
}
