pub mod hierarchy;
pub mod oauth_client;
pub mod resilient;
pub mod session_store;

pub use hierarchy::HierarchyService;
pub use oauth_client::OAuthClient;
pub use resilient::{with_refresh, TokenRefresher};
pub use session_store::SessionStore;
