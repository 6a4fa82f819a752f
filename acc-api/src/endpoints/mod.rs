pub mod folders;
pub mod hubs;
pub mod projects;

use std::borrow::Cow;

/// A read-only resource under the provider's base API URL.
pub trait Endpoint {
    fn endpoint(&self) -> Cow<'_, str>;

    /// Query parameters for the first page only.
    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}
