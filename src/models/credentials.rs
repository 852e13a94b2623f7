/// Backend configuration supplied by the user and persisted locally.
///
/// All three values are opaque strings; presence is the only thing the
/// console checks before using them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    /// Cognito user pool identifier.
    pub user_pool_id: String,
    /// Cognito application (client) identifier.
    pub app_id: String,
    /// Base URL of the REST API, without a trailing slash requirement.
    pub api_url: String,
}
