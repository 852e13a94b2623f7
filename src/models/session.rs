use serde::Serialize;
use serde_json::{Map, Value};

/// Session status once authentication succeeded.
pub const STATUS_SIGNED_IN: &str = "Signed In";
/// Session status after an explicit sign-out.
pub const STATUS_SIGNED_OUT: &str = "Signed Out";

/// Display attributes of the currently authenticated user.
///
/// One instance lives in the console for the lifetime of the process; it is
/// created empty, merged into on every successful sign-in/out or attribute
/// fetch, and reset to defaults when the user signs out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub name: String,
    pub nickname: String,
    pub email: String,
    /// Boolean-like string as delivered by the identity provider.
    pub email_verified: String,
    pub status: String,
}

impl Session {
    /// Merge a partial attribute object into the session.
    ///
    /// Only the five known fields are ever written; any other key in
    /// `partial` is dropped without error. Non-string values are stored in
    /// their JSON display form.
    pub fn update(&mut self, partial: &Map<String, Value>) {
        for (key, value) in partial {
            let slot = match key.as_str() {
                "name" => &mut self.name,
                "nickname" => &mut self.nickname,
                "email" => &mut self.email,
                "email_verified" => &mut self.email_verified,
                "status" => &mut self.status,
                _ => continue,
            };
            *slot = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.status == STATUS_SIGNED_IN
    }

    /// Snapshot of the current identity as an attribute object, suitable for
    /// feeding back through `update`.
    pub fn to_attributes(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".into(), Value::String(self.name.clone()));
        map.insert("nickname".into(), Value::String(self.nickname.clone()));
        map.insert("email".into(), Value::String(self.email.clone()));
        map.insert(
            "email_verified".into(),
            Value::String(self.email_verified.clone()),
        );
        map.insert("status".into(), Value::String(self.status.clone()));
        map
    }
}
