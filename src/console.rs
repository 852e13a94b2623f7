//! Controller wiring: menu actions to store, provider, API client, and view.
//!
//! The console owns the session record and the view; every handler funnels
//! its outcome through the shared alert region, so provider and network
//! failures are always user-visible.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::{BufRead, Write};

#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

#[cfg(not(feature = "colors"))]
use crate::view::color_shim::ColorizeShim as OwoColorize;

use crate::api::ApiClient;
use crate::auth::{self, IdentityProvider};
use crate::dialog::{Dialog, DialogAction, DialogConfig, FormFields};
use crate::models::{Credentials, STATUS_SIGNED_IN, STATUS_SIGNED_OUT, Session};
use crate::store;
use crate::utils::read_trimmed_line;
use crate::view::{AlertKind, REGION_LOADING, View};

#[derive(Debug, Clone, Default)]
pub struct ConsoleOptions {
    /// Overrides the stored API base URL when set.
    pub api_url_override: Option<String>,
    /// Print raw cost records as JSON instead of a table.
    pub json_output: bool,
    /// Echo captured passwords instead of masking them.
    pub show_passwords: bool,
    /// Diagnostics to stderr.
    pub debug: bool,
}

pub struct Console<P: IdentityProvider> {
    pub session: Session,
    pub view: View,
    pub dialog: Dialog,
    provider: P,
    options: ConsoleOptions,
}

impl<P: IdentityProvider> Console<P> {
    pub fn new(provider: P, options: ConsoleOptions) -> Self {
        let mut dialog = Dialog::new(DialogConfig::sign_in());
        dialog.toggle_password_visibility(options.show_passwords);
        Console {
            session: Session::default(),
            view: View::new(),
            dialog,
            provider,
            options,
        }
    }

    fn debug(&self, message: &str) {
        if self.options.debug {
            eprintln!("{}", message.dimmed());
        }
    }

    /// Build a client from the override/stored base URL and the discovered
    /// identity token. Missing configuration is an error here, not a
    /// downstream request failure.
    fn api_client(&self) -> Result<ApiClient> {
        let base_url = match &self.options.api_url_override {
            Some(url) => url.clone(),
            None => {
                store::load_credentials()?
                    .context(
                        "credentials not configured (save the user pool id, application id, and API URL first)",
                    )?
                    .api_url
            }
        };
        let token = auth::find_identity_token()
            .context("no identity token available (sign in first)")?;
        Ok(ApiClient::new(&base_url, &token))
    }

    fn begin_loading(&mut self) {
        self.view.set_visible(REGION_LOADING, true);
        println!("{}", "… contacting backend".dimmed());
    }

    fn end_loading(&mut self) {
        self.view.set_visible(REGION_LOADING, false);
    }

    /// Prompt for the three credential values, prefilled from the store;
    /// an empty submission keeps the current value.
    pub fn configure_credentials(
        &mut self,
        reader: &mut impl BufRead,
        writer: &mut impl Write,
    ) -> Result<()> {
        let existing = store::load_credentials()?.unwrap_or_default();
        writeln!(writer, "── Backend credentials ──")?;

        let mut prompt = |label: &str, current: &str| -> Result<String> {
            if current.is_empty() {
                write!(writer, "{label}: ")?;
            } else {
                write!(writer, "{label} [{current}]: ")?;
            }
            writer.flush()?;
            let entered = read_trimmed_line(reader)?;
            Ok(if entered.is_empty() {
                current.to_string()
            } else {
                entered
            })
        };

        let creds = Credentials {
            user_pool_id: prompt("User pool id", &existing.user_pool_id)?,
            app_id: prompt("Application id", &existing.app_id)?,
            api_url: prompt("API URL", &existing.api_url)?,
        };
        store::save_credentials(&creds)?;
        self.view
            .show_alert(AlertKind::Success, "Success: credentials saved");
        Ok(())
    }

    /// Remove the stored configuration entries.
    pub fn clear_credentials(&mut self) -> Result<()> {
        store::clear_credentials()?;
        self.view
            .show_alert(AlertKind::Success, "Success: credentials cleared");
        Ok(())
    }

    /// Open the sign-in dialog, collect the form, and run the submit path.
    pub fn sign_in(
        &mut self,
        reader: &mut impl BufRead,
        writer: &mut impl Write,
    ) -> Result<()> {
        self.dialog.configure(DialogConfig::sign_in());
        self.dialog.open();
        let fields = self.dialog.read_form(reader, writer)?;
        self.submit_dialog(fields);
        Ok(())
    }

    /// Dispatch the submitted form on the dialog's action tag. The dialog
    /// closes whatever the outcome.
    pub fn submit_dialog(&mut self, fields: FormFields) {
        match self.dialog.config().action {
            DialogAction::SignIn => {
                let success_message = format!("user {} signed in", fields.name);
                match self.provider.sign_in(&fields.name, &fields.password) {
                    Ok(()) => {
                        let mut partial = Map::new();
                        partial.insert("name".into(), Value::String(fields.name.clone()));
                        partial.insert("email".into(), Value::String(String::new()));
                        partial.insert("email_verified".into(), Value::String("true".into()));
                        partial.insert("status".into(), Value::String(STATUS_SIGNED_IN.into()));
                        self.session.update(&partial);
                        self.view.show_alert(
                            AlertKind::Success,
                            format!("Success: {success_message}"),
                        );
                        self.refresh_attributes();
                    }
                    Err(err) => {
                        self.view
                            .show_alert(AlertKind::Danger, format!("{}: {}", err.name, err.message));
                    }
                }
            }
        }
        self.dialog.close();
    }

    /// Fetch profile attributes and project them onto the identity display.
    pub fn refresh_attributes(&mut self) {
        match self.provider.user_attributes() {
            Ok(attrs) => {
                self.session.update(&attrs);
                self.view.update_identity_display(&self.session);
            }
            Err(err) => {
                self.view
                    .show_alert(AlertKind::Danger, format!("{}: {}", err.name, err.message));
            }
        }
    }

    /// Sign the user out, then reset the session and hide every panel —
    /// the console's page-reload.
    pub fn sign_out(&mut self) {
        let message = format!("user {} signed out", self.session.name);
        match self.provider.sign_out() {
            Ok(()) => {
                let mut partial = self.session.to_attributes();
                partial.insert("status".into(), Value::String(STATUS_SIGNED_OUT.into()));
                self.session.update(&partial);
                self.view
                    .show_alert(AlertKind::Success, format!("Success: {message}"));
            }
            Err(err) => {
                self.view
                    .show_alert(AlertKind::Danger, format!("{}: {}", err.name, err.message));
            }
        }
        self.view.hide_all_panels();
        self.session = Session::default();
    }

    /// Invoke the model and put the generated text in the result region.
    pub fn invoke_model(&mut self, model_id: &str, prompt: &str) {
        let client = match self.api_client() {
            Ok(client) => client,
            Err(err) => {
                self.view
                    .show_alert(AlertKind::Danger, format!("Error: {err:#}"));
                return;
            }
        };
        self.debug(&format!("invoke_model: model_id={model_id}"));

        self.begin_loading();
        match client.invoke_model(model_id, prompt) {
            Ok(text) => self.view.set_result(text),
            Err(err) => {
                self.view
                    .show_alert(AlertKind::Danger, format!("Error: {err:#}"));
            }
        }
        self.end_loading();
    }

    /// Fetch and display the cost table.
    pub fn retrieve_costs(&mut self) {
        let client = match self.api_client() {
            Ok(client) => client,
            Err(err) => {
                self.view
                    .show_alert(AlertKind::Danger, format!("Error: {err:#}"));
                return;
            }
        };

        self.begin_loading();
        match client.fetch_cost_records() {
            Ok(records) => {
                self.debug(&format!("cost retrieval: {} records", records.len()));
                if self.options.json_output {
                    match serde_json::to_string_pretty(&records) {
                        Ok(json) => println!("{json}"),
                        Err(err) => {
                            self.view
                                .show_alert(AlertKind::Danger, format!("Error: {err}"));
                        }
                    }
                }
                self.view.set_cost_records(records);
            }
            Err(err) => {
                self.view
                    .show_alert(AlertKind::Danger, format!("Error: {err:#}"));
            }
        }
        self.end_loading();
    }

    /// Trigger the manual cost aggregation and block on the returned
    /// message until the user acknowledges it.
    pub fn track_cost(
        &mut self,
        reader: &mut impl BufRead,
        writer: &mut impl Write,
    ) -> Result<()> {
        let client = match self.api_client() {
            Ok(client) => client,
            Err(err) => {
                self.view
                    .show_alert(AlertKind::Danger, format!("Error: {err:#}"));
                return Ok(());
            }
        };

        self.begin_loading();
        let outcome = client.track_cost_manual();
        self.end_loading();

        match outcome {
            Ok(message) => {
                writeln!(writer, "{message}")?;
                write!(writer, "Press Enter to continue… ")?;
                writer.flush()?;
                read_trimmed_line(reader)?;
            }
            Err(err) => {
                self.view
                    .show_alert(AlertKind::Danger, format!("Error: {err:#}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use crate::view::{REGION_COST_PANEL, REGION_IDENTITY, REGION_INVOKE};
    use serde_json::json;
    use std::io::Cursor;

    struct FakeProvider {
        fail_sign_in: bool,
        email: &'static str,
    }

    impl FakeProvider {
        fn user(email: &'static str) -> Self {
            FakeProvider {
                fail_sign_in: false,
                email,
            }
        }
    }

    impl IdentityProvider for FakeProvider {
        fn sign_in(&self, _username: &str, _password: &str) -> Result<(), AuthError> {
            if self.fail_sign_in {
                Err(AuthError::new(
                    "NotAuthorizedException",
                    "Incorrect username or password.",
                ))
            } else {
                Ok(())
            }
        }

        fn sign_out(&self) -> Result<(), AuthError> {
            Ok(())
        }

        fn user_attributes(&self) -> Result<serde_json::Map<String, Value>, AuthError> {
            let attrs = json!({
                "name": "alice",
                "nickname": "ally",
                "email": self.email,
                "email_verified": "true",
                "custom:tier": "gold",
            });
            match attrs {
                Value::Object(map) => Ok(map),
                _ => unreachable!(),
            }
        }
    }

    fn sign_in(console: &mut Console<FakeProvider>) {
        let mut input = Cursor::new(b"alice\nhunter2\n".to_vec());
        let mut output = Vec::new();
        console.sign_in(&mut input, &mut output).unwrap();
    }

    #[test]
    fn sign_in_success_updates_session_and_routes_panels() {
        let mut console = Console::new(
            FakeProvider::user("alice@example.com"),
            ConsoleOptions::default(),
        );
        sign_in(&mut console);

        assert_eq!(console.session.name, "alice");
        assert_eq!(console.session.email, "alice@example.com");
        assert_eq!(console.session.status, STATUS_SIGNED_IN);
        assert!(console.session.is_signed_in());

        let alert = console.view.alert().unwrap();
        assert_eq!(alert.kind, AlertKind::Success);
        assert_eq!(alert.message, "Success: user alice signed in");

        assert!(console.view.is_visible(REGION_IDENTITY));
        assert!(console.view.is_visible(REGION_INVOKE));
        assert!(!console.view.is_visible(REGION_COST_PANEL));
        assert!(!console.dialog.is_open());
    }

    #[test]
    fn sign_in_admin_routes_to_cost_panel() {
        let mut console = Console::new(
            FakeProvider::user("admin@amazon.com"),
            ConsoleOptions::default(),
        );
        sign_in(&mut console);

        assert!(console.view.is_visible(REGION_COST_PANEL));
        assert!(!console.view.is_visible(REGION_INVOKE));
    }

    #[test]
    fn sign_in_failure_alerts_with_error_name_and_message() {
        let provider = FakeProvider {
            fail_sign_in: true,
            email: "alice@example.com",
        };
        let mut console = Console::new(provider, ConsoleOptions::default());
        sign_in(&mut console);

        let alert = console.view.alert().unwrap();
        assert_eq!(alert.kind, AlertKind::Danger);
        assert_eq!(
            alert.message,
            "NotAuthorizedException: Incorrect username or password."
        );
        assert_eq!(console.session, Session::default());
        assert!(!console.dialog.is_open());
    }

    #[test]
    fn unknown_attribute_keys_never_reach_the_session() {
        let mut console = Console::new(
            FakeProvider::user("alice@example.com"),
            ConsoleOptions::default(),
        );
        sign_in(&mut console);
        // "custom:tier" from the provider is dropped by the merge
        let json = serde_json::to_value(&console.session).unwrap();
        assert!(json.get("custom:tier").is_none());
    }

    #[test]
    #[serial_test::serial]
    fn configure_credentials_round_trips_through_the_store() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        // SAFETY: Test runs serially, no concurrent env access
        unsafe { std::env::set_var("BEDROCK_CONSOLE_DB_PATH", db_path.to_str().unwrap()) };

        let mut console = Console::new(
            FakeProvider::user("alice@example.com"),
            ConsoleOptions::default(),
        );
        let mut input = Cursor::new(b"p1\na1\nhttps://x\n".to_vec());
        let mut output = Vec::new();
        console
            .configure_credentials(&mut input, &mut output)
            .unwrap();

        let stored = crate::store::load_credentials().unwrap().unwrap();
        assert_eq!(stored.user_pool_id, "p1");
        assert_eq!(stored.app_id, "a1");
        assert_eq!(stored.api_url, "https://x");

        // Empty submissions keep the prefilled values
        let mut input = Cursor::new(b"\n\nhttps://y\n".to_vec());
        let mut output = Vec::new();
        console
            .configure_credentials(&mut input, &mut output)
            .unwrap();
        let stored = crate::store::load_credentials().unwrap().unwrap();
        assert_eq!(stored.user_pool_id, "p1");
        assert_eq!(stored.api_url, "https://y");

        console.clear_credentials().unwrap();
        assert!(crate::store::load_credentials().unwrap().is_none());

        unsafe { std::env::remove_var("BEDROCK_CONSOLE_DB_PATH") };
    }

    #[test]
    fn sign_out_resets_session_and_hides_panels() {
        let mut console = Console::new(
            FakeProvider::user("alice@example.com"),
            ConsoleOptions::default(),
        );
        sign_in(&mut console);
        console.sign_out();

        assert_eq!(console.session, Session::default());
        assert!(!console.view.is_visible(REGION_IDENTITY));
        assert!(!console.view.is_visible(REGION_INVOKE));
        assert!(!console.view.is_visible(REGION_COST_PANEL));

        let alert = console.view.alert().unwrap();
        assert_eq!(alert.kind, AlertKind::Success);
        assert_eq!(alert.message, "Success: user alice signed out");
    }
}
