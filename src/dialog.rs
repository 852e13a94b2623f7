//! Configuration-driven form dialog.
//!
//! One shared dialog serves every authentication action: the configuration
//! decides which fields are visible, the title, and the submit button label.
//! The label is display-only; dispatch always goes through the explicit
//! `DialogAction` tag.

use std::io::{self, BufRead, Write};

use crate::utils::{masked, read_trimmed_line};

/// Action attached to a dialog configuration. Sign-in is the only wired
/// action; the confirmation-code field exists in the form model but no
/// action consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    SignIn,
}

/// Which fields the dialog shows, plus its title and button label.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogConfig {
    pub show_name: bool,
    pub show_email: bool,
    pub show_password: bool,
    /// Reveals the new-password field and relabels the password prompt
    /// as "Current Password".
    pub show_new_password: bool,
    pub show_confirmation_code: bool,
    pub button_label: String,
    pub title: String,
    pub action: DialogAction,
}

impl DialogConfig {
    /// The authenticate-user preset: name and password only.
    pub fn sign_in() -> Self {
        DialogConfig {
            show_name: true,
            show_email: false,
            show_password: true,
            show_new_password: false,
            show_confirmation_code: false,
            button_label: "Sign In".to_string(),
            title: "Authenticate user".to_string(),
            action: DialogAction::SignIn,
        }
    }

    fn password_label(&self) -> &'static str {
        if self.show_new_password {
            "Current Password"
        } else {
            "Password"
        }
    }
}

/// Values captured from the visible fields; hidden fields stay empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub password: String,
    pub new_password: String,
    pub confirmation_code: String,
}

/// The shared dialog instance.
#[derive(Debug, Clone)]
pub struct Dialog {
    config: DialogConfig,
    open: bool,
    /// When true, captured secrets are re-displayed as bullets. Terminal
    /// input itself is echoed as typed, so masking is best-effort and only
    /// governs how the dialog prints the value back.
    mask_secrets: bool,
}

impl Dialog {
    pub fn new(config: DialogConfig) -> Self {
        Dialog {
            config,
            open: false,
            mask_secrets: true,
        }
    }

    pub fn configure(&mut self, config: DialogConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Mirror a "show password" checkbox into the masking mode.
    pub fn toggle_password_visibility(&mut self, checked: bool) {
        self.mask_secrets = !checked;
    }

    fn echo_secret<'a>(&self, value: &'a str) -> std::borrow::Cow<'a, str> {
        if self.mask_secrets {
            std::borrow::Cow::Owned(masked(value))
        } else {
            std::borrow::Cow::Borrowed(value)
        }
    }

    /// Prompt for the visible fields in order and collect their values.
    pub fn read_form(
        &self,
        reader: &mut impl BufRead,
        writer: &mut impl Write,
    ) -> io::Result<FormFields> {
        writeln!(writer, "── {} ──", self.config.title)?;
        let mut fields = FormFields::default();

        if self.config.show_name {
            write!(writer, "User name: ")?;
            writer.flush()?;
            fields.name = read_trimmed_line(reader)?;
        }
        if self.config.show_email {
            write!(writer, "Email: ")?;
            writer.flush()?;
            fields.email = read_trimmed_line(reader)?;
        }
        if self.config.show_password {
            write!(writer, "{}: ", self.config.password_label())?;
            writer.flush()?;
            fields.password = read_trimmed_line(reader)?;
            writeln!(
                writer,
                "{} set to {}",
                self.config.password_label(),
                self.echo_secret(&fields.password)
            )?;
        }
        if self.config.show_new_password {
            write!(writer, "New Password: ")?;
            writer.flush()?;
            fields.new_password = read_trimmed_line(reader)?;
            writeln!(
                writer,
                "New Password set to {}",
                self.echo_secret(&fields.new_password)
            )?;
        }
        if self.config.show_confirmation_code {
            write!(writer, "Confirmation code: ")?;
            writer.flush()?;
            fields.confirmation_code = read_trimmed_line(reader)?;
        }

        writeln!(writer, "[{}]", self.config.button_label)?;
        Ok(fields)
    }
}
