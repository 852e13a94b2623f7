//! Terminal view controller.
//!
//! The console mirrors the regions of the original operator page: identity
//! cells, the model-invocation panel, the admin-only cost panels, a shared
//! alert area, and a transient loading marker. Region visibility is plain
//! state here; rendering is split into pure `build_*` functions plus thin
//! printers so tests can assert on the exact output.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::env;

#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

// Provide a no-op color shim when "colors" feature is disabled
#[cfg(not(feature = "colors"))]
pub mod color_shim {
    use std::fmt::{self, Display, Formatter};

    #[derive(Clone)]
    pub struct Plain(pub String);

    impl Display for Plain {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    pub trait ColorizeShim {
        fn as_str(&self) -> &str;

        fn red(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn green(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn cyan(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn bold(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
        fn dimmed(&self) -> Plain {
            Plain(self.as_str().to_string())
        }
    }

    impl ColorizeShim for &str {
        fn as_str(&self) -> &str {
            self
        }
    }
    impl ColorizeShim for String {
        fn as_str(&self) -> &str {
            self.as_str()
        }
    }
    impl ColorizeShim for Plain {
        fn as_str(&self) -> &str {
            &self.0
        }
    }
}

#[cfg(not(feature = "colors"))]
use color_shim::ColorizeShim as OwoColorize;

use crate::models::{CostRecord, Session};
use crate::utils::truncate_cell;

pub const REGION_IDENTITY: &str = "identity";
pub const REGION_INVOKE: &str = "invoke-panel";
pub const REGION_RESULT: &str = "invoke-result";
pub const REGION_COST_PANEL: &str = "cost-panel";
pub const REGION_COST_CALCULATE: &str = "cost-calculate";
pub const REGION_COST_TABLE: &str = "cost-table";
pub const REGION_LOADING: &str = "loading";
pub const REGION_ALERT: &str = "alert";

const ALL_REGIONS: [&str; 8] = [
    REGION_IDENTITY,
    REGION_INVOKE,
    REGION_RESULT,
    REGION_COST_PANEL,
    REGION_COST_CALCULATE,
    REGION_COST_TABLE,
    REGION_LOADING,
    REGION_ALERT,
];

/// Administrator address that routes to the cost panels instead of the
/// invocation panel. Override with `BEDROCK_CONSOLE_ADMIN_EMAIL`.
static ADMIN_EMAIL: Lazy<String> = Lazy::new(|| {
    env::var("BEDROCK_CONSOLE_ADMIN_EMAIL")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "admin@amazon.com".to_string())
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct IdentityCells {
    name: String,
    nickname: String,
    email: String,
}

/// Region visibility plus the content projected into the displayed cells.
#[derive(Debug, Clone)]
pub struct View {
    regions: BTreeMap<&'static str, bool>,
    alert: Option<Alert>,
    identity: IdentityCells,
    result: String,
    cost_records: Vec<CostRecord>,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    /// Every region starts hidden, as on a fresh page load.
    pub fn new() -> Self {
        View {
            regions: ALL_REGIONS.iter().map(|r| (*r, false)).collect(),
            alert: None,
            identity: IdentityCells::default(),
            result: String::new(),
            cost_records: Vec::new(),
        }
    }

    /// Toggle a named region. Unknown region ids are ignored.
    pub fn set_visible(&mut self, region_id: &str, visible: bool) {
        if let Some(slot) = self.regions.get_mut(region_id) {
            *slot = visible;
        }
    }

    pub fn is_visible(&self, region_id: &str) -> bool {
        self.regions.get(region_id).copied().unwrap_or(false)
    }

    /// Replace any current alert with a styled message and reveal the region.
    pub fn show_alert(&mut self, kind: AlertKind, message: impl Into<String>) {
        self.alert = Some(Alert {
            kind,
            message: message.into(),
        });
        self.set_visible(REGION_ALERT, true);
    }

    /// Clear and hide the alert region.
    pub fn close_alert(&mut self) {
        self.alert = None;
        self.set_visible(REGION_ALERT, false);
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn set_result(&mut self, text: impl Into<String>) {
        self.result = text.into();
        self.set_visible(REGION_RESULT, true);
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn set_cost_records(&mut self, records: Vec<CostRecord>) {
        self.cost_records = records;
        self.set_visible(REGION_COST_TABLE, true);
    }

    pub fn cost_records(&self) -> &[CostRecord] {
        &self.cost_records
    }

    /// Project the session onto the identity cells and route the panels.
    ///
    /// The administrator sees the cost panels; everyone else sees the model
    /// invocation panel. The two reveal states are mutually exclusive.
    pub fn update_identity_display(&mut self, session: &Session) {
        self.identity = IdentityCells {
            name: session.name.clone(),
            nickname: session.nickname.clone(),
            email: session.email.clone(),
        };
        self.set_visible(REGION_IDENTITY, true);

        let is_admin = session.email == *ADMIN_EMAIL;
        self.set_visible(REGION_INVOKE, !is_admin);
        self.set_visible(REGION_COST_PANEL, is_admin);
        self.set_visible(REGION_COST_CALCULATE, is_admin);
    }

    /// Hide the identity cells and every operation panel, as after sign-out.
    pub fn hide_all_panels(&mut self) {
        for region in [
            REGION_IDENTITY,
            REGION_INVOKE,
            REGION_RESULT,
            REGION_COST_PANEL,
            REGION_COST_CALCULATE,
            REGION_COST_TABLE,
        ] {
            self.set_visible(region, false);
        }
    }

    /// Print every currently visible region to stdout.
    pub fn render(&self) {
        if self.is_visible(REGION_ALERT)
            && let Some(alert) = &self.alert
        {
            println!("{}", build_alert_line(alert));
        }
        if self.is_visible(REGION_IDENTITY) {
            println!("{}", build_identity_block(&self.identity));
        }
        if self.is_visible(REGION_RESULT) && !self.result.is_empty() {
            println!("{}", "Generated text".bold());
            println!("{}", self.result);
        }
        if self.is_visible(REGION_COST_TABLE) {
            println!("{}", build_cost_table(&self.cost_records));
        }
    }
}

fn plain_output() -> bool {
    env::var("NO_COLOR").is_ok()
}

/// One styled line for the alert region.
pub fn build_alert_line(alert: &Alert) -> String {
    let (marker, line) = match alert.kind {
        AlertKind::Success => ("✔", format!("✔ {}", alert.message).green().to_string()),
        AlertKind::Danger => ("✖", format!("✖ {}", alert.message).red().bold().to_string()),
    };
    if plain_output() {
        format!("{marker} {}", alert.message)
    } else {
        line
    }
}

fn build_identity_block(identity: &IdentityCells) -> String {
    format!(
        "User:     {}\nNickname: {}\nEmail:    {}",
        identity.name, identity.nickname, identity.email
    )
}

const COST_HEADERS: [&str; 7] = [
    "Name",
    "Model",
    "Input Tokens",
    "Output Tokens",
    "Input Cost",
    "Output Cost",
    "Date",
];

fn record_cells(record: &CostRecord) -> [&str; 7] {
    [
        &record.name,
        &record.model_id,
        &record.input_tokens,
        &record.output_tokens,
        &record.input_cost,
        &record.output_cost,
        &record.date,
    ]
}

fn available_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(120)
}

/// Render the cost table clamped to the current terminal width.
///
/// The header and rule are always emitted, so an empty record set still
/// yields well-formed table output.
pub fn build_cost_table(records: &[CostRecord]) -> String {
    build_cost_table_with_width(records, available_width())
}

/// Width-parameterized variant used by `build_cost_table` and the tests.
pub fn build_cost_table_with_width(records: &[CostRecord], total_width: usize) -> String {
    let mut widths: [usize; 7] = COST_HEADERS.map(str::len);
    for record in records {
        for (w, cell) in widths.iter_mut().zip(record_cells(record)) {
            *w = (*w).max(cell.chars().count());
        }
    }

    // Separators cost 2 chars per gap; shrink the widest column (in
    // practice the model id) until the row fits.
    let row_width = |ws: &[usize; 7]| ws.iter().sum::<usize>() + 2 * (ws.len() - 1);
    while row_width(&widths) > total_width {
        let widest = widths
            .iter()
            .enumerate()
            .max_by_key(|(_, w)| **w)
            .map(|(i, _)| i)
            .unwrap_or(0);
        if widths[widest] <= 4 {
            break;
        }
        widths[widest] -= 1;
    }

    let format_row = |cells: [&str; 7]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{:<w$}", truncate_cell(cell, w)))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&format_row(COST_HEADERS));
    out.push('\n');
    out.push_str(&"-".repeat(row_width(&widths).min(total_width)));
    for record in records {
        out.push('\n');
        out.push_str(&format_row(record_cells(record)));
    }
    out
}
