/// Command-line configuration. Flags pair with `BEDROCK_CONSOLE_*`
/// environment variables where persistence across shells is useful.
#[derive(clap::Parser, Debug)]
pub struct Args {
    /// Override the stored API base URL
    #[arg(long, env = "BEDROCK_CONSOLE_API_URL")]
    pub api_url: Option<String>,

    /// Default model id offered for invocations
    #[arg(
        long,
        env = "BEDROCK_CONSOLE_MODEL_ID",
        default_value = "anthropic.claude-3-sonnet-20240229-v1:0"
    )]
    pub model_id: String,

    /// Emit cost records as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Echo captured passwords instead of masking them
    #[arg(long)]
    pub show_passwords: bool,

    /// Debug mode: show request diagnostics on stderr
    #[arg(long, env = "BEDROCK_CONSOLE_DEBUG")]
    pub debug: bool,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }
}
