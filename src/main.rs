use anyhow::Result;
use std::io::{self, BufRead, Write};

#[cfg(feature = "colors")]
use owo_colors::OwoColorize;

#[cfg(not(feature = "colors"))]
use bedrock_console::view::color_shim::ColorizeShim as OwoColorize;

use bedrock_console::auth::StoredTokenProvider;
use bedrock_console::cli::Args;
use bedrock_console::console::{Console, ConsoleOptions};
use bedrock_console::utils::read_trimmed_line;

fn print_menu() {
    println!();
    println!("{}", "Bedrock Admin Console".bold());
    println!("  1) Configure credentials");
    println!("  2) Clear credentials");
    println!("  3) Sign in");
    println!("  4) Sign out");
    println!("  5) Invoke model");
    println!("  6) Retrieve cost records");
    println!("  7) Track cost manually");
    println!("  c) Close alert");
    println!("  q) Quit");
}

/// Read a menu selection; `None` means end of input.
fn read_choice(reader: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let options = ConsoleOptions {
        api_url_override: args.api_url.clone(),
        json_output: args.json,
        show_passwords: args.show_passwords,
        debug: args.debug,
    };
    let mut console = Console::new(StoredTokenProvider::default(), options);

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();

    loop {
        print_menu();
        write!(writer, "{} ", "❯".cyan())?;
        writer.flush()?;
        let Some(choice) = read_choice(&mut reader)? else {
            break;
        };

        match choice.as_str() {
            "1" => console.configure_credentials(&mut reader, &mut writer)?,
            "2" => console.clear_credentials()?,
            "3" => console.sign_in(&mut reader, &mut writer)?,
            "4" => console.sign_out(),
            "5" => {
                write!(writer, "Model id [{}]: ", args.model_id)?;
                writer.flush()?;
                let entered = read_trimmed_line(&mut reader)?;
                let model_id = if entered.is_empty() {
                    args.model_id.clone()
                } else {
                    entered
                };
                write!(writer, "Prompt: ")?;
                writer.flush()?;
                let prompt = read_trimmed_line(&mut reader)?;
                console.invoke_model(&model_id, &prompt);
            }
            "6" => console.retrieve_costs(),
            "7" => console.track_cost(&mut reader, &mut writer)?,
            "c" | "C" => console.view.close_alert(),
            "q" | "Q" | "quit" | "exit" => break,
            "" => continue,
            other => println!("{}", format!("unrecognized selection: {other}").dimmed()),
        }

        console.view.render();
    }

    Ok(())
}
