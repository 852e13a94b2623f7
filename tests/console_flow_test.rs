//! Console flows driven through the public API with a fake identity
//! provider and a canned backend.

use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::thread;

use serde_json::{Map, Value, json};

use bedrock_console::auth::{AuthError, IdentityProvider};
use bedrock_console::console::{Console, ConsoleOptions};
use bedrock_console::view::{
    REGION_COST_PANEL, REGION_COST_TABLE, REGION_INVOKE, REGION_LOADING, build_cost_table_with_width,
};

struct FakeProvider {
    email: &'static str,
}

impl IdentityProvider for FakeProvider {
    fn sign_in(&self, _username: &str, _password: &str) -> Result<(), AuthError> {
        Ok(())
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }

    fn user_attributes(&self) -> Result<Map<String, Value>, AuthError> {
        match json!({ "name": "alice", "nickname": "ally", "email": self.email }) {
            Value::Object(map) => Ok(map),
            _ => unreachable!(),
        }
    }
}

/// Serve one request with a canned JSON body and return the base URL.
fn serve_once(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        // Consume the whole request (headers plus declared body) before
        // answering, so the canned response is never cut off by a reset.
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            request.extend_from_slice(&buf[..n]);
            if let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&request[..header_end]).to_string();
                let content_length = headers
                    .lines()
                    .find_map(|line| {
                        let (key, value) = line.split_once(':')?;
                        if key.trim().eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);
                if request.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
    });

    format!("http://{addr}")
}

fn console_with(email: &'static str, base_url: String) -> Console<FakeProvider> {
    let options = ConsoleOptions {
        api_url_override: Some(base_url),
        ..ConsoleOptions::default()
    };
    Console::new(FakeProvider { email }, options)
}

fn sign_in(console: &mut Console<FakeProvider>) {
    let mut input = Cursor::new(b"alice\nhunter2\n".to_vec());
    let mut output = Vec::new();
    console.sign_in(&mut input, &mut output).unwrap();
}

fn with_token<F: FnOnce()>(f: F) {
    // SAFETY: Test runs serially, no concurrent env access
    unsafe { std::env::set_var("BEDROCK_CONSOLE_ID_TOKEN", "tok-test") };
    f();
    unsafe { std::env::remove_var("BEDROCK_CONSOLE_ID_TOKEN") };
}

#[test]
#[serial_test::serial]
fn invoke_flow_puts_generated_text_in_the_result_region() {
    with_token(|| {
        let base_url = serve_once(r#"[{"generated_text":"hello"}]"#);
        let mut console = console_with("alice@example.com", base_url);
        sign_in(&mut console);
        assert!(console.view.is_visible(REGION_INVOKE));

        console.invoke_model("anthropic.claude-3-sonnet-20240229-v1:0", "ping");
        assert_eq!(console.view.result(), "hello");
        assert!(!console.view.is_visible(REGION_LOADING));
    });
}

#[test]
#[serial_test::serial]
fn cost_flow_reveals_the_table_for_the_admin() {
    with_token(|| {
        let base_url = serve_once(
            r#"{"body":[
                {"name":"t1","model_id":"m1","input_tokens":"10","output_tokens":"20",
                 "input_cost":"0.1","output_cost":"0.2","date":"2024-03-01"},
                {"name":"t2","model_id":"m2","input_tokens":"30","output_tokens":"40",
                 "input_cost":"0.3","output_cost":"0.4","date":"2024-03-02"}
            ]}"#,
        );
        let mut console = console_with("admin@amazon.com", base_url);
        sign_in(&mut console);
        assert!(console.view.is_visible(REGION_COST_PANEL));
        assert!(!console.view.is_visible(REGION_INVOKE));

        console.retrieve_costs();
        assert!(console.view.is_visible(REGION_COST_TABLE));
        assert_eq!(console.view.cost_records().len(), 2);
        assert!(!console.view.is_visible(REGION_LOADING));

        let table = build_cost_table_with_width(console.view.cost_records(), 200);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("t1"));
        assert!(lines[3].starts_with("t2"));
    });
}

#[test]
#[serial_test::serial]
fn track_cost_blocks_on_the_returned_message() {
    with_token(|| {
        let base_url = serve_once(r#"{"body":"Calculation Finished!"}"#);
        let mut console = console_with("admin@amazon.com", base_url);
        sign_in(&mut console);

        let mut input = Cursor::new(b"\n".to_vec());
        let mut output = Vec::new();
        console.track_cost(&mut input, &mut output).unwrap();

        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("Calculation Finished!"));
        assert!(rendered.contains("Press Enter to continue"));
    });
}

#[test]
#[serial_test::serial]
fn missing_token_is_promoted_to_a_danger_alert() {
    // Point the store at an empty temp db so no host state leaks in
    let temp_dir = tempfile::TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    // SAFETY: Test runs serially, no concurrent env access
    unsafe { std::env::set_var("BEDROCK_CONSOLE_DB_PATH", db_path.to_str().unwrap()) };

    let base_url = serve_once("[]");
    let mut console = console_with("alice@example.com", base_url);
    sign_in(&mut console);

    console.invoke_model("anthropic.claude-3-sonnet-20240229-v1:0", "ping");
    let alert = console.view.alert().unwrap();
    assert!(alert.message.contains("no identity token"));

    unsafe { std::env::remove_var("BEDROCK_CONSOLE_DB_PATH") };
}
