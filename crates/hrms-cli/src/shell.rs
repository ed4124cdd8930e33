//! Interactive mode: one `ApiClient` serves every command, so repeated reads
//! within the freshness window come from the response cache.

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use hrms_core::ApiClient;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::commands::{self, Command};
use crate::describe_error;

#[derive(Parser, Debug)]
#[command(name = "hrms", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

pub async fn run(client: &ApiClient) -> Result<()> {
    println!("HRMS shell on {}. Type 'help' for commands, 'exit' to quit.", client.base_url());
    run_lines(client, BufReader::new(tokio::io::stdin())).await
}

/// Read and execute commands until `exit`, `quit` or end of input.
async fn run_lines<R: AsyncBufRead + Unpin>(client: &ApiClient, input: R) -> Result<()> {
    let mut lines = input.lines();
    loop {
        print!("hrms> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let words = match split_words(&line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("Error: {}", e);
                continue;
            }
        };

        match words.first().map(String::as_str) {
            None => continue,
            Some("exit") | Some("quit") => break,
            _ => {}
        }

        let parsed = match ShellLine::try_parse_from(&words) {
            Ok(parsed) => parsed,
            Err(e) => {
                let _ = e.print();
                continue;
            }
        };

        if matches!(parsed.command, Command::Shell) {
            println!("Already in the shell.");
            continue;
        }

        debug!(command = ?parsed.command, "Running shell command");
        if let Err(e) = commands::execute(client, parsed.command).await {
            eprintln!("Error: {}", describe_error(&e));
        }
    }

    Ok(())
}

/// Split a line on whitespace, keeping double-quoted runs together.
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if has_word {
        words.push(current);
    }
    Ok(words)
}
