//! Built-in SQL prompt, used when no external client is installed

use std::time::Duration;

use colored::Colorize;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio_postgres::config::SslMode;
use tokio_postgres::{Client, SimpleQueryMessage};

use crate::client::{Credentials, InstanceRecord};
use crate::error::{Error, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_QUERY: &str = "SELECT 1";
const COLUMN_SEPARATOR: &str = " | ";
const REPL_HINT: &str = "Type 'exit' or 'quit' to leave.";

/// What to do with one line of input
#[derive(Debug, PartialEq, Eq)]
pub enum LineAction<'a> {
    Skip,
    Exit,
    Execute(&'a str),
}

pub fn classify_line(line: &str) -> LineAction<'_> {
    let line = line.trim();
    match line {
        "" => LineAction::Skip,
        "exit" | "quit" => LineAction::Exit,
        sql => LineAction::Execute(sql),
    }
}

pub fn format_header(columns: &[&str]) -> String {
    columns.join(COLUMN_SEPARATOR)
}

pub fn format_row(values: &[Option<&str>]) -> String {
    values
        .iter()
        .map(|v| v.unwrap_or("NULL"))
        .collect::<Vec<_>>()
        .join(COLUMN_SEPARATOR)
}

/// Trailer printed when a statement completes
pub fn command_summary(count: u64, returned_rows: bool) -> String {
    match (returned_rows, count) {
        (true, 1) => "(1 row)".to_string(),
        (true, n) => format!("({} rows)", n),
        (false, n) => format!("OK {}", n),
    }
}

/// Open an encrypted session and prove it works before returning it.
///
/// The server certificate is not verified, matching `sslmode=require`.
pub async fn connect(
    instance: &InstanceRecord,
    creds: &Credentials,
    database: &str,
) -> Result<Client> {
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(|e| Error::ConnectionFailed(format!("TLS setup: {}", e)))?;

    let mut pg = tokio_postgres::Config::new();
    pg.host(&instance.host)
        .port(instance.port)
        .user(&creds.username)
        .password(creds.password())
        .dbname(database)
        .ssl_mode(SslMode::Require)
        .connect_timeout(CONNECT_TIMEOUT);

    let (client, connection) = pg
        .connect(MakeTlsConnector::new(connector))
        .await
        .map_err(|e| Error::ConnectionFailed(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::debug!("Database connection closed: {}", e);
        }
    });

    client
        .simple_query(PROBE_QUERY)
        .await
        .map_err(|e| Error::ConnectionFailed(format!("liveness probe: {}", e)))?;
    log::debug!("Connected to {}:{}", instance.host, instance.port);

    Ok(client)
}

/// Read-eval-print loop over an open session
pub async fn run_repl(client: &Client, database: &str) -> Result<()> {
    let mut editor =
        DefaultEditor::new().map_err(|e| Error::Launch(format!("line editor: {}", e)))?;
    let prompt = format!("{}=> ", database);

    println!("{}", REPL_HINT.dimmed());

    loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                let sql = match classify_line(&line) {
                    LineAction::Skip => continue,
                    LineAction::Exit => break,
                    LineAction::Execute(sql) => sql,
                };
                let _ = editor.add_history_entry(sql);

                match client.simple_query(sql).await {
                    Ok(messages) => print_messages(&messages),
                    Err(e) => eprintln!("{} {}", "ERROR:".red().bold(), e),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(Error::Launch(format!("line editor: {}", e))),
        }
    }

    Ok(())
}

fn print_messages(messages: &[SimpleQueryMessage]) {
    let mut header_shown = false;
    let mut returned_rows = false;

    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
                println!("{}", format_header(&names).bold());
                header_shown = true;
                returned_rows = true;
            }
            SimpleQueryMessage::Row(row) => {
                if !header_shown {
                    let names: Vec<&str> = row.columns().iter().map(|c| c.name()).collect();
                    println!("{}", format_header(&names).bold());
                    header_shown = true;
                }
                let values: Vec<Option<&str>> = (0..row.len()).map(|i| row.get(i)).collect();
                println!("{}", format_row(&values));
                returned_rows = true;
            }
            SimpleQueryMessage::CommandComplete(count) => {
                println!("{}", command_summary(*count, returned_rows).dimmed());
                header_shown = false;
                returned_rows = false;
            }
            _ => {}
        }
    }
}
