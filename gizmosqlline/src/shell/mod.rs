//! The interactive SQL shell the launcher delegates to.
//!
//! Line editing and history come from `rustyline`, result tables from
//! `comfy-table` and statement execution from the ADBC Flight SQL driver.
//! This module only wires them together: it parses the command line, reads
//! statements, and dispatches `!` commands.

pub mod args;
pub mod command;
pub mod render;

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::Parser;
use gizmosqlline_client::{
    ConnectionUrl, Credentials, FlightSQLClient, FlightSqlDriver, StatementResult,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

use self::args::ShellArgs;
use self::command::{split_statements, Command, StatementBuffer, COMMAND_HELP};
use self::render::{render_result, rows_affected, rows_selected, OutputFormat};
use crate::config::LauncherConfig;
use crate::error::{ShellError, ShellResult};

/// How a shell run ended. The ordinal becomes the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Normal end of session.
    Ok = 0,
    /// Bad command line, or usage was requested.
    Args = 1,
    /// A batch (`-e`/`-f`) command failed.
    Other = 2,
}

impl Status {
    pub fn ordinal(self) -> i32 {
        self as i32
    }
}

pub trait Shell {
    /// Run a session with `args` (without the program name). `input` replaces
    /// the terminal when given.
    fn begin(
        &mut self,
        args: &[OsString],
        input: Option<Box<dyn BufRead>>,
        save_history: bool,
    ) -> Status;
}

/// Opens sessions for `!connect` and `-u`.
pub trait Connector {
    fn connect(
        &self,
        url: &ConnectionUrl,
        credentials: &Credentials,
    ) -> anyhow::Result<Box<dyn SqlSession>>;
}

/// An open connection as seen by the shell.
pub trait SqlSession {
    fn run_statement(&mut self, sql: &str) -> anyhow::Result<StatementResult>;
}

impl Connector for Arc<FlightSqlDriver> {
    fn connect(
        &self,
        url: &ConnectionUrl,
        credentials: &Credentials,
    ) -> anyhow::Result<Box<dyn SqlSession>> {
        let client = FlightSQLClient::connect(self, url, credentials)?;
        Ok(Box::new(client))
    }
}

impl SqlSession for FlightSQLClient {
    fn run_statement(&mut self, sql: &str) -> anyhow::Result<StatementResult> {
        FlightSQLClient::run_statement(self, sql)
    }
}

#[derive(Debug, Clone)]
pub struct ShellSettings {
    /// Used as `argv[0]` for argument parsing and in the prompt.
    pub program: String,
    pub history_file: Option<PathBuf>,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            program: "gizmosqlline".to_string(),
            history_file: None,
        }
    }
}

impl ShellSettings {
    pub fn from_config(config: &LauncherConfig) -> Self {
        Self {
            history_file: config.history_path(),
            ..Self::default()
        }
    }
}

struct Session {
    label: String,
    conn: Box<dyn SqlSession>,
}

enum Flow {
    Continue,
    Quit,
}

pub struct SqlShell<C> {
    connector: C,
    settings: ShellSettings,
    session: Option<Session>,
    output_format: OutputFormat,
    out: Box<dyn Write>,
    err: Box<dyn Write>,
}

impl<C: Connector> SqlShell<C> {
    pub fn new(connector: C, settings: ShellSettings) -> Self {
        Self::with_output(
            connector,
            settings,
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }

    pub fn with_output(
        connector: C,
        settings: ShellSettings,
        out: Box<dyn Write>,
        err: Box<dyn Write>,
    ) -> Self {
        Self {
            connector,
            settings,
            session: None,
            output_format: OutputFormat::Table,
            out,
            err,
        }
    }

    fn run(
        &mut self,
        args: &[OsString],
        input: Option<Box<dyn BufRead>>,
        save_history: bool,
    ) -> Status {
        let argv = std::iter::once(OsString::from(&self.settings.program))
            .chain(args.iter().cloned());
        let opts = match ShellArgs::try_parse_from(argv) {
            Ok(opts) => opts,
            Err(e) if e.kind() == ErrorKind::DisplayVersion => {
                let _ = write!(self.out, "{e}");
                return Status::Ok;
            }
            Err(e) => {
                let _ = write!(self.err, "{e}");
                return Status::Args;
            }
        };
        if opts.help {
            let _ = writeln!(self.out, "{}", ShellArgs::usage());
            let _ = writeln!(self.out, "Commands:\n{COMMAND_HELP}");
            return Status::Args;
        }
        self.output_format = opts.output_format;

        if let Some(url) = &opts.url {
            let credentials = Credentials::new(opts.user.clone(), opts.password.clone());
            if let Err(e) = self.connect(url, &credentials) {
                self.report(&e);
                if opts.is_batch() {
                    return Status::Other;
                }
            }
        }

        if !opts.execute.is_empty() {
            for statement in opts.execute.iter().flat_map(|text| split_statements(text)) {
                match self.dispatch(&statement) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => {
                        self.report(&e);
                        return Status::Other;
                    }
                }
            }
            return Status::Ok;
        }

        if let Some(path) = &opts.file {
            return match self.run_script(path) {
                Ok(_) => Status::Ok,
                Err(e) => {
                    self.report(&e);
                    Status::Other
                }
            };
        }

        match input {
            Some(reader) => self.run_reader(reader),
            None => self.run_interactive(save_history),
        }
    }

    fn connect(&mut self, url: &str, credentials: &Credentials) -> ShellResult<()> {
        let parsed = ConnectionUrl::parse(url)?;
        let conn = self.connector.connect(&parsed, credentials)?;
        if self.session.take().is_some() {
            debug!("replacing existing connection");
        }
        debug!(endpoint = %parsed, "connected");
        let label = url.split('?').next().unwrap_or(url).to_string();
        let _ = writeln!(self.out, "Connected to {label}");
        self.session = Some(Session { label, conn });
        Ok(())
    }

    fn dispatch(&mut self, line: &str) -> ShellResult<Flow> {
        match Command::parse(line)? {
            Command::Connect {
                url,
                user,
                password,
            } => self.connect(&url, &Credentials::new(user, password))?,
            Command::Close => {
                let session = self.session.take().ok_or(ShellError::NotConnected)?;
                writeln!(self.out, "Closed connection to {}", session.label)?;
            }
            Command::Run(path) => return self.run_script(&path),
            Command::OutputFormat(format) => self.output_format = format,
            Command::Help => writeln!(self.out, "{COMMAND_HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Sql(sql) => self.execute_sql(&sql)?,
        }
        Ok(Flow::Continue)
    }

    fn execute_sql(&mut self, sql: &str) -> ShellResult<()> {
        let session = self.session.as_mut().ok_or(ShellError::NotConnected)?;
        let start = Instant::now();
        debug!(sql, "executing");
        match session.conn.run_statement(sql)? {
            StatementResult::Query(result) => {
                let rendered = render_result(&result, self.output_format)?;
                if !rendered.is_empty() {
                    writeln!(self.out, "{rendered}")?;
                }
                writeln!(self.out, "{}", rows_selected(result.total_rows, start.elapsed()))?;
            }
            StatementResult::Update(result) => {
                writeln!(self.out, "{}", rows_affected(result.rows_affected, start.elapsed()))?;
            }
        }
        Ok(())
    }

    /// Stops at the first failing statement.
    fn run_script(&mut self, path: &Path) -> ShellResult<Flow> {
        let file = File::open(path).map_err(|e| {
            ShellError::Client(anyhow::anyhow!("cannot open {}: {e}", path.display()))
        })?;
        let mut buffer = StatementBuffer::default();
        for line in BufReader::new(file).lines() {
            for statement in buffer.push_line(&line?) {
                if let Flow::Quit = self.dispatch(&statement)? {
                    return Ok(Flow::Quit);
                }
            }
        }
        match buffer.finish() {
            Some(statement) => self.dispatch(&statement),
            None => Ok(Flow::Continue),
        }
    }

    /// Like the terminal loop, but reading from `reader`; errors are
    /// reported and the session goes on.
    fn run_reader(&mut self, reader: Box<dyn BufRead>) -> Status {
        let mut buffer = StatementBuffer::default();
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.report(&ShellError::Io(e));
                    return Status::Other;
                }
            };
            for statement in buffer.push_line(&line) {
                if self.dispatch_reporting(&statement) {
                    return Status::Ok;
                }
            }
        }
        if let Some(statement) = buffer.finish() {
            self.dispatch_reporting(&statement);
        }
        Status::Ok
    }

    fn run_interactive(&mut self, save_history: bool) -> Status {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                let _ = writeln!(self.err, "Error: failed to initialize line editor: {e}");
                return Status::Other;
            }
        };
        let history_file = self.settings.history_file.clone().filter(|_| save_history);
        if let Some(path) = &history_file {
            if path.exists() {
                let _ = rl.load_history(path);
            }
        }

        let mut buffer = StatementBuffer::default();
        let mut interrupt_count = 0;
        let status = loop {
            let prompt = self.prompt(buffer.is_empty());
            match rl.readline(&prompt) {
                Ok(line) => {
                    interrupt_count = 0;
                    let mut quit = false;
                    for statement in buffer.push_line(&line) {
                        let _ = rl.add_history_entry(statement.as_str());
                        if self.dispatch_reporting(&statement) {
                            quit = true;
                            break;
                        }
                    }
                    if quit {
                        break Status::Ok;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    buffer.clear();
                    interrupt_count += 1;
                    if interrupt_count >= 2 {
                        break Status::Ok;
                    }
                    let _ = writeln!(self.out, "^C (press Ctrl-C again to exit)");
                }
                Err(ReadlineError::Eof) => break Status::Ok,
                Err(e) => {
                    let _ = writeln!(self.err, "Error reading input: {e}");
                    break Status::Other;
                }
            }
        };

        if let Some(path) = &history_file {
            if let Err(e) = rl.save_history(path) {
                warn!(path = %path.display(), error = %e, "failed to save history");
            }
        }
        status
    }

    /// Returns true when the command asks to leave the shell.
    fn dispatch_reporting(&mut self, statement: &str) -> bool {
        match self.dispatch(statement) {
            Ok(Flow::Quit) => true,
            Ok(Flow::Continue) => false,
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    fn prompt(&self, fresh: bool) -> String {
        let label = match &self.session {
            Some(session) => format!("0: {}", session.label),
            None => self.settings.program.clone(),
        };
        if fresh {
            format!("{label}> ")
        } else {
            format!("{}> ", ".".repeat(label.len()))
        }
    }

    fn report(&mut self, e: &ShellError) {
        let _ = writeln!(self.err, "Error: {e}");
        let _ = self.err.flush();
    }
}

impl<C: Connector> Shell for SqlShell<C> {
    fn begin(
        &mut self,
        args: &[OsString],
        input: Option<Box<dyn BufRead>>,
        save_history: bool,
    ) -> Status {
        let status = self.run(args, input, save_history);
        self.session = None;
        let _ = self.out.flush();
        let _ = self.err.flush();
        status
    }
}
