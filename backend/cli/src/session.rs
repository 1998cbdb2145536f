//! Local detection sessions for the `detect` and `session` commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use platelog_core::media::detect_mime_type;
use platelog_core::{
    detect_plate, export_xlsx, DetectionOutcome, ImageUpload, PlateError, SessionLog,
    VisionProvider, EXPORT_FILE_NAME,
};
use platelog_logging::{EventLogger, SessionEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::terminal_output::{note_error, note_info, note_success, note_warn, records_table};

/// One interactive session: a provider and the log it fills.
pub struct DetectionSession {
    id: String,
    provider: Arc<dyn VisionProvider>,
    log: SessionLog,
}

impl DetectionSession {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        EventLogger::log_event(&id, SessionEvent::Started);
        Self { id, provider, log: SessionLog::new() }
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Read an image file and run one detection against the session log.
    pub async fn detect_file(&mut self, path: &Path) -> Result<DetectionOutcome, PlateError> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image: {}", path.display()))?;
        let image = ImageUpload::new(bytes, detect_mime_type(path))?;

        let result = detect_plate(self.provider.as_ref(), &mut self.log, &image).await;
        let event = match &result {
            Ok(DetectionOutcome::Detected { record }) => SessionEvent::Detected {
                record_id: record.id().to_string(),
                plate_text: record.plate_text().to_string(),
            },
            Ok(DetectionOutcome::NoPlate) => SessionEvent::NoPlate,
            Err(e) => SessionEvent::Failed { error_msg: e.to_string() },
        };
        EventLogger::log_event(&self.id, event);
        result
    }

    /// Write the log as XLSX to `path`. Returns the number of records written.
    pub async fn export_to(&self, path: &Path) -> Result<usize, PlateError> {
        let bytes = export_xlsx(&self.log)?;
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Failed to write export: {}", path.display()))?;
        EventLogger::log_event(&self.id, SessionEvent::Exported { rows: self.log.len() });
        Ok(self.log.len())
    }

    /// End the session; the log is dropped with it.
    pub fn end(self) {
        EventLogger::log_event(&self.id, SessionEvent::Ended { records: self.log.len() });
    }

    /// Detect, then print the outcome. Failures are reported, never propagated.
    pub async fn detect_and_report(&mut self, path: &Path) {
        match self.detect_file(path).await {
            Ok(DetectionOutcome::Detected { record }) => {
                note_success(&format!("Plate '{}' added ({})", record.plate_text(), record.id()));
            }
            Ok(DetectionOutcome::NoPlate) => {
                note_warn(&format!("No legible plate detected in {}", path.display()));
            }
            Err(PlateError::Inference { message, .. }) => {
                note_error(&format!("The vision service failed: {message}"));
            }
            Err(e) => note_error(&e.to_string()),
        }
    }

    /// Export, then print the outcome.
    pub async fn export_and_report(&self, path: &Path) {
        match self.export_to(path).await {
            Ok(rows) => note_success(&format!("Exported {rows} records to {}", path.display())),
            Err(PlateError::EmptyLog) => note_info("No plates detected yet; nothing to export"),
            Err(e) => note_error(&e.to_string()),
        }
    }
}

/// A line typed in the interactive session.
#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Detect(PathBuf),
    List,
    Export(PathBuf),
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    match head {
        "" => ShellCommand::Empty,
        "list" | "ls" => ShellCommand::List,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        "export" if rest.is_empty() => ShellCommand::Export(PathBuf::from(EXPORT_FILE_NAME)),
        "export" => ShellCommand::Export(PathBuf::from(rest)),
        "detect" if !rest.is_empty() => ShellCommand::Detect(PathBuf::from(rest)),
        _ => ShellCommand::Detect(PathBuf::from(line)),
    }
}

const HELP: &str = "\
Commands:
  <image path>        detect the plate in an image (also: detect <path>)
  list                show the session log
  export [path]       write the log as XLSX (default: matriculas.xlsx)
  quit                end the session";

/// Drive a session from line input until `quit` or end of input.
pub async fn run_interactive<R>(session: &mut DetectionSession, input: R) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    note_info("Type an image path to detect its plate, or 'help'.");
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => break,
            ShellCommand::List if session.log().is_empty() => {
                note_info("No plates detected yet");
            }
            ShellCommand::List => print!("{}", records_table(session.log())),
            ShellCommand::Export(path) => session.export_and_report(&path).await,
            ShellCommand::Detect(path) => session.detect_and_report(&path).await,
        }
    }
    Ok(())
}
