//! Result reporting
//!
//! The hosting tool reads one JSON object from stdout: `{"changed": ...}` on
//! success, `{"failed": true, "msg": ...}` on failure.

use std::io::Write;

use serde::Serialize;

use crate::errors::ReconcileError;
use crate::models::RemoteAppState;

/// Receives the single result of an invocation
pub trait ReportSink {
    fn succeed(
        &mut self,
        changed: bool,
        final_state: Option<&RemoteAppState>,
    ) -> Result<(), ReconcileError>;

    fn fail(&mut self, message: &str) -> Result<(), ReconcileError>;
}

#[derive(Serialize)]
struct SuccessReport<'a> {
    changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    app: Option<&'a RemoteAppState>,
}

#[derive(Serialize)]
struct FailureReport<'a> {
    failed: bool,
    changed: bool,
    msg: &'a str,
}

/// Writes reports as single JSON lines
pub struct JsonReportSink<W: Write> {
    out: W,
}

impl<W: Write> JsonReportSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit<T: Serialize>(&mut self, report: &T) -> Result<(), ReconcileError> {
        serde_json::to_writer(&mut self.out, report)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

impl JsonReportSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ReportSink for JsonReportSink<W> {
    fn succeed(
        &mut self,
        changed: bool,
        final_state: Option<&RemoteAppState>,
    ) -> Result<(), ReconcileError> {
        self.emit(&SuccessReport {
            changed,
            app: final_state,
        })
    }

    fn fail(&mut self, message: &str) -> Result<(), ReconcileError> {
        self.emit(&FailureReport {
            failed: true,
            changed: false,
            msg: message,
        })
    }
}
