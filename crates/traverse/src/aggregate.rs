//! Folding outcomes into diagnostics and an exit status

use selutils_types::Outcome;
use std::io::Write;

/// Renders outcomes for a command line front end.
///
/// Every failure produces one `<program>: <message>` line on the error
/// writer. Successes are reported on the output writer only when verbose.
pub struct ResultAggregator<O: Write, E: Write> {
    program: String,
    verbose: bool,
    out: O,
    err: E,
    succeeded: usize,
    failed: usize,
}

impl<O: Write, E: Write> ResultAggregator<O, E> {
    pub fn new(program: impl Into<String>, out: O, err: E) -> Self {
        Self {
            program: program.into(),
            verbose: false,
            out,
            err,
            succeeded: 0,
            failed: 0,
        }
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Account for one outcome and write its line, if any.
    ///
    /// Write errors are ignored.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome.diagnostic() {
            Some(message) => {
                self.failed += 1;
                let _ = writeln!(self.err, "{}: {message}", self.program);
            }
            None => {
                self.succeeded += 1;
                if self.verbose {
                    let _ = writeln!(
                        self.out,
                        "changing security context of '{}'",
                        outcome.path.display()
                    );
                }
            }
        }
    }

    /// Write a diagnostic that is not tied to an outcome, such as a usage error.
    pub fn report(&mut self, message: &str) {
        self.failed += 1;
        let _ = writeln!(self.err, "{}: {message}", self.program);
    }

    #[must_use]
    pub fn overall_success(&self) -> bool {
        self.failed == 0
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// 0 when everything succeeded, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.overall_success())
    }

    /// Flush both writers and hand them back.
    pub fn into_inner(mut self) -> (O, E) {
        let _ = self.out.flush();
        let _ = self.err.flush();
        (self.out, self.err)
    }
}
