//! Terminal reporting for the CLI, written to stderr.

use std::fmt::Display;

use console::{Style, Term};

/// Width of the right-aligned status label.
const LABEL_WIDTH: usize = 10;

/// Status-line reporter: `  Rendered styleguide/index.html`.
pub(crate) struct Output {
    term: Term,
    label: Style,
    warn: Style,
    error: Style,
    done: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().cyan().bold(),
            warn: Style::new().yellow().bold(),
            error: Style::new().red(),
            done: Style::new().green().bold(),
        }
    }

    /// Progress line with a highlighted label.
    pub(crate) fn status(&self, label: &str, msg: impl Display) {
        self.labelled(&self.label, label, msg);
    }

    /// Final line of a successful command.
    pub(crate) fn finished(&self, msg: impl Display) {
        self.labelled(&self.done, "Finished", msg);
    }

    pub(crate) fn warning(&self, msg: impl Display) {
        self.labelled(&self.warn, "Warning", msg);
    }

    /// Unlabelled error line (red).
    pub(crate) fn error(&self, msg: impl Display) {
        let _ = self
            .term
            .write_line(&self.error.apply_to(msg.to_string()).to_string());
    }

    fn labelled(&self, style: &Style, label: &str, msg: impl Display) {
        let label = format!("{label:>LABEL_WIDTH$}");
        let _ = self
            .term
            .write_line(&format!("{} {msg}", style.apply_to(label)));
    }
}
