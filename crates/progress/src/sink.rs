//! Render sinks: where formatted progress lines end up

use console::Term;
use std::io;

/// Destination for rendered progress text
///
/// `render` receives every progress line; `finish` receives the one-line
/// completion summary. Sinks run on whichever task triggered the render, so
/// they must be `Send`.
pub trait RenderSink: Send {
    /// Show a progress line, replacing the previous one if the sink supports it
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn render(&mut self, line: &str) -> io::Result<()>;

    /// Show the completion summary below the last progress line
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn finish(&mut self, line: &str) -> io::Result<()> {
        self.render(line)
    }
}

/// Terminal sink backed by `console::Term`
#[derive(Debug)]
pub struct TermSink {
    term: Term,
    overwrite: bool,
    drawn: bool,
}

impl TermSink {
    /// Sink writing to `term`; with `overwrite` the last line is redrawn in place
    #[must_use]
    pub fn new(term: Term, overwrite: bool) -> Self {
        Self {
            term,
            overwrite,
            drawn: false,
        }
    }

    /// In-place sink on stdout, degrading to plain lines when stdout is not a tty
    #[must_use]
    pub fn stdout() -> Self {
        let term = Term::stdout();
        let overwrite = term.is_term();
        Self::new(term, overwrite)
    }

    /// Sink on stdout that prints every render as a new line
    #[must_use]
    pub fn lines() -> Self {
        Self::new(Term::stdout(), false)
    }
}

impl RenderSink for TermSink {
    fn render(&mut self, line: &str) -> io::Result<()> {
        if self.overwrite && self.drawn {
            self.term.clear_last_lines(1)?;
        }
        self.term.write_line(line)?;
        self.drawn = true;
        Ok(())
    }

    fn finish(&mut self, line: &str) -> io::Result<()> {
        self.term.write_line(line)?;
        self.drawn = false;
        Ok(())
    }
}

/// Adapter turning a closure into a sink, the equivalent of a custom log function
pub struct FnSink<F>(pub F);

impl<F> RenderSink for FnSink<F>
where
    F: FnMut(&str) + Send,
{
    fn render(&mut self, line: &str) -> io::Result<()> {
        (self.0)(line);
        Ok(())
    }
}

impl<F> std::fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}
