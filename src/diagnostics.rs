//! Prefixed diagnostic output.
//!
//! Diagnostics go to standard output, never standard error, so that build
//! front ends which only capture stdout still show why a build stopped.

use std::io::{
    self,
    Write,
};

use crate::error::ResolveError;

/// Prefix of every diagnostic line.
pub const PREFIX: &str = "vcversioner:";

/// Write each line to `out` behind [`PREFIX`].
pub fn write_lines<W, I, S>(out: &mut W, lines: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        writeln!(out, "{} {}", PREFIX, line.as_ref())?;
    }
    Ok(())
}

/// Write the diagnostics for `err` to `out`.
pub fn write_report<W: Write>(out: &mut W, err: &ResolveError) -> io::Result<()> {
    write_lines(out, err.diagnostic_lines())
}

/// Print the diagnostics for `err` to standard output.
pub fn report(err: &ResolveError) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    // Nothing sensible is left to do if stdout itself is gone.
    let _ = write_report(&mut out, err).and_then(|()| out.flush());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_line_is_prefixed() {
        let mut out = Vec::new();
        write_lines(&mut out, ["one", "two"]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "vcversioner: one\nvcversioner: two\n"
        );
    }

    #[test]
    fn test_report_renders_vcs_output() {
        let err = ResolveError::VcsUnavailableNoFallback {
            args: vec![],
            vcs_output: Some("fatal: whatever".to_string()),
        };
        let mut out = Vec::new();
        write_report(&mut out, &err).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "vcversioner: [] failed.\n\
             vcversioner: -- VCS output follows --\n\
             vcversioner: fatal: whatever\n"
        );
    }
}
