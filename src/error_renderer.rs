//! Error rendering using ariadne
//!
//! Diagnostics point at a function and, when the program tree carries source
//! text and spans, at the offending range of that source.

use crate::{Diagnostic, Error, Program, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

/// Render an error with formatting to stderr
///
/// `program` is the tree that failed to compile; its file sources, if any,
/// are shown next to the message.
pub fn render_error(error: &Error, program: Option<&Program>) {
    render_error_to_writer(error, program, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(
    error: &Error,
    program: Option<&Program>,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    render_error_to_writer(error, program, writer, true)
}

/// Render an error to a String (useful for tests, logs, etc.)
pub fn render_error_to_string(error: &Error, program: Option<&Program>) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, program, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error, program: Option<&Program>) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, program, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    program: Option<&Program>,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Compilation { diagnostics } => {
            render_diagnostics(program, diagnostics, writer, use_color)
        }
        Error::Decode(msg) => writeln!(writer, "Could not decode program: {}", msg),
        Error::Api(msg) => writeln!(writer, "API error: {}", msg),
    }
}

/// Source text of the file a diagnostic points into.
///
/// Files are looked up by name, preferring the package named by the
/// function key (`pkg.Name`).
fn find_source<'p>(program: &'p Program, diag: &Diagnostic) -> Option<&'p str> {
    let file = diag.file.as_deref()?;
    let package = diag
        .function
        .as_deref()
        .and_then(|f| f.split('.').next());
    let candidates: Vec<_> = program
        .packages
        .iter()
        .flat_map(|p| p.files.iter().map(move |f| (p, f)))
        .filter(|(_, f)| f.name == file && f.source.is_some())
        .collect();
    candidates
        .iter()
        .find(|(p, _)| Some(p.name.as_str()) == package)
        .or_else(|| candidates.first())
        .and_then(|(_, f)| f.source.as_deref())
}

fn render_diagnostics(
    program: Option<&Program>,
    diagnostics: &[Diagnostic],
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    for diag in diagnostics {
        let source = program.and_then(|p| find_source(p, diag));
        let span = diag.span.start..diag.span.end;
        match source {
            Some(source) if span.end <= source.len() && !span.is_empty() => {
                render_with_source(diag, source, span, writer, use_color)?
            }
            _ => render_plain(diag, writer)?,
        }
    }

    Ok(())
}

fn render_with_source(
    diag: &Diagnostic,
    source: &str,
    span: std::ops::Range<usize>,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
    };
    let file = diag.file.as_deref().unwrap_or("<unknown>");

    let mut report = Report::build(kind, (file, span.clone()))
        .with_message(&diag.message)
        .with_config(ariadne::Config::default().with_color(use_color));

    if let Some(code) = &diag.code {
        report = report.with_code(code);
    }

    let label = match &diag.function {
        Some(function) => format!("in {}", function),
        None => diag.message.clone(),
    };
    report = report.with_label(
        Label::new((file, span))
            .with_message(label)
            .with_color(colors.next()),
    );

    if let Some(help) = &diag.help {
        report = report.with_help(help);
    }

    report.finish().write((file, Source::from(source)), &mut *writer)
}

/// One-line form used when there is no source to point into.
fn render_plain(diag: &Diagnostic, writer: &mut dyn Write) -> std::io::Result<()> {
    write!(writer, "{}", diag.severity)?;
    if let Some(code) = &diag.code {
        write!(writer, "[{}]", code)?;
    }
    write!(writer, ": {}", diag.message)?;
    match (&diag.function, &diag.file) {
        (Some(function), Some(file)) => writeln!(writer, " (in {}, {})", function, file)?,
        (Some(function), None) => writeln!(writer, " (in {})", function)?,
        _ => writeln!(writer)?,
    }
    if let Some(help) = &diag.help {
        writeln!(writer, "  help: {}", help)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::builder::*;
    use crate::tree::{Span, Type};
    use crate::{CompileOptions, compile};

    fn failing_program(source: Option<&str>) -> Program {
        let mut program = main_program(
            vec![],
            vec![func(
                "Main",
                vec![],
                vec![Type::Int],
                vec![ret(vec![ident("missing", Type::Int).with_span(Span::new(26, 33))])],
            )],
        );
        program.packages[0].files[0].source = source.map(String::from);
        program
    }

    #[test]
    fn test_render_with_source() {
        let source = "func Main() int {\n\treturn missing\n}\n";
        let program = failing_program(Some(source));
        let err = compile(&program, &CompileOptions::default()).unwrap_err();

        let output = render_error_to_string_no_color(&err, Some(&program));
        assert!(output.contains("unknown local variable `missing`"));
        assert!(output.contains("E0105"));
        assert!(output.contains("return missing"));
        assert!(output.contains("in main.Main"));
        assert!(output.lines().count() > 1);
    }

    #[test]
    fn test_render_without_source() {
        let program = failing_program(None);
        let err = compile(&program, &CompileOptions::default()).unwrap_err();

        let output = render_error_to_string_no_color(&err, Some(&program));
        assert_eq!(
            output,
            "error[E0105]: unknown local variable `missing` (in main.Main, main.go)\n"
        );
    }

    #[test]
    fn test_render_missing_entry_help() {
        let program = main_program(vec![], vec![]);
        let err = compile(&program, &CompileOptions::default()).unwrap_err();

        let output = render_error_to_string_no_color(&err, None);
        assert!(output.starts_with("error[E0101]: could not find entry function `Main`"));
        assert!(output.contains("help: declare `func Main()` in the root package"));
    }

    #[test]
    fn test_render_decode_error() {
        let output = render_error_to_string_no_color(&Error::Decode("eof".into()), None);
        assert_eq!(output, "Could not decode program: eof\n");
    }
}
