//! Converts [`WeaveError`] into miette reports.
//!
//! A [`weave_parser::error::ParseError`] may hold several diagnostics (the
//! lexer reports every bad token it meets); each one becomes its own report
//! with the source attached for snippets.

use miette::{LabeledSpan, MietteDiagnostic, Report, SourceSpan};

use weave::WeaveError;
use weave_parser::error::Diagnostic;

fn span_to_miette(span: weave_parser::Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

fn from_diagnostic(diag: &Diagnostic) -> MietteDiagnostic {
    let labels = diag.labels().iter().map(|label| {
        let message = Some(label.message().to_string());
        let span = span_to_miette(label.span());
        if label.is_primary() {
            LabeledSpan::new_primary_with_span(message, span)
        } else {
            LabeledSpan::new_with_span(message, span)
        }
    });

    let mut report = MietteDiagnostic::new(diag.message()).with_labels(labels);
    if let Some(code) = diag.code() {
        report = report.with_code(code.to_string());
    }
    if let Some(help) = diag.help() {
        report = report.with_help(help);
    }
    report
}

/// One report per parse diagnostic, or a single one for any other error.
pub fn to_reports(err: &WeaveError) -> Vec<Report> {
    let code = match err {
        WeaveError::Parse { err, src } => {
            return err
                .diagnostics()
                .iter()
                .map(|diag| Report::new(from_diagnostic(diag)).with_source_code(src.clone()))
                .collect();
        }
        WeaveError::Io(_) => "weave::io",
        WeaveError::Model(_) => "weave::model",
        WeaveError::Config(_) => "weave::config",
    };
    vec![Report::new(
        MietteDiagnostic::new(err.to_string()).with_code(code),
    )]
}

#[cfg(test)]
mod tests {
    use miette::Diagnostic as _;
    use weave::ModelError;
    use weave_parser::{
        Span,
        error::{ErrorCode, ParseError},
    };

    use super::*;

    #[test]
    fn test_syntax_error_keeps_code_and_help() {
        let source = "type A {\n  id ID\n}";
        let parse_err = weave_parser::parse_schema(source).unwrap_err();
        let err = WeaveError::new_parse_error(parse_err, source);

        let reports = to_reports(&err);
        assert_eq!(reports.len(), 1);

        let report = &reports[0];
        assert_eq!(report.to_string(), "expected `:`, found `ID`");
        assert_eq!(report.code().unwrap().to_string(), "E100");
        assert_eq!(
            report.help().unwrap().to_string(),
            "while parsing field definition"
        );
        assert!(report.source_code().is_some());
        let labels: Vec<_> = report.labels().unwrap().collect();
        assert_eq!(labels[0].offset(), 14);
        assert_eq!(labels[0].len(), 2);
    }

    #[test]
    fn test_every_lexer_diagnostic_is_reported() {
        let diags = vec![
            Diagnostic::error("unterminated string")
                .with_code(ErrorCode::E001)
                .with_label(Span::new(0..5), "here"),
            Diagnostic::error("unexpected character")
                .with_code(ErrorCode::E002)
                .with_label(Span::new(10..11), "here"),
        ];
        let err = WeaveError::new_parse_error(ParseError::from(diags), "source code here");

        let reports = to_reports(&err);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].code().unwrap().to_string(), "E001");
        assert_eq!(reports[1].to_string(), "unexpected character");
    }

    #[test]
    fn test_model_error() {
        let err = WeaveError::from(ModelError::DuplicateDefinition("Person".to_string()));

        let reports = to_reports(&err);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].to_string(), "`Person` is defined more than once");
        assert_eq!(reports[0].code().unwrap().to_string(), "weave::model");
        assert!(reports[0].source_code().is_none());
    }

    #[test]
    fn test_config_error_code() {
        let err = WeaveError::Config("bad".to_string());

        let reports = to_reports(&err);

        assert_eq!(reports[0].code().unwrap().to_string(), "weave::config");
        assert!(reports[0].labels().is_none());
    }

    #[test]
    fn test_primary_flag_on_labels() {
        let diag = Diagnostic::error("error with labels")
            .with_label(Span::new(0..5), "primary")
            .with_secondary_label(Span::new(10..15), "secondary");

        let report = from_diagnostic(&diag);

        let labels = report.labels.expect("labels are attached");
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
    }
}
