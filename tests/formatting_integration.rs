//! End-to-end formatting through the library API: config → formatter → edit.
#![cfg(unix)]

use std::fs;
use std::path::Path;

use ocaml_reason_format::config::{Args, Config};
use ocaml_reason_format::edit::{formatting_edits, full_document_range};
use ocaml_reason_format::{FormatError, FormatRequest, FormatterSettings, Language, ScratchDir};
use tower_lsp::lsp_types::{Position, TextEdit};

fn config_with(settings: FormatterSettings) -> Config {
    let mut config = Config::with_user_config(Args::default(), None).expect("create config");
    config.set_client_settings(settings);
    config
}

fn shell_formatter(language: Language, script: &str) -> FormatterSettings {
    let args = Some(vec!["-c".to_string(), script.to_string()]);
    match language {
        Language::OCaml => FormatterSettings {
            ocamlformat: Some("/bin/sh".to_string()),
            ocamlformat_args: args,
            ..Default::default()
        },
        Language::Reason => FormatterSettings {
            refmt: Some("/bin/sh".to_string()),
            refmt_args: args,
            ..Default::default()
        },
    }
}

/// Apply a whole-document edit the way an editor would
fn apply(document: &str, edit: &TextEdit) -> String {
    assert_eq!(edit.range.start, Position::new(0, 0));
    assert_eq!(edit.range.end, full_document_range(document).end);
    edit.new_text.clone()
}

async fn format(
    config: &Config,
    language: Language,
    root: &Path,
    source: &Path,
    scratch: &ScratchDir,
) -> Result<String, FormatError> {
    let request = FormatRequest {
        language,
        source: source.to_path_buf(),
        root: root.to_path_buf(),
        command: config.resolve_formatter(language, root),
    };
    request.run(scratch).await
}

#[tokio::test]
async fn test_ocaml_scenario_single_full_replace() {
    let root = tempfile::tempdir().expect("create root");
    let scratch = ScratchDir::new(root.path().join(".scratch"));
    let source = root.path().join("main.ml");
    fs::write(&source, "let x=1;;\n").expect("write source");

    let config = config_with(shell_formatter(Language::OCaml, "sed 's/=/ = /' \"$0\""));
    let formatted = format(&config, Language::OCaml, root.path(), &source, &scratch)
        .await
        .expect("format");

    let edits = formatting_edits(Some("let x=1;;\n"), formatted);
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].range.end, Position::new(1, 0));
    assert_eq!(apply("let x=1;;\n", &edits[0]), "let x = 1;;\n");
}

#[tokio::test]
async fn test_identity_formatter_leaves_document_unchanged() {
    let root = tempfile::tempdir().expect("create root");
    let scratch = ScratchDir::new(root.path().join(".scratch"));
    let content = "let greet name =\n  Js.log(\"Hello \" ++ name);\n";

    for (language, name) in [(Language::OCaml, "greet.ml"), (Language::Reason, "Greet.re")] {
        let source = root.path().join(name);
        fs::write(&source, content).expect("write source");

        let config = config_with(shell_formatter(language, "cat \"$0\""));
        let formatted = format(&config, language, root.path(), &source, &scratch)
            .await
            .expect("format");

        let edits = formatting_edits(Some(content), formatted);
        assert_eq!(apply(content, &edits[0]), content);
    }
}

#[tokio::test]
async fn test_failing_formatter_produces_no_edit() {
    let root = tempfile::tempdir().expect("create root");
    let scratch = ScratchDir::new(root.path().join(".scratch"));
    let source = root.path().join("Broken.re");
    fs::write(&source, "let = ;").expect("write source");

    let config = config_with(shell_formatter(Language::Reason, "exit 2"));
    let result = format(&config, Language::Reason, root.path(), &source, &scratch).await;

    assert!(matches!(result, Err(FormatError::Failed { .. })));
    assert_eq!(fs::read_to_string(&source).unwrap(), "let = ;");
}

#[tokio::test]
async fn test_formatter_path_relative_to_workspace_root() {
    let root = tempfile::tempdir().expect("create root");
    let scratch = ScratchDir::new(root.path().join(".scratch"));
    let source = root.path().join("main.ml");
    fs::write(&source, "let x=1;;\n").expect("write source");

    // Missing relative binary: resolved under the root, fails at spawn time
    let config = config_with(FormatterSettings {
        ocamlformat: Some("_opam/bin/ocamlformat".to_string()),
        ..Default::default()
    });
    assert_eq!(
        config.resolve_formatter(Language::OCaml, root.path()).program,
        root.path().join("_opam/bin/ocamlformat")
    );

    let result = format(&config, Language::OCaml, root.path(), &source, &scratch).await;
    assert!(matches!(result, Err(FormatError::Spawn { .. })));
}

#[tokio::test]
async fn test_project_config_selects_formatter() {
    let root = tempfile::tempdir().expect("create root");
    let scratch = ScratchDir::new(root.path().join(".scratch"));
    let source = root.path().join("App.re");
    fs::write(&source, "let x=1;\n").expect("write source");
    fs::write(
        root.path().join(".ocaml-reason-format.toml"),
        "refmt = \"/bin/sh\"\nrefmtArgs = [\"-c\", \"printf 'let x = 1;\\\\n' > \\\"$0\\\"\"]\n",
    )
    .expect("write project config");

    let mut config = Config::with_user_config(Args::default(), None).expect("create config");
    assert!(config.load_project_config(root.path()).expect("load"));

    let formatted = format(&config, Language::Reason, root.path(), &source, &scratch)
        .await
        .expect("format");
    assert_eq!(formatted, "let x = 1;\n");
}
