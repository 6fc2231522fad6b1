//! Unit tests for CLI commands.

use super::*;
use crate::output::colors::ColorSupport;
use crate::output::errors::ErrorFormatter;
use crate::{Cli, ShowFormat};
use clap::{CommandFactory, Parser};
use std::fs;
use tempfile::TempDir;

const MANIFEST: &str = "cortex_internal.requirements.txt";

/// Create a test command context in a temporary directory
fn create_test_context(temp_dir: &TempDir) -> CommandContext {
    CommandContext {
        cwd: Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap(),
        env: HashMap::new(),
        output: crate::output::OutputHandler::new(),
    }
}

/// Project with a manifest and one import package
fn create_project(contents: &str) -> TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join(MANIFEST), contents).unwrap();
    fs::create_dir_all(temp_dir.path().join("cortex_internal/lib")).unwrap();
    fs::write(temp_dir.path().join("cortex_internal/__init__.py"), "").unwrap();
    fs::write(temp_dir.path().join("cortex_internal/lib/__init__.py"), "").unwrap();
    temp_dir
}

#[test]
fn test_cli_definition() {
    Cli::command().debug_assert();
}

#[test]
fn test_cli_parses_build_flags() {
    let cli = Cli::try_parse_from([
        "nucleus-pkg",
        "build",
        "--manifest",
        "reqs.txt",
        "--out-dir",
        "dist",
        "-v",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
        Commands::Build { input, out_dir, packages_root, .. } => {
            assert_eq!(input.manifest, Some(Utf8PathBuf::from("reqs.txt")));
            assert_eq!(out_dir, Some(Utf8PathBuf::from("dist")));
            assert_eq!(packages_root, None);
        },
        _ => panic!("expected build"),
    }

    let cli = Cli::try_parse_from(["nucleus-pkg", "show", "--format", "json"]).unwrap();
    assert!(matches!(cli.command, Commands::Show { format: ShowFormat::Json, .. }));

    assert!(Cli::try_parse_from(["nucleus-pkg", "show", "--format", "yaml"]).is_err());
}

#[test]
fn test_parse_python_version() {
    assert_eq!(parse_python_version("3.6").unwrap(), "3.6");
    assert_eq!(parse_python_version("3.8.10").unwrap(), "3.8.10");

    for invalid in ["3", "3.", "three.six", "3.6.1.2", ""] {
        assert!(parse_python_version(invalid).is_err(), "accepted {:?}", invalid);
    }
}

#[test]
fn test_build_writes_egg_info() {
    let temp_dir = create_project("requests>=2.0\nnumpy==1.21.0 ; python_version >= \"3.7\"\n");
    let ctx = create_test_context(&temp_dir);

    build::execute(None, &CliOverrides::default(), None, &ctx).unwrap();

    let egg_info = temp_dir.path().join("nucleus_internal.egg-info");
    let requires = fs::read_to_string(egg_info.join("requires.txt")).unwrap();
    assert_eq!(requires, "requests>=2.0\n\n[:python_version >= \"3.7\"]\nnumpy==1.21.0\n");
    assert_eq!(fs::read_to_string(egg_info.join("top_level.txt")).unwrap(), "cortex_internal\n");
    assert!(egg_info.join("PKG-INFO").exists());
    assert!(egg_info.join("dependency_links.txt").exists());
}

#[test]
fn test_build_respects_overrides() {
    let temp_dir = create_project("flask\n");
    let mut ctx = create_test_context(&temp_dir);
    ctx.env.insert("NUCLEUS_PACKAGE_VERSION".to_string(), "1.2.3".to_string());

    let overrides = CliOverrides {
        output_dir: Some(Utf8PathBuf::from("dist")),
        ..CliOverrides::default()
    };
    build::execute(None, &overrides, Some(Utf8Path::new("metadata.json")), &ctx).unwrap();

    let pkg_info =
        fs::read_to_string(temp_dir.path().join("dist/nucleus_internal.egg-info/PKG-INFO")).unwrap();
    assert!(pkg_info.contains("Version: 1.2.3\n"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp_dir.path().join("metadata.json")).unwrap()).unwrap();
    assert_eq!(json["version"], "1.2.3");
    assert_eq!(json["packages"][0], "cortex_internal");
}

#[test]
fn test_build_missing_manifest_writes_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let ctx = create_test_context(&temp_dir);

    let result = build::execute(None, &CliOverrides::default(), None, &ctx);
    assert!(matches!(result, Err(NucleusError::FileAccess { .. })));
    assert!(!temp_dir.path().join("nucleus_internal.egg-info").exists());
}

#[test]
fn test_build_invalid_line_writes_nothing() {
    let temp_dir = create_project("requests>=2.0\nnumpy=>1.0\n");
    let ctx = create_test_context(&temp_dir);

    let result = build::execute(None, &CliOverrides::default(), None, &ctx);
    assert!(matches!(result, Err(NucleusError::Parse { line: 2, .. })));
    assert!(!temp_dir.path().join("nucleus_internal.egg-info").exists());
}

#[test]
fn test_build_json_failure_writes_no_egg_info() {
    let temp_dir = create_project("requests\n");
    let ctx = create_test_context(&temp_dir);

    let result = build::execute(
        None,
        &CliOverrides::default(),
        Some(Utf8Path::new("absent/metadata.json")),
        &ctx,
    );
    assert!(matches!(result, Err(NucleusError::Registration { .. })));
    assert!(!temp_dir.path().join("nucleus_internal.egg-info").exists());
}

#[test]
fn test_exit_status() {
    let empty = tempfile::tempdir().unwrap();
    let ctx = create_test_context(&empty);
    assert_eq!(crate::finish(build::execute(None, &CliOverrides::default(), None, &ctx)), 1);

    let temp_dir = create_project("requests\n");
    let ctx = create_test_context(&temp_dir);
    assert_eq!(crate::finish(build::execute(None, &CliOverrides::default(), None, &ctx)), 0);
}

#[test]
fn test_check_command() {
    let temp_dir = create_project("dataclasses ; python_version < \"3.7\"\nrequests\n");
    let ctx = create_test_context(&temp_dir);

    check::execute(None, &CliOverrides::default(), None, &ctx).unwrap();
    check::execute(None, &CliOverrides::default(), Some("3.8"), &ctx).unwrap();

    let result = check::execute(None, &CliOverrides::default(), Some("py3"), &ctx);
    assert!(matches!(result, Err(NucleusError::ConfigValidation { .. })));
}

#[test]
fn test_check_uses_manifest_override() {
    let temp_dir = create_project("requests\n");
    fs::write(temp_dir.path().join("other.txt"), "-r base.txt\n").unwrap();
    let ctx = create_test_context(&temp_dir);

    let overrides = CliOverrides {
        manifest: Some(Utf8PathBuf::from("other.txt")),
        ..CliOverrides::default()
    };
    let result = check::execute(None, &overrides, None, &ctx);
    assert!(matches!(result, Err(NucleusError::Parse { line: 1, .. })));
}

#[test]
fn test_show_command() {
    let temp_dir = create_project("requests>=2.0\n");
    let ctx = create_test_context(&temp_dir);

    show::execute(None, &CliOverrides::default(), ShowFormat::Json, &ctx).unwrap();
    show::execute(None, &CliOverrides::default(), ShowFormat::PkgInfo, &ctx).unwrap();
}

#[test]
fn test_config_file_is_used() {
    let temp_dir = create_project("requests\n");
    fs::write(
        temp_dir.path().join("nucleus.toml"),
        "[package]\nname = \"nucleus-extra\"\n[build]\noutput-dir = \"out\"\n",
    )
    .unwrap();
    let ctx = create_test_context(&temp_dir);

    build::execute(None, &CliOverrides::default(), None, &ctx).unwrap();
    assert!(temp_dir.path().join("out/nucleus_extra.egg-info/PKG-INFO").exists());

    let missing = build::execute(Some(Utf8Path::new("absent.toml")), &CliOverrides::default(), None, &ctx);
    assert!(missing.is_err());
}

#[test]
fn test_error_formatter_points_at_line() {
    let formatter = ErrorFormatter::with_colors(ColorSupport::disabled());
    let err = NucleusError::parse("reqs.txt", 12, "numpy=>1.0", "expected a version");

    let text = formatter.format_error(&err);
    assert!(text.starts_with("error: Invalid requirement at reqs.txt:12"));
    assert!(text.contains("  --> reqs.txt:12\n"));
    assert!(text.contains("12 | numpy=>1.0\n"));
    assert!(text.contains("help: "));
}

#[test]
fn test_error_formatter_shows_cause() {
    let formatter = ErrorFormatter::with_colors(ColorSupport::disabled());
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
    let err = NucleusError::file_access("reqs.txt", io);

    let text = formatter.format_error(&err);
    assert!(text.contains("caused by: No such file or directory"));
    assert!(!text.contains("-->"));
}
