#![allow(clippy::needless_borrows_for_generic_args)]

use clap::Parser;
use std::path::PathBuf;

use custodes::cli::commands::config::ConfigCommands;
use custodes::cli::{Cli, Commands};
use custodes::domain::models::{Complexity, TestType};

#[test]
fn test_parse_threshold() {
    let cli = Cli::try_parse_from([
        "custodes",
        "threshold",
        "--test-type",
        "security-awareness",
        "-C",
        "expert",
        "--ai",
        "guardian",
        "--explain",
    ])
    .unwrap();

    match cli.command {
        Commands::Threshold(args) => {
            assert_eq!(args.test_type, TestType::SecurityAwareness);
            assert_eq!(args.complexity, Complexity::Expert);
            assert_eq!(args.ai.as_deref(), Some("guardian"));
            assert!(args.explain);
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_record_with_global_flags() {
    let cli = Cli::try_parse_from([
        "custodes",
        "record",
        "--ai",
        "sandbox",
        "-t",
        "code_quality",
        "-C",
        "basic",
        "--score",
        "72.5",
        "--json",
        "--config",
        "alt.yaml",
    ])
    .unwrap();

    assert!(cli.json);
    assert_eq!(cli.config, Some(PathBuf::from("alt.yaml")));
    match cli.command {
        Commands::Record(args) => {
            assert_eq!(args.ai, "sandbox");
            assert_eq!(args.score, 72.5);
            assert!(!args.passed);
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_record_rejects_out_of_range_score() {
    let result = Cli::try_parse_from([
        "custodes", "record", "--ai", "sandbox", "-t", "code_quality", "-C", "basic", "--score",
        "120",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_unknown_test_type_is_rejected() {
    let result = Cli::try_parse_from(["custodes", "threshold", "-t", "poetry", "-C", "basic"]);
    assert!(result.is_err());
}

#[test]
fn test_level_must_be_positive() {
    assert!(Cli::try_parse_from(["custodes", "level", "--ai", "x", "--level", "0"]).is_err());

    let cli = Cli::try_parse_from(["custodes", "level", "--ai", "x", "-l", "3"]).unwrap();
    match cli.command {
        Commands::Level(args) => assert_eq!(args.level, 3),
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_evaluate_defaults() {
    let cli = Cli::try_parse_from(["custodes", "evaluate", "a.md", "b.md"]).unwrap();
    match cli.command {
        Commands::Evaluate(args) => {
            assert_eq!(args.difficulty, Complexity::Basic);
            assert_eq!(args.ai, "unknown");
            assert_eq!(args.files.len(), 2);
            assert!(!args.no_jitter);
            assert_eq!(args.seed, None);
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_no_jitter_conflicts_with_seed() {
    let result = Cli::try_parse_from(["custodes", "evaluate", "--no-jitter", "--seed", "4"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_config_subcommands() {
    let cli = Cli::try_parse_from(["custodes", "config", "check"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config(args) if matches!(args.command, ConfigCommands::Check)
    ));
}
