use proofmark::audit::{self, AuditConfig, LogDestination};
use proofmark::config::{ProofBundle, BUNDLE_ENV_VAR};
use proofmark::{
    canonicalize, DisplayState, Event, Field, PMError, ProofConfig, ProofRecord, ProofStatus,
    ResetControl, StatusController,
};

use proofmark::reexports::{hex, log};

use clap::{crate_description, crate_name, crate_version, Arg, ArgAction, ArgMatches, Command};
use std::io::{self, prelude::*};
use std::path::Path;

/// Helper function to create the parent directories of a file
fn create_parent_dirs(path: impl AsRef<Path>) -> Result<(), PMError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            PMError::InternalError(format!(
                "Failed to create parent directory for '{}': {}",
                path.display(),
                e
            ))
        })?;
    }
    Ok(())
}

/// The four record overrides shared by `check` and `canonical`.
fn field_args() -> [Arg; 4] {
    Field::ALL.map(|field| {
        Arg::new(field.name())
            .long(field.name())
            .value_name(field.name())
            .allow_hyphen_values(true)
            .help(format!("Override the {field} field of the signed record"))
    })
}

/// Apply `--url`, `--timestamp`, `--status` and `--hash` overrides.
fn apply_overrides(controller: &mut StatusController, matches: &ArgMatches) {
    for field in Field::ALL {
        if let Some(value) = matches.get_one::<String>(field.name()) {
            controller.on_field_edit(field, value.as_str());
        }
    }
}

fn overridden_record(original: &ProofRecord, matches: &ArgMatches) -> ProofRecord {
    let mut record = original.clone();
    for field in Field::ALL {
        if let Some(value) = matches.get_one::<String>(field.name()) {
            record.set(field, value.as_str());
        }
    }
    record
}

fn print_record(record: &ProofRecord) {
    for field in Field::ALL {
        println!("  {:<10} {}", field.name(), record.get(field));
    }
}

fn print_display(display: &DisplayState, verbose: bool) {
    println!("{}", display);
    if verbose {
        println!("  class: {}", display.status_class());
        let reset = match display.reset_control() {
            ResetControl::Hidden => "hidden",
            ResetControl::Visible => "visible",
        };
        println!("  reset: {reset}");
    }
    if !display.ambiguous_fields.is_empty() {
        let names: Vec<_> = display.ambiguous_fields.iter().map(|f| f.name()).collect();
        println!(
            "  warning: separator '{}' in [{}]; canonical encoding is ambiguous",
            proofmark::canonical::SEPARATOR,
            names.join(", ")
        );
    }
}

/// A line of input to the interactive session.
enum SessionCommand {
    Event(Event),
    Show,
    Help,
    Quit,
}

/// Split off the first word; the remainder starts at the next non-blank character.
fn split_word(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (line, ""),
    }
}

fn parse_session_line(line: &str) -> Result<Option<SessionCommand>, PMError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = split_word(trimmed);
    let command = match verb {
        "set" => {
            let (field, value) = split_word(rest);
            let field: Field = field.parse()?;
            SessionCommand::Event(Event::edit(field, value))
        }
        "reset" => SessionCommand::Event(Event::ResetRequested),
        "show" => SessionCommand::Show,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        _ => return Err(PMError::UsageError("unknown command (try 'help')")),
    };
    Ok(Some(command))
}

const SESSION_HELP: &str = "\
Commands:
  set <field> <value>   edit url, timestamp, status or hash
  reset                 restore the signed record
  show                  print the current record and status
  quit                  leave the session";

fn run_session(mut controller: StatusController, verbose: bool) -> Result<(), PMError> {
    println!("Session {}", controller.session_id());
    print_record(controller.record());
    print_display(controller.display(), verbose);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        let command = match parse_session_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        match command {
            SessionCommand::Event(event) => {
                let display = controller.handle(event);
                print_display(display, verbose);
            }
            SessionCommand::Show => {
                print_record(controller.record());
                print_display(controller.display(), verbose);
            }
            SessionCommand::Help => println!("{SESSION_HELP}"),
            SessionCommand::Quit => break,
        }
        stdout.flush()?;
    }
    Ok(())
}

fn start() -> Result<(), PMError> {
    let matches = Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Verbose output"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .action(ArgAction::SetTrue)
                .help("Prints debugging information"),
        )
        .arg(
            Arg::new("audit")
                .long("audit")
                .action(ArgAction::SetTrue)
                .help("Enable structured audit logging (JSON to stderr)"),
        )
        .arg(
            Arg::new("audit-file")
                .long("audit-file")
                .value_name("FILE")
                .help("Write audit logs to FILE instead of stderr"),
        )
        .arg(
            Arg::new("bundle")
                .long("bundle")
                .short('b')
                .value_name("bundle_file")
                .help(format!(
                    "Proof bundle (JSON); defaults to ${BUNDLE_ENV_VAR}, then the embedded demo proof"
                )),
        )
        .subcommand(
            Command::new("check")
                .about("Verify the signed record, optionally with edited fields")
                .args(field_args()),
        )
        .subcommand(
            Command::new("canonical")
                .about("Print the canonical message of the record")
                .args(field_args()),
        )
        .subcommand(Command::new("session").about("Edit the record interactively from stdin"))
        .subcommand(
            Command::new("bundle")
                .about("Manage proof bundles")
                .subcommand_required(true)
                .subcommand(
                    Command::new("export")
                        .about("Write the active proof bundle to a file")
                        .arg(
                            Arg::new("out")
                                .value_name("output_file")
                                .long("output-file")
                                .short('o')
                                .required(true)
                                .help("Output bundle file (JSON)"),
                        ),
                )
                .subcommand(
                    Command::new("inspect")
                        .about("Display and self-test a proof bundle")
                        .arg(
                            Arg::new("in")
                                .value_name("input_file")
                                .long("input-file")
                                .short('i')
                                .required(true)
                                .help("Input bundle file (JSON)"),
                        ),
                ),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let debug = matches.get_flag("debug");
    let audit_enabled = matches.get_flag("audit");
    let audit_file = matches.get_one::<String>("audit-file").map(|s| s.as_str());
    let bundle_file = matches.get_one::<String>("bundle").map(Path::new);

    env_logger::builder()
        .format_timestamp(None)
        .format_level(false)
        .format_module_path(false)
        .format_target(false)
        .filter_level(if debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if audit_enabled || audit_file.is_some() {
        let destination = match audit_file {
            Some(path) => LogDestination::File(path.to_string()),
            None => LogDestination::Stderr,
        };
        audit::init(AuditConfig {
            enabled: true,
            destination,
            json_format: true,
            filter: format!("{}=info", audit::AUDIT_TARGET),
        })?;
    }

    if let Some(matches) = matches.subcommand_matches("check") {
        let mut controller = StatusController::new(ProofConfig::load(bundle_file)?)?;
        apply_overrides(&mut controller, matches);
        if verbose {
            print_record(controller.record());
        }
        print_display(controller.display(), verbose);
        if controller.status() == ProofStatus::Tampered {
            return Err(PMError::VerificationFailed);
        }
    } else if let Some(matches) = matches.subcommand_matches("canonical") {
        let config = ProofConfig::load(bundle_file)?;
        let record = overridden_record(config.original.record(), matches);
        let message = canonicalize(&record);
        println!("{}", String::from_utf8_lossy(&message));
        if verbose {
            println!("{}", hex::encode(&message));
        }
        let collisions = proofmark::canonical::separator_collisions(&record);
        if !collisions.is_empty() {
            log::warn!(
                "Separator found in {:?}; this message is ambiguous",
                collisions
            );
        }
    } else if matches.subcommand_matches("session").is_some() {
        let controller = StatusController::new(ProofConfig::load(bundle_file)?)?;
        run_session(controller, verbose)?;
    } else if let Some(matches) = matches.subcommand_matches("bundle") {
        if let Some(matches) = matches.subcommand_matches("export") {
            let output_file = matches
                .get_one::<String>("out")
                .ok_or(PMError::UsageError("Missing output file"))?;
            let bundle = ProofBundle::load(bundle_file)?;
            // Refuse to export a bundle that would not pass the startup self-test.
            StatusController::new(ProofConfig::from_bundle(&bundle)?)?;
            create_parent_dirs(output_file)?;
            bundle.to_file(output_file)?;
            println!("Proof bundle saved to [{output_file}]");
        } else if let Some(matches) = matches.subcommand_matches("inspect") {
            let input_file = matches
                .get_one::<String>("in")
                .ok_or(PMError::UsageError("Missing input file"))?;
            let bundle = ProofBundle::from_file(input_file)?;
            let config = ProofConfig::from_bundle(&bundle)?;
            println!("Public key: {}", config.keys.public_key_hex());
            println!("Signature:  {}", config.keys.signature_hex());
            println!("Record:");
            print_record(config.original.record());
            let controller = StatusController::new(config)?;
            print_display(controller.display(), verbose);
        }
    } else {
        return Err(PMError::UsageError("No subcommand specified"));
    }
    Ok(())
}

fn main() -> Result<(), PMError> {
    let res = start();
    match res {
        Ok(_) => {}
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
    Ok(())
}
