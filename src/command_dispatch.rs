//! Purpose: Hold top-level CLI command dispatch for `jsvalue`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each command prints exactly its result on stdout, newline-terminated.
//! Invariants: Shape mismatches (keys on a non-object, sort-by on a non-array) are usage errors.

use super::*;

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "jsvalue", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Get {
            path,
            output,
            source,
        } => {
            let document = read_document(&source)?;
            let leaf = walk_path(document, &path)?;
            println!("{}", render(&leaf, output)?);
            Ok(RunOutcome::ok())
        }
        Command::Keys { source } => {
            let document = read_document(&source)?;
            if !document.is_object() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("keys expects a top-level object")
                    .with_hint("Use `jsvalue get <path>` to reach a nested object first."));
            }
            for key in document.into_object().keys() {
                println!("{key}");
            }
            Ok(RunOutcome::ok())
        }
        Command::SortBy {
            field,
            pretty,
            source,
        } => {
            let document = read_document(&source)?;
            if !document.is_array() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("sort-by expects a top-level array"));
            }
            let mut items = document.into_array();
            items.sort_by(&field);
            let text = if pretty {
                indent_encode(&items)?
            } else {
                items.string()
            };
            println!("{text}");
            Ok(RunOutcome::ok())
        }
        Command::Time { text } => {
            let ts = parse_time(&text)?;
            println!("{}", format_time(ts)?);
            Ok(RunOutcome::ok())
        }
    }
}
