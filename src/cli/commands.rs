use crate::dispatch::{ArgKind, Dispatcher};
use crate::error::{SheetError, SheetResult};
use colored::Colorize;
use serde_json::Value;

fn kind_label(kind: ArgKind) -> &'static str {
    match kind {
        ArgKind::Text => "string",
        ArgKind::Scalar => "value",
        ArgKind::List => "list",
        ArgKind::Flag => "bool",
    }
}

/// Parse the `--args` JSON object. Missing means `{}`.
pub fn parse_args(raw: Option<&str>) -> SheetResult<Value> {
    match raw {
        None => Ok(Value::Object(Default::default())),
        Some(text) => {
            let value: Value = serde_json::from_str(text).map_err(|e| {
                SheetError::InvalidArgument(format!("--args is not valid JSON: {}", e))
            })?;
            if !value.is_object() {
                return Err(SheetError::InvalidArgument(
                    "--args must be a JSON object".to_string(),
                ));
            }
            Ok(value)
        }
    }
}

/// Execute the tools command
pub fn tools(dispatcher: &Dispatcher, verbose: bool) -> SheetResult<()> {
    println!("{}", "📋 Excel tools".bold().green());
    println!();

    for tool in dispatcher.tools() {
        println!("   {}", tool.name.bright_blue().bold());
        println!("      {}", tool.description);
        if verbose {
            for arg in tool.args {
                let marker = if arg.required {
                    "required".yellow()
                } else {
                    "optional".dimmed()
                };
                let default = arg
                    .default
                    .map(|d| format!(" (default: {})", d))
                    .unwrap_or_default();
                println!(
                    "      - {} <{}> {}{}",
                    arg.name.cyan(),
                    kind_label(arg.kind),
                    marker,
                    default
                );
            }
        }
    }
    println!();

    Ok(())
}

/// Execute the call command
///
/// The tool's text result goes to stdout unadorned so it can be piped.
/// Failures are returned to the caller, which reports them.
pub fn call(dispatcher: &Dispatcher, tool: &str, args: Option<&str>) -> SheetResult<()> {
    let args = parse_args(args)?;
    let output = dispatcher.call(tool, &args)?;
    println!("{}", output);
    Ok(())
}

/// Execute the files command
pub fn files(dispatcher: &Dispatcher) -> SheetResult<()> {
    println!("{}", "📁 Excel files".bold().green());
    println!("   Root: {}\n", dispatcher.root().display());

    let files = dispatcher.list_files()?;
    if files.is_empty() {
        println!("   {}", "(no spreadsheet files)".dimmed());
    }
    for name in files {
        println!("   {}", name);
    }
    println!();

    Ok(())
}

/// Execute the sheets command
pub fn sheets(dispatcher: &Dispatcher, file: &str) -> SheetResult<()> {
    let names = dispatcher.sheets(file)?;

    println!("{} {}", "📊 Sheets in".bold().green(), file.bold());
    for (i, name) in names.iter().enumerate() {
        println!("   {}. {}", i + 1, name);
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkspaceConfig;
    use serde_json::json;

    #[test]
    fn test_parse_args_defaults_to_empty_object() {
        assert_eq!(parse_args(None).unwrap(), json!({}));
    }

    #[test]
    fn test_parse_args_rejects_non_objects() {
        assert!(matches!(
            parse_args(Some("[1,2]")),
            Err(SheetError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_args(Some("{oops")),
            Err(SheetError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_call_propagates_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = Dispatcher::new(&WorkspaceConfig::new(dir.path()));
        let err = call(&dispatcher, "nope", None).unwrap_err();
        assert!(matches!(err, SheetError::UnknownTool(_)));
    }

    #[test]
    fn test_sheets_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = Dispatcher::new(&WorkspaceConfig::new(dir.path()));
        assert!(matches!(
            sheets(&dispatcher, "ghost.xlsx"),
            Err(SheetError::DocumentNotFound(_))
        ));
    }
}
