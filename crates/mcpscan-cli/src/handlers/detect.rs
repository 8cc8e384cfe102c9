//! Detect command handler.
//!
//! Runs the extraction engine on a local directory, no GitHub access.

use std::path::PathBuf;

use anyhow::Result;
use mcpscan_core::{
    BraceMatching, McpComposition, RuntimeInfo, ScanError, ScanOptions, find_composition,
    interpret,
};

use crate::error::CliError;

/// Arguments for the detect command.
#[derive(Debug, Clone)]
pub struct DetectArgs {
    pub path: PathBuf,
    pub string_aware: bool,
    pub max_file_bytes: Option<u64>,
    pub show_composition: bool,
}

impl DetectArgs {
    fn options(&self) -> ScanOptions {
        let mut options = ScanOptions::default();
        if self.string_aware {
            options = options.with_brace_matching(BraceMatching::StringAware);
        }
        if let Some(max) = self.max_file_bytes {
            options = options.with_max_file_bytes(max);
        }
        options
    }
}

/// What the engine found.
#[derive(Debug)]
pub enum Detection {
    Found {
        composition: McpComposition,
        runtime: RuntimeInfo,
    },
    NotFound,
    Failed {
        composition: Option<McpComposition>,
        error: ScanError,
    },
}

/// Locate, recover and interpret the first composition under `args.path`.
pub fn detect(args: &DetectArgs) -> Result<Detection> {
    if !args.path.is_dir() {
        return Err(CliError::Arguments(format!("{} is not a directory", args.path.display())).into());
    }

    let composition = match find_composition(&args.path, &args.options()) {
        Ok(Some(composition)) => composition,
        Ok(None) => return Ok(Detection::NotFound),
        Err(error) => {
            return Ok(Detection::Failed {
                composition: None,
                error,
            });
        }
    };

    Ok(match interpret(&composition) {
        Ok(runtime) => Detection::Found {
            composition,
            runtime,
        },
        Err(error) => {
            // Interpreter errors do not know which file they came from
            let error = match composition.source() {
                Some(source) if error.filename.is_none() => error.with_filename(source),
                _ => error,
            };
            Detection::Failed {
                composition: Some(composition),
                error,
            }
        }
    })
}

/// Execute the detect command.
///
/// Prints the runtime as JSON. An analysis failure prints the error as JSON
/// and exits with status 1.
pub fn execute(args: &DetectArgs) -> Result<()> {
    match detect(args)? {
        Detection::Found {
            composition,
            runtime,
        } => {
            if args.show_composition {
                println!("{}", composition.to_pretty_json());
            }
            println!("{}", serde_json::to_string_pretty(&runtime)?);
            Ok(())
        }
        Detection::NotFound => {
            println!("No MCP composition found in {}", args.path.display());
            Ok(())
        }
        Detection::Failed { composition, error } => {
            if let (true, Some(composition)) = (args.show_composition, composition) {
                println!("{}", composition.to_pretty_json());
            }
            println!("{}", serde_json::to_string_pretty(&error)?);
            Err(CliError::Analysis(error.error_message).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpscan_core::ServerType;
    use std::fs;
    use tempfile::TempDir;

    fn args(dir: &TempDir) -> DetectArgs {
        DetectArgs {
            path: dir.path().to_path_buf(),
            string_aware: false,
            max_file_bytes: None,
            show_composition: false,
        }
    }

    #[test]
    fn test_detect_uv_server() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("README.md"),
            r#"Add this: {"mcpServers": {"weather": {"command": "uv", "args": ["run", "weather.py"]}}}"#,
        )
        .unwrap();

        let Detection::Found { runtime, .. } = detect(&args(&dir)).unwrap() else {
            panic!("expected a composition");
        };
        assert_eq!(runtime.server, "weather");
        assert_eq!(runtime.server_type, ServerType::Uv);
        assert_eq!(runtime.args, vec!["run", "weather.py"]);
    }

    #[test]
    fn test_detect_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "# Just a readme\n").unwrap();
        assert!(matches!(detect(&args(&dir)).unwrap(), Detection::NotFound));
    }

    #[test]
    fn test_interpreter_error_gets_filename() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("setup.md"), r#"{"mcpServers": {}}"#).unwrap();

        let Detection::Failed { error, composition } = detect(&args(&dir)).unwrap() else {
            panic!("expected a failure");
        };
        assert!(composition.is_some());
        assert_eq!(error.error_message, "No servers found in 'mcpServers' object");
        assert_eq!(error.file_basename().as_deref(), Some("setup.md"));
    }

    #[test]
    fn test_execute_failure_exit_code() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), r#"{"mcpServers": {"a": {"command": "npx""#).unwrap();

        let err = execute(&args(&dir)).unwrap_err();
        assert_eq!(CliError::exit_code_for(&err), 1);
        assert!(err.to_string().contains("Unclosed brackets"));
    }

    #[test]
    fn test_missing_directory() {
        let err = detect(&DetectArgs {
            path: PathBuf::from("/definitely/not/here"),
            string_aware: false,
            max_file_bytes: None,
            show_composition: false,
        })
        .unwrap_err();
        assert_eq!(CliError::exit_code_for(&err), 2);
    }
}
