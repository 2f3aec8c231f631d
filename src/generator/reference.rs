//! Reference generation by running an external command
//!
//! The command line comes from `reference.command`. Two placeholders are
//! substituted before it runs:
//!
//! - `{output_dir}` anywhere in an argument is replaced with the output directory
//! - an argument that is exactly `{modules}` expands to one argument per module

use std::fs;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use super::{ReferenceGenerator, ReferenceRequest};
use crate::error::{Error, Result};

const OUTPUT_DIR_PLACEHOLDER: &str = "{output_dir}";
const MODULES_PLACEHOLDER: &str = "{modules}";

/// How often a running command is checked for exit or cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs the configured reference command from the project directory
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandReferenceGenerator;

/// Substitute placeholders in a command line
pub fn expand_command(command: &[String], request: &ReferenceRequest<'_>) -> Vec<String> {
    let output_dir = request.output_dir.to_string_lossy();
    let mut expanded = Vec::with_capacity(command.len() + request.modules.len());
    for arg in command {
        if arg == MODULES_PLACEHOLDER {
            expanded.extend(request.modules.iter().cloned());
        } else {
            expanded.push(arg.replace(OUTPUT_DIR_PLACEHOLDER, &output_dir));
        }
    }
    expanded
}

impl ReferenceGenerator for CommandReferenceGenerator {
    fn generate(&self, request: &ReferenceRequest<'_>) -> Result<()> {
        let command = request
            .options
            .command
            .as_deref()
            .filter(|command| !command.is_empty())
            .ok_or_else(|| Error::ReferenceGeneration {
                message: "no reference command configured".to_string(),
            })?;

        fs::create_dir_all(request.output_dir).map_err(|e| Error::ReferenceGeneration {
            message: format!(
                "failed to create '{}': {}",
                request.output_dir.display(),
                e
            ),
        })?;

        let argv = expand_command(command, request);
        let Some((program, args)) = argv.split_first() else {
            return Err(Error::ReferenceGeneration {
                message: "reference command is empty".to_string(),
            });
        };

        info!("Generating reference documentation for {}", request.modules.join(", "));
        debug!("Running reference command: {:?}", argv);

        let mut child = Command::new(program)
            .args(args)
            .current_dir(request.directory)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::ReferenceGeneration {
                message: format!("failed to run '{}': {}", program, e),
            })?;

        // Drained on a separate thread so a chatty command cannot block on a full pipe
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut captured = String::new();
                let _ = pipe.read_to_string(&mut captured);
                captured
            })
        });

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if request.cancel.is_cancelled() {
                info!("Stopping '{}'", program);
                if let Err(e) = child.kill() {
                    warn!("Failed to stop '{}': {}", program, e);
                }
                let _ = child.wait();
                return Err(Error::Cancelled);
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            let stderr = stderr
                .and_then(|reader| reader.join().ok())
                .unwrap_or_default();
            return Err(Error::ReferenceGeneration {
                message: format!("'{}' exited with {}: {}", program, status, stderr.trim()),
            });
        }

        Ok(())
    }
}
