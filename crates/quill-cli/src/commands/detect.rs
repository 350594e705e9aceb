//! `quill detect`: dry-run the keyword scan without storing anything.

use std::io::{self, IsTerminal, Read};

use quill_core::KeywordDetector;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::DetectArgs;
use crate::errors::CliError;
use crate::output::print_detection;

pub fn handle_detect(ctx: &AppContext<'_>, args: &DetectArgs) -> anyhow::Result<()> {
    let text = match &args.text {
        Some(text) => text.clone(),
        None if !io::stdin().is_terminal() => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
            buffer
        }
        None => {
            return Err(CliError::invalid_input("Provide TEXT or pipe content via stdin").into())
        }
    };

    // Works before `quill init`; config extras apply once a config exists.
    let detector = if resolve_config_path()?.exists() {
        ctx.detector()?
    } else {
        KeywordDetector::new()
    };
    let detection = detector.detect(&text);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&detection)?);
    } else {
        print_detection(&detection);
    }
    Ok(())
}
