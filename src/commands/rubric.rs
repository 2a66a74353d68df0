use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::cli::RubricArgs;
use crate::config::EvaluationConfig;

pub fn run(args: RubricArgs) -> Result<()> {
    let config = EvaluationConfig::load(args.config.as_deref())?;

    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, &config)
        .context("failed to serialize rubric configuration")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
