use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

/// `results_<N>.csv` with N one past the highest existing run in `dir`.
pub fn next_results_path(dir: &Path) -> Result<PathBuf> {
    let next = numbered_results(dir, "csv")?
        .into_iter()
        .map(|(number, _)| number)
        .max()
        .map(|number| number + 1)
        .unwrap_or(1);
    Ok(dir.join(format!("results_{next}.csv")))
}

/// Highest-numbered `results_<N>.json` report in `dir`, if any.
pub fn latest_report_path(dir: &Path) -> Result<Option<PathBuf>> {
    let latest = numbered_results(dir, "json")?
        .into_iter()
        .max_by_key(|(number, _)| *number)
        .map(|(_, path)| path);
    Ok(latest)
}

fn numbered_results(dir: &Path, extension: &str) -> Result<Vec<(u64, PathBuf)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let pattern = Regex::new(&format!(r"^results_(\d+)\.{}$", regex::escape(extension)))
        .context("failed to compile results filename regex")?;

    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    let mut numbered = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(number) = pattern
            .captures(filename)
            .and_then(|captures| captures.get(1))
            .and_then(|value| value.as_str().parse::<u64>().ok())
        else {
            continue;
        };
        numbered.push((number, path));
    }

    Ok(numbered)
}
