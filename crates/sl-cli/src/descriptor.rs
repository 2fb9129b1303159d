use std::fs;
use std::path::Path;
use std::time::Instant;

use sl_compiler::{build_descriptor_with_stats, parse_host_list, parse_host_list_json, BuildStats};
use sl_core::{BuildOptions, FilterDescriptor};

/// Read hosts from one or more list files, in argument order.
///
/// `.json` files hold an array of strings; anything else is a line-oriented
/// host list.
pub fn load_hosts(inputs: &[String], verbose: bool) -> Result<Vec<String>, String> {
    if inputs.is_empty() {
        return Err("No input files specified".to_string());
    }

    let mut hosts = Vec::new();

    for (list_id, path) in inputs.iter().enumerate() {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path, e))?;

        let is_json = Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            parse_host_list_json(&content)
                .map_err(|e| format!("Failed to parse '{}': {}", path, e))?
        } else {
            parse_host_list(&content)
        };

        if verbose {
            println!(
                "  [{}] {} - {} hosts, {} warnings",
                list_id,
                Path::new(path).file_name().unwrap_or_default().to_string_lossy(),
                parsed.hosts.len(),
                parsed.warnings.len()
            );
        }

        hosts.extend(parsed.hosts);
    }

    if hosts.is_empty() {
        return Err("Input files contain no hosts".to_string());
    }

    Ok(hosts)
}

pub fn compile_descriptor(
    inputs: &[String],
    options: BuildOptions,
    verbose: bool,
) -> Result<(FilterDescriptor, BuildStats, f64), String> {
    let start = Instant::now();
    let hosts = load_hosts(inputs, verbose)?;
    let (descriptor, stats) = build_descriptor_with_stats(&hosts, options);

    descriptor
        .decode_records()
        .map_err(|e| format!("Generated descriptor failed validation: {}", e))?;

    Ok((descriptor, stats, start.elapsed().as_secs_f64() * 1000.0))
}

pub fn write_descriptor(path: &Path, descriptor: &FilterDescriptor) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    let json = serde_json::to_string_pretty(descriptor)
        .map_err(|e| format!("Failed to serialize descriptor: {}", e))?;
    fs::write(path, json)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
    Ok(())
}

pub fn read_descriptor(path: &Path) -> Result<FilterDescriptor, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Invalid descriptor '{}': {}", path.display(), e))
}
