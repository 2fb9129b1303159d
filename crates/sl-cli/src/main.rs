//! Safelist CLI
//!
//! CLI tool for building host allow-list descriptors, checking URLs against
//! them and serving them over HTTP.

use std::path::Path;

use clap::{Parser, Subcommand};
use env_logger::Env;
use ts_rs::TS;

use sl_core::{BuildOptions, Filter, FilterDescriptor, PrefixLength};

mod bench;
mod descriptor;
mod serve;

#[derive(Parser)]
#[command(name = "sl-cli")]
#[command(about = "Safelist host allow-list compiler and tools")]
struct Cli {
    /// Verbose output (also enables debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a descriptor from host list files
    Build {
        /// Input host list files (.txt/.hosts lines, or .json arrays)
        #[arg(short, long, required = true)]
        input: Vec<String>,

        /// Output descriptor file
        #[arg(short, long, default_value = "url-data.json")]
        output: String,

        /// Bytes of SHA-256 kept per host
        #[arg(short, long, default_value_t = PrefixLength::DEFAULT.get())]
        prefix_length: usize,
    },

    /// Check URLs against a descriptor
    Check {
        /// Descriptor file
        #[arg(short, long, default_value = "url-data.json")]
        descriptor: String,

        /// Expected prefix length; fail if the descriptor differs
        #[arg(long)]
        expect_prefix_length: Option<usize>,

        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Validate a descriptor
    Validate {
        /// Descriptor file to validate
        #[arg(short, long)]
        input: String,
    },

    /// Dump descriptor info
    Info {
        /// Descriptor file to inspect
        #[arg(short, long)]
        input: String,
    },

    /// Build a descriptor and serve it over HTTP
    Serve {
        /// Input host list files
        #[arg(short, long, required = true)]
        input: Vec<String>,

        /// Bytes of SHA-256 kept per host
        #[arg(short, long, default_value_t = PrefixLength::DEFAULT.get())]
        prefix_length: usize,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,

        /// Port to listen on
        #[arg(long, default_value_t = 3200)]
        port: u16,

        /// Directory of static files served at /
        #[arg(long)]
        static_dir: Option<String>,
    },

    /// Measure check latency
    Bench {
        /// Host list files (synthetic hosts when omitted)
        #[arg(short, long)]
        input: Vec<String>,

        /// Synthetic host count
        #[arg(long, default_value_t = 5000)]
        hosts: usize,

        /// Passes over the URL set
        #[arg(long, default_value_t = 200)]
        iterations: usize,

        /// Bytes of SHA-256 kept per host
        #[arg(short, long, default_value_t = PrefixLength::DEFAULT.get())]
        prefix_length: usize,
    },

    /// Export TypeScript definitions for the descriptor
    Types {
        /// Output directory
        #[arg(short, long, default_value = "bindings")]
        output: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let result = match cli.command {
        Commands::Build {
            input,
            output,
            prefix_length,
        } => cmd_build(&input, &output, prefix_length, cli.verbose),
        Commands::Check {
            descriptor,
            expect_prefix_length,
            urls,
        } => cmd_check(&descriptor, expect_prefix_length, &urls),
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Info { input } => cmd_info(&input),
        Commands::Serve {
            input,
            prefix_length,
            bind,
            port,
            static_dir,
        } => cmd_serve(&input, prefix_length, bind, port, static_dir, cli.verbose),
        Commands::Bench {
            input,
            hosts,
            iterations,
            prefix_length,
        } => build_options(prefix_length).and_then(|options| {
            bench::run_bench(bench::BenchOptions {
                input_paths: input,
                synthetic_hosts: hosts,
                iterations,
                options,
            })
        }),
        Commands::Types { output } => cmd_types(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn build_options(prefix_length: usize) -> Result<BuildOptions, String> {
    let prefix_length = PrefixLength::new(prefix_length).map_err(|e| e.to_string())?;
    Ok(BuildOptions { prefix_length })
}

fn cmd_build(inputs: &[String], output: &str, prefix_length: usize, verbose: bool) -> Result<(), String> {
    let options = build_options(prefix_length)?;
    let (descriptor, stats, total_ms) = descriptor::compile_descriptor(inputs, options, verbose)?;
    descriptor::write_descriptor(Path::new(output), &descriptor)?;

    println!("Compiled {} host lists to '{}'", inputs.len(), output);
    println!("  Hosts:    {} ({} unique)", stats.hosts, stats.unique_hosts);
    println!("  Prefix:   {} bytes", options.prefix_length);
    println!("  Size:     {} bytes raw, {} bytes base64 ({:.1} KB)",
        stats.raw_bytes,
        stats.encoded_bytes,
        stats.encoded_bytes as f64 / 1024.0,
    );
    println!("  FP rate:  {:.3e}", stats.false_positive_rate);
    println!("  Time:     {:.1}ms", total_ms);

    Ok(())
}

fn cmd_check(path: &str, expect_prefix_length: Option<usize>, urls: &[String]) -> Result<(), String> {
    let descriptor = descriptor::read_descriptor(Path::new(path))?;

    if let Some(expected) = expect_prefix_length {
        let expected = PrefixLength::new(expected).map_err(|e| e.to_string())?;
        descriptor
            .expect_prefix_length(expected)
            .map_err(|e| format!("Invalid descriptor: {}", e))?;
    }

    let filter = Filter::from_descriptor(&descriptor)
        .map_err(|e| format!("Invalid descriptor: {}", e))?;

    for url in urls {
        let verdict = if filter.is_safe(url) { "SAFE" } else { "UNSAFE" };
        println!("{} -> {}", url, verdict);
    }

    Ok(())
}

fn cmd_validate(input: &str) -> Result<(), String> {
    let descriptor = descriptor::read_descriptor(Path::new(input))?;
    let filter = Filter::from_descriptor(&descriptor)
        .map_err(|e| format!("Invalid descriptor: {}", e))?;

    println!("Descriptor '{}' is valid", input);
    println!("  Records:     {}", filter.len());
    println!("  Prefix:      {} bytes", filter.prefix_length());

    Ok(())
}

fn cmd_info(input: &str) -> Result<(), String> {
    let descriptor = descriptor::read_descriptor(Path::new(input))?;
    let filter = Filter::from_descriptor(&descriptor)
        .map_err(|e| format!("Invalid descriptor: {}", e))?;

    let raw_bytes = filter.len() * filter.prefix_length().get();
    let mut distinct: Vec<&[u8]> = filter.records().collect();
    distinct.sort_unstable();
    distinct.dedup();

    println!("Descriptor: {}", input);
    println!("  Records:     {}", filter.len());
    println!("  Distinct:    {}", distinct.len());
    println!("  Prefix:      {} bytes", filter.prefix_length());
    println!("  Raw size:    {} bytes", raw_bytes);
    println!("  Base64 size: {} bytes ({:.1} KB)", descriptor.data.len(), descriptor.data.len() as f64 / 1024.0);
    println!(
        "  FP rate:     {:.3e}",
        sl_core::false_positive_probability(filter.prefix_length(), distinct.len())
    );

    Ok(())
}

fn cmd_serve(
    inputs: &[String],
    prefix_length: usize,
    bind: String,
    port: u16,
    static_dir: Option<String>,
    verbose: bool,
) -> Result<(), String> {
    let options = build_options(prefix_length)?;
    let (descriptor, stats, _) = descriptor::compile_descriptor(inputs, options, verbose)?;
    println!("Built descriptor for {} hosts", stats.hosts);

    serve::run_serve(
        descriptor,
        serve::ServeOptions {
            bind,
            port,
            static_dir,
        },
    )
}

fn cmd_types(output: &str) -> Result<(), String> {
    FilterDescriptor::export_all_to(output)
        .map_err(|e| format!("Failed to export TypeScript bindings to '{}': {}", output, e))?;
    println!("Exported FilterDescriptor.ts to '{}'", output);
    Ok(())
}
