use std::cmp::Ordering;
use std::time::Instant;

use sl_compiler::build_descriptor;
use sl_core::{false_positive_probability, BuildOptions, Filter};

use crate::descriptor;

pub struct BenchOptions {
    pub input_paths: Vec<String>,
    pub synthetic_hosts: usize,
    pub iterations: usize,
    pub options: BuildOptions,
}

struct BenchResult {
    ops: usize,
    avg_us: f64,
    p50_us: f64,
    p99_us: f64,
    safe_pct: f64,
}

pub fn run_bench(opts: BenchOptions) -> Result<(), String> {
    let hosts = if opts.input_paths.is_empty() {
        (0..opts.synthetic_hosts)
            .map(|i| format!("host-{}.example.com", i))
            .collect()
    } else {
        descriptor::load_hosts(&opts.input_paths, false)?
    };

    let build_start = Instant::now();
    let descriptor = build_descriptor(&hosts, opts.options);
    let build_ms = build_start.elapsed().as_secs_f64() * 1000.0;

    let decode_start = Instant::now();
    let linear = Filter::from_descriptor(&descriptor)
        .map_err(|e| format!("Invalid descriptor: {}", e))?;
    let decode_ms = decode_start.elapsed().as_secs_f64() * 1000.0;
    let sorted = linear.clone().into_sorted();

    let urls = bench_urls(&hosts);

    for _ in 0..100 {
        for url in &urls {
            let _ = linear.is_safe(url);
        }
    }

    println!("Check Benchmark");
    println!("==================================================");
    println!("  Hosts:        {}", hosts.len());
    println!("  Prefix:       {} bytes", opts.options.prefix_length);
    println!("  Data:         {} bytes base64", descriptor.data.len());
    println!("  Build:        {:.2}ms", build_ms);
    println!("  Decode:       {:.2}ms", decode_ms);
    println!(
        "  FP bound:     {:.3e}",
        false_positive_probability(opts.options.prefix_length, hosts.len())
    );
    println!();

    let linear_result = measure(&urls, opts.iterations, |url| linear.is_safe(url));
    let sorted_result = measure(&urls, opts.iterations, |url| sorted.is_safe(url));
    println!("{}", format_result("Linear scan", &linear_result));
    println!("{}", format_result("Binary search", &sorted_result));

    Ok(())
}

fn bench_urls(hosts: &[String]) -> Vec<String> {
    let mut urls: Vec<String> = hosts
        .iter()
        .step_by((hosts.len() / 50).max(1))
        .map(|host| format!("https://{}/path?q=1", host.trim()))
        .collect();
    urls.extend((0..urls.len().max(1)).map(|i| format!("https://unlisted-{}.example.org/", i)));
    urls.push("not a url".to_string());
    urls
}

fn measure(urls: &[String], iterations: usize, mut f: impl FnMut(&str) -> bool) -> BenchResult {
    let mut latencies = Vec::with_capacity(urls.len() * iterations);
    let mut safe = 0usize;

    for _ in 0..iterations {
        for url in urls {
            let start = Instant::now();
            if f(url) {
                safe += 1;
            }
            latencies.push(start.elapsed().as_secs_f64() * 1_000_000.0);
        }
    }

    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let ops = latencies.len();
    let avg_us = if ops == 0 { 0.0 } else { latencies.iter().sum::<f64>() / ops as f64 };

    BenchResult {
        ops,
        avg_us,
        p50_us: percentile(&latencies, 0.50),
        p99_us: percentile(&latencies, 0.99),
        safe_pct: if ops == 0 { 0.0 } else { safe as f64 * 100.0 / ops as f64 },
    }
}

fn format_result(name: &str, result: &BenchResult) -> String {
    format!(
        "{}:\n  Checks:      {}\n  Avg latency: {:.2}μs\n  P50 latency: {:.2}μs\n  P99 latency: {:.2}μs\n  Safe:        {:.1}%",
        name, result.ops, result.avg_us, result.p50_us, result.p99_us, result.safe_pct,
    )
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64) * p).ceil() as usize;
    let idx = idx.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_picks_nearest_rank() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.5), 2.0);
        assert_eq!(percentile(&values, 0.99), 4.0);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn test_bench_urls_mix_hits_and_misses() {
        let hosts: Vec<String> = (0..10).map(|i| format!("h{}.com", i)).collect();
        let urls = bench_urls(&hosts);
        assert_eq!(urls.len(), 10 + 10 + 1);
        assert_eq!(urls[0], "https://h0.com/path?q=1");
    }
}
