//! VM Manager - Main Entry Point
//!
//! Usage: vm-manager [OPTIONS] <init_file> <input_file> [output_file]
//!
//! Arguments:
//!   init_file   - Initialization file defining ST and PT entries
//!   input_file  - File containing virtual addresses to translate
//!   output_file - File to write physical addresses (or -1 for errors),
//!                 defaults to output-dp.txt
//!
//! Options:
//!   -v, --verbose       Log faults; repeat for every translation
//!   --frames N          Number of physical frames (default 1024)
//!   --frame-size N      Cells per frame (default 512)
//!   -h, --help          Print help information

use std::env;
use std::process;

use anyhow::{Context, bail};
use log::{Level, LevelFilter, Log, Metadata, Record, info};

use vm_manager::io::{SeedData, read_virtual_addresses, write_results};
use vm_manager::{DEFAULT_OUTPUT_FILE, VmConfig, VmManager};

/// Command-line configuration
struct Config {
    init_file: String,
    input_file: String,
    output_file: String,
    verbosity: u8,
    vm: VmConfig,
}

/// Writes log records to stderr.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Info => eprintln!("{}", record.args()),
            level => eprintln!("[{}] {}", level, record.args()),
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    init_logging(config.verbosity);

    if let Err(e) = run(&config) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn print_help(program: &str) {
    eprintln!("Virtual Memory Manager - Translates virtual addresses to physical addresses");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] <init_file> <input_file> [output_file]", program);
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  init_file   - Initialization file with ST/PT definitions");
    eprintln!("  input_file  - File containing virtual addresses (whitespace-separated)");
    eprintln!("  output_file - Output file for physical addresses (default {})", DEFAULT_OUTPUT_FILE);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -v, --verbose     Log faults and a summary; -vv logs every translation");
    eprintln!("  --frames N        Number of physical frames (default 1024)");
    eprintln!("  --frame-size N    Cells per frame, a power of two >= 512 (default 512)");
    eprintln!("  -h, --help        Print this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} init.txt input.txt output.txt", program);
    eprintln!("  {} -v --frames 64 init.txt input.txt", program);
}

fn parse_args() -> anyhow::Result<Config> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("vm-manager");

    let mut verbosity = 0u8;
    let mut vm = VmConfig::default();
    let mut positional: Vec<&String> = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help(program);
                process::exit(0);
            }
            "-v" | "--verbose" => verbosity = verbosity.saturating_add(1),
            "-vv" => verbosity = verbosity.saturating_add(2),
            "--frames" => vm.frame_count = option_value(arg, iter.next())?,
            "--frame-size" => vm.frame_size = option_value(arg, iter.next())?,
            _ if arg.starts_with('-') => {
                bail!("Unknown option: {}\nUse --help for usage information.", arg);
            }
            _ => positional.push(arg),
        }
    }

    if !(2..=3).contains(&positional.len()) {
        print_help(program);
        bail!("\nError: Expected 2 or 3 arguments, got {}", positional.len());
    }
    vm.validate()?;

    Ok(Config {
        init_file: positional[0].clone(),
        input_file: positional[1].clone(),
        output_file: positional
            .get(2)
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string()),
        verbosity,
        vm,
    })
}

fn option_value(option: &str, value: Option<&String>) -> anyhow::Result<usize> {
    let value = value.with_context(|| format!("{} needs a value", option))?;
    value
        .parse()
        .with_context(|| format!("invalid value {:?} for {}", value, option))
}

/// Main logic separated from main() for cleaner error handling
fn run(config: &Config) -> anyhow::Result<()> {
    let seed = SeedData::from_file(&config.init_file)
        .with_context(|| format!("reading init file {}", config.init_file))?;

    info!("=== VM Manager ===");
    info!("Init file:   {}", config.init_file);
    info!("Input file:  {}", config.input_file);
    info!("Output file: {}", config.output_file);
    info!(
        "Memory:      {} frames x {} cells{}",
        config.vm.frame_count,
        config.vm.frame_size,
        if seed.uses_store() { ", demand paging" } else { "" }
    );

    let mut vm = VmManager::new(config.vm)?;
    seed.apply(&mut vm)
        .with_context(|| format!("applying init file {}", config.init_file))?;
    info!(
        "Segment table entries: {}, page table entries: {}, free frames: {}",
        seed.st_entries.len(),
        seed.pt_entries.len(),
        vm.free_frames().free_count()
    );

    let vas = read_virtual_addresses(&config.input_file)
        .with_context(|| format!("reading input file {}", config.input_file))?;
    info!("Virtual addresses to translate: {}", vas.len());

    let results = vm.translate_batch(&vas).context("translation aborted")?;

    let stats = vm.stats();
    info!("=== Summary ===");
    info!("Successful translations: {}", stats.translations - stats.segmentation_faults);
    info!("Segmentation faults:     {}", stats.segmentation_faults);
    info!("Page table faults:       {}", stats.page_table_faults);
    info!("Page faults:             {}", stats.page_faults);
    info!("Frames left:             {}", vm.free_frames().free_count());

    write_results(&config.output_file, &results)
        .with_context(|| format!("writing output file {}", config.output_file))?;
    info!("Results written to: {}", config.output_file);

    Ok(())
}
