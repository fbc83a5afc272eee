use std::path::PathBuf;
use std::time::Instant;

use anyhow::Error;
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use text_record_sort::order::Order;
use text_record_sort::sort::{Sort, DEFAULT_BUFFER_SIZE, DEFAULT_CHUNK_SIZE};

#[derive(Parser)]
#[command(name = "text-record-sort")]
#[command(about = "Sort a large file of '<number>. <text>' lines by text, then by number")]
struct Args {
    #[arg(help = "Input file")]
    input: PathBuf,

    #[arg(help = "Output file")]
    output: PathBuf,

    #[arg(long, help = "Directory for intermediate files [default: system temp dir]")]
    tmp_dir: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, help = "Records per sorted chunk")]
    chunk_size: usize,

    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE, help = "I/O buffer size in bytes")]
    buffer_size: usize,

    #[arg(long, default_value_t = 0, help = "Chunks sorted in parallel, 0 uses all cores")]
    tasks: usize,

    #[arg(long, help = "Fail on malformed lines instead of skipping them")]
    strict: bool,

    #[arg(long, help = "Sort in descending order")]
    desc: bool,

    #[arg(short, long, help = "Verbose output")]
    verbose: bool,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::Info } else { LevelFilter::Warn };
    SimpleLogger::new().with_level(level).init()?;

    let mut text_record_sort = Sort::new(args.input, args.output);
    if let Some(tmp_dir) = args.tmp_dir {
        text_record_sort.with_tmp_dir(tmp_dir);
    }
    text_record_sort.with_chunk_size(args.chunk_size);
    text_record_sort.with_buffer_size(args.buffer_size);
    text_record_sort.with_tasks(args.tasks);
    text_record_sort.with_strict(args.strict);
    if args.desc {
        text_record_sort.with_order(Order::Desc);
    }

    let start = Instant::now();
    let summary = text_record_sort.sort()?;
    println!("File sorted successfully! Records: {}, skipped lines: {}", summary.records(), summary.skipped());
    println!("Time spent: {:.2} seconds", start.elapsed().as_secs_f64());
    Ok(())
}
