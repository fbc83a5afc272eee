use std::fs;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use data_encoding::HEXLOWER;
use rand::seq::SliceRandom;
use rand::Rng;

pub const SAMPLE_STRINGS: [&str; 7] = [
    "Apple",
    "Banana is yellow",
    "Cherry is the best",
    "Something something something",
    "Unique string 1",
    "Unique string 2",
    "Unique string 3",
];

pub fn setup() {
    let results_dir_path = PathBuf::from_str("./target/results/").unwrap();
    let parallel_results_dir_path = PathBuf::from_str("./target/parallel-results/").unwrap();

    if !results_dir_path.exists() {
        fs::create_dir_all(&results_dir_path).unwrap_or_else(|_|
            panic!("Failed to create results directory: {:?}", results_dir_path)
        );
    }

    if !parallel_results_dir_path.exists() {
        fs::create_dir_all(&parallel_results_dir_path).unwrap_or_else(|_|
            panic!("Failed to create parallel results directory: {:?}", parallel_results_dir_path)
        );
    }
}

#[allow(dead_code)]
pub fn read_lines(path: &Path) -> Result<Vec<String>, anyhow::Error> {
    let reader = BufReader::new(File::open(path)?);
    let lines = reader.lines().collect::<Result<_, _>>()?;
    Ok(lines)
}

#[allow(dead_code)]
pub fn write_lines(path: &Path, lines: &[&str]) -> Result<(), anyhow::Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

#[allow(dead_code)]
pub fn temp_file_name(dir: &str) -> PathBuf {
    let mut result = PathBuf::from(dir);
    let name = HEXLOWER.encode(&rand::random::<[u8; 16]>());
    result.push(name);
    result
}

/// Write `count` random records drawn from the sample strings
#[allow(dead_code)]
pub fn generate_random_records(path: &Path, count: usize) -> Result<(), anyhow::Error> {
    let mut rng = rand::thread_rng();
    let mut writer = BufWriter::new(File::create(path)?);
    for _ in 0..count {
        let number = rng.gen_range(1..100_000);
        let text = SAMPLE_STRINGS.choose(&mut rng).unwrap();
        writeln!(writer, "{}. {}", number, text)?;
    }
    writer.flush()?;
    Ok(())
}

/// Assert that every adjacent pair is ordered by text, then by number
#[allow(dead_code)]
pub fn assert_sorted(lines: &[String]) {
    for pair in lines.windows(2) {
        let (previous_number, previous_text) = split(&pair[0]);
        let (current_number, current_text) = split(&pair[1]);
        assert!(
            previous_text.as_bytes() <= current_text.as_bytes(),
            "out of order: {:?} before {:?}", pair[0], pair[1]
        );
        if previous_text == current_text {
            assert!(previous_number <= current_number, "out of order: {:?} before {:?}", pair[0], pair[1]);
        }
    }
}

/// Number of entries in a directory, zero if it does not exist
#[allow(dead_code)]
pub fn dir_entries(path: &Path) -> usize {
    fs::read_dir(path).map(|entries| entries.count()).unwrap_or(0)
}

fn split(line: &str) -> (i64, &str) {
    let (number, text) = line.split_once(". ").unwrap();
    (i64::from_str(number).unwrap(), text)
}
