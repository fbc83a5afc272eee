use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;
use text_record_sort::sort::Sort;

mod common;

#[test]
fn test_parallel_sort() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/parallel-results/");
    let output_path = common::temp_file_name("./target/parallel-results/");
    let tmp_path = PathBuf::from("./target/parallel-results/");
    common::generate_random_records(&input_path, 50_000)?;

    let mut text_record_sort = Sort::new(input_path.clone(), output_path.clone());
    text_record_sort.with_tasks(15);
    text_record_sort.with_chunk_size(999);
    text_record_sort.with_tmp_dir(tmp_path.clone());
    let summary = text_record_sort.sort()?;

    let lines = common::read_lines(&output_path)?;
    assert_eq!(lines.len(), 50_000);
    assert_eq!(summary.chunks(), 51);
    common::assert_sorted(&lines);
    fs::remove_file(input_path)?;
    fs::remove_file(output_path)?;
    Ok(())
}

#[test]
fn test_output_independent_of_tasks_and_chunks() -> Result<(), anyhow::Error> {
    common::setup();
    let input_path = common::temp_file_name("./target/parallel-results/");
    common::generate_random_records(&input_path, 30_000)?;

    let settings = [(1, 30_000), (2, 4_000), (8, 1_000), (15, 333)];
    let outputs = settings
        .iter()
        .map(|(tasks, chunk_size)| -> Result<Vec<u8>, anyhow::Error> {
            let output_path = common::temp_file_name("./target/parallel-results/");
            let mut text_record_sort = Sort::new(input_path.clone(), output_path.clone());
            text_record_sort.with_tasks(*tasks);
            text_record_sort.with_chunk_size(*chunk_size);
            text_record_sort.with_tmp_dir("./target/parallel-results/".into());
            text_record_sort.sort()?;
            let content = fs::read(&output_path)?;
            fs::remove_file(output_path)?;
            Ok(content)
        })
        .collect::<Result<Vec<Vec<u8>>, anyhow::Error>>()?;

    for output in &outputs[1..] {
        assert_eq!(output, &outputs[0]);
    }
    fs::remove_file(input_path)?;
    Ok(())
}

#[test]
fn test_concurrent_sorts_share_tmp_dir() -> Result<(), anyhow::Error> {
    common::setup();
    let tmp_path = common::temp_file_name("./target/parallel-results/");

    let results = (0..4)
        .into_par_iter()
        .map(|i| -> Result<usize, anyhow::Error> {
            let input_path = common::temp_file_name("./target/parallel-results/");
            let output_path = common::temp_file_name("./target/parallel-results/");
            common::generate_random_records(&input_path, 5_000 + i * 1_000)?;

            let mut text_record_sort = Sort::new(input_path.clone(), output_path.clone());
            text_record_sort.with_tasks(2);
            text_record_sort.with_chunk_size(500);
            text_record_sort.with_tmp_dir(tmp_path.clone());
            text_record_sort.sort()?;

            let lines = common::read_lines(&output_path)?;
            common::assert_sorted(&lines);
            fs::remove_file(input_path)?;
            fs::remove_file(output_path)?;
            Ok(lines.len())
        })
        .collect::<Result<Vec<usize>, anyhow::Error>>()?;

    assert_eq!(results, vec![5_000, 6_000, 7_000, 8_000]);
    assert_eq!(common::dir_entries(&tmp_path), 0);
    fs::remove_dir(tmp_path)?;
    Ok(())
}
