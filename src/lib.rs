//! This crate sorts text files of numbered records that do not fit in memory.
//!
//! Every line of the input is a record of the form `<number>. <text>`, for example
//! `415. Apple`. The output holds the same records ordered by text, compared byte by byte, and
//! records with equal text ordered by number. Lines that are not records are left out.
//!
//! The sort is an external merge sort. The input is read once and cut into chunks of a bounded
//! number of records. Chunks are sorted on a pool of worker threads, as many at a time as there
//! are tasks, and spilled to files in a private temporary directory. The sorted chunk files are
//! then merged into the output with a k-way merge. The temporary directory is removed when the
//! sort returns, whether it succeeded or not.
//!
//! Failures are reported as [anyhow::Error]. Missing input, a missing or unwritable destination,
//! a malformed line in strict mode and cancellation have a [error::SortError] root cause:
//!
//! ```
//! use std::path::PathBuf;
//! use text_record_sort::error::SortError;
//! use text_record_sort::sort::Sort;
//!
//! let text_record_sort = Sort::new(PathBuf::from("./no-such-input.txt"), PathBuf::from("./output.txt"));
//! let error = text_record_sort.sort().unwrap_err();
//! assert!(matches!(error.downcast_ref::<SortError>(), Some(SortError::SourceNotFound(_))));
//! ```
//!
//! # Examples
//! ```
//! use std::path::PathBuf;
//! use text_record_sort::order::Order;
//! use text_record_sort::sort::Sort;
//!
//! fn sort_records(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
//!     let mut text_record_sort = Sort::new(input, output);
//!
//!     // the number of chunks sorted at the same time. The default is to use all available
//!     // cores. Peak memory is roughly (tasks + 2) * chunk size records.
//!     text_record_sort.with_tasks(2);
//!     text_record_sort.with_chunk_size(1_000_000);
//!
//!     // set the directory for intermediate results. The default is the system temp dir -
//!     // std::env::temp_dir(), however, for large files it is recommended to provide a dedicated
//!     // directory for intermediate files, preferably on the same file system as the output result.
//!     text_record_sort.with_tmp_dir(tmp);
//!     text_record_sort.with_order(Order::Asc);
//!
//!     text_record_sort.sort()?;
//!     Ok(())
//! }
//! ```
//!

pub(crate) mod config;
pub(crate) mod record_reader;
pub(crate) mod chunk_iterator;
pub(crate) mod chunk_dir;
pub(crate) mod chunk_producer;
pub(crate) mod sort_command;
pub(crate) mod sorted_chunk_file;
pub(crate) mod unmerged_chunk_file;
pub(crate) mod merge;

pub mod error;
pub mod order;
pub mod record;
pub mod sort;
