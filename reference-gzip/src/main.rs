//! Reference gzip compressor used as the packcheck baseline.
//!
//! Obeys the collaborator contract:
//!
//! ```text
//! reference-gzip <inputFile> <outputFile>       # compress
//! reference-gzip -d <inputFile> <outputFile>    # decompress
//! ```
//!
//! A missing input file or malformed arguments print usage text and exit
//! without writing any output.

use std::env;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let result = match args.as_slice() {
        [input, output] if Path::new(input).is_file() => compress(input, output),
        [flag, input, output] if flag == "-d" && Path::new(input).is_file() => {
            decompress(input, output)
        }
        _ => {
            show_usage();
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn show_usage() {
    println!("Usage:");
    println!("reference-gzip [-d] <inputFile> <outputFile>");
    println!("\t-d flag turns on the decompression mode");
    println!();
}

fn compress(input: &str, output: &str) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);
    let mut encoder = GzEncoder::new(writer, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()
}

fn decompress(input: &str, output: &str) -> io::Result<()> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(input)?));
    let mut writer = BufWriter::new(File::create(output)?);
    io::copy(&mut decoder, &mut writer)?;
    writer.flush()
}
