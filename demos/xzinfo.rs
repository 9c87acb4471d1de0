//! Loads an xz-compressed image and prints what came out.
#[path = "common/logsetup.rs"]
mod logsetup;

use std::{
    fs,
    io::{Read, Seek},
    path::PathBuf,
    process,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::*;
use xzimage::{
    DecodedImage, IncrementalLoader, LoadObserver, LoaderOptions, StandardImageDecoder, XZ_FORMAT,
};

#[derive(Parser, Debug)]
struct Args {
    /// Verbosity (-v, -vv, -vvv, etc.)
    #[clap(short, long, parse(from_occurrences))]
    verbose: u8,

    #[clap(short, long, arg_enum, default_value = "auto")]
    color: logsetup::Color,

    /// Feed the file to an incremental loader in chunks of this many bytes
    #[clap(long)]
    chunk_size: Option<usize>,

    /// Size of the decompression window
    #[clap(long)]
    buffer_size: Option<usize>,

    /// Also accept legacy .lzma files
    #[clap(long)]
    lzma: bool,

    /// Refuse to decompress more than this many bytes
    #[clap(long)]
    max_decoded: Option<u64>,

    file: PathBuf,
}

struct Progress;

impl<I: DecodedImage> LoadObserver<I> for Progress {
    fn prepared(&mut self, image: &I) {
        info!("prepared {}x{} image", image.width(), image.height());
    }

    fn updated(&mut self, _image: &I, x: u32, y: u32, width: u32, height: u32) {
        info!("updated {width}x{height} at ({x}, {y})");
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    logsetup::init_logger(args.verbose, args.color)?;

    let mut options = LoaderOptions::new().with_accept_lzma_alone(args.lzma);
    if let Some(size) = args.buffer_size {
        options = options.with_buffer_size(size);
    }
    if let Some(limit) = args.max_decoded {
        options = options.with_decoded_size_limit(limit);
    }

    let mut file = fs::File::open(&args.file).context("Couldn't open input file")?;
    let mut head = Vec::with_capacity(6);
    file.by_ref()
        .take(6)
        .read_to_end(&mut head)
        .context("Couldn't read input file")?;
    if XZ_FORMAT.sniff(&head) == 0 {
        warn!("{} doesn't start with the {} signature", args.file.display(), XZ_FORMAT.name);
    }
    file.rewind().context("Couldn't rewind input file")?;

    let decoder = StandardImageDecoder::new();
    let (width, height, color) = match args.chunk_size {
        None => {
            let image = xzimage::load(file, &decoder, &options)?;
            (image.width(), image.height(), image.color())
        }
        Some(chunk_size) => {
            let mut loader = IncrementalLoader::begin(Progress, decoder, options)?;
            let mut chunk = vec![0u8; chunk_size.max(1)];
            loop {
                let n = file.read(&mut chunk).context("Couldn't read input file")?;
                if n == 0 {
                    break;
                }
                loader.push_chunk(&chunk[..n])?;
            }
            debug!("decompressed {} bytes", loader.decompressed_len());
            let image = loader.finish()?;
            (image.width(), image.height(), image.color())
        }
    };
    println!("{}: {width}x{height} {color:?}", args.file.display());
    Ok(())
}

fn main() {
    run().unwrap_or_else(|e| {
        error!("{:?}", e);
        process::exit(1);
    });
}
