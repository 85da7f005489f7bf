use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use ziptap_archive::{Compression, DEFAULT_CHUNK_SIZE, DEFAULT_ITEM_NAMES, DirectoryProvider};
use ziptap_deliver::{DEFAULT_PIPE_CAPACITY, DeliveryOptions};

#[derive(Clone, Debug, Parser)]
#[command(name = "ziptap", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = "127.0.0.1:8080", help = "Address to listen on")]
    pub bind: SocketAddr,

    #[arg(long, default_value = ".", help = "Directory holding the source items")]
    pub source_dir: PathBuf,

    #[arg(long = "item", default_values = DEFAULT_ITEM_NAMES, help = "Item to archive, in order")]
    pub items: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_PIPE_CAPACITY, help = "Bounded pipe size in bytes")]
    pub pipe_capacity: usize,

    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, help = "Transfer chunk in bytes")]
    pub chunk_size: usize,

    #[arg(long, default_value_t = Compression::Deflated, help = "stored or deflated")]
    pub compression: Compression,

    #[arg(long, help = "Directory for temporary archives [default: OS temp dir]")]
    pub temp_dir: Option<PathBuf>,
}

impl Args {
    pub fn delivery_options(&self) -> DeliveryOptions {
        let options = DeliveryOptions::default()
            .pipe_capacity(self.pipe_capacity)
            .chunk_size(self.chunk_size)
            .compression(self.compression);
        match &self.temp_dir {
            Some(dir) => options.temp_dir(dir),
            None => options,
        }
    }

    pub fn provider(&self) -> DirectoryProvider {
        DirectoryProvider::new(&self.source_dir, &self.items)
    }
}
