use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use face_store::uploader::{self, UploadOutcome, DEFAULT_QUALITY, DEFAULT_SERVER_URL};

#[derive(Parser, Debug)]
#[command(name = "uploader", about = "Encodes an image and posts it to a face_store server")]
struct Args {
    /// Image file to upload (any format the image crate can open)
    image: PathBuf,

    /// Label stored alongside the image
    #[arg(long)]
    name: String,

    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server_url: String,

    /// JPEG quality
    #[arg(long, default_value_t = DEFAULT_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,
}

fn main() {
    face_store::init_tracing();
    let args = Args::parse();
    info!(image = %args.image.display(), url = %args.server_url, "uploading");

    match uploader::upload_image(&args.image, &args.name, &args.server_url, args.quality) {
        Ok(UploadOutcome::Uploaded) => println!("Data uploaded successfully"),
        Ok(UploadOutcome::Rejected { body, .. }) => {
            println!("Failed to upload data. Server response: {}", body)
        }
        Err(e) => println!("Error: {}", e),
    }
}
