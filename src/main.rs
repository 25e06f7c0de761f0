use anyhow::Result;
use blog_image_upload::app::ImageUploader;
use blog_image_upload::mime;
use blog_image_upload::models::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "blog-image-upload")]
#[command(about = "Detect image types and upload blog images")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the detected image type of each file.
    Detect {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Upload an image through the admin API and print its public URL.
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_image_upload=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match args.command {
        Command::Detect { files } => {
            let mut undetected = false;
            for file in &files {
                match mime::detect_path(file).await {
                    Some(mime) => println!("{}: {}", file.display(), mime),
                    None => {
                        undetected = true;
                        println!("{}: undetected", file.display());
                    }
                }
            }
            if undetected {
                std::process::exit(2);
            }
            Ok(())
        }
        Command::Upload { file } => {
            let config = Config::from_env()?;
            let uploader = ImageUploader::from_config(&config)?;

            info!("Uploading {}", file.display());
            match uploader.upload_path(&file).await {
                Ok(uploaded) => {
                    println!("{}", uploaded.public_url);
                    Ok(())
                }
                Err(e) => {
                    error!("Upload failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
