//! # mapposter CLI
//!
//! Command-line interface for the poster service and local rendering.
//!
//! ## Usage
//!
//! ```bash
//! # Run the HTTP API
//! MAPBOX_TOKEN=... mapposter serve --listen 0.0.0.0:8080
//!
//! # Compose a heart-shaped preview from a saved map
//! mapposter render --map map.png --shape heart --text "Our Day" --date 2024-06-01 --out poster.png
//!
//! # Same poster as a 12x16 print PDF
//! mapposter render --map map.png --shape heart --out poster.pdf --pdf-size 12x16
//! ```

use clap::{Parser, Subcommand};
use image::DynamicImage;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use mapposter::{
    PosterError,
    caption::{FontConfig, FontSet},
    compose::{self, PosterOptions},
    print::{self, PrintSize},
    server::{self, ServerConfig},
    services::format_display_date,
    shape::Shape,
};

/// mapposter - Map poster compositor and print PDF generator
#[derive(Parser, Debug)]
#[command(name = "mapposter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Mapbox access token
        #[arg(long, env = "MAPBOX_TOKEN", default_value = "", hide_env_values = true)]
        mapbox_token: String,

        /// Fulfillment API key
        #[arg(long, env = "GELATO_API_KEY", default_value = "", hide_env_values = true)]
        gelato_api_key: String,

        /// Directory to search for caption fonts (repeatable)
        #[arg(long = "font-dir", value_name = "DIR")]
        font_dirs: Vec<PathBuf>,
    },

    /// Compose a poster from a local map image
    Render {
        /// Map raster (PNG, JPEG or WebP)
        #[arg(long, value_name = "FILE")]
        map: PathBuf,

        /// Output file (PNG, or PDF with --pdf-size)
        #[arg(long, value_name = "FILE")]
        out: PathBuf,

        /// Crop shape: rectangle, circle or heart
        #[arg(long, default_value = "rectangle")]
        shape: Shape,

        /// Free caption text
        #[arg(long, default_value = "")]
        text: String,

        /// Name line (bold)
        #[arg(long, default_value = "")]
        name: String,

        /// Date line; YYYY-MM-DD is formatted as "June 1, 2024"
        #[arg(long, default_value = "")]
        date: String,

        /// Canvas width in pixels
        #[arg(long, default_value_t = compose::DEFAULT_WIDTH)]
        width: u32,

        /// Canvas height in pixels
        #[arg(long, default_value_t = compose::DEFAULT_HEIGHT)]
        height: u32,

        /// Background colour
        #[arg(long, default_value = "#FFFFFF")]
        background: String,

        /// Caption colour
        #[arg(long, default_value = "#000000")]
        text_color: String,

        /// Write a print PDF at this trim size (8x10, 12x16, 16x20, 18x24, 24x36)
        #[arg(long, value_name = "SIZE")]
        pdf_size: Option<String>,

        /// Directory to search for caption fonts (repeatable)
        #[arg(long = "font-dir", value_name = "DIR")]
        font_dirs: Vec<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn font_config(dirs: &[PathBuf]) -> FontConfig {
    if dirs.is_empty() {
        FontConfig::default()
    } else {
        FontConfig::from_dirs(dirs)
    }
}

fn run() -> Result<(), PosterError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            mapbox_token,
            gelato_api_key,
            font_dirs,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                mapbox_token,
                gelato_api_key,
                fonts: font_config(&font_dirs),
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))
        }

        Commands::Render {
            map,
            out,
            shape,
            text,
            name,
            date,
            width,
            height,
            background,
            text_color,
            pdf_size,
            font_dirs,
        } => {
            // Reject a bad size before reading or composing anything
            let pdf_size = pdf_size.as_deref().map(str::parse::<PrintSize>).transpose()?;

            let map_bytes = std::fs::read(&map)?;
            let options = PosterOptions {
                text,
                name,
                date: format_display_date(&date),
                width,
                height,
                background_color: background,
                text_color,
                shape,
                ..Default::default()
            };
            let fonts = Arc::new(FontSet::load(&font_config(&font_dirs)));
            let poster = compose::compose(&map_bytes, &options, fonts)?;

            let bytes = match pdf_size {
                Some(size) => print::to_print_pdf(&DynamicImage::ImageRgba8(poster), size)?,
                None => compose::encode_png(&poster)?,
            };
            std::fs::write(&out, &bytes)?;
            info!("Wrote {} ({} bytes)", out.display(), bytes.len());
            Ok(())
        }
    }
}
