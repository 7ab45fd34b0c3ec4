//! Binary resource to JSON converter

use clap::Parser;
use n64audio::codec::json::decode_resource;
use n64audio::input::read_input;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "audio2json")]
#[command(version = "0.1.0")]
#[command(about = "Convert binary audio resources to JSON", long_about = None)]
struct Args {
    /// Input resource file (optionally gzip compressed)
    input: PathBuf,

    /// Output JSON file (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output compact JSON (default is pretty-printed)
    #[arg(short, long)]
    compact: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let data = read_input(&args.input)?;
    let resource = decode_resource(&data)?;
    log::debug!(
        "decoded {} v{} from {}",
        resource.resource,
        resource.version,
        args.input.display()
    );

    let json_string = if args.compact {
        serde_json::to_string(&resource)?
    } else {
        serde_json::to_string_pretty(&resource)?
    };

    match args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json_string.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => {
            println!("{}", json_string);
        }
    }

    Ok(())
}
