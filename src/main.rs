use clap::{Parser, ValueEnum};
use n64audio::archive::DirectorySink;
use n64audio::input::read_input;
use n64audio::export::ROOT_ARTIFACT_NAME;
use n64audio::{AudioAsset, ExportConfig, ExportFormat, Exporter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "n64audio")]
#[command(version = "0.1.0")]
#[command(about = "Export an N64 audio model as binary or XML resources", long_about = None)]
struct Args {
    /// Input audio model as JSON (optionally gzip compressed)
    input: PathBuf,

    /// Directory the artifacts are written below
    #[arg(short, long)]
    output: PathBuf,

    /// Metadata encoding
    #[arg(short, long, value_enum, default_value_t = Format::Xml)]
    format: Format,

    /// Prefix of artifact paths and sample references
    #[arg(short, long, default_value = "audio")]
    root: String,

    /// Name of the header-only root audio resource under the root
    #[arg(long, default_value = ROOT_ARTIFACT_NAME)]
    root_artifact: String,

    /// Leave out the root audio resource
    #[arg(long)]
    no_root_artifact: bool,

    /// Export slots whose sample is missing from the pool instead of failing
    #[arg(long)]
    lenient: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Xml,
    Binary,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Xml => ExportFormat::Xml,
            Format::Binary => ExportFormat::Binary,
        }
    }
}

fn main() -> Result<(), n64audio::Error> {
    env_logger::init();
    let args = Args::parse();

    let data = read_input(&args.input)?;
    let asset: AudioAsset = serde_json::from_slice(&data)?;

    let config = ExportConfig {
        root: args.root,
        format: args.format.into(),
        strict_references: !args.lenient,
        root_artifact: (!args.no_root_artifact).then_some(args.root_artifact),
        ..ExportConfig::default()
    };
    let artifacts = Exporter::new(config).export(&asset)?;

    let mut sink = DirectorySink::new(args.output);
    artifacts.write_to(&mut sink)?;
    log::info!(
        "wrote {} artifacts to {}",
        artifacts.len(),
        sink.root().display()
    );

    Ok(())
}
