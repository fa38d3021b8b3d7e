// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("live-camera-cataloger requires the 'std' feature");

use asimov_module::SysexitsError::{self, *};
use clap::Parser;
use clientele::StandardOptions;
use live_camera_module::{
    cli::{handle_error, info_user, warn_user},
    shared::{CameraError, PreviewConfig, open_host},
};
use serde_json::json;
use std::error::Error as StdError;

#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    /// Capture device to probe; may be repeated.
    #[arg(long = "device", value_name = "DEVICE")]
    devices: Vec<String>,

    #[arg(
        value_name = "FORMAT",
        short = 'o',
        long = "output",
        value_enum,
        default_value = "text"
    )]
    output: OutputFormat,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Jsonl,
}

pub fn main() -> Result<SysexitsError, Box<dyn StdError>> {
    asimov_module::dotenv().ok();
    let args = asimov_module::args_os()?;
    let options = Options::parse_from(args);

    if options.flags.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(EX_OK);
    }

    if options.flags.license {
        print!("{}", include_str!("../../UNLICENSE"));
        return Ok(EX_OK);
    }

    #[cfg(feature = "tracing")]
    asimov_module::init_tracing_subscriber(&options.flags).expect("failed to initialize logging");

    let exit_code = match run_cataloger(&options) {
        Ok(()) => EX_OK,
        Err(err) => handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

fn run_cataloger(options: &Options) -> Result<(), CameraError> {
    info_user(&options.flags, "enumerating camera devices");

    let mut config = PreviewConfig::default();
    for device in &options.devices {
        config = config.with_device(device.clone());
    }
    let host = open_host(&config, None)?;

    let count = host.number_of_cameras()?;
    if count == 0 {
        warn_user(&options.flags, "no camera devices found");
        return Ok(());
    }

    for index in 0..count {
        let info = host.camera_info(index)?;
        match options.output {
            OutputFormat::Text => {
                println!(
                    "{}: {} [{}, {}°]",
                    info.id, info.name, info.facing, info.orientation
                );
            },
            OutputFormat::Jsonl => {
                println!(
                    "{}",
                    json!({
                        "index": info.index,
                        "id": info.id,
                        "name": info.name,
                        "facing": info.facing.to_string(),
                        "orientation": info.orientation,
                    })
                );
            },
        }
    }

    Ok(())
}
