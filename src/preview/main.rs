// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("live-camera-preview requires the 'std' feature");

use asimov_module::SysexitsError::{self, *};
use clap::Parser;
use clientele::StandardOptions;
use live_camera_module::{
    cli::{handle_error, info_user, parse_dimensions, report_event},
    shared::{
        CameraError, CameraEvent, CameraFacing, CameraPreviewScreen, Frame, PreviewConfig, Size,
        SurfaceListener, drivers::ffmpeg::FrameSurface, open_host,
    },
};
use std::{
    error::Error as StdError,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError, sync_channel},
    },
    time::Duration,
};

#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    /// Capture device; may be repeated. Defaults to every /dev/video* on Linux.
    #[arg(long = "device", value_name = "DEVICE")]
    devices: Vec<String>,

    #[arg(short, long = "size", value_parser = parse_dimensions, default_value = "320x240")]
    size: Size,

    #[arg(short, long, default_value_t = 30)]
    fps: u32,

    /// Clockwise rotation applied to still pictures, in degrees.
    #[arg(long, default_value_t = 270)]
    rotation: u32,

    #[arg(long, value_parser = parse_facing, default_value = "front")]
    facing: CameraFacing,
}

fn parse_facing(input: &str) -> Result<CameraFacing, CameraError> {
    input.parse()
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

    let exit_code = match run_preview(&options) {
        Ok(()) => EX_OK,
        Err(err) => handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

fn run_preview(opts: &Options) -> Result<(), CameraError> {
    info_user(&opts.flags, "starting camera preview");

    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit2 = Arc::clone(&quit);
        ctrlc::set_handler(move || {
            quit2.store(true, Ordering::SeqCst);
        })
        .map_err(|e| CameraError::other(format!("{e}")))?;
    }

    let mut config = PreviewConfig::new(opts.size.width, opts.size.height, opts.fps)
        .with_rotation(opts.rotation)
        .with_facing(opts.facing)
        .with_diagnostics(opts.flags.debug || opts.flags.verbose >= 3);
    for device in &opts.devices {
        config = config.with_device(device.clone());
    }
    config.validate()?;

    let (events_tx, events_rx) = sync_channel::<CameraEvent>(64);
    let host = open_host(&config, Some(events_tx.clone()))?;

    // The frame surface is the only thing this host "displays".
    let mut surface = FrameSurface::new(1, config.buffer_frames);
    let (updated_tx, updated_rx) = mpsc::channel::<u64>();
    surface.add_sink(Arc::new(move |frame: Frame| {
        let _ = updated_tx.send(frame.timestamp_ns);
    }));

    let mut screen = CameraPreviewScreen::new(host, config).with_events(events_tx);
    screen.on_surface_available(&surface, opts.size.width, opts.size.height)?;

    if let Some(camera) = screen.camera() {
        info_user(&opts.flags, &format!("selected camera: {} ({})", camera.id, camera.name));
    }
    if let Some(capture) = screen.capture_configuration() {
        info_user(&opts.flags, &format!("preview: {}", capture.preview_facts()));
    }

    while !quit.load(Ordering::SeqCst) {
        match updated_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(_) => screen.on_surface_updated(&surface),
            Err(RecvTimeoutError::Timeout) => {},
            Err(RecvTimeoutError::Disconnected) => break,
        }
        while let Ok(event) = events_rx.try_recv() {
            report_event(&opts.flags, &event);
        }
    }

    let _ = screen.on_surface_destroyed(&surface);
    surface.close();
    while let Ok(event) = events_rx.try_recv() {
        report_event(&opts.flags, &event);
    }
    Ok(())
}
