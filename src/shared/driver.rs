// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraError, CameraInfo, CameraParameters, FpsSample, Frame, PreviewSurface};
use derive_more::Display;
use std::{
    io,
    sync::{
        Arc, RwLock,
        atomic::{AtomicBool, Ordering},
        mpsc::{SyncSender, TrySendError, sync_channel},
    },
    thread::JoinHandle,
    time::Duration,
};

pub type FrameSink = Arc<dyn Fn(Frame) + Send + Sync + 'static>;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum CameraBackend {
    #[display("android")]
    Android,
    #[display("ffmpeg")]
    Ffmpeg,
    #[display("simulated")]
    Simulated,
}

#[derive(Debug)]
pub enum CameraEvent {
    Started {
        backend: CameraBackend,
    },
    Stopped {
        backend: CameraBackend,
    },
    FrameDropped {
        backend: CameraBackend,
    },
    FrameRate {
        backend: CameraBackend,
        sample: FpsSample,
    },
    Warning {
        backend: CameraBackend,
        message: String,
    },
    Error {
        backend: CameraBackend,
        error: CameraError,
    },
}

/// The platform camera service: enumerates and opens devices.
pub trait CameraHost: dogma::Named + Send {
    fn backend(&self) -> CameraBackend;
    fn number_of_cameras(&self) -> Result<usize, CameraError>;
    fn camera_info(&self, index: usize) -> Result<CameraInfo, CameraError>;
    fn open(&mut self, index: usize) -> Result<Box<dyn CameraDevice>, CameraError>;
}

/// An opened camera. Stopping and releasing are infallible, matching the
/// platform contracts they wrap.
pub trait CameraDevice: Send {
    fn parameters(&self) -> Result<CameraParameters, CameraError>;
    fn set_parameters(&mut self, params: &CameraParameters) -> Result<(), CameraError>;
    fn set_preview_surface(&mut self, surface: &dyn PreviewSurface) -> io::Result<()>;
    fn start_preview(&mut self) -> Result<(), CameraError>;
    fn stop_preview(&mut self);
    fn release(&mut self);
}

pub enum FrameMsg {
    Frame(Frame),
    Stop,
}

/// Fans frames from a capture thread out to registered sinks on its own
/// thread, so slow sinks never stall the capture loop.
pub struct Dispatcher {
    tx: SyncSender<FrameMsg>,
    sinks: Arc<RwLock<Vec<FrameSink>>>,
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(capacity: usize, backend: CameraBackend) -> Self {
        let (tx, rx) = sync_channel::<FrameMsg>(capacity.max(1));
        let sinks: Arc<RwLock<Vec<FrameSink>>> = Arc::new(RwLock::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let sinks2 = Arc::clone(&sinks);
        let stop2 = Arc::clone(&stop);

        let join = std::thread::spawn(move || {
            tracing::debug!(%backend, "frame dispatcher started");

            while !stop2.load(Ordering::Relaxed) {
                match rx.recv_timeout(Duration::from_millis(200)) {
                    Ok(FrameMsg::Frame(frame)) => {
                        if let Ok(list) = sinks2.read() {
                            for s in list.iter() {
                                (s)(frame.clone());
                            }
                        }
                    },
                    Ok(FrameMsg::Stop) => break,
                    Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
                    Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }

            tracing::debug!(%backend, "frame dispatcher stopped");
        });

        Self {
            tx,
            sinks,
            stop,
            join: Some(join),
        }
    }

    pub fn sender(&self) -> SyncSender<FrameMsg> {
        self.tx.clone()
    }

    pub fn add_sink(&self, sink: FrameSink) {
        if let Ok(mut g) = self.sinks.write() {
            g.push(sink);
        }
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.tx.try_send(FrameMsg::Stop);
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn emit(events_tx: Option<&SyncSender<CameraEvent>>, event: CameraEvent) {
    if let Some(tx) = events_tx {
        let _ = tx.try_send(event);
    }
}

pub fn report_drop(events_tx: Option<&SyncSender<CameraEvent>>, backend: CameraBackend) {
    emit(events_tx, CameraEvent::FrameDropped { backend });
}

pub fn try_send_frame(
    frame_tx: &SyncSender<FrameMsg>,
    events_tx: Option<&SyncSender<CameraEvent>>,
    backend: CameraBackend,
    frame: Frame,
) {
    match frame_tx.try_send(FrameMsg::Frame(frame)) {
        Ok(()) => {},
        Err(TrySendError::Full(_)) => report_drop(events_tx, backend),
        Err(TrySendError::Disconnected(_)) => {
            emit(events_tx, CameraEvent::Error {
                backend,
                error: CameraError::Closed,
            });
        },
    }
}
