use tokio::io::{AsyncRead, AsyncWrite};
use tracing::Instrument;

use crate::client::task::MasterTask;
use crate::common::phys::PhysLayer;

pub use crate::client::draft::*;
pub use crate::client::master::Master;
pub use crate::client::options::MasterOptions;

mod draft;
mod master;
mod message;
mod options;
mod task;

/// Spawns a master task onto the runtime that talks over `io` and processes
/// requests from a bounded queue. The task completes when the returned handle and
/// all of its clones are dropped, or when `io` can no longer be read.
///
/// `io` may be any byte stream: a serial port, a TCP to serial gateway or an in-memory pipe.
///
/// * `io` - transport the frames are written to and read from
/// * `options` - timing, queue size, decoding and draft table
pub fn spawn_master<T>(io: T, options: MasterOptions) -> Master
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (handle, task) = create_master_handle_and_task(io, options);
    tokio::spawn(task);
    handle
}

/// Creates a master task, but does not spawn it. Most users will prefer
/// [`spawn_master`], unless they are using the library from outside the Tokio runtime
/// and need to spawn it using a Runtime handle instead of the `tokio::spawn` function.
///
/// * `io` - transport the frames are written to and read from
/// * `options` - timing, queue size, decoding and draft table
pub fn create_master_handle_and_task<T>(
    io: T,
    options: MasterOptions,
) -> (Master, impl std::future::Future<Output = ()>)
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    create(PhysLayer::new_io(io), options)
}

/// Opens a serial port and spawns a master task that talks over it
///
/// The port is opened before returning, so a missing device or bad settings are
/// reported here rather than on the first request.
///
/// * `path` - path of the port, e.g. `/dev/ttyUSB0` or `COM3`
/// * `settings` - baud rate and character framing of the port
/// * `options` - timing, queue size, decoding and draft table
#[cfg(feature = "serial")]
pub fn spawn_rtu_master(
    path: &str,
    settings: crate::serial::SerialSettings,
    options: MasterOptions,
) -> Result<Master, std::io::Error> {
    let stream = crate::serial::open(path, settings)?;
    tracing::info!("opened port {} at {} baud", path, settings.baud_rate);
    let (handle, task) = create(PhysLayer::new_serial(stream), options);
    tokio::spawn(task.instrument(tracing::info_span!("Modbus-RTU-Master", port = path)));
    Ok(handle)
}

fn create(
    mut io: PhysLayer,
    options: MasterOptions,
) -> (Master, impl std::future::Future<Output = ()>) {
    let (tx, rx) = tokio::sync::mpsc::channel(options.max_queued_requests.max(1));
    let mut task = MasterTask::new(rx, &options);
    let handle = Master::new(tx, options.draft);
    let future = async move {
        let err = task.run(&mut io).await;
        tracing::info!("master task stopped: {}", err);
    };
    (handle, future)
}
