use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::ReadBuf;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Create a scripted transport and the handle used to drive it
///
/// Writes are accepted and reported as events unless a write error was queued.
/// Reads only complete when the handle provides data.
pub(crate) fn mock() -> (Mock, Handle) {
    let (read_tx, read_rx) = tokio::sync::mpsc::unbounded_channel();
    let (error_tx, error_rx) = tokio::sync::mpsc::unbounded_channel();
    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
    let mock = Mock {
        reads: read_rx,
        write_errors: error_rx,
        events: event_tx,
    };
    let handle = Handle {
        reads: read_tx,
        write_errors: error_tx,
        events: event_rx,
    };
    (mock, handle)
}

pub(crate) struct Mock {
    reads: UnboundedReceiver<ReadAction>,
    write_errors: UnboundedReceiver<ErrorKind>,
    // how events get pushed back to the test
    events: UnboundedSender<Event>,
}

pub(crate) struct Handle {
    reads: UnboundedSender<ReadAction>,
    write_errors: UnboundedSender<ErrorKind>,
    events: UnboundedReceiver<Event>,
}

#[derive(Debug)]
enum ReadAction {
    Data(Vec<u8>),
    Error(ErrorKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Write(Vec<u8>),
    WriteErr(ErrorKind),
}

impl Handle {
    pub(crate) fn read(&mut self, data: &[u8]) {
        self.reads.send(ReadAction::Data(data.to_vec())).unwrap()
    }

    pub(crate) fn read_error(&mut self, kind: ErrorKind) {
        self.reads.send(ReadAction::Error(kind)).unwrap()
    }

    /// fail the next write with this error
    pub(crate) fn write_error(&mut self, kind: ErrorKind) {
        self.write_errors.send(kind).unwrap()
    }

    pub(crate) async fn next_event(&mut self) -> Event {
        self.events.recv().await.unwrap()
    }

    pub(crate) fn pending_event(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }
}

impl tokio::io::AsyncRead for Mock {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context,
        buf: &mut ReadBuf,
    ) -> Poll<std::io::Result<()>> {
        match self.reads.poll_recv(cx) {
            Poll::Pending => Poll::Pending,
            // the test dropped the handle, report end of stream
            Poll::Ready(None) => Poll::Ready(Ok(())),
            Poll::Ready(Some(ReadAction::Data(bytes))) => {
                if buf.remaining() < bytes.len() {
                    panic!(
                        "Expecting a read for {:?} but only space for {} bytes",
                        bytes.as_slice(),
                        buf.remaining()
                    );
                }
                buf.put_slice(bytes.as_slice());
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Some(ReadAction::Error(kind))) => Poll::Ready(Err(kind.into())),
        }
    }
}

impl tokio::io::AsyncWrite for Mock {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        if let Ok(kind) = self.write_errors.try_recv() {
            self.events.send(Event::WriteErr(kind)).ok();
            return Poll::Ready(Err(kind.into()));
        }
        self.events.send(Event::Write(buf.to_vec())).ok();
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), std::io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        Poll::Ready(Ok(()))
    }
}
