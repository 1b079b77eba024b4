use tokio::sync::oneshot;

use crate::common::frame::{Request, Response};
use crate::error::RequestError;
use crate::types::UnitId;

/// A request queued for the master task along with the way to answer it
pub(crate) struct Command {
    pub(crate) target: UnitId,
    pub(crate) request: Request,
    pub(crate) promise: Promise,
}

impl Command {
    pub(crate) fn new(target: UnitId, request: Request, promise: Promise) -> Self {
        Self {
            target,
            request,
            promise,
        }
    }
}

pub(crate) struct Promise {
    sender: oneshot::Sender<Result<Response, RequestError>>,
}

impl Promise {
    pub(crate) fn new() -> (Self, oneshot::Receiver<Result<Response, RequestError>>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    pub(crate) fn failure(self, err: RequestError) {
        self.complete(Err(err))
    }

    pub(crate) fn success(self, response: Response) {
        self.complete(Ok(response))
    }

    fn complete(self, result: Result<Response, RequestError>) {
        // the caller may have stopped waiting
        self.sender.send(result).ok();
    }
}
