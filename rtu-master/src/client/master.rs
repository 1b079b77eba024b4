use std::sync::Arc;

use tokio::sync::mpsc;

use crate::client::draft::{Draft, DraftFields};
use crate::client::message::{Command, Promise};
use crate::common::frame::{Request, Response};
use crate::common::function::FunctionCode;
use crate::error::*;
use crate::types::*;

/// Handle used to make requests on a master task
///
/// Handles are cheap to clone. Requests from every clone are executed one at a time,
/// in the order they were queued. The task shuts down once every handle is dropped.
#[derive(Debug, Clone)]
pub struct Master {
    tx: mpsc::Sender<Command>,
    draft: Option<Arc<Draft>>,
}

impl Master {
    pub(crate) fn new(tx: mpsc::Sender<Command>, draft: Option<Draft>) -> Self {
        Self {
            tx,
            draft: draft.map(Arc::new),
        }
    }

    /// Send a request to the device at `target` and wait for its reply
    ///
    /// The target and the request are checked before anything is queued.
    pub async fn invoke(&mut self, target: u16, request: Request) -> Result<Response, RequestError> {
        let target = UnitId::try_from(target)?;
        request.validate()?;

        let (promise, reply) = Promise::new();
        self.tx
            .send(Command::new(target, request, promise))
            .await
            .map_err(|_| Shutdown)?;
        reply.await?
    }

    /// Send the request named by `key` in the draft table, with `overrides` merged into its preset
    pub async fn request(
        &mut self,
        key: &str,
        target: u16,
        overrides: DraftFields,
    ) -> Result<Response, RequestError> {
        let request = self
            .draft
            .as_deref()
            .ok_or(InvalidRequest::NoDraft)?
            .resolve(key, overrides)?;
        self.invoke(target, request).await
    }

    /// Read coils from the device
    pub async fn read_coils(
        &mut self,
        target: u16,
        range: ReadRange,
    ) -> Result<Vec<bool>, RequestError> {
        match self.invoke(target, Request::ReadCoils(range)).await? {
            Response::ReadCoils(bits) => Ok(truncate(bits, range.quantity)),
            other => Err(unexpected(FunctionCode::ReadCoils, &other)),
        }
    }

    /// Read discrete inputs from the device
    pub async fn read_discrete_inputs(
        &mut self,
        target: u16,
        range: ReadRange,
    ) -> Result<Vec<bool>, RequestError> {
        match self.invoke(target, Request::ReadDiscreteInputs(range)).await? {
            Response::ReadDiscreteInputs(bits) => Ok(truncate(bits, range.quantity)),
            other => Err(unexpected(FunctionCode::ReadDiscreteInputs, &other)),
        }
    }

    /// Read holding registers from the device
    pub async fn read_holding_registers(
        &mut self,
        target: u16,
        range: ReadRange,
    ) -> Result<Vec<u16>, RequestError> {
        match self
            .invoke(target, Request::ReadHoldingRegisters(range))
            .await?
        {
            Response::ReadHoldingRegisters(registers) => Ok(truncate(registers, range.quantity)),
            other => Err(unexpected(FunctionCode::ReadHoldingRegisters, &other)),
        }
    }

    /// Read input registers from the device
    pub async fn read_input_registers(
        &mut self,
        target: u16,
        range: ReadRange,
    ) -> Result<Vec<u16>, RequestError> {
        match self
            .invoke(target, Request::ReadInputRegisters(range))
            .await?
        {
            Response::ReadInputRegisters(registers) => Ok(truncate(registers, range.quantity)),
            other => Err(unexpected(FunctionCode::ReadInputRegisters, &other)),
        }
    }

    /// Write a single coil on the device
    pub async fn write_single_coil(
        &mut self,
        target: u16,
        request: WriteSingle<bool>,
    ) -> Result<Echo<bool>, RequestError> {
        match self.invoke(target, Request::WriteSingleCoil(request)).await? {
            Response::WriteSingleCoil(echo) => Ok(echo),
            other => Err(unexpected(FunctionCode::WriteSingleCoil, &other)),
        }
    }

    /// Write a single register on the device
    pub async fn write_single_register(
        &mut self,
        target: u16,
        request: WriteSingle<u16>,
    ) -> Result<Echo<u16>, RequestError> {
        match self
            .invoke(target, Request::WriteSingleRegister(request))
            .await?
        {
            Response::WriteSingleRegister(echo) => Ok(echo),
            other => Err(unexpected(FunctionCode::WriteSingleRegister, &other)),
        }
    }

    /// Write a block of coils on the device
    pub async fn write_multiple_coils(
        &mut self,
        target: u16,
        request: WriteMultiple<bool>,
    ) -> Result<WriteAck, RequestError> {
        match self
            .invoke(target, Request::WriteMultipleCoils(request))
            .await?
        {
            Response::WriteMultipleCoils(ack) => Ok(ack),
            other => Err(unexpected(FunctionCode::WriteMultipleCoils, &other)),
        }
    }

    /// Write a block of registers on the device
    pub async fn write_multiple_registers(
        &mut self,
        target: u16,
        request: WriteMultiple<u16>,
    ) -> Result<WriteAck, RequestError> {
        match self
            .invoke(target, Request::WriteMultipleRegisters(request))
            .await?
        {
            Response::WriteMultipleRegisters(ack) => Ok(ack),
            other => Err(unexpected(FunctionCode::WriteMultipleRegisters, &other)),
        }
    }
}

// replies carry whole bytes of bits, drop the padding
fn truncate<T>(mut values: Vec<T>, quantity: u16) -> Vec<T> {
    values.truncate(usize::from(quantity));
    values
}

fn unexpected(expected: FunctionCode, received: &Response) -> RequestError {
    RequestError::UnexpectedResponse {
        expected,
        received: received.function(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::draft::{DraftEntry, DraftValue};

    fn handle(draft: Option<Draft>) -> (Master, mpsc::Receiver<Command>) {
        let (tx, rx) = mpsc::channel(4);
        (Master::new(tx, draft), rx)
    }

    #[tokio::test]
    async fn rejects_bad_requests_before_queuing() {
        let (mut master, mut rx) = handle(None);
        assert_eq!(
            master
                .read_coils(1, ReadRange::new(0, 0))
                .await,
            Err(RequestError::BadRequest(InvalidRequest::CountOfZero))
        );
        assert_eq!(
            master
                .read_holding_registers(300, ReadRange::new(0, 1))
                .await,
            Err(RequestError::BadRequest(InvalidRequest::TargetOutOfRange(
                300
            )))
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn draft_errors_are_reported_before_queuing() {
        let (mut master_without_draft, _rx) = handle(None);
        assert_eq!(
            master_without_draft
                .request("pump", 1, DraftFields::default())
                .await,
            Err(RequestError::BadRequest(InvalidRequest::NoDraft))
        );

        let draft = Draft::new().with(
            "pump",
            DraftEntry::new(FunctionCode::WriteSingleCoil, DraftFields::start(0x0010)),
        );
        let (mut master, mut rx) = handle(Some(draft));
        assert_eq!(
            master.request("fan", 1, DraftFields::default()).await,
            Err(RequestError::BadRequest(InvalidRequest::UnknownDraft(
                "fan".to_string()
            )))
        );
        assert_eq!(
            master.request("pump", 1, DraftFields::default()).await,
            Err(RequestError::BadRequest(InvalidRequest::MissingDraftField(
                "pump".to_string(),
                "value"
            )))
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn resolved_draft_is_queued() {
        let draft = Draft::new().with(
            "pump",
            DraftEntry::new(FunctionCode::WriteSingleCoil, DraftFields::start(0x0010)),
        );
        let (mut master, mut rx) = handle(Some(draft));
        let request = tokio::spawn(async move {
            master
                .request(
                    "pump",
                    7,
                    DraftFields::default().with_value(DraftValue::Coil(true)),
                )
                .await
        });

        let cmd = rx.recv().await.unwrap();
        assert_eq!(cmd.target, UnitId::new(7));
        assert_eq!(
            cmd.request,
            Request::WriteSingleCoil(WriteSingle::new(0x0010, true))
        );
        cmd.promise
            .success(Response::WriteSingleCoil(Echo::new(0x0010, true)));
        assert_eq!(
            request.await.unwrap(),
            Ok(Response::WriteSingleCoil(Echo::new(0x0010, true)))
        );
    }

    #[tokio::test]
    async fn typed_reads_drop_padding_bits() {
        let (mut master, mut rx) = handle(None);
        let request = tokio::spawn(async move { master.read_coils(1, ReadRange::new(0, 3)).await });

        let cmd = rx.recv().await.unwrap();
        cmd.promise.success(Response::ReadCoils(vec![
            true, false, true, false, false, false, false, false,
        ]));
        assert_eq!(request.await.unwrap(), Ok(vec![true, false, true]));
    }

    #[tokio::test]
    async fn dropped_task_reports_shutdown() {
        let (mut master, rx) = handle(None);
        drop(rx);
        assert_eq!(
            master.read_coils(1, ReadRange::new(0, 3)).await,
            Err(RequestError::Shutdown)
        );
    }
}
