use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::Instrument;

use crate::client::message::Command;
use crate::client::options::MasterOptions;
use crate::common::frame::{Request, RequestDisplay, Response, ResponseDisplay};
use crate::common::phys::PhysLayer;
use crate::decode::DecodeLevel;
use crate::error::*;
use crate::exception::ModbusException;
use crate::serial::extractor::FramedReader;
use crate::serial::frame::{encode_request, RtuDisplay};
use crate::types::UnitId;

/// Reasons for the master task to stop
#[derive(Debug, PartialEq)]
pub(crate) enum SessionError {
    /// reading from the transport failed or reached the end of the stream
    IoError(std::io::ErrorKind),
    /// every handle was dropped
    Shutdown,
}

impl From<Shutdown> for SessionError {
    fn from(_: Shutdown) -> Self {
        SessionError::Shutdown
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SessionError::IoError(err) => write!(f, "I/O error: {err}"),
            SessionError::Shutdown => f.write_str("shutdown was requested"),
        }
    }
}

/// Owns the transport and executes one command at a time
pub(crate) struct MasterTask {
    rx: mpsc::Receiver<Command>,
    reader: FramedReader,
    threshold: Duration,
    throttle: Duration,
    decode: DecodeLevel,
    // set when the transport can no longer be read
    read_failure: Option<std::io::ErrorKind>,
}

impl MasterTask {
    pub(crate) fn new(rx: mpsc::Receiver<Command>, options: &MasterOptions) -> Self {
        Self {
            rx,
            reader: FramedReader::new(options.flush_rate, options.decode.frame),
            threshold: options.threshold,
            throttle: options.throttle,
            decode: options.decode,
            read_failure: None,
        }
    }

    pub(crate) async fn run(&mut self, io: &mut PhysLayer) -> SessionError {
        loop {
            if let Err(err) = self.poll(io).await {
                tracing::warn!("ending session: {}", err);
                return err;
            }
        }
    }

    async fn poll(&mut self, io: &mut PhysLayer) -> Result<(), SessionError> {
        tokio::select! {
            packet = self.reader.next_packet(io, self.decode) => {
                match packet {
                    Ok(packet) => {
                        tracing::warn!(
                            "dropping {} from {:?} received while no request was pending",
                            packet.frame.function(),
                            packet.target
                        );
                        Ok(())
                    }
                    Err(err) => Err(SessionError::IoError(err.kind())),
                }
            }
            cmd = self.rx.recv() => {
                let cmd = cmd.ok_or(Shutdown)?;
                self.run_one_request(io, cmd).await
            }
        }
    }

    async fn run_one_request(
        &mut self,
        io: &mut PhysLayer,
        cmd: Command,
    ) -> Result<(), SessionError> {
        let Command {
            target,
            request,
            promise,
        } = cmd;

        let result = self
            .execute_request(io, target, &request)
            .instrument(tracing::info_span!(
                "Request",
                target = %target,
                function = %request.function()
            ))
            .await;

        match result {
            Ok(response) => promise.success(response),
            Err(err) => {
                tracing::warn!("request error: {}", err);
                promise.failure(err);
            }
        }

        match self.read_failure.take() {
            Some(kind) => Err(SessionError::IoError(kind)),
            None => Ok(()),
        }
    }

    async fn execute_request(
        &mut self,
        io: &mut PhysLayer,
        target: UnitId,
        request: &Request,
    ) -> Result<Response, RequestError> {
        if !self.throttle.is_zero() {
            tokio::time::sleep(self.throttle).await;
        }

        // nothing received before this point can be the reply
        self.reader.reset();
        io.flush().await?;

        let bytes = encode_request(target, request)?;
        if self.decode.pdu.enabled() {
            tracing::info!("PDU TX - {}", RequestDisplay::new(self.decode.pdu, request));
        }
        if self.decode.frame.enabled() {
            tracing::info!("RTU TX - {}", RtuDisplay::new(self.decode.frame, &bytes));
        }
        io.write(&bytes, self.decode.physical).await?;

        let deadline = Instant::now() + self.threshold;

        // the first packet is the reply
        let packet = tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                return Err(RequestError::ResponseTimeout);
            }
            packet = self.reader.next_packet(io, self.decode) => packet,
        };

        let packet = match packet {
            Ok(packet) => packet,
            Err(err) => {
                self.read_failure = Some(err.kind());
                return Err(err.into());
            }
        };

        if self.decode.pdu.enabled() {
            tracing::info!(
                "PDU RX - {}",
                ResponseDisplay::new(self.decode.pdu, &packet.frame)
            );
        }

        match packet.frame {
            Response::Exception(ex) => Err(ModbusException::new(ex.code, ex.error).into()),
            response if response.function() != request.function() => {
                Err(RequestError::UnexpectedResponse {
                    expected: request.function(),
                    received: response.function(),
                })
            }
            response => Ok(response),
        }
    }
}
