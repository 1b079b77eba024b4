use std::pin::Pin;
use std::task::Poll;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};

use crate::decode::PhysDecodeLevel;

/// Any byte stream the master can run over
pub(crate) trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// The byte stream under the master, with traffic logging
pub(crate) struct PhysLayer {
    link: Link,
}

enum Link {
    Stream(Box<dyn Transport>),
    #[cfg(feature = "serial")]
    Serial(SerialLine),
}

/// A serial port that keeps the line silent between frames
#[cfg(feature = "serial")]
struct SerialLine {
    port: tokio_serial::SerialStream,
    silence: tokio::time::Duration,
    last_activity: Option<tokio::time::Instant>,
}

impl std::fmt::Debug for PhysLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.link {
            Link::Stream(_) => f.write_str("Stream"),
            #[cfg(feature = "serial")]
            Link::Serial(line) => write!(f, "Serial (silence = {:?})", line.silence),
        }
    }
}

impl PhysLayer {
    pub(crate) fn new_io<T>(io: T) -> Self
    where
        T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        Self {
            link: Link::Stream(Box::new(io)),
        }
    }

    #[cfg(feature = "serial")]
    pub(crate) fn new_serial(port: tokio_serial::SerialStream) -> Self {
        let silence = frame_silence(&port);
        tracing::debug!("inter-frame silence: {} μs", silence.as_micros());
        Self {
            link: Link::Serial(SerialLine {
                port,
                silence,
                last_activity: None,
            }),
        }
    }

    pub(crate) async fn read(
        &mut self,
        buffer: &mut [u8],
        level: PhysDecodeLevel,
    ) -> Result<usize, std::io::Error> {
        let count = match &mut self.link {
            Link::Stream(io) => io.read(buffer).await?,
            #[cfg(feature = "serial")]
            Link::Serial(line) => line.read(buffer).await?,
        };

        if level.enabled() {
            if let Some(data) = buffer.get(..count) {
                tracing::info!("PHYS RX - {}", PhysDisplay::new(level, data));
            }
        }

        Ok(count)
    }

    pub(crate) async fn write(
        &mut self,
        data: &[u8],
        level: PhysDecodeLevel,
    ) -> Result<(), std::io::Error> {
        if level.enabled() {
            tracing::info!("PHYS TX - {}", PhysDisplay::new(level, data));
        }

        match &mut self.link {
            Link::Stream(io) => io.write_all(data).await,
            #[cfg(feature = "serial")]
            Link::Serial(line) => line.write(data).await,
        }
    }

    /// Discard pending input and push out anything buffered for output
    pub(crate) async fn flush(&mut self) -> Result<(), std::io::Error> {
        match &mut self.link {
            Link::Stream(io) => {
                discard_ready_input(io).await?;
                io.flush().await
            }
            #[cfg(feature = "serial")]
            Link::Serial(line) => line.flush().await,
        }
    }
}

/// Read and drop whatever the stream can deliver without waiting
async fn discard_ready_input<T>(io: &mut T) -> Result<(), std::io::Error>
where
    T: AsyncRead + Unpin + ?Sized,
{
    let mut scratch = [0u8; 64];
    std::future::poll_fn(|cx| loop {
        let mut buffer = ReadBuf::new(&mut scratch);
        match Pin::new(&mut *io).poll_read(cx, &mut buffer) {
            Poll::Ready(Ok(())) if !buffer.filled().is_empty() => {
                tracing::debug!("discarded {} stale bytes", buffer.filled().len());
            }
            // end of stream is left for the next read to report
            Poll::Ready(Ok(())) | Poll::Pending => return Poll::Ready(Ok(())),
            Poll::Ready(Err(err)) => return Poll::Ready(Err(err)),
        }
    })
    .await
}

#[cfg(feature = "serial")]
impl SerialLine {
    async fn read(&mut self, buffer: &mut [u8]) -> Result<usize, std::io::Error> {
        let count = self.port.read(buffer).await?;
        self.last_activity = Some(tokio::time::Instant::now());
        Ok(count)
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), std::io::Error> {
        if let Some(last) = self.last_activity {
            tokio::time::sleep_until(last + self.silence).await;
        }
        self.port.write_all(data).await?;
        self.last_activity = Some(tokio::time::Instant::now());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), std::io::Error> {
        use tokio_serial::SerialPort;

        self.port.clear(tokio_serial::ClearBuffer::Input)?;
        self.port.flush().await
    }
}

/// 3.5 character times computed from the framing of the port, fixed at 1750 μs above 19200 baud
#[cfg(feature = "serial")]
fn frame_silence(port: &tokio_serial::SerialStream) -> tokio::time::Duration {
    use tokio::time::Duration;
    use tokio_serial::{DataBits, Parity, SerialPort, StopBits};

    const FIXED_ABOVE_BAUD: u32 = 19200;
    const FIXED_SILENCE: Duration = Duration::from_micros(1750);

    let data_bits: u64 = match port.data_bits() {
        Ok(DataBits::Five) => 5,
        Ok(DataBits::Six) => 6,
        Ok(DataBits::Seven) => 7,
        Ok(DataBits::Eight) | Err(_) => 8,
    };
    let parity_bits: u64 = match port.parity() {
        Ok(Parity::None) => 0,
        Ok(Parity::Odd | Parity::Even) | Err(_) => 1,
    };
    let stop_bits: u64 = match port.stop_bits() {
        Ok(StopBits::One) => 1,
        Ok(StopBits::Two) | Err(_) => 2,
    };
    // start bit included
    let bits_per_char = 1 + data_bits + parity_bits + stop_bits;

    match port.baud_rate() {
        Ok(baud) if baud > 0 && baud <= FIXED_ABOVE_BAUD => {
            Duration::from_secs(bits_per_char) * 7 / (2 * baud)
        }
        Ok(_) => FIXED_SILENCE,
        Err(err) => {
            tracing::warn!("unable to read the baud rate ({}), assuming a fast line", err);
            FIXED_SILENCE
        }
    }
}

pub(crate) struct PhysDisplay<'a> {
    level: PhysDecodeLevel,
    data: &'a [u8],
}

impl<'a> PhysDisplay<'a> {
    pub(crate) fn new(level: PhysDecodeLevel, data: &'a [u8]) -> Self {
        Self { level, data }
    }
}

impl std::fmt::Display for PhysDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} bytes", self.data.len())?;
        if self.level.data_enabled() {
            write_hex_lines(f, self.data)?;
        }
        Ok(())
    }
}

const BYTES_PER_LINE: usize = 18;

/// Hex dump, one line per 18 bytes, each line preceded by a newline
pub(crate) fn write_hex_lines(f: &mut std::fmt::Formatter, bytes: &[u8]) -> std::fmt::Result {
    for line in bytes.chunks(BYTES_PER_LINE) {
        writeln!(f)?;
        for (i, byte) in line.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_length_or_data() {
        let data = [0x01, 0x83, 0x02];
        assert_eq!(
            PhysDisplay::new(PhysDecodeLevel::Length, &data).to_string(),
            "3 bytes"
        );
        assert_eq!(
            PhysDisplay::new(PhysDecodeLevel::Data, &data).to_string(),
            "3 bytes\n01 83 02"
        );
    }

    #[test]
    fn wraps_long_dumps() {
        let data = [0xAB; 20];
        let text = PhysDisplay::new(PhysDecodeLevel::Data, &data).to_string();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(text.lines().last(), Some("AB AB"));
    }

    #[tokio::test]
    async fn reads_and_writes_through_any_stream() {
        let io = tokio_test::io::Builder::new()
            .write(&[0x01, 0x03])
            .read(&[0x01, 0x83, 0x02])
            .build();
        let mut phys = PhysLayer::new_io(io);
        phys.write(&[0x01, 0x03], PhysDecodeLevel::Data)
            .await
            .unwrap();
        let mut buffer = [0u8; 8];
        let count = phys
            .read(&mut buffer, PhysDecodeLevel::Nothing)
            .await
            .unwrap();
        assert_eq!(&buffer[..count], &[0x01, 0x83, 0x02]);
    }

    #[tokio::test]
    async fn flush_drops_input_that_is_already_waiting() {
        let (io, mut handle) = crate::mock::mock();
        let mut phys = PhysLayer::new_io(io);

        handle.read(&[0x01, 0x03, 0x02]);
        handle.read(&[0x00, 0x03]);
        phys.flush().await.unwrap();

        handle.read(&[0x01, 0x83, 0x02]);
        let mut buffer = [0u8; 8];
        let count = phys
            .read(&mut buffer, PhysDecodeLevel::Nothing)
            .await
            .unwrap();
        assert_eq!(&buffer[..count], &[0x01, 0x83, 0x02]);
    }
}
