//! Byte-stream transports and address dispatch.
//!
//! Three address forms are accepted: a plain device path for a generic
//! serial port, an `ftdi://` URL for a USB-bridge device matched by USB
//! metadata, and the literal `pcsim` to attach to the local instrument
//! simulator.

use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use tracing::debug;

use crate::error::{Error, Result};
use crate::sim;

/// Scheme prefix selecting the USB-bridge backend.
pub const FTDI_SCHEME: &str = "ftdi://";

/// Reserved address token for the local instrument simulator.
pub const SIM_ADDRESS: &str = "pcsim";

/// FTDI's USB vendor id, assumed when an `ftdi://` URL does not name one.
pub const FTDI_VENDOR_ID: u16 = 0x0403;

/// Product ids accepted when the URL does not pin one: the instrument's
/// custom-EEPROM id plus the stock FT-series ids.
pub const FTDI_PRODUCT_IDS: [u16; 5] = [0xa6d0, 0x6001, 0x6010, 0x6011, 0x6014];

/// Read timeout applied when the caller does not choose one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Read-timeout policy for a connection.
///
/// `Forever` is the explicit opt-out: a blocking read then only returns
/// when the peer produces bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    Bounded(Duration),
    Forever,
}

impl Default for Timeout {
    fn default() -> Self {
        Timeout::Bounded(DEFAULT_TIMEOUT)
    }
}

impl Timeout {
    /// Concrete duration handed to the driver. Serial backends take
    /// millisecond counts, so "forever" becomes i32::MAX ms (~24 days).
    fn as_duration(self) -> Duration {
        match self {
            Timeout::Bounded(d) => d,
            Timeout::Forever => Duration::from_millis(i32::MAX as u64),
        }
    }
}

/// Byte-exact connection to the instrument.
///
/// `read_exact` either fills the whole buffer or fails; a short read within
/// the timeout window surfaces as [`Error::Timeout`], never as partial
/// success.
pub trait Transport: Send {
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    /// Drop everything sitting in the driver's receive and transmit buffers.
    fn reset_buffers(&mut self) -> Result<()>;
    /// Bytes currently pending in the driver, `(rx, tx)`.
    fn pending_counts(&self) -> Result<(u32, u32)>;
}

/// Open a connection to `address` at `bitrate`.
pub fn open(address: &str, bitrate: u32, timeout: Timeout) -> Result<Box<dyn Transport>> {
    if let Some(rest) = address.strip_prefix(FTDI_SCHEME) {
        open_ftdi(rest, bitrate, timeout)
    } else if address == SIM_ADDRESS {
        let simulator = sim::attach(Path::new("."))?;
        open_serial(simulator.pty_path(), bitrate, timeout)
    } else {
        open_serial(address, bitrate, timeout)
    }
}

struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl Transport for SerialTransport {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.port.write_all(buf).map_err(Error::from)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.port.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(Error::Timeout),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.port.flush().map_err(Error::from)
    }

    fn reset_buffers(&mut self) -> Result<()> {
        self.port
            .clear(serialport::ClearBuffer::All)
            .map_err(Error::from)
    }

    fn pending_counts(&self) -> Result<(u32, u32)> {
        Ok((self.port.bytes_to_read()?, self.port.bytes_to_write()?))
    }
}

fn open_serial(path: &str, bitrate: u32, timeout: Timeout) -> Result<Box<dyn Transport>> {
    debug!(path, bitrate, "opening serial port");
    let port = serialport::new(path, bitrate)
        .timeout(timeout.as_duration())
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .open()
        .map_err(|e| Error::Transport(format!("open {path}: {e}")))?;
    Ok(Box::new(SerialTransport { port }))
}

/// Device selector parsed from the remainder of an `ftdi://` URL.
///
/// Accepted form: `[vendor[:product[:serial]]][/interface]`, the subset the
/// host tooling generates. Vendor may be the literal `ftdi` or a hex id.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FtdiAddress {
    vendor: u16,
    product: Option<u16>,
    serial: Option<String>,
}

fn parse_ftdi_address(rest: &str) -> Result<FtdiAddress> {
    let descriptor = rest.split('/').next().unwrap_or("");
    let mut parts = descriptor.split(':');

    let vendor = match parts.next() {
        None | Some("") | Some("ftdi") => FTDI_VENDOR_ID,
        Some(v) => parse_usb_id(v)?,
    };
    let product = match parts.next() {
        None | Some("") => None,
        Some(p) => Some(parse_usb_id(p)?),
    };
    let serial = parts.next().filter(|s| !s.is_empty()).map(str::to_owned);

    Ok(FtdiAddress {
        vendor,
        product,
        serial,
    })
}

fn parse_usb_id(s: &str) -> Result<u16> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u16::from_str_radix(digits, 16)
        .map_err(|_| Error::Transport(format!("bad usb id in address: {s}")))
}

fn open_ftdi(rest: &str, bitrate: u32, timeout: Timeout) -> Result<Box<dyn Transport>> {
    let wanted = parse_ftdi_address(rest)?;
    debug!(?wanted, "enumerating usb bridge devices");

    let ports = serialport::available_ports()
        .map_err(|e| Error::Transport(format!("usb enumeration: {e}")))?;

    for port in &ports {
        let SerialPortType::UsbPort(info) = &port.port_type else {
            continue;
        };
        debug!(
            "usb device {} vid={:04x} pid={:04x} serial={}",
            port.port_name,
            info.vid,
            info.pid,
            info.serial_number.as_deref().unwrap_or("-")
        );
        if info.vid != wanted.vendor {
            continue;
        }
        let pid_ok = match wanted.product {
            Some(pid) => info.pid == pid,
            None => FTDI_PRODUCT_IDS.contains(&info.pid),
        };
        if !pid_ok {
            continue;
        }
        if let Some(serial) = &wanted.serial
            && info.serial_number.as_deref() != Some(serial)
        {
            continue;
        }
        return open_serial(&port.port_name, bitrate, timeout);
    }

    Err(Error::Transport(format!(
        "no usb bridge device matches ftdi://{rest}"
    )))
}
