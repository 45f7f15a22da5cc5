/**
 * Bridge configuration
 *
 * Defaults match the bench setup: vehicle on /dev/ttyACM0 at 9600 baud,
 * operator console sending to UDP port 9876.
 */

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_PORT: &str = "/dev/ttyACM0";
pub const DEFAULT_BAUD: u32 = 9600;
pub const DEFAULT_LISTEN: &str = "0.0.0.0:9876";
pub const DEFAULT_TIMEOUT_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub serial_port: String,
    pub baud_rate: u32,
    /// Serial read timeout, also the operator socket poll interval.
    pub timeout: Duration,
    pub operator_addr: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            serial_port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            operator_addr: DEFAULT_LISTEN.to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn with_port(mut self, port: &str) -> Self {
        self.serial_port = port.to_string();
        self
    }

    pub fn with_baud(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_operator_addr(mut self, addr: &str) -> Self {
        self.operator_addr = addr.to_string();
        self
    }

    /// Parse command-line flags (without the program name).
    ///
    /// Returns `Ok(None)` when help was requested.
    pub fn from_args<I>(args: I) -> Result<Option<Self>, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-p" | "--port" => {
                    config.serial_port = next_value(&mut args, "port")?;
                }
                "-b" | "--baud" => {
                    config.baud_rate = parse_value(&mut args, "baud")?;
                }
                "-l" | "--listen" => {
                    config.operator_addr = next_value(&mut args, "listen")?;
                }
                "--timeout-ms" => {
                    let ms: u64 = parse_value(&mut args, "timeout-ms")?;
                    config.timeout = Duration::from_millis(ms);
                }
                "-h" | "--help" => return Ok(None),
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        Ok(Some(config))
    }
}

fn next_value<I: Iterator<Item = String>>(
    args: &mut I,
    flag: &'static str,
) -> Result<String, ConfigError> {
    args.next().ok_or(ConfigError::MissingValue(flag))
}

fn parse_value<T: std::str::FromStr, I: Iterator<Item = String>>(
    args: &mut I,
    flag: &'static str,
) -> Result<T, ConfigError> {
    let value = next_value(args, flag)?;
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { flag, value })
}

pub fn usage() -> &'static str {
    "Usage: rov_bridge [OPTIONS]\n\
     \n\
     Options:\n\
     \x20 -p, --port <PATH>       Serial device (default: /dev/ttyACM0)\n\
     \x20 -b, --baud <RATE>       Baud rate (default: 9600)\n\
     \x20 -l, --listen <ADDR>     Operator UDP address (default: 0.0.0.0:9876)\n\
     \x20     --timeout-ms <MS>   Serial read timeout (default: 10)\n\
     \x20 -h, --help              Show this help"
}
