//! UMB status codes.
//!
//! Every reply starts with the status of the command it answers; the
//! status query additionally reports the device's own status. Codes outside
//! the table below have no defined meaning and map to
//! [`StatusCode::Unrecognized`].

use std::fmt;

/// A device-reported status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    UnknownCommand,
    InvalidParameter,
    InvalidHeader,
    InvalidCommandVersion,
    InvalidPassword,
    ReadError,
    WriteError,
    TooLong,
    InvalidAddress,
    InvalidChannel,
    CommandNotPossible,
    UnknownCalibrationCommand,
    CalibrationError,
    NotReady,
    Undervoltage,
    HardwareError,
    MeasurementError,
    InitError,
    OsError,
    ConfigurationError,
    CalibrationInvalid,
    ConfigurationCrcError,
    CalibrationCrcError,
    CalibrationStep1,
    CalibrationOk,
    ChannelDeactivated,
    /// A code outside the known table.
    Unrecognized(u8),
}

impl StatusCode {
    /// The numeric code as sent on the wire.
    pub fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::UnknownCommand => 16,
            Self::InvalidParameter => 17,
            Self::InvalidHeader => 18,
            Self::InvalidCommandVersion => 19,
            Self::InvalidPassword => 20,
            Self::ReadError => 32,
            Self::WriteError => 33,
            Self::TooLong => 34,
            Self::InvalidAddress => 35,
            Self::InvalidChannel => 36,
            Self::CommandNotPossible => 37,
            Self::UnknownCalibrationCommand => 38,
            Self::CalibrationError => 39,
            Self::NotReady => 40,
            Self::Undervoltage => 41,
            Self::HardwareError => 42,
            Self::MeasurementError => 43,
            Self::InitError => 44,
            Self::OsError => 45,
            Self::ConfigurationError => 48,
            Self::CalibrationInvalid => 49,
            Self::ConfigurationCrcError => 50,
            Self::CalibrationCrcError => 51,
            Self::CalibrationStep1 => 52,
            Self::CalibrationOk => 53,
            Self::ChannelDeactivated => 54,
            Self::Unrecognized(code) => code,
        }
    }

    /// Human-readable meaning of the code.
    pub fn description(self) -> &'static str {
        match self {
            Self::Ok => "Command successful; no error; all OK",
            Self::UnknownCommand => "Unknown command; not supported by this device",
            Self::InvalidParameter => "Invalid parameter",
            Self::InvalidHeader => "Invalid header version",
            Self::InvalidCommandVersion => "Invalid version of the command",
            Self::InvalidPassword => "Invalid password for command",
            Self::ReadError => "Read error",
            Self::WriteError => "Write error",
            Self::TooLong => {
                "Length too great; max. permissible length is designated in <maxlength>"
            }
            Self::InvalidAddress => "Invalid address / storage location",
            Self::InvalidChannel => "Invalid channel",
            Self::CommandNotPossible => "Command not possible in this mode",
            Self::UnknownCalibrationCommand => "Unknown calibration command",
            Self::CalibrationError => "Calibration error",
            Self::NotReady => "Device not ready; e.g. initialisation / calibration running",
            Self::Undervoltage => "Undervoltage",
            Self::HardwareError => "Hardware error",
            Self::MeasurementError => "Measurement error",
            Self::InitError => "Error on device initialization",
            Self::OsError => "Error in operating system",
            Self::ConfigurationError => "Configuration error, default configuration was loaded",
            Self::CalibrationInvalid => {
                "Calibration error / the calibration is invalid, measurement not possible"
            }
            Self::ConfigurationCrcError => {
                "CRC error on loading configuration; default configuration was loaded"
            }
            Self::CalibrationCrcError => {
                "CRC error on loading calibration; measurement not possible"
            }
            Self::CalibrationStep1 => "Calibration step 1",
            Self::CalibrationOk => "Calibrations OK",
            Self::ChannelDeactivated => "Channel deactivated",
            Self::Unrecognized(_) => "unrecognized status",
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Ok
    }

    /// False for codes outside the known table.
    pub fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<u8> for StatusCode {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Ok,
            16 => Self::UnknownCommand,
            17 => Self::InvalidParameter,
            18 => Self::InvalidHeader,
            19 => Self::InvalidCommandVersion,
            20 => Self::InvalidPassword,
            32 => Self::ReadError,
            33 => Self::WriteError,
            34 => Self::TooLong,
            35 => Self::InvalidAddress,
            36 => Self::InvalidChannel,
            37 => Self::CommandNotPossible,
            38 => Self::UnknownCalibrationCommand,
            39 => Self::CalibrationError,
            40 => Self::NotReady,
            41 => Self::Undervoltage,
            42 => Self::HardwareError,
            43 => Self::MeasurementError,
            44 => Self::InitError,
            45 => Self::OsError,
            48 => Self::ConfigurationError,
            49 => Self::CalibrationInvalid,
            50 => Self::ConfigurationCrcError,
            51 => Self::CalibrationCrcError,
            52 => Self::CalibrationStep1,
            53 => Self::CalibrationOk,
            54 => Self::ChannelDeactivated,
            other => Self::Unrecognized(other),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.description(), self.code())
    }
}

/// Look up the meaning of a raw status code.
pub fn describe_status(code: u8) -> &'static str {
    StatusCode::from(code).description()
}
