// telemetry-forwarder-rs/src/classify.rs
//
// Failure Classifier: maps a delivery failure to a diagnostic label so
// operators can tell port-blocking, DNS, and certificate problems apart
// in restrictive network environments. Purely informational; it never
// changes the recorded outcome.

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Diagnostic category attached to a delivery failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Timeout,
    ConnectionRefused,
    NameResolution,
    Tls,
    Other,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureClass::Timeout => "timeout",
            FailureClass::ConnectionRefused => "connection-refused",
            FailureClass::NameResolution => "name-resolution-failure",
            FailureClass::Tls => "tls-failure",
            FailureClass::Other => "other-network-error",
        };
        f.write_str(label)
    }
}

impl FailureClass {
    /// Classify a transport-level error by inspecting the reqwest error
    /// and walking its cause chain for typed io errors and well-known
    /// failure texts.
    pub fn from_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return FailureClass::Timeout;
        }

        let mut source = err.source();
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                match io_err.kind() {
                    io::ErrorKind::ConnectionRefused => return FailureClass::ConnectionRefused,
                    io::ErrorKind::TimedOut => return FailureClass::Timeout,
                    _ => {}
                }
            }
            if let Some(class) = Self::from_message(&cause.to_string()) {
                return class;
            }
            source = cause.source();
        }

        // Connect errors whose cause chain carried no detail
        if err.is_connect() {
            return FailureClass::ConnectionRefused;
        }

        FailureClass::Other
    }

    /// Textual fallback for causes that expose no typed kind
    pub fn from_message(message: &str) -> Option<Self> {
        let m = message.to_ascii_lowercase();
        if m.contains("timed out") || m.contains("timeout") {
            Some(FailureClass::Timeout)
        } else if m.contains("connection refused") {
            Some(FailureClass::ConnectionRefused)
        } else if m.contains("dns error")
            || m.contains("failed to lookup address")
            || m.contains("name or service not known")
        {
            Some(FailureClass::NameResolution)
        } else if m.contains("certificate") || m.contains("tls") || m.contains("handshake") {
            Some(FailureClass::Tls)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_facing_labels() {
        assert_eq!(FailureClass::Timeout.to_string(), "timeout");
        assert_eq!(
            FailureClass::ConnectionRefused.to_string(),
            "connection-refused"
        );
        assert_eq!(
            FailureClass::NameResolution.to_string(),
            "name-resolution-failure"
        );
        assert_eq!(FailureClass::Tls.to_string(), "tls-failure");
        assert_eq!(FailureClass::Other.to_string(), "other-network-error");
    }

    #[test]
    fn test_message_classification() {
        assert_eq!(
            FailureClass::from_message("dns error: failed to lookup address information"),
            Some(FailureClass::NameResolution)
        );
        assert_eq!(
            FailureClass::from_message("Connection refused (os error 111)"),
            Some(FailureClass::ConnectionRefused)
        );
        assert_eq!(
            FailureClass::from_message("invalid peer certificate"),
            Some(FailureClass::Tls)
        );
        assert_eq!(
            FailureClass::from_message("operation timed out"),
            Some(FailureClass::Timeout)
        );
        assert_eq!(FailureClass::from_message("broken pipe"), None);
    }
}
