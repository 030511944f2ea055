use std::fmt;

/// A signed call status. Negative values are failures.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Status(pub i32);

impl Status {
    pub const OK: Status = Status(0);
    pub const FALSE: Status = Status(1);
    pub const FAIL: Status = Status(-1_073_741_867);
    pub const INVALID_POINTER: Status = Status(-1_073_741_847);
    pub const INVALID_ARGUMENT: Status = Status(-1_073_741_868);
    pub const NO_IMPLEMENTATION: Status = Status(-1_073_741_835);
    pub const OUT_OF_RANGE: Status = Status(-1_073_741_841);
    pub const TIMEOUT: Status = Status(-1_073_741_857);
    pub const INVALID_SIZE: Status = Status(-1_073_741_854);
    /// A reply or request could not be decoded.
    pub const DESERIALIZATION_FAILED: Status = Status(-1_073_741_869);

    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    pub const fn is_failure(self) -> bool {
        self.0 < 0
    }

    /// `Ok` on success, carrying the (possibly non-zero) success code.
    pub fn into_result(self) -> Result<Status, Status> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self)
        }
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Status::OK => "OK",
            Status::FALSE => "FALSE",
            Status::FAIL => "FAIL",
            Status::INVALID_POINTER => "INVALID_POINTER",
            Status::INVALID_ARGUMENT => "INVALID_ARGUMENT",
            Status::NO_IMPLEMENTATION => "NO_IMPLEMENTATION",
            Status::OUT_OF_RANGE => "OUT_OF_RANGE",
            Status::TIMEOUT => "TIMEOUT",
            Status::INVALID_SIZE => "INVALID_SIZE",
            Status::DESERIALIZATION_FAILED => "DESERIALIZATION_FAILED",
            _ => return None,
        })
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Status({name})"),
            None => write!(f, "Status({:#010X})", self.0),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:#010X}", self.0),
        }
    }
}

impl From<super::WireError> for Status {
    fn from(_: super::WireError) -> Status {
        Status::DESERIALIZATION_FAILED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_convention() {
        assert!(Status::OK.is_success());
        assert!(Status::FALSE.is_success());
        assert!(Status::FAIL.is_failure());
        assert!(Status::DESERIALIZATION_FAILED.is_failure());
        assert_eq!(Status::FALSE.into_result(), Ok(Status::FALSE));
        assert_eq!(Status::TIMEOUT.into_result(), Err(Status::TIMEOUT));
    }

    #[test]
    fn test_display() {
        assert_eq!(Status::OK.to_string(), "OK");
        assert_eq!(Status::FAIL.to_string(), "FAIL");
        assert_eq!(Status(-1).to_string(), "0xFFFFFFFF");
        assert_eq!(format!("{:?}", Status(7)), "Status(0x00000007)");
    }
}
