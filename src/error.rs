use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ProcError {
    #[error("{call} failed: {source}")]
    Native {
        call: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("no supported rusage flavor was found on this system")]
    UnsupportedCapability,
    #[error("path contains an interior NUL byte: {0:?}")]
    InvalidPath(String),
}

impl ProcError {
    pub(crate) fn native(call: &'static str, source: io::Error) -> Self {
        ProcError::Native { call, source }
    }

    /// Raw OS error code of a failed native call, if there is one.
    pub fn errno(&self) -> Option<i32> {
        match self {
            ProcError::Native { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_error_keeps_errno_and_call_name() {
        let err = ProcError::native("proc_pidinfo", io::Error::from_raw_os_error(libc::ESRCH));
        assert_eq!(err.errno(), Some(libc::ESRCH));
        let msg = err.to_string();
        assert!(msg.starts_with("proc_pidinfo failed: "), "{msg}");
    }

    #[test]
    fn non_native_errors_have_no_errno() {
        assert_eq!(ProcError::UnsupportedCapability.errno(), None);
        assert_eq!(ProcError::InvalidPath("a\0b".into()).errno(), None);
    }
}
