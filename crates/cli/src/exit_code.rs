//! Process exit codes
//!
//! A stable contract for scripts: the code alone tells a caller whether to
//! fix its invocation, fix its credentials, or try again later.

use swc_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    UsageError = 2,
    NetworkError = 3,
    AuthError = 4,
    NotFound = 5,
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::MalformedUri { .. } | Error::Construction(_) => ExitCode::UsageError,
            Error::Authentication { .. } => ExitCode::AuthError,
            Error::Connection { .. }
            | Error::ContainerLookup { .. }
            | Error::ContainerCreate { .. }
            | Error::Upload { .. } => ExitCode::NetworkError,
            Error::ProfileNotFound(_) => ExitCode::NotFound,
            Error::Config(_) | Error::Io(_) => ExitCode::GeneralError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_core::ServiceError;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            ExitCode::from(&Error::Construction("missing credentials".to_string())),
            ExitCode::UsageError
        );
        assert_eq!(
            ExitCode::from(&Error::Authentication {
                host: "host".to_string(),
                source: ServiceError::Unauthorized { status: 401 },
            }),
            ExitCode::AuthError
        );
        assert_eq!(
            ExitCode::from(&Error::Upload {
                container: "backups".to_string(),
                source_description: "dump.db".to_string(),
                source: ServiceError::NotFound,
            }),
            ExitCode::NetworkError
        );
        assert_eq!(
            ExitCode::from(&Error::ProfileNotFound("lab".to_string())),
            ExitCode::NotFound
        );
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ExitCode::Success as i32, 0);
        assert_eq!(ExitCode::GeneralError as i32, 1);
        assert_eq!(ExitCode::UsageError as i32, 2);
        assert_eq!(ExitCode::NetworkError as i32, 3);
        assert_eq!(ExitCode::AuthError as i32, 4);
        assert_eq!(ExitCode::NotFound as i32, 5);
    }
}
