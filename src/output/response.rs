//! CLI response formatting and output.
//!
//! Provides JSON envelope, printing, and exit code mapping.

use nodesmith::error::Hint;
use nodesmith::{Error, ErrorCode, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize response".to_string()))
        })
    }
}

impl CliResponse<()> {
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(CliError {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: if err.hints.is_empty() {
                    None
                } else {
                    Some(err.hints.clone())
                },
                retryable: err.retryable,
            }),
        }
    }
}

fn print_response<T: Serialize>(response: &CliResponse<T>) -> Result<()> {
    use std::io::{self, Write};

    let payload = response.to_json()?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", payload) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(()); // Exit gracefully on SIGPIPE
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

pub fn print_success<T: Serialize>(data: T) -> Result<()> {
    print_response(&CliResponse::success(data))
}

pub fn map_cmd_result_to_json<T: Serialize>(
    result: Result<(T, i32)>,
) -> (Result<serde_json::Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(err) => (
                Err(Error::internal_json(
                    err.to_string(),
                    Some("serialize response".to_string()),
                )),
                1,
            ),
        },
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ValidationMissingArgument | ErrorCode::ValidationInvalidArgument => 2,

        ErrorCode::SshTargetInvalid
        | ErrorCode::SshIdentityFileNotFound
        | ErrorCode::SshAuthFailed
        | ErrorCode::SshConnectFailed => 10,

        ErrorCode::RemoteCommandFailed | ErrorCode::InstallStageFailed => 20,

        ErrorCode::InternalIoError
        | ErrorCode::InternalJsonError
        | ErrorCode::InternalUnexpected => 1,
    }
}

pub fn print_json_result(result: Result<serde_json::Value>) -> Result<()> {
    match result {
        Ok(data) => print_success(data),
        Err(err) => print_response(&CliResponse::<()>::from_error(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_exit_codes_group_by_layer() {
        let validation = Error::validation_missing_argument(vec!["host".to_string()]);
        let (_, code) = map_cmd_result_to_json::<serde_json::Value>(Err(validation));
        assert_eq!(code, 2);

        let ssh = Error::ssh_auth_failed("host", "permission denied");
        let (_, code) = map_cmd_result_to_json::<serde_json::Value>(Err(ssh));
        assert_eq!(code, 10);

        let remote = Error::remote_command_failed(nodesmith::error::RemoteCommandFailedDetails {
            command: "hostname".to_string(),
            exit_code: 1,
            stdout: String::new(),
            stderr: String::new(),
        });
        let stage = Error::install_stage_failed("prerequisites", &remote);
        let (_, code) = map_cmd_result_to_json::<serde_json::Value>(Err(stage));
        assert_eq!(code, 20);
    }

    #[test]
    fn success_envelope_serializes_data() {
        let response = CliResponse::success(serde_json::json!({"ok": true}));
        let json = response.to_json().unwrap();
        assert!(json.contains("\"success\": true"));
        assert!(json.contains("\"ok\": true"));
    }

    #[test]
    fn error_envelope_omits_empty_hints() {
        let err = Error::validation_missing_argument(vec!["host".to_string()]);
        let response = CliResponse::from_error(&err);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("hints"));
        assert!(json.contains("validation.missing_argument"));
    }
}
