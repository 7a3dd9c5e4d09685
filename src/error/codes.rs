/// Error code registry
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 4000-4999: Execution errors
/// - 6000-6999: Git errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_YAML: u16 = 1002;
    pub const CONFIG_MISSING_REQUIRED: u16 = 1004;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;

    // Execution errors (4000-4999)
    pub const EXEC_GENERIC: u16 = 4000;
    pub const EXEC_COMMAND_NOT_FOUND: u16 = 4001;
    pub const EXEC_TIMEOUT: u16 = 4002;
    pub const EXEC_SUBPROCESS_FAILED: u16 = 4003;
    pub const EXEC_SPAWN_FAILED: u16 = 4006;
    pub const EXEC_SIGNAL_RECEIVED: u16 = 4005;

    // Git errors (6000-6999)
    pub const GIT_CLONE_FAILED: u16 = 6001;
    pub const GIT_NOT_CLONED: u16 = 6002;
    pub const GIT_NOTHING_TO_ADD: u16 = 6003;
    pub const GIT_COMMAND_FAILED: u16 = 6010;
    pub const GIT_TEMP_DIR: u16 = 6011;
    pub const GIT_REMOVE_DIR: u16 = 6012;
}

/// Short human description of a code, shown in error reports
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_NOT_FOUND => "Configuration file not found",
        ErrorCode::CONFIG_INVALID_YAML => "Configuration file is not valid YAML",
        ErrorCode::CONFIG_MISSING_REQUIRED => "A required configuration value is missing",
        ErrorCode::CONFIG_INVALID_VALUE => "A configuration value is invalid",
        ErrorCode::EXEC_COMMAND_NOT_FOUND => "Command not found on PATH",
        ErrorCode::EXEC_TIMEOUT => "Command exceeded its time budget and was killed",
        ErrorCode::EXEC_SUBPROCESS_FAILED => "Command exited with a failure status",
        ErrorCode::EXEC_SPAWN_FAILED => "Command could not be started",
        ErrorCode::EXEC_SIGNAL_RECEIVED => "Command was terminated by a signal",
        ErrorCode::GIT_CLONE_FAILED => "Cloning the repository failed",
        ErrorCode::GIT_NOT_CLONED => "No repository has been cloned yet",
        ErrorCode::GIT_NOTHING_TO_ADD => "No paths were given to stage",
        ErrorCode::GIT_COMMAND_FAILED => "A git command failed",
        ErrorCode::GIT_TEMP_DIR => "The clone directory could not be created",
        ErrorCode::GIT_REMOVE_DIR => "The local repository could not be removed",
        1000..=1999 => "Configuration error",
        4000..=4999 => "Execution error",
        6000..=6999 => "Git error",
        _ => "Unknown error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_known_and_category_fallback() {
        assert_eq!(
            describe_error_code(ErrorCode::EXEC_TIMEOUT),
            "Command exceeded its time budget and was killed"
        );
        assert_eq!(describe_error_code(1999), "Configuration error");
        assert_eq!(describe_error_code(6500), "Git error");
        assert_eq!(describe_error_code(42), "Unknown error");
    }
}
