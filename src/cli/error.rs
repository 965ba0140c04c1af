// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing files, bad configuration, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate a PID argument; returns it trimmed
pub fn validate_pid(pid: &str) -> Result<String, String> {
    validate_non_empty(pid, "PID")?;
    Ok(pid.trim().to_string())
}

/// Validate the user-string key that carries the PID
pub fn validate_pid_field(field: &str) -> Result<String, String> {
    validate_non_empty(field, "PID field")?;
    if field.contains('=') {
        return Err(format!("Invalid PID field: '{}'. Field names cannot contain '='.", field));
    }
    Ok(field.trim().to_string())
}
