//! Field validation tool

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde_json::Value;
use std::sync::Arc;

use concierge_text_processing::{resolve_date_iso, validate_email, validate_phone};

use crate::mcp::{required_str, InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema};

type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Checks one user-supplied field and explains the result
pub struct ValidateInputTool {
    clock: Clock,
}

impl ValidateInputTool {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Resolve dates against a fixed clock
    pub fn with_clock(clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    pub fn validate_user_input(&self, field: &str, value: &str) -> String {
        match field.trim().to_lowercase().as_str() {
            "email" => {
                if validate_email(value) {
                    "Valid email address".to_string()
                } else {
                    "Invalid email format. Please enter a valid email (e.g., user@example.com)"
                        .to_string()
                }
            }
            "phone" => {
                if validate_phone(value) {
                    "Valid phone number".to_string()
                } else {
                    "Invalid phone number. Please enter a valid phone number (e.g., +977XXXXXXXXXX)"
                        .to_string()
                }
            }
            "date" => match resolve_date_iso(value, (self.clock)()) {
                Some(date) => format!("Date parsed as: {}", date),
                None => "Could not parse date. Please specify a date (e.g., 'next Monday', '2024-12-25', 'tomorrow')".to_string(),
            },
            _ => "Field validation not implemented for this field type".to_string(),
        }
    }
}

impl Default for ValidateInputTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ValidateInputTool {
    fn name(&self) -> &str {
        "validate_user_input"
    }

    fn description(&self) -> &str {
        "Validate an email, phone number, or date supplied by the user"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property(
                    "field",
                    PropertySchema::enum_type(
                        "Field to validate",
                        vec!["email".into(), "phone".into(), "date".into()],
                    ),
                    true,
                )
                .property("value", PropertySchema::string("Value supplied by the user"), true),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let field = required_str(&input, "field")?;
        let value = required_str(&input, "value")?;
        Ok(ToolOutput::text(self.validate_user_input(field, value)))
    }

    fn timeout_secs(&self) -> u64 {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn fixed_tool() -> ValidateInputTool {
        ValidateInputTool::with_clock(|| {
            NaiveDate::from_ymd_opt(2025, 3, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        })
    }

    #[test]
    fn test_email_messages() {
        let tool = fixed_tool();
        assert_eq!(tool.validate_user_input("email", "a@b.co"), "Valid email address");
        assert!(tool
            .validate_user_input("email", "nope")
            .starts_with("Invalid email format"));
    }

    #[test]
    fn test_phone_messages() {
        let tool = fixed_tool();
        assert_eq!(tool.validate_user_input("phone", "9812345678"), "Valid phone number");
        assert!(tool
            .validate_user_input("phone", "12345")
            .contains("+977XXXXXXXXXX"));
    }

    #[test]
    fn test_date_messages() {
        let tool = fixed_tool();
        assert_eq!(
            tool.validate_user_input("date", "tomorrow"),
            "Date parsed as: 2025-03-11"
        );
        assert!(tool
            .validate_user_input("date", "someday")
            .starts_with("Could not parse date."));
    }

    #[test]
    fn test_unknown_field() {
        assert_eq!(
            fixed_tool().validate_user_input("name", "Jane"),
            "Field validation not implemented for this field type"
        );
    }

    #[tokio::test]
    async fn test_execute() {
        let output = fixed_tool()
            .execute(json!({"field": "date", "value": "2024-12-25"}))
            .await
            .unwrap();
        assert_eq!(output.as_text(), "Date parsed as: 2024-12-25");
    }
}
