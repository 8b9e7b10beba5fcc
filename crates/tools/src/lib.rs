//! Tools for the concierge assistant
//!
//! MCP-style tool interface plus the two tools the assistant exposes:
//! booking an appointment and validating a single user-supplied field.

pub mod booking;
pub mod mcp;
pub mod registry;
pub mod validate_input;

pub use booking::{
    confirmation_text, BookingOutcome, BookingResult, BookingTool, INVALID_EMAIL_REPLY,
    INVALID_PHONE_REPLY, NOTIFICATION_FAILED_REPLY,
};
pub use mcp::{
    ContentBlock, ErrorCode, InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema,
    DEFAULT_TIMEOUT_SECS,
};
pub use registry::{create_registry, ToolExecutor, ToolRegistry};
pub use validate_input::ValidateInputTool;
