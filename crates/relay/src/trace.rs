//! Tool-call trace shown in the terminal while the agent works.

use mcplink_core::message::Message;
use serde_json::Value;

const BANNER_WIDTH: usize = 80;

/// Render the tool calls an assistant message requests. Ends with a newline.
pub fn format_tool_calls(message: &Message) -> String {
    let mut out = banner("Ai Message");
    if !message.content.is_empty() {
        out.push_str(&message.content);
        out.push('\n');
    }
    out.push_str("Tool Calls:\n");
    for call in &message.tool_calls {
        out.push_str(&format!("  {} ({})\n Call ID: {}\n  Args:\n", call.name, call.id, call.id));
        match serde_json::from_str::<Value>(&call.arguments) {
            Ok(Value::Object(args)) => {
                for (key, value) in &args {
                    out.push_str(&format!("    {key}: {}\n", display_value(value)));
                }
            }
            _ if call.arguments.trim().is_empty() => {}
            _ => out.push_str(&format!("    {}\n", call.arguments)),
        }
    }
    out
}

fn banner(title: &str) -> String {
    let title = format!(" {title} ");
    let side = BANNER_WIDTH.saturating_sub(title.len()) / 2;
    format!("{}{title}{}\n", "=".repeat(side), "=".repeat(side))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
