//! Prompt templates and tool declarations.

use serde_json::json;
use timewise_core::grid::{BREAK_COLUMNS, COLUMNS};
use timewise_core::model::WEEKDAYS;

use crate::client::{FunctionDeclaration, Tool};

pub const RESCHEDULE_TOOL: &str = "reschedule_class";

const PARSE_INTRO: &str = "\
Analyze this timetable image and extract the schedule as strict JSON.

The image is a weekly grid: one row per day, numbered time columns across the top. \
Some columns are breaks; never emit entries for them. \
A legend table below the grid maps course codes to course names and teachers.";

const PARSE_SCHEMA: &str = "\
Respond ONLY with a JSON object. No markdown fences, no explanation, just raw JSON:
{
  \"monday\": [
    { \"code\": \"CEDX 01/07\", \"start_col\": 4, \"end_col\": 5, \"room\": \"LH-2\", \"type\": \"Lecture\" }
  ],
  \"tuesday\": [],
  \"legend\": {
    \"CEDX 01\": { \"name\": \"course name\", \"teacher\": \"teacher name\" }
  }
}

Rules:
- Use lowercase day names as keys; include only days that appear in the image.
- A class spanning several columns uses the first column as start_col and the last as end_col.
- If a cell lists several codes (e.g. \"CEDX 01/07\"), copy the cell text as-is.
- \"type\" is one of Lecture, Lab, Tutorial; omit it if unclear. Omit \"room\" if absent.
- If you cannot read column numbers, give \"start\" and \"end\" as HH:mm 24-hour times instead.";

/// The timetable extraction prompt, with the column table spelled out so
/// the model can map grid positions to column numbers.
pub fn parse_prompt() -> String {
    let mut columns: Vec<(u32, String)> = COLUMNS
        .iter()
        .map(|(col, start, end)| (*col, format!("  column {col}: {start}-{end}")))
        .chain(
            BREAK_COLUMNS
                .iter()
                .map(|(col, start, end)| (*col, format!("  column {col}: {start}-{end} (break)"))),
        )
        .collect();
    columns.sort_by_key(|(col, _)| *col);
    let column_lines: Vec<String> = columns.into_iter().map(|(_, line)| line).collect();

    format!(
        "{PARSE_INTRO}\n\nColumns:\n{}\n\n{PARSE_SCHEMA}",
        column_lines.join("\n")
    )
}

pub const CHAT_PREAMBLE: &str = "\
You are TimeWise AI, a helpful academic assistant. You help students manage their timetable \
and attendance. You can answer questions about their schedule and also take actions like \
rescheduling classes using tools. When rescheduling, confirm the details with the user.";

pub const CHAT_ACKNOWLEDGEMENT: &str =
    "Understood! I'm ready to help you manage your schedule. How can I assist you today?";

pub fn chat_turn(context_json: &str, query: &str) -> String {
    format!("Context: {context_json}\nUser Query: {query}")
}

/// The single tool the chat bridge declares.
pub fn reschedule_tool() -> Tool {
    let days: Vec<&str> = WEEKDAYS.iter().map(|d| d.as_str()).collect();
    Tool {
        function_declarations: vec![FunctionDeclaration {
            name: RESCHEDULE_TOOL.to_string(),
            description: "Reschedule a class period from one day to another.".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "subject": {
                        "type": "STRING",
                        "description": "The name of the subject/class to move."
                    },
                    "fromDay": {
                        "type": "STRING",
                        "enum": days,
                        "description": "The current day of the class."
                    },
                    "toDay": {
                        "type": "STRING",
                        "enum": days,
                        "description": "The day to move the class to."
                    }
                },
                "required": ["subject", "fromDay", "toDay"]
            }),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prompt_lists_columns_in_order() {
        let prompt = parse_prompt();
        let first = prompt.find("column 1:").unwrap();
        let brk = prompt.find("column 3: 10:40-11:00 (break)").unwrap();
        let last = prompt.find("column 10:").unwrap();
        assert!(first < brk && brk < last);
        assert!(prompt.contains("\"legend\""));
    }

    #[test]
    fn reschedule_tool_declares_days() {
        let tool = reschedule_tool();
        let decl = &tool.function_declarations[0];
        assert_eq!(decl.name, RESCHEDULE_TOOL);
        let days = decl.parameters["properties"]["toDay"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], "Monday");
    }

    #[test]
    fn chat_turn_layout() {
        assert_eq!(
            chat_turn("{}", "what's on monday?"),
            "Context: {}\nUser Query: what's on monday?"
        );
    }
}
