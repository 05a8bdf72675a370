// Prompt templates and response schemas for the two text tasks.

use serde_json::{Value, json};

use super::types::DescriptionRequest;

pub fn summarize_prompt(paper_text: &str) -> String {
    format!(
        "You are an expert scientific summarizer.  Please summarize the following paper in a \
         clear and concise manner.\n\nPaper Text: {paper_text}"
    )
}

pub fn summary_schema() -> Value {
    object_schema("summary", "The summary of the scientific paper.")
}

pub fn enhance_prompt(req: &DescriptionRequest) -> String {
    format!(
        "You are an expert in electronic components. Based on the following details, generate \
         a clear, concise, and helpful description for a lab inventory system. Focus on key \
         specifications and common use cases.\n\n\
         Item Details:\n\
         - Name: {}\n\
         - Type: {}\n\
         - Value: {}\n\
         - Part Number: {}\n\n\
         Generate a description that is informative but not overly long.",
        req.name, req.item_type, req.value, req.part_number
    )
}

pub fn description_schema() -> Value {
    object_schema(
        "description",
        "The enhanced, concise description of the item.",
    )
}

fn object_schema(field: &str, description: &str) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            field: { "type": "STRING", "description": description }
        },
        "required": [field]
    })
}
