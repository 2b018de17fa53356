use crate::domain::email::MessageMetadata;
use crate::llm::taxonomy::Taxonomy;

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prompt asking the model for a single JSON object describing `meta`.
///
/// Only subject and sender (and the date, when `include_date` is set) are sent.
pub fn build_prompt(meta: &MessageMetadata, taxonomy: &Taxonomy, include_date: bool) -> String {
    let mut input = format!("- Subject: {}\n- Sender: {}\n", meta.subject, meta.sender);
    if include_date {
        input.push_str(&format!("- Date: {}\n", meta.date));
    }

    format!(
        r#"You are an assistant tasked with summarizing and categorizing emails. Respond **only** with the following JSON format:

{{
    "summary": "<summary>",
    "category": "<category>",
    "priority": "<priority>",
    "response_required": "<Yes/No>"
}}

### Constraints:
- "category" must be one of: {categories}.
- "priority" must be one of: {priorities}.
- "response_required" must be one of: 'Yes', 'No'.

### Input:
{input}
### Output:
Return strictly the JSON format as specified above. Do not include any extra text or explanations.
"#,
        categories = quoted_list(&taxonomy.categories),
        priorities = quoted_list(&taxonomy.priorities),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> MessageMetadata {
        MessageMetadata {
            subject: "Invoice due".into(),
            sender: "billing@x.com".into(),
            date: "Tue, 2 Jan 2024 09:00:00 +0000".into(),
            identity: "abc123".into(),
        }
    }

    #[test]
    fn embeds_schema_lists_and_input() {
        let p = build_prompt(&meta(), &Taxonomy::default(), false);
        assert!(p.contains(r#""response_required": "<Yes/No>""#));
        assert!(p.contains("'Work', 'School', 'Shopping', 'Social', 'Personal'"));
        assert!(p.contains("'Urgent', 'Important', 'Normal'"));
        assert!(p.contains("- Subject: Invoice due"));
        assert!(p.contains("- Sender: billing@x.com"));
        assert!(!p.contains("- Date:"));
    }

    #[test]
    fn date_is_opt_in() {
        let p = build_prompt(&meta(), &Taxonomy::default(), true);
        assert!(p.contains("- Date: Tue, 2 Jan 2024 09:00:00 +0000"));
    }

    #[test]
    fn is_deterministic() {
        let t = Taxonomy::default();
        assert_eq!(build_prompt(&meta(), &t, true), build_prompt(&meta(), &t, true));
    }
}
