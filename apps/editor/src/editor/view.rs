//! Plain-text rendering of the editor for the terminal front end.

use crate::document::{format_for_display, FieldValue};
use crate::enhance::is_enhanceable;

use super::{Editor, SKILLS_FIELD};

/// "workExperience" → "Work Experience".
pub fn field_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            label.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            label.push(' ');
            label.push(c);
        } else if c == '_' {
            label.push(' ');
        } else {
            label.push(c);
        }
    }
    label
}

pub fn render_document(editor: &Editor) -> String {
    let names: Vec<String> = editor.document().field_names().map(str::to_string).collect();
    if names.is_empty() {
        return "(empty resume)".to_string();
    }
    names
        .iter()
        .map(|name| render_field(editor, name))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_field(editor: &Editor, name: &str) -> String {
    let document = editor.document();
    let Some(name) = document.find_name(name) else {
        return format!("(no field '{name}')");
    };
    let Some(value) = document.get(name) else {
        return String::new();
    };
    let session = editor.session();

    let mut header = format!("== {} ==", field_label(name));
    if session.active_field() == Some(name) {
        header.push_str(" [editing]");
    }
    if session.enhancement.is_pending(name) {
        header.push_str(" [enhancing...]");
    } else if is_enhanceable(name) {
        header.push_str(" [enhance available]");
    }

    let body = match value {
        FieldValue::ScalarList(items) if name.eq_ignore_ascii_case(SKILLS_FIELD) => {
            render_chips(items)
        }
        other => {
            let text = match session.fields.buffer() {
                Some(buffer) if session.active_field() == Some(name) => buffer.to_string(),
                _ => format_for_display(other),
            };
            let rows = session.fields.rows(document, name);
            format!("{text}\n({rows} rows)")
        }
    };

    format!("{header}\n{body}")
}

fn render_chips(items: &[String]) -> String {
    if items.is_empty() {
        return "No skills added yet".to_string();
    }
    items
        .iter()
        .enumerate()
        .map(|(i, skill)| {
            if skill.is_empty() {
                format!("{i}:[ (empty) ]")
            } else {
                format!("{i}:[{skill}]")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_status(editor: &Editor) -> String {
    let session = editor.session();
    let pending = session.pending_enhancement();
    let mut lines = vec![
        format!(
            "Editing: {}",
            session.active_field().unwrap_or("nothing")
        ),
        format!(
            "Enhancing: {}",
            if pending.is_empty() {
                "nothing".to_string()
            } else {
                pending.join(", ")
            }
        ),
        format!(
            "Last saved as: {}",
            session.last_saved_filename().unwrap_or("never saved")
        ),
        format!(
            "Export: {}",
            if session.download_enabled() {
                "available"
            } else {
                "save first"
            }
        ),
        format!("Preview: {}", editor.preview().status_line()),
    ];
    if session.persistence.save_in_flight() {
        lines.push("Save in progress...".to_string());
    }
    if let Some(at) = session.persistence.last_saved_at() {
        lines.push(format!("Saved at: {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_label() {
        assert_eq!(field_label("objective"), "Objective");
        assert_eq!(field_label("workExperience"), "Work Experience");
        assert_eq!(field_label("side_projects"), "Side projects");
    }

    #[test]
    fn test_render_chips_marks_placeholders() {
        assert_eq!(
            render_chips(&["Go".to_string(), String::new()]),
            "0:[Go] 1:[ (empty) ]"
        );
        assert_eq!(render_chips(&[]), "No skills added yet");
    }
}
