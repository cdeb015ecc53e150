//! Template loader for YAML response overrides.

use crate::types::ResponseTemplates;
use helpdesk_core::{AppError, AppResult};
use std::path::Path;

/// Load response templates from a YAML file.
///
/// Keys absent from the file keep their built-in defaults. An
/// `acknowledgments` list may be empty to disable acknowledgments.
///
/// # Example
/// ```no_run
/// use helpdesk_responses::load_templates;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let templates = load_templates(Path::new(".helpdesk/responses.yaml"))?;
/// println!("Fallback: {}", templates.fallback);
/// # Ok(())
/// # }
/// ```
pub fn load_templates(path: &Path) -> AppResult<ResponseTemplates> {
    tracing::debug!("Loading response templates from: {:?}", path);

    if !path.exists() {
        return Err(AppError::Template(format!(
            "Template file not found: {:?}",
            path
        )));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Template(format!("Failed to read template file {:?}: {}", path, e))
    })?;

    let templates = parse_templates(&contents)
        .map_err(|e| AppError::Template(format!("{:?}: {}", path, e)))?;

    tracing::info!("Loaded response templates from {:?}", path);

    Ok(templates)
}

/// Parse and validate templates from YAML text.
pub fn parse_templates(contents: &str) -> Result<ResponseTemplates, String> {
    let templates: ResponseTemplates = if contents.trim().is_empty() {
        ResponseTemplates::default()
    } else {
        serde_yaml::from_str(contents).map_err(|e| format!("Failed to parse template YAML: {}", e))?
    };

    validate_templates(&templates)?;

    Ok(templates)
}

/// Validate template contents.
fn validate_templates(templates: &ResponseTemplates) -> Result<(), String> {
    let required = [
        ("greeting", &templates.greeting),
        ("goodbye", &templates.goodbye),
        ("escalation", &templates.escalation),
        ("answer", &templates.answer),
        ("fallback", &templates.fallback),
    ];

    for (name, template) in required {
        if template.trim().is_empty() {
            return Err(format!("Template '{}' cannot be empty", name));
        }
    }

    if !references_variable(&templates.answer, "answer") {
        return Err("Template 'answer' must reference {{answer}}".to_string());
    }

    if let Some(i) = templates
        .acknowledgments
        .iter()
        .position(|a| a.trim().is_empty())
    {
        return Err(format!("Acknowledgment {} cannot be empty", i + 1));
    }

    Ok(())
}

/// Whether `template` contains a `{{name}}` expression, allowing inner whitespace.
fn references_variable(template: &str, name: &str) -> bool {
    template.split("{{").skip(1).any(|rest| {
        rest.split("}}")
            .next()
            .map(|expr| expr.trim_start_matches('{').trim() == name)
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_override_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("responses.yaml");
        fs::write(
            &path,
            r#"
escalation: "Hang on {{user_id}}, a colleague will take over."
acknowledgments:
  - "Sure thing!"
"#,
        )
        .unwrap();

        let templates = load_templates(&path).unwrap();
        assert_eq!(
            templates.escalation,
            "Hang on {{user_id}}, a colleague will take over."
        );
        assert_eq!(templates.acknowledgments, vec!["Sure thing!".to_string()]);
        assert_eq!(templates.answer, ResponseTemplates::default().answer);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = load_templates(&temp.path().join("nope.yaml")).unwrap_err();

        assert!(matches!(err, AppError::Template(_)));
    }

    #[test]
    fn test_empty_file_is_defaults() {
        assert_eq!(parse_templates("  \n").unwrap(), ResponseTemplates::default());
    }

    #[test]
    fn test_validation_errors() {
        assert!(parse_templates("fallback: \"\"").is_err());
        assert!(parse_templates("answer: \"{{user_id}}, see our website\"").is_err());
        assert!(parse_templates("acknowledgments: [\"ok\", \" \"]").is_err());
        assert!(parse_templates("greeting: [1, 2]").is_err());
    }

    #[test]
    fn test_answer_template_needs_placeholder() {
        assert!(parse_templates("answer: \"No answer, {{user_id}}\"").is_err());
        assert!(parse_templates("answer: \"{{user_id}}: {{ answer }}\"").is_ok());
        assert!(parse_templates("answer: \"{{{answer}}}\"").is_ok());
    }

    #[test]
    fn test_empty_acknowledgments_allowed() {
        let templates = parse_templates("acknowledgments: []").unwrap();
        assert!(templates.acknowledgments.is_empty());
    }
}
