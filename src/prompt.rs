//! `{name}`-style prompt templates.
//!
//! Substitution is single-pass: text inserted for one variable is never
//! scanned again, so document content containing `{schema}` or similar stays
//! literal. `{{` and `}}` render as single braces.

use crate::core::errors::RagError;

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, RagError> {
        let template = template.into();
        let variables = scan_variables(&template)?;
        Ok(Self {
            template,
            variables,
        })
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn render(&self, values: &[(&str, &str)]) -> Result<String, RagError> {
        for name in &self.variables {
            if !values.iter().any(|(key, _)| *key == name.as_str()) {
                return Err(RagError::Internal(format!(
                    "prompt variable '{}' was not supplied",
                    name
                )));
            }
        }

        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(pos) = rest.find(&['{', '}'][..]) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if tail.starts_with("{{") {
                out.push('{');
                rest = &tail[2..];
            } else if tail.starts_with("}}") {
                out.push('}');
                rest = &tail[2..];
            } else if tail.starts_with('{') {
                // scan_variables guarantees a closing brace
                let end = tail.find('}').unwrap_or(tail.len() - 1);
                let name = &tail[1..end];
                if let Some((_, value)) = values.iter().find(|(key, _)| *key == name) {
                    out.push_str(value);
                }
                rest = &tail[end + 1..];
            } else {
                out.push('}');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn scan_variables(template: &str) -> Result<Vec<String>, RagError> {
    let mut variables = Vec::new();
    let mut rest = template;
    while let Some(pos) = rest.find('{') {
        let tail = &rest[pos..];
        if tail.starts_with("{{") {
            rest = &tail[2..];
            continue;
        }
        let end = tail
            .find('}')
            .ok_or_else(|| RagError::Internal("unterminated prompt variable".to_string()))?;
        let name = &tail[1..end];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(RagError::Internal(format!(
                "invalid prompt variable '{{{}}}'",
                name
            )));
        }
        if !variables.iter().any(|known| known == name) {
            variables.push(name.to_string());
        }
        rest = &tail[end + 1..];
    }
    Ok(variables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_variable_once() {
        let template = PromptTemplate::new("Schema: {schema}\nContent: {content}").unwrap();
        assert_eq!(template.variables().to_vec(), vec!["schema", "content"]);

        let rendered = template
            .render(&[("schema", "S"), ("content", "uses {schema} literally")])
            .unwrap();
        assert_eq!(rendered, "Schema: S\nContent: uses {schema} literally");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let template = PromptTemplate::new("JSON like {{\"a\": 1}} for {name}").unwrap();
        assert_eq!(template.variables().to_vec(), vec!["name"]);
        assert_eq!(
            template.render(&[("name", "x")]).unwrap(),
            "JSON like {\"a\": 1} for x"
        );
    }

    #[test]
    fn missing_value_is_an_error() {
        let template = PromptTemplate::new("{question}").unwrap();
        assert!(template.render(&[]).is_err());
    }

    #[test]
    fn malformed_templates_are_rejected() {
        assert!(PromptTemplate::new("open {brace").is_err());
        assert!(PromptTemplate::new("bad {two words}").is_err());
    }
}
