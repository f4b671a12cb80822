use crate::core::errors::RagError;
use crate::prompt::PromptTemplate;
use crate::store::SearchHit;

pub const CONTEXT_SEPARATOR: &str = "\n\n";

const ANSWER_TEMPLATE: &str = "\
Use the following pieces of context to answer the question at the end.
If you don't know the answer, just say that you don't know, don't try to make up an answer.
Do not answer the question if there is no given context.
Do not answer the question if it is not related to the context.
Do not give recommendations to anything other than {subject_domain}.
Context:
{context}
Question: {question}
";

/// The answer prompt with the decline policy bound to `subject_domain`.
/// Remaining variables: `context`, `question`.
pub fn answer_template(subject_domain: &str) -> Result<PromptTemplate, RagError> {
    // bind the domain first so the context is never rescanned
    let bound = PromptTemplate::new(ANSWER_TEMPLATE)?.render(&[
        ("subject_domain", subject_domain),
        ("context", "{context}"),
        ("question", "{question}"),
    ])?;
    PromptTemplate::new(escape_except(&bound, &["{context}", "{question}"]))
}

/// Retrieved chunk texts separated by a blank line, in rank order.
pub fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.document.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Doubles every brace outside the given placeholders so a domain name with
/// braces in it stays literal.
fn escape_except(text: &str, placeholders: &[&str]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'outer: while !rest.is_empty() {
        for placeholder in placeholders {
            if let Some(tail) = rest.strip_prefix(placeholder) {
                out.push_str(placeholder);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            match c {
                '{' => out.push_str("{{"),
                '}' => out.push_str("}}"),
                other => out.push(other),
            }
        }
        rest = chars.as_str();
    }
    out
}
