// All LLM prompt constants for proposal evaluation.

/// Currency the RFP budget is quoted in.
pub const BUDGET_CURRENCY: &str = "SAR";

/// System prompt for proposal evaluation.
pub const EVALUATION_SYSTEM: &str = "You are an expert procurement evaluator. \
    Analyze proposals with the following criteria:\n\
    - Commercial Evaluation (70% weight): pricing competitiveness, payment terms, value for money\n\
    - Technical Evaluation (30% weight): technical capability, approach, innovation\n\n\
    Provide detailed scoring and recommendations.";

/// Evaluation prompt template. Fill with `fill_template`.
/// Placeholders: {title}, {budget}, {currency}, {description}, {scope_of_work},
///               {vendor_company}, {commercial_document}, {technical_document}
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"Please evaluate this proposal for RFP: {title}

RFP Details:
- Budget: {budget} {currency}
- Description: {description}
- Scope: {scope_of_work}

Proposal submitted by: {vendor_company}

Commercial Document: {commercial_document}
Technical Document: {technical_document}

Please provide:
1. Commercial score (0-100)
2. Technical score (0-100)
3. Overall weighted score (commercial 70% + technical 30%)
4. Exactly 3 strengths
5. Exactly 3 weaknesses
6. Clear recommendation (Highly Recommended/Recommended/Not Recommended/Requires Manual Review)
7. Detailed analysis

Format your response as JSON:
{
  "commercial_score": number,
  "technical_score": number,
  "overall_score": number,
  "strengths": ["strength1", "strength2", "strength3"],
  "weaknesses": ["weakness1", "weakness2", "weakness3"],
  "recommendation": "recommendation",
  "detailed_analysis": "detailed analysis text"
}"#;

/// Substitutes `{key}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned, so user text that happens to
/// contain `{title}` and the like is emitted verbatim. Unknown `{...}`
/// sequences (such as the JSON schema above) are left untouched.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];

        let hit = values.iter().find_map(|(key, value)| {
            let placeholder_len = key.len() + 2;
            let matches = tail.len() >= placeholder_len
                && tail[1..].starts_with(key)
                && tail[1 + key.len()..].starts_with('}');
            matches.then_some((placeholder_len, *value))
        });

        match hit {
            Some((len, value)) => {
                out.push_str(value);
                rest = &tail[len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
