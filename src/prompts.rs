//! Prompt text for the financial research agent

use crate::models::AgentInput;

pub const SYSTEM_PROMPT: &str = r#"You are an expert financial research analyst. Your goal is to provide accurate, up-to-the-minute financial analysis based exclusively on real-time web search results.

**CRITICAL INSTRUCTIONS:**
1. **NEVER use your internal knowledge.** Your internal data is outdated. The user's query is about recent events, and you can only answer by using your search tool.
2. **ALWAYS use the search tool.** For every single query, you must perform a search. There are no exceptions.
3. **THINK before you search.** Formulate a precise search query to find the most relevant information. For example, for 'Apple's Q2 2024 earnings', search for 'Apple Inc. Q2 2024 earnings report' or 'AAPL Q2 2024 financial results'.
4. **SYNTHESIZE the results.** After searching, combine the information from the search results into a coherent, easy-to-read analysis. Do not just list facts; explain their implications based on the user's profile.
5. **CITE YOUR SOURCES.** At the very end of your response, you MUST list the URLs you used. Add a heading 'Sources:' and then list each URL on a new line. This is mandatory."#;

/// Per-call human message; `{profile}` and `{query}` are filled at render time
pub const HUMAN_TEMPLATE: &str =
    "My investor profile is: {profile}\n\nBased on that, please analyze the following query: {query}";

/// System guidance plus the human message template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: String,
    human: String,
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>, human: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            human: human.into(),
        }
    }

    pub fn financial_analyst() -> Self {
        Self::new(SYSTEM_PROMPT, HUMAN_TEMPLATE)
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Single pass so braces inside the user's query are never re-expanded
    pub fn render_human(&self, input: &AgentInput) -> String {
        let mut out = String::with_capacity(self.human.len() + input.query.len() + input.profile.len());
        let mut rest = self.human.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start..];

            if let Some(tail) = after.strip_prefix("{profile}") {
                out.push_str(&input.profile);
                rest = tail;
            } else if let Some(tail) = after.strip_prefix("{query}") {
                out.push_str(&input.query);
                rest = tail;
            } else {
                out.push('{');
                rest = &after[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::financial_analyst()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(query: &str, profile: &str) -> AgentInput {
        AgentInput {
            query: query.to_string(),
            profile: profile.to_string(),
        }
    }

    #[test]
    fn test_render_human_message() {
        let template = PromptTemplate::financial_analyst();
        let rendered = template.render_human(&input("NVDA guidance", "a retail investor"));
        assert_eq!(
            rendered,
            "My investor profile is: a retail investor\n\nBased on that, please analyze the following query: NVDA guidance"
        );
    }

    #[test]
    fn test_query_braces_are_not_expanded() {
        let template = PromptTemplate::financial_analyst();
        let rendered = template.render_human(&input("what is {profile}?", "a day trader"));
        assert!(rendered.ends_with("query: what is {profile}?"));
        assert!(rendered.contains("profile is: a day trader"));
    }

    #[test]
    fn test_system_prompt_demands_search_and_sources() {
        let template = PromptTemplate::default();
        assert!(template.system().contains("ALWAYS use the search tool"));
        assert!(template.system().contains("'Sources:'"));
    }
}
