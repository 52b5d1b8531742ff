use sensei_core::types::{PromptMessage, RetrievedContext, Role};

pub const SYSTEM_PROMPT: &str = "You are DSA-Sensei, a friendly and motivational tutor.\n\
Explain this DSA concept clearly, step-by-step, with intuition and motivation.\n\
Use retrieved context as factual reference.\n\
Encourage the learner to stay consistent.";

const QUESTION_PREFIX: &str = "Question: ";
const CONTEXT_HEADER: &str = "\n\nRetrieved context (may be partial, use prudently):\n";

/// `[Source: s]\ntext` blocks separated by blank lines.
pub fn context_block(contexts: &[RetrievedContext]) -> String {
    contexts
        .iter()
        .map(|c| format!("[Source: {}]\n{}", c.source, c.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// System instruction followed by the question and its grounding passages.
pub fn compose(question: &str, contexts: &[RetrievedContext]) -> Vec<PromptMessage> {
    let user = format!("{QUESTION_PREFIX}{question}{CONTEXT_HEADER}{}", context_block(contexts));
    vec![PromptMessage::system(SYSTEM_PROMPT), PromptMessage::user(user)]
}

/// The question embedded in a message list produced by [`compose`].
pub fn question_from(messages: &[PromptMessage]) -> Option<&str> {
    let user = messages.iter().find(|m| m.role == Role::User)?;
    let rest = user.content.strip_prefix(QUESTION_PREFIX)?;
    Some(rest.split_once(CONTEXT_HEADER).map_or(rest, |(q, _)| q))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(source: &str, text: &str) -> RetrievedContext {
        RetrievedContext { text: text.into(), source: source.into(), score: 0.5 }
    }

    #[test]
    fn composes_system_and_user_messages() {
        let messages = compose("What is a heap?", &[ctx("heap.md", "A heap is a tree."), ctx("pq.md", "Priority queue.")]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.starts_with("You are DSA-Sensei"));
        assert_eq!(
            messages[1].content,
            "Question: What is a heap?\n\nRetrieved context (may be partial, use prudently):\n\
             [Source: heap.md]\nA heap is a tree.\n\n[Source: pq.md]\nPriority queue."
        );
    }

    #[test]
    fn empty_contexts_leave_an_empty_block() {
        let messages = compose("Explain BFS", &[]);
        assert!(messages[1].content.ends_with("use prudently):\n"));
        assert_eq!(compose("Explain BFS", &[]), messages);
    }

    #[test]
    fn question_is_recovered_from_composed_messages() {
        let messages = compose("multi\nline question", &[ctx("a.md", "x")]);
        assert_eq!(question_from(&messages), Some("multi\nline question"));
        assert_eq!(question_from(&[PromptMessage::system("only system")]), None);
    }
}
