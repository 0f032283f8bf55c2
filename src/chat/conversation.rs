use super::client::{ChatClient, collect_reply};
use super::{ChatError, ChatMessage, Role};

const SYSTEM_PROMPT: &str =
    "You are a task management assistant. Help the user manage tasks, offer suggestions and answer questions.";
const GREETING: &str = "Hi! I'm your task assistant. I can help you manage tasks, make suggestions or answer questions. What can I do for you?";

/// Chat history for one assistant session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::assistant(GREETING),
            ],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages a user sees; the system prompt is hidden.
    pub fn visible(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }

    /// History as sent for a new user turn: everything so far, then the task
    /// snapshot as a system message, then the user's message.
    pub fn request(&self, context: &str, input: &str) -> Vec<ChatMessage> {
        let mut history = self.messages.clone();
        history.push(ChatMessage::system(context));
        history.push(ChatMessage::user(input));
        history
    }

    /// Send `input` and stream the reply through `on_update`.
    ///
    /// The user message is recorded even if the request fails. The assistant
    /// reply is recorded only when the stream completes. Blank input is
    /// ignored and returns `Ok(None)`.
    pub async fn send<F>(
        &mut self,
        client: &ChatClient,
        context: &str,
        input: &str,
        on_update: F,
    ) -> Result<Option<&ChatMessage>, ChatError>
    where
        F: FnMut(&str),
    {
        if input.trim().is_empty() {
            return Ok(None);
        }

        let history = self.request(context, input);
        self.messages.push(ChatMessage::user(input));

        let stream = client.stream(&history).await?;
        let reply = collect_reply(stream, on_update).await?;

        self.messages.push(ChatMessage::assistant(reply));
        Ok(self.messages.last())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_hidden_system_prompt_and_greeting() {
        let conversation = Conversation::new();
        assert_eq!(conversation.messages().len(), 2);
        let visible: Vec<_> = conversation.visible().collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].role, Role::Assistant);
    }

    #[test]
    fn request_appends_context_then_user_message() {
        let conversation = Conversation::new();
        let history = conversation.request("# data", "what's due?");
        assert_eq!(history.len(), 4);
        assert_eq!(history[2], ChatMessage::system("# data"));
        assert_eq!(history[3], ChatMessage::user("what's due?"));
        assert_eq!(conversation.messages().len(), 2);
    }

    #[test]
    fn messages_serialize_with_lowercase_roles() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
