use crate::types::{ChatMessage, MessageRole};

/// Messages exchanged during one chat session, oldest first.
///
/// The log only grows. What the reasoning engine sees each turn is
/// [`ConversationHistory::window`], which keeps the request size bounded.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
    window: usize,
}

impl ConversationHistory {
    /// `window` caps the view handed to the engine; `0` means no cap.
    pub fn new(window: usize) -> Self {
        Self {
            messages: Vec::new(),
            window,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = ChatMessage>) {
        self.messages.extend(messages);
    }

    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent messages, at most `window` of them, starting at a user
    /// message so a tool result is never shown without the call that caused it.
    pub fn window(&self) -> &[ChatMessage] {
        if self.window == 0 || self.messages.len() <= self.window {
            return &self.messages;
        }

        let start = self.messages.len() - self.window;
        match self.messages[start..]
            .iter()
            .position(|message| message.role == MessageRole::User)
        {
            Some(offset) => &self.messages[start + offset..],
            // A single turn longer than the window: keep its opening request.
            None => {
                let opening = self.messages[..start]
                    .iter()
                    .rposition(|message| message.role == MessageRole::User)
                    .unwrap_or(0);
                &self.messages[opening..]
            }
        }
    }
}
