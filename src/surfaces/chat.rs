//! Chat surface model
//!
//! Owns the conversation, the input box and the thinking indicator. A send
//! is split into [`ChatSurface::begin_send`], which hands out a ticket, and
//! [`ChatSurface::complete_send`], which accepts the reply for that ticket
//! only. While one send is in flight another cannot start.

use crate::i18n::{Language, Translations};
use crate::orchestrator::ChatCommand;
use crate::types::{Message, MessageRole};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;

/// Messages passed to the model as conversation context.
pub const CONTEXT_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Destination,
    Activity,
    Tip,
}

/// Follow-up card shown under an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub kind: SuggestionKind,
    pub title: String,
    pub description: String,
}

/// An in-flight advice request.
#[derive(Debug, Clone, PartialEq)]
pub struct SendTicket {
    seq: u64,
    pub text: String,
    /// Recent history, oldest first, excluding `text`
    pub context: Vec<Message>,
}

impl SendTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
pub struct ChatSurface {
    messages: Vec<Message>,
    input: String,
    in_flight: Option<u64>,
    next_seq: u64,
    suggestions: Vec<Suggestion>,
    language: Language,
}

impl ChatSurface {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_thinking(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn quick_replies(&self) -> &'static [&'static str] {
        Translations::for_language(self.language).quick_replies
    }

    /// Last [`CONTEXT_WINDOW`] messages, oldest first.
    pub fn context(&self) -> Vec<Message> {
        let start = self.messages.len().saturating_sub(CONTEXT_WINDOW);
        self.messages[start..].to_vec()
    }

    pub fn apply(&mut self, command: ChatCommand) {
        match command {
            ChatCommand::Clear => {
                self.messages.clear();
                self.input.clear();
                self.suggestions.clear();
                self.in_flight = None;
            }
            ChatCommand::Prefill(text) => self.input = text,
        }
    }

    pub fn drain(&mut self, inbox: &mut UnboundedReceiver<ChatCommand>) {
        while let Ok(command) = inbox.try_recv() {
            self.apply(command);
        }
    }

    /// Start sending `text`. Refused (`None`) for blank text or while a
    /// previous send has not completed.
    pub fn begin_send(&mut self, text: &str) -> Option<SendTicket> {
        if text.trim().is_empty() || self.in_flight.is_some() {
            return None;
        }
        let context = self.context();
        self.messages.push(Message::user(text));
        self.suggestions.clear();
        self.next_seq += 1;
        self.in_flight = Some(self.next_seq);
        Some(SendTicket {
            seq: self.next_seq,
            text: text.to_string(),
            context,
        })
    }

    /// Send whatever is in the input box and empty it.
    pub fn send_input(&mut self) -> Option<SendTicket> {
        let text = self.input.clone();
        let ticket = self.begin_send(&text)?;
        self.input.clear();
        Some(ticket)
    }

    pub fn quick_reply(&mut self, index: usize) -> Option<SendTicket> {
        let reply = self.quick_replies().get(index)?;
        self.begin_send(reply)
    }

    /// Accept the reply for `ticket`. A ticket that is no longer current
    /// (the chat was cleared meanwhile) is dropped and `false` returned.
    pub fn complete_send(&mut self, ticket: SendTicket, reply: String) -> bool {
        if self.in_flight != Some(ticket.seq) {
            tracing::debug!(seq = ticket.seq, "Discarding stale chat reply");
            return false;
        }
        self.in_flight = None;
        self.messages.push(Message::assistant(reply));
        self.suggestions = follow_up_suggestions(self.language);
        true
    }

    /// Re-ask the given user message: it and its reply are removed and the
    /// question is sent again at the end of the conversation.
    pub fn regenerate(&mut self, user_message_id: &str) -> Option<SendTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        let idx = self
            .messages
            .iter()
            .position(|m| m.id == user_message_id && m.role == MessageRole::User)?;
        let original = self.messages.remove(idx);
        if self
            .messages
            .get(idx)
            .is_some_and(|m| m.role == MessageRole::Assistant)
        {
            self.messages.remove(idx);
        }
        self.begin_send(&original.content)
    }
}

fn follow_up_suggestions(lang: Language) -> Vec<Suggestion> {
    let (a, b, c) = match lang {
        Language::Zh => (
            ("北京故宫博物院", "明清两代皇宫，世界文化遗产"),
            ("胡同游", "体验老北京胡同文化"),
            ("交通建议", "推荐使用地铁出行"),
        ),
        Language::En => (
            ("Forbidden City, Beijing", "Imperial palace, World Heritage site"),
            ("Hutong Tour", "Experience old Beijing hutong culture"),
            ("Transportation Tips", "Recommended: use the subway"),
        ),
    };
    [
        ("1", SuggestionKind::Destination, a),
        ("2", SuggestionKind::Activity, b),
        ("3", SuggestionKind::Tip, c),
    ]
    .into_iter()
    .map(|(id, kind, (title, description))| Suggestion {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        description: description.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_is_exclusive_until_completed() {
        let mut chat = ChatSurface::new(Language::En);
        let ticket = chat.begin_send("beach").unwrap();
        assert!(chat.is_thinking());
        assert!(chat.begin_send("mountains").is_none());

        assert!(chat.complete_send(ticket, "Try Beidaihe.".into()));
        assert!(!chat.is_thinking());
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.suggestions().len(), 3);
        assert!(chat.begin_send("mountains").is_some());
    }

    #[test]
    fn test_blank_send_is_refused() {
        let mut chat = ChatSurface::new(Language::En);
        assert!(chat.begin_send("   ").is_none());
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn test_clear_discards_in_flight_reply() {
        let mut chat = ChatSurface::new(Language::En);
        let ticket = chat.begin_send("beach").unwrap();
        chat.apply(ChatCommand::Clear);
        assert!(!chat.complete_send(ticket, "late".into()));
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn test_context_is_last_five_messages() {
        let mut chat = ChatSurface::new(Language::En);
        for i in 0..4 {
            let t = chat.begin_send(&format!("q{}", i)).unwrap();
            chat.complete_send(t, format!("a{}", i));
        }
        let ticket = chat.begin_send("q4").unwrap();
        assert_eq!(ticket.context.len(), CONTEXT_WINDOW);
        assert_eq!(ticket.context[0].content, "a1");
        assert_eq!(ticket.context[4].content, "a3");
    }

    #[test]
    fn test_send_input_clears_box() {
        let mut chat = ChatSurface::new(Language::En);
        chat.apply(ChatCommand::Prefill("Road trip".into()));
        let ticket = chat.send_input().unwrap();
        assert_eq!(ticket.text, "Road trip");
        assert_eq!(chat.input(), "");
    }

    #[test]
    fn test_regenerate_replaces_pair() {
        let mut chat = ChatSurface::new(Language::En);
        let t = chat.begin_send("beach").unwrap();
        chat.complete_send(t, "first answer".into());
        let user_id = chat.messages()[0].id.clone();

        let again = chat.regenerate(&user_id).unwrap();
        assert_eq!(again.text, "beach");
        assert_eq!(chat.messages().len(), 1);
        chat.complete_send(again, "second answer".into());
        assert_eq!(chat.messages()[1].content, "second answer");
    }

    #[test]
    fn test_quick_reply() {
        let mut chat = ChatSurface::new(Language::Zh);
        let ticket = chat.quick_reply(0).unwrap();
        assert_eq!(ticket.text, "推荐一些热门目的地");
        assert!(chat.quick_reply(99).is_none());
    }
}
