use crate::domain::ChatId;

/// Messenger-agnostic incoming update.
///
/// Only text is relayed; adapters drop other message kinds before building one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub chat_id: ChatId,
    pub first_name: String,
    pub name: String,
    /// Bot username from `/cmd@botname`, lower-cased.
    pub target: Option<String>,
}

impl Command {
    /// True unless the command names a different bot.
    pub fn is_addressed_to(&self, username: Option<&str>) -> bool {
        match (&self.target, username) {
            (Some(target), Some(me)) => target.eq_ignore_ascii_case(me),
            _ => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub text: String,
}

impl IncomingUpdate {
    /// Classify raw message text: a leading `/` makes it a command.
    pub fn from_text(chat_id: ChatId, first_name: impl Into<String>, text: &str) -> Self {
        if text.starts_with('/') {
            let (name, target) = parse_command(text);
            return Self::Command(Command {
                chat_id,
                first_name: first_name.into(),
                name,
                target,
            });
        }
        Self::Text(TextMessage {
            chat_id,
            text: text.to_string(),
        })
    }

    pub fn chat_id(&self) -> ChatId {
        match self {
            Self::Command(c) => c.chat_id,
            Self::Text(t) => t.chat_id,
        }
    }
}

/// Split `/Cmd@BotName args...` into (`cmd`, `Some("botname")`).
pub fn parse_command(text: &str) -> (String, Option<String>) {
    let first = text.split_whitespace().next().unwrap_or("");
    let mut parts = first.trim_start_matches('/').splitn(2, '@');

    let cmd = parts.next().unwrap_or("").to_lowercase();
    let target = parts
        .next()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    (cmd, target)
}

/// Outgoing "chat action" (typing indicator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatAction {
    Typing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_with_bot_suffix() {
        assert_eq!(
            parse_command("/Start@Relay_Bot  hello there "),
            ("start".to_string(), Some("relay_bot".to_string()))
        );
        assert_eq!(parse_command("/help"), ("help".to_string(), None));
        assert_eq!(parse_command("/help@"), ("help".to_string(), None));
    }

    #[test]
    fn slash_prefix_makes_a_command() {
        let update = IncomingUpdate::from_text(ChatId(7), "Ada", "/help@other_bot me");
        assert_eq!(
            update,
            IncomingUpdate::Command(Command {
                chat_id: ChatId(7),
                first_name: "Ada".to_string(),
                name: "help".to_string(),
                target: Some("other_bot".to_string()),
            })
        );
        assert_eq!(update.chat_id(), ChatId(7));
    }

    #[test]
    fn addressing_checks_only_explicit_targets() {
        let mut cmd = Command {
            chat_id: ChatId(1),
            first_name: "Ada".to_string(),
            name: "start".to_string(),
            target: None,
        };
        assert!(cmd.is_addressed_to(Some("relay_bot")));
        assert!(cmd.is_addressed_to(None));

        cmd.target = Some("relay_bot".to_string());
        assert!(cmd.is_addressed_to(Some("Relay_Bot")));
        assert!(!cmd.is_addressed_to(Some("other_bot")));
    }

    #[test]
    fn plain_text_is_kept_verbatim() {
        let update = IncomingUpdate::from_text(ChatId(7), "Ada", "  what is rust? ");
        match update {
            IncomingUpdate::Text(t) => assert_eq!(t.text, "  what is rust? "),
            other => panic!("expected text, got {other:?}"),
        }
    }
}
