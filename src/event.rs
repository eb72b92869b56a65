use std::fmt;
use bollard::models::{EventMessage, EventMessageTypeEnum};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Event {
    pub kind:      Kind,
    pub action:    Action,
    pub name:      Option<String>,
    pub exit_code: Option<i64>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Container,
    Other,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
    Start,
    Die,
    Stop,
    Other(String),
}

impl From<&str> for Action {
    fn from(action: &str) -> Self {
        match action {
            "start" => Self::Start,
            "die"   => Self::Die,
            "stop"  => Self::Stop,
            other   => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start    => "start",
            Self::Die      => "die",
            Self::Stop     => "stop",
            Self::Other(a) => a.as_str(),
        })
    }
}

impl From<EventMessage> for Event {
    fn from(msg: EventMessage) -> Self {
        let kind = match msg.typ {
            Some(EventMessageTypeEnum::CONTAINER) => Kind::Container,
            _                                     => Kind::Other,
        };

        let action = Action::from(msg.action.as_deref().unwrap_or(""));
        let mut attrs = msg.actor.and_then(|a| a.attributes).unwrap_or_default();

        let name      = attrs.remove("name");
        let exit_code = attrs.get("exitCode").and_then(|c| c.parse().ok());

        Self { kind, action, name, exit_code }
    }
}
