use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use crate::data::{Cause, NetworkSample, Record, Status};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Message {
    pub title:       String,
    pub description: String,
    pub color:       u32,
    pub timestamp:   String,
    pub footer:      Footer,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields:      Vec<Field>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Footer {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Field {
    pub name:   String,
    pub value:  String,
    pub inline: bool,
}

pub const GREEN:  u32 = 0x00FF00;
pub const RED:    u32 = 0xFF0000;
pub const ORANGE: u32 = 0xFFA500;
pub const YELLOW: u32 = 0xFFFF00;
pub const GREY:   u32 = 0x808080;
pub const BLUE:   u32 = 0x0099FF;
pub const PURPLE: u32 = 0x9B59B6;

struct Style {
    glyph: &'static str,
    title: &'static str,
    color: u32,
}

impl Cause {
    fn style(&self) -> Style {
        let (glyph, title, color) = match self {
            Self::Crashed           => ("💥", "Container crashed",    RED),
            Self::StoppedGracefully => ("🛑", "Container stopped",    ORANGE),
            Self::Restarting        => ("🔄", "Container restarting", YELLOW),
            Self::Started           => ("🟢", "Container started",    GREEN),
            Self::Stopped           => ("⚫", "Container stopped",    GREY),
        };
        Style { glyph, title, color }
    }

    fn describe(&self, record: &Record) -> String {
        match self {
            Self::Crashed => match record.exit_code {
                Some(code) => format!("exited abnormally (exit code {})", code),
                None       => "exited abnormally".to_owned(),
            },
            Self::StoppedGracefully => "shut down cleanly (exit code 0)".to_owned(),
            Self::Restarting        => "being restarted automatically".to_owned(),
            Self::Started           => "started and running".to_owned(),
            Self::Stopped           => "no longer running".to_owned(),
        }
    }
}

impl Message {
    pub fn new(title: String, description: String, color: u32) -> Self {
        Self {
            title:       title,
            description: description,
            color:       color,
            timestamp:   Utc::now().to_rfc3339(),
            footer:      Footer { text: footer() },
            fields:      Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, value: String, inline: bool) -> Self {
        self.fields.push(Field {
            name:   name.to_owned(),
            value:  value,
            inline: inline,
        });
        self
    }

    pub fn report(cause: Cause, record: &Record) -> Self {
        let style = cause.style();
        let title = format!("{} {}: {}", style.glyph, style.title, record.name);

        let message = Self::new(title, cause.describe(record), style.color)
            .field("status", record.status.to_string(), true)
            .field("restart policy", record.policy.to_string(), true)
            .field("restart count", record.restarts.to_string(), true);

        match record.exit_code {
            Some(code) => message.field("exit code", code.to_string(), true),
            None       => message,
        }
    }

    pub fn started(names: &[String]) -> Self {
        let title = "✅ Monitoring started".to_owned();
        let description = format!("watching {} containers", names.len());
        Self::new(title, description, GREEN)
            .field("mode", "live events + stop cause detection".to_owned(), true)
            .field("containers", names.join("\n"), false)
    }

    pub fn stopped() -> Self {
        let title = "⏹️ Monitoring stopped".to_owned();
        Self::new(title, "monitor shut down by operator".to_owned(), RED)
    }

    pub fn throughput(name: &str, delta: NetworkSample) -> Self {
        let title = format!("📶 Network fluctuation: {}", name);
        let total = delta.rx.saturating_add(delta.tx);
        let description = format!("{} moved in the last interval", mib(total));
        Self::new(title, description, PURPLE)
            .field("received", mib(delta.rx), true)
            .field("sent", mib(delta.tx), true)
            .field("total", mib(total), true)
    }

    pub fn board(records: &[Record], now: DateTime<Local>) -> Self {
        let title = "📊 Container status".to_owned();
        let description = format!("last updated {}", now.format("%H:%M:%S"));

        records.iter().fold(Self::new(title, description, BLUE), |message, record| {
            message.field(&record.name, summary(record), true)
        })
    }
}

fn summary(record: &Record) -> String {
    let glyph = match record.status {
        Status::Running    => "🟢 running",
        Status::Exited     => "🔴 stopped",
        Status::Paused     => "🟡 paused",
        Status::Restarting => "🔄 restarting",
        Status::NotFound   => "❌ not found",
        Status::Unknown    => "⚪ unknown",
    };

    let mut extra = Vec::new();
    if let Some(code) = record.exit_code {
        extra.push(format!("exit code: {}", code));
    }
    if record.restarts > 0 {
        extra.push(format!("restarts: {}", record.restarts));
    }

    match extra.is_empty() {
        true  => glyph.to_owned(),
        false => format!("{}\n{}", glyph, extra.join(" | ")),
    }
}

fn mib(bytes: u64) -> String {
    format!("{:.2} MiB", bytes as f64 / (1024.0 * 1024.0))
}

fn footer() -> String {
    let host = hostname::get().ok().and_then(|h| h.into_string().ok());
    match host {
        Some(host) => format!("{} {} on {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), host),
        None       => format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    }
}
