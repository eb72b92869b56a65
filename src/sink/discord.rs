use anyhow::{anyhow, Result};
use log::debug;
use reqwest::{Client as HttpClient, Response, Url};
use serde::Deserialize;
use serde_json::json;
use crate::message::Message;
use super::{Args, MessageId};

const PREFIX: &str = "https://discord.com/api/webhooks/";

pub struct DiscordClient {
    client:   HttpClient,
    endpoint: Url,
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

impl DiscordClient {
    pub fn new(args: Args) -> Result<Self> {
        let endpoint = args.url("url")?;

        if !endpoint.as_str().starts_with(PREFIX) {
            return Err(anyhow!("invalid discord webhook: {}", endpoint));
        }

        let client = HttpClient::builder().user_agent(env!("CARGO_PKG_NAME")).build()?;

        Ok(Self { client, endpoint })
    }

    pub async fn verify(&self) -> Result<()> {
        let res = self.client.get(self.endpoint.clone()).send().await?;
        check(res).await?;
        Ok(())
    }

    pub async fn send(&self, message: &Message) -> Result<MessageId> {
        let mut endpoint = self.endpoint.clone();
        endpoint.query_pairs_mut().append_pair("wait", "true");

        let payload = json!({ "embeds": [message] });
        let res = self.client.post(endpoint).json(&payload).send().await?;
        let created = check(res).await?.json::<Created>().await?;

        debug!("sent message {}", created.id);

        Ok(MessageId(created.id))
    }

    pub async fn edit(&self, id: &MessageId, message: &Message) -> Result<()> {
        let mut endpoint = self.endpoint.clone();
        endpoint.path_segments_mut()
            .map_err(|_| anyhow!("webhook url has no path: {}", self.endpoint))?
            .pop_if_empty()
            .push("messages")
            .push(&id.0);

        let payload = json!({ "embeds": [message] });
        let res = self.client.patch(endpoint).json(&payload).send().await?;
        check(res).await?;

        Ok(())
    }
}

async fn check(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(anyhow!("discord returned {}: {}", status, body))
}

#[cfg(test)]
mod test {
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;
    use super::*;

    #[derive(Debug)]
    struct Request {
        method: String,
        target: String,
        body:   String,
    }

    /// Answer one request per reply, in order, and hand back what was seen.
    async fn serve(replies: Vec<(u16, &'static str)>) -> (DiscordClient, JoinHandle<Vec<Request>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let task = tokio::spawn(async move {
            let mut seen = Vec::new();
            for (status, body) in replies {
                let (mut stream, _) = listener.accept().await.unwrap();
                seen.push(read(&mut stream).await);

                let reply = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status, body.len(), body,
                );
                stream.write_all(reply.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            seen
        });

        let url = format!("http://{}/api/webhooks/1/token?thread_id=9", addr);
        let client = DiscordClient {
            client:   HttpClient::new(),
            endpoint: Url::parse(&url).unwrap(),
        };

        (client, task)
    }

    async fn read(stream: &mut TcpStream) -> Request {
        let mut buf   = Vec::new();
        let mut chunk = [0u8; 1024];

        let head = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed mid-request");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(i) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break i + 4;
            }
        };

        let text = String::from_utf8_lossy(&buf[..head]).to_string();
        let length = text.lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            match name.eq_ignore_ascii_case("content-length") {
                true  => value.trim().parse::<usize>().ok(),
                false => None,
            }
        }).unwrap_or(0);

        while buf.len() < head + length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed mid-body");
            buf.extend_from_slice(&chunk[..n]);
        }

        let mut parts = text.split_whitespace();
        Request {
            method: parts.next().unwrap_or_default().to_owned(),
            target: parts.next().unwrap_or_default().to_owned(),
            body:   String::from_utf8_lossy(&buf[head..head + length]).to_string(),
        }
    }

    #[tokio::test]
    async fn send_waits_for_message_id() {
        let (client, server) = serve(vec![(200, r#"{"id":"42","type":0}"#)]).await;

        let id = client.send(&Message::stopped()).await.unwrap();
        assert_eq!(id, MessageId("42".to_owned()));

        let seen = server.await.unwrap();
        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].target, "/api/webhooks/1/token?thread_id=9&wait=true");

        let body = serde_json::from_str::<Value>(&seen[0].body).unwrap();
        let title = body["embeds"][0]["title"].as_str().unwrap();
        assert!(title.contains("Monitoring stopped"));
    }

    #[tokio::test]
    async fn edit_keeps_query() {
        let (client, server) = serve(vec![(200, "{}")]).await;

        let id = MessageId("42".to_owned());
        client.edit(&id, &Message::stopped()).await.unwrap();

        let seen = server.await.unwrap();
        assert_eq!(seen[0].method, "PATCH");
        assert_eq!(seen[0].target, "/api/webhooks/1/token/messages/42?thread_id=9");
    }

    #[tokio::test]
    async fn verify_checks_status() {
        let (client, server) = serve(vec![
            (200, r#"{"id":"1"}"#),
            (404, r#"{"message":"Unknown Webhook"}"#),
        ]).await;

        assert!(client.verify().await.is_ok());
        let err = client.verify().await.unwrap_err();
        assert!(err.to_string().contains("404"));

        let seen = server.await.unwrap();
        assert!(seen.iter().all(|r| r.method == "GET"));
        assert_eq!(seen[0].target, "/api/webhooks/1/token?thread_id=9");
    }

    #[tokio::test]
    async fn error_status_fails_send() {
        let (client, server) = serve(vec![(500, "")]).await;
        assert!(client.send(&Message::stopped()).await.is_err());
        server.await.unwrap();
    }
}
