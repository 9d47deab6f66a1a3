use crate::error::{Error, Result};
use crate::message::RawMessage;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MailLabel {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// One page of message summaries plus the token for the next page, if any.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    #[serde(default)]
    pub messages: Vec<MessageSummary>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LabelList {
    #[serde(default)]
    labels: Vec<MailLabel>,
}

/// The mail provider as seen by the rest of the program. Every call blocks.
pub trait Mailbox {
    fn labels(&self) -> Result<Vec<MailLabel>>;

    fn list_messages(&self, page_token: Option<&str>, page_size: u32) -> Result<MessagePage>;

    fn get_message(&self, id: &str) -> Result<RawMessage>;
}

/// Gmail REST client authenticated with a bearer access token.
pub struct GmailClient {
    agent: ureq::Agent,
    base: String,
    user: String,
    token: String,
}

impl GmailClient {
    pub fn new(base: &str, user: &str, token: &str) -> Self {
        GmailClient {
            agent: ureq::AgentBuilder::new().build(),
            base: base.trim_end_matches('/').to_string(),
            user: user.to_string(),
            token: token.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/users/{}/{}", self.base, self.user, path)
    }

    fn get_json<T: DeserializeOwned>(&self, request: ureq::Request) -> Result<T> {
        let response = request
            .set("Authorization", &format!("Bearer {}", self.token))
            .call();
        match response {
            Ok(resp) => Ok(resp.into_json()?),
            Err(ureq::Error::Status(status, resp)) => Err(Error::Api {
                status,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(err) => Err(Error::Transport(err.to_string())),
        }
    }
}

impl Mailbox for GmailClient {
    fn labels(&self) -> Result<Vec<MailLabel>> {
        let list: LabelList = self.get_json(self.agent.get(&self.url("labels")))?;
        Ok(list.labels)
    }

    fn list_messages(&self, page_token: Option<&str>, page_size: u32) -> Result<MessagePage> {
        let mut request = self
            .agent
            .get(&self.url("messages"))
            .query("maxResults", &page_size.to_string());
        if let Some(token) = page_token {
            request = request.query("pageToken", token);
        }
        self.get_json(request)
    }

    fn get_message(&self, id: &str) -> Result<RawMessage> {
        log::debug!("Fetching message {}", id);
        let request = self
            .agent
            .get(&self.url(&format!("messages/{}", id)))
            .query("format", "full");
        self.get_json(request)
    }
}
