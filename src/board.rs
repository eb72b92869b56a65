use chrono::Local;
use log::{debug, warn};
use tokio::sync::Mutex;
use crate::data::Record;
use crate::message::Message;
use crate::sink::{MessageId, Notifier};

/// The one status message that is created once and edited in place.
#[derive(Default)]
pub struct Board {
    id: Mutex<Option<MessageId>>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh<N: Notifier + ?Sized>(&self, notifier: &N, records: &[Record]) {
        let message = Message::board(records, Local::now());
        let mut id  = self.id.lock().await;

        match &*id {
            Some(current) => match notifier.edit(current, &message).await {
                Ok(()) => debug!("status board {} updated", current),
                Err(e) => warn!("status board update failed: {:?}", e),
            },
            None => match notifier.send(&message).await {
                Ok(created) => *id = Some(created),
                Err(e)      => warn!("status board creation failed: {:?}", e),
            },
        }
    }

    pub async fn id(&self) -> Option<MessageId> {
        self.id.lock().await.clone()
    }
}
