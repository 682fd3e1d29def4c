
use crate::{
    db::Db,
    key::KeyPart,
    kv::MemoryKv,
    model::index::IndexModel,
    obs::{MetricsEvent, MetricsSink},
    patch::{MergePatch, MergePatchError, merge_field, merge_optional},
    traits::Model,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

///
/// User
///
/// Fixture model: `email` is always indexed, `nickname` only when set.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(crate) struct User {
    pub name: String,
    pub email: String,
    pub nickname: Option<String>,
    pub age: u32,
}

impl User {
    pub(crate) fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            nickname: None,
            age: 30,
        }
    }

    pub(crate) fn with_nickname(mut self, nickname: &str) -> Self {
        self.nickname = Some(nickname.to_string());
        self
    }
}

#[derive(Debug, Default)]
pub(crate) struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<Option<String>>,
    pub age: Option<u32>,
}

impl MergePatch for User {
    type Patch = UserPatch;

    fn merge(&mut self, patch: UserPatch) -> Result<(), MergePatchError> {
        if patch.age.is_some_and(|age| age > 150) {
            return Err(MergePatchError::Rejected {
                reason: "age out of range".to_string(),
            }
            .with_field("age"));
        }

        merge_field(&mut self.name, patch.name);
        merge_field(&mut self.email, patch.email);
        merge_optional(&mut self.nickname, patch.nickname);
        merge_field(&mut self.age, patch.age);

        Ok(())
    }
}

fn user_email(user: &User) -> Option<KeyPart> {
    Some(KeyPart::from(&user.email))
}

fn user_nickname(user: &User) -> Option<KeyPart> {
    user.nickname.as_ref().map(KeyPart::from)
}

impl Model for User {
    const COLLECTION: &'static str = "users";
    const INDEXES: &'static [IndexModel<Self>] = &[
        IndexModel::new("email", user_email),
        IndexModel::new("nickname", user_nickname),
    ];
}

///
/// RecordingSink
///

#[derive(Default)]
pub(crate) struct RecordingSink(Mutex<Vec<MetricsEvent>>);

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<MetricsEvent> {
        self.0.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().clear();
    }
}

impl MetricsSink for RecordingSink {
    fn record(&self, event: MetricsEvent) {
        self.0.lock().push(event);
    }
}

pub(crate) fn test_db() -> Db<MemoryKv> {
    Db::new(MemoryKv::new())
}

pub(crate) fn recorded_db() -> (Db<MemoryKv>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let db = Db::new(MemoryKv::new()).with_metrics_sink(sink.clone());

    (db, sink)
}
