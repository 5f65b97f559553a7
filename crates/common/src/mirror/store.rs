use serde::{Deserialize, Serialize};

use crate::access::AccessGrant;
use crate::object::{ContentHash, Object};

/// The person driving the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub role: String,
}

impl User {
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            role: role.into(),
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new("demo@example.com", "Demo User", "Patient")
    }
}

#[derive(Debug, Default)]
pub struct MirrorStore {
    user: Option<User>,
    objects: Vec<Object>,
    active: Option<ContentHash>,
}

impl MirrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn get(&self, hash: &ContentHash) -> Option<&Object> {
        self.objects.iter().find(|object| &object.content_hash == hash)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Replace the whole object list, e.g. after a re-list.
    ///
    /// The selection is kept even if the selected object is gone;
    /// [`MirrorStore::active`] then reports nothing.
    pub fn replace_all(&mut self, objects: Vec<Object>) {
        self.objects = objects;
    }

    /// Add an object, replacing any existing entry with the same hash.
    pub fn insert(&mut self, object: Object) {
        match self
            .objects
            .iter_mut()
            .find(|existing| existing.content_hash == object.content_hash)
        {
            Some(existing) => *existing = object,
            None => self.objects.push(object),
        }
    }

    /// Drop an object, clearing the selection if it pointed at it.
    pub fn remove(&mut self, hash: &ContentHash) -> Option<Object> {
        let index = self
            .objects
            .iter()
            .position(|object| &object.content_hash == hash)?;

        if self.active.as_ref() == Some(hash) {
            self.active = None;
        }
        Some(self.objects.remove(index))
    }

    /// Swap in a new access list. Returns false for an unknown hash.
    pub fn update_access_list(&mut self, hash: &ContentHash, access_list: Vec<AccessGrant>) -> bool {
        match self
            .objects
            .iter_mut()
            .find(|object| &object.content_hash == hash)
        {
            Some(object) => {
                object.access_list = access_list;
                true
            }
            None => false,
        }
    }

    pub fn select_active(&mut self, hash: Option<ContentHash>) {
        self.active = hash;
    }

    pub fn active_hash(&self) -> Option<&ContentHash> {
        self.active.as_ref()
    }

    /// The selected object, if it is present in the mirror.
    pub fn active(&self) -> Option<&Object> {
        self.active.as_ref().and_then(|hash| self.get(hash))
    }
}
