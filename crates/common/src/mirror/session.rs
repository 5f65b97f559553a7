use super::{MirrorStore, User};

/// Application session: the signed-in user and their mirror store.
///
/// Built once at startup and handed by `&mut` to whatever drives user
/// actions. One session per process; nothing here is shared or locked.
#[derive(Debug)]
pub struct Session {
    mirror: MirrorStore,
}

impl Session {
    pub fn start(user: User) -> Self {
        tracing::debug!(email = %user.email, "session started");

        let mut mirror = MirrorStore::new();
        mirror.set_user(Some(user));
        Self { mirror }
    }

    pub fn user(&self) -> Option<&User> {
        self.mirror.user()
    }

    pub fn mirror(&self) -> &MirrorStore {
        &self.mirror
    }

    pub fn mirror_mut(&mut self) -> &mut MirrorStore {
        &mut self.mirror
    }

    /// Tear the session down, handing back whatever the mirror held.
    pub fn end(self) -> MirrorStore {
        tracing::debug!(objects = self.mirror.len(), "session ended");
        self.mirror
    }
}
