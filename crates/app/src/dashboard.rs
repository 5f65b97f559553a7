use std::path::Path;

use chrono::Utc;

use common::access::{AccessError, AccessGrant, AccessManager};
use common::gateway::Gateway;
use common::mirror::{Session, User};
use common::object::{ContentHash, Object, Upload};

/// MIME types the dashboard accepts for upload.
pub const ACCEPTED_MIME_TYPES: &[&str] = &["application/pdf", "image/png", "image/jpeg"];

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("unsupported file type '{0}' (accepted: PDF, PNG, JPEG)")]
    UnsupportedType(String),

    #[error("not signed in")]
    SignedOut,

    #[error("cannot derive a file name from {0}")]
    InvalidFileName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Drives user actions for one session.
///
/// Every action goes to the gateway first. The session's mirror is only
/// touched once the remote call has succeeded, so a failure leaves the
/// mirror exactly as it was.
#[derive(Debug)]
pub struct Dashboard<G: Gateway> {
    manager: AccessManager<G>,
    session: Session,
}

impl<G: Gateway> Dashboard<G> {
    pub fn new(manager: AccessManager<G>, session: Session) -> Self {
        Self { manager, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn manager(&self) -> &AccessManager<G> {
        &self.manager
    }

    /// Hand the session back, e.g. on sign-out.
    pub fn into_session(self) -> Session {
        self.session
    }

    fn user(&self) -> Result<&User, DashboardError> {
        self.session.user().ok_or(DashboardError::SignedOut)
    }

    /// Re-list the objects shared with the current user.
    pub async fn refresh(&mut self) -> Result<&[Object], DashboardError> {
        let email = self.user()?.email.clone();
        let objects = self.manager.list(&email).await?;

        tracing::debug!(count = objects.len(), "mirror refreshed");
        let mirror = self.session.mirror_mut();
        mirror.replace_all(objects);
        Ok(mirror.objects())
    }

    /// Read a file from disk and upload it, guessing its type from the extension.
    pub async fn upload_file(&mut self, path: &Path) -> Result<Object, DashboardError> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| DashboardError::InvalidFileName(path.display().to_string()))?
            .to_string();
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(common::object::FALLBACK_MIME_TYPE);
        ensure_accepted(mime_type)?;

        let bytes = tokio::fs::read(path).await?;
        self.upload(Upload::new(name, mime_type, bytes)).await
    }

    /// Upload several files in order, then re-list.
    ///
    /// Stops at the first failure. Files uploaded before it stay pinned and
    /// mirrored.
    pub async fn upload_files<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
    ) -> Result<Vec<Object>, DashboardError> {
        let mut uploaded = Vec::with_capacity(paths.len());
        for path in paths {
            uploaded.push(self.upload_file(path.as_ref()).await?);
        }

        self.refresh().await?;
        Ok(uploaded)
    }

    /// Upload a file, granting the current user write access for the owner period.
    pub async fn upload(&mut self, upload: Upload) -> Result<Object, DashboardError> {
        ensure_accepted(&upload.mime_type)?;
        let owner = AccessGrant::owner(self.user()?.email.clone(), Utc::now());

        let object = self.manager.upload(upload, vec![owner]).await?;
        self.session.mirror_mut().insert(object.clone());
        Ok(object)
    }

    pub async fn grant(
        &mut self,
        hash: &ContentHash,
        grant: AccessGrant,
    ) -> Result<Vec<AccessGrant>, DashboardError> {
        let access_list = self.manager.grant(hash, grant).await?;

        self.session
            .mirror_mut()
            .update_access_list(hash, access_list.clone());
        Ok(access_list)
    }

    pub async fn revoke(
        &mut self,
        hash: &ContentHash,
        email: &str,
    ) -> Result<Vec<AccessGrant>, DashboardError> {
        let access_list = self.manager.revoke(hash, email).await?;

        self.session
            .mirror_mut()
            .update_access_list(hash, access_list.clone());
        Ok(access_list)
    }

    /// Select an object for access management; `None` clears the selection.
    pub fn select(&mut self, hash: Option<ContentHash>) -> Option<&Object> {
        let mirror = self.session.mirror_mut();
        mirror.select_active(hash);
        mirror.active()
    }
}

fn ensure_accepted(mime_type: &str) -> Result<(), DashboardError> {
    if ACCEPTED_MIME_TYPES.contains(&mime_type) {
        Ok(())
    } else {
        Err(DashboardError::UnsupportedType(mime_type.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use common::access::AccessLevel;
    use common::gateway::{GatewayError, MemoryGateway, PinMetadata};
    use serde_json::json;

    use super::*;

    fn dashboard() -> (Dashboard<MemoryGateway>, MemoryGateway) {
        let gateway = MemoryGateway::new();
        let dashboard = Dashboard::new(
            AccessManager::new(gateway.clone()),
            Session::start(User::default()),
        );
        (dashboard, gateway)
    }

    fn pdf(bytes: &[u8]) -> Upload {
        Upload::new("report.pdf", "application/pdf", bytes.to_vec())
    }

    #[tokio::test]
    async fn test_upload_grants_owner_and_mirrors() {
        let (mut dashboard, gateway) = dashboard();

        let object = dashboard.upload(pdf(&[0u8; 500_000])).await.unwrap();

        assert_eq!(object.byte_size, 500_000);
        assert_eq!(object.access_list.len(), 1);
        let owner = &object.access_list[0];
        assert_eq!(owner.grantee_email, "demo@example.com");
        assert_eq!(owner.access_level, AccessLevel::Write);
        assert!(owner.expires_at - Utc::now() > Duration::days(29));

        assert_eq!(gateway.len(), 1);
        assert_eq!(dashboard.session().mirror().objects(), &[object]);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_type() {
        let (mut dashboard, gateway) = dashboard();

        let result = dashboard
            .upload(Upload::new("notes.txt", "text/plain", b"hi".to_vec()))
            .await;

        assert!(matches!(result, Err(DashboardError::UnsupportedType(_))));
        assert!(gateway.is_empty());
        assert!(dashboard.session().mirror().is_empty());
    }

    #[tokio::test]
    async fn test_upload_file_guesses_type() {
        let (mut dashboard, _gateway) = dashboard();
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("scan.JPG");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        let object = dashboard.upload_file(&path).await.unwrap();
        assert_eq!(object.display_name, "scan.JPG");
        assert_eq!(object.mime_type, "image/jpeg");

        let path = dir.path().join("archive.zip");
        std::fs::write(&path, b"zip").unwrap();
        assert!(matches!(
            dashboard.upload_file(&path).await,
            Err(DashboardError::UnsupportedType(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_files_uploads_each_then_relists() {
        let (mut dashboard, gateway) = dashboard();
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.pdf");
        let second = dir.path().join("b.png");
        std::fs::write(&first, b"first").unwrap();
        std::fs::write(&second, b"second").unwrap();

        let objects = dashboard.upload_files(&[&first, &second]).await.unwrap();

        let names: Vec<_> = objects.iter().map(|o| o.display_name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.png"]);
        assert_eq!(gateway.len(), 2);
        assert_eq!(dashboard.session().mirror().len(), 2);
    }

    #[tokio::test]
    async fn test_upload_files_stops_at_first_failure() {
        let (mut dashboard, gateway) = dashboard();
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.pdf");
        let bad = dir.path().join("notes.txt");
        let never = dir.path().join("c.pdf");
        for path in [&good, &bad, &never] {
            std::fs::write(path, path.to_string_lossy().as_bytes()).unwrap();
        }

        let result = dashboard.upload_files(&[&good, &bad, &never]).await;

        assert!(matches!(result, Err(DashboardError::UnsupportedType(_))));
        assert_eq!(gateway.len(), 1);
        assert_eq!(dashboard.session().mirror().objects()[0].display_name, "a.pdf");
    }

    #[tokio::test]
    async fn test_upload_requires_user() {
        let mut session = Session::start(User::default());
        session.mirror_mut().set_user(None);
        let mut dashboard = Dashboard::new(AccessManager::new(MemoryGateway::new()), session);

        assert!(matches!(
            dashboard.upload(pdf(b"x")).await,
            Err(DashboardError::SignedOut)
        ));
        assert!(matches!(
            dashboard.refresh().await,
            Err(DashboardError::SignedOut)
        ));
    }

    #[tokio::test]
    async fn test_grant_and_revoke_update_mirror() {
        let (mut dashboard, _gateway) = dashboard();
        let object = dashboard.upload(pdf(b"doc")).await.unwrap();
        let hash = object.content_hash.clone();
        let doctor = AccessGrant::expiring_in("doc@h.com", AccessLevel::Read, Utc::now(), 90);

        let list = dashboard
            .grant(&hash, doctor)
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(
            dashboard.session().mirror().get(&hash).unwrap().access_list,
            list
        );

        let list = dashboard.revoke(&hash, "doc@h.com").await.unwrap();
        assert_eq!(list, object.access_list);
        assert_eq!(
            dashboard.session().mirror().get(&hash).unwrap().access_list,
            object.access_list
        );
    }

    #[tokio::test]
    async fn test_failed_write_leaves_mirror_unchanged() {
        let (mut dashboard, gateway) = dashboard();
        let object = dashboard.upload(pdf(b"doc")).await.unwrap();
        let hash = object.content_hash.clone();

        gateway.fail_next_update("gateway unavailable");
        let result = dashboard
            .grant(&hash, AccessGrant::owner("doc@h.com", Utc::now()))
            .await;

        assert!(matches!(
            result,
            Err(DashboardError::Access(AccessError::Gateway(_)))
        ));
        assert_eq!(dashboard.session().mirror().objects(), &[object]);
    }

    #[tokio::test]
    async fn test_grant_on_unknown_hash() {
        let (mut dashboard, _gateway) = dashboard();
        let hash = ContentHash::of_bytes(b"never pinned").unwrap();

        let result = dashboard
            .grant(&hash, AccessGrant::owner("a@x", Utc::now()))
            .await;
        assert!(matches!(
            result,
            Err(DashboardError::Access(AccessError::Gateway(
                GatewayError::NotFound(_)
            )))
        ));
    }

    #[tokio::test]
    async fn test_refresh_replaces_mirror() {
        let (mut dashboard, gateway) = dashboard();
        dashboard.upload(pdf(b"mine")).await.unwrap();

        let shared = json!([{
            "userEmail": "demo@example.com",
            "accessLevel": "read",
            "expiresAt": "2030-01-01T00:00:00Z",
        }]);
        let mut metadata = PinMetadata {
            name: Some("shared.png".into()),
            ..PinMetadata::default()
        };
        metadata
            .keyvalues
            .insert("access".into(), json!(shared.to_string()));
        gateway.insert_pin(b"shared", metadata).unwrap();

        let mut other = PinMetadata::default();
        other
            .keyvalues
            .insert("access".into(), json!("[]"));
        gateway.insert_pin(b"not mine", other).unwrap();

        let objects = dashboard.refresh().await.unwrap();
        assert_eq!(objects.len(), 2);
        assert!(objects.iter().any(|o| o.display_name == "shared.png"));
    }

    #[tokio::test]
    async fn test_select() {
        let (mut dashboard, _gateway) = dashboard();
        let object = dashboard.upload(pdf(b"doc")).await.unwrap();

        assert_eq!(
            dashboard.select(Some(object.content_hash.clone())),
            Some(&object)
        );
        assert!(dashboard.select(None).is_none());

        let unknown = ContentHash::of_bytes(b"elsewhere").unwrap();
        assert!(dashboard.select(Some(unknown)).is_none());
    }

    #[tokio::test]
    async fn test_into_session_keeps_mirror() {
        let (mut dashboard, _gateway) = dashboard();
        dashboard.upload(pdf(b"doc")).await.unwrap();

        let mirror = dashboard.into_session().end();
        assert_eq!(mirror.len(), 1);
    }
}
