use chrono::Utc;

use super::{codec, AccessCodecError, AccessGrant};
use crate::gateway::{Gateway, GatewayError, PinRecord};
use crate::object::{ContentHash, Object, Upload};

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Codec(#[from] AccessCodecError),
}

/// Grant, revoke and list access over a [`Gateway`].
///
/// Every mutation is a read-modify-write of the object's full metadata:
/// fetch, decode, edit, encode, write back. The write is the last step, so a
/// failure anywhere leaves the remote object as it was. The cycle is not
/// atomic; two concurrent writers on the same object can lose an update.
#[derive(Debug, Clone)]
pub struct AccessManager<G: Gateway> {
    gateway: G,
}

impl<G: Gateway> AccessManager<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Pin a new file with its initial access list.
    ///
    /// Returns the object as it now exists on the gateway.
    pub async fn upload(
        &self,
        upload: Upload,
        access_list: Vec<AccessGrant>,
    ) -> Result<Object, AccessError> {
        let uploaded_at = Utc::now();
        let keyvalues = upload.keyvalues(uploaded_at, &access_list)?;
        let content_hash = self.gateway.upload(&upload, keyvalues).await?;

        tracing::info!(
            hash = %content_hash,
            name = %upload.name,
            size = upload.byte_size(),
            grants = access_list.len(),
            "file pinned"
        );

        Ok(Object {
            content_hash,
            byte_size: upload.byte_size(),
            display_name: upload.name,
            mime_type: upload.mime_type,
            uploaded_at: Some(uploaded_at),
            access_list,
        })
    }

    /// Fetch a single object, surfacing corrupt access data as an error.
    pub async fn get(&self, hash: &ContentHash) -> Result<Object, AccessError> {
        let metadata = self.gateway.get_metadata(hash).await?;
        Ok(Object::from_pin(PinRecord {
            hash: hash.clone(),
            metadata,
        })?)
    }

    /// Append `grant` to the object's access list.
    ///
    /// No de-duplication: granting the same grantee twice keeps both
    /// entries. Returns the list as written.
    pub async fn grant(
        &self,
        hash: &ContentHash,
        grant: AccessGrant,
    ) -> Result<Vec<AccessGrant>, AccessError> {
        tracing::info!(
            %hash,
            grantee = %grant.grantee_email,
            level = %grant.access_level,
            expires_at = %grant.expires_at,
            "granting access"
        );

        self.rewrite(hash, move |access_list| {
            access_list.push(grant);
            true
        })
        .await
    }

    /// Drop every grant whose grantee equals `email` exactly.
    ///
    /// Succeeds without writing when nothing matched. Returns the list as it
    /// now stands.
    pub async fn revoke(
        &self,
        hash: &ContentHash,
        email: &str,
    ) -> Result<Vec<AccessGrant>, AccessError> {
        tracing::info!(%hash, grantee = %email, "revoking access");

        self.rewrite(hash, |access_list| {
            let before = access_list.len();
            access_list.retain(|grant| !grant.is_for(email));
            access_list.len() != before
        })
        .await
    }

    /// Objects with at least one grant naming `email`.
    ///
    /// This filters every pin the credentials can see on the client side;
    /// it is not an authorization check. Pins whose access data cannot be
    /// decoded are left out rather than failing the whole listing.
    pub async fn list(&self, email: &str) -> Result<Vec<Object>, AccessError> {
        let pins = self.gateway.list_all().await?;
        let total = pins.len();

        let objects: Vec<Object> = pins
            .into_iter()
            .filter_map(|pin| {
                let hash = pin.hash.clone();
                match Object::from_pin(pin) {
                    Ok(object) => Some(object),
                    Err(e) => {
                        tracing::warn!(%hash, "skipping pin with unreadable access data: {}", e);
                        None
                    }
                }
            })
            .filter(|object| object.has_grant_for(email))
            .collect();

        tracing::debug!(
            grantee = %email,
            visible = objects.len(),
            total,
            "listed objects"
        );

        Ok(objects)
    }

    /// Read-modify-write cycle shared by grant and revoke.
    ///
    /// `edit` reports whether it changed the list; unchanged lists are not
    /// written back.
    async fn rewrite<F>(&self, hash: &ContentHash, edit: F) -> Result<Vec<AccessGrant>, AccessError>
    where
        F: FnOnce(&mut Vec<AccessGrant>) -> bool + Send,
    {
        let mut metadata = self.gateway.get_metadata(hash).await?;
        let mut access_list = codec::from_keyvalues(&metadata.keyvalues)?;

        if !edit(&mut access_list) {
            tracing::debug!(%hash, "access list unchanged, skipping write");
            return Ok(access_list);
        }

        codec::write_keyvalues(&mut metadata.keyvalues, &access_list)?;
        self.gateway.update_metadata(hash, metadata).await?;

        Ok(access_list)
    }
}
