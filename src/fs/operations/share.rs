//! Public links and share invitations.

use tracing::debug;

use super::utils::validate_email;
use crate::api::SharePermission;
use crate::error::{BlompError, Result};
use crate::fs::drive::Drive;
use crate::fs::node::{FileId, ShareDescriptor};

impl Drive {
    /// Share a file and return its public link.
    ///
    /// `emails` may be empty to only obtain the link. With
    /// `anyone_can_view` the link works for everyone, otherwise only for
    /// invited users.
    pub async fn share(&mut self, file: FileId, emails: &[String], anyone_can_view: bool) -> Result<String> {
        for email in emails {
            validate_email(email)?;
        }
        let descriptor = self.ensure_share_info(file).await?;
        let permission = if anyone_can_view {
            SharePermission::Anyone
        } else {
            SharePermission::Invited
        };
        self.api
            .send_share_invite(emails, &descriptor.link, permission)
            .await?;
        debug!(link = %descriptor.link, recipients = emails.len(), "sent share invite");
        Ok(descriptor.link)
    }

    /// Turn the file's public link on.
    ///
    /// Fails with [`BlompError::InvalidState`] if sharing is already on.
    pub async fn enable_sharing(&mut self, file: FileId) -> Result<bool> {
        self.switch_sharing(file, true).await
    }

    /// Turn the file's public link off.
    ///
    /// Fails with [`BlompError::InvalidState`] if sharing is already off.
    pub async fn disable_sharing(&mut self, file: FileId) -> Result<bool> {
        self.switch_sharing(file, false).await
    }

    async fn switch_sharing(&mut self, file: FileId, enabled: bool) -> Result<bool> {
        let descriptor = self.ensure_share_info(file).await?;
        if descriptor.enabled == enabled {
            let state = if enabled { "enabled" } else { "disabled" };
            return Err(BlompError::InvalidState(format!(
                "Sharing of {} is already {}",
                self.file(file)?.name(),
                state
            )));
        }

        let outcome = self.api.set_share_status(descriptor.id, enabled).await?;
        if !outcome.is_success() {
            return Ok(false);
        }
        if let Some(share) = self.file_mut(file)?.share.as_mut() {
            share.enabled = enabled;
        }
        Ok(true)
    }

    /// Cached share record of a file, fetched on first use.
    async fn ensure_share_info(&mut self, file: FileId) -> Result<ShareDescriptor> {
        let node = self.file(file)?;
        if let Some(share) = &node.share {
            return Ok(share.clone());
        }

        let info = self.api.fetch_share_link(&node.file_path(), node.size()).await?;
        let link = self.api.share_link(&info.link);
        let descriptor = ShareDescriptor::from_info(&info, link);
        debug!(file = %node.file_path(), id = descriptor.id, "fetched share info");
        self.file_mut(file)?.share = Some(descriptor.clone());
        Ok(descriptor)
    }
}
