//! Install session orchestrator
//!
//! Top-level workflow for one batch: partition by package, acquire a
//! privileged installer capability per group, drive each group's session
//! through write/commit, clean up unconditionally, then schedule the
//! post-install hooks before handing the result back.

use crate::hooks::{self, PostInstallHook};
use pkgrelay_capability::{CapabilityWrapper, WorkerRecycler};
use pkgrelay_errors::{Error, InstallError};
use pkgrelay_events::{AppEvent, EventEmitter, EventSender, InstallEvent};
use pkgrelay_service::{
    PackageInstaller, PackageService, PrivilegedOps, ResultBridge, Session,
};
use pkgrelay_types::{
    InstallBatch, InstallConfig, InstallFlags, InstallItem, SessionMode, SessionParams,
};
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Drives privileged install batches against the package service.
pub struct SessionOrchestrator {
    service: Arc<dyn PackageService>,
    wrapper: CapabilityWrapper,
    recycler: Arc<WorkerRecycler>,
    direct_ops: Arc<dyn PrivilegedOps>,
    extra_hook: Option<Arc<dyn PostInstallHook>>,
    tx: Option<EventSender>,
}

impl EventEmitter for SessionOrchestrator {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl SessionOrchestrator {
    /// Create an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        service: Arc<dyn PackageService>,
        wrapper: CapabilityWrapper,
        recycler: Arc<WorkerRecycler>,
        direct_ops: Arc<dyn PrivilegedOps>,
    ) -> Self {
        Self {
            service,
            wrapper,
            recycler,
            direct_ops,
            extra_hook: None,
            tx: None,
        }
    }

    /// Attach an event sender for progress emission.
    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Attach the hook scheduled after successful batches.
    #[must_use]
    pub fn with_extra_hook(mut self, hook: Arc<dyn PostInstallHook>) -> Self {
        self.extra_hook = Some(hook);
        self
    }

    /// Install a whole batch: one independent session per package group,
    /// processed sequentially in first-seen order.
    ///
    /// An already-committed group is not rolled back when a later group
    /// fails. Post-install hooks are scheduled before the result is
    /// returned and never affect it.
    ///
    /// # Errors
    ///
    /// The first group's fatal error: configuration
    /// (`MultipleBaseFiles`), permission, stream, commit, or bridge
    /// timeout failures.
    pub async fn do_work(&self, config: &InstallConfig, batch: &InstallBatch) -> Result<(), Error> {
        let groups = batch.group_by_package();
        let total = groups.len();
        let result = self.install_groups(config, batch, groups).await;
        self.finish_work(config, batch, result.is_ok());
        self.emit(AppEvent::Install(InstallEvent::BatchCompleted {
            correlation_id: batch.correlation_id,
            groups: total,
            success: result.is_ok(),
        }));
        result
    }

    async fn install_groups(
        &self,
        config: &InstallConfig,
        batch: &InstallBatch,
        groups: Vec<(String, Vec<InstallItem>)>,
    ) -> Result<(), Error> {
        for (package, items) in groups {
            if items.is_empty() {
                continue;
            }
            match self.install_group(config, batch, &package, &items).await {
                Ok(()) => self.emit(AppEvent::Install(InstallEvent::GroupCompleted {
                    correlation_id: batch.correlation_id,
                    package,
                })),
                Err(error) => {
                    self.emit(AppEvent::Install(InstallEvent::GroupFailed {
                        correlation_id: batch.correlation_id,
                        package,
                        error: error.to_string(),
                    }));
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    async fn install_group(
        &self,
        config: &InstallConfig,
        batch: &InstallBatch,
        package: &str,
        items: &[InstallItem],
    ) -> Result<(), Error> {
        self.emit(AppEvent::Install(InstallEvent::GroupStarted {
            correlation_id: batch.correlation_id,
            package: package.to_string(),
            files: items.len(),
        }));

        let installer = self.privileged_installer(config, batch.target_user).await?;
        let params = session_params(config, package, items)?;
        let id = installer.create_session(&params).await?;
        let mut session = installer.open_session(id).await?;

        let result = self
            .drive_session(config, batch, package, items, session.as_mut())
            .await;

        // Unconditional cleanup: cancel whatever was not committed, then
        // release the session's resources.
        if let Err(error) = session.abandon().await {
            tracing::debug!(%error, package, "abandon after session completion");
        }
        session.close().await;
        result
    }

    async fn drive_session(
        &self,
        config: &InstallConfig,
        batch: &InstallBatch,
        package: &str,
        items: &[InstallItem],
        session: &mut dyn Session,
    ) -> Result<(), Error> {
        let rebound = self
            .wrapper
            .rebind_session(&config.authorizer, session)
            .await?;
        if !rebound {
            tracing::warn!(
                package,
                "session exposes no injectable endpoint; escalation rebind skipped"
            );
            self.emit(AppEvent::Install(InstallEvent::RebindSkipped {
                correlation_id: batch.correlation_id,
                package: package.to_string(),
            }));
        }

        for item in items {
            self.write_item(batch, item, session).await?;
        }

        let (sink, bridge) = ResultBridge::new();
        session.commit(sink).await?;
        self.emit(AppEvent::Install(InstallEvent::Committed {
            correlation_id: batch.correlation_id,
            package: package.to_string(),
        }));

        let outcome = bridge.take().await?;
        if outcome.is_success() {
            Ok(())
        } else {
            Err(InstallError::CommitFailed {
                reason: outcome
                    .message
                    .unwrap_or_else(|| "unspecified service failure".to_string()),
            }
            .into())
        }
    }

    async fn write_item(
        &self,
        batch: &InstallBatch,
        item: &InstallItem,
        session: &mut dyn Session,
    ) -> Result<(), Error> {
        let mut stream =
            item.source
                .open()
                .await
                .ok_or_else(|| InstallError::StreamUnavailable {
                    name: item.name.clone(),
                })?;
        let length = stream.len();

        let mut slot = session.open_write(&item.name, 0, length).await?;
        let bytes = tokio::io::copy(&mut stream, &mut slot).await?;
        session.fsync(slot.as_mut()).await?;
        slot.shutdown().await?;

        self.emit(AppEvent::Install(InstallEvent::FileWritten {
            correlation_id: batch.correlation_id,
            package: item.package_name.clone(),
            name: item.name.clone(),
            bytes,
        }));
        Ok(())
    }

    async fn privileged_installer(
        &self,
        config: &InstallConfig,
        user: u32,
    ) -> Result<Arc<dyn PackageInstaller>, Error> {
        let raw = self.service.installer_endpoint().await?;
        let wrapped = self.wrapper.wrap(&config.authorizer, raw).await?;
        let attribution = self.wrapper.attribution(&config.authorizer, user).await?;
        self.service.bind_installer(wrapped, attribution).await
    }

    /// Schedule the fire-and-forget post-batch work. Hook outcomes are
    /// reported as warning events, never as `do_work` failures.
    fn finish_work(&self, config: &InstallConfig, batch: &InstallBatch, success: bool) {
        if !success {
            return;
        }

        if let Some(hook) = &self.extra_hook {
            let hook = hook.clone();
            let tx = self.tx.clone();
            tokio::spawn(async move {
                if let Err(error) = hook.run().await {
                    tx.emit_warning(format!("post-install hook failed: {error}"));
                }
            });
        }

        if config.auto_delete_source {
            let paths: Vec<PathBuf> = batch
                .items
                .iter()
                .filter_map(|item| item.source.source_path().map(Path::to_path_buf))
                .collect();
            if paths.is_empty() {
                return;
            }
            let authorizer = config.authorizer.clone();
            let direct = self.direct_ops.clone();
            let recycler = self.recycler.clone();
            let tx = self.tx.clone();
            tokio::spawn(async move {
                if let Err(error) =
                    hooks::delete_sources(&authorizer, direct, recycler, &paths).await
                {
                    tx.emit_warning(format!("auto-delete of install sources failed: {error}"));
                }
            });
        }
    }
}

/// Build session parameters for one package group.
///
/// Exactly one base file selects a full install, zero inherits the
/// existing install, more than one is a configuration error. The
/// replace-existing flag is always set.
fn session_params(
    config: &InstallConfig,
    package: &str,
    items: &[InstallItem],
) -> Result<SessionParams, Error> {
    let mode = match items.iter().filter(|item| item.is_base()).count() {
        1 => SessionMode::FullInstall,
        0 => SessionMode::InheritExisting,
        _ => {
            return Err(InstallError::MultipleBaseFiles {
                package: package.to_string(),
            }
            .into())
        }
    };
    Ok(SessionParams {
        mode,
        package_name: package.to_string(),
        install_flags: config.install_flags | InstallFlags::REPLACE_EXISTING,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pkgrelay_types::{Authorizer, DataSource, FileRole, SourceStream};

    #[derive(Debug)]
    struct NullSource;

    #[async_trait]
    impl DataSource for NullSource {
        async fn open(&self) -> Option<Box<dyn SourceStream>> {
            None
        }
    }

    fn item(name: &str, role: FileRole) -> InstallItem {
        InstallItem::new(name, "com.example.app", role, Arc::new(NullSource))
    }

    #[test]
    fn one_base_file_selects_full_install() {
        let config = InstallConfig::new(Authorizer::None);
        let items = vec![item("base.apk", FileRole::Base), item("s.apk", FileRole::Split)];
        let params = session_params(&config, "com.example.app", &items).unwrap();
        assert_eq!(params.mode, SessionMode::FullInstall);
        assert!(params.install_flags.contains(InstallFlags::REPLACE_EXISTING));
    }

    #[test]
    fn no_base_file_inherits_existing() {
        let config = InstallConfig::new(Authorizer::None);
        let items = vec![item("split1.apk", FileRole::Split)];
        let params = session_params(&config, "com.example.app", &items).unwrap();
        assert_eq!(params.mode, SessionMode::InheritExisting);
    }

    #[test]
    fn two_base_files_are_a_configuration_error() {
        let config = InstallConfig::new(Authorizer::None);
        let items = vec![item("base.apk", FileRole::Base), item("base.apk", FileRole::Base)];
        let error = session_params(&config, "com.example.app", &items).unwrap_err();
        assert!(matches!(
            error,
            Error::Install(InstallError::MultipleBaseFiles { .. })
        ));
    }

    #[test]
    fn caller_flags_are_kept_alongside_replace_existing() {
        let config =
            InstallConfig::new(Authorizer::None).with_flags(InstallFlags::ALLOW_DOWNGRADE);
        let items = vec![item("base.apk", FileRole::Base)];
        let params = session_params(&config, "com.example.app", &items).unwrap();
        assert_eq!(
            params.install_flags,
            InstallFlags::ALLOW_DOWNGRADE | InstallFlags::REPLACE_EXISTING
        );
    }
}
