//! Install item and batch definitions

use crate::DataSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Role of one file inside an install session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    /// The primary package artifact; at most one per session
    Base,
    /// A split/auxiliary artifact installed alongside the base
    Split,
}

/// One physical file to deliver into an install session
///
/// Immutable once constructed. Items carry the package name they belong
/// to; a batch is partitioned by that name and each partition becomes one
/// independent session.
#[derive(Debug, Clone)]
pub struct InstallItem {
    /// File name inside the session (e.g. `base.apk`, `split.arm64.apk`)
    pub name: String,
    /// Target package this file belongs to
    pub package_name: String,
    /// Whether this is the base artifact or a split
    pub role: FileRole,
    /// Provider of the file's bytes
    pub source: Arc<dyn DataSource>,
    /// Advisory size, when the caller knows it up front
    pub size_hint: Option<u64>,
}

impl InstallItem {
    /// Create a new install item
    pub fn new(
        name: impl Into<String>,
        package_name: impl Into<String>,
        role: FileRole,
        source: Arc<dyn DataSource>,
    ) -> Self {
        Self {
            name: name.into(),
            package_name: package_name.into(),
            role,
            source,
            size_hint: None,
        }
    }

    /// Attach an advisory size hint
    #[must_use]
    pub fn with_size_hint(mut self, size: u64) -> Self {
        self.size_hint = Some(size);
        self
    }

    /// Whether this item is the base artifact
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.role == FileRole::Base
    }
}

impl fmt::Display for InstallItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package_name, self.name)
    }
}

/// Ordered collection of install items processed by one `do_work` call
#[derive(Debug, Clone)]
pub struct InstallBatch {
    /// Items in delivery order
    pub items: Vec<InstallItem>,
    /// User the packages are installed for
    pub target_user: u32,
    /// Correlation id stitching this batch's events together
    pub correlation_id: Uuid,
}

impl InstallBatch {
    /// Create a new batch with a fresh correlation id
    #[must_use]
    pub fn new(items: Vec<InstallItem>, target_user: u32) -> Self {
        Self {
            items,
            target_user,
            correlation_id: Uuid::new_v4(),
        }
    }

    /// Partition items by package name, preserving first-seen package
    /// order and per-package item order.
    #[must_use]
    pub fn group_by_package(&self) -> Vec<(String, Vec<InstallItem>)> {
        let mut groups: Vec<(String, Vec<InstallItem>)> = Vec::new();
        for item in &self.items {
            match groups.iter_mut().find(|(pkg, _)| *pkg == item.package_name) {
                Some((_, items)) => items.push(item.clone()),
                None => groups.push((item.package_name.clone(), vec![item.clone()])),
            }
        }
        groups
    }
}
