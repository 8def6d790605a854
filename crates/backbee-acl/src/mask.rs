//! Permission masks and their resolution.
//!
//! Permissions are bit flags ([`Permission`]); an ACE stores the bitwise OR
//! of the permissions it grants. Callers describe masks as integers, names or
//! lists of either ([`MaskSpec`]); the [`MaskResolver`] turns those into a
//! single integer through a target-aware [`PermissionMap`].
//!
//! # Example
//!
//! ```
//! use backbee_acl::identity::ObjectIdentity;
//! use backbee_acl::mask::{MaskResolver, MaskSpec, Permission};
//!
//! let resolver = MaskResolver::default();
//! let page = ObjectIdentity::class_scope("Page").unwrap();
//!
//! let mask = resolver
//!     .resolve(&MaskSpec::from(vec!["view", "edit"]), &page)
//!     .unwrap();
//! assert_eq!(mask, (Permission::VIEW | Permission::EDIT).bits());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use bitflags::Flags;

use crate::error::{Error, Result};
use crate::identity::ObjectIdentity;

bitflags::bitflags! {
    /// Named permission bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permission: u32 {
        /// Read access.
        const VIEW = 1 << 0;
        /// Create children or instances.
        const CREATE = 1 << 1;
        /// Modify.
        const EDIT = 1 << 2;
        /// Remove.
        const DELETE = 1 << 3;
        /// Restore after removal.
        const UNDELETE = 1 << 4;
        /// View, edit, create, delete and undelete.
        const OPERATOR = 1 << 5;
        /// Operator plus granting operator rights.
        const MASTER = 1 << 6;
        /// Master plus granting master rights.
        const OWNER = 1 << 7;
        /// Put online.
        const PUBLISH = 1 << 8;
        /// Commit a draft revision.
        const COMMIT = 1 << 9;
        /// Every bit.
        const IDDQD = (1 << 30) - 1;
    }
}

/// Enumerate every named permission bit, keyed by lowercase name.
pub fn permission_codes() -> BTreeMap<String, u32> {
    Permission::FLAGS
        .iter()
        .map(|flag| (flag.name().to_lowercase(), flag.value().bits()))
        .collect()
}

/// Decode a mask into a `name → 0|1` map.
///
/// The map holds every named permission plus `none`, set when the mask is
/// empty. A granted `edit` always reports `view` as granted too.
pub fn access_granted(mask: u32) -> BTreeMap<String, u8> {
    let mut granted: BTreeMap<String, u8> = permission_codes()
        .into_iter()
        .map(|(name, bits)| (name, u8::from(mask & bits == bits)))
        .collect();
    granted.insert("none".to_string(), u8::from(mask == 0));
    if granted.get("edit") == Some(&1) {
        granted.insert("view".to_string(), 1);
    }
    granted
}

/// A mask as supplied by callers: bits, a permission name, or a list of either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskSpec {
    /// Raw bits.
    Bits(u32),
    /// A symbolic permission name (case-insensitive).
    Name(String),
    /// Several masks combined.
    List(Vec<MaskSpec>),
}

impl From<u32> for MaskSpec {
    fn from(bits: u32) -> Self {
        MaskSpec::Bits(bits)
    }
}

impl From<Permission> for MaskSpec {
    fn from(permission: Permission) -> Self {
        MaskSpec::Bits(permission.bits())
    }
}

impl From<&str> for MaskSpec {
    fn from(name: &str) -> Self {
        MaskSpec::Name(name.to_string())
    }
}

impl From<String> for MaskSpec {
    fn from(name: String) -> Self {
        MaskSpec::Name(name)
    }
}

impl<T: Into<MaskSpec>> From<Vec<T>> for MaskSpec {
    fn from(items: Vec<T>) -> Self {
        MaskSpec::List(items.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<&serde_json::Value> for MaskSpec {
    type Error = Error;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::Number(n) => n
                .as_u64()
                .and_then(|bits| u32::try_from(bits).ok())
                .map(MaskSpec::Bits)
                .ok_or_else(|| Error::UnsupportedMask {
                    found: format!("number {n}"),
                }),
            Value::String(name) => Ok(MaskSpec::Name(name.clone())),
            Value::Array(items) => items
                .iter()
                .map(MaskSpec::try_from)
                .collect::<Result<Vec<_>>>()
                .map(MaskSpec::List),
            Value::Null => Err(Error::UnsupportedMask {
                found: "null".to_string(),
            }),
            Value::Bool(b) => Err(Error::UnsupportedMask {
                found: format!("boolean {b}"),
            }),
            Value::Object(_) => Err(Error::UnsupportedMask {
                found: "object".to_string(),
            }),
        }
    }
}

/// Maps permission names to masks, possibly depending on the target type.
pub trait PermissionMap: Send + Sync {
    /// The bits a permission name stands for on `target`.
    fn mask(&self, permission: &str, target: &ObjectIdentity) -> Option<u32>;

    /// The masks any of which satisfies `permission` on `target` when voting.
    fn masks(&self, permission: &str, target: &ObjectIdentity) -> Option<Vec<u32>>;
}

/// Default permission map.
///
/// Every [`Permission`] name resolves to its own bit. When voting, a
/// permission is also satisfied by the stronger administrative masks
/// (`operator`, `master`, `owner`). Per-type overrides replace the bits a
/// name resolves to for one target type.
#[derive(Debug, Clone, Default)]
pub struct BasicPermissionMap {
    overrides: HashMap<(String, String), u32>,
}

impl BasicPermissionMap {
    /// Create the default map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `permission` resolve to `bits` on targets of type `kind`.
    ///
    /// Multi-bit overrides are voted on as given, without the masks implying
    /// a single permission.
    pub fn with_override(mut self, kind: &str, permission: &str, bits: u32) -> Self {
        self.overrides
            .insert((kind.to_string(), permission.to_uppercase()), bits);
        self
    }

    fn implying(permission: Permission) -> &'static [Permission] {
        if permission == Permission::VIEW {
            &[
                Permission::EDIT,
                Permission::OPERATOR,
                Permission::MASTER,
                Permission::OWNER,
            ]
        } else if permission == Permission::OPERATOR {
            &[Permission::MASTER, Permission::OWNER]
        } else if permission == Permission::MASTER {
            &[Permission::OWNER]
        } else if permission == Permission::OWNER {
            &[]
        } else {
            &[Permission::OPERATOR, Permission::MASTER, Permission::OWNER]
        }
    }
}

impl PermissionMap for BasicPermissionMap {
    fn mask(&self, permission: &str, target: &ObjectIdentity) -> Option<u32> {
        let name = permission.to_uppercase();
        if let Some(bits) = self.overrides.get(&(target.kind().to_string(), name.clone())) {
            return Some(*bits);
        }
        Permission::from_name(&name).map(|p| p.bits())
    }

    fn masks(&self, permission: &str, target: &ObjectIdentity) -> Option<Vec<u32>> {
        let bits = self.mask(permission, target)?;
        let mut masks = vec![bits];
        if bits.count_ones() == 1
            && let Some(named) = Permission::from_bits(bits)
        {
            masks.extend(Self::implying(named).iter().map(|p| p.bits()));
        }
        Some(masks)
    }
}

/// Resolves [`MaskSpec`]s into integer masks.
#[derive(Clone)]
pub struct MaskResolver {
    map: Arc<dyn PermissionMap>,
}

impl MaskResolver {
    /// Create a resolver over a permission map.
    pub fn new(map: Arc<dyn PermissionMap>) -> Self {
        Self { map }
    }

    /// The permission map backing this resolver.
    pub fn map(&self) -> Arc<dyn PermissionMap> {
        Arc::clone(&self.map)
    }

    /// Resolve a mask for `target`.
    ///
    /// Lists are combined with bitwise OR, recursively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPermission`] naming the first unknown permission.
    pub fn resolve(&self, masks: &MaskSpec, target: &ObjectIdentity) -> Result<u32> {
        match masks {
            MaskSpec::Bits(bits) => Ok(*bits),
            MaskSpec::Name(name) => {
                self.map
                    .mask(name, target)
                    .ok_or_else(|| Error::InvalidPermission { name: name.clone() })
            }
            MaskSpec::List(items) => items
                .iter()
                .try_fold(0, |acc, item| Ok(acc | self.resolve(item, target)?)),
        }
    }

    /// Resolve a loosely typed JSON mask value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMask`] for values that are neither numbers,
    /// strings nor arrays, and [`Error::InvalidPermission`] for unknown names.
    pub fn resolve_value(&self, value: &serde_json::Value, target: &ObjectIdentity) -> Result<u32> {
        self.resolve(&MaskSpec::try_from(value)?, target)
    }
}

impl Default for MaskResolver {
    fn default() -> Self {
        Self::new(Arc::new(BasicPermissionMap::new()))
    }
}

impl std::fmt::Debug for MaskResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskResolver").finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const NAMES: [&str; 10] = [
        "view", "create", "edit", "delete", "undelete", "operator", "master", "owner", "publish",
        "commit",
    ];

    proptest! {
        #[test]
        fn test_resolve_pair_is_sum_of_parts(a in 0usize..10, b in 0usize..10) {
            prop_assume!(a != b);
            let resolver = MaskResolver::default();
            let target = ObjectIdentity::class_scope("Page").unwrap();
            let both = resolver.resolve(&MaskSpec::from(vec![NAMES[a], NAMES[b]]), &target).unwrap();
            let sum = resolver.resolve(&NAMES[a].into(), &target).unwrap()
                + resolver.resolve(&NAMES[b].into(), &target).unwrap();
            prop_assert_eq!(both, sum);
        }

        #[test]
        fn test_resolve_unknown_name_never_zero(name in "[a-z]{3,12}") {
            prop_assume!(Permission::from_name(&name.to_uppercase()).is_none());
            let resolver = MaskResolver::default();
            let target = ObjectIdentity::class_scope("Page").unwrap();
            let is_invalid = matches!(
                resolver.resolve(&MaskSpec::Name(name), &target),
                Err(Error::InvalidPermission { .. })
            );
            prop_assert!(is_invalid);
        }
    }
}
