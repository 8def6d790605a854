//! ACL model: entries, granting strategies and lists.
//!
//! An [`Acl`] holds the object-scope ACEs of one object identity together
//! with the class-scope ACEs shared by every object of its type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identity::{ObjectIdentity, SecurityIdentity};

/// Which ACE list an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AceScope {
    /// Entries shared by every object of a type.
    Class,
    /// Entries of one object.
    Object,
}

impl AceScope {
    /// Stable lowercase name, used in messages and storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for AceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an ACE mask is compared with a required mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantingStrategy {
    /// Every required bit must be present in the ACE.
    #[default]
    All,
    /// At least one required bit must be present in the ACE.
    Any,
    /// The ACE mask must equal the required mask.
    Equal,
}

impl GrantingStrategy {
    /// Whether an ACE with `ace_mask` applies to `required`.
    pub fn is_applicable(self, required: u32, ace_mask: u32) -> bool {
        match self {
            Self::All => required & ace_mask == required,
            Self::Any => required & ace_mask != 0,
            Self::Equal => required == ace_mask,
        }
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
            Self::Equal => "equal",
        }
    }
}

impl FromStr for GrantingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            "equal" => Ok(Self::Equal),
            other => Err(Error::invalid_argument(format!(
                "unknown granting strategy '{other}'"
            ))),
        }
    }
}

/// An access control entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ace {
    /// Principal the entry applies to.
    pub sid: SecurityIdentity,
    /// Granted (or denied) permission bits.
    pub mask: u32,
    /// Mask comparison strategy.
    #[serde(default)]
    pub strategy: GrantingStrategy,
    /// `false` turns the entry into an explicit denial.
    pub granting: bool,
}

impl Ace {
    /// Create a granting ACE.
    pub fn granting(sid: SecurityIdentity, mask: u32, strategy: GrantingStrategy) -> Self {
        Self {
            sid,
            mask,
            strategy,
            granting: true,
        }
    }

    /// Create a denying ACE.
    pub fn denying(sid: SecurityIdentity, mask: u32, strategy: GrantingStrategy) -> Self {
        Self {
            sid,
            mask,
            strategy,
            granting: false,
        }
    }
}

/// The access control list of one object identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acl {
    object_identity: ObjectIdentity,
    class_aces: Vec<Ace>,
    object_aces: Vec<Ace>,
}

impl Acl {
    /// Create an empty ACL.
    pub fn new(object_identity: ObjectIdentity) -> Self {
        Self {
            object_identity,
            class_aces: Vec::new(),
            object_aces: Vec::new(),
        }
    }

    /// Create an ACL from stored entries.
    pub fn with_aces(
        object_identity: ObjectIdentity,
        class_aces: Vec<Ace>,
        object_aces: Vec<Ace>,
    ) -> Self {
        Self {
            object_identity,
            class_aces,
            object_aces,
        }
    }

    /// The identity this ACL belongs to.
    pub fn object_identity(&self) -> &ObjectIdentity {
        &self.object_identity
    }

    /// Class-scope entries, in priority order.
    pub fn class_aces(&self) -> &[Ace] {
        &self.class_aces
    }

    /// Object-scope entries, in priority order.
    pub fn object_aces(&self) -> &[Ace] {
        &self.object_aces
    }

    /// Entries of one scope.
    pub fn aces(&self, scope: AceScope) -> &[Ace] {
        match scope {
            AceScope::Class => &self.class_aces,
            AceScope::Object => &self.object_aces,
        }
    }

    fn aces_mut(&mut self, scope: AceScope) -> &mut Vec<Ace> {
        match scope {
            AceScope::Class => &mut self.class_aces,
            AceScope::Object => &mut self.object_aces,
        }
    }

    /// Find the first entry of `scope` held by `sid`.
    pub fn find_ace(&self, scope: AceScope, sid: &SecurityIdentity) -> Option<(usize, &Ace)> {
        self.aces(scope)
            .iter()
            .enumerate()
            .find(|(_, ace)| ace.sid == *sid)
    }

    /// Insert an entry at `index` (0 is the highest priority).
    pub fn insert_ace(&mut self, scope: AceScope, index: usize, ace: Ace) -> Result<()> {
        let aces = self.aces_mut(scope);
        if index > aces.len() {
            return Err(Error::invalid_argument(format!(
                "{scope} ACE index {index} is out of bounds ({} entries)",
                aces.len()
            )));
        }
        aces.insert(index, ace);
        Ok(())
    }

    /// Replace the mask of the entry at `index`, and its strategy when given.
    pub fn update_ace(
        &mut self,
        scope: AceScope,
        index: usize,
        mask: u32,
        strategy: Option<GrantingStrategy>,
    ) -> Result<()> {
        let ace = self.aces_mut(scope).get_mut(index).ok_or_else(|| {
            Error::invalid_argument(format!("no {scope} ACE at index {index}"))
        })?;
        ace.mask = mask;
        if let Some(strategy) = strategy {
            ace.strategy = strategy;
        }
        Ok(())
    }

    /// Remove the entry at `index`.
    pub fn delete_ace(&mut self, scope: AceScope, index: usize) -> Result<Ace> {
        let aces = self.aces_mut(scope);
        if index >= aces.len() {
            return Err(Error::invalid_argument(format!(
                "no {scope} ACE at index {index}"
            )));
        }
        Ok(aces.remove(index))
    }

    /// Decide whether any of `sids` holds any of `masks`.
    ///
    /// Object-scope entries are consulted first; class-scope entries only
    /// when no object-scope entry applies. The first applicable entry
    /// decides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAceFound`] when no entry applies.
    pub fn is_granted(&self, masks: &[u32], sids: &[SecurityIdentity]) -> Result<bool> {
        match Self::decide(&self.object_aces, masks, sids) {
            Some(granted) => Ok(granted),
            None => Self::decide(&self.class_aces, masks, sids).ok_or(Error::NoAceFound),
        }
    }

    fn decide(aces: &[Ace], masks: &[u32], sids: &[SecurityIdentity]) -> Option<bool> {
        for &required in masks {
            for sid in sids {
                for ace in aces {
                    if ace.sid == *sid && ace.strategy.is_applicable(required, ace.mask) {
                        log::debug!(
                            "ACE for {sid} ({}) decides mask {required}: granting={}",
                            ace.mask,
                            ace.granting
                        );
                        return Some(ace.granting);
                    }
                }
            }
        }
        None
    }
}
