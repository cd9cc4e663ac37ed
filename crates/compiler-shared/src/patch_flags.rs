use bitflags::{bitflags, bitflags_match};
use std::fmt::Display;

bitflags! {
    /// Optimization hints attached to generated vnodes. The runtime reads them to
    /// pick a fast diffing path; they are only ever combined with `|`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct PatchFlags: i16 {
        /// Indicates an element with dynamic textContent (children fast path)
        const Text = 1;
        /// Indicates an element with dynamic class binding.
        const Class = 1 << 1;
        /// Indicates an element with dynamic style.
        const Style = 1 << 2;
        /// Indicates an element that has non-class/style dynamic props.
        /// The names of those props travel next to the flag.
        const Props = 1 << 3;
        /// Indicates an element with props with dynamic keys. When keys change, a full
        /// diff is always needed to remove the old key.
        const FullProps = 1 << 4;
        /// Indicates an element that requires props hydration
        /// (but not necessarily patching), e.g. event listeners.
        const NeedHydration = 1 << 5;
        /// Indicates a fragment whose children order doesn't change.
        const StableFragment = 1 << 6;
        /// Indicates a fragment with keyed or partially keyed children
        const KeyedFragment = 1 << 7;
        /// Indicates a fragment with unkeyed children.
        const UnkeyedFragment = 1 << 8;
        /// Indicates an element that only needs non-props patching, e.g. ref or
        /// directives (onVnodeXXX hooks).
        const NeedPatch = 1 << 9;
        /// Indicates a component with dynamic slots (e.g. slot that references a v-for
        /// iterated value, or dynamic slot names).
        const DynamicSlots = 1 << 10;
        /// Indicates a fragment that was created only because the user has placed
        /// comments at the root level of a template. This is a dev-only flag since
        /// comments are stripped in production.
        const DevRootFragment = 1 << 11;
    }
}

impl PatchFlags {
    /// Name of a single flag. Combined values have no name of their own.
    pub fn as_str(&self) -> &'static str {
        bitflags_match!(*self, {
            Self::Text => "TEXT",
            Self::Class => "CLASS",
            Self::Style => "STYLE",
            Self::Props => "PROPS",
            Self::FullProps => "FULL_PROPS",
            Self::NeedHydration => "NEED_HYDRATION",
            Self::StableFragment => "STABLE_FRAGMENT",
            Self::KeyedFragment => "KEYED_FRAGMENT",
            Self::UnkeyedFragment => "UNKEYED_FRAGMENT",
            Self::NeedPatch => "NEED_PATCH",
            Self::DynamicSlots => "DYNAMIC_SLOTS",
            Self::DevRootFragment => "DEV_ROOT_FRAGMENT",
            _ => "",
        })
    }

    pub fn keys() -> Vec<PatchFlags> {
        vec![
            Self::Text,
            Self::Class,
            Self::Style,
            Self::Props,
            Self::FullProps,
            Self::NeedHydration,
            Self::StableFragment,
            Self::KeyedFragment,
            Self::UnkeyedFragment,
            Self::NeedPatch,
            Self::DynamicSlots,
            Self::DevRootFragment,
        ]
    }

    /// `TEXT, CLASS` style listing used in dev-mode comments.
    pub fn names(&self) -> String {
        Self::keys()
            .into_iter()
            .filter(|flag| self.contains(*flag))
            .map(|flag| flag.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Display for PatchFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl PartialEq<i16> for PatchFlags {
    fn eq(&self, other: &i16) -> bool {
        &self.bits() == other
    }
}

/// The value stored in a vnode's patch flag slot. Hoisted vnodes carry a
/// negative marker instead of bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchFlag {
    Flags(PatchFlags),
    /// Indicates a hoisted static vnode. The runtime skips the whole subtree
    /// during hydration and diffing.
    Hoisted,
}

impl PatchFlag {
    pub fn value(&self) -> i16 {
        match self {
            Self::Flags(flags) => flags.bits(),
            Self::Hoisted => -1,
        }
    }

    pub fn names(&self) -> String {
        match self {
            Self::Flags(flags) => flags.names(),
            Self::Hoisted => "HOISTED".to_string(),
        }
    }

    pub fn flags(&self) -> PatchFlags {
        match self {
            Self::Flags(flags) => *flags,
            Self::Hoisted => PatchFlags::empty(),
        }
    }
}

impl From<PatchFlags> for PatchFlag {
    fn from(flags: PatchFlags) -> Self {
        Self::Flags(flags)
    }
}

impl Display for PatchFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_of_combined_flags() {
        let flags = PatchFlags::Class | PatchFlags::Props;
        assert_eq!(flags, 10);
        assert_eq!(flags.names(), "CLASS, PROPS");
        assert_eq!(PatchFlags::Text.as_str(), "TEXT");
        assert_eq!(flags.as_str(), "");
    }

    #[test]
    fn hoisted_marker() {
        assert_eq!(PatchFlag::Hoisted.to_string(), "-1");
        assert_eq!(PatchFlag::Hoisted.names(), "HOISTED");
        assert_eq!(PatchFlag::from(PatchFlags::FullProps).value(), 16);
    }
}
