//! Asset group identifiers.

use std::fmt;

/// A named category of source files sharing one destination and stage chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetGroup {
    Styles,
    Scripts,
    Html,
    Images,
    Fonts,
    Lib,
    Sprites,
}

/// What connected browsers should do after a group finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    /// Swap the stylesheet in place.
    Inject,
    /// Reload the whole page.
    Full,
}

impl AssetGroup {
    /// Initial batch order of the `default` task.
    pub const ALL: [Self; 7] = [
        Self::Lib,
        Self::Fonts,
        Self::Html,
        Self::Scripts,
        Self::Styles,
        Self::Images,
        Self::Sprites,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Html => "html",
            Self::Images => "images",
            Self::Fonts => "fonts",
            Self::Lib => "lib",
            Self::Sprites => "sprites",
        }
    }

    pub const fn reload_kind(self) -> ReloadKind {
        match self {
            Self::Styles => ReloadKind::Inject,
            _ => ReloadKind::Full,
        }
    }

    /// Title used for user-facing error notifications.
    pub const fn error_title(self) -> &'static str {
        match self {
            Self::Styles => "SCSS Error",
            Self::Scripts => "JS Error",
            Self::Html => "HTML Error",
            Self::Images => "Image Error",
            Self::Sprites => "Sprite Error",
            Self::Fonts | Self::Lib => "Copy Error",
        }
    }
}

impl fmt::Display for AssetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_styles_inject() {
        for group in AssetGroup::ALL {
            let expected = if group == AssetGroup::Styles {
                ReloadKind::Inject
            } else {
                ReloadKind::Full
            };
            assert_eq!(group.reload_kind(), expected, "{group}");
        }
    }

    #[test]
    fn test_all_groups_unique() {
        let mut groups = AssetGroup::ALL.to_vec();
        groups.sort();
        groups.dedup();
        assert_eq!(groups.len(), AssetGroup::ALL.len());
    }
}
