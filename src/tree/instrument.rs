use core::fmt;

use super::TreeError;

#[doc = r#"
A General MIDI patch, optionally played on the percussion channel.

Percussion instruments always land on channel 10 (index 9) when encoded;
every other patch is given a channel of its own.
"#]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instrument {
    patch: u8,
    percussion: bool,
}

impl Instrument {
    /// The standard drum kit.
    pub const DRUMS: Self = Self {
        patch: 0,
        percussion: true,
    };

    /// Create a melodic instrument from a patch number.
    ///
    /// # Errors
    /// if the patch is > 127
    pub const fn new(patch: u8) -> Result<Self, TreeError> {
        if patch > 127 {
            return Err(TreeError::PatchOutOfRange(patch));
        }
        Ok(Self {
            patch,
            percussion: false,
        })
    }

    /// Create a percussion instrument from a patch (drum kit) number.
    ///
    /// # Errors
    /// if the patch is > 127
    pub const fn percussion(patch: u8) -> Result<Self, TreeError> {
        if patch > 127 {
            return Err(TreeError::PatchOutOfRange(patch));
        }
        Ok(Self {
            patch,
            percussion: true,
        })
    }

    /// The patch (program) number
    pub const fn patch(&self) -> u8 {
        self.patch
    }

    /// True if this instrument plays on the percussion channel
    pub const fn is_percussion(&self) -> bool {
        self.percussion
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.percussion {
            write!(f, "Drums({})", self.patch)
        } else {
            write!(f, "Patch({})", self.patch)
        }
    }
}
