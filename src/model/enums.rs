//! Code to label mapping for medium, cache policy and codec
//!
//! Binary resources store the raw codes. The XML format stores these labels,
//! and any code outside the known set renders as [`ERROR_LABEL`].

/// Label used for codes outside the known enumeration
pub const ERROR_LABEL: &str = "ERROR";

/// Storage location of an asset at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Medium {
    Ram = 0,
    Unk = 1,
    Cart = 2,
    Disk = 3,
    RamUnloaded = 5,
}

impl Medium {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Ram),
            1 => Some(Self::Unk),
            2 => Some(Self::Cart),
            3 => Some(Self::Disk),
            5 => Some(Self::RamUnloaded),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ram => "Ram",
            Self::Unk => "Unk",
            Self::Cart => "Cart",
            Self::Disk => "Disk",
            Self::RamUnloaded => "RamUnloaded",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().find(|m| m.label() == label)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::Ram,
            Self::Unk,
            Self::Cart,
            Self::Disk,
            Self::RamUnloaded,
        ]
        .into_iter()
    }
}

/// Retention class of a loaded asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CachePolicy {
    Temporary = 0,
    Persistent = 1,
    Either = 2,
    Permanent = 3,
}

impl CachePolicy {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Temporary),
            1 => Some(Self::Persistent),
            2 => Some(Self::Either),
            3 => Some(Self::Permanent),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Temporary => "Temporary",
            Self::Persistent => "Persistent",
            Self::Either => "Either",
            Self::Permanent => "Permanent",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().find(|p| p.label() == label)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::Temporary,
            Self::Persistent,
            Self::Either,
            Self::Permanent,
        ]
        .into_iter()
    }
}

/// Sample encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Codec {
    Adpcm = 0,
    S8 = 1,
    S16Mem = 2,
    AdpcmSmall = 3,
    Reverb = 4,
    S16 = 5,
    Unk6 = 6,
    Unk7 = 7,
}

impl Codec {
    pub fn from_code(code: u8) -> Option<Self> {
        Self::all().find(|c| *c as u8 == code)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Adpcm => "ADPCM",
            Self::S8 => "S8",
            Self::S16Mem => "S16MEM",
            Self::AdpcmSmall => "ADPCMSMALL",
            Self::Reverb => "REVERB",
            Self::S16 => "S16",
            Self::Unk6 => "UNK6",
            Self::Unk7 => "UNK7",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().find(|c| c.label() == label)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::Adpcm,
            Self::S8,
            Self::S16Mem,
            Self::AdpcmSmall,
            Self::Reverb,
            Self::S16,
            Self::Unk6,
            Self::Unk7,
        ]
        .into_iter()
    }
}

/// Display label for a medium code
pub fn medium_label(code: u8) -> &'static str {
    Medium::from_code(code).map_or(ERROR_LABEL, |m| m.label())
}

/// Display label for a cache policy code
pub fn cache_policy_label(code: u8) -> &'static str {
    CachePolicy::from_code(code).map_or(ERROR_LABEL, |p| p.label())
}

/// Display label for a codec code
pub fn codec_label(code: u8) -> &'static str {
    Codec::from_code(code).map_or(ERROR_LABEL, |c| c.label())
}

/// Medium code for a label, `None` for unknown labels and [`ERROR_LABEL`]
pub fn medium_code(label: &str) -> Option<u8> {
    Medium::from_label(label).map(|m| m as u8)
}

/// Cache policy code for a label
pub fn cache_policy_code(label: &str) -> Option<u8> {
    CachePolicy::from_label(label).map(|p| p as u8)
}

/// Codec code for a label
pub fn codec_code(label: &str) -> Option<u8> {
    Codec::from_label(label).map(|c| c as u8)
}
