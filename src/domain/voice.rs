//! Synthesis voice parameters.

use std::fmt;

/// Quality mode of the synthesis call; selects the admission ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTier {
    Standard,
    Neural,
}

impl EngineTier {
    /// Wire value expected by the speech service
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Neural => "neural",
        }
    }
}

impl fmt::Display for EngineTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synthesis parameters shared by every worker in a run
#[derive(Debug, Clone)]
pub struct VoiceProfile {
    /// Language code of the input text (e.g. "en-US")
    pub language: String,

    /// Voice to synthesize with
    pub voice: String,

    /// Engine quality tier
    pub tier: EngineTier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_wire_values() {
        assert_eq!(EngineTier::Standard.as_str(), "standard");
        assert_eq!(EngineTier::Neural.as_str(), "neural");
    }
}
