use crate::core::CiiProfile;

/// XRechnung 3.0 specification identifier (BT-24).
pub const XRECHNUNG_GUIDELINE: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:xeinkauf.de:kosit:xrechnung_3.0";

impl CiiProfile {
    /// Classify the guideline URN from `GuidelineSpecifiedDocumentContextParameter`.
    ///
    /// Accepts the Factur-X 1.0 URNs, the ZUGFeRD 2.0 `urn:zugferd.de:2p0:*`
    /// spellings and any XRechnung version. ZUGFeRD 1.0 COMFORT is the
    /// predecessor of EN 16931.
    pub fn from_urn(urn: &str) -> Self {
        let lower = urn.trim().to_ascii_lowercase();
        if lower.contains("xrechnung") {
            Self::XRechnung
        } else if lower.ends_with(":minimum") {
            Self::Minimum
        } else if lower.ends_with(":basicwl") {
            Self::BasicWl
        } else if lower.ends_with(":basic") {
            Self::Basic
        } else if lower.ends_with(":extended") {
            Self::Extended
        } else if lower == "urn:cen.eu:en16931:2017"
            || lower.ends_with(":en16931")
            || lower.ends_with(":comfort")
        {
            Self::EN16931
        } else {
            Self::Unknown(urn.trim().to_string())
        }
    }

    /// Canonical URN of the profile.
    pub fn urn(&self) -> &str {
        match self {
            Self::Minimum => "urn:factur-x.eu:1p0:minimum",
            Self::BasicWl => "urn:factur-x.eu:1p0:basicwl",
            Self::Basic => "urn:cen.eu:en16931:2017#compliant#urn:factur-x.eu:1p0:basic",
            Self::EN16931 => "urn:cen.eu:en16931:2017",
            Self::Extended => "urn:cen.eu:en16931:2017#conformant#urn:factur-x.eu:1p0:extended",
            Self::XRechnung => XRECHNUNG_GUIDELINE,
            Self::Unknown(urn) => urn,
        }
    }
}
