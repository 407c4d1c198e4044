//! Store-wide settings: branding, contact details, address, social links.

use serde::{Deserialize, Serialize};

/// Store settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSettings {
    pub store_name: Option<String>,
    pub store_description: Option<String>,
    pub logo_url: Option<String>,
    pub appearance: Appearance,
    pub contact: Contact,
    pub address: StoreAddress,
    pub social_links: SocialLinks,
}

/// Visual branding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Appearance {
    pub logo: Option<String>,
    pub theme_color: Option<String>,
}

/// Customer-facing contact channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Physical store address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreAddress {
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub address_line: Option<String>,
    pub country: Option<String>,
}

impl StoreAddress {
    /// Single-line address: postal code, city, district and street joined by
    /// spaces, skipping blanks. `None` when every part is blank.
    #[must_use]
    pub fn display_line(&self) -> Option<String> {
        let parts: Vec<&str> = [
            &self.postal_code,
            &self.city,
            &self.district,
            &self.address_line,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Social media profile links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub line: Option<String>,
    pub x: Option<String>,
}

impl SocialLinks {
    /// Whether at least one non-blank link is configured.
    #[must_use]
    pub fn any(&self) -> bool {
        [&self.facebook, &self.instagram, &self.line, &self.x]
            .into_iter()
            .any(|link| link.as_deref().is_some_and(|l| !l.trim().is_empty()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_nested_sections() {
        let settings: StoreSettings = serde_json::from_str(
            r##"{
                "storeName": "Taiyuan Tea",
                "appearance": { "logo": "logo.png", "themeColor": "#336699" },
                "contact": { "phone": "0223456789" },
                "socialLinks": { "line": "https://line.me/x" }
            }"##,
        )
        .unwrap();
        assert_eq!(settings.store_name.as_deref(), Some("Taiyuan Tea"));
        assert_eq!(settings.appearance.theme_color.as_deref(), Some("#336699"));
        assert_eq!(settings.contact.email, None);
        assert!(settings.social_links.any());
        assert_eq!(settings.address, StoreAddress::default());
    }

    #[test]
    fn test_address_display_line_skips_blanks() {
        let address = StoreAddress {
            postal_code: Some("100".to_string()),
            city: Some("Taipei".to_string()),
            district: Some("  ".to_string()),
            address_line: Some("No. 1, Sec. 1".to_string()),
            country: Some("Taiwan".to_string()),
        };
        assert_eq!(
            address.display_line().as_deref(),
            Some("100 Taipei No. 1, Sec. 1")
        );
        assert_eq!(StoreAddress::default().display_line(), None);
    }

    #[test]
    fn test_social_links_blank_values_do_not_count() {
        let links = SocialLinks {
            facebook: Some(String::new()),
            ..SocialLinks::default()
        };
        assert!(!links.any());
    }
}
